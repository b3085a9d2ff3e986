mod cache;
mod criteria;
pub mod domain;
pub mod factory;
mod registry;
pub mod report;
mod store;
pub mod view;

pub use cache::{CacheStats, SearchCache, SearchResult};
pub use criteria::{NamedFilter, SearchCriteria, PREMIUM_PRICE_THRESHOLD};
pub use domain::{Feature, LotError, LotId, LotRecord, LotStatus, BLOCK_COUNT, LOTS_PER_BLOCK};
pub use factory::LotChange;
pub use registry::{InventorySource, LotRegistry};
pub use report::InventoryReport;
pub use store::{PersistenceError, PersistenceStore};
pub use view::{Layer, LotView};
