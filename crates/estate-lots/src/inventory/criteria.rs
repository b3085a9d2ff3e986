use super::domain::{Feature, LotError, LotStatus};
use super::view::LotView;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Effective price above which a lot counts as premium.
pub const PREMIUM_PRICE_THRESHOLD: f64 = 250_000.0;

/// Optional range and equality filters combined as a conjunction.
///
/// Equality and hashing are field-wise (all-`None` included), which makes the
/// criteria usable directly as a search cache key.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchCriteria {
    pub min_size: Option<f64>,
    pub max_size: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub block: Option<u32>,
    pub status: Option<LotStatus>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_size(mut self, value: f64) -> Self {
        self.min_size = Some(value);
        self
    }

    pub fn max_size(mut self, value: f64) -> Self {
        self.max_size = Some(value);
        self
    }

    pub fn min_price(mut self, value: f64) -> Self {
        self.min_price = Some(value);
        self
    }

    pub fn max_price(mut self, value: f64) -> Self {
        self.max_price = Some(value);
        self
    }

    pub fn block(mut self, value: u32) -> Self {
        self.block = Some(value);
        self
    }

    pub fn status(mut self, value: LotStatus) -> Self {
        self.status = Some(value);
        self
    }

    /// Block and size are read from the base record, price and status from the
    /// effective (decorated) view.
    pub fn matches(&self, view: &LotView) -> bool {
        let record = view.base();

        if self.block.is_some_and(|block| record.block() != block) {
            return false;
        }
        if !within(record.size(), self.min_size, self.max_size) {
            return false;
        }
        if (self.min_price.is_some() || self.max_price.is_some())
            && !within(view.price(), self.min_price, self.max_price)
        {
            return false;
        }
        if self.status.is_some_and(|status| view.status() != status) {
            return false;
        }

        true
    }

    fn key(&self) -> [Option<u64>; 6] {
        [
            self.min_size.map(float_key),
            self.max_size.map(float_key),
            self.min_price.map(float_key),
            self.max_price.map(float_key),
            self.block.map(u64::from),
            self.status.map(|status| status as u64),
        ]
    }
}

fn within(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}

fn float_key(value: f64) -> u64 {
    if value == 0.0 {
        0.0_f64.to_bits()
    } else {
        value.to_bits()
    }
}

impl PartialEq for SearchCriteria {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for SearchCriteria {}

impl Hash for SearchCriteria {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for SearchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn bound(value: Option<f64>) -> String {
            value.map_or_else(|| "*".to_string(), |value| value.to_string())
        }

        write!(
            f,
            "size=[{}, {}] price=[{}, {}] block={} status={}",
            bound(self.min_size),
            bound(self.max_size),
            bound(self.min_price),
            bound(self.max_price),
            self.block
                .map_or_else(|| "*".to_string(), |block| block.to_string()),
            self.status.map_or("*", LotStatus::label)
        )
    }
}

/// Frequently used predicates addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedFilter {
    Available,
    Reserved,
    Sold,
    WithPool,
    Premium,
}

impl NamedFilter {
    pub const fn all() -> [Self; 5] {
        [
            Self::Available,
            Self::Reserved,
            Self::Sold,
            Self::WithPool,
            Self::Premium,
        ]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Sold => "sold",
            Self::WithPool => "withpool",
            Self::Premium => "premium",
        }
    }

    pub fn matches(self, view: &LotView) -> bool {
        match self {
            Self::Available => view.status() == LotStatus::Available,
            Self::Reserved => view.status() == LotStatus::Reserved,
            Self::Sold => view.status() == LotStatus::Sold,
            Self::WithPool => view.has_feature(Feature::SwimmingPool),
            Self::Premium => view.price() > PREMIUM_PRICE_THRESHOLD,
        }
    }
}

impl FromStr for NamedFilter {
    type Err = LotError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        Self::all()
            .into_iter()
            .find(|filter| filter.name() == normalized)
            .ok_or_else(|| {
                LotError::Validation(vec![format!(
                    "unknown filter '{}' (expected one of: {})",
                    value.trim(),
                    Self::all().map(Self::name).join(", ")
                )])
            })
    }
}
