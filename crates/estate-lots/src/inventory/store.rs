use super::domain::{LotId, LotRecord};
use super::factory;
use super::view::{Layer, LotView};
use crate::config::DataConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("lot data file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("lot data could not be encoded or decoded: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("unsupported lot data version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    saved_at: DateTime<Utc>,
    lots: Vec<StoredLot>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredLot {
    id: String,
    block: u32,
    lot_number: u32,
    size: f64,
    price: f64,
    #[serde(default)]
    layers: Vec<Layer>,
}

impl StoredLot {
    fn capture(view: &LotView) -> Self {
        let record = view.base();
        Self {
            id: record.id().to_string(),
            block: record.block(),
            lot_number: record.lot_number(),
            size: record.size(),
            price: record.price(),
            layers: view.layer_stack(),
        }
    }

    fn restore(self) -> Result<LotView, String> {
        let record = LotRecord::new(self.block, self.lot_number, self.size, self.price)
            .map_err(|err| err.to_string())?;
        if record.id().as_str() != self.id {
            warn!(stored = %self.id, canonical = %record.id(), "stored lot id is not canonical; using canonical id");
        }
        factory::apply_layers(record, &self.layers).map_err(|err| err.to_string())
    }
}

/// Whole-inventory snapshot file with a backup of the previous snapshot.
#[derive(Debug, Clone)]
pub struct PersistenceStore {
    path: PathBuf,
    backup: PathBuf,
}

impl PersistenceStore {
    pub fn new(path: impl Into<PathBuf>, backup: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup: backup.into(),
        }
    }

    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(config.file.clone(), config.backup.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    /// Writes the snapshot, reporting failure as `false` after logging it.
    pub fn save(&self, views: &[LotView]) -> bool {
        match self.try_save(views) {
            Ok(()) => {
                info!(path = %self.path.display(), lots = views.len(), "lot inventory saved");
                true
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to save lot inventory");
                false
            }
        }
    }

    /// Copies the current file to the backup path, then replaces it with a new snapshot.
    pub fn try_save(&self, views: &[LotView]) -> Result<(), PersistenceError> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            lots: views.iter().map(StoredLot::capture).collect(),
        };
        let payload = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        if self.path.is_file() {
            fs::copy(&self.path, &self.backup)?;
        }

        let staging = staging_path(&self.path);
        let written =
            fs::write(&staging, payload).and_then(|()| fs::rename(&staging, &self.path));
        if let Err(err) = written {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }
        Ok(())
    }

    /// Reads the snapshot. A missing, unreadable, or malformed file yields an empty
    /// inventory; the failure is logged rather than returned.
    pub fn load(&self) -> Vec<LotView> {
        match self.try_load() {
            Ok(Some(views)) => {
                info!(path = %self.path.display(), lots = views.len(), "lot inventory loaded");
                views
            }
            Ok(None) => {
                info!(path = %self.path.display(), "no lot data file found");
                Vec::new()
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "lot data file unusable; starting from an empty inventory");
                Vec::new()
            }
        }
    }

    /// `Ok(None)` when the file does not exist. Individual records that fail validation are
    /// skipped with a warning.
    pub fn try_load(&self) -> Result<Option<Vec<LotView>>, PersistenceError> {
        let payload = match fs::read(&self.path) {
            Ok(payload) => payload,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let snapshot: Snapshot = serde_json::from_slice(&payload)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let mut seen: HashSet<LotId> = HashSet::new();
        let mut views = Vec::with_capacity(snapshot.lots.len());
        for stored in snapshot.lots {
            let stored_id = stored.id.clone();
            match stored.restore() {
                Ok(view) if seen.insert(view.id().clone()) => views.push(view),
                Ok(view) => warn!(id = %view.id(), "duplicate lot in data file skipped"),
                Err(reason) => warn!(id = %stored_id, %reason, "invalid lot in data file skipped"),
            }
        }

        Ok(Some(views))
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::domain::{Feature, LotStatus};

    fn store(dir: &Path) -> PersistenceStore {
        PersistenceStore::new(dir.join("lots.dat"), dir.join("lots.bak"))
    }

    fn decorated() -> LotView {
        LotView::base_lot(LotRecord::seeded(3, 7))
            .with_feature(Feature::PerimeterFencing)
            .with_status(LotStatus::Reserved)
            .with_feature(Feature::SwimmingPool)
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(dir.path());
        assert!(store.try_load().expect("no error").is_none());
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load_restores_layers_in_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(dir.path());
        let view = decorated();

        assert!(store.save(std::slice::from_ref(&view)));
        let loaded = store.load();

        assert_eq!(loaded, vec![view]);
        assert_eq!(
            loaded[0].layer_stack(),
            vec![
                Layer::Feature(Feature::PerimeterFencing),
                Layer::Status(LotStatus::Reserved),
                Layer::Feature(Feature::SwimmingPool),
            ]
        );
    }

    #[test]
    fn second_save_backs_up_previous_snapshot() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(dir.path());
        let first = LotView::base_lot(LotRecord::seeded(1, 1));

        assert!(store.save(std::slice::from_ref(&first)));
        assert!(!store.backup_path().exists());
        assert!(store.save(&[first.clone(), decorated()]));

        let backup = PersistenceStore::new(store.backup_path(), dir.path().join("unused"));
        assert_eq!(backup.load(), vec![first]);
        assert_eq!(store.load().len(), 2);
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(dir.path());
        fs::write(store.path(), b"\xac\xed\x00\x05 not json").expect("write garbage");

        assert!(matches!(store.try_load(), Err(PersistenceError::Encoding(_))));
        assert!(store.load().is_empty());
    }

    #[test]
    fn unknown_version_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(dir.path());
        fs::write(
            store.path(),
            r#"{"version": 9, "saved_at": "2025-01-01T00:00:00Z", "lots": []}"#,
        )
        .expect("write snapshot");

        assert!(matches!(
            store.try_load(),
            Err(PersistenceError::UnsupportedVersion { found: 9, .. })
        ));
    }

    #[test]
    fn invalid_records_are_skipped() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(dir.path());
        fs::write(
            store.path(),
            r#"{"version": 1, "saved_at": "2025-01-01T00:00:00Z", "lots": [
                {"id": "Lot9 1", "block": 9, "lot_number": 1, "size": 100.0, "price": 1.0},
                {"id": "Lot1 2", "block": 1, "lot_number": 2, "size": 230.0, "price": 120000.0,
                 "layers": [{"status": "sold"}, {"feature": "pool"}]}
            ]}"#,
        )
        .expect("write snapshot");

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id().as_str(), "Lot1 2");
        assert_eq!(loaded[0].status(), LotStatus::Sold);
        assert_eq!(loaded[0].price(), 145_000.0);
    }

    #[test]
    fn failed_replace_leaves_no_staging_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(dir.path());
        fs::create_dir(store.path()).expect("directory in place of the data file");
        fs::write(store.path().join("keep"), b"occupied").expect("populate directory");

        assert!(matches!(
            store.try_save(&[decorated()]),
            Err(PersistenceError::Io(_))
        ));
        assert!(!staging_path(store.path()).exists());
        assert!(!store.backup_path().exists());
    }

    #[test]
    fn save_to_unwritable_location_reports_false() {
        let dir = tempfile::tempdir().expect("temp dir");
        let blocker = dir.path().join("occupied");
        fs::write(&blocker, b"file, not a directory").expect("write blocker");
        let store = PersistenceStore::new(blocker.join("lots.dat"), blocker.join("lots.bak"));

        assert!(!store.save(&[decorated()]));
    }
}
