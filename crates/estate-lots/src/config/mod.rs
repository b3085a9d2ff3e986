use std::env;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DATA_FILE: &str = "real_estate_data.dat";
const DEFAULT_BACKUP_FILE: &str = "real_estate_data.bak";
const DEFAULT_CACHE_SIZE: usize = 50;
const DEFAULT_CACHE_EXPIRATION_MS: u64 = 30_000;

/// Top-level configuration for the lot inventory.
#[derive(Debug, Clone, Default)]
pub struct InventoryConfig {
    pub data: DataConfig,
    pub cache: CacheConfig,
    pub telemetry: TelemetryConfig,
}

impl InventoryConfig {
    /// Reads `.env` (if present) and the `LOTS_*` environment variables, falling back to
    /// defaults for anything unset.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let file = env::var("LOTS_DATA_FILE").unwrap_or_else(|_| DEFAULT_DATA_FILE.to_string());
        let backup =
            env::var("LOTS_BACKUP_FILE").unwrap_or_else(|_| DEFAULT_BACKUP_FILE.to_string());

        let size = match env::var("LOTS_CACHE_SIZE") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(NonZeroUsize::new)
                .ok_or(ConfigError::InvalidCacheSize(raw))?,
            Err(_) => CacheConfig::default().size,
        };
        let expiration = match env::var("LOTS_CACHE_EXPIRATION_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidCacheExpiration(raw))?,
            Err(_) => CacheConfig::default().expiration,
        };

        let log_level = env::var("LOTS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            data: DataConfig {
                file: PathBuf::from(file),
                backup: PathBuf::from(backup),
            },
            cache: CacheConfig { size, expiration },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Location of the persisted inventory and its backup copy.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub file: PathBuf,
    pub backup: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_DATA_FILE),
            backup: PathBuf::from(DEFAULT_BACKUP_FILE),
        }
    }
}

/// Search cache bounds.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub size: NonZeroUsize,
    pub expiration: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            size: NonZeroUsize::new(DEFAULT_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
            expiration: Duration::from_millis(DEFAULT_CACHE_EXPIRATION_MS),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidCacheSize(String),
    InvalidCacheExpiration(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidCacheSize(raw) => {
                write!(f, "LOTS_CACHE_SIZE must be a positive integer, got '{raw}'")
            }
            ConfigError::InvalidCacheExpiration(raw) => write!(
                f,
                "LOTS_CACHE_EXPIRATION_MS must be a whole number of milliseconds, got '{raw}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("LOTS_DATA_FILE");
        env::remove_var("LOTS_BACKUP_FILE");
        env::remove_var("LOTS_CACHE_SIZE");
        env::remove_var("LOTS_CACHE_EXPIRATION_MS");
        env::remove_var("LOTS_LOG_LEVEL");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = InventoryConfig::load().expect("config loads with defaults");
        assert_eq!(config.data.file, PathBuf::from("real_estate_data.dat"));
        assert_eq!(config.data.backup, PathBuf::from("real_estate_data.bak"));
        assert_eq!(config.cache.size.get(), 50);
        assert_eq!(config.cache.expiration, Duration::from_secs(30));
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn load_reads_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LOTS_DATA_FILE", "/tmp/lots.json");
        env::set_var("LOTS_CACHE_SIZE", "5");
        env::set_var("LOTS_CACHE_EXPIRATION_MS", "250");
        let config = InventoryConfig::load().expect("config loads");
        reset_env();
        assert_eq!(config.data.file, PathBuf::from("/tmp/lots.json"));
        assert_eq!(config.cache.size.get(), 5);
        assert_eq!(config.cache.expiration, Duration::from_millis(250));
    }

    #[test]
    fn rejects_zero_cache_size() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LOTS_CACHE_SIZE", "0");
        let result = InventoryConfig::load();
        reset_env();
        assert!(matches!(result, Err(ConfigError::InvalidCacheSize(raw)) if raw == "0"));
    }

    #[test]
    fn rejects_non_numeric_expiration() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LOTS_CACHE_EXPIRATION_MS", "soon");
        let result = InventoryConfig::load();
        reset_env();
        assert!(matches!(result, Err(ConfigError::InvalidCacheExpiration(_))));
    }
}
