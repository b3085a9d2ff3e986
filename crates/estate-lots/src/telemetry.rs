use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Targets that receive the configured level; everything else logs warnings only.
const LOT_TARGETS: [&str; 2] = ["estate_lots", "estate_lots_cli"];

#[derive(Debug)]
pub enum TelemetryError {
    Filter { directives: String, source: ParseError },
    Install(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Filter { directives, .. } => {
                write!(f, "LOTS_LOG_LEVEL produced an invalid filter '{directives}'")
            }
            TelemetryError::Install(err) => write!(f, "could not install lot logging: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Filter { source, .. } => Some(source),
            TelemetryError::Install(err) => Some(&**err),
        }
    }
}

/// Expands a bare level (`debug`) into per-crate directives for the lot crates. Values
/// that already name targets (`estate_lots::inventory=trace`) pass through unchanged.
pub fn lot_directives(log_level: &str) -> String {
    let level = log_level.trim();
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }

    let mut directives = String::from("warn");
    for target in LOT_TARGETS {
        directives.push_str(&format!(",{target}={level}"));
    }
    directives
}

/// Installs the global subscriber on stderr. `RUST_LOG` overrides `LOTS_LOG_LEVEL`.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directives = lot_directives(&config.log_level);
            EnvFilter::try_new(&directives)
                .map_err(|source| TelemetryError::Filter { directives, source })?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Install)
}
