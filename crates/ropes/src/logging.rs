//! Subscriber setup for binaries.
//!
//! Libraries in this workspace only emit `tracing` events. Binaries call
//! [`init`] once at startup. The filter comes from `ROPES_LOG` when set and
//! from [`RopesConfig::log_filter`] otherwise. Output goes to stderr.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogFormat, RopesConfig};
use crate::error::{Result, RopesError};

pub const ENV_VAR: &str = "ROPES_LOG";

/// Build the filter `init` would install.
pub fn filter(config: &RopesConfig) -> Result<EnvFilter> {
    let directives = std::env::var(ENV_VAR).unwrap_or_else(|_| config.log_filter.clone());
    EnvFilter::try_new(&directives).map_err(|err| RopesError::LogFilter {
        filter: directives,
        message: err.to_string(),
    })
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &RopesConfig) -> Result<()> {
    let filter = filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.log_format {
        LogFormat::Human => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    installed.map_err(|err| RopesError::Logging(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filter_is_reported() {
        if std::env::var_os(ENV_VAR).is_some() {
            return;
        }
        let config = RopesConfig {
            log_filter: "ropes=notalevel".to_string(),
            ..RopesConfig::default()
        };
        assert!(matches!(filter(&config), Err(RopesError::LogFilter { .. })));
    }

    #[test]
    fn config_filter_is_used_without_env() {
        if std::env::var_os(ENV_VAR).is_some() {
            return;
        }
        let config = RopesConfig {
            log_filter: "warn,ropes_load=debug".to_string(),
            ..RopesConfig::default()
        };
        let filter = filter(&config).expect("valid filter");
        assert!(filter.to_string().contains("ropes_load=debug"));
    }
}
