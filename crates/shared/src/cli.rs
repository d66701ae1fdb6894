//! Shared CLI functionality for Harvest components
//!
//! Option groups that are flattened into component CLIs so logging and
//! metrics flags look the same everywhere.

use clap::Args;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Common logging options shared across all components
#[derive(Args, Debug, Clone)]
pub struct LoggingOptions {
    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", env = "HARVEST_LOG_LEVEL")]
    pub log_level: String,
}

/// Common metrics options shared across all components
#[derive(Args, Debug, Clone)]
pub struct MetricsOptions {
    /// Enable metrics collection and the /metrics endpoint
    #[arg(
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        env = "HARVEST_ENABLE_METRICS"
    )]
    pub enable_metrics: bool,
}

impl LoggingOptions {
    /// Initialize logging with the configured level
    ///
    /// `RUST_LOG` directives are honoured on top of the configured level.
    /// A subscriber that is already installed is reported on stderr.
    pub fn init_logging(&self) {
        let level = self.parse_log_level();

        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
            .with_target(true)
            .with_thread_ids(true)
            .with_file(level >= Level::DEBUG)
            .with_line_number(level >= Level::DEBUG)
            .finish();

        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }
    }

    /// Parse the log level string into a tracing Level
    pub fn parse_log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        let opts = LoggingOptions {
            log_level: "debug".to_string(),
        };
        assert_eq!(opts.parse_log_level(), Level::DEBUG);

        let opts = LoggingOptions {
            log_level: "ERROR".to_string(),
        };
        assert_eq!(opts.parse_log_level(), Level::ERROR);

        let opts = LoggingOptions {
            log_level: "invalid".to_string(),
        };
        assert_eq!(opts.parse_log_level(), Level::INFO);
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        let opts = LoggingOptions {
            log_level: "warn".to_string(),
        };
        opts.init_logging();
        opts.init_logging();
    }
}
