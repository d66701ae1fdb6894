//! CLI Tests
//!
//! Tests for the shared clap option groups.

use clap::Parser;
use harvest_shared::cli::{LoggingOptions, MetricsOptions};
use tracing::Level;

#[derive(Parser, Debug)]
struct TestCli {
    #[command(flatten)]
    logging: LoggingOptions,

    #[command(flatten)]
    metrics: MetricsOptions,
}

#[test]
fn test_parse_log_level() {
    let opts = LoggingOptions {
        log_level: "trace".to_string(),
    };
    assert_eq!(opts.parse_log_level(), Level::TRACE);

    let opts = LoggingOptions {
        log_level: "Warn".to_string(),
    };
    assert_eq!(opts.parse_log_level(), Level::WARN);
}

#[test]
fn test_flattened_options_parse() {
    let cli = TestCli::parse_from(["test", "--log-level", "debug", "--enable-metrics", "false"]);
    assert_eq!(cli.logging.log_level, "debug");
    assert!(!cli.metrics.enable_metrics);
}
