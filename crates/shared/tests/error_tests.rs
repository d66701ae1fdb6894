//! Error Tests
//!
//! Tests for error construction, conversion and display.

use harvest_shared::error::HarvestError;
use std::error::Error;

#[test]
fn test_error_construction() {
    let config_err = HarvestError::configuration("test", None);
    assert!(matches!(config_err, HarvestError::Configuration { .. }));

    let network_err = HarvestError::network("127.0.0.1:5000", "address in use", None);
    assert!(matches!(network_err, HarvestError::Network { .. }));

    let internal_err = HarvestError::internal("model loading task failed", None);
    assert!(matches!(internal_err, HarvestError::Internal { .. }));
}

#[test]
fn test_error_conversion() {
    let addr_err: HarvestError = "invalid:address:format"
        .parse::<std::net::SocketAddr>()
        .unwrap_err()
        .into();
    assert!(matches!(addr_err, HarvestError::Configuration { .. }));
    assert!(addr_err.source().is_some());
}

#[test]
fn test_error_display() {
    let err = HarvestError::configuration("artifact stem must not be empty", None);
    assert_eq!(
        err.to_string(),
        "Configuration error: artifact stem must not be empty"
    );

    let err = HarvestError::network("127.0.0.1:5000", "Failed to bind to address", None);
    assert_eq!(
        err.to_string(),
        "Network error on 127.0.0.1:5000: Failed to bind to address"
    );
}
