//! Test Utilities
//!
//! Helpers shared by integration tests that bind real sockets.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};

/// Global port counter to ensure unique ports across all tests
static GLOBAL_TEST_PORT_COUNTER: AtomicU16 = AtomicU16::new(50000);

/// Generate a unique port address for testing to avoid conflicts
///
/// Uses a global atomic counter starting at port 50000 and wrapping back to
/// 50000 after 64000.
pub fn get_random_port_addr() -> SocketAddr {
    let port = GLOBAL_TEST_PORT_COUNTER.fetch_add(1, Ordering::SeqCst);
    let port = if port > 64000 {
        GLOBAL_TEST_PORT_COUNTER.store(50001, Ordering::SeqCst);
        50000
    } else {
        port
    };

    SocketAddr::from(([127, 0, 0, 1], port))
}
