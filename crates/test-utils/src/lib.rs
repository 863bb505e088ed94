//! Shared test utilities for the precip-series workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic grid generators on MRMS-like axes
//! - Snapshot fixture writers (plain, gzip-wrapped, unreadable)
//! - Approximate floating-point assertions
//! - A tracing subscriber for test output
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, SnapshotDir};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Install a fmt subscriber writing through the test harness.
///
/// Honors `RUST_LOG`, defaulting to `warn`. Safe to call from every test.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Approximate equality for a series value that must be present.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_some_approx_eq;
///
/// assert_some_approx_eq!(Some(2.0001), 2.0, 0.001);
/// ```
#[macro_export]
macro_rules! assert_some_approx_eq {
    ($value:expr, $expected:expr, $epsilon:expr) => {{
        match $value {
            Some(v) => $crate::assert_approx_eq!(v, $expected, $epsilon),
            None => panic!("assertion failed: expected Some(≈{:?}), got None", $expected),
        }
    }};
}
