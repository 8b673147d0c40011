//! # Avalanche DAG Test Suite
//!
//! Cross-crate integration flows: the sampling crate driving quorum draws
//! inside the DAG consensus engine.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs      # End-to-end vertex processing scenarios
//!     └── sampling.rs   # Sampler statistics through the public API
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p av-tests
//! RUST_LOG=debug cargo test -p av-tests integration::flows
//! ```

pub mod integration;

/// Install a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
