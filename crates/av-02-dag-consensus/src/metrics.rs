//! # DAG Consensus Metrics
//!
//! Prometheus metrics for the vertex processing engine.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! av-02-dag-consensus = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `dag_vertices_accepted_total` - Counter of accepted vertices
//! - `dag_vertices_rejected_total` - Counter of rejected vertices (by reason)
//! - `dag_batch_waves_total` - Counter of waves evaluated by batches
//! - `dag_decision_latency_seconds` - Histogram of per-vertex decision times

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_histogram, register_int_counter, CounterVec, Histogram,
    IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total vertices accepted
    pub static ref VERTICES_ACCEPTED: IntCounter = register_int_counter!(
        "dag_vertices_accepted_total",
        "Total number of vertices accepted"
    )
    .expect("Failed to create VERTICES_ACCEPTED metric");

    /// Total vertices rejected, labeled by reason
    pub static ref VERTICES_REJECTED: CounterVec = register_counter_vec!(
        "dag_vertices_rejected_total",
        "Total number of vertices rejected",
        &["reason"]
    )
    .expect("Failed to create VERTICES_REJECTED metric");

    pub static ref BATCH_WAVES: IntCounter = register_int_counter!(
        "dag_batch_waves_total",
        "Total number of waves evaluated by batch processing"
    )
    .expect("Failed to create BATCH_WAVES metric");

    /// Time from evaluation to applied decision
    pub static ref DECISION_LATENCY: Histogram = register_histogram!(
        "dag_decision_latency_seconds",
        "Time taken to decide a vertex in seconds",
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    )
    .expect("Failed to create DECISION_LATENCY metric");
}

#[cfg(feature = "metrics")]
pub fn record_vertex_accepted() {
    VERTICES_ACCEPTED.inc();
}

/// Record a rejected vertex with reason
#[cfg(feature = "metrics")]
pub fn record_vertex_rejected(reason: &str) {
    VERTICES_REJECTED.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_wave() {
    BATCH_WAVES.inc();
}

#[cfg(feature = "metrics")]
pub fn record_decision_latency(seconds: f64) {
    DECISION_LATENCY.observe(seconds);
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_vertex_accepted() {}

#[cfg(not(feature = "metrics"))]
pub fn record_vertex_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_wave() {}

#[cfg(not(feature = "metrics"))]
pub fn record_decision_latency(_seconds: f64) {}
