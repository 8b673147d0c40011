//! Algorithms module for DAG Consensus
//!
//! Contains:
//! - Dependency resolver (readiness, cascading rejection, nonce links)
//! - Conflict detector (shared spend inputs)
//! - Wave planner (height levels)
//! - Decision rules

pub mod conflict_detector;
pub mod decision;
pub mod dependency_resolver;
pub mod wave_planner;

pub use conflict_detector::{detect_conflicts, Conflict};
pub use decision::{rule_from_config, ConfidenceRule, DecisionRule, MajorityRule};
pub use dependency_resolver::{link_nonce_dependencies, missing_dependencies, resolve, Resolution};
pub use wave_planner::{plan_waves, submission_order, PendingVertex, Wave};
