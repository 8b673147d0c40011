//! Ports for the Sampling subsystem
//!
//! Samplers have no outbound dependencies; only driving ports exist.

pub mod inbound;

pub use inbound::*;
