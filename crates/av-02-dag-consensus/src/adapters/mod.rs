//! # Adapters Layer (Hexagonal Architecture)
//!
//! Default implementations of the outbound ports.

mod memory_storage;
mod signature;
mod votes;

pub use memory_storage::InMemoryDagStorage;
pub use signature::{StructuralSignatureVerifier, MAX_SIGNATURE_LEN};
pub use votes::LocalPreference;
