use crate::domain::capabilities::Decidable;
use crate::domain::errors::StorageError;
use crate::domain::transaction::Transaction;
use crate::domain::value_objects::{Hash, TxId, VertexId};
use crate::domain::vertex::Vertex;
use crate::ports::DagStorage;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory implementation of DagStorage
#[derive(Default)]
pub struct InMemoryDagStorage {
    vertices: RwLock<HashMap<VertexId, Vertex>>,
    transactions: RwLock<HashMap<TxId, Transaction>>,
}

impl InMemoryDagStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.read().len()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.read().len()
    }
}

fn check_key(key: &Hash) -> Result<(), StorageError> {
    if key.is_zero() {
        return Err(StorageError::EmptyKey);
    }
    Ok(())
}

impl DagStorage for InMemoryDagStorage {
    fn put_vertex(&self, vertex: &Vertex) -> Result<(), StorageError> {
        check_key(&vertex.id())?;
        self.vertices.write().insert(vertex.id(), vertex.clone());
        Ok(())
    }

    fn get_vertex(&self, id: &VertexId) -> Result<Option<Vertex>, StorageError> {
        check_key(id)?;
        Ok(self.vertices.read().get(id).cloned())
    }

    fn put_transaction(&self, tx: &Transaction) -> Result<(), StorageError> {
        check_key(&tx.id())?;
        self.transactions.write().insert(tx.id(), tx.clone());
        Ok(())
    }

    fn get_transaction(&self, id: &TxId) -> Result<Option<Transaction>, StorageError> {
        check_key(id)?;
        Ok(self.transactions.read().get(id).cloned())
    }
}
