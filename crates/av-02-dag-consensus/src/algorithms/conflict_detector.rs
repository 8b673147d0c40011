//! Conflict Detector
//!
//! Finds double-spend candidates: transactions consuming the same spend
//! input. Conflicts are reported as data; resolving them is up to the vote.

use crate::domain::capabilities::Decidable;
use crate::domain::transaction::Transaction;
use crate::domain::value_objects::{Hash, TxId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Two transactions sharing an input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub tx1: TxId,
    pub tx2: TxId,
    pub input: Hash,
}

/// Detect all conflicting pairs, in input order.
pub fn detect_conflicts(transactions: &[Transaction]) -> Vec<Conflict> {
    let mut by_input: HashMap<Hash, Vec<TxId>> = HashMap::new();
    let mut order: Vec<Hash> = Vec::new();

    for tx in transactions {
        let input = Transaction::spend_input(tx.sender(), tx.nonce());
        let spenders = by_input.entry(input).or_default();
        if spenders.is_empty() {
            order.push(input);
        }
        if !spenders.contains(&tx.id()) {
            spenders.push(tx.id());
        }
    }

    let mut conflicts = Vec::new();
    for input in order {
        let Some(spenders) = by_input.get(&input) else {
            continue;
        };
        for i in 0..spenders.len() {
            for j in (i + 1)..spenders.len() {
                conflicts.push(Conflict {
                    tx1: spenders[i],
                    tx2: spenders[j],
                    input,
                });
            }
        }
    }
    conflicts
}

/// Share of transaction pairs in conflict, as a percentage.
pub fn conflict_percentage(conflicts: &[Conflict], tx_count: usize) -> u8 {
    if tx_count <= 1 {
        return 0;
    }
    let max_pairs = tx_count * (tx_count - 1) / 2;
    let percent = (conflicts.len() * 100) / max_pairs;
    percent.min(100) as u8
}
