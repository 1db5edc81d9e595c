//! Lookup of project contracts by funding transaction.
//!
//! Child links reference projects by `fund_tx`. The index is built once per
//! snapshot so every join is a hash lookup rather than a scan.

use std::collections::HashMap;

use crate::model::ProjectContract;

/// `fund_tx` -> project contract, borrowed from one snapshot.
///
/// Upstream should never repeat a `fund_tx`; if it does, the later contract
/// replaces the earlier one.
#[derive(Debug, Default)]
pub struct ProjectIndex<'a> {
    by_fund_tx: HashMap<&'a str, &'a ProjectContract>,
}

impl<'a> ProjectIndex<'a> {
    pub fn new(contracts: &'a [ProjectContract]) -> Self {
        let mut by_fund_tx = HashMap::with_capacity(contracts.len());
        for contract in contracts {
            by_fund_tx.insert(contract.fund_tx.as_str(), contract);
        }
        Self { by_fund_tx }
    }

    /// Project funded by `fund_tx`, or `None` for an orphan link.
    pub fn get(&self, fund_tx: &str) -> Option<&'a ProjectContract> {
        self.by_fund_tx.get(fund_tx).copied()
    }

    pub fn contains(&self, fund_tx: &str) -> bool {
        self.by_fund_tx.contains_key(fund_tx)
    }

    pub fn len(&self) -> usize {
        self.by_fund_tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_fund_tx.is_empty()
    }
}
