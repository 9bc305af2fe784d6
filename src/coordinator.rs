// 🧭 Coordinator - keeps the ordered index and the linear store in lockstep
//
// Every mutation hits the ordered index first; the linear store only follows
// when the index accepted it. Queries probe both and report both costs.

use crate::linear_store::LinearStore;
use crate::ordered_index::OrderedIndex;
use crate::outcome::DeleteOutcome;
use crate::record::FlaggedTransaction;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

// ============================================================================
// SEARCH REPORT
// ============================================================================

/// Lookup result with the cost on both structures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport {
    pub found: bool,
    pub record: Option<FlaggedTransaction>,
    pub ordered_comparisons: usize,
    pub linear_comparisons: usize,
    pub linear_store_size: usize,
}

// ============================================================================
// COORDINATOR
// ============================================================================

/// One fraud-review session: an ordered index plus its linear baseline.
///
/// Holds no lock of its own. Callers sharing it across threads wrap the
/// whole coordinator (see the server's `RwLock`), so both containers are
/// guarded by a single scope.
#[derive(Debug, Clone)]
pub struct Coordinator {
    session_id: Uuid,
    index: OrderedIndex,
    store: LinearStore,
}

impl Coordinator {
    pub fn new() -> Self {
        Coordinator {
            session_id: Uuid::new_v4(),
            index: OrderedIndex::new(),
            store: LinearStore::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Flag a transaction now. Returns false for a blank id.
    pub fn insert(&mut self, transaction_id: &str, amount: f64, reason: Option<String>) -> bool {
        self.insert_record(FlaggedTransaction::new(transaction_id, amount, reason))
    }

    /// Insert an existing record into both containers.
    pub fn insert_record(&mut self, record: FlaggedTransaction) -> bool {
        if !self.index.insert(record.clone()) {
            warn!(transaction_id = %record.transaction_id, "rejected flagged transaction with blank id");
            return false;
        }

        debug!(transaction_id = %record.transaction_id, amount = record.amount, "flagged transaction stored");
        self.store.insert_or_replace(record);
        true
    }

    pub fn search(&self, transaction_id: &str) -> SearchReport {
        let ordered = self.index.search(transaction_id);
        let linear = self.store.search(transaction_id);

        SearchReport {
            found: ordered.is_found(),
            record: ordered.record.cloned(),
            ordered_comparisons: ordered.comparisons,
            linear_comparisons: linear.comparisons,
            linear_store_size: self.store.count(),
        }
    }

    pub fn delete(&mut self, transaction_id: &str) -> DeleteOutcome {
        let outcome = self.index.delete(transaction_id);

        if outcome.deleted {
            self.store.remove(transaction_id);
            debug!(
                transaction_id,
                case = outcome.case.map(|c| c.as_str()),
                "flagged transaction removed"
            );
        }

        outcome
    }

    /// Ascending by id
    pub fn list_all(&self) -> Vec<FlaggedTransaction> {
        self.index.enumerate()
    }

    pub fn size(&self) -> usize {
        self.index.count()
    }

    /// Read access to the tree, e.g. for height reporting
    pub fn index(&self) -> &OrderedIndex {
        &self.index
    }

    /// True when both containers hold exactly the same ids.
    pub fn is_consistent(&self) -> bool {
        if self.index.count() != self.store.count() {
            return false;
        }

        let mut linear_ids: Vec<&str> = self.store.records().iter().map(|r| r.key()).collect();
        linear_ids.sort_unstable();

        self.index.iter().map(|r| r.key()).eq(linear_ids.into_iter())
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
