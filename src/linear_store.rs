// 📋 Linear Store - unordered baseline for lookup cost
// Same records as the ordered index, scanned front to back every time

use crate::outcome::SearchOutcome;
use crate::record::FlaggedTransaction;

/// Append-ordered list of flagged transactions.
///
/// Every operation is a linear scan on purpose: this is the O(n) side of
/// the comparison, not something to optimize.
#[derive(Debug, Clone, Default)]
pub struct LinearStore {
    records: Vec<FlaggedTransaction>,
}

impl LinearStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the record with the same id in place, or append it.
    pub fn insert_or_replace(&mut self, record: FlaggedTransaction) {
        match self
            .records
            .iter_mut()
            .find(|existing| existing.transaction_id == record.transaction_id)
        {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Scan from the front, one comparison per element examined.
    pub fn search(&self, transaction_id: &str) -> SearchOutcome<'_> {
        let mut comparisons = 0;

        for record in &self.records {
            comparisons += 1;
            if record.transaction_id == transaction_id {
                return SearchOutcome::found(record, comparisons);
            }
        }

        SearchOutcome::missing(comparisons)
    }

    /// Drop the first record with this id; no-op when absent.
    pub fn remove(&mut self, transaction_id: &str) {
        if let Some(position) = self
            .records
            .iter()
            .position(|record| record.transaction_id == transaction_id)
        {
            self.records.remove(position);
        }
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Records in insertion order
    pub fn records(&self) -> &[FlaggedTransaction] {
        &self.records
    }
}

// ============================================================================
// TESTS
// ============================================================================
