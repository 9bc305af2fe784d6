// 🚩 Flagged Transaction - the record held by both containers
// Keyed by transaction_id; everything else is payload that a re-insert replaces

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// FLAGGED TRANSACTION
// ============================================================================

/// A suspicious transaction flagged for review.
///
/// Records are plain values: each container owns its own copy, and a
/// duplicate insert swaps the whole payload rather than patching fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedTransaction {
    /// Ordering key (byte-wise lexicographic, no case folding)
    pub transaction_id: String,

    /// Transaction amount
    pub amount: f64,

    /// When the transaction was flagged
    pub flagged_at: DateTime<Utc>,

    /// Why it was flagged
    #[serde(default)]
    pub reason: Option<String>,
}

impl FlaggedTransaction {
    /// Create a record flagged right now
    pub fn new(transaction_id: impl Into<String>, amount: f64, reason: Option<String>) -> Self {
        Self::flagged_at(transaction_id, amount, Utc::now(), reason)
    }

    /// Create a record with an explicit flag time
    pub fn flagged_at(
        transaction_id: impl Into<String>,
        amount: f64,
        flagged_at: DateTime<Utc>,
        reason: Option<String>,
    ) -> Self {
        FlaggedTransaction {
            transaction_id: transaction_id.into(),
            amount,
            flagged_at,
            reason,
        }
    }

    /// The ordering key
    pub fn key(&self) -> &str {
        &self.transaction_id
    }

    /// True when this record may enter an index
    pub fn has_valid_key(&self) -> bool {
        is_valid_key(&self.transaction_id)
    }
}

/// Identifiers that are empty or whitespace-only are unusable as keys.
pub fn is_valid_key(transaction_id: &str) -> bool {
    !transaction_id.chars().all(is_blank_char)
}

/// Whitespace for key validation: ASCII controls 9-13 and 28-31, space,
/// and Unicode space separators. No-break spaces and NEL count as content.
fn is_blank_char(c: char) -> bool {
    match c {
        '\u{00A0}' | '\u{2007}' | '\u{202F}' | '\u{0085}' => false,
        '\u{001C}'..='\u{001F}' => true,
        c => c.is_whitespace(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
