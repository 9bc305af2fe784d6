// 📏 Operation outcomes - what a lookup cost and what a delete changed

use crate::record::FlaggedTransaction;
use serde::{Deserialize, Serialize};

// ============================================================================
// SEARCH OUTCOME
// ============================================================================

/// Result of a keyed lookup plus the number of key comparisons it took.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome<'a> {
    pub record: Option<&'a FlaggedTransaction>,
    pub comparisons: usize,
}

impl<'a> SearchOutcome<'a> {
    pub fn found(record: &'a FlaggedTransaction, comparisons: usize) -> Self {
        SearchOutcome {
            record: Some(record),
            comparisons,
        }
    }

    pub fn missing(comparisons: usize) -> Self {
        SearchOutcome {
            record: None,
            comparisons,
        }
    }

    pub fn is_found(&self) -> bool {
        self.record.is_some()
    }
}

// ============================================================================
// DELETION CASE
// ============================================================================

/// Topology of the node that was removed, by child count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeletionCase {
    /// No children: the parent link is cleared
    Leaf,

    /// One child: the child takes the node's place
    SingleChild,

    /// Two children: the in-order successor's payload moves up
    TwoChildren,
}

impl DeletionCase {
    /// Classify by child presence
    pub fn classify(has_left: bool, has_right: bool) -> Self {
        match (has_left, has_right) {
            (false, false) => DeletionCase::Leaf,
            (true, true) => DeletionCase::TwoChildren,
            _ => DeletionCase::SingleChild,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionCase::Leaf => "leaf",
            DeletionCase::SingleChild => "singleChild",
            DeletionCase::TwoChildren => "twoChildren",
        }
    }
}

// ============================================================================
// DELETE OUTCOME
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted: bool,

    /// `None` whenever nothing was deleted
    #[serde(rename = "structuralCase")]
    pub case: Option<DeletionCase>,
}

impl DeleteOutcome {
    pub fn removed(case: DeletionCase) -> Self {
        DeleteOutcome {
            deleted: true,
            case: Some(case),
        }
    }

    pub fn not_found() -> Self {
        DeleteOutcome {
            deleted: false,
            case: None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
