// 🌳 Ordered Index - unbalanced binary search tree over flagged transactions
//
// Nodes live in an arena and link to each other by slot index, so every
// node has exactly one owner link (its parent's child slot, or the root).
// Height follows insertion order; no rebalancing is ever done.

use crate::outcome::{DeleteOutcome, DeletionCase, SearchOutcome};
use crate::record::{is_valid_key, FlaggedTransaction};
use std::cmp::Ordering;

// ============================================================================
// NODE ARENA
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    record: FlaggedTransaction,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Where a node hangs: `None` is the root slot.
type Link = Option<(NodeId, Side)>;

// ============================================================================
// ORDERED INDEX
// ============================================================================

/// Binary search tree keyed by transaction id.
///
/// Invariant: every id in a node's left subtree sorts before the node's id,
/// every id in its right subtree sorts after it, and `count` equals the
/// number of reachable nodes.
#[derive(Debug, Clone, Default)]
pub struct OrderedIndex {
    slots: Vec<Option<Node>>,
    vacant: Vec<usize>,
    root: Option<NodeId>,
    count: usize,
}

impl OrderedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, or replace the payload stored under its id.
    ///
    /// Returns false (and changes nothing) for a blank id.
    pub fn insert(&mut self, record: FlaggedTransaction) -> bool {
        if !record.has_valid_key() {
            return false;
        }

        let mut parent: Link = None;
        let mut cursor = self.root;

        while let Some(id) = cursor {
            let node = self.node_mut(id);
            match record.key().cmp(node.record.key()) {
                Ordering::Equal => {
                    node.record = record;
                    return true;
                }
                Ordering::Less => {
                    parent = Some((id, Side::Left));
                    cursor = node.left;
                }
                Ordering::Greater => {
                    parent = Some((id, Side::Right));
                    cursor = node.right;
                }
            }
        }

        let id = self.allocate(record);
        self.set_link(parent, Some(id));
        self.count += 1;
        true
    }

    /// Look up a record, counting one comparison per node visited
    /// (the matching node included).
    pub fn search(&self, transaction_id: &str) -> SearchOutcome<'_> {
        if !is_valid_key(transaction_id) {
            return SearchOutcome::missing(0);
        }

        let mut comparisons = 0;
        let mut cursor = self.root;

        while let Some(id) = cursor {
            comparisons += 1;
            let node = self.node(id);
            match transaction_id.cmp(node.record.key()) {
                Ordering::Equal => return SearchOutcome::found(&node.record, comparisons),
                Ordering::Less => cursor = node.left,
                Ordering::Greater => cursor = node.right,
            }
        }

        SearchOutcome::missing(comparisons)
    }

    /// Remove the record under `transaction_id` and report which
    /// structural case the removal took.
    pub fn delete(&mut self, transaction_id: &str) -> DeleteOutcome {
        if !is_valid_key(transaction_id) || self.root.is_none() {
            return DeleteOutcome::not_found();
        }

        let Some((target, parent)) = self.locate(transaction_id) else {
            return DeleteOutcome::not_found();
        };

        let (left, right) = {
            let node = self.node(target);
            (node.left, node.right)
        };
        let case = DeletionCase::classify(left.is_some(), right.is_some());

        match (left, right) {
            (None, None) => {
                self.set_link(parent, None);
                self.release(target);
            }
            (Some(child), None) | (None, Some(child)) => {
                self.set_link(parent, Some(child));
                self.release(target);
            }
            (Some(_), Some(right)) => self.splice_successor(target, right),
        }

        self.count -= 1;
        DeleteOutcome::removed(case)
    }

    /// All records in ascending id order (a fresh snapshot each call).
    pub fn enumerate(&self) -> Vec<FlaggedTransaction> {
        self.iter().cloned().collect()
    }

    /// In-order traversal without recursion; a degenerate chain is as deep
    /// as the tree is large.
    pub fn iter(&self) -> InOrder<'_> {
        InOrder {
            index: self,
            stack: Vec::new(),
            cursor: self.root,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The record at the root, if any
    pub fn root(&self) -> Option<&FlaggedTransaction> {
        self.root.map(|id| &self.node(id).record)
    }

    /// Nodes on the longest root-to-leaf path (0 when empty)
    pub fn height(&self) -> usize {
        let mut tallest = 0;
        let mut pending: Vec<(NodeId, usize)> = self.root.map(|id| (id, 1)).into_iter().collect();

        while let Some((id, depth)) = pending.pop() {
            tallest = tallest.max(depth);
            let node = self.node(id);
            pending.extend(node.left.map(|child| (child, depth + 1)));
            pending.extend(node.right.map(|child| (child, depth + 1)));
        }

        tallest
    }

    // ========================================================================
    // STRUCTURAL HELPERS
    // ========================================================================

    /// Find a node and the link it hangs from.
    fn locate(&self, transaction_id: &str) -> Option<(NodeId, Link)> {
        let mut parent: Link = None;
        let mut cursor = self.root;

        while let Some(id) = cursor {
            let node = self.node(id);
            match transaction_id.cmp(node.record.key()) {
                Ordering::Equal => return Some((id, parent)),
                Ordering::Less => {
                    parent = Some((id, Side::Left));
                    cursor = node.left;
                }
                Ordering::Greater => {
                    parent = Some((id, Side::Right));
                    cursor = node.right;
                }
            }
        }

        None
    }

    /// Two-children case: one step right, then left to the end. The
    /// successor's payload moves into `target`, and the successor (never
    /// with a left child) is unhooked as a leaf or single-child node.
    fn splice_successor(&mut self, target: NodeId, right: NodeId) {
        let mut successor_parent = target;
        let mut successor = right;

        while let Some(next) = self.node(successor).left {
            successor_parent = successor;
            successor = next;
        }

        let detached = self.release(successor);

        // Successor directly under target hangs off target's right link
        let side = if successor_parent == target {
            Side::Right
        } else {
            Side::Left
        };
        self.set_link(Some((successor_parent, side)), detached.right);

        self.node_mut(target).record = detached.record;
    }

    fn set_link(&mut self, link: Link, child: Option<NodeId>) {
        match link {
            None => self.root = child,
            Some((parent, Side::Left)) => self.node_mut(parent).left = child,
            Some((parent, Side::Right)) => self.node_mut(parent).right = child,
        }
    }

    fn allocate(&mut self, record: FlaggedTransaction) -> NodeId {
        let node = Node {
            record,
            left: None,
            right: None,
        };

        match self.vacant.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Node {
        let node = self.slots[id.0]
            .take()
            .expect("released node id points at a vacant slot");
        self.vacant.push(id.0);
        node
    }

    fn node(&self, id: NodeId) -> &Node {
        self.slots[id.0]
            .as_ref()
            .expect("linked node id points at a vacant slot")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.slots[id.0]
            .as_mut()
            .expect("linked node id points at a vacant slot")
    }
}

// ============================================================================
// IN-ORDER ITERATOR
// ============================================================================

/// Left subtree, node, right subtree.
pub struct InOrder<'a> {
    index: &'a OrderedIndex,
    stack: Vec<NodeId>,
    cursor: Option<NodeId>,
}

impl<'a> Iterator for InOrder<'a> {
    type Item = &'a FlaggedTransaction;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.cursor {
            self.stack.push(id);
            self.cursor = self.index.node(id).left;
        }

        let id = self.stack.pop()?;
        let node = self.index.node(id);
        self.cursor = node.right;
        Some(&node.record)
    }
}

// ============================================================================
// TESTS
// ============================================================================
