//! # Sequential Index (Brute-Force Baseline)
//!
//! A doubly linked list whose nodes live in a flat arena and link to each other
//! by slot index. Slot 0 is a sentinel head that never carries data, so the
//! list is empty exactly when the sentinel has no successor.
//!
//! Query cost is always one comparison per stored vector.

use log::info;

use crate::index::{QueryResult, VectorIndex};
use crate::vector::FeatureVector;

const SENTINEL: usize = 0;

#[derive(Debug, Clone)]
struct ListNode {
    /// `None` only for the sentinel and for freed slots.
    data: Option<FeatureVector>,
    prev: Option<usize>,
    next: Option<usize>,
}

impl ListNode {
    fn sentinel() -> Self {
        Self { data: None, prev: None, next: None }
    }
}

pub struct SequentialIndex {
    // The "Node Arena": links are slot indices, not pointers.
    nodes: Vec<ListNode>,
    /// Most recently appended node, or `SENTINEL` when empty.
    tail: usize,
    /// Slots released by `pop_*`, recycled before the arena grows.
    free: Vec<usize>,
    len: usize,
}

impl SequentialIndex {
    pub fn new() -> Self {
        info!("Initializing Sequential Index (doubly linked list)");
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity + 1);
        nodes.push(ListNode::sentinel());
        Self { nodes, tail: SENTINEL, free: Vec::new(), len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[SENTINEL].next.is_none()
    }

    fn alloc(&mut self, vector: FeatureVector) -> usize {
        let node = ListNode { data: Some(vector), prev: None, next: None };
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, slot: usize) -> Option<FeatureVector> {
        let data = self.nodes[slot].data.take();
        self.nodes[slot].prev = None;
        self.nodes[slot].next = None;
        self.free.push(slot);
        self.len -= 1;
        data
    }

    /// Appends at the tail in O(1).
    pub fn push_back(&mut self, vector: FeatureVector) {
        let slot = self.alloc(vector);
        self.nodes[slot].prev = Some(self.tail);
        self.nodes[self.tail].next = Some(slot);
        self.tail = slot;
        self.len += 1;
    }

    /// Inserts right after the sentinel in O(1).
    pub fn push_front(&mut self, vector: FeatureVector) {
        let slot = self.alloc(vector);
        let first = self.nodes[SENTINEL].next;
        self.nodes[slot].prev = Some(SENTINEL);
        self.nodes[slot].next = first;
        match first {
            Some(first) => self.nodes[first].prev = Some(slot),
            None => self.tail = slot,
        }
        self.nodes[SENTINEL].next = Some(slot);
        self.len += 1;
    }

    /// Removes the first vector, `None` when empty.
    pub fn pop_front(&mut self) -> Option<FeatureVector> {
        let first = self.nodes[SENTINEL].next?;
        let after = self.nodes[first].next;
        self.nodes[SENTINEL].next = after;
        match after {
            Some(after) => self.nodes[after].prev = Some(SENTINEL),
            None => self.tail = SENTINEL,
        }
        self.release(first)
    }

    /// Removes the last vector, `None` when empty.
    pub fn pop_back(&mut self) -> Option<FeatureVector> {
        if self.tail == SENTINEL {
            return None;
        }
        let last = self.tail;
        let before = self.nodes[last].prev.unwrap_or(SENTINEL);
        self.nodes[before].next = None;
        self.tail = before;
        self.release(last)
    }

    pub fn front(&self) -> Option<&FeatureVector> {
        let first = self.nodes[SENTINEL].next?;
        self.nodes[first].data.as_ref()
    }

    pub fn back(&self) -> Option<&FeatureVector> {
        self.nodes[self.tail].data.as_ref()
    }

    /// Walks the chain from the sentinel's successor.
    pub fn iter(&self) -> Iter<'_> {
        Iter { nodes: &self.nodes, cursor: self.nodes[SENTINEL].next }
    }
}

impl Default for SequentialIndex {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Iter<'a> {
    nodes: &'a [ListNode],
    cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a FeatureVector;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = &self.nodes[slot];
        self.cursor = node.next;
        node.data.as_ref()
    }
}

impl VectorIndex for SequentialIndex {
    fn insert(&mut self, vector: FeatureVector) {
        self.push_back(vector);
    }

    fn query(&self, query: &FeatureVector, k: usize) -> QueryResult {
        let mut result = QueryResult::empty();
        if self.is_empty() || k == 0 {
            return result;
        }

        let mut scored: Vec<(f64, FeatureVector)> = Vec::with_capacity(self.len);
        for vector in self.iter() {
            scored.push((query.distance_to(vector), *vector));
            result.comparisons += 1;
        }

        // Stable: exact ties keep list order.
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        result.neighbors = scored.into_iter().take(k).map(|(_, v)| v).collect();
        result
    }

    fn len(&self) -> usize {
        self.len
    }

    fn name(&self) -> &'static str {
        "list"
    }
}
