//! Per-query search bookkeeping.
//!
//! Search-local fields (g, h, parent, open/closed) live in a sparse map
//! keyed by node index, never on the shared graph nodes. The graph stays
//! read-only during search, so repeated and batched queries cannot corrupt
//! each other through leftover per-node state.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum NodeStatus {
  Open,
  Closed,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct NodeRecord {
  pub g: f32,
  pub h: f32,
  pub f: f32,
  pub parent: i32,
  pub status: NodeStatus,
}

/// Heap entry; the heap may hold stale duplicates for a node whose record
/// was improved after insertion. `SearchState::pop` filters those out by
/// comparing against the record's current `f`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct OpenEntry {
  pub f: f32,
  pub index: i32,
}

impl PartialEq for OpenEntry {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for OpenEntry {
  // Reversed so the max-heap pops the lowest f first. total_cmp keeps the
  // order strict and total even for pathological float inputs; the index
  // tie-break only makes results deterministic.
  fn cmp(&self, other: &Self) -> Ordering {
    other
      .f
      .total_cmp(&self.f)
      .then_with(|| other.index.cmp(&self.index))
  }
}

/// The mutable state of one (possibly multi-destination) query.
pub(crate) struct SearchState {
  pub records: HashMap<i32, NodeRecord>,
  open: BinaryHeap<OpenEntry>,
}

impl SearchState {
  pub fn new() -> Self {
    Self {
      records: HashMap::new(),
      open: BinaryHeap::new(),
    }
  }

  /// Insert or improve a node's record and (re)queue it.
  pub fn open_node(&mut self, index: i32, g: f32, h: f32, parent: i32) {
    let record = NodeRecord {
      g,
      h,
      f: g + h,
      parent,
      status: NodeStatus::Open,
    };
    self.records.insert(index, record);
    self.open.push(OpenEntry { f: record.f, index });
  }

  /// Pop the best open node, skipping stale heap entries.
  pub fn pop(&mut self) -> Option<i32> {
    while let Some(entry) = self.open.pop() {
      let Some(record) = self.records.get(&entry.index) else {
        continue;
      };
      if record.status == NodeStatus::Open && record.f == entry.f {
        return Some(entry.index);
      }
    }
    None
  }

  pub fn close(&mut self, index: i32) {
    if let Some(record) = self.records.get_mut(&index) {
      record.status = NodeStatus::Closed;
    }
  }

  pub fn is_closed(&self, index: i32) -> bool {
    self
      .records
      .get(&index)
      .is_some_and(|record| record.status == NodeStatus::Closed)
  }

  /// Re-key every open record's h and f against a new destination and
  /// rebuild the heap. This is what lets one batch phase resume from the
  /// exploration the previous phases already paid for.
  pub fn retarget(&mut self, heuristic: impl Fn(i32) -> f32) {
    self.open.clear();
    for (&index, record) in self.records.iter_mut() {
      if record.status == NodeStatus::Open {
        record.h = heuristic(index);
        record.f = record.g + record.h;
        self.open.push(OpenEntry {
          f: record.f,
          index,
        });
      }
    }
  }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;
