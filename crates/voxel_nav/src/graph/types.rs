//! Nodes, arcs, the graph container, and the temporary node manager.

use std::collections::HashMap;

use glam::Vec3;
use smallvec::SmallVec;

use crate::octree::{Octree, CHILD_OFFSETS};

/// Directed edge between two graph nodes.
///
/// `distance` is the Euclidean length unless overridden; temporary splices
/// use unit arcs. Reverse arcs are added explicitly by construction and are
/// never deduplicated against each other.
#[derive(Clone, Copy, Debug)]
pub struct NavArc {
  pub from: i32,
  pub to: i32,
  pub distance: f32,
}

/// One navigation waypoint.
///
/// Permanent nodes use indices `0..n`; temporary nodes use `-1, -2, ...` so
/// they can be bulk-purged by identity.
#[derive(Clone, Debug)]
pub struct NavNode {
  pub index: i32,
  pub position: Vec3,
  /// Outgoing arcs, owned by the node.
  pub arcs: Vec<NavArc>,
  /// Connected-component label; two nodes can only be mutually reachable
  /// when their labels match.
  pub connect_index: i32,
}

impl NavNode {
  pub(crate) fn new(index: i32, position: Vec3) -> Self {
    Self {
      index,
      position,
      arcs: Vec::new(),
      connect_index: -1,
    }
  }
}

/// Reverse lookup from octree coordinates to permanent node indices, used to
/// find the nodes bounding a cell.
#[derive(Clone, Debug)]
pub enum NodeLookup {
  /// Center graphs: `(level, cell index) -> node`.
  Center(HashMap<(i32, [i32; 3]), i32>),
  /// Corner graphs: absolute finest-grid corner coordinate -> node. A full
  /// width tuple key; packing coordinates into one shifted integer would
  /// overflow silently at high max depths.
  Corner(HashMap<[i32; 3], i32>),
}

/// Navigation graph: permanent nodes plus currently-active temporary nodes.
pub struct NavGraph {
  nodes: Vec<NavNode>,
  temporary: Vec<NavNode>,
  lookup: NodeLookup,
  /// Corner graphs place nodes on cell boundaries; line-of-sight checks
  /// against the index must then sample at half-cell resolution.
  pub corner_resolution: bool,
}

impl NavGraph {
  pub(crate) fn new(lookup: NodeLookup, corner_resolution: bool) -> Self {
    Self {
      nodes: Vec::new(),
      temporary: Vec::new(),
      lookup,
      corner_resolution,
    }
  }

  /// Permanent nodes in index order.
  #[inline]
  pub fn nodes(&self) -> &[NavNode] {
    &self.nodes
  }

  /// Number of permanent nodes.
  #[inline]
  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  /// Number of currently-active temporary nodes.
  #[inline]
  pub fn temporary_count(&self) -> usize {
    self.temporary.len()
  }

  /// Access a node by index; negative indices resolve into the temporary
  /// space.
  #[inline]
  pub fn node(&self, index: i32) -> &NavNode {
    if index >= 0 {
      &self.nodes[index as usize]
    } else {
      &self.temporary[(-index - 1) as usize]
    }
  }

  #[inline]
  pub(crate) fn node_mut(&mut self, index: i32) -> &mut NavNode {
    if index >= 0 {
      &mut self.nodes[index as usize]
    } else {
      &mut self.temporary[(-index - 1) as usize]
    }
  }

  /// Append a permanent node, returning its index.
  pub(crate) fn add_node(&mut self, position: Vec3) -> i32 {
    let index = self.nodes.len() as i32;
    self.nodes.push(NavNode::new(index, position));
    index
  }

  /// Append a directed arc with an explicit distance.
  pub(crate) fn add_arc(&mut self, from: i32, to: i32, distance: f32) {
    self.node_mut(from).arcs.push(NavArc { from, to, distance });
  }

  /// Append a directed arc with Euclidean distance.
  pub(crate) fn add_arc_euclidean(&mut self, from: i32, to: i32) {
    let distance = (self.node(from).position - self.node(to).position).length();
    self.add_arc(from, to, distance);
  }

  pub(crate) fn lookup(&self) -> &NodeLookup {
    &self.lookup
  }

  pub(crate) fn lookup_mut(&mut self) -> &mut NodeLookup {
    &mut self.lookup
  }

  /// The permanent nodes bounding the free leaf containing `p`: the single
  /// centroid node for center graphs, up to 8 corner nodes for corner
  /// graphs. Empty when `p` is outside the volume or inside an obstacle.
  pub fn bounding_nodes(&self, tree: &Octree, p: Vec3) -> SmallVec<[i32; 8]> {
    let mut result = SmallVec::new();
    let index = tree.position_to_index(p);
    let Some(id) = tree.find(index, tree.config().max_level) else {
      return result;
    };
    let cell = tree.cell(id);
    if cell.contains_blocked {
      return result;
    }
    match &self.lookup {
      NodeLookup::Center(map) => {
        if let Some(&node) = map.get(&(cell.level, cell.index)) {
          result.push(node);
        }
      }
      NodeLookup::Corner(map) => {
        let scale = 1i32 << (tree.config().max_level - cell.level);
        for offset in CHILD_OFFSETS {
          let corner = [
            (cell.index[0] + offset[0]) * scale,
            (cell.index[1] + offset[1]) * scale,
            (cell.index[2] + offset[2]) * scale,
          ];
          if let Some(&node) = map.get(&corner) {
            result.push(node);
          }
        }
      }
    }
    result
  }

  /// Splice a synthetic node for an off-grid query position into the graph.
  ///
  /// The node takes the next negative index, is wired to every neighbor with
  /// bidirectional unit arcs, inherits a neighbor's component label, and is
  /// recorded for bulk removal.
  pub fn add_temporary_node(&mut self, position: Vec3, neighbors: &[i32]) -> i32 {
    let index = -(self.temporary.len() as i32) - 1;
    let mut node = NavNode::new(index, position);
    node.connect_index = neighbors
      .first()
      .map(|&n| self.node(n).connect_index)
      .unwrap_or(-1);
    for &neighbor in neighbors {
      node.arcs.push(NavArc {
        from: index,
        to: neighbor,
        distance: 1.0,
      });
      self.node_mut(neighbor).arcs.push(NavArc {
        from: neighbor,
        to: index,
        distance: 1.0,
      });
    }
    self.temporary.push(node);
    index
  }

  /// Tear down every temporary node: strip the reverse arcs from each
  /// neighbor's arc list by target identity, then clear the set.
  pub fn remove_temporary_nodes(&mut self) {
    let temporary = std::mem::take(&mut self.temporary);
    for node in &temporary {
      for arc in &node.arcs {
        if arc.to >= 0 {
          self
            .node_mut(arc.to)
            .arcs
            .retain(|reverse| reverse.to != node.index);
        }
      }
    }
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
