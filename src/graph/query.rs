//! Read-only lookups: these never take a writer ticket and may run
//! concurrently with mutators and the flusher (the flusher only fences
//! writers, not readers — see `graph::flush`).

use super::master::Dict;
use super::Graph;
use crate::types::{EdgeView, LabelId, Property, VertexId, VertexView};

impl Graph {
  pub fn get_num_vertices(&self) -> u64 {
    self.master.vertices_c()
  }

  pub fn get_num_edges(&self) -> u64 {
    self.master.edges_c()
  }

  /// Pure reader: unlike `get_or_create_label`, never appends a new entry.
  pub fn label_id_of(&self, which: Dict, name: &str) -> Option<LabelId> {
    self.master.label_name_to_id(which, name)
  }

  pub fn name_of(&self, which: Dict, label_id: LabelId) -> Option<String> {
    self.master.label_name(which, label_id)
  }

  pub fn get_vertex(&self, id: VertexId) -> Option<VertexView> {
    let offset = self.index.load(id)?;
    let vref = self.vertices.entry(offset);
    if !vref.get().is_slot_set(0) {
      return None;
    }
    let v = vref.get().payload[0];
    Some(VertexView { id: v.id, label_id: v.label_id, neighbour_c: v.neighbour_c, property_c: v.property_c })
  }

  fn collect_property_chain(&self, head: u32) -> Vec<Property> {
    let mut out = Vec::new();
    self.properties.walk(head, |block| {
      for slot in 0..crate::types::PROP_SLOTS {
        if block.is_slot_set(slot) {
          let p = block.payload[slot];
          out.push(Property { key: p.key.as_str().to_string(), value: p.value.as_str().to_string() });
        }
      }
    });
    out
  }

  pub fn get_vertex_properties(&self, id: VertexId) -> Option<Vec<Property>> {
    let offset = self.index.load(id)?;
    let vref = self.vertices.entry(offset);
    if !vref.get().is_slot_set(0) {
      return None;
    }
    let head = vref.get().payload[0].properties_idx;
    Some(self.collect_property_chain(head))
  }

  pub fn get_edge_properties(&self, src: VertexId, dst: VertexId, label: &str) -> Option<Vec<Property>> {
    let label_id = self.master.label_name_to_id(Dict::Edge, label)?;
    let offset = self.index.load(src)?;
    let vref = self.vertices.entry(offset);
    let head = vref.get().payload[0].edge_idx;
    let mut found = None;
    self.edges.walk(head, |block| {
      for slot in 0..crate::types::EDGE_SLOTS {
        if block.is_slot_set(slot) {
          let e = block.payload[slot];
          if e.src == src && e.dst == dst && e.label_id == label_id && found.is_none() {
            found = Some(e.properties_idx);
          }
        }
      }
    });
    found.map(|head| self.collect_property_chain(head))
  }

  /// Every live outgoing edge of `src`, optionally filtered by predicate.
  pub fn get_edges(&self, src: VertexId, predicate: impl Fn(&EdgeView) -> bool) -> Vec<EdgeView> {
    let Some(offset) = self.index.load(src) else {
      return Vec::new();
    };
    let vref = self.vertices.entry(offset);
    let head = vref.get().payload[0].edge_idx;
    let mut out = Vec::new();
    self.edges.walk(head, |block| {
      for slot in 0..crate::types::EDGE_SLOTS {
        if block.is_slot_set(slot) {
          let e = block.payload[slot];
          let view = EdgeView { src: e.src, dst: e.dst, label_id: e.label_id };
          if predicate(&view) {
            out.push(view);
          }
        }
      }
    });
    out
  }

  pub fn get_edges_by_label(&self, src: VertexId, edge_label: &str, dst_label: Option<&str>) -> Vec<EdgeView> {
    let Some(edge_label_id) = self.master.label_name_to_id(Dict::Edge, edge_label) else {
      return Vec::new();
    };
    let dst_label_id = dst_label.and_then(|l| self.master.label_name_to_id(Dict::Vertex, l));
    self.get_edges(src, |e| {
      if e.label_id != edge_label_id {
        return false;
      }
      match dst_label_id {
        Some(want) => self.get_vertex(e.dst).map(|v| v.label_id == want).unwrap_or(false),
        None => true,
      }
    })
  }

  /// Follows a chain of `(edge_label, dst_label)` hops starting at `src`,
  /// returning every reachable vertex id at the end of the chain.
  pub fn get_recursive_edges(&self, src: VertexId, hops: &[(&str, Option<&str>)]) -> Vec<VertexId> {
    let mut frontier = vec![src];
    for (edge_label, dst_label) in hops {
      let mut next = Vec::new();
      for &v in &frontier {
        for e in self.get_edges_by_label(v, edge_label, *dst_label) {
          next.push(e.dst);
        }
      }
      frontier = next;
    }
    frontier
  }

  /// Read-only iterator over a label's live vertex ids (supplemented
  /// feature; SPEC_FULL.md §10).
  pub fn vertices_with_label(&self, label_id: LabelId) -> impl Iterator<Item = VertexId> + '_ {
    (0..self.vertices.block_count()).filter_map(move |offset| {
      let r = self.vertices.entry(offset);
      if r.get().is_slot_set(0) {
        let v = r.get().payload[0];
        if v.label_id == label_id {
          return Some(v.id);
        }
      }
      None
    })
  }

  /// A cheap snapshot of the master header's counters, without traversing
  /// any block file (supplemented feature; SPEC_FULL.md §10).
  pub fn stats(&self) -> GraphStats {
    GraphStats {
      vertices: self.master.vertices_c(),
      edges: self.master.edges_c(),
      vertex_labels: self.master.label_item_counts(Dict::Vertex),
      edge_labels: self.master.label_item_counts(Dict::Edge),
    }
  }
}

#[derive(Debug, Clone)]
pub struct GraphStats {
  pub vertices: u64,
  pub edges: u64,
  /// `(label name, live vertex count)` per vertex label, in dictionary order.
  pub vertex_labels: Vec<(String, u32)>,
  /// `(label name, live edge count)` per edge label, in dictionary order.
  pub edge_labels: Vec<(String, u32)>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::GraphConfig;
  use crate::logging::NullSink;
  use std::sync::Arc;
  use tempfile::tempdir;

  fn cfg() -> GraphConfig {
    GraphConfig::new().log_sink(Arc::new(NullSink))
  }

  #[test]
  fn vertex_round_trip_after_reopen() {
    let dir = tempdir().unwrap();
    {
      let g = Graph::create(dir.path(), "g1", &cfg()).unwrap();
      g.add_vertex_with_id(7, "Person", &[("name".into(), "alice".into())]).unwrap();
      g.save().unwrap();
    }
    let g = Graph::open(dir.path(), "g1", &cfg()).unwrap();
    let label_id = g.label_id_of(Dict::Vertex, "Person").unwrap();
    let v = g.get_vertex(7).unwrap();
    assert_eq!(v.label_id, label_id);
    let props = g.get_vertex_properties(7).unwrap();
    assert_eq!(props, vec![Property { key: "name".into(), value: "alice".into() }]);
  }

  #[test]
  fn get_edges_returns_multiset_of_destinations() {
    let dir = tempdir().unwrap();
    let g = Graph::create(dir.path(), "g1", &cfg()).unwrap();
    for id in 1..=4u64 {
      g.add_vertex_with_id(id, "Person", &[]).unwrap();
    }
    g.add_edge(1, 2, "KNOWS", &[]).unwrap();
    g.add_edge(1, 3, "KNOWS", &[]).unwrap();
    g.add_edge(1, 4, "KNOWS", &[]).unwrap();
    let mut dsts: Vec<u64> = g.get_edges(1, |_| true).iter().map(|e| e.dst).collect();
    dsts.sort();
    assert_eq!(dsts, vec![2, 3, 4]);
  }

  #[test]
  fn vertices_with_label_filters_by_label() {
    let dir = tempdir().unwrap();
    let g = Graph::create(dir.path(), "g1", &cfg()).unwrap();
    g.add_vertex_with_id(1, "Person", &[]).unwrap();
    g.add_vertex_with_id(2, "Company", &[]).unwrap();
    g.add_vertex_with_id(3, "Person", &[]).unwrap();
    let person = g.label_id_of(Dict::Vertex, "Person").unwrap();
    let mut ids: Vec<u64> = g.vertices_with_label(person).collect();
    ids.sort();
    assert_eq!(ids, vec![1, 3]);
  }

  #[test]
  fn stats_reports_per_label_item_counts() {
    let dir = tempdir().unwrap();
    let g = Graph::create(dir.path(), "g1", &cfg()).unwrap();
    g.add_vertex_with_id(1, "Person", &[]).unwrap();
    g.add_vertex_with_id(2, "Person", &[]).unwrap();
    g.add_vertex_with_id(3, "Company", &[]).unwrap();
    g.add_edge(1, 2, "KNOWS", &[]).unwrap();
    g.rm_vertex(3).unwrap();

    let stats = g.stats();
    assert_eq!(stats.vertices, 2);
    assert_eq!(stats.edges, 1);
    assert_eq!(stats.vertex_labels.iter().find(|(n, _)| n == "Person").map(|(_, c)| *c), Some(2));
    assert_eq!(stats.vertex_labels.iter().find(|(n, _)| n == "Company").map(|(_, c)| *c), Some(0));
    assert_eq!(stats.edge_labels.iter().find(|(n, _)| n == "KNOWS").map(|(_, c)| *c), Some(1));
  }
}
