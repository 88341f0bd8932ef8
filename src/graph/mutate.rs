//! Mutation API: `add_vertex`, `add_edge`, `rm_vertex`, `rm_edge`, and the
//! replay path that re-applies a logged record without re-logging it.
//!
//! Grounded on the engine's failure semantics spec (action-state return,
//! nothing logged or mutated on an `Invalid` precondition) and on the
//! teacher's idempotent-replay handling in `graph/db.rs`'s WAL replay
//! match (duplicate add during replay is a no-op, not an error).

use super::master::Dict;
use super::{Graph, LabelIdPool};
use crate::constants::{AUTO_ID, END};
use crate::error::{ActionState, Result};
use crate::logging::LogSink;
use crate::txlog::{PropertyRecord, Record};
use crate::types::{EdgePayload, LabelId, PropertyPayload, VertexPayload};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

impl Graph {
  fn next_id_for_label(&self, label_id: crate::types::LabelId) -> u64 {
    let mut pools = self.label_pools.lock();
    let pool = pools.entry(label_id).or_insert_with(LabelIdPool::default);
    if let Some(Reverse(id)) = pool.free.pop() {
      return id;
    }
    drop(pools);
    self.master.next_auto_id()
  }

  fn release_id_for_label(&self, label_id: crate::types::LabelId, id: u64) {
    let mut pools = self.label_pools.lock();
    let pool = pools.entry(label_id).or_insert_with(LabelIdPool::default);
    pool.free.push(Reverse(id));
  }

  fn properties_head_and_count(&self, props: &[(String, String)]) -> Result<(u32, u32)> {
    let mut head = END;
    let mut count = 0u32;
    for (key, value) in props {
      let block = self.properties.attain(head)?;
      let slot = block.get().first_free_slot().expect("freshly attained block has a free slot");
      block.get_mut().payload[slot] = PropertyPayload::new(key, value);
      block.get_mut().set_slot(slot);
      head = block.get().idx;
      count += 1;
    }
    Ok((head, count))
  }

  fn release_property_chain(&self, head: u32) {
    let mut cur = head;
    while cur != END {
      let r = self.properties.entry(cur);
      let next = r.get().next;
      self.properties.release(cur);
      cur = next;
    }
  }

  /// Adds a vertex, auto-assigning the next id within `label`'s bucket.
  pub fn add_vertex(&self, label: &str, props: &[(String, String)]) -> Result<(ActionState, Option<u64>)> {
    self.acquire_writer_ticket();
    let result = self.add_vertex_inner(None, label, props, true);
    self.release_writer_ticket();
    result
  }

  /// Adds a vertex with a caller-supplied id. Fails (invalid) if the id is
  /// already live.
  pub fn add_vertex_with_id(&self, id: u64, label: &str, props: &[(String, String)]) -> Result<ActionState> {
    self.acquire_writer_ticket();
    let result = self.add_vertex_inner(Some(id), label, props, true).map(|(state, _)| state);
    self.release_writer_ticket();
    result
  }

  fn add_vertex_inner(&self, explicit_id: Option<u64>, label: &str, props: &[(String, String)], log: bool) -> Result<(ActionState, Option<u64>)> {
    // Check the duplicate-id precondition before touching the label
    // dictionary: an invalid call must leave neither log nor state touched.
    if let Some(id) = explicit_id {
      if self.index.load(id).is_some() {
        self.log_sink.warning(&format!("add_vertex: id {id} already live"));
        return Ok((ActionState::Invalid, None));
      }
    }

    let label_id = self.master.get_or_create_label(Dict::Vertex, label)?;
    let id = match explicit_id {
      Some(id) => id,
      None => self.next_id_for_label(label_id),
    };

    if log {
      let prop_records: Vec<PropertyRecord> = props.iter().map(|(k, v)| PropertyRecord { key: k.clone(), value: v.clone() }).collect();
      self.txlog.lock().commit_add_vertex(explicit_id, label, prop_records)?;
    }

    let (props_head, property_c) = self.properties_head_and_count(props)?;

    let vblock = self.vertices.attain(END)?;
    let payload = VertexPayload {
      id,
      label_id,
      _pad: [0; 6],
      neighbour_c: 0,
      property_c,
      edge_idx: END,
      properties_idx: props_head,
    };
    vblock.get_mut().payload[0] = payload;
    vblock.get_mut().set_slot(0);
    let block_offset = vblock.get().idx;

    if !self.index.store(id, block_offset)? {
      self.log_sink.warning(&format!("add_vertex: index race on id {id}"));
      self.release_property_chain(props_head);
      self.vertices.release(block_offset);
      return Ok((ActionState::Invalid, None));
    }

    self.master.incr_vertices();
    self.master.bump_item_count(Dict::Vertex, label_id, 1);
    Ok((ActionState::Valid, Some(id)))
  }

  /// Removes a vertex, releasing its vertex block and its whole edge
  /// chain. The index entry stays in place; the block is now on the free
  /// list, so the vertex is considered dead.
  pub fn rm_vertex(&self, id: u64) -> Result<ActionState> {
    self.acquire_writer_ticket();
    let result = self.rm_vertex_inner(id, true);
    self.release_writer_ticket();
    result
  }

  fn rm_vertex_inner(&self, id: u64, log: bool) -> Result<ActionState> {
    let Some(offset) = self.index.load(id) else {
      self.log_sink.warning(&format!("rm_vertex: id {id} not found"));
      return Ok(ActionState::Invalid);
    };

    if log {
      self.txlog.lock().commit_rm_vertex(id)?;
    }

    let vref = self.vertices.entry(offset);
    let (label_id, edge_idx, props_idx) = {
      let v = vref.get().payload[0];
      (v.label_id, v.edge_idx, v.properties_idx)
    };

    let mut removed_edges = 0u64;
    let mut removed_by_label: HashMap<LabelId, i64> = HashMap::new();
    let mut cur = edge_idx;
    while cur != END {
      let eref = self.edges.entry(cur);
      let next = eref.get().next;
      for slot in 0..crate::types::EDGE_SLOTS {
        if eref.get().is_slot_set(slot) {
          let edge = eref.get().payload[slot];
          self.release_property_chain(edge.properties_idx);
          removed_edges += 1;
          *removed_by_label.entry(edge.label_id).or_insert(0) += 1;
        }
      }
      self.edges.release(cur);
      cur = next;
    }

    self.release_property_chain(props_idx);
    self.vertices.release(offset);
    self.master.decr_vertices();
    self.master.sub_edges(removed_edges);
    for (edge_label_id, count) in removed_by_label {
      self.master.bump_item_count(Dict::Edge, edge_label_id, -count);
    }
    self.master.bump_item_count(Dict::Vertex, label_id, -1);
    self.release_id_for_label(label_id, id);
    Ok(ActionState::Valid)
  }

  /// Adds an edge. Fails (invalid) if `src` is not live.
  pub fn add_edge(&self, src: u64, dst: u64, label: &str, props: &[(String, String)]) -> Result<ActionState> {
    self.acquire_writer_ticket();
    let result = self.add_edge_inner(src, dst, label, props, true);
    self.release_writer_ticket();
    result
  }

  fn add_edge_inner(&self, src: u64, dst: u64, label: &str, props: &[(String, String)], log: bool) -> Result<ActionState> {
    let Some(src_offset) = self.index.load(src) else {
      self.log_sink.warning(&format!("add_edge: source {src} not found"));
      return Ok(ActionState::Invalid);
    };

    let label_id = self.master.get_or_create_label(Dict::Edge, label)?;

    if log {
      let prop_records: Vec<PropertyRecord> = props.iter().map(|(k, v)| PropertyRecord { key: k.clone(), value: v.clone() }).collect();
      self.txlog.lock().commit_add_edge(src, dst, label, prop_records)?;
    }

    let (props_head, property_c) = self.properties_head_and_count(props)?;

    // Links the new edge onto the vertex's edge chain with a CAS retry loop
    // (mirroring block_file.rs's free-list CAS): two concurrent `add_edge`
    // calls on the same `src` must not race and silently drop one edge.
    let vref = self.vertices.entry(src_offset);
    let edge_idx_atomic = unsafe { &*(&vref.get().payload[0].edge_idx as *const u32 as *const AtomicU32) };
    loop {
      let current_head = edge_idx_atomic.load(Ordering::SeqCst);
      let eblock = self.edges.attain(current_head)?;
      let slot = eblock.get().first_free_slot().expect("freshly attained edge block has a free slot");
      eblock.get_mut().payload[slot] = EdgePayload { src, dst, label_id, _pad: [0; 6], property_c, properties_idx: props_head };
      eblock.get_mut().set_slot(slot);
      let new_head = eblock.get().idx;

      if edge_idx_atomic.compare_exchange(current_head, new_head, Ordering::SeqCst, Ordering::SeqCst).is_ok() {
        break;
      }

      // Lost the race: undo. A block reused via the `current_head` hint is
      // still reachable through the winner's chain, so clearing our slot is
      // enough; a freshly popped/allocated block is now unreachable and
      // must go back on the free list instead of leaking.
      if eblock.get().idx == current_head {
        eblock.get_mut().clear_slot(slot);
      } else {
        self.edges.release(eblock.get().idx);
      }
    }
    let neighbour_c_atomic = unsafe { &*(&vref.get().payload[0].neighbour_c as *const u32 as *const AtomicU32) };
    neighbour_c_atomic.fetch_add(1, Ordering::SeqCst);

    self.master.add_edges(1);
    self.master.bump_item_count(Dict::Edge, label_id, 1);
    Ok(ActionState::Valid)
  }

  /// Removes every edge `src -> dst` (optionally filtered by `label`) by
  /// clearing its slot bit in place.
  pub fn rm_edge(&self, src: u64, dst: u64, label: Option<&str>) -> Result<ActionState> {
    self.acquire_writer_ticket();
    let result = self.rm_edge_inner(src, dst, label, true);
    self.release_writer_ticket();
    result
  }

  fn rm_edge_inner(&self, src: u64, dst: u64, label: Option<&str>, log: bool) -> Result<ActionState> {
    let Some(src_offset) = self.index.load(src) else {
      return Ok(ActionState::Invalid);
    };
    let label_id = match label {
      Some(l) => Some(self.master.get_or_create_label(Dict::Edge, l)?),
      None => None,
    };

    let vref = self.vertices.entry(src_offset);
    let head = vref.get().payload[0].edge_idx;

    // Read-only pass: determine which (block, slot) entries match before
    // touching any state, so the log append below sees a consistent count.
    let mut matches: Vec<(u32, usize, LabelId, u32)> = Vec::new();
    let mut cur = head;
    while cur != END {
      let eref = self.edges.entry(cur);
      for slot in 0..crate::types::EDGE_SLOTS {
        if eref.get().is_slot_set(slot) {
          let edge = eref.get().payload[slot];
          let label_matches = label_id.map(|l| l == edge.label_id).unwrap_or(true);
          if edge.src == src && edge.dst == dst && label_matches {
            matches.push((cur, slot, edge.label_id, edge.properties_idx));
          }
        }
      }
      cur = eref.get().next;
    }

    if matches.is_empty() {
      self.log_sink.warning(&format!("rm_edge: no edge {src}->{dst} found"));
      return Ok(ActionState::Invalid);
    }

    if log {
      self.txlog.lock().commit_rm_edge(src, dst, label.unwrap_or(""))?;
    }

    let mut removed_by_label: HashMap<LabelId, i64> = HashMap::new();
    for (block_idx, slot, edge_label_id, properties_idx) in &matches {
      self.release_property_chain(*properties_idx);
      self.edges.entry(*block_idx).get_mut().clear_slot(*slot);
      *removed_by_label.entry(*edge_label_id).or_insert(0) += 1;
    }

    let removed = matches.len() as u64;
    vref.get_mut().payload[0].neighbour_c -= removed as u32;
    self.master.sub_edges(removed);
    for (edge_label_id, count) in removed_by_label {
      self.master.bump_item_count(Dict::Edge, edge_label_id, -count);
    }
    Ok(ActionState::Valid)
  }

  /// Re-applies a logged record without re-logging it. Duplicate-id /
  /// duplicate-edge conditions collapse to `Invalid`, which is treated as
  /// a successful no-op during replay (idempotence).
  pub(crate) fn apply_replayed(&self, record: &Record) -> Result<()> {
    match record {
      Record::Vertex { remove: false, id, label, properties } => {
        let props: Vec<(String, String)> = properties.iter().map(|p| (p.key.clone(), p.value.clone())).collect();
        let explicit_id = if *id == AUTO_ID { None } else { Some(*id as u64) };
        self.add_vertex_inner(explicit_id, label, &props, false)?;
      }
      Record::Vertex { remove: true, id, .. } => {
        self.rm_vertex_inner(*id as u64, false)?;
      }
      Record::Edge { remove: false, src, dst, label, properties } => {
        let props: Vec<(String, String)> = properties.iter().map(|p| (p.key.clone(), p.value.clone())).collect();
        self.add_edge_inner(*src, *dst, label, &props, false)?;
      }
      Record::Edge { remove: true, src, dst, label, .. } => {
        let label = if label.is_empty() { None } else { Some(label.as_str()) };
        self.rm_edge_inner(*src, *dst, label, false)?;
      }
    }
    Ok(())
  }
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
  fn add_vertex_with_explicit_id_round_trips() {
    let dir = tempdir().unwrap();
    let g = super::Graph::create(dir.path(), "g1", &cfg()).unwrap();
    let state = g.add_vertex_with_id(7, "Person", &[("name".into(), "alice".into())]).unwrap();
    assert_eq!(state, ActionState::Valid);
    assert_eq!(g.master.vertices_c(), 1);
  }

  #[test]
  fn add_vertex_duplicate_id_is_invalid() {
    let dir = tempdir().unwrap();
    let g = super::Graph::create(dir.path(), "g1", &cfg()).unwrap();
    g.add_vertex_with_id(7, "Person", &[]).unwrap();
    let state = g.add_vertex_with_id(7, "Person", &[]).unwrap();
    assert_eq!(state, ActionState::Invalid);
    assert_eq!(g.master.vertices_c(), 1);
  }

  #[test]
  fn add_edge_requires_live_source() {
    let dir = tempdir().unwrap();
    let g = super::Graph::create(dir.path(), "g1", &cfg()).unwrap();
    let state = g.add_edge(1, 2, "KNOWS", &[]).unwrap();
    assert_eq!(state, ActionState::Invalid);
  }

  #[test]
  fn edge_multiplicity_within_one_block() {
    let dir = tempdir().unwrap();
    let g = super::Graph::create(dir.path(), "g1", &cfg()).unwrap();
    for id in 1..=4u64 {
      g.add_vertex_with_id(id, "Person", &[]).unwrap();
    }
    g.add_edge(1, 2, "KNOWS", &[]).unwrap();
    g.add_edge(1, 3, "KNOWS", &[]).unwrap();
    g.add_edge(1, 4, "KNOWS", &[]).unwrap();
    assert_eq!(g.master.edges_c(), 3);
  }

  #[test]
  fn free_list_reuse_after_rm_edge() {
    let dir = tempdir().unwrap();
    let g = super::Graph::create(dir.path(), "g1", &cfg()).unwrap();
    for id in 9..=14u64 {
      g.add_vertex_with_id(id, "Person", &[]).unwrap();
    }
    g.add_edge(9, 10, "KNOWS", &[]).unwrap();
    g.add_edge(9, 11, "KNOWS", &[]).unwrap();
    g.add_edge(9, 12, "KNOWS", &[]).unwrap();
    g.add_edge(9, 13, "KNOWS", &[]).unwrap();
    let blocks_before = g.edges.block_count();
    g.rm_edge(9, 10, None).unwrap();
    g.add_edge(9, 14, "KNOWS", &[]).unwrap();
    assert_eq!(g.edges.block_count(), blocks_before, "reused cleared slot, no new block");
  }

  #[test]
  fn rm_vertex_releases_edge_chain() {
    let dir = tempdir().unwrap();
    let g = super::Graph::create(dir.path(), "g1", &cfg()).unwrap();
    g.add_vertex_with_id(1, "Person", &[]).unwrap();
    g.add_vertex_with_id(2, "Person", &[]).unwrap();
    g.add_edge(1, 2, "KNOWS", &[]).unwrap();
    g.rm_vertex(1).unwrap();
    assert_eq!(g.master.vertices_c(), 1);
    assert_eq!(g.master.edges_c(), 0);
  }
}
