//! Master file: graph header plus the two label dictionaries.
//!
//! Grounded on the external interface spec's header record and on the
//! teacher's `get_or_create_label` / `get_label_id` / `get_label_name`
//! pattern in `graph/db.rs` (double-checked: scan the table first, and
//! only take the append lock if the label truly isn't there yet).

use crate::constants::{self, MAGIC_GRAPH};
use crate::disk::Disk;
use crate::error::{Error, Result};
use crate::types::{GraphTypeStr, LabelEntry, LabelId, LabelStr};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

#[repr(C)]
struct GraphHeader {
  magic: [u8; 8],
  graph_name: LabelStr,
  graph_type: GraphTypeStr,
  vertices_c: u64,
  edges_c: u64,
  next_auto_id: u64,
  vertex_label_c: u32,
  edge_label_c: u32,
  vertex_label_table_addr: u64,
  edge_label_table_addr: u64,
  label_entry_size: u32,
  _pad: u32,
}

const HEADER_SIZE: u64 = std::mem::size_of::<GraphHeader>() as u64;
const ENTRY_SIZE: u64 = std::mem::size_of::<LabelEntry>() as u64;

pub struct Master {
  disk: Disk,
  max_vertex_labels: usize,
  max_edge_labels: usize,
  append_lock: Mutex<()>,
}

impl Master {
  pub fn create(
    path: impl AsRef<Path>,
    graph_name: &str,
    graph_type: &str,
    max_vertex_labels: usize,
    max_edge_labels: usize,
    growth_factor: u64,
  ) -> Result<Self> {
    let vertex_table_addr = HEADER_SIZE;
    let edge_table_addr = vertex_table_addr + ENTRY_SIZE * max_vertex_labels as u64;
    let size = edge_table_addr + ENTRY_SIZE * max_edge_labels as u64;
    let disk = Disk::create(path, size, growth_factor)?;
    let header = disk.typed_ref::<GraphHeader>(0);
    *header.get_mut() = GraphHeader {
      magic: MAGIC_GRAPH,
      graph_name: LabelStr::from_str(graph_name),
      graph_type: GraphTypeStr::from_str(graph_type),
      vertices_c: 0,
      edges_c: 0,
      next_auto_id: 0,
      vertex_label_c: 0,
      edge_label_c: 0,
      vertex_label_table_addr: vertex_table_addr,
      edge_label_table_addr: edge_table_addr,
      label_entry_size: ENTRY_SIZE as u32,
      _pad: 0,
    };
    for i in 0..max_vertex_labels as u64 {
      let r = disk.typed_ref::<LabelEntry>(vertex_table_addr + i * ENTRY_SIZE);
      *r.get_mut() = LabelEntry::default();
    }
    for i in 0..max_edge_labels as u64 {
      let r = disk.typed_ref::<LabelEntry>(edge_table_addr + i * ENTRY_SIZE);
      *r.get_mut() = LabelEntry::default();
    }
    Ok(Master { disk, max_vertex_labels, max_edge_labels, append_lock: Mutex::new(()) })
  }

  pub fn open(path: impl AsRef<Path>, max_vertex_labels: usize, max_edge_labels: usize, growth_factor: u64) -> Result<Self> {
    let disk = Disk::open(path, growth_factor)?;
    {
      let header = disk.typed_ref::<GraphHeader>(0);
      if header.get().magic != MAGIC_GRAPH {
        return Err(Error::Corruption("master file magic mismatch".into()));
      }
    }
    Ok(Master { disk, max_vertex_labels, max_edge_labels, append_lock: Mutex::new(()) })
  }

  fn header(&self) -> crate::disk::TypedRef<GraphHeader> {
    self.disk.typed_ref(0)
  }

  fn atomic_u64<'a>(&self, header: &'a crate::disk::TypedRef<GraphHeader>, field: &'a u64) -> &'a AtomicU64 {
    let _ = header;
    unsafe { &*(field as *const u64 as *const AtomicU64) }
  }

  fn atomic_u32<'a>(&self, header: &'a crate::disk::TypedRef<GraphHeader>, field: &'a u32) -> &'a AtomicU32 {
    let _ = header;
    unsafe { &*(field as *const u32 as *const AtomicU32) }
  }

  pub fn vertices_c(&self) -> u64 {
    self.header().get().vertices_c
  }

  pub fn edges_c(&self) -> u64 {
    self.header().get().edges_c
  }

  pub fn incr_vertices(&self) -> u64 {
    let header = self.header();
    let field = &header.get().vertices_c;
    self.atomic_u64(&header, field).fetch_add(1, Ordering::SeqCst)
  }

  pub fn decr_vertices(&self) {
    let header = self.header();
    let field = &header.get().vertices_c;
    self.atomic_u64(&header, field).fetch_sub(1, Ordering::SeqCst);
  }

  /// Hands out the next fresh auto-id, bumping the persisted counter.
  /// Callers only reach this once the label's own free list is empty.
  pub fn next_auto_id(&self) -> u64 {
    let header = self.header();
    let field = &header.get().next_auto_id;
    self.atomic_u64(&header, field).fetch_add(1, Ordering::SeqCst)
  }

  pub fn add_edges(&self, n: u64) {
    let header = self.header();
    let field = &header.get().edges_c;
    self.atomic_u64(&header, field).fetch_add(n, Ordering::SeqCst);
  }

  pub fn sub_edges(&self, n: u64) {
    let header = self.header();
    let field = &header.get().edges_c;
    self.atomic_u64(&header, field).fetch_sub(n, Ordering::SeqCst);
  }

  fn dict_base(&self, which: Dict) -> u64 {
    let header = self.header();
    match which {
      Dict::Vertex => header.get().vertex_label_table_addr,
      Dict::Edge => header.get().edge_label_table_addr,
    }
  }

  fn dict_capacity(&self, which: Dict) -> usize {
    match which {
      Dict::Vertex => self.max_vertex_labels,
      Dict::Edge => self.max_edge_labels,
    }
  }

  fn dict_count_field<'a>(&self, which: Dict, header: &'a crate::disk::TypedRef<GraphHeader>) -> &'a AtomicU32 {
    match which {
      Dict::Vertex => self.atomic_u32(header, &header.get().vertex_label_c),
      Dict::Edge => self.atomic_u32(header, &header.get().edge_label_c),
    }
  }

  fn scan(&self, which: Dict, name: &str) -> Option<LabelId> {
    let base = self.dict_base(which);
    let count = match which {
      Dict::Vertex => self.header().get().vertex_label_c,
      Dict::Edge => self.header().get().edge_label_c,
    };
    for i in 0..count as u64 {
      let r = self.disk.typed_ref::<LabelEntry>(base + i * ENTRY_SIZE);
      if r.get().label_str.as_str() == name {
        return Some(r.get().label_id);
      }
    }
    None
  }

  /// Resolves `name` to its `label_id`, creating a dictionary entry if it
  /// doesn't exist yet. Read path is lock-free; the append path takes a
  /// process-local lock so two concurrent creators of the same new label
  /// can't both append it.
  pub fn get_or_create_label(&self, which: Dict, name: &str) -> Result<LabelId> {
    if let Some(id) = self.scan(which, name) {
      return Ok(id);
    }
    let _guard = self.append_lock.lock();
    if let Some(id) = self.scan(which, name) {
      return Ok(id);
    }
    let header = self.header();
    let count_atomic = self.dict_count_field(which, &header);
    let count = count_atomic.load(Ordering::SeqCst);
    if count as usize >= self.dict_capacity(which) {
      return Err(Error::OutOfRange(format!("label dictionary full ({count} entries)")));
    }
    let label_id = count as LabelId;
    let base = self.dict_base(which);
    let r = self.disk.typed_ref::<LabelEntry>(base + count as u64 * ENTRY_SIZE);
    *r.get_mut() = LabelEntry { label_str: LabelStr::from_str(name), item_c: 0, label_id, _pad: [0; 2] };
    count_atomic.fetch_add(1, Ordering::SeqCst);
    Ok(label_id)
  }

  /// Pure lookup, never appends. Returns `None` if `name` has no dictionary
  /// entry yet.
  pub fn label_name_to_id(&self, which: Dict, name: &str) -> Option<LabelId> {
    self.scan(which, name)
  }

  pub fn label_name(&self, which: Dict, label_id: LabelId) -> Option<String> {
    let count = match which {
      Dict::Vertex => self.header().get().vertex_label_c,
      Dict::Edge => self.header().get().edge_label_c,
    };
    if label_id as u32 >= count {
      return None;
    }
    let base = self.dict_base(which);
    let r = self.disk.typed_ref::<LabelEntry>(base + label_id as u64 * ENTRY_SIZE);
    Some(r.get().label_str.as_str().to_string())
  }

  pub fn bump_item_count(&self, which: Dict, label_id: LabelId, delta: i64) {
    let base = self.dict_base(which);
    let r = self.disk.typed_ref::<LabelEntry>(base + label_id as u64 * ENTRY_SIZE);
    let atomic = unsafe { &*(&r.get().item_c as *const u32 as *const AtomicU32) };
    if delta >= 0 {
      atomic.fetch_add(delta as u32, Ordering::SeqCst);
    } else {
      atomic.fetch_sub((-delta) as u32, Ordering::SeqCst);
    }
  }

  /// Every dictionary entry's name and live item count, in dictionary
  /// order. Used by `Graph::stats()`'s per-label breakdown.
  pub fn label_item_counts(&self, which: Dict) -> Vec<(String, u32)> {
    let base = self.dict_base(which);
    let count = match which {
      Dict::Vertex => self.header().get().vertex_label_c,
      Dict::Edge => self.header().get().edge_label_c,
    };
    (0..count as u64)
      .map(|i| {
        let r = self.disk.typed_ref::<LabelEntry>(base + i * ENTRY_SIZE);
        let entry = r.get();
        (entry.label_str.as_str().to_string(), entry.item_c)
      })
      .collect()
  }

  pub fn sync(&self) -> Result<()> {
    self.disk.sync()
  }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Dict {
  Vertex,
  Edge,
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn create_then_open_preserves_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("master");
    {
      let m = Master::create(&path, "g1", "lpg", constants::MAX_VERTEX_LABELS, constants::MAX_EDGE_LABELS, 10).unwrap();
      m.incr_vertices();
      m.sync().unwrap();
    }
    let m = Master::open(&path, constants::MAX_VERTEX_LABELS, constants::MAX_EDGE_LABELS, 10).unwrap();
    assert_eq!(m.vertices_c(), 1);
  }

  #[test]
  fn label_dictionary_deduplicates() {
    let dir = tempdir().unwrap();
    let m = Master::create(dir.path().join("master"), "g1", "lpg", 8, 8, 10).unwrap();
    let a = m.get_or_create_label(Dict::Vertex, "Person").unwrap();
    let b = m.get_or_create_label(Dict::Vertex, "Person").unwrap();
    assert_eq!(a, b);
    assert_eq!(m.label_name(Dict::Vertex, a).as_deref(), Some("Person"));
  }

  #[test]
  fn label_dictionary_full_errors() {
    let dir = tempdir().unwrap();
    let m = Master::create(dir.path().join("master"), "g1", "lpg", 1, 8, 10).unwrap();
    m.get_or_create_label(Dict::Vertex, "A").unwrap();
    assert!(m.get_or_create_label(Dict::Vertex, "B").is_err());
  }
}
