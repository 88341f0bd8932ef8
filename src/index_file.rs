//! Index file: a flat array mapping dense vertex ids to a block offset in
//! the vertex block file.
//!
//! Grounded on `original_source/.../storage/dbstorage.cpp`'s vertex table
//! and spec'd identically: `store` claims an entry with a CAS on its
//! set-bit, `load` reads it back. A vertex's `id` never moves once
//! assigned; the `offset` it names is stable for the vertex's lifetime.

use crate::constants::END;
use crate::disk::Disk;
use crate::error::Result;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

#[repr(C)]
struct Header {
  start_addr: u64,
  entry_count: u64,
  entry_size: u32,
  _pad: u32,
}

#[repr(C)]
struct Entry {
  offset: u32,
  set: u32,
}

const HEADER_SIZE: u64 = std::mem::size_of::<Header>() as u64;
const ENTRY_SIZE: u64 = std::mem::size_of::<Entry>() as u64;

pub struct IndexFile {
  disk: Disk,
}

impl IndexFile {
  pub fn create(path: impl AsRef<Path>, initial_entries: u64, growth_factor: u64) -> Result<Self> {
    let size = HEADER_SIZE + ENTRY_SIZE * initial_entries.max(1);
    let disk = Disk::create(path, size, growth_factor)?;
    let header = disk.typed_ref::<Header>(0);
    *header.get_mut() = Header { start_addr: HEADER_SIZE, entry_count: initial_entries.max(1), entry_size: ENTRY_SIZE as u32, _pad: 0 };
    Ok(IndexFile { disk })
  }

  pub fn open(path: impl AsRef<Path>, growth_factor: u64) -> Result<Self> {
    let disk = Disk::open(path, growth_factor)?;
    Ok(IndexFile { disk })
  }

  fn entry_count(&self) -> u64 {
    self.disk.typed_ref::<Header>(0).get().entry_count
  }

  fn ensure_capacity(&self, id: u64) -> Result<()> {
    if id < self.entry_count() {
      return Ok(());
    }
    let new_count = (id + 1).max(self.entry_count() * 2);
    let needed = HEADER_SIZE + ENTRY_SIZE * new_count;
    self.disk.resize(needed)?;
    let header = self.disk.typed_ref::<Header>(0);
    header.get_mut().entry_count = new_count;
    Ok(())
  }

  fn entry_offset(&self, id: u64) -> u64 {
    HEADER_SIZE + id * ENTRY_SIZE
  }

  /// Claims the entry for `id`, returning `false` if it was already set.
  pub fn store(&self, id: u64, block_offset: u32) -> Result<bool> {
    self.ensure_capacity(id)?;
    let r = self.disk.typed_ref::<Entry>(self.entry_offset(id));
    let set_atomic = unsafe { &*(&r.get().set as *const u32 as *const AtomicU32) };
    if set_atomic.compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst).is_err() {
      return Ok(false);
    }
    r.get_mut().offset = block_offset;
    Ok(true)
  }

  /// Returns the stored offset for `id`, or `None` if unset / out of range.
  pub fn load(&self, id: u64) -> Option<u32> {
    if id >= self.entry_count() {
      return None;
    }
    let r = self.disk.typed_ref::<Entry>(self.entry_offset(id));
    let entry = r.get();
    if entry.set == 0 || entry.offset == END {
      None
    } else {
      Some(entry.offset)
    }
  }

  pub fn sync(&self) -> Result<()> {
    self.disk.sync()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn store_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let idx = IndexFile::create(dir.path().join("index"), 8, 10).unwrap();
    assert!(idx.store(3, 77).unwrap());
    assert_eq!(idx.load(3), Some(77));
  }

  #[test]
  fn double_store_returns_false() {
    let dir = tempdir().unwrap();
    let idx = IndexFile::create(dir.path().join("index"), 8, 10).unwrap();
    assert!(idx.store(3, 77).unwrap());
    assert!(!idx.store(3, 88).unwrap());
    assert_eq!(idx.load(3), Some(77));
  }

  #[test]
  fn store_beyond_capacity_grows() {
    let dir = tempdir().unwrap();
    let idx = IndexFile::create(dir.path().join("index"), 2, 10).unwrap();
    assert!(idx.store(100, 5).unwrap());
    assert_eq!(idx.load(100), Some(5));
  }

  #[test]
  fn unset_id_loads_none() {
    let dir = tempdir().unwrap();
    let idx = IndexFile::create(dir.path().join("index"), 8, 10).unwrap();
    assert_eq!(idx.load(4), None);
  }
}
