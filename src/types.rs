//! Fixed-layout POD types read directly out of a memory mapping.
//!
//! Every struct here is `#[repr(C)]` and contains only fixed-width integer
//! fields or byte arrays, so a `TypedRef<T>` into a mapped file can be cast
//! straight to `&T` / `&mut T` without any deserialisation step.

use crate::constants::{EDGE_BLOCK_SLOTS, GRAPH_TYPE_LEN, LABEL_LEN, PROP_BLOCK_SLOTS, PROP_KEY_LEN, PROP_VAL_LEN};

pub type VertexId = u64;
pub type LabelId = u16;
pub type BlockOffset = u32;

/// A fixed-width, null-padded byte string.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FixedStr<const N: usize>(pub [u8; N]);

impl<const N: usize> FixedStr<N> {
  pub fn from_str(s: &str) -> Self {
    let mut buf = [0u8; N];
    let bytes = s.as_bytes();
    let len = bytes.len().min(N);
    buf[..len].copy_from_slice(&bytes[..len]);
    FixedStr(buf)
  }

  pub fn as_str(&self) -> &str {
    let end = self.0.iter().position(|&b| b == 0).unwrap_or(N);
    std::str::from_utf8(&self.0[..end]).unwrap_or("")
  }
}

impl<const N: usize> Default for FixedStr<N> {
  fn default() -> Self {
    FixedStr([0u8; N])
  }
}

impl<const N: usize> PartialEq for FixedStr<N> {
  fn eq(&self, other: &Self) -> bool {
    self.0 == other.0
  }
}

pub type LabelStr = FixedStr<LABEL_LEN>;
pub type GraphTypeStr = FixedStr<GRAPH_TYPE_LEN>;
pub type PropKeyStr = FixedStr<PROP_KEY_LEN>;
pub type PropValStr = FixedStr<PROP_VAL_LEN>;

/// One `(key, value)` property pair, as stored in a property block slot.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct PropertyPayload {
  pub key: PropKeyStr,
  pub value: PropValStr,
}

impl PropertyPayload {
  pub fn new(key: &str, value: &str) -> Self {
    PropertyPayload { key: PropKeyStr::from_str(key), value: PropValStr::from_str(value) }
  }
}

/// Vertex block payload (vertex blocks hold exactly one payload, `N=1`).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct VertexPayload {
  pub id: VertexId,
  pub label_id: LabelId,
  pub _pad: [u8; 6],
  pub neighbour_c: u32,
  pub property_c: u32,
  pub edge_idx: BlockOffset,
  pub properties_idx: BlockOffset,
}

/// Edge block payload.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct EdgePayload {
  pub src: VertexId,
  pub dst: VertexId,
  pub label_id: LabelId,
  pub _pad: [u8; 6],
  pub property_c: u32,
  pub properties_idx: BlockOffset,
}

pub const EDGE_SLOTS: usize = EDGE_BLOCK_SLOTS;
pub const PROP_SLOTS: usize = PROP_BLOCK_SLOTS;

/// A label dictionary entry (vertex labels and edge labels both use this
/// layout; there are two independent dictionaries in the master file).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct LabelEntry {
  pub label_str: LabelStr,
  pub item_c: u32,
  pub label_id: LabelId,
  pub _pad: [u8; 2],
}

impl Default for LabelEntry {
  fn default() -> Self {
    LabelEntry { label_str: LabelStr::default(), item_c: 0, label_id: 0, _pad: [0; 2] }
  }
}

/// A property as returned to a caller (owned, not a borrow into the mapping).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
  pub key: String,
  pub value: String,
}

/// A vertex as returned to a caller.
#[derive(Debug, Clone)]
pub struct VertexView {
  pub id: VertexId,
  pub label_id: LabelId,
  pub neighbour_c: u32,
  pub property_c: u32,
}

/// An edge as returned to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeView {
  pub src: VertexId,
  pub dst: VertexId,
  pub label_id: LabelId,
}
