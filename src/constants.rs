//! Magic numbers and build-time tunables.
//!
//! Mirrors the configuration table of the engine's external interface;
//! `GraphConfig` (see `config.rs`) lets a caller override the size-adjacent
//! subset of these per database at create/open time.

/// Master-file magic, written at graph creation and checked on open.
pub const MAGIC_GRAPH: [u8; 8] = *b"LPGSTOR1";

/// Max label string bytes (vertex and edge labels share this bound).
pub const LABEL_LEN: usize = 20;

/// Max property key bytes.
pub const PROP_KEY_LEN: usize = 20;
/// Max property value bytes.
pub const PROP_VAL_LEN: usize = 20;

/// Max graph name bytes.
pub const GRAPH_NAME_LEN: usize = 20;
/// Max graph type bytes.
pub const GRAPH_TYPE_LEN: usize = 15;

/// Payloads per edge block.
pub const EDGE_BLOCK_SLOTS: usize = 3;
/// Payloads per property block.
pub const PROP_BLOCK_SLOTS: usize = 3;

/// Vertex label dictionary capacity.
pub const MAX_VERTEX_LABELS: usize = 128;
/// Edge label dictionary capacity.
pub const MAX_EDGE_LABELS: usize = 128;

/// Initial file size handed to the disk driver on `create`.
pub const INITIAL_FILE_SIZE: u64 = 1024;

/// Grow-on-overflow multiplier applied by the disk driver.
pub const GROWTH_FACTOR: u64 = 10;

/// Sentinel marking the end of a chain / an unset offset.
pub const END: u32 = 0xFFFF_FFFF;

/// Sentinel meaning "auto-assign" when passed as an optional vertex id.
pub const AUTO_ID: i64 = -1;

/// Reserved, unused value for a block's `version` field (see design notes:
/// this field is carried but never advanced by this version).
pub const VERSION_SENTINEL: u32 = END;

pub mod file_names {
  pub const MASTER: &str = "master";
  pub const INDEX: &str = "index";
  pub const VERTICES: &str = "vertices";
  pub const EDGES: &str = "edges";
  pub const PROPERTIES: &str = "properties";
  pub const TRANSACTIONS: &str = "transactions";
}
