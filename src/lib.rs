//! An embedded, memory-mapped labelled property graph storage engine.
//!
//! The engine persists a directed multigraph across restarts through six
//! files per graph (master, index, vertices, edges, properties,
//! transactions), memory-maps them for zero-copy reads, and serialises
//! mutations through a write-ahead transaction log so crashes recover by
//! replay. See `graph::Graph` for the public surface.
//!
//! GUI/terminal frontends, ingest adapters, the analytic algorithms
//! themselves (PageRank, BFS, connected components), and a query-template
//! layer are external collaborators; this crate ships only the storage
//! engine and the `edgemap`/`outdegree`/`source_edgemap` primitives those
//! algorithms consume.

#![allow(dead_code)]

pub mod analytic;
pub mod block_file;
pub mod config;
pub mod constants;
pub mod disk;
pub mod error;
pub mod graph;
pub mod index_file;
pub mod logging;
pub mod txlog;
pub mod types;

pub use config::GraphConfig;
pub use error::{ActionState, Error, Result};
pub use graph::Graph;
pub use logging::{Level, LogSink, NullSink, StderrSink};
