//! Per-database override of the size-adjacent build-time constants.
//!
//! Grounded on the teacher's `SingleFileOpenOptions` builder idiom: a
//! `Default` impl seeded with the compile-time constants, plus `fn foo(mut
//! self, v: T) -> Self` chain methods so callers only override what they
//! need.

use crate::constants;
use crate::logging::{self, LogSink};
use std::sync::Arc;

#[derive(Clone)]
pub struct GraphConfig {
  pub initial_file_size: u64,
  pub growth_factor: u64,
  pub max_vertex_labels: usize,
  pub max_edge_labels: usize,
  pub log_sink: Arc<dyn LogSink>,
}

impl Default for GraphConfig {
  fn default() -> Self {
    GraphConfig {
      initial_file_size: constants::INITIAL_FILE_SIZE,
      growth_factor: constants::GROWTH_FACTOR,
      max_vertex_labels: constants::MAX_VERTEX_LABELS,
      max_edge_labels: constants::MAX_EDGE_LABELS,
      log_sink: logging::default_sink(),
    }
  }
}

impl GraphConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn initial_file_size(mut self, bytes: u64) -> Self {
    self.initial_file_size = bytes;
    self
  }

  pub fn growth_factor(mut self, factor: u64) -> Self {
    self.growth_factor = factor;
    self
  }

  pub fn max_vertex_labels(mut self, n: usize) -> Self {
    self.max_vertex_labels = n;
    self
  }

  pub fn max_edge_labels(mut self, n: usize) -> Self {
    self.max_edge_labels = n;
    self
  }

  pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
    self.log_sink = sink;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_match_constants() {
    let cfg = GraphConfig::default();
    assert_eq!(cfg.initial_file_size, constants::INITIAL_FILE_SIZE);
    assert_eq!(cfg.growth_factor, constants::GROWTH_FACTOR);
  }

  #[test]
  fn builder_overrides() {
    let cfg = GraphConfig::new().initial_file_size(4096).max_vertex_labels(16);
    assert_eq!(cfg.initial_file_size, 4096);
    assert_eq!(cfg.max_vertex_labels, 16);
  }
}
