//! Injected logging sink.
//!
//! The engine never picks its own sink: callers construct a graph with a
//! `Arc<dyn LogSink>`, and the engine calls into it at the events the
//! external interface spec lists (create/open/close, flush start/end,
//! mutation warnings, replay start/end). There is no hidden default
//! singleton inside the core.

use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
  Debug,
  Info,
  Warning,
  Error,
}

impl Level {
  fn as_str(self) -> &'static str {
    match self {
      Level::Debug => "debug",
      Level::Info => "info",
      Level::Warning => "warning",
      Level::Error => "error",
    }
  }
}

pub trait LogSink: Send + Sync {
  fn log(&self, level: Level, message: &str);

  fn debug(&self, message: &str) {
    self.log(Level::Debug, message);
  }

  fn info(&self, message: &str) {
    self.log(Level::Info, message);
  }

  fn warning(&self, message: &str) {
    self.log(Level::Warning, message);
  }

  fn error(&self, message: &str) {
    self.log(Level::Error, message);
  }
}

/// Default sink: writes `[level] message` to stderr.
pub struct StderrSink;

impl LogSink for StderrSink {
  fn log(&self, level: Level, message: &str) {
    eprintln!("[{}] {}", level.as_str(), message);
  }
}

/// Sink that discards everything. Useful in tests where log noise isn't
/// part of the assertion.
pub struct NullSink;

impl LogSink for NullSink {
  fn log(&self, _level: Level, _message: &str) {}
}

pub fn default_sink() -> Arc<dyn LogSink> {
  Arc::new(StderrSink)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Mutex;

  struct CapturingSink {
    events: Mutex<Vec<(Level, String)>>,
  }

  impl LogSink for CapturingSink {
    fn log(&self, level: Level, message: &str) {
      self.events.lock().unwrap().push((level, message.to_string()));
    }
  }

  #[test]
  fn captures_all_levels() {
    let sink = CapturingSink { events: Mutex::new(Vec::new()) };
    sink.debug("d");
    sink.info("i");
    sink.warning("w");
    sink.error("e");
    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 4);
    assert_eq!(events[2].0, Level::Warning);
  }
}
