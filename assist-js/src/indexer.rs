use crate::summary::Summary;
use ahash::HashMap;
use ahash::HashMapExt;
use parking_lot::RwLock;

/// Supplies summaries of other files. Resolving module names to files is up to the implementation.
pub trait Indexer: Send + Sync {
  fn retrieve_summary(&self, module: &str) -> Option<Summary>;
  /// Summaries of scripts that add to the global scope, keyed by file.
  fn retrieve_global_summaries(&self) -> Vec<(String, Summary)>;
}

/// An [`Indexer`] over summaries computed up front, shareable between concurrent requests.
#[derive(Default)]
pub struct MemoryIndexer {
  modules: RwLock<HashMap<String, Summary>>,
  globals: RwLock<HashMap<String, Summary>>,
}

impl MemoryIndexer {
  pub fn new() -> MemoryIndexer {
    MemoryIndexer {
      modules: RwLock::new(HashMap::new()),
      globals: RwLock::new(HashMap::new()),
    }
  }

  pub fn insert_module(&self, module: impl Into<String>, summary: Summary) {
    self.modules.write().insert(module.into(), summary);
  }

  pub fn insert_global(&self, file: impl Into<String>, summary: Summary) {
    self.globals.write().insert(file.into(), summary);
  }
}

impl Indexer for MemoryIndexer {
  fn retrieve_summary(&self, module: &str) -> Option<Summary> {
    self.modules.read().get(module).cloned()
  }

  fn retrieve_global_summaries(&self) -> Vec<(String, Summary)> {
    let mut all: Vec<_> = self
      .globals
      .read()
      .iter()
      .map(|(k, v)| (k.clone(), v.clone()))
      .collect();
    // Merge order decides conflicts, so keep it independent of hashing.
    all.sort_by(|a, b| a.0.cmp(&b.0));
    all
  }
}
