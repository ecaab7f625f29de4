//! LiveRegistry - the current merge frontier, readable at any time.
//!
//! Holds one displayable model per node whose subtree has merged as far as it
//! can so far. A merge swaps the two children's entries for the parent's in a
//! single write, so readers never see a node alongside its ancestor.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::key::NodeKey;

struct RegistryState<M> {
  models: BTreeMap<NodeKey, Arc<M>>,
  /// Flattened view, rebuilt lazily after any mutation.
  cache: Option<Arc<[Arc<M>]>>,
}

/// Reader-writer locked map of frontier models with a cached snapshot.
pub struct LiveRegistry<M> {
  state: RwLock<RegistryState<M>>,
}

impl<M> Default for LiveRegistry<M> {
  fn default() -> Self {
    Self::new()
  }
}

impl<M> LiveRegistry<M> {
  pub fn new() -> Self {
    Self {
      state: RwLock::new(RegistryState {
        models: BTreeMap::new(),
        cache: None,
      }),
    }
  }

  /// Register a completed leaf.
  pub fn insert(&self, key: NodeKey, model: Arc<M>) {
    let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
    state.models.insert(key, model);
    state.cache = None;
  }

  /// Replace merged children with their parent in one step.
  pub fn replace(&self, children: &[NodeKey], parent: NodeKey, model: Arc<M>) {
    let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
    for child in children {
      state.models.remove(child);
    }
    state.models.insert(parent, model);
    state.cache = None;
  }

  /// Flattened frontier models, ordered by node key.
  ///
  /// Served from the cache when nothing changed since the last read.
  pub fn snapshot(&self) -> Arc<[Arc<M>]> {
    {
      let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
      if let Some(cache) = &state.cache {
        return Arc::clone(cache);
      }
    }

    let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
    // Another reader may have rebuilt it between the two locks.
    if let Some(cache) = &state.cache {
      return Arc::clone(cache);
    }
    let flattened: Arc<[Arc<M>]> = state.models.values().cloned().collect();
    state.cache = Some(Arc::clone(&flattened));
    flattened
  }

  /// Frontier entries with their keys, ordered by node key.
  pub fn entries(&self) -> Vec<(NodeKey, Arc<M>)> {
    let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
    state
      .models
      .iter()
      .map(|(key, model)| (*key, Arc::clone(model)))
      .collect()
  }

  /// Frontier keys, ordered.
  pub fn keys(&self) -> Vec<NodeKey> {
    let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
    state.models.keys().copied().collect()
  }

  pub fn len(&self) -> usize {
    self.state.read().unwrap_or_else(PoisonError::into_inner).models.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
