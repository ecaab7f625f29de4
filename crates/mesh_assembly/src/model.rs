//! Mergeable mesh models and the per-node model slot.

use std::sync::Arc;

/// An opaque, mergeable mesh unit.
///
/// The planner never inspects model contents. It only creates empty models
/// for failed slices and folds sibling models together.
///
/// `merge` must be associative for the final composite to be independent of
/// slice completion order; the planner always folds right into left.
pub trait MeshModel: Clone + Send + Sync + 'static {
  /// Neutral model used for slices whose generation failed.
  fn empty() -> Self;

  /// Fold `other` into `self` in place.
  fn merge(&mut self, other: &Self);
}

/// Model slot of an assembly node.
///
/// `Populated` and `Reclaimed` both count as complete. A node is reclaimed
/// once its parent has absorbed its model, so the completed flag survives
/// the memory being released.
#[derive(Debug)]
pub enum ModelSlot<M> {
  /// No model yet.
  Empty,
  /// Model available for merging into the parent.
  Populated(Arc<M>),
  /// Model handed to the parent.
  Reclaimed,
}

impl<M> Default for ModelSlot<M> {
  fn default() -> Self {
    ModelSlot::Empty
  }
}

impl<M> ModelSlot<M> {
  /// True once the slot has been populated, even after reclamation.
  #[inline]
  pub fn is_complete(&self) -> bool {
    !matches!(self, ModelSlot::Empty)
  }

  /// True while a model is available for merging.
  #[inline]
  pub fn can_merge(&self) -> bool {
    matches!(self, ModelSlot::Populated(_))
  }

  /// Current model, if populated.
  pub fn model(&self) -> Option<&Arc<M>> {
    match self {
      ModelSlot::Populated(model) => Some(model),
      _ => None,
    }
  }

  /// Populate an empty slot. Returns false (and leaves the slot alone) if
  /// the slot was ever populated before.
  pub fn populate(&mut self, model: Arc<M>) -> bool {
    if self.is_complete() {
      return false;
    }
    *self = ModelSlot::Populated(model);
    true
  }

  /// Take the model out, leaving the slot reclaimed.
  ///
  /// An empty slot stays empty.
  pub fn reclaim(&mut self) -> Option<Arc<M>> {
    match std::mem::take(self) {
      ModelSlot::Populated(model) => {
        *self = ModelSlot::Reclaimed;
        Some(model)
      }
      other => {
        *self = other;
        None
      }
    }
  }
}

/// Fold `right` into `left`, cloning `left` first if any other `Arc` still
/// shares it.
///
/// Inside the planner the live registry always holds the left child's model
/// at merge time, so every planner merge copies the left model. Models that
/// are expensive to copy should share their buffers internally.
pub fn merge_models<M: MeshModel>(left: Arc<M>, right: &M) -> Arc<M> {
  let mut merged = Arc::unwrap_or_clone(left);
  merged.merge(right);
  Arc::new(merged)
}

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;
