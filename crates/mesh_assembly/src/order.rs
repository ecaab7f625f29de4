//! Leaf ordering for the first tree layer.
//!
//! Adjacent slices in the ordering become leaf siblings, so the ordering
//! decides which meshes merge first. Slice discovery supplies one sort key
//! per slice (typically the averaged Z of its polygons).

use std::cmp::Ordering;

use crate::config::AssemblyConfig;
use crate::key::SliceKey;

/// A discovered slice and the coordinate used to order it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliceDescriptor {
  pub key: SliceKey,
  /// Averaged spatial coordinate, `None` when the slice has no geometry to average.
  pub sort_key: Option<f64>,
}

impl SliceDescriptor {
  pub fn new(key: SliceKey, sort_key: f64) -> Self {
    Self {
      key,
      sort_key: Some(sort_key),
    }
  }

  /// Descriptor for a slice with no coordinate.
  pub fn unplaced(key: SliceKey) -> Self {
    Self {
      key,
      sort_key: None,
    }
  }

  /// Effective sort key after applying the fallback and rounding rules.
  ///
  /// Rounding is half-to-even, and `-0.0` is folded into `+0.0` so both
  /// compare as the same key.
  #[inline]
  pub fn effective_sort_key(&self, config: &AssemblyConfig) -> f64 {
    let value = self.sort_key.unwrap_or(config.missing_sort_key);
    let value = if config.round_sort_keys {
      value.round_ties_even()
    } else {
      value
    };
    value + 0.0
  }
}

/// Order on effective sort keys. Signed zeros are equal; NaN sorts last.
#[inline]
pub fn compare_sort_keys(a: f64, b: f64) -> Ordering {
  a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

/// Order slices for the first tree layer.
///
/// Stable: slices with equal effective sort keys keep their input order.
pub fn order_slices(slices: &[SliceDescriptor], config: &AssemblyConfig) -> Vec<SliceKey> {
  let mut keyed: Vec<(f64, SliceKey)> = slices
    .iter()
    .map(|s| (s.effective_sort_key(config), s.key))
    .collect();
  keyed.sort_by(|a, b| compare_sort_keys(a.0, b.0));
  keyed.into_iter().map(|(_, key)| key).collect()
}

#[cfg(test)]
#[path = "order_test.rs"]
mod order_test;
