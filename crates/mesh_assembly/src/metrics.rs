//! Engine-agnostic metrics collection for assembly progress.
//!
//! Feature-gated and runtime-toggled to ensure zero overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use mesh_assembly::metrics::COLLECT_METRICS;
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! let snapshot = planner.metrics().snapshot();
//! println!("{} merges, avg {:.1}us", snapshot.merges_performed, snapshot.avg_merge_us);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Runtime toggle for metrics collection.
/// Set to false to disable metrics gathering at runtime.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Rolling window for storing recent values (e.g., timing history).
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
  buffer: VecDeque<T>,
  capacity: usize,
}

impl<T> RollingWindow<T> {
  /// Create a new rolling window with the given capacity.
  pub fn new(capacity: usize) -> Self {
    Self {
      buffer: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  /// Push a new value, evicting the oldest if at capacity.
  pub fn push(&mut self, value: T) {
    if self.buffer.len() >= self.capacity {
      self.buffer.pop_front();
    }
    self.buffer.push_back(value);
  }

  pub fn len(&self) -> usize {
    self.buffer.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  /// Get the most recent value.
  pub fn last(&self) -> Option<&T> {
    self.buffer.back()
  }
}

impl RollingWindow<u64> {
  /// Compute the average of all values.
  pub fn average(&self) -> f64 {
    if self.buffer.is_empty() {
      0.0
    } else {
      self.buffer.iter().sum::<u64>() as f64 / self.buffer.len() as f64
    }
  }

  /// Get min and max values.
  pub fn min_max(&self) -> Option<(u64, u64)> {
    let min = *self.buffer.iter().min()?;
    let max = *self.buffer.iter().max()?;
    Some((min, max))
  }
}

impl Default for RollingWindow<u64> {
  fn default() -> Self {
    Self::new(128)
  }
}

/// Point-in-time copy of [`AssemblyMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricsSnapshot {
  pub leaves_completed: u64,
  pub leaves_failed: u64,
  pub merges_performed: u64,
  /// Merge attempts abandoned because another thread held the claim.
  pub claims_deferred: u64,
  /// Average of the recent merge timings in microseconds.
  pub avg_merge_us: f64,
  pub last_merge_us: u64,
}

/// Planner statistics, updated concurrently by worker threads.
#[derive(Debug)]
pub struct AssemblyMetrics {
  leaves_completed: AtomicU64,
  leaves_failed: AtomicU64,
  merges_performed: AtomicU64,
  claims_deferred: AtomicU64,
  merge_timings: Mutex<RollingWindow<u64>>,
}

impl Default for AssemblyMetrics {
  fn default() -> Self {
    Self {
      leaves_completed: AtomicU64::new(0),
      leaves_failed: AtomicU64::new(0),
      merges_performed: AtomicU64::new(0),
      claims_deferred: AtomicU64::new(0),
      merge_timings: Mutex::new(RollingWindow::default()),
    }
  }
}

impl AssemblyMetrics {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record a slice completion.
  pub fn record_leaf(&self, success: bool) {
    if !is_enabled() {
      return;
    }
    self.leaves_completed.fetch_add(1, Ordering::Relaxed);
    if !success {
      self.leaves_failed.fetch_add(1, Ordering::Relaxed);
    }
  }

  /// Record a branch merge and how long the model fold took.
  pub fn record_merge(&self, timing_us: u64) {
    if !is_enabled() {
      return;
    }
    self.merges_performed.fetch_add(1, Ordering::Relaxed);
    self
      .merge_timings
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(timing_us);
  }

  /// Record a merge left to a concurrent claimant.
  pub fn record_deferred_claim(&self) {
    if is_enabled() {
      self.claims_deferred.fetch_add(1, Ordering::Relaxed);
    }
  }

  pub fn snapshot(&self) -> MetricsSnapshot {
    let timings = self.merge_timings.lock().unwrap_or_else(PoisonError::into_inner);
    MetricsSnapshot {
      leaves_completed: self.leaves_completed.load(Ordering::Relaxed),
      leaves_failed: self.leaves_failed.load(Ordering::Relaxed),
      merges_performed: self.merges_performed.load(Ordering::Relaxed),
      claims_deferred: self.claims_deferred.load(Ordering::Relaxed),
      avg_merge_us: timings.average(),
      last_merge_us: timings.last().copied().unwrap_or(0),
    }
  }
}
