//! Planner and pipeline configuration.

/// Configuration for building an assembly plan.
#[derive(Clone, Debug, PartialEq)]
pub struct AssemblyConfig {
  /// First branch key handed out by the default key allocator.
  /// Keys count down from here, so this must sit above every slice key.
  pub branch_key_base: u64,

  /// Round slice sort keys to the nearest integer before ordering.
  /// Slices whose averaged coordinate lands in the same unit keep their
  /// input order relative to each other.
  pub round_sort_keys: bool,

  /// Sort key used for slices that have no coordinate to average.
  pub missing_sort_key: f64,
}

impl Default for AssemblyConfig {
  fn default() -> Self {
    Self {
      branch_key_base: u64::MAX,
      round_sort_keys: true,
      missing_sort_key: -1.0,
    }
  }
}

impl AssemblyConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_branch_key_base(mut self, base: u64) -> Self {
    self.branch_key_base = base;
    self
  }

  pub fn with_round_sort_keys(mut self, round: bool) -> Self {
    self.round_sort_keys = round;
    self
  }

  pub fn with_missing_sort_key(mut self, value: f64) -> Self {
    self.missing_sort_key = value;
    self
  }
}

/// Configuration for the reference slice-generation pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineConfig {
  /// Worker threads for a dedicated rayon pool (0 = use rayon's global pool).
  pub num_threads: usize,
}

impl PipelineConfig {
  /// Run on rayon's global pool.
  pub const GLOBAL_POOL: Self = Self { num_threads: 0 };

  pub fn with_threads(num_threads: usize) -> Self {
    Self { num_threads }
  }

  /// Check if a dedicated pool should be built.
  #[inline]
  pub fn uses_dedicated_pool(&self) -> bool {
    self.num_threads > 0
  }
}
