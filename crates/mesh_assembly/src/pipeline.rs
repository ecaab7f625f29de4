//! Slice generation pipeline
//!
//! Drives a [`MergePlanner`] from a [`SliceSource`] on rayon. Every pending
//! slice becomes one job; jobs report back to the planner as they finish, in
//! whatever order the pool runs them.
//!
//! # Flow
//!
//! ```text
//! Caller                            rayon workers
//! ┌────────────────┐
//! │ start(source)  │──── one job per pending slice ───┐
//! └────────────────┘                                  ▼
//!                                            ┌──────────────────┐
//!                                            │ generate(key)    │
//!                                            │ (panic → failed) │
//!                                            └────────┬─────────┘
//!                                                     ▼
//!                                            ┌──────────────────┐
//!                                            │ on_mesh_completed│
//!                                            └────────┬─────────┘
//! ┌────────────────┐                                  │
//! │ poll_reports() │◄──────── SliceReport ────────────┘
//! └────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let planner = MergePlanner::new(&keys, &AssemblyConfig::default())?;
//! let mut pipeline = AssemblyPipeline::new(planner, &PipelineConfig::default())?;
//!
//! pipeline.start(MySource::new());
//!
//! // Poll each frame
//! for report in pipeline.poll_reports() {
//!     progress_bar.advance(report.key, report.success);
//! }
//! let preview = pipeline.planner().current_models();
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{self as channel, Receiver, Sender};
use rayon::{ThreadPool, ThreadPoolBuilder};
use web_time::Instant;

use crate::config::PipelineConfig;
use crate::error::{AssemblyError, AssemblyResult};
use crate::key::SliceKey;
use crate::model::MeshModel;
use crate::planner::MergePlanner;

/// Produces the mesh for one slice.
///
/// Called concurrently from pool threads. Returning `None` marks the slice as
/// failed; so does panicking.
pub trait SliceSource<M>: Send + Sync + 'static {
  fn generate(&self, key: SliceKey) -> Option<M>;
}

impl<M, F> SliceSource<M> for F
where
  F: Fn(SliceKey) -> Option<M> + Send + Sync + 'static,
{
  fn generate(&self, key: SliceKey) -> Option<M> {
    self(key)
  }
}

/// Outcome of one slice job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliceReport {
  pub key: SliceKey,
  /// False if the source returned nothing, panicked, or the planner rejected
  /// the completion.
  pub success: bool,
  /// Time spent in [`SliceSource::generate`], in microseconds.
  pub generate_us: u64,
  pub error: Option<String>,
}

/// Runs slice generation on rayon and feeds the results to a planner.
pub struct AssemblyPipeline<M: MeshModel> {
  planner: Arc<MergePlanner<M>>,
  /// Dedicated pool, or `None` for rayon's global pool.
  pool: Option<Arc<ThreadPool>>,
  sender: Sender<SliceReport>,
  receiver: Receiver<SliceReport>,
  started: bool,
}

impl<M: MeshModel> AssemblyPipeline<M> {
  pub fn new(planner: MergePlanner<M>, config: &PipelineConfig) -> AssemblyResult<Self> {
    Self::from_shared(Arc::new(planner), config)
  }

  /// Wrap a planner that other threads may already hold.
  pub fn from_shared(planner: Arc<MergePlanner<M>>, config: &PipelineConfig) -> AssemblyResult<Self> {
    let pool = if config.uses_dedicated_pool() {
      let pool = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .thread_name(|i| format!("mesh-assembly-{i}"))
        .build()
        .map_err(|e| AssemblyError::ThreadPool(e.to_string()))?;
      Some(Arc::new(pool))
    } else {
      None
    };

    let (sender, receiver) = channel::unbounded();
    Ok(Self {
      planner,
      pool,
      sender,
      receiver,
      started: false,
    })
  }

  /// Check if jobs have been queued.
  pub fn is_started(&self) -> bool {
    self.started
  }

  /// Queue one job per pending slice (non-blocking).
  ///
  /// Returns `true` if started, `false` if already started.
  pub fn start<S: SliceSource<M>>(&mut self, source: S) -> bool {
    if self.started {
      return false;
    }
    self.started = true;

    let source = Arc::new(source);
    let pending = self.planner.pending_slices();
    tracing::debug!(slices = pending.len(), dedicated_pool = self.pool.is_some(), "starting slice jobs");

    for key in pending {
      let planner = Arc::clone(&self.planner);
      let source = Arc::clone(&source);
      let sender = self.sender.clone();
      let job = move || {
        let report = run_slice_job(&planner, source.as_ref(), key);
        // Ignore send error (pipeline dropped = nobody is polling)
        let _ = sender.send(report);
      };

      match &self.pool {
        Some(pool) => pool.spawn(job),
        None => rayon::spawn(job),
      }
    }

    true
  }

  /// Drain finished slice reports (non-blocking).
  pub fn poll_reports(&self) -> Vec<SliceReport> {
    self.receiver.try_iter().collect()
  }

  /// Block until the planner's root is assembled or `timeout` elapses.
  pub fn wait_for_assembly(&self, timeout: Duration) -> bool {
    self.planner.completion().wait_timeout(timeout)
  }

  pub fn planner(&self) -> &Arc<MergePlanner<M>> {
    &self.planner
  }

  /// Worker threads available to slice jobs.
  pub fn num_threads(&self) -> usize {
    match &self.pool {
      Some(pool) => pool.current_num_threads(),
      None => rayon::current_num_threads(),
    }
  }
}

/// Generate one slice and report it to the planner.
fn run_slice_job<M: MeshModel, S: SliceSource<M> + ?Sized>(
  planner: &MergePlanner<M>,
  source: &S,
  key: SliceKey,
) -> SliceReport {
  let start = Instant::now();
  let outcome = panic::catch_unwind(AssertUnwindSafe(|| source.generate(key)));
  let generate_us = start.elapsed().as_micros() as u64;

  let (mesh, mut error) = match outcome {
    Ok(Some(mesh)) => (Some(mesh), None),
    Ok(None) => (None, Some("source produced no mesh".to_string())),
    Err(payload) => {
      let message = panic_message(payload.as_ref());
      tracing::warn!(slice = key, %message, "slice generation panicked");
      (None, Some(message))
    }
  };

  let mut success = mesh.is_some();
  if let Err(e) = planner.on_mesh_completed(key, mesh, success) {
    tracing::warn!(slice = key, error = %e, "planner rejected slice completion");
    success = false;
    error = Some(e.to_string());
  }

  SliceReport {
    key,
    success,
    generate_us,
    error,
  }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    format!("panicked: {message}")
  } else if let Some(message) = payload.downcast_ref::<String>() {
    format!("panicked: {message}")
  } else {
    "panicked".to_string()
  }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;
