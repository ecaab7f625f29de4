//! mesh_assembly - Concurrent incremental merging of slice meshes
//!
//! A volume is meshed as independent slices that finish in any order on any
//! thread. This crate merges them pairwise up a static binary tree as they
//! arrive, so a partial composite is always available and the full mesh is
//! ready the moment the last slice lands.
//!
//! # Features
//!
//! - **Static assembly tree**: Built bottom-up from the ordered slice keys,
//!   odd nodes carried forward to the next layer
//! - **Non-blocking merges**: Each branch is claimed with a compare-and-swap;
//!   at most one thread merges it and no thread waits for another
//! - **Live frontier**: A snapshot of the most-merged models, never holding a
//!   node together with its ancestor
//! - **Completion gate**: Pollable or blocking signal set once the root exists
//! - **Slice pipeline**: Optional rayon driver for a [`SliceSource`]
//!
//! # Example
//!
//! ```ignore
//! use mesh_assembly::{AssemblyConfig, MergePlanner, TriangleMesh};
//!
//! let planner: MergePlanner<TriangleMesh> =
//!     MergePlanner::new(&[1, 2, 3, 4], &AssemblyConfig::default())?;
//!
//! // From worker threads, in any order:
//! planner.on_mesh_completed(3, Some(mesh_3), true)?;
//! planner.on_mesh_completed(1, Some(mesh_1), true)?;
//!
//! // Preview what exists so far
//! let partial = planner.current_models();
//!
//! planner.completion().wait();
//! let composite = planner.root_model();
//! ```

pub mod config;
pub mod error;
pub mod key;
pub mod mesh;
pub mod metrics;
pub mod model;
pub mod observer;
pub mod order;

// Static merge tree
pub mod tree;
pub use tree::{AssemblyNode, AssemblyTree, NodeId, NodeKind};

// Concurrent merge planner
pub mod planner;
pub use planner::{AssemblyProgress, CompletionSignal, LiveRegistry, MergePlanner, NodeInfo};

// Rayon-driven slice generation
pub mod pipeline;
pub use pipeline::{AssemblyPipeline, SliceReport, SliceSource};

// Re-export commonly used items
pub use config::{AssemblyConfig, PipelineConfig};
pub use error::{AssemblyError, AssemblyResult};
pub use key::{DescendingKeys, KeyAllocator, NodeKey, SliceKey};
pub use mesh::{MinMaxAABB, TriangleMesh, Vertex};
pub use model::{MeshModel, ModelSlot};
pub use observer::{AssemblyObserver, NullObserver};
pub use order::{order_slices, SliceDescriptor};

#[cfg(test)]
pub(crate) mod test_utils;
