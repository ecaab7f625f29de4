//! Indexed triangle mesh usable as a [`MeshModel`].
//!
//! Merging appends the right mesh's buffers to the left mesh and re-bases
//! its indices. No geometry is welded or clipped.

use smallvec::SmallVec;

use crate::key::SliceKey;
use crate::model::MeshModel;

/// Mesh vertex.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
  /// Vertex position in volume space.
  pub position: [f32; 3],

  /// Surface normal (unit vector).
  pub normal: [f32; 3],
}

impl Vertex {
  pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
    Self { position, normal }
  }
}

impl Default for Vertex {
  fn default() -> Self {
    Self {
      position: [0.0; 3],
      normal: [0.0, 0.0, 1.0],
    }
  }
}

/// Axis-aligned bounding box.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxAABB {
  pub min: [f32; 3],
  pub max: [f32; 3],
}

impl MinMaxAABB {
  /// Create AABB with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: [f32::INFINITY; 3],
      max: [f32::NEG_INFINITY; 3],
    }
  }

  /// Expand AABB to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: [f32; 3]) {
    for i in 0..3 {
      self.min[i] = self.min[i].min(point[i]);
      self.max[i] = self.max[i].max(point[i]);
    }
  }

  /// Expand AABB to include another box. Empty boxes are ignored.
  #[inline]
  pub fn union(&mut self, other: &MinMaxAABB) {
    if other.is_valid() {
      self.encapsulate(other.min);
      self.encapsulate(other.max);
    }
  }

  /// Check if AABB is valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min[0] <= self.max[0] && self.min[1] <= self.max[1] && self.min[2] <= self.max[2]
  }
}

impl Default for MinMaxAABB {
  fn default() -> Self {
    Self::empty()
  }
}

/// Triangle mesh built from one or more slices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleMesh {
  pub vertices: Vec<Vertex>,

  /// Triangle indices (3 indices per triangle).
  pub indices: Vec<u32>,

  /// Bounding box encompassing all vertices.
  pub bounds: MinMaxAABB,

  /// Slices whose geometry this mesh contains, in merge order.
  pub sources: SmallVec<[SliceKey; 4]>,
}

impl TriangleMesh {
  pub fn new() -> Self {
    Self::default()
  }

  /// Mesh for a single slice.
  pub fn from_slice(key: SliceKey, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
    let mut bounds = MinMaxAABB::empty();
    for v in &vertices {
      bounds.encapsulate(v.position);
    }
    let mut sources = SmallVec::new();
    sources.push(key);
    Self {
      vertices,
      indices,
      bounds,
      sources,
    }
  }

  /// Returns true if no geometry is present.
  pub fn is_empty(&self) -> bool {
    self.vertices.is_empty()
  }

  pub fn vertex_count(&self) -> usize {
    self.vertices.len()
  }

  /// Number of triangles in the mesh.
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }
}

impl MeshModel for TriangleMesh {
  fn empty() -> Self {
    Self::default()
  }

  fn merge(&mut self, other: &Self) {
    let base = self.vertices.len() as u32;
    self.vertices.extend_from_slice(&other.vertices);
    self.indices.extend(other.indices.iter().map(|i| i + base));
    self.bounds.union(&other.bounds);
    self.sources.extend_from_slice(&other.sources);
  }
}

#[cfg(test)]
#[path = "mesh_test.rs"]
mod mesh_test;
