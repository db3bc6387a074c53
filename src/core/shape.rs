//! Careful abstraction of geometric shapes is a key component of a
//! clean system design. All scene nodes, primitives and composites
//! alike, implement the common **Shape** interface and the rest of
//! the system uses it without needing any details about the
//! underlying node.
//!
//! Every shape answers three queries in its local frame:
//!
//! - an axis-aligned bounding box,
//! - the nearest ray intersection,
//! - a triangle tessellation for display.

// std
use std::sync::atomic::{AtomicUsize, Ordering};
// rs_ray
use crate::core::common::Float;
use crate::core::common::HIT_EPSILON;
use crate::core::geometry::bnd3_union_pnt3f;
use crate::core::geometry::{Bounds3f, Normal3f, Point3f, Ray};
use crate::core::interaction::RayHit;
use crate::core::transform::Transform;

/// Subdivision level used when the caller does not ask for one.
pub const DEFAULT_TESSELLATION_COMPLEXITY: usize = 10;

static TESSELLATION_COMPLEXITY: AtomicUsize = AtomicUsize::new(DEFAULT_TESSELLATION_COMPLEXITY);

/// Set the process-wide tessellation complexity. Values below one are
/// raised to one.
pub fn set_tessellation_complexity(complexity: usize) {
    TESSELLATION_COMPLEXITY.store(complexity.max(1), Ordering::Relaxed);
}

pub fn tessellation_complexity() -> usize {
    TESSELLATION_COMPLEXITY.load(Ordering::Relaxed)
}

pub trait Shape: Send + Sync {
    /// Bounding box in the shape's local frame.
    fn object_bound(&self) -> Bounds3f;
    /// Nearest hit with `HIT_EPSILON < t < r.t_max`.
    fn intersect(&self, r: &Ray) -> Option<RayHit>;
    fn intersect_p(&self, r: &Ray) -> bool {
        self.intersect(r).is_some()
    }
    /// Curved shapes use `complexity` as their subdivision count, flat
    /// ones ignore it.
    fn tessellate(&self, complexity: usize) -> TriangleBuffer;
    /// The directive this node is created from.
    fn directive(&self) -> &'static str;
    /// True if the bound can change after construction, because a
    /// dynamic channel sits somewhere below this node.
    fn is_dynamic(&self) -> bool {
        false
    }
}

/// Accept a hit parameter if it lies strictly inside the ray segment.
pub fn accept_hit(t: Float, r: &Ray) -> bool {
    t > HIT_EPSILON && t < r.t_max
}

/// Indexed triangles with per-vertex normals.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TriangleBuffer {
    pub positions: Vec<Point3f>,
    pub normals: Vec<Normal3f>,
    pub indices: Vec<[usize; 3]>,
}

impl TriangleBuffer {
    pub fn new() -> Self {
        TriangleBuffer::default()
    }
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
    /// Returns the index of the new vertex.
    pub fn push_vertex(&mut self, p: Point3f, n: Normal3f) -> usize {
        self.positions.push(p);
        self.normals.push(n);
        self.positions.len() - 1
    }
    pub fn push_triangle(&mut self, i0: usize, i1: usize, i2: usize) {
        self.indices.push([i0, i1, i2]);
    }
    /// Append another buffer, offsetting its indices.
    pub fn append(&mut self, other: TriangleBuffer) {
        let offset: usize = self.positions.len();
        self.positions.extend(other.positions);
        self.normals.extend(other.normals);
        self.indices.extend(
            other
                .indices
                .iter()
                .map(|[i0, i1, i2]| [i0 + offset, i1 + offset, i2 + offset]),
        );
    }
    /// Map positions by `t` and normals by its inverse transpose.
    pub fn transform(&mut self, t: &Transform) {
        for p in self.positions.iter_mut() {
            *p = t.transform_point(p);
        }
        for n in self.normals.iter_mut() {
            let tn: Normal3f = t.transform_normal(n);
            if tn.length_squared() > 0.0 {
                *n = tn.normalize();
            }
        }
    }
    pub fn bound(&self) -> Bounds3f {
        self.positions
            .iter()
            .fold(Bounds3f::default(), |b, p| bnd3_union_pnt3f(&b, p))
    }
}
