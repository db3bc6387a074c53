//! The geometry of a particular point on a surface is represented by
//! a **RayHit**. Shapes report the ray parameter together with the
//! hit point and the geometric normal, all in the frame of the shape
//! that answered the query.

// rs_ray
use crate::core::common::Float;
use crate::core::geometry::{Normal3f, Point3f};
use crate::core::transform::Transform;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct RayHit {
    /// ray parameter of the hit
    pub t: Float,
    pub p: Point3f,
    /// unit length, facing outwards for closed shapes
    pub n: Normal3f,
}

impl RayHit {
    pub fn new(t: Float, p: Point3f, n: Normal3f) -> Self {
        RayHit {
            t,
            p,
            n: n.normalize(),
        }
    }
    /// Express the hit in the parent frame of `transform`. The ray
    /// parameter stays untouched.
    pub fn transform(&self, transform: &Transform) -> RayHit {
        RayHit {
            t: self.t,
            p: transform.transform_point(&self.p),
            n: transform.transform_normal(&self.n).normalize(),
        }
    }
}
