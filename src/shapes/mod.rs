//! Every node a scene file can create is a **Shape**. Primitives
//! answer ray queries analytically, composites forward them to their
//! children.
//!
//! Primitives (local frame, y is the axis of symmetry):
//!
//! - Box
//! - Cone
//! - Cylinder
//! - Sphere
//! - Torus
//! - Triangle
//!
//! Composites:
//!
//! - ShapeList
//! - TriangleList
//! - StaticAffineShape
//! - DynamicAffineShape
//! - FileInstance
//!
//! ## Spheres
//!
//! Spheres are a special case of a general type of surfaces called
//! quadrics. They are the simplest type of curved surfaces that is
//! useful to a ray tracer and are a good starting point for general
//! ray intersection routines.
//!
//! ## Cylinders and Cones
//!
//! Both are quadrics closed by flat caps, centered on the y axis.
//!
//! ## Tori
//!
//! A ray meets a torus in up to four points. The quartic is solved in
//! closed form (Ferrari) in a frame scaled to the torus, and every root
//! is polished with a few Newton steps.
//!
//! ## Triangle Lists
//!
//! A more memory-efficient representation than a list of **Triangle**
//! shapes is to store an array of vertex positions once, where each
//! individual triangle just stores three offsets into this array.
//!
//! ## Affine Wrappers and Instances
//!
//! A transform node maps the incoming ray into its child's frame and
//! the resulting hit back out. **FileInstance** does the same for a
//! whole scene file, which is parsed once and shared.

// std
use std::f64::consts::PI;
// rs_ray
use crate::core::common::Float;
use crate::core::geometry::{Normal3f, Point3f};
use crate::core::shape::TriangleBuffer;

pub mod affine;
pub mod boxshape;
pub mod cone;
pub mod cylinder;
pub mod fileinstance;
pub mod shapelist;
pub mod sphere;
pub mod torus;
pub mod triangle;
pub mod trianglelist;

/// One point of a profile curve in the (radius, height) half-plane.
#[derive(Debug, Copy, Clone)]
pub struct ProfileVertex {
    pub radius: Float,
    pub y: Float,
    /// normal in the half-plane, radial part
    pub nr: Float,
    /// normal in the half-plane, axial part
    pub ny: Float,
}

/// Sweep profile strips around the y axis through `center`. Each
/// strip runs counter-clockwise in the half-plane (outward normal on
/// its right), which gives outward facing triangles. Every strip of
/// `m` vertices yields `2 * (m - 1) * slices` triangles.
pub fn lathe(center: &Point3f, strips: &[Vec<ProfileVertex>], slices: usize) -> TriangleBuffer {
    let slices: usize = slices.max(3);
    let mut buffer: TriangleBuffer = TriangleBuffer::new();
    for strip in strips {
        if strip.len() < 2 {
            continue;
        }
        // rows of _slices + 1_ vertices, the seam is duplicated
        let first: usize = buffer.vertex_count();
        for v in strip {
            for j in 0..=slices {
                let phi: Float = 2.0 * PI * j as Float / slices as Float;
                let (sin_phi, cos_phi) = phi.sin_cos();
                buffer.push_vertex(
                    Point3f {
                        x: center.x + v.radius * cos_phi,
                        y: center.y + v.y,
                        z: center.z + v.radius * sin_phi,
                    },
                    Normal3f {
                        x: v.nr * cos_phi,
                        y: v.ny,
                        z: v.nr * sin_phi,
                    },
                );
            }
        }
        let row: usize = slices + 1;
        for i in 0..strip.len() - 1 {
            for j in 0..slices {
                let a0: usize = first + i * row + j;
                let a1: usize = a0 + 1;
                let b0: usize = a0 + row;
                let b1: usize = b0 + 1;
                buffer.push_triangle(a0, b0, a1);
                buffer.push_triangle(a1, b0, b1);
            }
        }
    }
    buffer
}

/// Cast a grid of rays at `shape` from several directions, from
/// outside and from the center of its bound, and check that every
/// hit lies inside the bound. Returns the number of hits.
#[cfg(test)]
pub(crate) fn assert_hits_inside_bound(shape: &dyn crate::core::shape::Shape) -> usize {
    use crate::core::geometry::{bnd3_expand, pnt3_inside_bnd3, vec3_cross_vec3};
    use crate::core::geometry::{Bounds3f, Ray, Vector3f};

    const GRID: usize = 24;
    let bound: Bounds3f = shape.object_bound();
    let diagonal: Vector3f = bound.p_max - bound.p_min;
    let size: Float = diagonal.length();
    let center: Point3f = bound.p_min + diagonal * 0.5;
    let grown: Bounds3f = bnd3_expand(&bound, 1e-6 * size.max(1.0));
    let directions: [[Float; 3]; 9] = [
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [1.0, 1.0, 1.0],
        [-1.0, 0.5, 0.25],
        [0.3, -1.0, 0.7],
    ];
    let mut hits: usize = 0;
    for [x, y, z] in directions.iter() {
        let d: Vector3f = Vector3f::new(*x, *y, *z).normalize();
        // two axes spanning the plane across _d_
        let helper: Vector3f = if d.x.abs() < 0.9 {
            Vector3f::new(1.0, 0.0, 0.0)
        } else {
            Vector3f::new(0.0, 1.0, 0.0)
        };
        let u: Vector3f = vec3_cross_vec3(&d, &helper).normalize();
        let v: Vector3f = vec3_cross_vec3(&d, &u);
        let mut rays: Vec<Ray> = vec![Ray::new(center, d)];
        for i in 0..=GRID {
            for j in 0..=GRID {
                let a: Float = (i as Float / GRID as Float - 0.5) * 1.2 * size;
                let b: Float = (j as Float / GRID as Float - 0.5) * 1.2 * size;
                let o: Point3f = center - d * (2.0 * size) + u * a + v * b;
                rays.push(Ray::new(o, d));
            }
        }
        for ray in &rays {
            if let Some(hit) = shape.intersect(ray) {
                hits += 1;
                assert!(
                    pnt3_inside_bnd3(&hit.p, &grown),
                    "{} hit {:?} outside its bound {:?}",
                    shape.directive(),
                    hit.p,
                    bound
                );
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{nrm_dot_vec3f, vec3_cross_vec3, Vector3f};

    #[test]
    fn lathe_counts_and_orientation() {
        // open cylinder side of radius 1 from y = 0 to y = 1
        let strip = vec![
            ProfileVertex {
                radius: 1.0,
                y: 0.0,
                nr: 1.0,
                ny: 0.0,
            },
            ProfileVertex {
                radius: 1.0,
                y: 1.0,
                nr: 1.0,
                ny: 0.0,
            },
        ];
        let buffer = lathe(&Point3f::default(), &[strip], 8);
        assert_eq!(buffer.triangle_count(), 16);
        assert_eq!(buffer.vertex_count(), 18);
        for [i0, i1, i2] in &buffer.indices {
            let p0 = buffer.positions[*i0];
            let e1: Vector3f = buffer.positions[*i1] - p0;
            let e2: Vector3f = buffer.positions[*i2] - p0;
            let face = vec3_cross_vec3(&e1, &e2);
            assert!(nrm_dot_vec3f(&buffer.normals[*i0], &face) > 0.0);
        }
    }
}
