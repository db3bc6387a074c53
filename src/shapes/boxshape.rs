//! Axis-aligned box given by its center and edge lengths.

// others
use strum::IntoEnumIterator;
// rs_ray
use crate::core::common::Float;
use crate::core::error::Result;
use crate::core::geometry::{Bounds3f, Normal3f, Point3f, Ray, Vector3f, XYZEnum};
use crate::core::interaction::RayHit;
use crate::core::parser::SceneParser;
use crate::core::shape::{accept_hit, Shape, TriangleBuffer};

#[derive(Debug, Clone)]
pub struct BoxShape {
    pub center: Point3f,
    /// edge lengths along x, y and z
    pub lengths: Vector3f,
}

impl BoxShape {
    pub const DIRECTIVE: &'static str = "box";

    pub fn new(center: Point3f, lengths: Vector3f) -> Self {
        BoxShape { center, lengths }
    }
    /// `box cx cy cz lx ly lz`
    pub fn create(parser: &mut SceneParser) -> Result<Box<dyn Shape>> {
        let center: Point3f = parser.next_point3f()?;
        let lengths: Vector3f = Vector3f {
            x: parser.next_positive_float("edge length")?,
            y: parser.next_positive_float("edge length")?,
            z: parser.next_positive_float("edge length")?,
        };
        Ok(Box::new(BoxShape::new(center, lengths)))
    }
    fn bounds(&self) -> Bounds3f {
        let half: Vector3f = self.lengths * 0.5;
        Bounds3f::new(self.center - half, self.center + half)
    }
}

fn axis_normal(axis: XYZEnum, sign: Float) -> Normal3f {
    let mut n: Normal3f = Normal3f::default();
    n[axis] = sign;
    n
}

impl Shape for BoxShape {
    fn object_bound(&self) -> Bounds3f {
        self.bounds()
    }
    fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        let b: Bounds3f = self.bounds();
        let mut t_near: Float = std::f64::NEG_INFINITY;
        let mut t_far: Float = std::f64::INFINITY;
        let mut n_near: Normal3f = Normal3f::default();
        let mut n_far: Normal3f = Normal3f::default();
        for axis in XYZEnum::iter() {
            let d: Float = ray.d[axis];
            let o: Float = ray.o[axis];
            if d == 0.0 {
                // parallel to the slab, inside or never
                if o < b.p_min[axis] || o > b.p_max[axis] {
                    return None;
                }
                continue;
            }
            let inv_d: Float = 1.0 / d;
            let mut t0: Float = (b.p_min[axis] - o) * inv_d;
            let mut t1: Float = (b.p_max[axis] - o) * inv_d;
            // entering through the min face means the outward normal points
            // to -axis
            let mut sign_near: Float = -1.0;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
                sign_near = 1.0;
            }
            if t0 > t_near {
                t_near = t0;
                n_near = axis_normal(axis, sign_near);
            }
            if t1 < t_far {
                t_far = t1;
                n_far = axis_normal(axis, -sign_near);
            }
            if t_near > t_far {
                return None;
            }
        }
        if accept_hit(t_near, ray) {
            Some(RayHit::new(t_near, ray.position(t_near), n_near))
        } else if accept_hit(t_far, ray) {
            Some(RayHit::new(t_far, ray.position(t_far), n_far))
        } else {
            None
        }
    }
    fn tessellate(&self, _complexity: usize) -> TriangleBuffer {
        let b: Bounds3f = self.bounds();
        let mut buffer: TriangleBuffer = TriangleBuffer::new();
        for axis in XYZEnum::iter() {
            // the two remaining axes, ordered so that u x v points along +axis
            let (u, v) = match axis {
                XYZEnum::X => (XYZEnum::Y, XYZEnum::Z),
                XYZEnum::Y => (XYZEnum::Z, XYZEnum::X),
                XYZEnum::Z => (XYZEnum::X, XYZEnum::Y),
            };
            for sign in [-1.0 as Float, 1.0] {
                let n: Normal3f = axis_normal(axis, sign);
                let corner = |su: bool, sv: bool| -> Point3f {
                    let mut p: Point3f = Point3f::default();
                    p[axis] = if sign > 0.0 { b.p_max[axis] } else { b.p_min[axis] };
                    p[u] = if su { b.p_max[u] } else { b.p_min[u] };
                    p[v] = if sv { b.p_max[v] } else { b.p_min[v] };
                    p
                };
                let quad: [Point3f; 4] = [
                    corner(false, false),
                    corner(true, false),
                    corner(true, true),
                    corner(false, true),
                ];
                let i0: usize = buffer.push_vertex(quad[0], n);
                let i1: usize = buffer.push_vertex(quad[1], n);
                let i2: usize = buffer.push_vertex(quad[2], n);
                let i3: usize = buffer.push_vertex(quad[3], n);
                if sign > 0.0 {
                    buffer.push_triangle(i0, i1, i2);
                    buffer.push_triangle(i0, i2, i3);
                } else {
                    buffer.push_triangle(i0, i2, i1);
                    buffer.push_triangle(i0, i3, i2);
                }
            }
        }
        buffer
    }
    fn directive(&self) -> &'static str {
        BoxShape::DIRECTIVE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_box() -> BoxShape {
        BoxShape::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(2.0, 2.0, 2.0))
    }

    #[test]
    fn analytic_hit_on_front_face() {
        let ray = Ray::new(Point3f::new(0.25, -0.5, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        let hit = unit_box().intersect(&ray).unwrap();
        assert_abs_diff_eq!(hit.t, 4.0, epsilon = 1e-6);
        assert_abs_diff_eq!(hit.p.z, -1.0, epsilon = 1e-6);
        assert_eq!(hit.n, Normal3f::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn oblique_hit_and_miss() {
        let d = Vector3f::new(1.0, 1.0, 0.0);
        let hit = unit_box()
            .intersect(&Ray::new(Point3f::new(-3.0, -2.5, 0.0), d))
            .unwrap();
        // enters through x = -1 at t = 2 where y = -0.5
        assert_abs_diff_eq!(hit.t, 2.0, epsilon = 1e-6);
        assert_eq!(hit.n, Normal3f::new(-1.0, 0.0, 0.0));
        assert!(unit_box()
            .intersect(&Ray::new(Point3f::new(-3.0, 0.5, 0.0), d))
            .is_none());
        assert!(unit_box()
            .intersect(&Ray::new(Point3f::new(0.0, 5.0, 0.0), Vector3f::new(1.0, 0.0, 0.0)))
            .is_none());
    }

    #[test]
    fn hit_from_inside_reports_exit_face() {
        let ray = Ray::new(Point3f::default(), Vector3f::new(0.0, -1.0, 0.0));
        let hit = unit_box().intersect(&ray).unwrap();
        assert_abs_diff_eq!(hit.t, 1.0, epsilon = 1e-6);
        assert_eq!(hit.n, Normal3f::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn tessellation_has_twelve_outward_triangles() {
        let buffer = unit_box().tessellate(50);
        assert_eq!(buffer.triangle_count(), 12);
        for [i0, i1, i2] in &buffer.indices {
            let p0 = buffer.positions[*i0];
            let face = crate::core::geometry::vec3_cross_vec3(
                &(buffer.positions[*i1] - p0),
                &(buffer.positions[*i2] - p0),
            );
            assert!(crate::core::geometry::nrm_dot_vec3f(&buffer.normals[*i0], &face) > 0.0);
        }
        assert_eq!(buffer.bound(), unit_box().object_bound());
    }

    #[test]
    fn hits_stay_inside_bound() {
        assert!(crate::shapes::assert_hits_inside_bound(&unit_box()) > 0);
    }
}
