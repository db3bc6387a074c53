// rs_ray
use crate::core::common::Float;
use crate::core::common::gamma;
use crate::core::error::Result;
use crate::core::geometry::{bnd3_union_pnt3f, Bounds3f, Normal3f, Point3f, Ray, Vector3f};
use crate::core::geometry::{
    vec3_cross_vec3, vec3_max_componentf, vec3_max_dimensionf, vec3_permutef,
};
use crate::core::interaction::RayHit;
use crate::core::parser::SceneParser;
use crate::core::shape::{accept_hit, Shape, TriangleBuffer};

#[derive(Debug, Clone)]
pub struct Triangle {
    pub p0: Point3f,
    pub p1: Point3f,
    pub p2: Point3f,
    /// geometric normal, zero for degenerate triangles
    pub n: Normal3f,
}

impl Triangle {
    pub const DIRECTIVE: &'static str = "triangle";

    pub fn new(p0: Point3f, p1: Point3f, p2: Point3f) -> Self {
        Triangle {
            p0,
            p1,
            p2,
            n: face_normal(&p0, &p1, &p2),
        }
    }
    /// `triangle x0 y0 z0 x1 y1 z1 x2 y2 z2`
    pub fn create(parser: &mut SceneParser) -> Result<Box<dyn Shape>> {
        let p0: Point3f = parser.next_point3f()?;
        let p1: Point3f = parser.next_point3f()?;
        let p2: Point3f = parser.next_point3f()?;
        Ok(Box::new(Triangle::new(p0, p1, p2)))
    }
}

/// Unit normal following the winding `p0, p1, p2`.
pub fn face_normal(p0: &Point3f, p1: &Point3f, p2: &Point3f) -> Normal3f {
    let n: Vector3f = vec3_cross_vec3(&(*p1 - *p0), &(*p2 - *p0));
    let length: Float = n.length();
    if length > 0.0 {
        Normal3f::from(n / length)
    } else {
        Normal3f::default()
    }
}

/// Watertight ray/triangle test. Returns the ray parameter of the hit
/// if it lies inside the ray segment.
pub fn intersect_triangle(p0: &Point3f, p1: &Point3f, p2: &Point3f, ray: &Ray) -> Option<Float> {
    // translate vertices based on ray origin
    let mut p0t: Vector3f = *p0 - ray.o;
    let mut p1t: Vector3f = *p1 - ray.o;
    let mut p2t: Vector3f = *p2 - ray.o;
    // permute components of triangle vertices and ray direction
    let kz: usize = vec3_max_dimensionf(&ray.d.abs());
    let mut kx: usize = kz + 1;
    if kx == 3 {
        kx = 0;
    }
    let mut ky: usize = kx + 1;
    if ky == 3 {
        ky = 0;
    }
    let d: Vector3f = vec3_permutef(&ray.d, kx, ky, kz);
    if d.z == 0.0 {
        return None;
    }
    p0t = vec3_permutef(&p0t, kx, ky, kz);
    p1t = vec3_permutef(&p1t, kx, ky, kz);
    p2t = vec3_permutef(&p2t, kx, ky, kz);
    // apply shear transformation to translated vertex positions
    let sx: Float = -d.x / d.z;
    let sy: Float = -d.y / d.z;
    let sz: Float = 1.0 / d.z;
    p0t.x += sx * p0t.z;
    p0t.y += sy * p0t.z;
    p1t.x += sx * p1t.z;
    p1t.y += sy * p1t.z;
    p2t.x += sx * p2t.z;
    p2t.y += sy * p2t.z;
    // compute edge function coefficients _e0_, _e1_, and _e2_
    let e0: Float = p1t.x * p2t.y - p1t.y * p2t.x;
    let e1: Float = p2t.x * p0t.y - p2t.y * p0t.x;
    let e2: Float = p0t.x * p1t.y - p0t.y * p1t.x;
    // perform triangle edge and determinant tests
    if (e0 < 0.0 || e1 < 0.0 || e2 < 0.0) && (e0 > 0.0 || e1 > 0.0 || e2 > 0.0) {
        return None;
    }
    let det: Float = e0 + e1 + e2;
    if det == 0.0 {
        return None;
    }
    // compute scaled hit distance to triangle and test against ray $t$ range
    p0t.z *= sz;
    p1t.z *= sz;
    p2t.z *= sz;
    let t_scaled: Float = e0 * p0t.z + e1 * p1t.z + e2 * p2t.z;
    if det < 0.0 && (t_scaled >= 0.0 || t_scaled < ray.t_max * det) {
        return None;
    } else if det > 0.0 && (t_scaled <= 0.0 || t_scaled > ray.t_max * det) {
        return None;
    }
    let t: Float = t_scaled / det;
    // ensure that computed triangle $t$ is conservatively greater than zero
    let max_zt: Float = vec3_max_componentf(&Vector3f::new(p0t.z, p1t.z, p2t.z).abs());
    let delta_z: Float = gamma(3_i32) * max_zt;
    let max_xt: Float = vec3_max_componentf(&Vector3f::new(p0t.x, p1t.x, p2t.x).abs());
    let max_yt: Float = vec3_max_componentf(&Vector3f::new(p0t.y, p1t.y, p2t.y).abs());
    let delta_x: Float = gamma(5) * (max_xt + max_zt);
    let delta_y: Float = gamma(5) * (max_yt + max_zt);
    let delta_e: Float = 2.0 * (gamma(2) * max_xt * max_yt + delta_y * max_xt + delta_x * max_yt);
    let max_e: Float = vec3_max_componentf(&Vector3f::new(e0, e1, e2).abs());
    let delta_t: Float =
        3.0 * (gamma(3) * max_e * max_zt + delta_e * max_zt + delta_z * max_e) * det.abs().recip();
    if t <= delta_t {
        return None;
    }
    if accept_hit(t, ray) {
        Some(t)
    } else {
        None
    }
}

impl Shape for Triangle {
    fn object_bound(&self) -> Bounds3f {
        bnd3_union_pnt3f(&Bounds3f::new(self.p0, self.p1), &self.p2)
    }
    fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        if self.n.length_squared() == 0.0 {
            return None;
        }
        let t: Float = intersect_triangle(&self.p0, &self.p1, &self.p2, ray)?;
        Some(RayHit::new(t, ray.position(t), self.n))
    }
    fn tessellate(&self, _complexity: usize) -> TriangleBuffer {
        let mut buffer: TriangleBuffer = TriangleBuffer::new();
        let i0: usize = buffer.push_vertex(self.p0, self.n);
        let i1: usize = buffer.push_vertex(self.p1, self.n);
        let i2: usize = buffer.push_vertex(self.p2, self.n);
        buffer.push_triangle(i0, i1, i2);
        buffer
    }
    fn directive(&self) -> &'static str {
        Triangle::DIRECTIVE
    }
}
