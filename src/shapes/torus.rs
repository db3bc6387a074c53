// rs_ray
use crate::core::common::Float;
use crate::core::common::{horner, quartic};
use crate::core::error::Result;
use crate::core::geometry::{bnd3_expand, vec3_dot_vec3f, Bounds3f, Normal3f, Point3f, Ray, Vector3f};
use crate::core::interaction::RayHit;
use crate::core::parser::SceneParser;
use crate::core::shape::{accept_hit, Shape, TriangleBuffer};
use crate::shapes::{lathe, ProfileVertex};

const NEWTON_STEPS: usize = 8;

/// Newton iteration on a root of the quartic, stopped as soon as a step
/// no longer reduces the residual.
fn polish_root(coefficients: &[Float; 5], mut x: Float) -> Float {
    let derivative: [Float; 4] = [
        4.0 * coefficients[0],
        3.0 * coefficients[1],
        2.0 * coefficients[2],
        coefficients[3],
    ];
    let mut fx: Float = horner(coefficients, x);
    for _ in 0..NEWTON_STEPS {
        let slope: Float = horner(&derivative, x);
        if slope == 0.0 {
            break;
        }
        let next: Float = x - fx / slope;
        let f_next: Float = horner(coefficients, next);
        if f_next.is_nan() || f_next.abs() >= fx.abs() {
            break;
        }
        x = next;
        fx = f_next;
    }
    x
}

/// Torus around the y axis. The tube of radius `minor_radius` is
/// swept along a circle of radius `major_radius`.
#[derive(Debug, Clone)]
pub struct Torus {
    pub center: Point3f,
    pub major_radius: Float,
    pub minor_radius: Float,
}

impl Torus {
    pub const DIRECTIVE: &'static str = "torus";

    pub fn new(center: Point3f, major_radius: Float, minor_radius: Float) -> Self {
        Torus {
            center,
            major_radius,
            minor_radius,
        }
    }
    /// `torus cx cy cz R r`
    pub fn create(parser: &mut SceneParser) -> Result<Box<dyn Shape>> {
        let center: Point3f = parser.next_point3f()?;
        let major_radius: Float = parser.next_positive_float("major radius")?;
        let minor_radius: Float = parser.next_positive_float("minor radius")?;
        Ok(Box::new(Torus::new(center, major_radius, minor_radius)))
    }
    /// Coefficients of the quartic in `t`, highest degree first, for
    /// a ray in coordinates divided by `scale`.
    fn quartic_coefficients(&self, o: &Vector3f, d: &Vector3f, scale: Float) -> [Float; 5] {
        let major: Float = self.major_radius / scale;
        let minor: Float = self.minor_radius / scale;
        let r2: Float = major * major;
        let a2: Float = minor * minor;
        let od: Float = vec3_dot_vec3f(o, d);
        let oo: Float = o.length_squared();
        let dd: Float = d.length_squared();
        // height along the axis
        let oa: Float = o.y;
        let da: Float = d.y;
        let k: Float = oo - (r2 + a2);
        [
            dd * dd,
            4.0 * dd * od,
            2.0 * dd * k + 4.0 * od * od + 4.0 * r2 * da * da,
            4.0 * k * od + 8.0 * r2 * oa * da,
            k * k - 4.0 * r2 * (a2 - oa * oa),
        ]
    }
}

impl Shape for Torus {
    fn object_bound(&self) -> Bounds3f {
        let outer: Float = self.major_radius + self.minor_radius;
        let extent: Vector3f = Vector3f::new(outer, self.minor_radius, outer);
        Bounds3f::new(self.center - extent, self.center + extent)
    }
    fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        // start the ray where it enters a slightly grown bound, so that
        // the quartic is solved close to the surface
        let (t_enter, _t_exit) =
            bnd3_expand(&self.object_bound(), self.minor_radius * 1e-3).intersect_b(ray)?;
        let d_length: Float = ray.d.length();
        if d_length == 0.0 {
            return None;
        }
        // unit direction and unit-sized torus keep the coefficients of
        // order one
        let scale: Float = self.major_radius + self.minor_radius;
        let o: Vector3f = (ray.position(t_enter) - self.center) / scale;
        let d: Vector3f = ray.d / d_length;
        let coefficients: [Float; 5] = self.quartic_coefficients(&o, &d, scale);
        let mut t_hit: Option<Float> = None;
        for root in quartic(
            coefficients[0],
            coefficients[1],
            coefficients[2],
            coefficients[3],
            coefficients[4],
        ) {
            let t: Float = t_enter + polish_root(&coefficients, root) * scale / d_length;
            if accept_hit(t, ray) && t_hit.map_or(true, |nearest| t < nearest) {
                t_hit = Some(t);
            }
        }
        let t: Float = t_hit?;
        let p: Point3f = ray.position(t);
        // normal points away from the closest point on the tube's center circle
        let local: Vector3f = p - self.center;
        let radial: Float = (local.x * local.x + local.z * local.z).sqrt();
        let n: Vector3f = if radial > 0.0 {
            let scale: Float = self.major_radius / radial;
            Vector3f::new(local.x - local.x * scale, local.y, local.z - local.z * scale)
        } else {
            Vector3f::new(0.0, local.y, 0.0)
        };
        if n.length_squared() == 0.0 {
            return None;
        }
        Some(RayHit::new(t, p, Normal3f::from(n)))
    }
    fn tessellate(&self, complexity: usize) -> TriangleBuffer {
        let segments: usize = complexity.max(3);
        // tube circle, counter-clockwise in the half-plane
        let strip: Vec<ProfileVertex> = (0..=segments)
            .map(|i| {
                let phi: Float =
                    -std::f64::consts::PI + 2.0 * std::f64::consts::PI * i as Float / segments as Float;
                let (sin_phi, cos_phi) = phi.sin_cos();
                ProfileVertex {
                    radius: self.major_radius + self.minor_radius * cos_phi,
                    y: self.minor_radius * sin_phi,
                    nr: cos_phi,
                    ny: sin_phi,
                }
            })
            .collect();
        lathe(&self.center, &[strip], 2 * segments)
    }
    fn directive(&self) -> &'static str {
        Torus::DIRECTIVE
    }
}
