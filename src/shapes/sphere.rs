// rs_ray
use crate::core::common::quadratic;
use crate::core::common::Float;
use crate::core::error::Result;
use crate::core::geometry::{vec3_dot_vec3f, Bounds3f, Normal3f, Point3f, Ray, Vector3f};
use crate::core::interaction::RayHit;
use crate::core::parser::SceneParser;
use crate::core::shape::{accept_hit, Shape, TriangleBuffer};
use crate::shapes::{lathe, ProfileVertex};

#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Point3f,
    pub radius: Float,
}

impl Default for Sphere {
    fn default() -> Self {
        Sphere {
            center: Point3f::default(),
            radius: 1.0,
        }
    }
}

impl Sphere {
    pub const DIRECTIVE: &'static str = "sphere";

    pub fn new(center: Point3f, radius: Float) -> Self {
        Sphere { center, radius }
    }
    /// `sphere cx cy cz r`
    pub fn create(parser: &mut SceneParser) -> Result<Box<dyn Shape>> {
        let center: Point3f = parser.next_point3f()?;
        let radius: Float = parser.next_positive_float("radius")?;
        Ok(Box::new(Sphere::new(center, radius)))
    }
}

impl Shape for Sphere {
    fn object_bound(&self) -> Bounds3f {
        let r: Vector3f = Vector3f::new(self.radius, self.radius, self.radius);
        Bounds3f::new(self.center - r, self.center + r)
    }
    fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        // compute quadratic sphere coefficients
        let o: Vector3f = ray.o - self.center;
        let a: Float = ray.d.length_squared();
        let b: Float = 2.0 * vec3_dot_vec3f(&ray.d, &o);
        let c: Float = o.length_squared() - self.radius * self.radius;
        // solve quadratic equation for _t_ values
        let (t0, t1) = quadratic(a, b, c)?;
        // check quadric shape _t0_ and _t1_ for nearest intersection
        let t_shape_hit: Float = if accept_hit(t0, ray) {
            t0
        } else if accept_hit(t1, ray) {
            t1
        } else {
            return None;
        };
        let p_hit: Point3f = ray.position(t_shape_hit);
        let n: Vector3f = p_hit - self.center;
        Some(RayHit::new(t_shape_hit, p_hit, Normal3f::from(n)))
    }
    fn tessellate(&self, complexity: usize) -> TriangleBuffer {
        let stacks: usize = complexity.max(2);
        let strip: Vec<ProfileVertex> = (0..=stacks)
            .map(|i| {
                // from the south pole up to the north pole
                let theta: Float = -std::f64::consts::FRAC_PI_2
                    + std::f64::consts::PI * i as Float / stacks as Float;
                let (sin_theta, cos_theta) = theta.sin_cos();
                ProfileVertex {
                    radius: self.radius * cos_theta,
                    y: self.radius * sin_theta,
                    nr: cos_theta,
                    ny: sin_theta,
                }
            })
            .collect();
        lathe(&self.center, &[strip], 2 * stacks)
    }
    fn directive(&self) -> &'static str {
        Sphere::DIRECTIVE
    }
}
