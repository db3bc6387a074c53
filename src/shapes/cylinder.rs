// rs_ray
use crate::core::common::quadratic;
use crate::core::common::Float;
use crate::core::error::Result;
use crate::core::geometry::{Bounds3f, Normal3f, Point3f, Ray, Vector3f};
use crate::core::interaction::RayHit;
use crate::core::parser::SceneParser;
use crate::core::shape::{accept_hit, Shape, TriangleBuffer};
use crate::shapes::{lathe, ProfileVertex};

/// Capped cylinder around the y axis, centered on `center`.
#[derive(Debug, Clone)]
pub struct Cylinder {
    pub center: Point3f,
    pub radius: Float,
    pub height: Float,
}

impl Cylinder {
    pub const DIRECTIVE: &'static str = "cylinder";

    pub fn new(center: Point3f, radius: Float, height: Float) -> Self {
        Cylinder {
            center,
            radius,
            height,
        }
    }
    /// `cylinder cx cy cz r h`
    pub fn create(parser: &mut SceneParser) -> Result<Box<dyn Shape>> {
        let center: Point3f = parser.next_point3f()?;
        let radius: Float = parser.next_positive_float("radius")?;
        let height: Float = parser.next_positive_float("height")?;
        Ok(Box::new(Cylinder::new(center, radius, height)))
    }
}

impl Shape for Cylinder {
    fn object_bound(&self) -> Bounds3f {
        let extent: Vector3f = Vector3f::new(self.radius, self.height * 0.5, self.radius);
        Bounds3f::new(self.center - extent, self.center + extent)
    }
    fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        let half: Float = self.height * 0.5;
        let o: Vector3f = ray.o - self.center;
        let d: Vector3f = ray.d;
        let mut best: Option<(Float, Normal3f)> = None;
        let mut consider = |t: Float, n: Normal3f| {
            if accept_hit(t, ray) && best.map_or(true, |(bt, _)| t < bt) {
                best = Some((t, n));
            }
        };
        // side: x^2 + z^2 = r^2 for |y| <= h/2
        let a: Float = d.x * d.x + d.z * d.z;
        if a > 0.0 {
            let b: Float = 2.0 * (d.x * o.x + d.z * o.z);
            let c: Float = o.x * o.x + o.z * o.z - self.radius * self.radius;
            if let Some((t0, t1)) = quadratic(a, b, c) {
                for t in [t0, t1] {
                    let y: Float = o.y + t * d.y;
                    if y.abs() <= half {
                        consider(
                            t,
                            Normal3f::new(o.x + t * d.x, 0.0, o.z + t * d.z),
                        );
                    }
                }
            }
        }
        // caps
        if d.y != 0.0 {
            for cap in [-half, half] {
                let t: Float = (cap - o.y) / d.y;
                let x: Float = o.x + t * d.x;
                let z: Float = o.z + t * d.z;
                if x * x + z * z <= self.radius * self.radius {
                    consider(t, Normal3f::new(0.0, cap.signum(), 0.0));
                }
            }
        }
        best.map(|(t, n)| RayHit::new(t, ray.position(t), n))
    }
    fn tessellate(&self, complexity: usize) -> TriangleBuffer {
        let half: Float = self.height * 0.5;
        let r: Float = self.radius;
        let v = |radius: Float, y: Float, nr: Float, ny: Float| ProfileVertex { radius, y, nr, ny };
        let strips: Vec<Vec<ProfileVertex>> = vec![
            vec![v(0.0, -half, 0.0, -1.0), v(r, -half, 0.0, -1.0)],
            vec![v(r, -half, 1.0, 0.0), v(r, half, 1.0, 0.0)],
            vec![v(r, half, 0.0, 1.0), v(0.0, half, 0.0, 1.0)],
        ];
        lathe(&self.center, &strips, complexity)
    }
    fn directive(&self) -> &'static str {
        Cylinder::DIRECTIVE
    }
}
