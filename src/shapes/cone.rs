// rs_ray
use crate::core::common::quadratic;
use crate::core::common::Float;
use crate::core::error::Result;
use crate::core::geometry::{Bounds3f, Normal3f, Point3f, Ray, Vector3f};
use crate::core::interaction::RayHit;
use crate::core::parser::SceneParser;
use crate::core::shape::{accept_hit, Shape, TriangleBuffer};
use crate::shapes::{lathe, ProfileVertex};

/// Cone around the y axis with its base disk at `center.y - height/2`
/// and its apex at `center.y + height/2`. The base is closed.
#[derive(Debug, Clone)]
pub struct Cone {
    pub center: Point3f,
    pub radius: Float,
    pub height: Float,
}

impl Cone {
    pub const DIRECTIVE: &'static str = "cone";

    pub fn new(center: Point3f, radius: Float, height: Float) -> Self {
        Cone {
            center,
            radius,
            height,
        }
    }
    /// `cone cx cy cz r h`
    pub fn create(parser: &mut SceneParser) -> Result<Box<dyn Shape>> {
        let center: Point3f = parser.next_point3f()?;
        let radius: Float = parser.next_positive_float("radius")?;
        let height: Float = parser.next_positive_float("height")?;
        Ok(Box::new(Cone::new(center, radius, height)))
    }
}

impl Shape for Cone {
    fn object_bound(&self) -> Bounds3f {
        let extent: Vector3f = Vector3f::new(self.radius, self.height * 0.5, self.radius);
        Bounds3f::new(self.center - extent, self.center + extent)
    }
    fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        let half: Float = self.height * 0.5;
        let o: Vector3f = ray.o - self.center;
        let d: Vector3f = ray.d;
        // x^2 + z^2 = k^2 (apex - y)^2
        let k: Float = self.radius / self.height;
        let k2: Float = k * k;
        let w: Float = half - o.y;
        let mut best: Option<(Float, Normal3f)> = None;
        let mut consider = |t: Float, n: Normal3f| {
            if accept_hit(t, ray) && best.map_or(true, |(bt, _)| t < bt) {
                best = Some((t, n));
            }
        };
        let a: Float = d.x * d.x + d.z * d.z - k2 * d.y * d.y;
        let b: Float = 2.0 * (d.x * o.x + d.z * o.z + k2 * w * d.y);
        let c: Float = o.x * o.x + o.z * o.z - k2 * w * w;
        if let Some((t0, t1)) = quadratic(a, b, c) {
            for t in [t0, t1] {
                let y: Float = o.y + t * d.y;
                // the quadric is a double cone, keep the lower nappe
                if y >= -half && y <= half {
                    let x: Float = o.x + t * d.x;
                    let z: Float = o.z + t * d.z;
                    let n: Normal3f = Normal3f::new(x, k2 * (half - y), z);
                    if n.length_squared() > 0.0 {
                        consider(t, n);
                    }
                }
            }
        }
        // base disk
        if d.y != 0.0 {
            let t: Float = (-half - o.y) / d.y;
            let x: Float = o.x + t * d.x;
            let z: Float = o.z + t * d.z;
            if x * x + z * z <= self.radius * self.radius {
                consider(t, Normal3f::new(0.0, -1.0, 0.0));
            }
        }
        best.map(|(t, n)| RayHit::new(t, ray.position(t), n))
    }
    fn tessellate(&self, complexity: usize) -> TriangleBuffer {
        let half: Float = self.height * 0.5;
        let r: Float = self.radius;
        // side normal in the half-plane is (h, r) normalized
        let len: Float = (self.height * self.height + r * r).sqrt();
        let (nr, ny) = (self.height / len, r / len);
        let v = |radius: Float, y: Float, nr: Float, ny: Float| ProfileVertex { radius, y, nr, ny };
        let rings: usize = complexity.max(1);
        let side: Vec<ProfileVertex> = (0..=rings)
            .map(|i| {
                let s: Float = i as Float / rings as Float;
                v(r * (1.0 - s), -half + self.height * s, nr, ny)
            })
            .collect();
        let strips: Vec<Vec<ProfileVertex>> =
            vec![vec![v(0.0, -half, 0.0, -1.0), v(r, -half, 0.0, -1.0)], side];
        lathe(&self.center, &strips, complexity)
    }
    fn directive(&self) -> &'static str {
        Cone::DIRECTIVE
    }
}
