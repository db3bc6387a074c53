// rs_ray
use crate::core::error::Result;
use crate::core::geometry::{bnd3_union_bnd3f, Bounds3f, Ray};
use crate::core::interaction::RayHit;
use crate::core::parser::SceneParser;
use crate::core::shape::{Shape, TriangleBuffer};

/// Ordered list of owned children. The nearest hit wins, on equal
/// parameters the child listed first.
pub struct ShapeList {
    shapes: Vec<Box<dyn Shape>>,
    /// bounds of children that cannot move, `None` for dynamic ones
    bounds: Vec<Option<Bounds3f>>,
}

impl ShapeList {
    pub const DIRECTIVE: &'static str = "shapeList";

    pub fn new(shapes: Vec<Box<dyn Shape>>) -> Self {
        let bounds: Vec<Option<Bounds3f>> = shapes
            .iter()
            .map(|s| {
                if s.is_dynamic() {
                    None
                } else {
                    Some(s.object_bound())
                }
            })
            .collect();
        ShapeList { shapes, bounds }
    }
    /// `shapeList n <shape>{n}`
    pub fn create(parser: &mut SceneParser) -> Result<Box<dyn Shape>> {
        let n: usize = parser.next_usize()?;
        let mut shapes: Vec<Box<dyn Shape>> =
            Vec::with_capacity(n.min(parser.remaining_tokens()));
        for _ in 0..n {
            shapes.push(parser.parse_shape()?);
        }
        Ok(Box::new(ShapeList::new(shapes)))
    }
    pub fn shapes(&self) -> &[Box<dyn Shape>] {
        &self.shapes
    }
    pub fn len(&self) -> usize {
        self.shapes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl Shape for ShapeList {
    fn object_bound(&self) -> Bounds3f {
        self.shapes
            .iter()
            .zip(self.bounds.iter())
            .fold(Bounds3f::default(), |b, (shape, cached)| match cached {
                Some(bound) => bnd3_union_bnd3f(&b, bound),
                None => bnd3_union_bnd3f(&b, &shape.object_bound()),
            })
    }
    fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        let mut r: Ray = *ray;
        let mut nearest: Option<RayHit> = None;
        for (shape, cached) in self.shapes.iter().zip(self.bounds.iter()) {
            if let Some(bound) = cached {
                if bound.intersect_b(&r).is_none() {
                    continue;
                }
            }
            if let Some(hit) = shape.intersect(&r) {
                // later children have to be strictly closer
                r.t_max = hit.t;
                nearest = Some(hit);
            }
        }
        nearest
    }
    fn intersect_p(&self, ray: &Ray) -> bool {
        self.shapes
            .iter()
            .zip(self.bounds.iter())
            .any(|(shape, cached)| match cached {
                Some(bound) => bound.intersect_b(ray).is_some() && shape.intersect_p(ray),
                None => shape.intersect_p(ray),
            })
    }
    fn tessellate(&self, complexity: usize) -> TriangleBuffer {
        let mut buffer: TriangleBuffer = TriangleBuffer::new();
        for shape in &self.shapes {
            buffer.append(shape.tessellate(complexity));
        }
        buffer
    }
    fn directive(&self) -> &'static str {
        ShapeList::DIRECTIVE
    }
    fn is_dynamic(&self) -> bool {
        self.bounds.iter().any(|b| b.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::common::Float;
    use crate::core::geometry::{Normal3f, Point3f, Vector3f};
    use crate::core::shape::accept_hit;
    use crate::shapes::sphere::Sphere;
    use approx::assert_relative_eq;

    #[test]
    fn only_the_sphere_on_the_ray_is_hit() {
        let a = Sphere::new(Point3f::new(0.0, 5.0, 0.0), 1.0);
        let b = Sphere::new(Point3f::new(0.0, 0.0, 5.0), 1.0);
        let list = ShapeList::new(vec![Box::new(a), Box::new(b.clone())]);
        let ray = Ray::new(Point3f::default(), Vector3f::new(0.0, 0.0, 1.0));
        let hit = list.intersect(&ray).unwrap();
        assert_eq!(Some(hit), b.intersect(&ray));
        assert_relative_eq!(hit.t, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn nearest_child_wins_regardless_of_order() {
        let near = Sphere::new(Point3f::new(0.0, 0.0, 3.0), 1.0);
        let far = Sphere::new(Point3f::new(0.0, 0.0, 10.0), 1.0);
        let list = ShapeList::new(vec![Box::new(far), Box::new(near)]);
        let ray = Ray::new(Point3f::default(), Vector3f::new(0.0, 0.0, 1.0));
        assert_relative_eq!(list.intersect(&ray).unwrap().t, 2.0, epsilon = 1e-9);
    }

    /// Reports a hit at a fixed parameter with a given normal.
    struct Fixed {
        t: Float,
        n: Normal3f,
    }

    impl Shape for Fixed {
        fn object_bound(&self) -> Bounds3f {
            Bounds3f::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0))
        }
        fn intersect(&self, ray: &Ray) -> Option<RayHit> {
            if accept_hit(self.t, ray) {
                Some(RayHit::new(self.t, ray.position(self.t), self.n))
            } else {
                None
            }
        }
        fn tessellate(&self, _complexity: usize) -> TriangleBuffer {
            TriangleBuffer::new()
        }
        fn directive(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn tie_goes_to_the_first_child() {
        let up = Normal3f::new(0.0, 1.0, 0.0);
        let down = Normal3f::new(0.0, -1.0, 0.0);
        let list = ShapeList::new(vec![
            Box::new(Fixed { t: 0.5, n: up }),
            Box::new(Fixed { t: 0.5, n: down }),
        ]);
        let ray = Ray::new(Point3f::default(), Vector3f::new(1.0, 0.0, 0.0));
        assert_eq!(list.intersect(&ray).unwrap().n, up);
        let swapped = ShapeList::new(vec![
            Box::new(Fixed { t: 0.5, n: down }),
            Box::new(Fixed { t: 0.5, n: up }),
        ]);
        assert_eq!(swapped.intersect(&ray).unwrap().n, down);
    }

    #[test]
    fn bound_is_the_union_of_children() {
        let list = ShapeList::new(vec![
            Box::new(Sphere::new(Point3f::new(-3.0, 0.0, 0.0), 1.0)),
            Box::new(Sphere::new(Point3f::new(3.0, 1.0, 0.0), 0.5)),
        ]);
        let b = list.object_bound();
        assert_eq!(b.p_min, Point3f::new(-4.0, -1.0, -1.0));
        assert_eq!(b.p_max, Point3f::new(3.5, 1.5, 1.0));
        assert!(!list.is_dynamic());
    }

    #[test]
    fn empty_list_never_hits() {
        let list = ShapeList::new(Vec::new());
        assert!(list.is_empty());
        assert!(list.object_bound().is_empty());
        let ray = Ray::new(Point3f::default(), Vector3f::new(1.0, 0.0, 0.0));
        assert!(list.intersect(&ray).is_none());
        assert!(list.tessellate(4).is_empty());
    }
}
