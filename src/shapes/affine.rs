//! Affine wrappers place a single child in the parent frame. Rays are
//! mapped into the child's frame by the inverse transform without
//! renormalising the direction, so ray parameters agree between the
//! two frames and hits can be compared across siblings.

// std
use std::sync::Arc;
// rs_ray
use crate::core::animation::{AffineChannel, Keyframe};
use crate::core::common::Float;
use crate::core::error::{Location, Result, SceneError};
use crate::core::geometry::{Bounds3f, Ray};
use crate::core::interaction::RayHit;
use crate::core::parser::SceneParser;
use crate::core::shape::{Shape, TriangleBuffer};
use crate::core::transform::Transform;

fn intersect_transformed(shape: &dyn Shape, transform: &Transform, ray: &Ray) -> Option<RayHit> {
    let local: Ray = Transform::inverse(transform).transform_ray(ray);
    shape.intersect(&local).map(|hit| hit.transform(transform))
}

fn tessellate_transformed(shape: &dyn Shape, transform: &Transform, complexity: usize) -> TriangleBuffer {
    let mut buffer: TriangleBuffer = shape.tessellate(complexity);
    buffer.transform(transform);
    buffer
}

/// Child placed by a transform fixed at parse time.
pub struct StaticAffineShape {
    pub transform: Transform,
    shape: Box<dyn Shape>,
}

impl StaticAffineShape {
    pub const DIRECTIVE: &'static str = "staticAffine";

    pub fn new(transform: Transform, shape: Box<dyn Shape>) -> Self {
        StaticAffineShape { transform, shape }
    }
    /// `staticAffine <transform> <shape>`
    pub fn create(parser: &mut SceneParser) -> Result<Box<dyn Shape>> {
        let transform: Transform = parser.next_transform()?;
        let shape: Box<dyn Shape> = parser.parse_shape()?;
        Ok(Box::new(StaticAffineShape::new(transform, shape)))
    }
    pub fn shape(&self) -> &dyn Shape {
        self.shape.as_ref()
    }
}

impl Shape for StaticAffineShape {
    fn object_bound(&self) -> Bounds3f {
        self.transform.transform_bounds(&self.shape.object_bound())
    }
    fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        intersect_transformed(self.shape.as_ref(), &self.transform, ray)
    }
    fn tessellate(&self, complexity: usize) -> TriangleBuffer {
        tessellate_transformed(self.shape.as_ref(), &self.transform, complexity)
    }
    fn directive(&self) -> &'static str {
        StaticAffineShape::DIRECTIVE
    }
    fn is_dynamic(&self) -> bool {
        self.shape.is_dynamic()
    }
}

/// Child placed by a named channel that can be updated between
/// queries. The child itself is never touched.
pub struct DynamicAffineShape {
    channel: Arc<AffineChannel>,
    shape: Box<dyn Shape>,
}

impl DynamicAffineShape {
    pub const DIRECTIVE: &'static str = "dynamicAffine";

    pub fn new(channel: Arc<AffineChannel>, shape: Box<dyn Shape>) -> Self {
        DynamicAffineShape { channel, shape }
    }
    /// `dynamicAffine <name> <transform> <shape>` or, with keyframes,
    /// `dynamicAffine <name> keyframes n (time <transform>){n} <shape>`
    pub fn create(parser: &mut SceneParser) -> Result<Box<dyn Shape>> {
        let name: String = parser.next_string()?;
        let channel: AffineChannel = if parser.peek_word() == Some("keyframes") {
            parser.next_word()?;
            let count_location: Location = parser.location();
            let n: usize = parser.next_usize()?;
            if n == 0 {
                return Err(SceneError::malformed(
                    parser.current_directive(),
                    count_location,
                    "at least one keyframe is required",
                ));
            }
            let mut keyframes: Vec<Keyframe> =
                Vec::with_capacity(n.min(parser.remaining_tokens()));
            for _ in 0..n {
                let time: Float = parser.next_float()?;
                let transform: Transform = parser.next_transform()?;
                keyframes.push(Keyframe { time, transform });
            }
            AffineChannel::with_keyframes(&name, keyframes)
        } else {
            AffineChannel::new(&name, parser.next_transform()?)
        };
        let channel: Arc<AffineChannel> = Arc::new(channel);
        parser.add_channel(channel.clone())?;
        let shape: Box<dyn Shape> = parser.parse_shape()?;
        Ok(Box::new(DynamicAffineShape::new(channel, shape)))
    }
    pub fn channel(&self) -> &Arc<AffineChannel> {
        &self.channel
    }
}

impl Shape for DynamicAffineShape {
    fn object_bound(&self) -> Bounds3f {
        self.channel
            .transform()
            .transform_bounds(&self.shape.object_bound())
    }
    fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        // snapshot once per query
        let transform: Transform = self.channel.transform();
        intersect_transformed(self.shape.as_ref(), &transform, ray)
    }
    fn tessellate(&self, complexity: usize) -> TriangleBuffer {
        tessellate_transformed(self.shape.as_ref(), &self.channel.transform(), complexity)
    }
    fn directive(&self) -> &'static str {
        DynamicAffineShape::DIRECTIVE
    }
    fn is_dynamic(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Point3f, Vector3f};
    use crate::shapes::boxshape::BoxShape;
    use crate::shapes::shapelist::ShapeList;
    use crate::shapes::sphere::Sphere;
    use approx::assert_relative_eq;

    fn placement() -> Transform {
        Transform::translate(&Vector3f::new(0.0, 0.0, 5.0))
            * Transform::scale(2.0, 1.0, 1.0).unwrap()
            * Transform::rotate(30.0, &Vector3f::new(0.0, 1.0, 0.0)).unwrap()
    }

    #[test]
    fn matches_manually_transformed_ray() {
        let child = BoxShape::new(Point3f::default(), Vector3f::new(1.0, 1.0, 1.0));
        let t = placement();
        let wrapped = StaticAffineShape::new(t, Box::new(child.clone()));
        let ray = Ray::new(Point3f::new(0.1, 0.2, -3.0), Vector3f::new(0.0, 0.0, 2.0));
        let hit = wrapped.intersect(&ray).unwrap();
        let local = child
            .intersect(&Transform::inverse(&t).transform_ray(&ray))
            .unwrap();
        assert_relative_eq!(hit.t, local.t, epsilon = 1e-12);
        let p = t.transform_point(&local.p);
        assert_relative_eq!(hit.p.x, p.x, epsilon = 1e-9);
        assert_relative_eq!(hit.p.y, p.y, epsilon = 1e-9);
        assert_relative_eq!(hit.p.z, p.z, epsilon = 1e-9);
        // the parameter is valid for the parent ray as well
        let q = ray.position(hit.t);
        assert_relative_eq!(q.z, hit.p.z, epsilon = 1e-9);
        assert_relative_eq!(hit.n.length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn normals_use_the_inverse_transpose() {
        // a unit sphere squashed along y becomes an ellipsoid, its top
        // normal still points straight up
        let t = Transform::scale(3.0, 0.5, 3.0).unwrap();
        let wrapped = StaticAffineShape::new(t, Box::new(Sphere::default()));
        let ray = Ray::new(Point3f::new(0.0, 4.0, 0.0), Vector3f::new(0.0, -1.0, 0.0));
        let hit = wrapped.intersect(&ray).unwrap();
        assert_relative_eq!(hit.t, 3.5, epsilon = 1e-9);
        assert_relative_eq!(hit.n.y, 1.0, epsilon = 1e-9);
        // on the side the normal tilts towards the flat direction
        let side = Ray::new(Point3f::new(-10.0, 0.25, 0.0), Vector3f::new(1.0, 0.0, 0.0));
        let n = wrapped.intersect(&side).unwrap().n;
        assert!(n.x < 0.0 && n.y > n.x.abs());
    }

    #[test]
    fn bound_is_the_transformed_child_bound() {
        let t = Transform::translate(&Vector3f::new(1.0, 2.0, 3.0));
        let wrapped = StaticAffineShape::new(t, Box::new(Sphere::default()));
        let b = wrapped.object_bound();
        assert_eq!(b.p_min, Point3f::new(0.0, 1.0, 2.0));
        assert_eq!(b.p_max, Point3f::new(2.0, 3.0, 4.0));
        assert_eq!(
            wrapped.tessellate(4).bound(),
            {
                let mut buffer = Sphere::default().tessellate(4);
                buffer.transform(&t);
                buffer.bound()
            }
        );
    }

    #[test]
    fn channel_update_moves_the_child() {
        let channel = Arc::new(AffineChannel::new("arm", Transform::default()));
        let wrapped = DynamicAffineShape::new(channel.clone(), Box::new(Sphere::default()));
        let ray = Ray::new(Point3f::new(0.0, 0.0, -10.0), Vector3f::new(0.0, 0.0, 1.0));
        assert_relative_eq!(wrapped.intersect(&ray).unwrap().t, 9.0, epsilon = 1e-9);
        channel.set_transform(Transform::translate(&Vector3f::new(0.0, 0.0, 4.0)));
        assert_relative_eq!(wrapped.intersect(&ray).unwrap().t, 13.0, epsilon = 1e-9);
        channel.set_transform(Transform::translate(&Vector3f::new(5.0, 0.0, 0.0)));
        assert!(wrapped.intersect(&ray).is_none());
        assert_eq!(wrapped.object_bound().p_min.x, 4.0);
    }

    #[test]
    fn dynamic_children_are_never_skipped_by_a_stale_bound() {
        let channel = Arc::new(AffineChannel::new("slider", Transform::default()));
        let list = ShapeList::new(vec![Box::new(DynamicAffineShape::new(
            channel.clone(),
            Box::new(Sphere::default()),
        ))]);
        assert!(list.is_dynamic());
        let ray = Ray::new(Point3f::new(20.0, 0.0, -10.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(list.intersect(&ray).is_none());
        channel.set_transform(Transform::translate(&Vector3f::new(20.0, 0.0, 0.0)));
        assert!(list.intersect(&ray).is_some());
        assert_eq!(list.object_bound().p_max.x, 21.0);
    }
}
