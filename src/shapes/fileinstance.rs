// std
use std::path::{Path, PathBuf};
use std::sync::Arc;
// rs_ray
use crate::core::error::{Location, Result};
use crate::core::geometry::{Bounds3f, Ray};
use crate::core::interaction::RayHit;
use crate::core::parser::SceneParser;
use crate::core::shape::{Shape, TriangleBuffer};
use crate::core::transform::Transform;

/// Placement of another scene file's shapes. The subtree is parsed
/// once per cache and shared by every instance of the same file.
pub struct FileInstance {
    /// the path as written in the scene
    pub path: PathBuf,
    pub transform: Transform,
    shape: Arc<dyn Shape>,
}

impl FileInstance {
    pub const DIRECTIVE: &'static str = "fileInstance";

    pub fn new(path: &Path, transform: Transform, shape: Arc<dyn Shape>) -> Self {
        FileInstance {
            path: path.to_path_buf(),
            transform,
            shape,
        }
    }
    /// `fileInstance <path> <transform>`
    pub fn create(parser: &mut SceneParser) -> Result<Box<dyn Shape>> {
        let location: Location = parser.location();
        let path: String = parser.next_string()?;
        let transform: Transform = parser.next_transform()?;
        let shape: Arc<dyn Shape> = parser.instance(&path, location)?;
        Ok(Box::new(FileInstance::new(Path::new(&path), transform, shape)))
    }
    /// The subtree shared with other instances of the same file.
    pub fn shared(&self) -> &Arc<dyn Shape> {
        &self.shape
    }
}

impl Shape for FileInstance {
    fn object_bound(&self) -> Bounds3f {
        self.transform.transform_bounds(&self.shape.object_bound())
    }
    fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        let local: Ray = Transform::inverse(&self.transform).transform_ray(ray);
        self.shape
            .intersect(&local)
            .map(|hit| hit.transform(&self.transform))
    }
    fn tessellate(&self, complexity: usize) -> TriangleBuffer {
        let mut buffer: TriangleBuffer = self.shape.tessellate(complexity);
        buffer.transform(&self.transform);
        buffer
    }
    fn directive(&self) -> &'static str {
        FileInstance::DIRECTIVE
    }
    fn is_dynamic(&self) -> bool {
        self.shape.is_dynamic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Point3f, Vector3f};
    use crate::core::instance::InstanceCache;
    use crate::core::registry::Registries;
    use crate::core::scene::Scene;
    use crate::shapes::sphere::Sphere;
    use approx::assert_relative_eq;

    fn data_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
    }

    #[test]
    fn behaves_like_a_transformed_subtree() {
        let t = Transform::translate(&Vector3f::new(0.0, 0.0, 10.0));
        let instance = FileInstance::new(Path::new("ball.ray"), t, Arc::new(Sphere::default()));
        let ray = Ray::new(Point3f::default(), Vector3f::new(0.0, 0.0, 1.0));
        assert_relative_eq!(instance.intersect(&ray).unwrap().t, 9.0, epsilon = 1e-9);
        assert_eq!(instance.object_bound().p_min, Point3f::new(-1.0, -1.0, 9.0));
        assert!(!instance.is_dynamic());
    }

    #[test]
    fn instances_of_one_file_share_the_subtree() {
        let registries = Arc::new(Registries::with_builtins().unwrap());
        let cache = Arc::new(InstanceCache::new());
        let mut scene = Scene::new(&data_dir());
        scene
            .parse_str_with(
                "fileInstance part.ray [ translate -3 0 0 ]\n\
                 fileInstance part.ray [ translate 3 0 0 ]\n",
                registries,
                cache.clone(),
            )
            .unwrap();
        assert_eq!(scene.shapes.len(), 2);
        assert_eq!(cache.parse_count(), 1);
        let left = ray_towards(-3.0);
        let right = ray_towards(3.0);
        assert!(scene.intersect(&left).is_some());
        assert!(scene.intersect(&right).is_some());
        assert!(scene.intersect(&ray_towards(0.0)).is_none());
    }

    fn ray_towards(x: f64) -> Ray {
        Ray::new(Point3f::new(x, 1.0, -20.0), Vector3f::new(0.0, 0.0, 1.0))
    }
}
