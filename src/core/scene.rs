//! # Scene
//!
//! As the scene file is parsed, objects are created that represent
//! the lights and geometric shapes in the scene. These are all stored
//! in the **Scene** object, together with the directory relative
//! `fileInstance` paths are resolved against and the dynamic channels
//! an animation can drive.
//!
//! ```rust,no_run
//! use rs_ray::core::registry;
//! use rs_ray::core::scene::Scene;
//!
//! registry::initialize().unwrap();
//! let scene = Scene::load("scenes/table.ray").unwrap();
//! println!("{:?}", scene.world_bound());
//! registry::teardown();
//! ```

// std
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
// others
use log::info;
// rs_ray
use crate::core::animation::{AffineChannel, Interpolation, RotationParameters};
use crate::core::common::Float;
use crate::core::error::{Result, SceneError};
use crate::core::geometry::bnd3_union_bnd3f;
use crate::core::geometry::{Bounds3f, Ray};
use crate::core::instance::InstanceCache;
use crate::core::interaction::RayHit;
use crate::core::light::Light;
use crate::core::parser::SceneParser;
use crate::core::registry::{self, Registries};
use crate::core::shape::{tessellation_complexity, Shape, TriangleBuffer};

pub struct Scene {
    /// top-level shapes in file order
    pub shapes: Vec<Box<dyn Shape>>,
    pub lights: Vec<Box<dyn Light>>,
    pub base_dir: PathBuf,
    pub channels: Vec<Arc<AffineChannel>>,
}

impl Scene {
    /// An empty scene resolving relative references against
    /// `base_dir`.
    pub fn new(base_dir: &Path) -> Self {
        Scene {
            shapes: Vec::new(),
            lights: Vec::new(),
            base_dir: base_dir.to_path_buf(),
            channels: Vec::new(),
        }
    }
    /// Parse the scene file at `path` with the process-wide registries
    /// and instance cache. The directory of the file becomes the base
    /// directory.
    ///
    /// Channels declared inside `fileInstance`d files live in the
    /// cache entry of that file, so every scene loaded through the same
    /// cache drives the same channels: animating one such scene moves
    /// the instanced parts of all of them. Use `load_with` and a fresh
    /// `InstanceCache` for a scene that has to animate on its own.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Scene> {
        Scene::load_with(path, registry::active()?, InstanceCache::global())
    }
    pub fn load_with<P: AsRef<Path>>(
        path: P,
        registries: Arc<Registries>,
        cache: Arc<InstanceCache>,
    ) -> Result<Scene> {
        let path: &Path = path.as_ref();
        let io_error = |source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        };
        let resolved: PathBuf = fs::canonicalize(path).map_err(io_error)?;
        let input: String = fs::read_to_string(&resolved).map_err(io_error)?;
        let base_dir: PathBuf = resolved
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let scene: Scene = SceneParser::from_source(
            &path.display().to_string(),
            &input,
            registries,
            cache,
            &base_dir,
        )?
        .with_file(&resolved)
        .parse()?;
        info!(
            "Loaded {}: {} shape(s), {} light(s)",
            path.display(),
            scene.shapes.len(),
            scene.lights.len()
        );
        Ok(scene)
    }
    /// Parse additional statements into this scene with the
    /// process-wide registries and instance cache.
    pub fn parse_str(&mut self, input: &str) -> Result<()> {
        self.parse_str_with(input, registry::active()?, InstanceCache::global())
    }
    /// On error the scene is left exactly as it was.
    pub fn parse_str_with(
        &mut self,
        input: &str,
        registries: Arc<Registries>,
        cache: Arc<InstanceCache>,
    ) -> Result<()> {
        let mut parser: SceneParser =
            SceneParser::from_source("<string>", input, registries, cache, &self.base_dir)?;
        for channel in &self.channels {
            parser.add_channel(channel.clone())?;
        }
        let parsed: Scene = parser.parse()?;
        self.shapes.extend(parsed.shapes);
        self.lights.extend(parsed.lights);
        self.channels = parsed.channels;
        Ok(())
    }
    pub fn world_bound(&self) -> Bounds3f {
        self.shapes
            .iter()
            .fold(Bounds3f::default(), |b, shape| {
                bnd3_union_bnd3f(&b, &shape.object_bound())
            })
    }
    /// Nearest hit over all top-level shapes; the earlier shape wins a
    /// tie.
    pub fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        let mut r: Ray = *ray;
        let mut nearest: Option<RayHit> = None;
        for shape in &self.shapes {
            if let Some(hit) = shape.intersect(&r) {
                r.t_max = hit.t;
                nearest = Some(hit);
            }
        }
        nearest
    }
    pub fn intersect_p(&self, ray: &Ray) -> bool {
        self.shapes.iter().any(|shape| shape.intersect_p(ray))
    }
    /// Tessellate with the process-wide complexity.
    pub fn tessellate(&self) -> TriangleBuffer {
        self.tessellate_with(tessellation_complexity())
    }
    pub fn tessellate_with(&self, complexity: usize) -> TriangleBuffer {
        let mut buffer: TriangleBuffer = TriangleBuffer::new();
        for shape in &self.shapes {
            buffer.append(shape.tessellate(complexity));
        }
        buffer
    }
    pub fn channel(&self, name: &str) -> Option<Arc<AffineChannel>> {
        self.channels.iter().find(|c| c.name() == name).cloned()
    }
    /// Resample every keyframed channel at `time`. Channels of
    /// instanced files are shared with other scenes using the same
    /// cache (see `load`).
    pub fn animate(
        &self,
        time: Float,
        interpolation: Interpolation,
        parameters: RotationParameters,
    ) {
        for channel in &self.channels {
            channel.animate(time, interpolation, parameters);
        }
    }
}
