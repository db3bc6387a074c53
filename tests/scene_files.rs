// std
use std::path::{Path, PathBuf};
use std::sync::Arc;
// others
use approx::assert_relative_eq;
// rs_ray
use rs_ray::core::animation::{Interpolation, RotationParameters};
use rs_ray::core::error::Result;
use rs_ray::core::geometry::{Point3f, Ray, Vector3f};
use rs_ray::core::instance::InstanceCache;
use rs_ray::core::registry::Registries;
use rs_ray::core::scene::Scene;

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn load(name: &str, cache: &Arc<InstanceCache>) -> Result<Scene> {
    Scene::load_with(
        data(name),
        Arc::new(Registries::with_builtins()?),
        cache.clone(),
    )
}

fn ray(origin: (f64, f64, f64), d: (f64, f64, f64)) -> Ray {
    Ray::new(
        Point3f::new(origin.0, origin.1, origin.2),
        Vector3f::new(d.0, d.1, d.2),
    )
}

#[test]
fn assembly_parses_the_part_once() {
    let cache = Arc::new(InstanceCache::new());
    let scene = load("assembly.ray", &cache).unwrap();
    assert_eq!(scene.shapes.len(), 3);
    assert_eq!(scene.lights.len(), 1);
    assert_eq!(cache.parse_count(), 1);
    let part = std::fs::canonicalize(data("part.ray")).unwrap();
    let cached = cache.get(&part).unwrap();
    // the cache, four instances and the handle above
    assert_eq!(Arc::strong_count(&cached.shape), 6);
}

#[test]
fn assembly_places_every_instance() {
    let cache = Arc::new(InstanceCache::new());
    let scene = load("assembly.ray", &cache).unwrap();
    let down = (0.0, -1.0, 0.0);
    // sphere tops of the parts at x = -6, x = 6 and z = -6
    for &(x, z) in &[(-6.0, 0.0), (6.0, 0.0), (0.0, -6.0)] {
        let hit = scene.intersect(&ray((x, 10.0, z), down)).unwrap();
        assert_relative_eq!(hit.t, 8.0, epsilon = 1e-9);
        assert_relative_eq!(hit.n.y, 1.0, epsilon = 1e-9);
    }
    // the rotated plate at z = 6 still covers its center
    let hit = scene.intersect(&ray((0.5, 10.0, 6.0), down)).unwrap();
    assert!(hit.t > 8.0 && hit.t < 10.0);
    assert!(scene.intersect(&ray((0.0, 10.0, 0.0), down)).is_none());
}

#[test]
fn a_second_scene_reuses_the_cache() {
    let cache = Arc::new(InstanceCache::new());
    let first = load("assembly.ray", &cache).unwrap();
    let second = load("assembly.ray", &cache).unwrap();
    assert_eq!(first.shapes.len(), second.shapes.len());
    assert_eq!(cache.parse_count(), 1);
}

#[test]
fn lights_inside_instanced_files_are_ignored() {
    let cache = Arc::new(InstanceCache::new());
    let scene = load("uses_lit_part.ray", &cache).unwrap();
    assert_eq!(scene.lights.len(), 1);
    assert_eq!(scene.lights[0].directive(), "sphereLight");
    assert_eq!(scene.shapes.len(), 1);
    // the cone from the instanced file is there
    let hit = scene.intersect(&ray((0.0, 10.0, 0.0), (0.0, -1.0, 0.0)));
    assert!(hit.is_some());
}

#[test]
fn instanced_channels_are_shared() {
    let cache = Arc::new(InstanceCache::new());
    let scene = load("animated.ray", &cache).unwrap();
    assert_eq!(scene.channels.len(), 1);
    assert!(scene.channel("wheel").is_some());
    assert_eq!(cache.parse_count(), 1);
    let along_z = (0.0, 0.0, 1.0);
    // time 0: both wheels sit at x = 2
    assert!(scene.intersect(&ray((2.0, 0.0, -10.0), along_z)).is_some());
    assert!(scene.intersect(&ray((2.0, 10.0, -10.0), along_z)).is_some());
    assert!(scene.intersect(&ray((0.0, 0.0, -10.0), along_z)).is_none());
    // time 2: half a turn puts both at x = -2
    scene.animate(2.0 - 1e-3, Interpolation::Nearest, RotationParameters::Trivial);
    assert!(scene.intersect(&ray((2.0, 0.0, -10.0), along_z)).is_none());
    assert!(scene.intersect(&ray((-2.0, 0.0, -10.0), along_z)).is_some());
    assert!(scene.intersect(&ray((-2.0, 10.0, -10.0), along_z)).is_some());
    // a quarter turn moves the wheel onto the z axis
    scene.animate(1.0, Interpolation::Nearest, RotationParameters::Trivial);
    assert!(scene.intersect(&ray((0.0, 0.0, -10.0), along_z)).is_some());
    assert!(scene.intersect(&ray((-2.0, 0.0, -10.0), along_z)).is_none());
}

#[test]
fn scenes_sharing_a_cache_share_instanced_channels() {
    let along_z = (0.0, 0.0, 1.0);
    let shared = Arc::new(InstanceCache::new());
    let first = load("animated.ray", &shared).unwrap();
    let second = load("animated.ray", &shared).unwrap();
    assert_eq!(shared.parse_count(), 1);
    first.animate(2.0 - 1e-3, Interpolation::Nearest, RotationParameters::Trivial);
    assert!(second.intersect(&ray((-2.0, 0.0, -10.0), along_z)).is_some());
    // a scene with its own cache owns its channels
    let own = load("animated.ray", &Arc::new(InstanceCache::new())).unwrap();
    assert!(own.intersect(&ray((2.0, 0.0, -10.0), along_z)).is_some());
    assert!(own.intersect(&ray((-2.0, 0.0, -10.0), along_z)).is_none());
    own.animate(1.0, Interpolation::Nearest, RotationParameters::Trivial);
    assert!(own.intersect(&ray((0.0, 0.0, -10.0), along_z)).is_some());
    assert!(first.intersect(&ray((-2.0, 0.0, -10.0), along_z)).is_some());
}

#[test]
fn showcase_uses_every_directive() {
    let cache = Arc::new(InstanceCache::new());
    let scene = load("showcase.ray", &cache).unwrap();
    let lights: Vec<&str> = scene.lights.iter().map(|l| l.directive()).collect();
    assert_eq!(
        lights,
        vec!["directionalLight", "pointLight", "spotLight", "sphereLight"]
    );
    let shapes: Vec<&str> = scene.shapes.iter().map(|s| s.directive()).collect();
    assert_eq!(
        shapes,
        vec![
            "box",
            "sphere",
            "cylinder",
            "cone",
            "torus",
            "triangle",
            "triangleList",
            "staticAffine",
            "dynamicAffine",
            "fileInstance",
        ]
    );
    assert!(scene.channel("spinner").is_some());
    let mesh = scene.tessellate_with(8);
    assert!(mesh.triangle_count() > 100);
    let bound = scene.world_bound();
    assert!(bound.p_min.x <= -10.0 && bound.p_max.x >= 10.0);
    // every tessellated vertex lies inside the world bound
    let mesh_bound = mesh.bound();
    assert!(mesh_bound.p_min.y >= bound.p_min.y - 1e-6);
    assert!(mesh_bound.p_max.y <= bound.p_max.y + 1e-6);
}

#[test]
fn relative_paths_resolve_against_the_scene_file() {
    let cache = Arc::new(InstanceCache::new());
    let mut scene = Scene::new(&data(""));
    scene
        .parse_str_with(
            "fileInstance part.ray [ ]",
            Arc::new(Registries::with_builtins().unwrap()),
            cache.clone(),
        )
        .unwrap();
    let hit = scene.intersect(&ray((0.0, 10.0, 0.0), (0.0, -1.0, 0.0))).unwrap();
    assert_relative_eq!(hit.t, 8.0, epsilon = 1e-9);
}
