// The process-wide registries can only be torn down once per process,
// so the whole lifecycle lives in a single test.

// std
use std::path::{Path, PathBuf};
// rs_ray
use rs_ray::core::error::{Location, Result, SceneError};
use rs_ray::core::parser::SceneParser;
use rs_ray::core::registry;
use rs_ray::core::scene::Scene;
use rs_ray::core::shape::Shape;
use rs_ray::shapes::sphere::Sphere;

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn ball(parser: &mut SceneParser) -> Result<Box<dyn Shape>> {
    let radius = parser.next_positive_float("radius")?;
    Ok(Box::new(Sphere::new(Default::default(), radius)))
}

#[test]
fn registry_lifecycle() {
    assert!(matches!(
        Scene::load(data("part.ray")),
        Err(SceneError::RegistryUninitialized)
    ));
    assert!(matches!(
        registry::register_shape("ball", ball),
        Err(SceneError::RegistryUninitialized)
    ));

    let registries = registry::initialize().unwrap();
    assert!(registries
        .resolve_shape("ball", &Location::default())
        .is_err());
    let again = registry::initialize().unwrap();
    assert_eq!(registries.shapes.len(), again.shapes.len());

    let scene = Scene::load(data("showcase.ray")).unwrap();
    assert_eq!(scene.lights.len(), 4);

    // a custom directive becomes visible to the next parse
    registry::register_shape("ball", ball).unwrap();
    let mut custom = Scene::new(&data(""));
    custom.parse_str("ball 2").unwrap();
    assert_eq!(custom.shapes.len(), 1);
    assert!(matches!(
        registry::register_shape("ball", ball),
        Err(SceneError::DuplicateDirective { family: "shape", .. })
    ));

    registry::teardown();
    assert!(matches!(
        Scene::load(data("part.ray")),
        Err(SceneError::RegistryTornDown)
    ));
    assert!(matches!(
        registry::initialize(),
        Err(SceneError::RegistryTornDown)
    ));
    // shapes built before the teardown keep working
    assert!(!scene.tessellate_with(4).is_empty());
}
