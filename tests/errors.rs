// std
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
// rs_ray
use rs_ray::core::error::{Result, SceneError};
use rs_ray::core::instance::InstanceCache;
use rs_ray::core::registry::Registries;
use rs_ray::core::scene::Scene;

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn canonical(name: &str) -> PathBuf {
    fs::canonicalize(data(name)).unwrap()
}

fn load(name: &str, cache: &Arc<InstanceCache>) -> Result<Scene> {
    Scene::load_with(
        data(name),
        Arc::new(Registries::with_builtins()?),
        cache.clone(),
    )
}

#[test]
fn mutual_references_are_a_cycle() {
    let cache = Arc::new(InstanceCache::new());
    let err = load("cycle_a.ray", &cache).err().unwrap();
    match err {
        SceneError::CyclicReference {
            ref path,
            ref chain,
            ref location,
            ..
        } => {
            assert_eq!(path, &canonical("cycle_a.ray"));
            assert_eq!(
                chain,
                &vec![
                    canonical("cycle_a.ray"),
                    canonical("cycle_b.ray"),
                    canonical("cycle_a.ray"),
                ]
            );
            assert!(location.file.ends_with("cycle_b.ray"));
            assert_eq!(location.line, 2);
        }
        other => panic!("unexpected error {:?}", other),
    }
    // nothing half-parsed stays behind
    assert!(!cache.contains(&canonical("cycle_b.ray")));
    assert_eq!(cache.parse_count(), 0);
}

#[test]
fn a_file_referencing_itself_is_a_cycle() {
    let cache = Arc::new(InstanceCache::new());
    let err = load("self_reference.ray", &cache).err().unwrap();
    match err {
        SceneError::CyclicReference { path, chain, .. } => {
            assert_eq!(path, canonical("self_reference.ray"));
            assert_eq!(chain.len(), 2);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn missing_files_are_reported_through_every_level() {
    let cache = Arc::new(InstanceCache::new());
    let err = load("uses_broken_part.ray", &cache).err().unwrap();
    let inner: &SceneError = match err {
        SceneError::MissingReference {
            ref path,
            ref location,
            ref source,
            ..
        } => {
            assert_eq!(path, &canonical("broken_part.ray"));
            assert_eq!(location.line, 2);
            source.as_ref()
        }
        ref other => panic!("unexpected error {:?}", other),
    };
    match inner {
        SceneError::MissingReference { path, source, .. } => {
            assert!(path.ends_with("does_not_exist.ray"));
            assert!(matches!(**source, SceneError::Io { .. }));
        }
        other => panic!("unexpected inner error {:?}", other),
    }
    // the chain is walkable through std::error::Error
    let mut depth: usize = 0;
    let mut current: Option<&dyn Error> = Some(&err);
    while let Some(e) = current {
        depth += 1;
        current = e.source();
    }
    assert!(depth >= 3);
    assert!(!cache.contains(&canonical("broken_part.ray")));
}

#[test]
fn unknown_directive_names_its_position() {
    let cache = Arc::new(InstanceCache::new());
    let err = load("unknown_directive.ray", &cache).err().unwrap();
    match err {
        SceneError::UnknownDirective {
            directive,
            location,
        } => {
            assert_eq!(directive, "teapot");
            assert_eq!((location.line, location.col), (2, 1));
            assert!(location.file.ends_with("unknown_directive.ray"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn invalid_arguments_are_malformed() {
    let cache = Arc::new(InstanceCache::new());
    let err = load("malformed.ray", &cache).err().unwrap();
    match err {
        SceneError::MalformedScene {
            directive,
            location,
            ..
        } => {
            assert_eq!(directive, "sphere");
            assert_eq!(location.line, 1);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn missing_top_level_file_is_an_io_error() {
    let cache = Arc::new(InstanceCache::new());
    let err = load("no_such_scene.ray", &cache).err().unwrap();
    assert!(matches!(err, SceneError::Io { .. }));
    assert!(err.location().is_none());
}

#[test]
fn truncated_statement_is_malformed() {
    let mut scene = Scene::new(&data(""));
    let err = scene
        .parse_str_with(
            "shapeList 3\n  sphere 0 0 0 1\n  box 0 0 0 1 1 1\n",
            Arc::new(Registries::with_builtins().unwrap()),
            Arc::new(InstanceCache::new()),
        )
        .unwrap_err();
    assert!(matches!(err, SceneError::MalformedScene { .. }));
    assert!(scene.shapes.is_empty());
}

fn parse_err(input: &str) -> SceneError {
    let mut scene = Scene::new(&data(""));
    let err = scene
        .parse_str_with(
            input,
            Arc::new(Registries::with_builtins().unwrap()),
            Arc::new(InstanceCache::new()),
        )
        .unwrap_err();
    assert!(scene.shapes.is_empty());
    err
}

#[test]
fn huge_counts_are_malformed() {
    for (input, directive) in [
        ("shapeList 18446744073709551615 sphere 0 0 0 1", "shapeList"),
        ("triangleList 18446744073709551615 0 0 0 1 0 0", "triangleList"),
        ("triangleList 3 0 0 0 1 0 0 0 1 0 18446744073709551615 0 1 2", "triangleList"),
        (
            "dynamicAffine spin keyframes 18446744073709551615 0 [ ] sphere 0 0 0 1",
            "dynamicAffine",
        ),
    ] {
        match parse_err(input) {
            SceneError::MalformedScene { directive: d, .. } => assert_eq!(d, directive),
            other => panic!("expected MalformedScene for '{}', got {:?}", input, other),
        }
    }
}

#[test]
fn deep_nesting_is_malformed() {
    let input = format!("{}sphere 0 0 0 1", "shapeList 1 ".repeat(1000));
    match parse_err(&input) {
        SceneError::MalformedScene {
            directive, message, ..
        } => {
            assert_eq!(directive, "shapeList");
            assert!(message.contains("nested"));
        }
        other => panic!("expected MalformedScene, got {:?}", other),
    }
    // moderate nesting is fine
    let mut scene = Scene::new(&data(""));
    scene
        .parse_str_with(
            &format!("{}sphere 0 0 0 1", "shapeList 1 ".repeat(100)),
            Arc::new(Registries::with_builtins().unwrap()),
            Arc::new(InstanceCache::new()),
        )
        .unwrap();
    assert_eq!(scene.shapes.len(), 1);
}
