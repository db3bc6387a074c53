//! # rs_ray
//!
//! [Rust][rust] crate to read declarative ray scene files into a tree
//! of shapes and lights, and to answer ray queries against it.
//!
//! A scene file is a list of directives. Every directive names a
//! factory in a registry (see `core::registry`), which reads the
//! directive's arguments and returns a shape or a light. Composite
//! shapes nest other directives, and `fileInstance` pulls in another
//! scene file that is parsed once and shared.
//!
//! ```rust
//! use std::path::Path;
//! use std::sync::Arc;
//! use rs_ray::core::geometry::{Point3f, Ray, Vector3f};
//! use rs_ray::core::instance::InstanceCache;
//! use rs_ray::core::registry::Registries;
//! use rs_ray::core::scene::Scene;
//!
//! let mut scene = Scene::new(Path::new("."));
//! scene
//!     .parse_str_with(
//!         "pointLight 1 1 1  0 10 0  1 0 0\n\
//!          staticAffine [ translate 0 0 5 ] sphere 0 0 0 1\n",
//!         Arc::new(Registries::with_builtins().unwrap()),
//!         Arc::new(InstanceCache::new()),
//!     )
//!     .unwrap();
//! let ray = Ray::new(Point3f::default(), Vector3f::new(0.0, 0.0, 1.0));
//! let hit = scene.intersect(&ray).unwrap();
//! assert!((hit.t - 4.0).abs() < 1e-9);
//! ```
//!
//! [rust]: https://www.rust-lang.org

#[macro_use]
extern crate impl_ops;

pub mod core;
pub mod lights;
pub mod shapes;
