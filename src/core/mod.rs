//! Core functionality: geometry and transforms, the shape and light
//! interfaces, directive registries, the scene parser with its
//! instance cache, and the preview renderer.
//!
//! ## Geometry
//!
//! Points, vectors, normals, rays and axis-aligned bounding boxes
//! live in **geometry**, 4x4 matrices and affine transforms in
//! **transform**. Rotations are blended as unit **quaternion**s when
//! keyframes are interpolated.
//!
//! ## Scene Files
//!
//! A scene file is a sequence of directives. The **lexer** splits it
//! into tokens, the **parser** looks every directive up in the
//! **registry** and lets the matching factory read its arguments.
//! Referenced files are parsed once and shared through the
//! **instance** cache.

pub mod animation;
pub mod common;
pub mod error;
pub mod geometry;
pub mod instance;
pub mod interaction;
pub mod lexer;
pub mod light;
pub mod parser;
pub mod preview;
pub mod quaternion;
pub mod registry;
pub mod scene;
pub mod shape;
pub mod spectrum;
pub mod transform;
