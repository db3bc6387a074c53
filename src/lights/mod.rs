//! In order for objects in a scene to be visible, there must be a
//! source of illumination so that some light is reflected from them
//! to the viewer.
//!
//! - DirectionalLight
//! - PointLight
//! - SpotLight
//! - SphereLight
//!
//! ## Directional Lights
//!
//! A directional light describes an emitter that deposits
//! illumination from the same direction at every point in space.
//!
//! ## Point Lights
//!
//! Isotropic point light source that emits the same amount of light
//! in all directions, weakened with distance by constant, linear and
//! quadratic attenuation terms.
//!
//! ## Spotlights
//!
//! Spotlights are a handy variation on point lights; rather than
//! shining illumination in all directions, they emit light in a cone
//! of directions from their position. Inside the cone the intensity
//! falls off with a power of the cosine to the spot axis.
//!
//! ## Sphere Lights
//!
//! A spherical emitter. Attenuation is measured from the sphere's
//! surface, and points on the visible cap can be sampled for soft
//! shadows.

pub mod directional;
pub mod point;
pub mod sphere;
pub mod spot;
