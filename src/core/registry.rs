//! Directive registries map the first word of a scene statement to
//! the factory that constructs the matching node. Shapes and lights
//! live in separate families, so the same word could name a shape
//! and a light without conflict.
//!
//! New node kinds are added by registering another factory; the
//! parser itself never changes:
//!
//! ```rust
//! use rs_ray::core::parser::SceneParser;
//! use rs_ray::core::registry::Registries;
//! use rs_ray::core::shape::Shape;
//! use rs_ray::shapes::sphere::Sphere;
//!
//! let mut registries = Registries::with_builtins().unwrap();
//! registries
//!     .register_shape("ball", |parser: &mut SceneParser| -> rs_ray::core::error::Result<Box<dyn Shape>> {
//!         let radius = parser.next_float()?;
//!         Ok(Box::new(Sphere::new(Default::default(), radius)))
//!     })
//!     .unwrap();
//! assert!(registries.shapes.contains("ball"));
//! ```
//!
//! The process-wide registries are created once by `initialize()`
//! and torn down by `teardown()`. Parsing with the global registries
//! after teardown fails with `SceneError::RegistryTornDown`.

// std
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
// others
use lazy_static::lazy_static;
use log::{debug, info};
// rs_ray
use crate::core::error::{Location, Result, SceneError};
use crate::core::light::Light;
use crate::core::parser::SceneParser;
use crate::core::shape::Shape;
use crate::lights::directional::DirectionalLight;
use crate::lights::point::PointLight;
use crate::lights::sphere::SphereLight;
use crate::lights::spot::SpotLight;
use crate::shapes::affine::{DynamicAffineShape, StaticAffineShape};
use crate::shapes::boxshape::BoxShape;
use crate::shapes::cone::Cone;
use crate::shapes::cylinder::Cylinder;
use crate::shapes::fileinstance::FileInstance;
use crate::shapes::shapelist::ShapeList;
use crate::shapes::sphere::Sphere;
use crate::shapes::torus::Torus;
use crate::shapes::triangle::Triangle;
use crate::shapes::trianglelist::TriangleList;

/// Constructs one node from the tokens following its directive.
pub trait Factory<T>: Send + Sync {
    fn construct(&self, parser: &mut SceneParser) -> Result<T>;
}

impl<T, F> Factory<T> for F
where
    F: Fn(&mut SceneParser) -> Result<T> + Send + Sync,
{
    fn construct(&self, parser: &mut SceneParser) -> Result<T> {
        self(parser)
    }
}

pub type ShapeFactory = Arc<dyn Factory<Box<dyn Shape>>>;
pub type LightFactory = Arc<dyn Factory<Box<dyn Light>>>;

/// Directive to factory mapping for one node family.
pub struct Registry<T> {
    family: &'static str,
    factories: HashMap<String, Arc<dyn Factory<T>>>,
}

impl<T> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Registry {
            family: self.family,
            factories: self.factories.clone(),
        }
    }
}

impl<T> Registry<T> {
    pub fn new(family: &'static str) -> Self {
        Registry {
            family,
            factories: HashMap::new(),
        }
    }
    pub fn family(&self) -> &'static str {
        self.family
    }
    /// The first registration of a directive wins, later ones are
    /// rejected.
    pub fn register(&mut self, directive: &str, factory: Arc<dyn Factory<T>>) -> Result<()> {
        if self.factories.contains_key(directive) {
            return Err(SceneError::DuplicateDirective {
                family: self.family,
                directive: directive.to_string(),
            });
        }
        debug!("Registered {} directive '{}'", self.family, directive);
        self.factories.insert(directive.to_string(), factory);
        Ok(())
    }
    pub fn get(&self, directive: &str) -> Option<Arc<dyn Factory<T>>> {
        self.factories.get(directive).cloned()
    }
    /// Case-sensitive exact lookup.
    pub fn resolve(&self, directive: &str, location: &Location) -> Result<Arc<dyn Factory<T>>> {
        self.get(directive)
            .ok_or_else(|| SceneError::UnknownDirective {
                directive: directive.to_string(),
                location: location.clone(),
            })
    }
    pub fn contains(&self, directive: &str) -> bool {
        self.factories.contains_key(directive)
    }
    pub fn len(&self) -> usize {
        self.factories.len()
    }
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
    pub fn directives(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Both directive families handed to a parser.
#[derive(Clone)]
pub struct Registries {
    pub shapes: Registry<Box<dyn Shape>>,
    pub lights: Registry<Box<dyn Light>>,
}

impl Default for Registries {
    fn default() -> Self {
        Registries::new()
    }
}

impl Registries {
    /// Empty registries.
    pub fn new() -> Self {
        Registries {
            shapes: Registry::new("shape"),
            lights: Registry::new("light"),
        }
    }
    /// Registries holding every built-in shape and light.
    pub fn with_builtins() -> Result<Self> {
        let mut registries = Registries::new();
        register_builtins(&mut registries)?;
        Ok(registries)
    }
    pub fn register_shape<F>(&mut self, directive: &str, factory: F) -> Result<()>
    where
        F: Factory<Box<dyn Shape>> + 'static,
    {
        self.shapes.register(directive, Arc::new(factory))
    }
    pub fn register_light<F>(&mut self, directive: &str, factory: F) -> Result<()>
    where
        F: Factory<Box<dyn Light>> + 'static,
    {
        self.lights.register(directive, Arc::new(factory))
    }
    pub fn resolve_shape(&self, directive: &str, location: &Location) -> Result<ShapeFactory> {
        self.shapes.resolve(directive, location)
    }
    pub fn resolve_light(&self, directive: &str, location: &Location) -> Result<LightFactory> {
        self.lights.resolve(directive, location)
    }
}

/// Adds all built-in directives to `registries`.
pub fn register_builtins(registries: &mut Registries) -> Result<()> {
    registries.register_shape(BoxShape::DIRECTIVE, BoxShape::create)?;
    registries.register_shape(Cone::DIRECTIVE, Cone::create)?;
    registries.register_shape(Cylinder::DIRECTIVE, Cylinder::create)?;
    registries.register_shape(Sphere::DIRECTIVE, Sphere::create)?;
    registries.register_shape(Torus::DIRECTIVE, Torus::create)?;
    registries.register_shape(Triangle::DIRECTIVE, Triangle::create)?;
    registries.register_shape(ShapeList::DIRECTIVE, ShapeList::create)?;
    registries.register_shape(TriangleList::DIRECTIVE, TriangleList::create)?;
    registries.register_shape(StaticAffineShape::DIRECTIVE, StaticAffineShape::create)?;
    registries.register_shape(DynamicAffineShape::DIRECTIVE, DynamicAffineShape::create)?;
    registries.register_shape(FileInstance::DIRECTIVE, FileInstance::create)?;
    registries.register_light(DirectionalLight::DIRECTIVE, DirectionalLight::create)?;
    registries.register_light(PointLight::DIRECTIVE, PointLight::create)?;
    registries.register_light(SpotLight::DIRECTIVE, SpotLight::create)?;
    registries.register_light(SphereLight::DIRECTIVE, SphereLight::create)?;
    Ok(())
}

enum RegistryState {
    Uninitialized,
    Ready(Arc<Registries>),
    TornDown,
}

lazy_static! {
    static ref REGISTRIES: RwLock<RegistryState> = RwLock::new(RegistryState::Uninitialized);
}

/// Populate the process-wide registries with the built-in directives.
/// Calling it again returns the existing registries.
pub fn initialize() -> Result<Arc<Registries>> {
    let mut state = REGISTRIES.write().unwrap_or_else(PoisonError::into_inner);
    match &*state {
        RegistryState::Ready(registries) => Ok(registries.clone()),
        RegistryState::TornDown => Err(SceneError::RegistryTornDown),
        RegistryState::Uninitialized => {
            let registries = Arc::new(Registries::with_builtins()?);
            info!(
                "Initialized {} shape and {} light directives",
                registries.shapes.len(),
                registries.lights.len()
            );
            *state = RegistryState::Ready(registries.clone());
            Ok(registries)
        }
    }
}

fn update<F>(f: F) -> Result<()>
where
    F: FnOnce(&mut Registries) -> Result<()>,
{
    let mut state = REGISTRIES.write().unwrap_or_else(PoisonError::into_inner);
    match &mut *state {
        RegistryState::Uninitialized => Err(SceneError::RegistryUninitialized),
        RegistryState::TornDown => Err(SceneError::RegistryTornDown),
        RegistryState::Ready(registries) => {
            // parsers holding the old snapshot keep using it
            let mut next: Registries = (**registries).clone();
            f(&mut next)?;
            *registries = Arc::new(next);
            Ok(())
        }
    }
}

/// Register an additional shape directive in the process-wide
/// registries.
pub fn register_shape<F>(directive: &str, factory: F) -> Result<()>
where
    F: Factory<Box<dyn Shape>> + 'static,
{
    update(|registries| registries.register_shape(directive, factory))
}

/// Register an additional light directive in the process-wide
/// registries.
pub fn register_light<F>(directive: &str, factory: F) -> Result<()>
where
    F: Factory<Box<dyn Light>> + 'static,
{
    update(|registries| registries.register_light(directive, factory))
}

/// The process-wide registries.
pub fn active() -> Result<Arc<Registries>> {
    let state = REGISTRIES.read().unwrap_or_else(PoisonError::into_inner);
    match &*state {
        RegistryState::Ready(registries) => Ok(registries.clone()),
        RegistryState::Uninitialized => Err(SceneError::RegistryUninitialized),
        RegistryState::TornDown => Err(SceneError::RegistryTornDown),
    }
}

/// Drop the process-wide registries. There is no way back.
pub fn teardown() {
    let mut state = REGISTRIES.write().unwrap_or_else(PoisonError::into_inner);
    if let RegistryState::Ready(_) = &*state {
        info!("Tearing down directive registries");
    }
    *state = RegistryState::TornDown;
}
