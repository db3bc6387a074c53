// rs_ray
use crate::core::common::Float;
use crate::core::error::{Location, Result, SceneError};
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::light::{Light, LightSample};
use crate::core::parser::SceneParser;
use crate::core::spectrum::RGBSpectrum;

#[derive(Debug, Clone)]
pub struct DirectionalLight {
    pub l: RGBSpectrum,
    /// unit direction the light travels in
    pub direction: Vector3f,
}

impl DirectionalLight {
    pub const DIRECTIVE: &'static str = "directionalLight";

    /// Returns `None` for a zero direction.
    pub fn new(l: RGBSpectrum, direction: Vector3f) -> Option<Self> {
        if direction.length_squared() == 0.0 {
            return None;
        }
        Some(DirectionalLight {
            l,
            direction: direction.normalize(),
        })
    }
    /// `directionalLight r g b dx dy dz`
    pub fn create(parser: &mut SceneParser) -> Result<Box<dyn Light>> {
        let l: RGBSpectrum = parser.next_spectrum()?;
        let location: Location = parser.location();
        let direction: Vector3f = parser.next_vector3f()?;
        match DirectionalLight::new(l, direction) {
            Some(light) => Ok(Box::new(light)),
            None => Err(SceneError::malformed(
                parser.current_directive(),
                location,
                "light direction must not be zero",
            )),
        }
    }
}

impl Light for DirectionalLight {
    fn contribution(&self, _p: &Point3f) -> LightSample {
        LightSample {
            wi: -self.direction,
            li: self.l,
            distance: Float::INFINITY,
        }
    }
    fn directive(&self) -> &'static str {
        DirectionalLight::DIRECTIVE
    }
}
