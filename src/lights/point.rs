// rs_ray
use crate::core::common::Float;
use crate::core::error::Result;
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::light::{Attenuation, Light, LightSample};
use crate::core::parser::SceneParser;
use crate::core::spectrum::RGBSpectrum;

#[derive(Debug, Clone)]
pub struct PointLight {
    pub p_light: Point3f,
    pub i: RGBSpectrum,
    pub attenuation: Attenuation,
}

impl PointLight {
    pub const DIRECTIVE: &'static str = "pointLight";

    pub fn new(p_light: Point3f, i: RGBSpectrum, attenuation: Attenuation) -> Self {
        PointLight {
            p_light,
            i,
            attenuation,
        }
    }
    /// `pointLight r g b px py pz kc kl kq`
    pub fn create(parser: &mut SceneParser) -> Result<Box<dyn Light>> {
        let i: RGBSpectrum = parser.next_spectrum()?;
        let p_light: Point3f = parser.next_point3f()?;
        let attenuation: Attenuation = Attenuation::new(
            parser.next_float()?,
            parser.next_float()?,
            parser.next_float()?,
        );
        Ok(Box::new(PointLight::new(p_light, i, attenuation)))
    }
}

/// Unit direction and distance from `p` to `p_light`. A point on top
/// of the light gets a zero direction.
pub fn direction_to(p: &Point3f, p_light: &Point3f) -> (Vector3f, Float) {
    let to_light: Vector3f = *p_light - *p;
    let distance: Float = to_light.length();
    if distance > 0.0 {
        (to_light / distance, distance)
    } else {
        (Vector3f::default(), 0.0)
    }
}

impl Light for PointLight {
    fn contribution(&self, p: &Point3f) -> LightSample {
        let (wi, distance) = direction_to(p, &self.p_light);
        LightSample {
            wi,
            li: self.i * self.attenuation.factor(distance),
            distance,
        }
    }
    fn directive(&self) -> &'static str {
        PointLight::DIRECTIVE
    }
}
