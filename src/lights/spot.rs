// rs_ray
use crate::core::common::radians;
use crate::core::common::Float;
use crate::core::error::{Location, Result, SceneError};
use crate::core::geometry::{vec3_dot_vec3f, Point3f, Vector3f};
use crate::core::light::{Attenuation, Light, LightSample};
use crate::core::parser::SceneParser;
use crate::core::spectrum::RGBSpectrum;
use crate::lights::point::direction_to;

#[derive(Debug, Clone)]
pub struct SpotLight {
    pub p_light: Point3f,
    pub i: RGBSpectrum,
    /// unit axis of the cone
    pub direction: Vector3f,
    pub attenuation: Attenuation,
    pub cos_cutoff: Float,
    pub drop_off: Float,
}

impl SpotLight {
    pub const DIRECTIVE: &'static str = "spotLight";

    /// `cutoff` is the half angle of the cone in degrees. Returns
    /// `None` for a zero axis.
    pub fn new(
        p_light: Point3f,
        i: RGBSpectrum,
        direction: Vector3f,
        attenuation: Attenuation,
        cutoff: Float,
        drop_off: Float,
    ) -> Option<Self> {
        if direction.length_squared() == 0.0 {
            return None;
        }
        Some(SpotLight {
            p_light,
            i,
            direction: direction.normalize(),
            attenuation,
            cos_cutoff: radians(cutoff).cos(),
            drop_off,
        })
    }
    /// `spotLight r g b px py pz dx dy dz kc kl kq cutoff drop_off`
    pub fn create(parser: &mut SceneParser) -> Result<Box<dyn Light>> {
        let i: RGBSpectrum = parser.next_spectrum()?;
        let p_light: Point3f = parser.next_point3f()?;
        let direction_location: Location = parser.location();
        let direction: Vector3f = parser.next_vector3f()?;
        let attenuation: Attenuation = Attenuation::new(
            parser.next_float()?,
            parser.next_float()?,
            parser.next_float()?,
        );
        let cutoff_location: Location = parser.location();
        let cutoff: Float = parser.next_float()?;
        if !(0.0..=180.0).contains(&cutoff) {
            return Err(SceneError::malformed(
                parser.current_directive(),
                cutoff_location,
                format!("cutoff angle must lie in [0, 180], found {}", cutoff),
            ));
        }
        let drop_off: Float = parser.next_float()?;
        match SpotLight::new(p_light, i, direction, attenuation, cutoff, drop_off) {
            Some(light) => Ok(Box::new(light)),
            None => Err(SceneError::malformed(
                parser.current_directive(),
                direction_location,
                "spot direction must not be zero",
            )),
        }
    }
    /// Angular weight for light leaving along `w`, zero outside the
    /// cone.
    pub fn falloff(&self, w: &Vector3f) -> Float {
        let cos_theta: Float = vec3_dot_vec3f(w, &self.direction);
        if cos_theta < self.cos_cutoff {
            return 0.0 as Float;
        }
        cos_theta.max(0.0).powf(self.drop_off)
    }
}

impl Light for SpotLight {
    fn contribution(&self, p: &Point3f) -> LightSample {
        let (wi, distance) = direction_to(p, &self.p_light);
        let falloff: Float = if distance > 0.0 {
            self.falloff(&-wi)
        } else {
            1.0
        };
        LightSample {
            wi,
            li: self.i * (self.attenuation.factor(distance) * falloff),
            distance,
        }
    }
    fn directive(&self) -> &'static str {
        SpotLight::DIRECTIVE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spot() -> SpotLight {
        // pointing straight down from y = 10 with a 30 degree cone
        SpotLight::new(
            Point3f::new(0.0, 10.0, 0.0),
            RGBSpectrum::new(1.0),
            Vector3f::new(0.0, -1.0, 0.0),
            Attenuation::default(),
            30.0,
            2.0,
        )
        .unwrap()
    }

    #[test]
    fn full_intensity_on_the_axis() {
        let sample = spot().contribution(&Point3f::default());
        assert_relative_eq!(sample.li[1], 1.0);
        assert_relative_eq!(sample.distance, 10.0);
    }

    #[test]
    fn cosine_power_inside_the_cone() {
        // 20 degrees off the axis
        let x = 10.0 * radians(20.0).tan();
        let sample = spot().contribution(&Point3f::new(x, 0.0, 0.0));
        assert_relative_eq!(sample.li[0], radians(20.0).cos().powi(2), epsilon = 1e-12);
    }

    #[test]
    fn dark_outside_the_cone() {
        let x = 10.0 * radians(40.0).tan();
        let sample = spot().contribution(&Point3f::new(x, 0.0, 0.0));
        assert!(sample.li.is_black());
        // behind the light
        assert!(spot().contribution(&Point3f::new(0.0, 20.0, 0.0)).li.is_black());
    }
}
