// std
use std::f64::consts::PI;
// rs_ray
use crate::core::common::Float;
use crate::core::error::Result;
use crate::core::geometry::{vec3_coordinate_system, Point2f, Point3f, Vector3f};
use crate::core::light::{Attenuation, Light, LightSample};
use crate::core::parser::SceneParser;
use crate::core::spectrum::RGBSpectrum;
use crate::lights::point::direction_to;

#[derive(Debug, Clone)]
pub struct SphereLight {
    pub center: Point3f,
    pub radius: Float,
    pub l: RGBSpectrum,
    pub attenuation: Attenuation,
}

impl SphereLight {
    pub const DIRECTIVE: &'static str = "sphereLight";

    pub fn new(center: Point3f, radius: Float, l: RGBSpectrum, attenuation: Attenuation) -> Self {
        SphereLight {
            center,
            radius,
            l,
            attenuation,
        }
    }
    /// `sphereLight r g b px py pz radius kc kl kq`
    pub fn create(parser: &mut SceneParser) -> Result<Box<dyn Light>> {
        let l: RGBSpectrum = parser.next_spectrum()?;
        let center: Point3f = parser.next_point3f()?;
        let radius: Float = parser.next_positive_float("radius")?;
        let attenuation: Attenuation = Attenuation::new(
            parser.next_float()?,
            parser.next_float()?,
            parser.next_float()?,
        );
        Ok(Box::new(SphereLight::new(center, radius, l, attenuation)))
    }
    /// Light arriving from a point on the part of the sphere visible
    /// from `p`, chosen by the uniform sample `u` in [0,1)^2. Points
    /// inside the sphere get the plain contribution.
    pub fn sample_contribution(&self, p: &Point3f, u: &Point2f) -> LightSample {
        let (wc, dc) = direction_to(p, &self.center);
        if dc <= self.radius {
            return self.contribution(p);
        }
        // sample uniformly inside subtended cone
        let sin_theta_max2: Float = self.radius * self.radius / (dc * dc);
        let cos_theta_max: Float = (1.0 as Float - sin_theta_max2).max(0.0).sqrt();
        let cos_theta: Float = (1.0 as Float - u.x) + u.x * cos_theta_max;
        let sin_theta: Float = (1.0 as Float - cos_theta * cos_theta).max(0.0).sqrt();
        let phi: Float = u.y * 2.0 as Float * PI;
        let (wc_x, wc_y) = vec3_coordinate_system(&wc);
        let wi: Vector3f =
            wc * cos_theta + wc_x * (sin_theta * phi.cos()) + wc_y * (sin_theta * phi.sin());
        // distance along _wi_ to the near side of the sphere
        let discriminant: Float =
            (self.radius * self.radius - dc * dc * sin_theta * sin_theta).max(0.0);
        let distance: Float = dc * cos_theta - discriminant.sqrt();
        LightSample {
            wi: wi.normalize(),
            li: self.l * self.attenuation.factor(distance),
            distance,
        }
    }
}

impl Light for SphereLight {
    fn contribution(&self, p: &Point3f) -> LightSample {
        let (wi, dc) = direction_to(p, &self.center);
        let distance: Float = (dc - self.radius).max(0.0);
        LightSample {
            wi,
            li: self.l * self.attenuation.factor(distance),
            distance,
        }
    }
    fn directive(&self) -> &'static str {
        SphereLight::DIRECTIVE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::vec3_dot_vec3f;
    use approx::assert_relative_eq;

    fn light() -> SphereLight {
        SphereLight::new(
            Point3f::new(0.0, 0.0, 10.0),
            2.0,
            RGBSpectrum::new(1.0),
            Attenuation::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn attenuated_by_distance_to_the_surface() {
        let sample = light().contribution(&Point3f::default());
        assert_relative_eq!(sample.distance, 8.0);
        assert_relative_eq!(sample.li[0], 1.0 / 8.0);
        assert_relative_eq!(sample.wi.z, 1.0);
    }

    #[test]
    fn samples_stay_inside_the_visible_cone() {
        let l = light();
        let p = Point3f::default();
        let cos_theta_max = (1.0 - 0.04 as Float).sqrt();
        for (ux, uy) in [(0.0, 0.0), (0.5, 0.25), (0.999, 0.9), (0.3, 0.6)] {
            let sample = l.sample_contribution(&p, &Point2f { x: ux, y: uy });
            assert_relative_eq!(sample.wi.length(), 1.0, epsilon = 1e-12);
            let cos_theta = vec3_dot_vec3f(&sample.wi, &Vector3f::new(0.0, 0.0, 1.0));
            assert!(cos_theta >= cos_theta_max - 1e-12);
            // the sampled point lies on the sphere
            let q = p + sample.wi * sample.distance;
            assert_relative_eq!((q - l.center).length(), 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn inside_the_light_falls_back_to_the_plain_contribution() {
        let l = light();
        let p = Point3f::new(0.0, 0.5, 10.0);
        let u = Point2f { x: 0.5, y: 0.5 };
        assert_eq!(l.sample_contribution(&p, &u), l.contribution(&p));
    }
}
