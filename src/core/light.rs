//! In order for objects in a scene to be visible, there must be a
//! source of illumination. A **Light** answers a single query: what
//! arrives at a surface point, from which direction and from how far
//! away. Occlusion is left to the caller.

// rs_ray
use crate::core::common::Float;
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::spectrum::RGBSpectrum;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct LightSample {
    /// unit direction from the surface point toward the light
    pub wi: Vector3f,
    /// intensity arriving at the surface point
    pub li: RGBSpectrum,
    /// distance to the light, infinite for directional lights
    pub distance: Float,
}

pub trait Light: Send + Sync {
    /// Returns the light arriving at a point, assuming there are no
    /// occluding objects between them.
    fn contribution(&self, p: &Point3f) -> LightSample;
    /// The directive this light is created from.
    fn directive(&self) -> &'static str;
}

/// Constant, linear and quadratic falloff with distance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Attenuation {
    pub constant: Float,
    pub linear: Float,
    pub quadratic: Float,
}

impl Default for Attenuation {
    fn default() -> Self {
        Attenuation {
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
        }
    }
}

impl Attenuation {
    pub fn new(constant: Float, linear: Float, quadratic: Float) -> Self {
        Attenuation {
            constant,
            linear,
            quadratic,
        }
    }
    /// Scale factor at distance `d`. A non-positive denominator means
    /// no falloff.
    pub fn factor(&self, d: Float) -> Float {
        let denom: Float = self.constant + self.linear * d + self.quadratic * d * d;
        if denom > 0.0 {
            1.0 / denom
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn attenuation_factor() {
        let a = Attenuation::new(1.0, 0.5, 0.25);
        assert_relative_eq!(a.factor(2.0), 1.0 / 3.0);
        assert_relative_eq!(Attenuation::new(0.0, 0.0, 0.0).factor(5.0), 1.0);
    }
}
