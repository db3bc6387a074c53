//! Named transform channels drive `dynamicAffine` nodes. A channel
//! holds the transform currently in effect and, optionally, a list of
//! keyframes it can be resampled from. Channels are shared between
//! the scene (which updates them) and the shapes (which only read
//! them), so every update is visible to the next intersection.
//!
//! Linear interpolation can blend the raw matrices or split each
//! keyframe into translation, rotation and scale first (see
//! `RotationParameters`). Only the latter keeps a blend of two
//! rotations rigid.

// std
use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};
// others
use log::warn;
// rs_ray
use crate::core::common::Float;
use crate::core::geometry::Vector3f;
use crate::core::quaternion::{quat_slerp, Quaternion};
use crate::core::transform::Transform;
use crate::core::transform::{mtx_closest_rotation, mtx_lerp, mtx_mul, Matrix4x4};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// closest keyframe
    #[default]
    Nearest,
    /// element-wise matrix blend between neighbouring keyframes
    Linear,
}

impl FromStr for Interpolation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Interpolation::Nearest),
            "linear" => Ok(Interpolation::Linear),
            _ => Err(format!(
                "unknown interpolant '{}', expected 'nearest' or 'linear'",
                s
            )),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Interpolation::Nearest => write!(f, "nearest"),
            Interpolation::Linear => write!(f, "linear"),
        }
    }
}

/// How the rotation part of two keyframes is blended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RotationParameters {
    /// element-wise matrix blend, no decomposition
    #[default]
    Trivial,
    /// blend the rotation matrices, then snap to the closest rotation
    ClosestRotation,
    /// spherical interpolation of unit quaternions
    Quaternion,
}

impl FromStr for RotationParameters {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trivial" => Ok(RotationParameters::Trivial),
            "closest" => Ok(RotationParameters::ClosestRotation),
            "quaternion" => Ok(RotationParameters::Quaternion),
            _ => Err(format!(
                "unknown rotation parameters '{}', expected 'trivial', 'closest' or 'quaternion'",
                s
            )),
        }
    }
}

impl fmt::Display for RotationParameters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RotationParameters::Trivial => write!(f, "trivial"),
            RotationParameters::ClosestRotation => write!(f, "closest"),
            RotationParameters::Quaternion => write!(f, "quaternion"),
        }
    }
}

/// Blend `a` and `b` at `u` in [0, 1]. `None` if either keyframe or
/// the result is singular.
pub fn blend_transforms(
    u: Float,
    a: &Transform,
    b: &Transform,
    parameters: RotationParameters,
) -> Option<Transform> {
    if parameters == RotationParameters::Trivial {
        return Transform::from_matrix(mtx_lerp(u, &a.m, &b.m));
    }
    let (t0, r0, s0): (Vector3f, Matrix4x4, Matrix4x4) = Transform::decompose(&a.m)?;
    let (t1, r1, s1): (Vector3f, Matrix4x4, Matrix4x4) = Transform::decompose(&b.m)?;
    let rotation: Matrix4x4 = match parameters {
        RotationParameters::Quaternion => quat_slerp(
            u,
            &Quaternion::from_matrix(&r0),
            &Quaternion::from_matrix(&r1),
        )
        .to_matrix(),
        _ => mtx_closest_rotation(&mtx_lerp(u, &r0, &r1))?,
    };
    let translation: Vector3f = t0 * (1.0 - u) + t1 * u;
    let scale: Matrix4x4 = mtx_lerp(u, &s0, &s1);
    Transform::from_matrix(mtx_mul(
        &Transform::translate(&translation).m,
        &mtx_mul(&rotation, &scale),
    ))
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Keyframe {
    pub time: Float,
    pub transform: Transform,
}

#[derive(Debug)]
pub struct AffineChannel {
    name: String,
    transform: RwLock<Transform>,
    /// sorted by time
    keyframes: Vec<Keyframe>,
}

impl AffineChannel {
    pub fn new(name: &str, transform: Transform) -> Self {
        AffineChannel {
            name: name.to_string(),
            transform: RwLock::new(transform),
            keyframes: Vec::new(),
        }
    }
    /// A channel starting at its earliest keyframe.
    pub fn with_keyframes(name: &str, mut keyframes: Vec<Keyframe>) -> Self {
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        let initial: Transform = keyframes
            .first()
            .map(|k| k.transform)
            .unwrap_or_default();
        AffineChannel {
            name: name.to_string(),
            transform: RwLock::new(initial),
            keyframes,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }
    /// The transform currently in effect.
    pub fn transform(&self) -> Transform {
        *self.transform.read().unwrap_or_else(PoisonError::into_inner)
    }
    pub fn set_transform(&self, transform: Transform) {
        *self.transform.write().unwrap_or_else(PoisonError::into_inner) = transform;
    }
    /// Resample the keyframes at `time`, wrapping periodically over
    /// their time span. Channels without keyframes are left alone.
    pub fn animate(
        &self,
        time: Float,
        interpolation: Interpolation,
        parameters: RotationParameters,
    ) {
        if let Some(transform) = self.sample(time, interpolation, parameters) {
            self.set_transform(transform);
        }
    }
    pub fn sample(
        &self,
        time: Float,
        interpolation: Interpolation,
        parameters: RotationParameters,
    ) -> Option<Transform> {
        let first: &Keyframe = self.keyframes.first()?;
        let last: &Keyframe = self.keyframes.last()?;
        let period: Float = last.time - first.time;
        if period <= 0.0 || !time.is_finite() {
            return Some(first.transform);
        }
        let local: Float = first.time + (time - first.time).rem_euclid(period);
        // index of the first keyframe after _local_
        let next: usize = self
            .keyframes
            .iter()
            .position(|k| k.time > local)
            .unwrap_or(self.keyframes.len() - 1)
            .max(1);
        let k0: &Keyframe = &self.keyframes[next - 1];
        let k1: &Keyframe = &self.keyframes[next];
        let span: Float = k1.time - k0.time;
        let u: Float = if span > 0.0 {
            (local - k0.time) / span
        } else {
            0.0
        };
        match interpolation {
            Interpolation::Nearest => {
                if u < 0.5 {
                    Some(k0.transform)
                } else {
                    Some(k1.transform)
                }
            }
            Interpolation::Linear => {
                match blend_transforms(u, &k0.transform, &k1.transform, parameters) {
                    Some(t) => Some(t),
                    None => {
                        warn!(
                            "Channel '{}' blends to a singular matrix at time {}, using nearest keyframe",
                            self.name, time
                        );
                        self.sample(time, Interpolation::Nearest, parameters)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Point3f, Vector3f};
    use approx::assert_relative_eq;

    fn sliding_channel() -> AffineChannel {
        AffineChannel::with_keyframes(
            "slide",
            vec![
                Keyframe {
                    time: 2.0,
                    transform: Transform::translate(&Vector3f::new(4.0, 0.0, 0.0)),
                },
                Keyframe {
                    time: 0.0,
                    transform: Transform::default(),
                },
            ],
        )
    }

    fn x_offset(channel: &AffineChannel) -> Float {
        channel
            .transform()
            .transform_point(&Point3f::new(0.0, 0.0, 0.0))
            .x
    }

    #[test]
    fn starts_at_earliest_keyframe() {
        let channel = sliding_channel();
        assert_eq!(channel.keyframes()[0].time, 0.0);
        assert_relative_eq!(x_offset(&channel), 0.0);
    }

    #[test]
    fn linear_blends_between_keyframes() {
        let channel = sliding_channel();
        channel.animate(0.5, Interpolation::Linear, RotationParameters::Trivial);
        assert_relative_eq!(x_offset(&channel), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn nearest_snaps_and_time_wraps() {
        let channel = sliding_channel();
        channel.animate(1.5, Interpolation::Nearest, RotationParameters::Trivial);
        assert_relative_eq!(x_offset(&channel), 4.0);
        // 2.5 wraps to 0.5
        channel.animate(2.5, Interpolation::Linear, RotationParameters::Quaternion);
        assert_relative_eq!(x_offset(&channel), 1.0, epsilon = 1e-12);
        channel.animate(-1.5, Interpolation::Linear, RotationParameters::ClosestRotation);
        assert_relative_eq!(x_offset(&channel), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn channels_without_keyframes_keep_their_transform() {
        let t = Transform::translate(&Vector3f::new(0.0, 7.0, 0.0));
        let channel = AffineChannel::new("fixed", t);
        channel.animate(3.0, Interpolation::Linear, RotationParameters::Trivial);
        assert_eq!(channel.transform(), t);
    }

    #[test]
    fn interpolant_names_parse() {
        assert_eq!("Linear".parse::<Interpolation>(), Ok(Interpolation::Linear));
        assert!("cubic".parse::<Interpolation>().is_err());
        assert_eq!(
            "closest".parse::<RotationParameters>(),
            Ok(RotationParameters::ClosestRotation)
        );
        assert_eq!(RotationParameters::Quaternion.to_string(), "quaternion");
        assert!("euler".parse::<RotationParameters>().is_err());
    }

    fn half_turn_channel() -> AffineChannel {
        AffineChannel::with_keyframes(
            "turn",
            vec![
                Keyframe {
                    time: 0.0,
                    transform: Transform::translate(&Vector3f::new(0.0, 2.0, 0.0)),
                },
                Keyframe {
                    time: 1.0,
                    // exact half turn around y
                    transform: Transform::translate(&Vector3f::new(4.0, 2.0, 0.0))
                        * Transform::scale(-1.0, 1.0, -1.0).unwrap(),
                },
            ],
        )
    }

    fn assert_rigid(t: &Transform) {
        let m = &t.m.m;
        for i in 0..3 {
            for j in 0..3 {
                let dot: Float = (0..3).map(|k| m[k][i] * m[k][j]).sum();
                let expected: Float = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(dot, expected, epsilon = 1e-9);
            }
        }
        assert_relative_eq!(
            crate::core::transform::mtx_determinant3(&t.m),
            1.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn half_turn_stays_rigid_with_decomposition() {
        let channel = half_turn_channel();
        // the blended rotation matrix is singular exactly halfway, so
        // the closest rotation is only defined off the midpoint
        for (parameters, times) in [
            (RotationParameters::Quaternion, vec![0.25, 0.5, 0.75]),
            (RotationParameters::ClosestRotation, vec![0.25, 0.75]),
        ] {
            for time in times {
                let t = channel
                    .sample(time, Interpolation::Linear, parameters)
                    .unwrap();
                assert_rigid(&t);
                // translation is still blended linearly
                let origin = t.transform_point(&Point3f::new(0.0, 0.0, 0.0));
                assert_relative_eq!(origin.x, 4.0 * time, epsilon = 1e-9);
                assert_relative_eq!(origin.y, 2.0, epsilon = 1e-9);
            }
        }
        // a quarter of the way through a half turn is a 45 degree turn
        let t = channel
            .sample(0.25, Interpolation::Linear, RotationParameters::Quaternion)
            .unwrap();
        let v = t.transform_vector(&Vector3f::new(1.0, 0.0, 0.0));
        let expected = Transform::rotate_y(45.0).transform_vector(&Vector3f::new(1.0, 0.0, 0.0));
        assert_relative_eq!(v.x, expected.x, epsilon = 1e-9);
        assert_relative_eq!(v.z, expected.z, epsilon = 1e-9);
    }

    #[test]
    fn half_turn_matrix_blend_collapses() {
        let channel = half_turn_channel();
        // a quarter turn in, the plain blend is no longer rigid
        let t = channel
            .sample(0.25, Interpolation::Linear, RotationParameters::Trivial)
            .unwrap();
        let v = t.transform_vector(&Vector3f::new(1.0, 0.0, 0.0));
        assert_relative_eq!(v.x, 0.5, epsilon = 1e-9);
        // halfway the x and z axes collapse, so the nearest keyframe is used
        let t = channel
            .sample(0.5, Interpolation::Linear, RotationParameters::Trivial)
            .unwrap();
        assert_eq!(t, channel.keyframes()[1].transform);
    }
}
