//! Unit quaternions represent rotations for keyframe interpolation.
//! Spherical linear interpolation between two of them rotates at
//! constant speed around a fixed axis and never leaves the set of
//! rotations, unlike a blend of the matrix entries.

// std
use std::ops;
// rs_ray
use crate::core::common::clamp_t;
use crate::core::common::Float;
use crate::core::geometry::{vec3_dot_vec3f, Vector3f};
use crate::core::transform::Matrix4x4;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quaternion {
    pub v: Vector3f,
    pub w: Float,
}

impl Default for Quaternion {
    fn default() -> Self {
        Quaternion {
            v: Vector3f::default(),
            w: 1.0,
        }
    }
}

impl Quaternion {
    /// Rotation part of `m`, which has to be a rotation matrix in its
    /// upper 3x3 block.
    pub fn from_matrix(m: &Matrix4x4) -> Self {
        let m = &m.m;
        let trace: Float = m[0][0] + m[1][1] + m[2][2];
        if trace > 0.0 {
            // compute w from matrix trace, then xyz
            let mut s: Float = (trace + 1.0).sqrt();
            let w: Float = s / 2.0;
            s = 0.5 / s;
            Quaternion {
                v: Vector3f {
                    x: (m[2][1] - m[1][2]) * s,
                    y: (m[0][2] - m[2][0]) * s,
                    z: (m[1][0] - m[0][1]) * s,
                },
                w,
            }
        } else {
            // compute largest of x, y, or z, then remaining components
            let nxt: [usize; 3] = [1, 2, 0];
            let mut q: [Float; 3] = [0.0; 3];
            let mut i: usize = 0;
            if m[1][1] > m[0][0] {
                i = 1;
            }
            if m[2][2] > m[i][i] {
                i = 2;
            }
            let j: usize = nxt[i];
            let k: usize = nxt[j];
            let mut s: Float = ((m[i][i] - (m[j][j] + m[k][k])) + 1.0).sqrt();
            q[i] = s * 0.5;
            if s != 0.0 {
                s = 0.5 / s;
            }
            let w: Float = (m[k][j] - m[j][k]) * s;
            q[j] = (m[j][i] + m[i][j]) * s;
            q[k] = (m[k][i] + m[i][k]) * s;
            Quaternion {
                v: Vector3f {
                    x: q[0],
                    y: q[1],
                    z: q[2],
                },
                w,
            }
        }
    }
    /// The rotation matrix of a unit quaternion.
    pub fn to_matrix(&self) -> Matrix4x4 {
        let xx: Float = self.v.x * self.v.x;
        let yy: Float = self.v.y * self.v.y;
        let zz: Float = self.v.z * self.v.z;
        let xy: Float = self.v.x * self.v.y;
        let xz: Float = self.v.x * self.v.z;
        let yz: Float = self.v.y * self.v.z;
        let wx: Float = self.v.x * self.w;
        let wy: Float = self.v.y * self.w;
        let wz: Float = self.v.z * self.w;
        Matrix4x4::from_rows([
            [1.0 - 2.0 * (yy + zz), 2.0 * (xy - wz), 2.0 * (xz + wy), 0.0],
            [2.0 * (xy + wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - wx), 0.0],
            [2.0 * (xz - wy), 2.0 * (yz + wx), 1.0 - 2.0 * (xx + yy), 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
}

impl_op_ex!(+|a: &Quaternion, b: &Quaternion| -> Quaternion {
    Quaternion {
        v: a.v + b.v,
        w: a.w + b.w,
    }
});

impl_op_ex!(-|a: &Quaternion, b: &Quaternion| -> Quaternion {
    Quaternion {
        v: a.v - b.v,
        w: a.w - b.w,
    }
});

impl_op_ex!(*|a: &Quaternion, b: Float| -> Quaternion {
    Quaternion {
        v: a.v * b,
        w: a.w * b,
    }
});

impl_op_ex!(/|a: &Quaternion, b: Float| -> Quaternion {
    Quaternion {
        v: a.v / b,
        w: a.w / b,
    }
});

impl_op!(-|a: Quaternion| -> Quaternion {
    Quaternion { v: -a.v, w: -a.w }
});

/// The inner product of two quaternions.
pub fn quat_dot_quat(q1: &Quaternion, q2: &Quaternion) -> Float {
    vec3_dot_vec3f(&q1.v, &q2.v) + q1.w * q2.w
}

/// A quaternion can be normalized by dividing by its length.
pub fn quat_normalize(q: &Quaternion) -> Quaternion {
    q / quat_dot_quat(q, q).sqrt()
}

/// Spherical linear interpolation along the shorter arc.
pub fn quat_slerp(t: Float, q1: &Quaternion, q2: &Quaternion) -> Quaternion {
    let mut cos_theta: Float = quat_dot_quat(q1, q2);
    // q and -q are the same rotation
    let q2: Quaternion = if cos_theta < 0.0 {
        cos_theta = -cos_theta;
        -*q2
    } else {
        *q2
    };
    if cos_theta > 0.9995 {
        quat_normalize(&(q1 * (1.0 - t) + q2 * t))
    } else {
        let theta: Float = clamp_t(cos_theta, -1.0, 1.0).acos();
        let thetap: Float = theta * t;
        let qperp: Quaternion = quat_normalize(&(q2 - q1 * cos_theta));
        q1 * thetap.cos() + qperp * thetap.sin()
    }
}
