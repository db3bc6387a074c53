//! In general, transformations make it possible to work in the most
//! convenient coordinate space. Every affine wrapper in a scene
//! stores one **Transform** and applies it lazily to rays and
//! results.
//!
//! ## 4 x 4 Matrices
//!
//! The **Matrix4x4** structure provides a low-level representation of
//! 4 x 4 matrices in row-major order. It is an integral part of the
//! **Transform** struct.
//!
//! ## Transformations
//!
//! A **Transform** keeps a matrix together with its inverse, so
//! mapping a ray into a shape's local frame never has to invert a
//! matrix. When a new **Transform** is created with `default()`, it
//! is the *identity transformation*.
//!
//! ### Translations, Scaling and Rotations
//!
//! Translations only affect points, leaving vectors unchanged.
//! Scaling may be **uniform** or **nonuniform**. Rotations are given
//! in degrees around an arbitrary axis.
//!
//! ### Composition
//!
//! Transforms compose with `*`. The product `a * b` applies `b`
//! first, which is how bracketed transform blocks in scene files read
//! from left to right.
//!
//! ```rust
//! use rs_ray::core::geometry::{Point3f, Vector3f};
//! use rs_ray::core::transform::Transform;
//!
//! let t = Transform::translate(&Vector3f::new(1.0, 0.0, 0.0)) * Transform::scale(2.0, 2.0, 2.0).unwrap();
//! let p = t.transform_point(&Point3f::new(1.0, 1.0, 1.0));
//! assert_eq!(p, Point3f::new(3.0, 2.0, 2.0));
//! ```

// std
use std::ops::Mul;
// others
use log::warn;
// rs_ray
use crate::core::common::Float;
use crate::core::common::{lerp, radians};
use crate::core::geometry::bnd3_union_pnt3f;
use crate::core::geometry::{Bounds3f, Normal3f, Point3f, Ray, Vector3f};

#[derive(Debug, Copy, Clone)]
pub struct Matrix4x4 {
    pub m: [[Float; 4]; 4],
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Matrix4x4 {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
}

impl Matrix4x4 {
    pub fn from_rows(m: [[Float; 4]; 4]) -> Self {
        Matrix4x4 { m }
    }
    pub fn transpose(m: &Matrix4x4) -> Matrix4x4 {
        let mut r: Matrix4x4 = Matrix4x4::default();
        for i in 0..4 {
            for j in 0..4 {
                r.m[i][j] = m.m[j][i];
            }
        }
        r
    }
    /// Gauss-Jordan elimination with full pivoting. Returns `None` for
    /// a singular matrix.
    pub fn inverse(m: &Matrix4x4) -> Option<Matrix4x4> {
        let mut indxc: [usize; 4] = [0; 4];
        let mut indxr: [usize; 4] = [0; 4];
        let mut ipiv: [usize; 4] = [0; 4];
        let mut minv: Matrix4x4 = *m;
        for i in 0..4 {
            let mut irow: usize = 0;
            let mut icol: usize = 0;
            let mut big: Float = 0.0;
            // choose pivot
            for j in 0..4 {
                if ipiv[j] != 1 {
                    for (k, item) in ipiv.iter().enumerate() {
                        if *item == 0 {
                            let abs: Float = minv.m[j][k].abs();
                            if abs >= big {
                                big = abs;
                                irow = j;
                                icol = k;
                            }
                        } else if *item > 1 {
                            return None;
                        }
                    }
                }
            }
            ipiv[icol] += 1;
            // swap rows _irow_ and _icol_ for pivot
            if irow != icol {
                minv.m.swap(irow, icol);
            }
            indxr[i] = irow;
            indxc[i] = icol;
            if minv.m[icol][icol] == 0.0 {
                return None;
            }
            // set $m[icol][icol]$ to one by scaling row _icol_ appropriately
            let pivinv: Float = 1.0 / minv.m[icol][icol];
            minv.m[icol][icol] = 1.0;
            for j in 0..4 {
                minv.m[icol][j] *= pivinv;
            }
            // subtract this row from others to zero out their columns
            for j in 0..4 {
                if j != icol {
                    let save: Float = minv.m[j][icol];
                    minv.m[j][icol] = 0.0;
                    for k in 0..4 {
                        minv.m[j][k] -= minv.m[icol][k] * save;
                    }
                }
            }
        }
        // swap columns to reflect permutation
        for j in (0..4).rev() {
            if indxr[j] != indxc[j] {
                for k in 0..4 {
                    minv.m[k].swap(indxr[j], indxc[j])
                }
            }
        }
        if minv.m.iter().flatten().any(|v| !v.is_finite()) {
            return None;
        }
        Some(minv)
    }
}

impl PartialEq for Matrix4x4 {
    fn eq(&self, rhs: &Matrix4x4) -> bool {
        self.m == rhs.m
    }
}

/// The product of two matrices.
pub fn mtx_mul(m1: &Matrix4x4, m2: &Matrix4x4) -> Matrix4x4 {
    let mut r: Matrix4x4 = Matrix4x4::default();
    for i in 0..4 {
        for j in 0..4 {
            r.m[i][j] = m1.m[i][0] * m2.m[0][j]
                + m1.m[i][1] * m2.m[1][j]
                + m1.m[i][2] * m2.m[2][j]
                + m1.m[i][3] * m2.m[3][j];
        }
    }
    r
}

/// Element-wise interpolation between two matrices.
pub fn mtx_lerp(t: Float, m1: &Matrix4x4, m2: &Matrix4x4) -> Matrix4x4 {
    let mut r: Matrix4x4 = Matrix4x4::default();
    for i in 0..4 {
        for j in 0..4 {
            r.m[i][j] = lerp(t, m1.m[i][j], m2.m[i][j]);
        }
    }
    r
}

/// Upper 3x3 block of `m`, without translation.
pub fn mtx_linear_part(m: &Matrix4x4) -> Matrix4x4 {
    let mut r: Matrix4x4 = *m;
    for i in 0..3 {
        r.m[i][3] = 0.0;
        r.m[3][i] = 0.0;
    }
    r.m[3][3] = 1.0;
    r
}

/// Determinant of the upper 3x3 block.
pub fn mtx_determinant3(m: &Matrix4x4) -> Float {
    let m = &m.m;
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// The rotation closest to the upper 3x3 block of `m`, found by
/// polar decomposition. A reflection is folded into the remaining
/// scale, so the result always has determinant one. `None` if the
/// block is singular.
pub fn mtx_closest_rotation(m: &Matrix4x4) -> Option<Matrix4x4> {
    let mut r: Matrix4x4 = mtx_linear_part(m);
    if mtx_determinant3(&r) < 0.0 {
        for row in r.m.iter_mut().take(3) {
            for value in row.iter_mut().take(3) {
                *value = -*value;
            }
        }
    }
    for _ in 0..POLAR_ITERATIONS {
        // average with the inverse transpose until it stops changing
        let rit: Matrix4x4 = Matrix4x4::inverse(&Matrix4x4::transpose(&r))?;
        let mut rnext: Matrix4x4 = Matrix4x4::default();
        let mut norm: Float = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                rnext.m[i][j] = 0.5 * (r.m[i][j] + rit.m[i][j]);
            }
            let n: Float = (r.m[i][0] - rnext.m[i][0]).abs()
                + (r.m[i][1] - rnext.m[i][1]).abs()
                + (r.m[i][2] - rnext.m[i][2]).abs();
            norm = norm.max(n);
        }
        r = rnext;
        if norm <= POLAR_TOLERANCE {
            break;
        }
    }
    Some(r)
}

const POLAR_ITERATIONS: usize = 100;
const POLAR_TOLERANCE: Float = 1.0e-13;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Transform {
    pub m: Matrix4x4,
    pub m_inv: Matrix4x4,
}

impl Transform {
    /// Builds a transform from an arbitrary matrix, `None` if the
    /// matrix cannot be inverted.
    pub fn from_matrix(m: Matrix4x4) -> Option<Transform> {
        match Matrix4x4::inverse(&m) {
            Some(m_inv) => Some(Transform { m, m_inv }),
            None => {
                warn!("Singular matrix {:?} has no inverse", m.m);
                None
            }
        }
    }
    /// Split `m` into a translation, a rotation and the remaining
    /// scale and shear, so that `m = T * R * S`.
    pub fn decompose(m: &Matrix4x4) -> Option<(Vector3f, Matrix4x4, Matrix4x4)> {
        let t: Vector3f = Vector3f::new(m.m[0][3], m.m[1][3], m.m[2][3]);
        let linear: Matrix4x4 = mtx_linear_part(m);
        let r: Matrix4x4 = mtx_closest_rotation(&linear)?;
        // _r_ is orthonormal, its transpose is its inverse
        let s: Matrix4x4 = mtx_mul(&Matrix4x4::transpose(&r), &linear);
        Some((t, r, s))
    }
    pub fn inverse(t: &Transform) -> Transform {
        Transform {
            m: t.m_inv,
            m_inv: t.m,
        }
    }
    pub fn translate(delta: &Vector3f) -> Transform {
        let mut m: Matrix4x4 = Matrix4x4::default();
        let mut m_inv: Matrix4x4 = Matrix4x4::default();
        m.m[0][3] = delta.x;
        m.m[1][3] = delta.y;
        m.m[2][3] = delta.z;
        m_inv.m[0][3] = -delta.x;
        m_inv.m[1][3] = -delta.y;
        m_inv.m[2][3] = -delta.z;
        Transform { m, m_inv }
    }
    /// Zero scale factors have no inverse, so `None` is returned for
    /// them.
    pub fn scale(x: Float, y: Float, z: Float) -> Option<Transform> {
        if x == 0.0 || y == 0.0 || z == 0.0 {
            return None;
        }
        let m: Matrix4x4 = Matrix4x4::from_rows([
            [x, 0.0, 0.0, 0.0],
            [0.0, y, 0.0, 0.0],
            [0.0, 0.0, z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let m_inv: Matrix4x4 = Matrix4x4::from_rows([
            [1.0 / x, 0.0, 0.0, 0.0],
            [0.0, 1.0 / y, 0.0, 0.0],
            [0.0, 0.0, 1.0 / z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        Some(Transform { m, m_inv })
    }
    pub fn rotate_y(theta: Float) -> Transform {
        let sin_theta: Float = radians(theta).sin();
        let cos_theta: Float = radians(theta).cos();
        let m = Matrix4x4::from_rows([
            [cos_theta, 0.0, sin_theta, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-sin_theta, 0.0, cos_theta, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        Transform {
            m,
            m_inv: Matrix4x4::transpose(&m),
        }
    }
    /// Rotation by `theta` degrees around an arbitrary axis, `None` for
    /// a zero-length axis.
    pub fn rotate(theta: Float, axis: &Vector3f) -> Option<Transform> {
        if axis.length_squared() == 0.0 {
            return None;
        }
        let a: Vector3f = axis.normalize();
        let sin_theta: Float = radians(theta).sin();
        let cos_theta: Float = radians(theta).cos();
        let mut m = Matrix4x4::default();
        // compute rotation of first basis vector
        m.m[0][0] = a.x * a.x + (1.0 - a.x * a.x) * cos_theta;
        m.m[0][1] = a.x * a.y * (1.0 - cos_theta) - a.z * sin_theta;
        m.m[0][2] = a.x * a.z * (1.0 - cos_theta) + a.y * sin_theta;
        // compute rotations of second basis vectors
        m.m[1][0] = a.x * a.y * (1.0 - cos_theta) + a.z * sin_theta;
        m.m[1][1] = a.y * a.y + (1.0 - a.y * a.y) * cos_theta;
        m.m[1][2] = a.y * a.z * (1.0 - cos_theta) - a.x * sin_theta;
        // compute rotations of third basis vectors
        m.m[2][0] = a.x * a.z * (1.0 - cos_theta) - a.y * sin_theta;
        m.m[2][1] = a.y * a.z * (1.0 - cos_theta) + a.x * sin_theta;
        m.m[2][2] = a.z * a.z + (1.0 - a.z * a.z) * cos_theta;
        Some(Transform {
            m,
            m_inv: Matrix4x4::transpose(&m),
        })
    }
    pub fn transform_point(&self, p: &Point3f) -> Point3f {
        let x: Float = p.x;
        let y: Float = p.y;
        let z: Float = p.z;
        let xp: Float =
            self.m.m[0][0] * x + self.m.m[0][1] * y + self.m.m[0][2] * z + self.m.m[0][3];
        let yp: Float =
            self.m.m[1][0] * x + self.m.m[1][1] * y + self.m.m[1][2] * z + self.m.m[1][3];
        let zp: Float =
            self.m.m[2][0] * x + self.m.m[2][1] * y + self.m.m[2][2] * z + self.m.m[2][3];
        let wp: Float =
            self.m.m[3][0] * x + self.m.m[3][1] * y + self.m.m[3][2] * z + self.m.m[3][3];
        if wp == 1.0 as Float || wp == 0.0 as Float {
            Point3f {
                x: xp,
                y: yp,
                z: zp,
            }
        } else {
            let inv: Float = 1.0 as Float / wp;
            Point3f {
                x: inv * xp,
                y: inv * yp,
                z: inv * zp,
            }
        }
    }
    pub fn transform_vector(&self, v: &Vector3f) -> Vector3f {
        let x: Float = v.x;
        let y: Float = v.y;
        let z: Float = v.z;
        Vector3f {
            x: self.m.m[0][0] * x + self.m.m[0][1] * y + self.m.m[0][2] * z,
            y: self.m.m[1][0] * x + self.m.m[1][1] * y + self.m.m[1][2] * z,
            z: self.m.m[2][0] * x + self.m.m[2][1] * y + self.m.m[2][2] * z,
        }
    }
    /// Normals are multiplied by the inverse transpose, read here
    /// directly from the stored inverse.
    pub fn transform_normal(&self, n: &Normal3f) -> Normal3f {
        let x: Float = n.x;
        let y: Float = n.y;
        let z: Float = n.z;
        Normal3f {
            x: self.m_inv.m[0][0] * x + self.m_inv.m[1][0] * y + self.m_inv.m[2][0] * z,
            y: self.m_inv.m[0][1] * x + self.m_inv.m[1][1] * y + self.m_inv.m[2][1] * z,
            z: self.m_inv.m[0][2] * x + self.m_inv.m[1][2] * y + self.m_inv.m[2][2] * z,
        }
    }
    /// The direction is not renormalized, so a parameter `t` names the
    /// same point before and after the mapping.
    pub fn transform_ray(&self, r: &Ray) -> Ray {
        Ray {
            o: self.transform_point(&r.o),
            d: self.transform_vector(&r.d),
            t_max: r.t_max,
        }
    }
    pub fn transform_bounds(&self, b: &Bounds3f) -> Bounds3f {
        if b.is_empty() {
            return *b;
        }
        let p: Point3f = self.transform_point(&b.corner(0));
        let mut ret: Bounds3f = Bounds3f { p_min: p, p_max: p };
        for corner in 1..8_u8 {
            ret = bnd3_union_pnt3f(&ret, &self.transform_point(&b.corner(corner)));
        }
        ret
    }
}

impl Mul for Transform {
    type Output = Transform;
    fn mul(self, rhs: Transform) -> Transform {
        Transform {
            m: mtx_mul(&self.m, &rhs.m),
            m_inv: mtx_mul(&rhs.m_inv, &self.m_inv),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_matrix_eq(a: &Matrix4x4, b: &Matrix4x4) {
        for i in 0..4 {
            for j in 0..4 {
                assert_relative_eq!(a.m[i][j], b.m[i][j], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn inverse_of_general_matrix() {
        let m = Matrix4x4::from_rows([
            [2.0, 0.0, 1.0, 3.0],
            [0.0, 1.0, 0.0, -1.0],
            [1.0, 0.0, 3.0, 0.5],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let m_inv = Matrix4x4::inverse(&m).unwrap();
        assert_matrix_eq(&mtx_mul(&m, &m_inv), &Matrix4x4::default());
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let m = Matrix4x4::from_rows([
            [1.0, 2.0, 3.0, 0.0],
            [2.0, 4.0, 6.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert!(Matrix4x4::inverse(&m).is_none());
        assert!(Transform::from_matrix(m).is_none());
        assert!(Transform::scale(1.0, 0.0, 1.0).is_none());
    }

    #[test]
    fn composition_applies_right_operand_first() {
        let t = Transform::translate(&Vector3f::new(0.0, 0.0, 5.0))
            * Transform::rotate(90.0, &Vector3f::new(0.0, 1.0, 0.0)).unwrap();
        let p = t.transform_point(&Point3f::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 4.0, epsilon = 1e-12);
        let back = Transform::inverse(&t).transform_point(&p);
        assert_relative_eq!(back.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(back.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn normals_use_inverse_transpose() {
        // a plane tilted 45 degrees keeps a perpendicular normal under
        // nonuniform scale
        let t = Transform::scale(2.0, 1.0, 1.0).unwrap();
        let tangent = t.transform_vector(&Vector3f::new(1.0, -1.0, 0.0));
        let n = t.transform_normal(&Normal3f::new(1.0, 1.0, 0.0));
        assert_relative_eq!(tangent.x * n.x + tangent.y * n.y + tangent.z * n.z, 0.0);
    }

    #[test]
    fn ray_parameter_is_preserved() {
        let t = Transform::scale(3.0, 3.0, 3.0).unwrap();
        let r = Ray::new(Point3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, 1.0, 0.0));
        let local = t.transform_ray(&r);
        let p = t.transform_point(&r.position(2.0));
        assert_eq!(local.position(2.0), p);
    }

    #[test]
    fn closest_rotation_of_a_sheared_rotation() {
        let rotation = Transform::rotate(40.0, &Vector3f::new(1.0, 2.0, 0.5)).unwrap();
        let mut sheared = rotation.m;
        for i in 0..3 {
            for j in 0..3 {
                sheared.m[i][j] += if i == j { 0.0 } else { 0.02 };
            }
        }
        let r = mtx_closest_rotation(&sheared).unwrap();
        assert_relative_eq!(mtx_determinant3(&r), 1.0, epsilon = 1e-9);
        let rrt = mtx_mul(&r, &Matrix4x4::transpose(&r));
        assert_matrix_eq(&rrt, &Matrix4x4::default());
        // an exact rotation is its own closest rotation
        assert_matrix_eq(&mtx_closest_rotation(&rotation.m).unwrap(), &rotation.m);
    }

    #[test]
    fn decompose_recovers_the_factors() {
        let t = Transform::translate(&Vector3f::new(1.0, -2.0, 3.0))
            * Transform::rotate(75.0, &Vector3f::new(0.0, 0.0, 1.0)).unwrap()
            * Transform::scale(2.0, 3.0, -0.5).unwrap();
        let (translation, r, s) = Transform::decompose(&t.m).unwrap();
        assert_eq!(translation, Vector3f::new(1.0, -2.0, 3.0));
        assert_relative_eq!(mtx_determinant3(&r), 1.0, epsilon = 1e-9);
        let rebuilt = mtx_mul(&Transform::translate(&translation).m, &mtx_mul(&r, &s));
        assert_matrix_eq(&rebuilt, &t.m);
        assert!(Transform::decompose(&Matrix4x4::from_rows([[0.0; 4]; 4])).is_none());
    }

    #[test]
    fn transformed_bounds_contain_rotated_box() {
        let b = Bounds3f::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0));
        let t = Transform::rotate_y(45.0);
        let tb = t.transform_bounds(&b);
        assert_relative_eq!(tb.p_max.x, 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(tb.p_max.y, 1.0, epsilon = 1e-12);
    }
}
