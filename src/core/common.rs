//! Type definition of Float, otherwise constants and functions which
//! can be used almost everywhere else in the code.

// std
use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

pub type Float = f64;

pub const MACHINE_EPSILON: Float = std::f64::EPSILON * 0.5;
/// Hits closer than this along a ray are ignored to avoid
/// self-intersection of secondary rays.
pub const HIT_EPSILON: Float = 1.0e-9;

/// Error propagation.
pub fn gamma(n: i32) -> Float {
    (n as Float * MACHINE_EPSILON) / (1.0 - n as Float * MACHINE_EPSILON)
}

/// Clamp the given value *val* to lie between the values *low* and *high*.
pub fn clamp_t<T>(val: T, low: T, high: T) -> T
where
    T: PartialOrd,
{
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

/// Convert from angles expressed in degrees to radians.
pub fn radians(deg: Float) -> Float {
    (PI / 180.0) * deg
}

/// Convert from angles expressed in radians to degrees.
pub fn degrees(rad: Float) -> Float {
    (180.0 / PI) * rad
}

/// Interpolate linearly between two provided values.
pub fn lerp<T>(t: Float, a: T, b: T) -> T
where
    T: Add<T, Output = T> + Sub<T, Output = T> + Mul<Float, Output = T> + Copy,
{
    a * (1.0 - t) + b * t
}

/// Find solution(s) of the quadratic equation at<sup>2</sup> + bt + c = 0.
///
/// Returns the roots in ascending order or `None` if there is no real
/// solution.
pub fn quadratic(a: Float, b: Float, c: Float) -> Option<(Float, Float)> {
    if a == 0.0 {
        // degenerates to a linear equation
        if b == 0.0 {
            return None;
        }
        let t: Float = -c / b;
        return Some((t, t));
    }
    // find quadratic discriminant
    let discrim: Float = b * b - 4.0 * a * c;
    if discrim < 0.0 {
        None
    } else {
        let root_discrim: Float = discrim.sqrt();
        // compute quadratic _t_ values
        let q: Float = if b < 0.0 {
            -0.5 * (b - root_discrim)
        } else {
            -0.5 * (b + root_discrim)
        };
        if q == 0.0 {
            // b == 0 and c == 0
            return Some((0.0, 0.0));
        }
        let mut t0: Float = q / a;
        let mut t1: Float = c / q;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        Some((t0, t1))
    }
}

/// Real roots of the monic cubic x<sup>3</sup> + bx<sup>2</sup> + cx + d = 0,
/// in no particular order.
pub fn cubic(b: Float, c: Float, d: Float) -> Vec<Float> {
    // depressed cubic t^3 + pt + q = 0 with x = t - b/3
    let shift: Float = b / 3.0;
    let p: Float = c - b * b / 3.0;
    let q: Float = 2.0 * b * b * b / 27.0 - b * c / 3.0 + d;
    let delta: Float = q * q / 4.0 + p * p * p / 27.0;
    if delta > 0.0 {
        // one real root (Cardano)
        let root_delta: Float = delta.sqrt();
        vec![(-q / 2.0 + root_delta).cbrt() + (-q / 2.0 - root_delta).cbrt() - shift]
    } else if p == 0.0 {
        vec![-shift]
    } else {
        // three real roots (trigonometric form)
        let m: Float = 2.0 * (-p / 3.0).sqrt();
        let theta: Float = clamp_t(3.0 * q / (p * m), -1.0, 1.0).acos() / 3.0;
        (0..3)
            .map(|k| m * (theta - 2.0 * PI * k as Float / 3.0).cos() - shift)
            .collect()
    }
}

/// Slightly negative discriminants of unit-scale quadratics are
/// treated as double roots.
const DISCRIMINANT_TOLERANCE: Float = 1.0e-12;

/// Find the real solutions of ax<sup>4</sup> + bx<sup>3</sup> + cx<sup>2</sup> + dx + e = 0
/// with Ferrari's method, in no particular order.
///
/// Works best with coefficients of order one. Roots close to a double
/// root are only accurate to the square root of the working precision
/// and should be polished by the caller.
pub fn quartic(a: Float, b: Float, c: Float, d: Float, e: Float) -> Vec<Float> {
    if a == 0.0 {
        if b == 0.0 {
            return quadratic(c, d, e)
                .map(|(t0, t1)| vec![t0, t1])
                .unwrap_or_default();
        }
        return cubic(c / b, d / b, e / b);
    }
    let (b, c, d, e) = (b / a, c / a, d / a, e / a);
    // depressed quartic y^4 + py^2 + qy + r = 0 with x = y - b/4
    let shift: Float = b / 4.0;
    let b2: Float = b * b;
    let p: Float = c - 3.0 * b2 / 8.0;
    let q: Float = d - b * c / 2.0 + b2 * b / 8.0;
    let r: Float = e - b * d / 4.0 + b2 * c / 16.0 - 3.0 * b2 * b2 / 256.0;
    // largest root of the resolvent cubic 8u^3 + 8pu^2 + (2p^2 - 8r)u - q^2 = 0
    let u: Float = cubic(p, p * p / 4.0 - r, -q * q / 8.0)
        .into_iter()
        .fold(0.0 as Float, Float::max);
    let mut roots: Vec<Float> = Vec::with_capacity(4);
    if u > 1.0e-14 {
        // (y^2 + p/2 + u)^2 = (my - q/2m)^2 splits into two quadratics
        let m: Float = (2.0 * u).sqrt();
        for (b1, c1) in [
            (-m, p / 2.0 + u + q / (2.0 * m)),
            (m, p / 2.0 + u - q / (2.0 * m)),
        ] {
            let discrim: Float = b1 * b1 - 4.0 * c1;
            if discrim > -DISCRIMINANT_TOLERANCE {
                let root_discrim: Float = discrim.max(0.0).sqrt();
                roots.push((-b1 + root_discrim) / 2.0 - shift);
                roots.push((-b1 - root_discrim) / 2.0 - shift);
            }
        }
    } else {
        // q vanishes, biquadratic in y
        let discrim: Float = p * p - 4.0 * r;
        if discrim > -DISCRIMINANT_TOLERANCE {
            let root_discrim: Float = discrim.max(0.0).sqrt();
            for y2 in [(-p + root_discrim) / 2.0, (-p - root_discrim) / 2.0] {
                if y2 > -DISCRIMINANT_TOLERANCE {
                    let y: Float = y2.max(0.0).sqrt();
                    roots.push(y - shift);
                    roots.push(-y - shift);
                }
            }
        }
    }
    roots
}

/// Evaluate a polynomial given by its coefficients (highest degree
/// first) with Horner's scheme.
pub fn horner(coefficients: &[Float], t: Float) -> Float {
    coefficients.iter().fold(0.0 as Float, |acc, c| acc * t + c)
}
