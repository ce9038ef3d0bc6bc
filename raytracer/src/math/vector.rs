use std::{
    fmt,
    ops::{Add, AddAssign, Div, Mul, Neg, Sub},
};

/// A vector in 3D space. Also doubles as a linear RGB color, where `x`, `y`
/// and `z` are the red, green and blue channels.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    /// Instantiate a new Vector3.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Shorthand for a linear RGB color, channels expected to be in the range 0-1.
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b)
    }

    pub const fn zero() -> Self {
        Self::new(0., 0., 0.)
    }

    pub const fn up() -> Self {
        Self::new(0., 1., 0.)
    }

    /// Find the dot product between two Vector3s.
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Find the magnitude of this Vector3.
    pub fn magnitude(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Normalize this Vector3 by dividing it by its own magnitude.
    ///
    /// A zero vector produces NaN components.
    pub fn normalize(self) -> Self {
        self / self.magnitude()
    }

    /// The cosine of the angle between two vectors. Neither needs to be normalized.
    pub fn cosine_similarity(self, other: Self) -> f64 {
        self.dot(other) / (self.magnitude() * other.magnitude())
    }

    /// Mirror this vector about a surface with the given unit normal.
    pub fn reflect(self, normal: Self) -> Self {
        self - normal * (2. * self.dot(normal))
    }

    /// Clamp every component into 0-1.
    pub fn clamp01(self) -> Self {
        Self {
            x: self.x.clamp(0., 1.),
            y: self.y.clamp(0., 1.),
            z: self.z.clamp(0., 1.),
        }
    }

    pub fn is_zero(self) -> bool {
        self.x == 0. && self.y == 0. && self.z == 0.
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4}, {:.4})", self.x, self.y, self.z)
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Mul for Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x * rhs.x,
            y: self.y * rhs.y,
            z: self.z * rhs.z,
        }
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

impl Div<f64> for Vector3 {
    type Output = Vector3;

    fn div(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x / rhs,
            y: self.y / rhs,
            z: self.z / rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_unit_length() {
        let vs = [
            Vector3::new(1., 2., 3.),
            Vector3::new(-0.001, 0., 0.0002),
            Vector3::new(1e6, -3e5, 42.),
            Vector3::new(0., 0., -7.),
        ];

        for v in vs {
            assert!((v.normalize().magnitude() - 1.).abs() < 1e-7, "{}", v);
        }
    }

    #[test]
    fn normalize_zero_is_nan() {
        assert!(!Vector3::zero().normalize().is_finite());
    }

    #[test]
    fn reflect_flips_normal_component() {
        let d = Vector3::new(1., -1., 0.);
        assert_eq!(Vector3::new(1., 1., 0.), d.reflect(Vector3::up()));
    }

    #[test]
    fn cosine_similarity_ignores_length() {
        let a = Vector3::new(0., 2., 0.);
        let b = Vector3::new(0., -5., 0.);
        assert_eq!(-1., a.cosine_similarity(b));
    }

    #[test]
    fn clamp01_clamps_each_channel() {
        let c = Vector3::rgb(-0.5, 0.25, 3.).clamp01();
        assert_eq!(Vector3::rgb(0., 0.25, 1.), c);
    }
}
