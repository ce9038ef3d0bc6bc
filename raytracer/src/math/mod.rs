mod ray;
mod vector;

pub use ray::*;
pub use vector::*;

/// Linearly interpolate between two values.
pub fn lerp(a: f64, b: f64, c: f64) -> f64 {
    a + (b - a) * c
}

/// A type that can be linearly interpolated between two values of itself.
pub trait Lerp {
    fn lerp(self, other: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(self, other: Self, t: f64) -> Self {
        lerp(self, other, t)
    }
}

impl Lerp for Vector3 {
    fn lerp(self, other: Self, t: f64) -> Self {
        Vector3::new(
            lerp(self.x, other.x, t),
            lerp(self.y, other.y, t),
            lerp(self.z, other.z, t),
        )
    }
}

/// Calculate the refraction vector based on a ray, a normal, and the two IORs.
/// Returns `None` on total internal reflection.
pub fn refraction_vec(
    in_ray: &Ray,
    normal: Vector3,
    from_ior: f64,
    to_ior: f64,
) -> Option<Vector3> {
    let n = from_ior / to_ior;
    let cos_i = -normal.dot(in_ray.direction);
    let sin_t2 = n * n * (1. - cos_i * cos_i);
    if sin_t2 > 1. {
        return None;
    }

    let cos_t = (1. - sin_t2).sqrt();
    Some(in_ray.direction * n + normal * (n * cos_i - cos_t))
}

/// Fresnel reflectance by Schlick's approximation, for a ray leaving air and
/// striking a surface of the given IOR. Neither vector needs to be normalized.
pub fn schlick(incident: Vector3, normal: Vector3, ior: f64) -> f64 {
    let cos = incident.cosine_similarity(normal).abs();
    let r0 = ((1. - ior) / (1. + ior)).powi(2);
    r0 + (1. - r0) * (1. - cos).powi(5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refraction_straight_through() {
        let ray = Ray::new(Vector3::zero(), Vector3::new(0., -1., 0.));
        let dir = refraction_vec(&ray, Vector3::up(), 1., 1.5).unwrap();
        assert!((dir - Vector3::new(0., -1., 0.)).magnitude() < 1e-12);
    }

    #[test]
    fn refraction_bends_toward_normal() {
        let ray = Ray::new(Vector3::zero(), Vector3::new(1., -1., 0.).normalize());
        let dir = refraction_vec(&ray, Vector3::up(), 1., 1.5).unwrap();
        // sin(t) = sin(45deg) / 1.5
        let expected_sin = (0.5f64).sqrt() / 1.5;
        assert!((dir.x - expected_sin).abs() < 1e-9);
        assert!((dir.magnitude() - 1.).abs() < 1e-9);
    }

    #[test]
    fn total_internal_reflection() {
        // leaving glass at a grazing angle
        let ray = Ray::new(Vector3::zero(), Vector3::new(1., 0.2, 0.).normalize());
        assert_eq!(None, refraction_vec(&ray, -Vector3::up(), 1.5, 1.));
    }

    #[test]
    fn schlick_head_on_is_r0() {
        let kr = schlick(Vector3::new(0., -1., 0.), Vector3::up(), 1.5);
        assert!((kr - 0.04).abs() < 1e-12);
    }

    #[test]
    fn schlick_grazing_is_total() {
        let kr = schlick(Vector3::new(1., 0., 0.), Vector3::up(), 1.5);
        assert!((kr - 1.).abs() < 1e-12);
    }

    #[test]
    fn lerp_vectors() {
        let a = Vector3::rgb(0., 0., 0.);
        let b = Vector3::rgb(0.5, 0.7, 1.);
        assert_eq!(Vector3::rgb(0.25, 0.35, 0.5), a.lerp(b, 0.5));
    }
}
