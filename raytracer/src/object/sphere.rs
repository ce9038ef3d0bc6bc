use std::{f64::consts::PI, sync::Arc};

use crate::{
    material::{Material, ShaderError, Surface, SurfaceShader},
    math::{Ray, Vector3},
};

use super::{Hit, Intersect};

/// A sphere.
#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Vector3,
    pub radius: f64,
    pub surface: Surface,
}

impl Sphere {
    pub fn new(center: Vector3, radius: f64, surface: impl Into<Surface>) -> Self {
        Self {
            center,
            radius,
            surface: surface.into(),
        }
    }

    /// A unit sphere at the origin whose surface is computed by a shader.
    pub fn procedural(shader: Arc<dyn SurfaceShader>) -> Self {
        Self::new(Vector3::zero(), 1., Surface::Procedural(shader))
    }

    /// A copy of this sphere moved by the given offset.
    pub fn translate(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            center: self.center + Vector3::new(dx, dy, dz),
            radius: self.radius,
            surface: self.surface.clone(),
        }
    }

    /// The spherical `(u, v)` coordinates of a point on this sphere, both in 0-1.
    /// `v` runs from the bottom pole to the top pole.
    pub fn surface_coords(&self, point: Vector3) -> (f64, f64) {
        let p = (point - self.center) / self.radius;
        let y = p.y.clamp(-1., 1.);
        let v = (y + 1.) / 2.;

        let ring = (1. - y * y).sqrt();
        let u = if ring > 0. {
            (p.z / ring).clamp(-1., 1.).acos() / (2. * PI)
        } else {
            0.
        };

        (u, v)
    }

    /// Resolve the material at a point on this sphere.
    pub fn material_at(&self, point: Vector3) -> Result<Material, ShaderError> {
        self.surface.at(0, self.surface_coords(point))
    }
}

impl Intersect for Sphere {
    fn intersect_except(&self, ray: &Ray, skip: Option<&Sphere>) -> Option<Hit<'_>> {
        if skip.map_or(false, |s| std::ptr::eq(s, self)) {
            return None;
        }

        let l = self.center - ray.origin;
        let t_ca = l.dot(ray.direction);
        if t_ca < 0.0 {
            // center is behind the ray
            return None;
        }

        let disc = self.radius.powi(2) - (l.dot(l) - t_ca * t_ca);
        if disc < 0.0 {
            return None;
        }

        // only the near root counts, rays never start inside a sphere
        let t0 = t_ca - disc.sqrt();
        if t0 <= 0.0 {
            return None;
        }

        let point = ray.along(t0);
        Some(Hit {
            object: self,
            t: t0,
            point,
            normal: (point - self.center) / self.radius,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Sphere {
        Sphere::new(Vector3::new(0., 0., 5.), 1., Material::default())
    }

    #[test]
    fn head_on_hit() {
        let ray = Ray::new(Vector3::zero(), Vector3::new(0., 0., 1.));
        let sphere = unit();
        let hit = sphere.intersect(&ray).unwrap();

        assert!((hit.t - 4.).abs() < 1e-12);
        assert_eq!(Vector3::new(0., 0., -1.), hit.normal);
    }

    #[test]
    fn behind_is_a_miss() {
        let ray = Ray::new(Vector3::zero(), Vector3::new(0., 0., -1.));
        assert!(unit().intersect(&ray).is_none());
    }

    #[test]
    fn wide_is_a_miss() {
        let ray = Ray::new(Vector3::new(1.5, 0., 0.), Vector3::new(0., 0., 1.));
        assert!(unit().intersect(&ray).is_none());
    }

    #[test]
    fn grazing_rays_never_produce_nan() {
        // sweep across the silhouette where the discriminant crosses zero
        for i in 0..=2000 {
            let x = 0.999 + i as f64 * 1e-6;
            let ray = Ray::new(Vector3::new(x, 0., 0.), Vector3::new(0., 0., 1.));
            if let Some(hit) = unit().intersect(&ray) {
                assert!(hit.t > 0.);
                assert!(hit.point.is_finite());
                assert!(hit.normal.is_finite());
            }
        }
    }

    #[test]
    fn inside_is_a_miss() {
        let ray = Ray::new(Vector3::new(0., 0., 5.), Vector3::new(0., 0., 1.));
        assert!(unit().intersect(&ray).is_none());
    }

    #[test]
    fn skipped_sphere_is_a_miss() {
        let sphere = unit();
        let ray = Ray::new(Vector3::zero(), Vector3::new(0., 0., 1.));
        assert!(sphere.intersect_except(&ray, Some(&sphere)).is_none());
    }

    #[test]
    fn surface_coords_are_local() {
        let sphere = unit().translate(10., -3., 0.);
        let (u, v) = sphere.surface_coords(sphere.center + Vector3::new(0., 0., 1.));
        assert!(u.abs() < 1e-12);
        assert!((v - 0.5).abs() < 1e-12);

        let (u, v) = sphere.surface_coords(sphere.center + Vector3::up());
        assert_eq!((0., 1.), (u, v));
    }
}
