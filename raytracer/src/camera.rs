use log::warn;

use crate::math::{Ray, Vector3};

/// The field of view used when none is given.
pub const DEFAULT_FOV: f64 = 90.;

/// A Camera object. Represents a viewable area that a scene can be rendered to.
///
/// The eye sits at `(0, 0, -1)` looking down +Z through a view plane at `z = 0`,
/// with +Y up. Rays start on the view plane.
#[derive(Clone, Debug)]
pub struct Camera {
    pub vw: u32,
    pub vh: u32,
    pub eye: Vector3,

    /// Horizontal field of view in degrees.
    pub fov: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            vw: 300,
            vh: 200,
            eye: Vector3::new(0., 0., -1.),
            fov: DEFAULT_FOV,
        }
    }
}

impl Camera {
    /// Create a camera for an image of the given size. A non-positive FOV falls
    /// back to the default.
    pub fn new(vw: u32, vh: u32, fov: f64) -> Self {
        let fov = if fov > 0. {
            fov
        } else {
            warn!("fov not specified, using default of {} degrees", DEFAULT_FOV);
            DEFAULT_FOV
        };

        Self {
            vw,
            vh,
            fov,
            ..Default::default()
        }
    }

    /// The width and height of the view plane in world units.
    pub fn viewport(&self) -> (f64, f64) {
        let width = 2. / (self.fov.to_radians() / 2.).tan();
        let height = width * (self.vh as f64 / self.vw.max(1) as f64);
        (width, height)
    }

    /// The ray through a (possibly fractional) pixel position, where top-left of the image is (0, 0).
    pub fn ray_at(&self, x: f64, y: f64) -> Ray {
        let (width, height) = self.viewport();
        let u = x / (self.vw.max(2) - 1) as f64 * width - width / 2.;
        let v = y / (self.vh.max(2) - 1) as f64 * height - height / 2.;

        let screen_point = Vector3::new(u, -v, 0.);
        Ray::new(screen_point, (screen_point - self.eye).normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_fov_defaults() {
        assert_eq!(DEFAULT_FOV, Camera::new(10, 10, 0.).fov);
        assert_eq!(DEFAULT_FOV, Camera::new(10, 10, -4.).fov);
        assert_eq!(60., Camera::new(10, 10, 60.).fov);
    }

    #[test]
    fn viewport_follows_aspect() {
        let (w, h) = Camera::new(200, 100, 90.).viewport();
        assert!((w - 2.).abs() < 1e-12);
        assert!((h - 1.).abs() < 1e-12);
    }

    #[test]
    fn center_ray_looks_forward() {
        let camera = Camera::new(101, 101, 90.);
        let ray = camera.ray_at(50., 50.);
        assert!((ray.direction - Vector3::new(0., 0., 1.)).magnitude() < 1e-12);
    }

    #[test]
    fn top_left_ray_points_up_and_left() {
        let camera = Camera::new(100, 100, 90.);
        let ray = camera.ray_at(0., 0.);
        assert!(ray.direction.x < 0.);
        assert!(ray.direction.y > 0.);
        assert!((ray.direction.magnitude() - 1.).abs() < 1e-12);
    }
}
