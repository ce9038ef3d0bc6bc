use crate::math::{Lerp, Ray, Vector3};

/// Any type that can be used as a skybox for a scene.
pub trait Skybox: Send + Sync {
    /// The color a ray should produce for the skybox.
    fn ray_color(&self, ray: &Ray) -> Vector3;
}

/// A vertical gradient, `start` straight down to `end` straight up.
#[derive(Debug, Clone)]
pub struct Gradient {
    pub start: Vector3,
    pub end: Vector3,
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            start: Vector3::rgb(0., 0., 0.),
            end: Vector3::rgb(0.5, 0.7, 1.),
        }
    }
}

impl Skybox for Gradient {
    fn ray_color(&self, ray: &Ray) -> Vector3 {
        let t = 0.5 * (ray.direction.y + 1.);
        self.start.lerp(self.end, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_ends() {
        let sky = Gradient::default();
        let up = Ray::new(Vector3::zero(), Vector3::up());
        let down = Ray::new(Vector3::zero(), -Vector3::up());
        let level = Ray::new(Vector3::zero(), Vector3::new(0., 0., 1.));

        assert_eq!(sky.end, sky.ray_color(&up));
        assert_eq!(sky.start, sky.ray_color(&down));
        assert_eq!(Vector3::rgb(0.25, 0.35, 0.5), sky.ray_color(&level));
    }
}
