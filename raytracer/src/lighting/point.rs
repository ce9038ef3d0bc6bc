use crate::{
    math::{Ray, Vector3},
    object::Hit,
    scene::{Scene, EPSILON},
};

use super::{Light, LightShading};

/// A point light, which is a light that emits in all directions from a specified position.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    /// The position in space of this light.
    pub position: Vector3,

    /// The linear RGB color of this light. Channels are conventionally at most 1.
    pub color: Vector3,
}

impl Point {
    pub fn new(position: Vector3, color: Vector3) -> Self {
        Self { position, color }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            color: Vector3::rgb(1., 1., 1.),
        }
    }
}

impl Light for Point {
    fn color(&self) -> Vector3 {
        self.color
    }

    fn shading(&self, ray: &Ray, hit: &Hit, scene: &Scene) -> Option<LightShading> {
        // vector pointing from hit to light pos
        let lvec = self.position - hit.point;

        // calculate distance and normalize, all at once
        let dist = lvec.magnitude();
        if dist == 0. {
            return None;
        }
        let lvec = lvec / dist;

        // apply shadowing
        let shadow_ray = Ray::new(hit.point + hit.normal * EPSILON, lvec);
        if scene.is_occluded(&shadow_ray, dist, hit.object) {
            return None;
        }

        let diffuse = hit.normal.dot(lvec).max(0.);

        // blinn-phong halfway vector between the viewer and the light
        let halfway = lvec - ray.direction;
        let specular = if halfway.is_zero() {
            0.
        } else {
            hit.normal.dot(halfway.normalize()).max(0.)
        };

        Some(LightShading::new(diffuse, specular))
    }
}
