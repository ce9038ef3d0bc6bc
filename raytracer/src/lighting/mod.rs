mod point;

use crate::{
    math::{Ray, Vector3},
    object::Hit,
    scene::Scene,
};

pub use point::*;

/// The result of a light's influence on a ray intersection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LightShading {
    /// Cosine between the surface normal and the light, clamped at zero.
    pub diffuse: f64,

    /// Cosine between the surface normal and the halfway vector, clamped at
    /// zero, before the material's specular exponent is applied.
    pub specular: f64,
}

impl LightShading {
    pub fn new(diffuse: f64, specular: f64) -> Self {
        Self { diffuse, specular }
    }
}

/// This trait represents any object that is a light.
/// It provides details about the light, as well as the result
/// of shading due to the light at a certain point.
pub trait Light: Send + Sync {
    fn color(&self) -> Vector3;

    /// Shading factors at a hit point, or `None` if the light does not reach it.
    fn shading(&self, ray: &Ray, hit: &Hit, scene: &Scene) -> Option<LightShading>;
}
