mod sphere;
mod union;

use crate::math::{Ray, Vector3};

pub use sphere::*;
pub use union::*;

/// The result of a ray intersection.
#[derive(Clone, Debug)]
pub struct Hit<'a> {
    /// The sphere that was struck.
    pub object: &'a Sphere,

    /// Distance along the ray, always positive.
    pub t: f64,

    /// World-space position of the hit.
    pub point: Vector3,

    /// Unit surface normal at the hit, facing out of the sphere.
    pub normal: Vector3,
}

/// A trait that represents any type that can be intersected by a Ray.
pub trait Intersect {
    /// Find the nearest intersection between the ray provided and this shape,
    /// ignoring the sphere `skip` if one is given.
    fn intersect_except(&self, ray: &Ray, skip: Option<&Sphere>) -> Option<Hit<'_>>;

    /// Find the intersection, if any, between the ray provided and this shape.
    fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        self.intersect_except(ray, None)
    }
}

/// Anything that can be placed in a scene.
#[derive(Clone, Debug)]
pub enum SceneObject {
    Sphere(Sphere),
    Union(Union),
}

impl SceneObject {
    /// Produce a copy of this object moved by the given offset.
    pub fn translate(&self, dx: f64, dy: f64, dz: f64) -> SceneObject {
        match self {
            Self::Sphere(sphere) => Self::Sphere(sphere.translate(dx, dy, dz)),
            Self::Union(union) => Self::Union(union.translate(dx, dy, dz)),
        }
    }

    /// Every sphere in this object, depth first, in construction order.
    pub fn spheres(&self) -> Vec<&Sphere> {
        let mut v = vec![];
        let mut to_visit = vec![self];

        while let Some(object) = to_visit.pop() {
            match object {
                Self::Sphere(sphere) => v.push(sphere),
                Self::Union(union) => to_visit.extend(union.children().iter().rev()),
            }
        }

        v
    }
}

impl Intersect for SceneObject {
    fn intersect_except(&self, ray: &Ray, skip: Option<&Sphere>) -> Option<Hit<'_>> {
        match self {
            Self::Sphere(sphere) => sphere.intersect_except(ray, skip),
            Self::Union(union) => union.intersect_except(ray, skip),
        }
    }
}

impl From<Sphere> for SceneObject {
    fn from(sphere: Sphere) -> Self {
        Self::Sphere(sphere)
    }
}

impl From<Union> for SceneObject {
    fn from(union: Union) -> Self {
        Self::Union(union)
    }
}

/// Find the nearest hit among a list of objects. Ties go to the earlier object.
pub fn closest_hit<'a>(
    objects: &'a [SceneObject],
    ray: &Ray,
    skip: Option<&Sphere>,
) -> Option<Hit<'a>> {
    let mut nearest: Option<Hit<'a>> = None;

    for object in objects {
        if let Some(hit) = object.intersect_except(ray, skip) {
            if nearest.as_ref().map_or(true, |n| hit.t < n.t) {
                nearest = Some(hit);
            }
        }
    }

    nearest
}
