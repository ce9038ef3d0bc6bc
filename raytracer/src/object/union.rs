use std::sync::Arc;

use crate::math::Ray;

use super::{closest_hit, Hit, Intersect, SceneObject, Sphere};

/// A group of objects rendered together. Unions never change once built, so
/// clones share their children.
#[derive(Clone, Debug)]
pub struct Union {
    children: Arc<[SceneObject]>,
}

impl Union {
    pub fn new(children: Vec<SceneObject>) -> Self {
        Self {
            children: children.into(),
        }
    }

    pub fn children(&self) -> &[SceneObject] {
        &self.children
    }

    /// A new union with every child moved by the given offset.
    pub fn translate(&self, dx: f64, dy: f64, dz: f64) -> Union {
        Union::new(
            self.children
                .iter()
                .map(|child| child.translate(dx, dy, dz))
                .collect(),
        )
    }
}

impl Intersect for Union {
    fn intersect_except(&self, ray: &Ray, skip: Option<&Sphere>) -> Option<Hit<'_>> {
        closest_hit(&self.children, ray, skip)
    }
}

#[cfg(test)]
mod tests {
    use crate::{material::Material, math::Vector3};

    use super::*;

    fn sphere_at(x: f64, z: f64) -> SceneObject {
        Sphere::new(Vector3::new(x, 0., z), 1., Material::default()).into()
    }

    #[test]
    fn union_reports_nearest_child() {
        let union = Union::new(vec![sphere_at(0., 10.), sphere_at(0., 5.)]);
        let ray = Ray::new(Vector3::zero(), Vector3::new(0., 0., 1.));

        let hit = union.intersect(&ray).unwrap();
        assert!((hit.t - 4.).abs() < 1e-12);
        assert_eq!(Vector3::new(0., 0., 5.), hit.object.center);
    }

    #[test]
    fn union_skips_excluded_sphere() {
        let union = Union::new(vec![sphere_at(0., 10.), sphere_at(0., 5.)]);
        let ray = Ray::new(Vector3::zero(), Vector3::new(0., 0., 1.));

        let near = union.intersect(&ray).unwrap().object;
        let hit = union.intersect_except(&ray, Some(near)).unwrap();
        assert!((hit.t - 9.).abs() < 1e-12);
    }

    #[test]
    fn translate_moves_every_child() {
        let union = Union::new(vec![
            sphere_at(0., 10.),
            Union::new(vec![sphere_at(1., 1.)]).into(),
        ]);
        let moved: SceneObject = union.translate(1., 2., 3.).into();

        let centers: Vec<_> = moved.spheres().iter().map(|s| s.center).collect();
        assert_eq!(
            vec![Vector3::new(1., 2., 13.), Vector3::new(2., 2., 4.)],
            centers
        );

        // the original is untouched
        let original: SceneObject = union.into();
        assert_eq!(Vector3::new(0., 0., 10.), original.spheres()[0].center);
    }
}
