use crate::{
    camera::Camera,
    lighting,
    material::Material,
    math::Vector3,
    object::Sphere,
    scene::{Scene, SceneOptions},
    skybox,
};

/// A small built-in scene: a glass sphere, a fuzzy blue sphere, a green
/// mirror, and a huge sphere standing in for the ground, lit by one white light.
pub fn canned_scene(vw: u32, vh: u32) -> Scene {
    let shiny = Material {
        kd: 0.9,
        ks: 0.5,
        specular_exponent: 32.,
        ..Default::default()
    };

    let mut scene = Scene {
        camera: Camera::new(vw, vh, 90.),
        skybox: Box::new(skybox::Gradient::default()),
        options: SceneOptions {
            ambient: Vector3::rgb(0.1, 0.1, 0.1),
            ..Default::default()
        },
        ..Default::default()
    };

    // glass with a metallic sheen
    scene.objects.push(
        Sphere::new(
            Vector3::new(0., 0., 5.),
            1.,
            Material {
                color: Vector3::rgb(0.8, 0.2, 0.2),
                reflectivity: 0.9,
                transparency: 0.9,
                refractive_index: 1.5,
                ..shiny.clone()
            },
        )
        .into(),
    );

    // dull, fuzzy surface with some reflection
    scene.objects.push(
        Sphere::new(
            Vector3::new(2., 0., 8.),
            1.,
            Material {
                color: Vector3::rgb(0.2, 0.2, 0.8),
                reflectivity: 0.2,
                fuzziness: 0.5,
                ..shiny.clone()
            },
        )
        .into(),
    );

    scene.objects.push(
        Sphere::new(
            Vector3::new(-2., 0., 6.),
            1.,
            Material {
                color: Vector3::rgb(0.2, 0.8, 0.2),
                reflectivity: 0.8,
                ..shiny
            },
        )
        .into(),
    );

    // the ground
    scene.objects.push(
        Sphere::new(
            Vector3::new(0., -1001., 5.),
            1000.,
            Material {
                color: Vector3::rgb(0.8, 0.8, 0.8),
                ..Default::default()
            },
        )
        .into(),
    );

    scene.lights.push(Box::new(lighting::Point::new(
        Vector3::new(5., 5., 0.),
        Vector3::rgb(1., 1., 1.),
    )));

    scene
}
