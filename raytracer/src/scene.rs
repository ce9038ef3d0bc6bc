use std::ops::Add;

use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;

use crate::{
    camera::Camera,
    framebuffer::Framebuffer,
    lighting::Light,
    material::Material,
    math::{refraction_vec, schlick, Ray, Vector3},
    object::{closest_hit, Hit, SceneObject, Sphere},
    skybox::{self, Skybox},
};

/// A very small value, close to zero, used to push secondary rays off the
/// surface they start on.
pub const EPSILON: f64 = 1e-4;

/// Recursion limit used when none is given.
pub const DEFAULT_MAX_RAY_DEPTH: u32 = 3;

/// Hard ceiling on recursion. Larger depths are clamped to this.
pub const MAX_RAY_DEPTH_LIMIT: u32 = 64;

/// Scene options. Defaults are provided.
#[derive(Debug, Clone)]
pub struct SceneOptions {
    /// The maximum number of bounces a ray can reflect/refract from an initial ray.
    /// The initial hit is always shaded, even at zero.
    pub max_ray_depth: u32,

    /// The ambient light color of the scene.
    pub ambient: Vector3,

    /// Jittered samples taken per pixel.
    pub samples: u32,

    /// Seed for the sampling jitter. Unseeded renders draw from system entropy.
    pub seed: Option<u64>,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            max_ray_depth: DEFAULT_MAX_RAY_DEPTH,
            ambient: Vector3::zero(),
            samples: 4,
            seed: None,
        }
    }
}

/// Counters collected while tracing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceStats {
    /// Reflected and refracted rays actually traced.
    pub secondary_rays: u64,

    /// Hits whose surface shader failed and were shaded as misses.
    pub shader_failures: u64,
}

impl Add for TraceStats {
    type Output = TraceStats;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            secondary_rays: self.secondary_rays + rhs.secondary_rays,
            shader_failures: self.shader_failures + rhs.shader_failures,
        }
    }
}

/// A scene, which contains a list of objects, lights, and a camera to render from.
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub lights: Vec<Box<dyn Light>>,
    pub camera: Camera,
    pub skybox: Box<dyn Skybox>,
    pub options: SceneOptions,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            lights: Vec::new(),
            camera: Camera::default(),
            skybox: Box::new(skybox::Gradient::default()),
            options: SceneOptions::default(),
        }
    }
}

impl Scene {
    /// Cast a ray and return the nearest hit, if any.
    pub fn closest_hit(&self, ray: &Ray) -> Option<Hit<'_>> {
        closest_hit(&self.objects, ray, None)
    }

    /// Whether anything other than `origin` lies on the ray closer than `dist`.
    pub fn is_occluded(&self, ray: &Ray, dist: f64, origin: &Sphere) -> bool {
        closest_hit(&self.objects, ray, Some(origin)).map_or(false, |hit| hit.t < dist)
    }

    /// Ambient plus direct light at a hit, with no secondary rays.
    pub fn surface_color(&self, ray: &Ray, hit: &Hit, material: &Material) -> Vector3 {
        let mut color = material.color * self.options.ambient * material.kd;

        for light in self.lights.iter() {
            let shading = match light.shading(ray, hit, self) {
                Some(s) => s,
                None => continue,
            };
            let lcol = light.color();

            let diffuse = material.color * lcol * (shading.diffuse * material.kd);
            let specular =
                lcol * (material.ks * shading.specular.powf(material.specular_exponent));

            color += diffuse + specular;
        }

        color
    }

    /// Trace out a ray, getting its color. `depth` is how many more bounces
    /// may follow this one.
    pub fn trace_ray(&self, ray: &Ray, depth: u32, stats: &mut TraceStats) -> Vector3 {
        let depth = depth.min(MAX_RAY_DEPTH_LIMIT);

        let hit = match self.closest_hit(ray) {
            Some(hit) => hit,
            None => return self.skybox.ray_color(ray),
        };

        let material = match hit.object.material_at(hit.point) {
            Ok(material) => material,
            Err(e) => {
                debug!("surface shader failed, treating the ray as a miss: {}", e);
                stats.shader_failures += 1;
                return self.skybox.ray_color(ray);
            }
        };

        let surface = self.surface_color(ray, &hit, &material);
        if material.is_opaque_matte() {
            return surface.clamp01();
        }

        let remaining = depth.saturating_sub(1);

        let mut reflected = Vector3::zero();
        if material.reflectivity > 0. {
            let fuzz = material.fuzziness;
            // a fixed offset scaled by the fuzziness, not a random jitter
            let wobble = Vector3::new(fuzz.cos().powi(2), fuzz.sin().powi(2), 0.) * fuzz;
            let dir = (ray.direction.reflect(hit.normal) + wobble).normalize();

            reflected = self.trace_secondary(
                &Ray::new(hit.point + hit.normal * EPSILON, dir),
                remaining,
                stats,
            );
        }

        let mut refracted = Vector3::zero();
        if material.transparency > 0. {
            let (mut from_ior, mut to_ior) = (1., material.refractive_index);
            let mut normal = hit.normal;

            // leaving the object rather than entering it
            if ray.direction.dot(normal) > 0. {
                std::mem::swap(&mut from_ior, &mut to_ior);
                normal = -normal;
            }

            // no transmitted ray on total internal reflection
            if let Some(dir) = refraction_vec(ray, normal, from_ior, to_ior) {
                refracted = self.trace_secondary(
                    &Ray::new(hit.point - normal * EPSILON, dir),
                    remaining,
                    stats,
                );
            }
        }

        let kr = schlick(ray.direction, hit.normal, material.refractive_index);
        (surface * (1. - material.transparency) + reflected * kr + refracted * (1. - kr)).clamp01()
    }

    /// Trace a reflected or refracted ray. Out of depth, it contributes nothing.
    fn trace_secondary(&self, ray: &Ray, depth: u32, stats: &mut TraceStats) -> Vector3 {
        if depth == 0 {
            return Vector3::zero();
        }

        stats.secondary_rays += 1;
        self.trace_ray(ray, depth, stats)
    }

    /// Trace out a pixel, where top-left of the image is (0, 0), averaging
    /// jittered samples.
    pub fn trace_pixel<R: Rng>(
        &self,
        x: u32,
        y: u32,
        rng: &mut R,
        stats: &mut TraceStats,
    ) -> Vector3 {
        let samples = self.options.samples.max(1);
        let mut total = Vector3::zero();

        for _ in 0..samples {
            let (du, dv): (f64, f64) = if samples == 1 {
                (0., 0.)
            } else {
                (rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5))
            };

            let ray = self.camera.ray_at(x as f64 + du, y as f64 + dv);
            total += self.trace_ray(&ray, self.options.max_ray_depth, stats);
        }

        total / samples as f64
    }

    fn row_rng(&self, y: u32) -> StdRng {
        match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(y as u64)),
            None => StdRng::from_entropy(),
        }
    }

    /// Render the image out to a framebuffer. Rows are traced in parallel.
    pub fn render(&self) -> Framebuffer {
        let (vw, vh) = (self.camera.vw, self.camera.vh);
        let mut framebuffer = Framebuffer::new(vw, vh);
        if vw == 0 || vh == 0 {
            warn!("rendering an empty {}x{} image", vw, vh);
            return framebuffer;
        }

        if self.options.max_ray_depth > MAX_RAY_DEPTH_LIMIT {
            warn!(
                "max ray depth {} is above the limit, clamping to {}",
                self.options.max_ray_depth, MAX_RAY_DEPTH_LIMIT
            );
        }

        let (viewport_width, viewport_height) = self.camera.viewport();
        debug!("viewport size: {} x {}", viewport_width, viewport_height);

        // every row belongs to exactly one worker, so no locking is needed
        let stats = framebuffer
            .pixels
            .par_chunks_mut(vw as usize)
            .enumerate()
            .map(|(y, row)| {
                let y = y as u32;
                let mut rng = self.row_rng(y);
                let mut stats = TraceStats::default();

                for (x, pixel) in row.iter_mut().enumerate() {
                    *pixel = self.trace_pixel(x as u32, y, &mut rng, &mut stats);
                }

                stats
            })
            .reduce(TraceStats::default, |a, b| a + b);

        info!(
            "rendered {}x{} with {} secondary rays",
            vw, vh, stats.secondary_rays
        );
        if stats.shader_failures > 0 {
            warn!(
                "{} hits had failing surface shaders and were shaded as misses",
                stats.shader_failures
            );
        }

        framebuffer
    }
}
