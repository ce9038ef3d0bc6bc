use std::{cell::RefCell, rc::Rc, time::Instant};

use log::{debug, info, log_enabled, trace, warn, Level};
use raytracer::{
    camera::Camera,
    framebuffer::Framebuffer,
    lighting::{self, Light},
    material::{Material, ShaderError, SurfaceShader},
    math::Vector3,
    object::SceneObject,
    scene::{Scene, SceneOptions, DEFAULT_MAX_RAY_DEPTH, MAX_RAY_DEPTH_LIMIT},
};

use crate::{
    interpret::{Closure, InterpretError, Interpreter, Value},
    parse,
};

/// Everything a `render` call asked for.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub ambient: Vector3,
    pub lights: Vec<lighting::Point>,
    pub scene: SceneObject,
    pub depth: i64,
    pub fov: f64,
    pub width: i64,
    pub height: i64,
    pub file: String,
}

impl RenderRequest {
    /// Build a renderable scene. A depth of zero or less means the default depth.
    pub fn into_scene(self) -> Result<Scene, InterpretError> {
        let (width, height) = match (u32::try_from(self.width), u32::try_from(self.height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
            _ => return Err(InterpretError::InvalidDimensions(self.width, self.height)),
        };

        let max_ray_depth = if self.depth <= 0 {
            DEFAULT_MAX_RAY_DEPTH
        } else if self.depth > MAX_RAY_DEPTH_LIMIT as i64 {
            warn!(
                "depth {} is above the limit, clamping to {}",
                self.depth, MAX_RAY_DEPTH_LIMIT
            );
            MAX_RAY_DEPTH_LIMIT
        } else {
            self.depth as u32
        };

        Ok(Scene {
            objects: vec![self.scene],
            lights: self
                .lights
                .into_iter()
                .map(|light| Box::new(light) as Box<dyn Light>)
                .collect(),
            camera: Camera::new(width, height, self.fov),
            options: SceneOptions {
                max_ray_depth,
                ambient: self.ambient,
                ..Default::default()
            },
            ..Default::default()
        })
    }
}

impl SurfaceShader for Closure {
    /// Runs the closure on a fresh interpreter with `face u v` on the stack.
    /// The body leaves a color point followed by `kd ks n`.
    fn shade(&self, face: i64, u: f64, v: f64) -> Result<Material, ShaderError> {
        let mut interpreter = Interpreter::new();
        interpreter.push(Value::Int(face));
        interpreter.push(Value::Real(u));
        interpreter.push(Value::Real(v));
        interpreter.apply(self)?;

        let (kd, ks, n) = interpreter.pop3()?;
        let color = interpreter.pop()?;

        Ok(Material {
            color,
            kd,
            ks,
            specular_exponent: n,
            ..Default::default()
        })
    }
}

/// Settings applied to every scene a program renders.
#[derive(Debug, Clone, Default)]
pub struct RenderSettings {
    /// Samples per pixel, `None` keeps the renderer's default.
    pub samples: Option<u32>,
    pub seed: Option<u64>,
}

/// One image produced by a `render` call.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// The file name the program asked for.
    pub file: String,
    pub image: Framebuffer,
}

/// Parse and run a program, rendering every scene it asks for.
pub fn parse_and_render(source: &str, settings: &RenderSettings) -> Result<Vec<Rendered>, InterpretError> {
    let now = Instant::now();
    let program = parse(source)?;

    let rendered = Rc::new(RefCell::new(vec![]));
    let sink = rendered.clone();
    let settings = settings.clone();

    let mut interpreter = Interpreter::new().with_render_sink(move |request| {
        let file = request.file.clone();
        let mut scene = request.into_scene()?;
        if let Some(samples) = settings.samples {
            scene.options.samples = samples;
        }
        scene.options.seed = settings.seed;

        debug!("rendering {} at {}x{}", file, scene.camera.vw, scene.camera.vh);
        sink.borrow_mut().push(Rendered {
            file,
            image: scene.render(),
        });
        Ok(())
    });
    if log_enabled!(Level::Trace) {
        interpreter = interpreter.with_trace_sink(|line| trace!("{}", line));
    }
    interpreter.eval(&program)?;
    drop(interpreter);

    let rendered = rendered.take();
    info!(
        "program produced {} image(s) in {}s",
        rendered.len(),
        now.elapsed().as_secs_f32()
    );

    if rendered.is_empty() {
        Err(InterpretError::NoImage)
    } else {
        Ok(rendered)
    }
}
