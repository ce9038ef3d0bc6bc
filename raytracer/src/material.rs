use std::{error::Error, fmt, sync::Arc};

use crate::math::Vector3;

/// A 24-bit color, RGB. Only used at the image boundary, everything else
/// works in linear `Vector3` colors.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Instantiate a new Color.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Instantiate a new Color from 3 f64s, expected to be in the range 0-1.
    pub fn newf(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: (r.clamp(0., 1.) * 255.0).round() as u8,
            g: (g.clamp(0., 1.) * 255.0).round() as u8,
            b: (b.clamp(0., 1.) * 255.0).round() as u8,
        }
    }
}

impl From<Vector3> for Color {
    fn from(v: Vector3) -> Self {
        Self::newf(v.x, v.y, v.z)
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(c: Color) -> Self {
        image::Rgb([c.r, c.g, c.b])
    }
}

/// A material for a scene object.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// The linear RGB color of the surface.
    pub color: Vector3,

    /// The reflectivity (0 to 1) of this material. 0 is diffuse, 1 is a perfect mirror.
    pub reflectivity: f64,

    /// How much reflections are smeared (0 to 1).
    pub fuzziness: f64,

    /// The transparency of this object. At 1, the object is completely transparent. At 0, the object is completely opaque.
    pub transparency: f64,

    /// The index of refraction of this material. 1 is vacuum, glass is around 1.5.
    pub refractive_index: f64,

    /// Diffuse reflection coefficient.
    pub kd: f64,

    /// Specular reflection coefficient.
    pub ks: f64,

    /// The power at which specular highlights are raised.
    pub specular_exponent: f64,
}

impl Material {
    /// Whether a hit on this material spawns any secondary rays.
    pub fn is_opaque_matte(&self) -> bool {
        self.reflectivity == 0. && self.transparency == 0.
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vector3::rgb(1., 1., 1.),
            reflectivity: 0.,
            fuzziness: 0.,
            transparency: 0.,
            refractive_index: 1.,
            kd: 1.,
            ks: 0.,
            specular_exponent: 1.,
        }
    }
}

/// Errors raised by procedural surface shaders. Their concrete type belongs
/// to whoever implements the shader.
pub type ShaderError = Box<dyn Error + Send + Sync>;

/// A procedural surface, evaluated once per ray hit from the surface
/// coordinates of the hit.
pub trait SurfaceShader: Send + Sync {
    /// Compute the material at `(face, u, v)`, where `u` and `v` are in the range 0-1.
    fn shade(&self, face: i64, u: f64, v: f64) -> Result<Material, ShaderError>;
}

/// The surface of an object, either fixed for the whole object or computed per hit.
#[derive(Clone)]
pub enum Surface {
    Fixed(Material),
    Procedural(Arc<dyn SurfaceShader>),
}

impl Surface {
    pub fn at(&self, face: i64, (u, v): (f64, f64)) -> Result<Material, ShaderError> {
        match self {
            Self::Fixed(material) => Ok(material.clone()),
            Self::Procedural(shader) => shader.shade(face, u, v),
        }
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(material) => f.debug_tuple("Fixed").field(material).finish(),
            Self::Procedural(_) => f.write_str("Procedural(..)"),
        }
    }
}

impl From<Material> for Surface {
    fn from(material: Material) -> Self {
        Self::Fixed(material)
    }
}
