#![allow(clippy::many_single_char_names)]

//! A recursive ray tracer for scenes built out of spheres.

pub mod camera;
pub mod demo;
pub mod framebuffer;
pub mod lighting;
pub mod material;
pub mod math;
pub mod object;
pub mod scene;
pub mod skybox;
