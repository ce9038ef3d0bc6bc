use crate::{material::Color, math::Vector3};

/// A rendered image in linear RGB, each channel in 0-1, stored row by row
/// with the top-left pixel first.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Vector3>,
}

impl Framebuffer {
    /// A black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vector3::zero(); width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Vector3 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Quantize to a 24-bit image for encoding.
    pub fn to_image(&self) -> image::RgbImage {
        let mut imgbuf: image::RgbImage = image::ImageBuffer::new(self.width, self.height);

        for (i, &color) in self.pixels.iter().enumerate() {
            imgbuf.put_pixel(
                i as u32 % self.width,
                i as u32 / self.width,
                Color::from(color).into(),
            );
        }

        imgbuf
    }
}
