//! Particle sprites: the grayscale-with-alpha stamps that sheets tile and
//! tint. Stored premultiplied, square, at the renderer's cell size.

use crate::render::surface::mul_div255;

#[derive(Clone)]
pub struct Sprite {
    size: u32,
    data: Vec<u8>, // premultiplied rgba8
}

impl Sprite {
    /// Import a straight-alpha image, premultiplying on the way in.
    pub fn from_rgba_image(img: &image::RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        let size = w.min(h).max(1);
        let mut data = Vec::with_capacity((size as usize) * (size as usize) * 4);
        for y in 0..size {
            for x in 0..size {
                let px = img.get_pixel(x, y).0;
                let a = u16::from(px[3]);
                data.extend_from_slice(&[
                    mul_div255(u16::from(px[0]), a),
                    mul_div255(u16::from(px[1]), a),
                    mul_div255(u16::from(px[2]), a),
                    px[3],
                ]);
            }
        }
        Self { size, data }
    }

    /// The built-in particle: white with a radial alpha falloff from the
    /// center to the edge.
    pub fn radial(size: u32) -> Self {
        let size = size.max(1);
        let center = f64::from(size) / 2.0 - 1.0;
        let mut data = Vec::with_capacity((size as usize) * (size as usize) * 4);
        for y in 0..size {
            for x in 0..size {
                let dx = f64::from(x) - center;
                let dy = f64::from(y) - center;
                let dist = (dx * dx + dy * dy).sqrt();
                let a = (((center - dist) / center).max(0.0) * 255.0) as u8;
                // White premultiplied by its own alpha.
                data.extend_from_slice(&[a, a, a, a]);
            }
        }
        Self { size, data }
    }

    /// Nearest-neighbor resample to `size`² (identity when already there).
    pub fn resampled(&self, size: u32) -> Self {
        if size == self.size {
            return self.clone();
        }
        let size = size.max(1);
        let mut data = Vec::with_capacity((size as usize) * (size as usize) * 4);
        for y in 0..size {
            for x in 0..size {
                let sx = (u64::from(x) * u64::from(self.size) / u64::from(size)) as u32;
                let sy = (u64::from(y) * u64::from(self.size) / u64::from(size)) as u32;
                let i = ((sy as usize) * (self.size as usize) + (sx as usize)) * 4;
                data.extend_from_slice(&self.data[i..i + 4]);
            }
        }
        Self { size, data }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
