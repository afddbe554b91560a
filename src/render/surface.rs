//! CPU render target: a premultiplied RGBA8 pixel buffer with source-over
//! compositing and the scaled/rotated cell blits the sheet renderer needs.

use crate::foundation::core::Rect;
use crate::foundation::error::{PlumeError, PlumeResult};

pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>, // premultiplied rgba8, row-major
}

impl Surface {
    pub fn new(width: u32, height: u32) -> PlumeResult<Self> {
        if width == 0 || height == 0 {
            return Err(PlumeError::render("surface width/height must be > 0"));
        }
        Ok(Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .expect("buffer length matches dimensions")
    }

    /// Blit one `cell_size`² cell out of a sheet, scaled into `dst` and
    /// composited source-over with `opacity`. `rotation` (radians) spins the
    /// blit around the destination center; zero takes the axis-aligned fast
    /// path. Nearest-neighbor sampling via inverse mapping.
    pub(crate) fn blit_cell(
        &mut self,
        sheet_data: &[u8],
        sheet_size: u32,
        cell_x: u32,
        cell_y: u32,
        cell_size: u32,
        dst: Rect,
        opacity: f32,
        rotation: f64,
    ) {
        if opacity <= 0.0 || dst.width() <= 0.0 || dst.height() <= 0.0 {
            return;
        }

        let cx = (dst.x0 + dst.x1) * 0.5;
        let cy = (dst.y0 + dst.y1) * 0.5;
        let half_w = dst.width() * 0.5;
        let half_h = dst.height() * 0.5;

        // Pixel coverage: the dst rect itself, or the AABB of its rotated
        // corners.
        let (cos, sin) = if rotation == 0.0 {
            (1.0, 0.0)
        } else {
            (rotation.cos(), rotation.sin())
        };
        let reach_x = half_w * cos.abs() + half_h * sin.abs();
        let reach_y = half_w * sin.abs() + half_h * cos.abs();

        let x_min = ((cx - reach_x).floor().max(0.0)) as u32;
        let y_min = ((cy - reach_y).floor().max(0.0)) as u32;
        let x_max = ((cx + reach_x).ceil().min(f64::from(self.width))) as u32;
        let y_max = ((cy + reach_y).ceil().min(f64::from(self.height))) as u32;

        for iy in y_min..y_max {
            for ix in x_min..x_max {
                let px = f64::from(ix) + 0.5 - cx;
                let py = f64::from(iy) + 0.5 - cy;

                // Inverse-rotate the pixel center into the unrotated rect.
                let (lx, ly) = (px * cos + py * sin, -px * sin + py * cos);
                if lx < -half_w || lx >= half_w || ly < -half_h || ly >= half_h {
                    continue;
                }

                let u = (lx + half_w) / dst.width();
                let v = (ly + half_h) / dst.height();
                let sx = cell_x + ((u * f64::from(cell_size)) as u32).min(cell_size - 1);
                let sy = cell_y + ((v * f64::from(cell_size)) as u32).min(cell_size - 1);

                let si = ((sy as usize) * (sheet_size as usize) + (sx as usize)) * 4;
                let src = [
                    sheet_data[si],
                    sheet_data[si + 1],
                    sheet_data[si + 2],
                    sheet_data[si + 3],
                ];

                let di = ((iy as usize) * (self.width as usize) + (ix as usize)) * 4;
                let dst_px = [
                    self.data[di],
                    self.data[di + 1],
                    self.data[di + 2],
                    self.data[di + 3],
                ];
                let out = over(dst_px, src, opacity);
                self.data[di..di + 4].copy_from_slice(&out);
            }
        }
    }
}

/// Premultiplied source-over with an extra opacity factor.
pub(crate) fn over(dst: [u8; 4], src: [u8; 4], opacity: f32) -> [u8; 4] {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

pub(crate) fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_opacity_0_is_noop() {
        let dst = [1, 2, 3, 4];
        let src = [200, 200, 200, 200];
        assert_eq!(over(dst, src, 0.0), dst);
    }

    #[test]
    fn over_src_alpha_0_is_noop() {
        let dst = [10, 20, 30, 40];
        let src = [255, 255, 255, 0];
        assert_eq!(over(dst, src, 1.0), dst);
    }

    #[test]
    fn over_src_opaque_replaces_dst() {
        let dst = [0, 0, 0, 255];
        let src = [255, 0, 0, 255];
        assert_eq!(over(dst, src, 1.0), src);
    }

    #[test]
    fn surface_rejects_zero_dimensions() {
        assert!(Surface::new(0, 10).is_err());
        assert!(Surface::new(10, 0).is_err());
    }

    #[test]
    fn blit_axis_aligned_copies_cell_pixels() {
        // One opaque red 2x2 "sheet" with a single 2x2 cell.
        let sheet = vec![255, 0, 0, 255].repeat(4);
        let mut s = Surface::new(8, 8).unwrap();
        s.blit_cell(
            &sheet,
            2,
            0,
            0,
            2,
            Rect::new(2.0, 2.0, 6.0, 6.0),
            1.0,
            0.0,
        );
        assert_eq!(s.pixel(4, 4), [255, 0, 0, 255]);
        assert_eq!(s.pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(s.pixel(7, 7), [0, 0, 0, 0]);
    }

    #[test]
    fn blit_applies_opacity() {
        let sheet = vec![255, 255, 255, 255].repeat(4);
        let mut s = Surface::new(4, 4).unwrap();
        s.blit_cell(&sheet, 2, 0, 0, 2, Rect::new(0.0, 0.0, 4.0, 4.0), 0.5, 0.0);
        let px = s.pixel(1, 1);
        assert!(px[3] > 120 && px[3] < 135, "alpha {}", px[3]);
    }

    #[test]
    fn blit_rotated_quarter_turn_covers_center() {
        let sheet = vec![0, 255, 0, 255].repeat(4);
        let mut s = Surface::new(8, 8).unwrap();
        s.blit_cell(
            &sheet,
            2,
            0,
            0,
            2,
            Rect::new(2.0, 2.0, 6.0, 6.0),
            1.0,
            std::f64::consts::FRAC_PI_2,
        );
        assert_eq!(s.pixel(4, 4), [0, 255, 0, 255]);
    }

    #[test]
    fn blit_clips_at_surface_edges() {
        let sheet = vec![255, 0, 0, 255].repeat(4);
        let mut s = Surface::new(4, 4).unwrap();
        // Rect hangs off every edge; must not panic and must still paint
        // what's in bounds.
        s.blit_cell(
            &sheet,
            2,
            0,
            0,
            2,
            Rect::new(-10.0, -10.0, 14.0, 14.0),
            1.0,
            0.0,
        );
        assert_eq!(s.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(s.pixel(3, 3), [255, 0, 0, 255]);
    }
}
