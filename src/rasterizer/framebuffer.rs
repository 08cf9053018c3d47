//! Color + depth render target and the plain-color line primitives

use super::line::LineStepper;
use super::types::{Color, RectI};

/// Framebuffer for software rendering
pub struct Framebuffer {
    /// Packed RGBA, row-major, `width * height` entries
    pub pixels: Vec<u32>,
    /// View-space depth of the nearest fragment so far
    pub zbuffer: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![Color::BLACK.pack(); width * height],
            zbuffer: vec![f32::MAX; width * height],
            width,
            height,
        }
    }

    /// Reallocate for new dimensions; contents are reset
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        log::debug!("framebuffer resize {}x{} -> {}x{}", self.width, self.height, width, height);
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color.pack());
    }

    /// Reset every depth to a sentinel beyond the far plane
    pub fn reset_depth(&mut self, far_clip: f32) {
        self.zbuffer.fill(far_clip * 2.0);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx] = color.pack();
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|idx| Color::unpack(self.pixels[idx]))
    }

    pub fn depth(&self, x: i32, y: i32) -> Option<f32> {
        self.index(x, y).map(|idx| self.zbuffer[idx])
    }

    /// Write `color` if `z` is nearer than the stored depth. Returns true on write.
    pub fn set_pixel_with_depth(&mut self, x: i32, y: i32, z: f32, color: Color) -> bool {
        if let Some(idx) = self.index(x, y) {
            if z < self.zbuffer[idx] {
                self.zbuffer[idx] = z;
                self.pixels[idx] = color.pack();
                return true;
            }
        }
        false
    }

    /// Horizontal run from `x1` to `x2` inclusive
    pub fn draw_hline(&mut self, x1: i32, x2: i32, y: i32, color: Color) {
        if y < 0 || y as usize >= self.height {
            return;
        }
        let lo = x1.min(x2).max(0);
        let hi = x1.max(x2).min(self.width as i32 - 1);
        let packed = color.pack();
        let row = y as usize * self.width;
        for x in lo..=hi {
            self.pixels[row + x as usize] = packed;
        }
    }

    /// Vertical run from `y1` to `y2` inclusive
    pub fn draw_vline(&mut self, x: i32, y1: i32, y2: i32, color: Color) {
        if x < 0 || x as usize >= self.width {
            return;
        }
        let lo = y1.min(y2).max(0);
        let hi = y1.max(y2).min(self.height as i32 - 1);
        let packed = color.pack();
        for y in lo..=hi {
            self.pixels[y as usize * self.width + x as usize] = packed;
        }
    }

    /// Draw a line from (x0, y0) to (x1, y1), both endpoints included
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        if x0 == x1 {
            self.draw_vline(x0, y0, y1, color);
            return;
        }
        if y0 == y1 {
            self.draw_hline(x0, x1, y0, color);
            return;
        }

        let mut line = LineStepper::new(x0, y0, x1, y1);
        while !line.is_done() {
            self.set_pixel(line.x(), line.y(), color);
            line.advance();
        }
    }

    /// Draw a line whose color blends from `start` to `end` by distance travelled
    pub fn draw_line_gradient(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, start: Color, end: Color) {
        let mut line = LineStepper::new(x0, y0, x1, y1);
        if line.is_done() {
            self.set_pixel(x0, y0, start);
            return;
        }
        while !line.is_done() {
            self.set_pixel(line.x(), line.y(), Color::lerp(start, end, line.progress()));
            line.advance();
        }
    }

    /// Filled rectangle, clipped to the framebuffer
    pub fn draw_rect(&mut self, rect: RectI, color: Color) {
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = (rect.x + rect.width).min(self.width as i32);
        let y1 = (rect.y + rect.height).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let packed = color.pack();
        for y in y0..y1 {
            let row = y as usize * self.width;
            self.pixels[row + x0 as usize..row + x1 as usize].fill(packed);
        }
    }

    /// Color buffer as RGBA bytes, for upload by a presenter
    pub fn as_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_le_bytes()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(fb: &Framebuffer, color: Color) -> usize {
        fb.pixels.iter().filter(|&&p| p == color.pack()).count()
    }

    #[test]
    fn test_depth_test_keeps_nearest() {
        let mut fb = Framebuffer::new(4, 4);
        fb.reset_depth(10.0);
        assert!(fb.set_pixel_with_depth(1, 1, 5.0, Color::RED));
        assert!(!fb.set_pixel_with_depth(1, 1, 6.0, Color::GREEN));
        assert!(fb.set_pixel_with_depth(1, 1, 2.0, Color::BLUE));
        assert_eq!(fb.pixel(1, 1), Some(Color::BLUE));
        assert_eq!(fb.depth(1, 1), Some(2.0));
    }

    #[test]
    fn test_reset_depth_sentinel_beyond_far() {
        let mut fb = Framebuffer::new(2, 2);
        fb.reset_depth(10.0);
        assert!(fb.zbuffer.iter().all(|&z| z > 10.0));
    }

    #[test]
    fn test_out_of_bounds_writes_ignored() {
        let mut fb = Framebuffer::new(4, 4);
        fb.set_pixel(-1, 0, Color::RED);
        fb.set_pixel(4, 0, Color::RED);
        fb.set_pixel(0, 4, Color::RED);
        assert_eq!(count(&fb, Color::RED), 0);
        assert_eq!(fb.pixel(9, 9), None);
    }

    #[test]
    fn test_draw_line_diagonal() {
        let mut fb = Framebuffer::new(10, 10);
        fb.draw_line(0, 0, 9, 9, Color::WHITE);
        assert_eq!(count(&fb, Color::WHITE), 10);
        for i in 0..10 {
            assert_eq!(fb.pixel(i, i), Some(Color::WHITE));
        }
    }

    #[test]
    fn test_draw_line_axis_aligned() {
        let mut fb = Framebuffer::new(10, 10);
        fb.draw_line(2, 5, 7, 5, Color::RED);
        fb.draw_line(1, 8, 1, 2, Color::GREEN);
        assert_eq!(count(&fb, Color::RED), 6);
        assert_eq!(count(&fb, Color::GREEN), 7);
    }

    #[test]
    fn test_draw_line_clips() {
        let mut fb = Framebuffer::new(8, 8);
        fb.draw_line(-20, -10, 30, 14, Color::WHITE);
        assert!(count(&fb, Color::WHITE) > 0);
    }

    #[test]
    fn test_gradient_endpoints() {
        let mut fb = Framebuffer::new(16, 4);
        fb.draw_line_gradient(0, 1, 15, 2, Color::RED, Color::BLUE);
        assert_eq!(fb.pixel(0, 1), Some(Color::RED));
        assert_eq!(fb.pixel(15, 2), Some(Color::BLUE));
    }

    #[test]
    fn test_draw_rect_clipped() {
        let mut fb = Framebuffer::new(10, 10);
        fb.draw_rect(RectI::new(-2, -2, 5, 4), Color::RED);
        assert_eq!(count(&fb, Color::RED), 3 * 2);
        fb.draw_rect(RectI::new(20, 20, 5, 5), Color::GREEN);
        assert_eq!(count(&fb, Color::GREEN), 0);
    }

    #[test]
    fn test_rgba_bytes_layout() {
        let mut fb = Framebuffer::new(2, 1);
        fb.set_pixel(1, 0, Color::with_alpha(10, 20, 30, 40));
        let bytes = fb.as_rgba_bytes();
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[4..8], &[10, 20, 30, 40]);
    }
}
