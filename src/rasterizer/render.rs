//! Triangle filling
//!
//! Scanline filler built on two `LineStepper`s walking the triangle's left
//! and right edges in lockstep. Depth and UV are interpolated
//! perspective-correctly (through 1/z) both along the edges and across each
//! span, and every fragment goes through the z-buffer test.

use super::framebuffer::Framebuffer;
use super::line::LineStepper;
use super::math::lerp;
use super::types::{Color, Texture, Uv};

/// A projected vertex ready for filling: pixel position, view depth and uv
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RasterVertex {
    pub x: f32,
    pub y: f32,
    /// View-space depth, must be > 0
    pub z: f32,
    pub uv: Uv,
}

impl RasterVertex {
    pub fn new(x: f32, y: f32, z: f32, uv: Uv) -> Self {
        Self { x, y, z, uv }
    }
}

/// What a filled triangle writes into the color buffer
#[derive(Debug, Clone, Copy)]
pub enum Fill<'a> {
    Flat(Color),
    Textured(&'a Texture),
}

/// Vertex snapped to the pixel grid
#[derive(Debug, Clone, Copy)]
struct Corner {
    x: i32,
    y: i32,
    z: f32,
    uv: Uv,
}

impl From<RasterVertex> for Corner {
    fn from(v: RasterVertex) -> Self {
        Self {
            x: v.x.round() as i32,
            y: v.y.round() as i32,
            z: v.z,
            uv: v.uv,
        }
    }
}

/// Attributes at one end of a horizontal span
#[derive(Debug, Clone, Copy)]
struct SpanEnd {
    x: i32,
    z: f32,
    uv: Uv,
}

impl From<Corner> for SpanEnd {
    fn from(c: Corner) -> Self {
        Self { x: c.x, z: c.z, uv: c.uv }
    }
}

/// One triangle edge being walked
struct Edge {
    line: LineStepper,
    from: Corner,
    to: Corner,
}

impl Edge {
    fn new(from: Corner, to: Corner) -> Self {
        Self {
            line: LineStepper::new(from.x, from.y, to.x, to.y),
            from,
            to,
        }
    }

    /// Depth and uv at the stepper's current pixel
    fn span_end(&self) -> SpanEnd {
        let t = self.line.progress();
        let inv_from = 1.0 / self.from.z;
        let inv_to = 1.0 / self.to.z;
        let z = 1.0 / lerp(inv_from, inv_to, t);
        let u = lerp(self.from.uv.u * inv_from, self.to.uv.u * inv_to, t) * z;
        let v = lerp(self.from.uv.v * inv_from, self.to.uv.v * inv_to, t) * z;
        SpanEnd { x: self.line.x(), z, uv: Uv::new(u, v) }
    }
}

/// Fill a horizontal span on row `y` covering `[min_x, max_x]`; `t` runs
/// from exactly 0 at one end to exactly 1 at the other
fn fill_span(fb: &mut Framebuffer, y: i32, a: SpanEnd, b: SpanEnd, fill: &Fill) {
    if y < 0 || y as usize >= fb.height {
        return;
    }
    let (left, right) = if a.x <= b.x { (a, b) } else { (b, a) };
    let x_start = left.x.max(0);
    let x_end = right.x.min(fb.width as i32 - 1);
    if x_start > x_end {
        return;
    }

    let width = (right.x - left.x) as f32;
    let inv_left = 1.0 / left.z;
    let inv_right = 1.0 / right.z;
    let row = y as usize * fb.width;

    for x in x_start..=x_end {
        let t = if width > 0.0 { (x - left.x) as f32 / width } else { 0.0 };
        let z = 1.0 / lerp(inv_left, inv_right, t);
        let idx = row + x as usize;
        if z >= fb.zbuffer[idx] {
            continue;
        }

        let color = match fill {
            Fill::Flat(color) => *color,
            Fill::Textured(texture) => {
                let u = lerp(left.uv.u * inv_left, right.uv.u * inv_right, t) * z;
                let v = lerp(left.uv.v * inv_left, right.uv.v * inv_right, t) * z;
                texture.sample(u, v)
            }
        };
        fb.zbuffer[idx] = z;
        fb.pixels[idx] = color.pack();
    }
}

/// Snapped coordinates stay well inside `i32` so edge deltas cannot overflow
const COORD_LIMIT: f32 = 1_000_000.0;

/// Fill a triangle given in viewport space.
///
/// Vertices are sorted top to bottom. Edge A walks top -> mid -> bottom,
/// edge B walks top -> bottom. Each iteration advances whichever stepper has
/// not yet entered the next row; once both have, one span is drawn between
/// them. A horizontal top edge is drawn directly and skipped, as is a
/// horizontal bottom edge. Coverage is closed: every vertex row and column
/// is drawn.
///
/// Triangles with a non-finite coordinate, or one further than
/// `COORD_LIMIT` pixels from the origin, are skipped.
pub fn fill_triangle(fb: &mut Framebuffer, vertices: [RasterVertex; 3], fill: Fill) {
    let usable = vertices.iter().all(|v| {
        v.x.is_finite() && v.y.is_finite() && v.z.is_finite() && v.x.abs() <= COORD_LIMIT && v.y.abs() <= COORD_LIMIT
    });
    if !usable {
        log::trace!("fill_triangle: unusable vertices {:?}", vertices);
        return;
    }

    let mut corners = vertices.map(Corner::from);
    corners.sort_by_key(|c| c.y);
    let [top, mid, bot] = corners;

    let mut a = Edge::new(top, mid);
    let mut b = Edge::new(top, bot);
    let mut a_lower = false;

    if top.y == mid.y {
        fill_span(fb, top.y, top.into(), mid.into(), &fill);
        a = Edge::new(mid, bot);
        a_lower = true;
    }

    while !b.line.is_done() {
        let mut stepped = false;

        if !a.line.descended() && !a.line.is_done() {
            a.line.advance();
            stepped = true;
            if a.line.is_done() && !a_lower {
                a = Edge::new(mid, bot);
                a_lower = true;
            }
        }

        if !b.line.descended() {
            b.line.advance();
            stepped = true;
        }

        if a.line.descended() && b.line.descended() {
            a.line.clear_descended();
            b.line.clear_descended();
            fill_span(fb, b.line.y(), a.span_end(), b.span_end(), &fill);
        } else if !stepped {
            // A finished while B still waits on a row; nothing left to pair with.
            break;
        }
    }

    if mid.y == bot.y && top.y != bot.y {
        fill_span(fb, bot.y, mid.into(), bot.into(), &fill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(x: f32, y: f32, z: f32) -> RasterVertex {
        RasterVertex::new(x, y, z, Uv::default())
    }

    fn fresh(width: usize, height: usize) -> Framebuffer {
        let mut fb = Framebuffer::new(width, height);
        fb.clear(Color::BLACK);
        fb.reset_depth(10.0);
        fb
    }

    fn covered(fb: &Framebuffer, color: Color) -> Vec<(usize, usize)> {
        let packed = color.pack();
        fb.pixels
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == packed)
            .map(|(i, _)| (i % fb.width, i / fb.width))
            .collect()
    }

    #[test]
    fn test_right_triangle_area_and_bounds() {
        let mut fb = fresh(100, 100);
        fill_triangle(
            &mut fb,
            [flat(10.0, 10.0, 1.0), flat(10.0, 90.0, 1.0), flat(90.0, 10.0, 1.0)],
            Fill::Flat(Color::RED),
        );
        let pixels = covered(&fb, Color::RED);
        let expected = 80 * 80 / 2;
        // closed coverage includes every pixel on the two 80-pixel legs
        assert!(
            (pixels.len() as i64 - expected as i64).abs() <= 160,
            "filled {} pixels, expected about {}",
            pixels.len(),
            expected
        );
        for (x, y) in pixels {
            assert!((10..=90).contains(&x) && (10..=90).contains(&y), "pixel ({}, {}) outside bbox", x, y);
            // inside the hypotenuse
            assert!(x + y <= 100);
        }
    }

    #[test]
    fn test_vertex_order_does_not_matter() {
        let a = flat(20.0, 5.0, 1.0);
        let b = flat(5.0, 40.0, 1.0);
        let c = flat(45.0, 30.0, 1.0);
        let mut reference = None;
        for order in [[a, b, c], [b, c, a], [c, a, b], [a, c, b], [c, b, a], [b, a, c]] {
            let mut fb = fresh(50, 50);
            fill_triangle(&mut fb, order, Fill::Flat(Color::GREEN));
            let pixels = covered(&fb, Color::GREEN);
            assert!(!pixels.is_empty());
            match &reference {
                None => reference = Some(pixels),
                Some(r) => assert_eq!(r, &pixels),
            }
        }
    }

    #[test]
    fn test_horizontal_top_edge_terminates_and_draws_row() {
        let mut fb = fresh(64, 64);
        fill_triangle(
            &mut fb,
            [flat(5.0, 8.0, 1.0), flat(50.0, 8.0, 1.0), flat(20.0, 40.0, 1.0)],
            Fill::Flat(Color::BLUE),
        );
        for x in 5..=50 {
            assert_eq!(fb.pixel(x, 8), Some(Color::BLUE), "x = {}", x);
        }
        assert!(covered(&fb, Color::BLUE).iter().all(|&(_, y)| y >= 8 && y <= 40));
    }

    #[test]
    fn test_horizontal_bottom_edge_draws_row() {
        let mut fb = fresh(64, 64);
        fill_triangle(
            &mut fb,
            [flat(30.0, 4.0, 1.0), flat(6.0, 50.0, 1.0), flat(58.0, 50.0, 1.0)],
            Fill::Flat(Color::WHITE),
        );
        for x in 6..=58 {
            assert_eq!(fb.pixel(x, 50), Some(Color::WHITE), "x = {}", x);
        }
    }

    #[test]
    fn test_degenerate_triangles_terminate() {
        let mut fb = fresh(32, 32);
        // all on one row
        fill_triangle(&mut fb, [flat(2.0, 5.0, 1.0), flat(20.0, 5.0, 1.0), flat(9.0, 5.0, 1.0)], Fill::Flat(Color::RED));
        // collapsed to a point
        fill_triangle(&mut fb, [flat(7.0, 7.0, 1.0); 3], Fill::Flat(Color::RED));
        // collinear vertical
        fill_triangle(&mut fb, [flat(3.0, 1.0, 1.0), flat(3.0, 9.0, 1.0), flat(3.0, 30.0, 1.0)], Fill::Flat(Color::RED));
        // collinear diagonal
        fill_triangle(&mut fb, [flat(0.0, 0.0, 1.0), flat(10.0, 10.0, 1.0), flat(20.0, 20.0, 1.0)], Fill::Flat(Color::RED));
    }

    #[test]
    fn test_offscreen_parts_are_clipped() {
        let mut fb = fresh(16, 16);
        fill_triangle(
            &mut fb,
            [flat(-40.0, -30.0, 1.0), flat(-20.0, 60.0, 1.0), flat(70.0, 8.0, 1.0)],
            Fill::Flat(Color::GREEN),
        );
        assert!(!covered(&fb, Color::GREEN).is_empty());
    }

    #[test]
    fn test_nearer_triangle_wins_in_either_order() {
        let near = [flat(5.0, 5.0, 2.0), flat(5.0, 35.0, 2.0), flat(35.0, 5.0, 2.0)];
        let far = [flat(0.0, 0.0, 6.0), flat(0.0, 40.0, 6.0), flat(40.0, 0.0, 6.0)];

        let mut first = fresh(40, 40);
        fill_triangle(&mut first, near, Fill::Flat(Color::RED));
        fill_triangle(&mut first, far, Fill::Flat(Color::BLUE));

        let mut second = fresh(40, 40);
        fill_triangle(&mut second, far, Fill::Flat(Color::BLUE));
        fill_triangle(&mut second, near, Fill::Flat(Color::RED));

        assert_eq!(first.pixel(10, 10), Some(Color::RED));
        assert_eq!(second.pixel(10, 10), Some(Color::RED));
        assert_eq!(first.pixels, second.pixels);
    }

    #[test]
    fn test_depth_is_written() {
        let mut fb = fresh(20, 20);
        fill_triangle(
            &mut fb,
            [flat(0.0, 0.0, 3.0), flat(0.0, 19.0, 3.0), flat(19.0, 0.0, 3.0)],
            Fill::Flat(Color::WHITE),
        );
        let z = fb.depth(4, 4).unwrap();
        assert!((z - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_textured_triangle_samples_corners() {
        let mut pixels = vec![Color::BLACK; 9];
        pixels[0] = Color::RED;
        pixels[2] = Color::GREEN;
        pixels[6] = Color::BLUE;
        let tex = Texture::from_pixels(3, 3, pixels);

        let mut fb = fresh(64, 64);
        fill_triangle(
            &mut fb,
            [
                RasterVertex::new(4.0, 4.0, 1.0, Uv::new(0.0, 0.0)),
                RasterVertex::new(4.0, 60.0, 1.0, Uv::new(0.0, 1.0)),
                RasterVertex::new(60.0, 4.0, 1.0, Uv::new(1.0, 0.0)),
            ],
            Fill::Textured(&tex),
        );
        assert_eq!(fb.pixel(6, 6), Some(Color::RED));
        assert_eq!(fb.pixel(55, 5), Some(Color::GREEN));
        assert_eq!(fb.pixel(5, 55), Some(Color::BLUE));
    }

    #[test]
    fn test_span_reaches_both_texture_edges() {
        let pixels = (0..64).map(|i| Color::new(i as u8, 0, 0)).collect();
        let tex = Texture::from_pixels(64, 1, pixels);

        let mut fb = fresh(64, 2);
        let left = SpanEnd { x: 10, z: 1.0, uv: Uv::new(0.0, 0.0) };
        let right = SpanEnd { x: 50, z: 1.0, uv: Uv::new(1.0, 0.0) };
        fill_span(&mut fb, 0, right, left, &Fill::Textured(&tex));

        assert_eq!(fb.pixel(10, 0).unwrap().r, 0);
        assert_eq!(fb.pixel(50, 0).unwrap().r, 63);
        assert_eq!(fb.pixel(9, 0), Some(Color::BLACK));
        assert_eq!(fb.pixel(51, 0), Some(Color::BLACK));
    }

    #[test]
    fn test_single_pixel_span() {
        let mut fb = fresh(8, 8);
        let end = SpanEnd { x: 3, z: 1.0, uv: Uv::default() };
        fill_span(&mut fb, 2, end, end, &Fill::Flat(Color::RED));
        assert_eq!(covered(&fb, Color::RED), vec![(3, 2)]);
    }

    #[test]
    fn test_unusable_coordinates_are_skipped() {
        let mut fb = fresh(32, 32);
        fill_triangle(&mut fb, [flat(f32::NAN, 1.0, 1.0), flat(5.0, 20.0, 1.0), flat(20.0, 5.0, 1.0)], Fill::Flat(Color::RED));
        fill_triangle(&mut fb, [flat(1e20, 1.0, 1.0), flat(5.0, 20.0, 1.0), flat(-1e20, 5.0, 1.0)], Fill::Flat(Color::RED));
        fill_triangle(&mut fb, [flat(1.0, f32::INFINITY, 1.0), flat(5.0, 20.0, 1.0), flat(20.0, 5.0, 1.0)], Fill::Flat(Color::RED));
        assert!(covered(&fb, Color::RED).is_empty());
    }

    #[test]
    fn test_perspective_correct_midpoint() {
        // A span from depth 1 to depth 3: the screen midpoint is not the uv
        // midpoint. With 1/z interpolation u at screen-t = 0.5 is
        // (0.5 * 0 / 1 + 0.5 * 1 / 3) / (0.5 / 1 + 0.5 / 3) = 0.25.
        let pixels = (0..101).map(|i| Color::new(i as u8, 0, 0)).collect();
        let tex = Texture::from_pixels(101, 1, pixels);

        let mut fb = fresh(101, 3);
        let left = SpanEnd { x: 0, z: 1.0, uv: Uv::new(0.0, 0.0) };
        let right = SpanEnd { x: 100, z: 3.0, uv: Uv::new(1.0, 0.0) };
        fill_span(&mut fb, 1, left, right, &Fill::Textured(&tex));

        let sampled = fb.pixel(50, 1).unwrap().r as i32;
        assert!((sampled - 25).abs() <= 1, "sampled texel {}", sampled);
    }
}
