use crate::pad::model::{Drawing, Point};
use crate::pad::surface::{Color, DrawSurface};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenStyle {
    pub color: Color,
    /// Line width in logical pixels.
    pub width: f32,
}

impl Default for PenStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 3.0,
        }
    }
}

/// Paints strokes with round caps and joins.
///
/// Input points are logical; the device pixel ratio is captured once when
/// the renderer is created and applied to every coordinate and to the pen
/// width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeRenderer {
    pen: PenStyle,
    scale: f32,
}

impl StrokeRenderer {
    pub fn new(pen: PenStyle, surface: &impl DrawSurface) -> Self {
        let dpr = surface.device_pixel_ratio();
        let scale = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        Self { pen, scale }
    }

    pub fn pen(&self) -> PenStyle {
        self.pen
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    fn radius(&self) -> f32 {
        (self.pen.width * self.scale / 2.0).max(0.5)
    }

    fn to_physical(&self, point: Point) -> Point {
        Point::new(point.x * self.scale, point.y * self.scale)
    }

    /// Stamp the round cap for a stroke that has only its first point.
    pub fn draw_dot(&self, surface: &mut impl DrawSurface, at: Point) {
        draw_circle(surface, self.to_physical(at), self.radius(), self.pen.color);
    }

    /// Stamp circles along `from -> to`. Only the part of the segment within
    /// a pen radius of the surface is walked, so far-off points cost no more
    /// than the surface diagonal.
    pub fn draw_segment(&self, surface: &mut impl DrawSurface, from: Point, to: Point) {
        let radius = self.radius();
        let (width, height) = surface.physical_size();
        let Some((start, end)) = clip_segment(
            self.to_physical(from),
            self.to_physical(to),
            Point::new(-radius, -radius),
            Point::new(width as f32 + radius, height as f32 + radius),
        ) else {
            return;
        };
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            draw_circle(
                surface,
                Point::new(start.x + dx * t, start.y + dy * t),
                radius,
                self.pen.color,
            );
        }
    }

    pub fn clear(&self, surface: &mut impl DrawSurface) {
        let (width, height) = surface.physical_size();
        surface.clear_rect(0, 0, width, height);
    }

    /// Repaint every stroke of `drawing`, including the active one.
    pub fn replay(&self, surface: &mut impl DrawSurface, drawing: &Drawing) {
        self.clear(surface);
        let active = drawing.current_stroke();
        for stroke in drawing
            .strokes()
            .iter()
            .map(Vec::as_slice)
            .chain(std::iter::once(active))
        {
            match stroke {
                [] => {}
                [only] => self.draw_dot(surface, *only),
                _ => {
                    self.draw_dot(surface, stroke[0]);
                    for pair in stroke.windows(2) {
                        self.draw_segment(surface, pair[0], pair[1]);
                    }
                }
            }
        }
    }
}

/// Liang-Barsky clip of `a -> b` against the box `min..max`. Runs in f64
/// so clipping a very long segment does not shift its endpoints.
fn clip_segment(a: Point, b: Point, min: Point, max: Point) -> Option<(Point, Point)> {
    if !(a.is_finite() && b.is_finite()) {
        return None;
    }
    let (ax, ay) = (a.x as f64, a.y as f64);
    let dx = b.x as f64 - ax;
    let dy = b.y as f64 - ay;
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [
        (-dx, ax - min.x as f64),
        (dx, max.x as f64 - ax),
        (-dy, ay - min.y as f64),
        (dy, max.y as f64 - ay),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    let at = |t: f64| Point::new((ax + dx * t) as f32, (ay + dy * t) as f32);
    Some((at(t0), at(t1)))
}

fn draw_circle(surface: &mut impl DrawSurface, center: Point, radius: f32, color: Color) {
    if radius <= 0.0 {
        return;
    }
    let (width, height) = surface.physical_size();
    if width == 0 || height == 0 {
        return;
    }
    let radius_sq = radius * radius;
    let min_x = (center.x - radius).floor().max(0.0) as i64;
    let max_x = (center.x + radius).ceil().min((width - 1) as f32) as i64;
    let min_y = (center.y - radius).floor().max(0.0) as i64;
    let max_y = (center.y + radius).ceil().min((height - 1) as f32) as i64;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 + 0.5 - center.x;
            let dy = y as f32 + 0.5 - center.y;
            if dx * dx + dy * dy <= radius_sq {
                surface.blend_pixel(x as u32, y as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pad::surface::RasterSurface;

    fn surface(dpr: f32) -> RasterSurface {
        RasterSurface::new(40.0, 40.0, dpr).unwrap()
    }

    #[test]
    fn segment_paints_both_endpoints() {
        let mut s = surface(1.0);
        let renderer = StrokeRenderer::new(PenStyle::default(), &s);
        renderer.draw_segment(&mut s, Point::new(5.0, 5.0), Point::new(30.0, 5.0));

        assert_eq!(s.pixel(5, 5), Some(Color::BLACK));
        assert_eq!(s.pixel(29, 5), Some(Color::BLACK));
        assert_eq!(s.pixel(5, 30), Some(Color::TRANSPARENT));
    }

    #[test]
    fn dpr_scales_coordinates_to_physical_pixels() {
        let mut s = surface(2.0);
        let renderer = StrokeRenderer::new(PenStyle::default(), &s);
        assert_eq!(renderer.scale(), 2.0);
        renderer.draw_dot(&mut s, Point::new(10.0, 10.0));

        assert_eq!(s.pixel(20, 20), Some(Color::BLACK));
        assert_eq!(s.pixel(10, 10), Some(Color::TRANSPARENT));
    }

    #[test]
    fn clear_erases_everything() {
        let mut s = surface(1.0);
        let renderer = StrokeRenderer::new(PenStyle::default(), &s);
        renderer.draw_segment(&mut s, Point::new(0.0, 0.0), Point::new(39.0, 39.0));
        assert!(s.painted_pixels() > 0);
        renderer.clear(&mut s);
        assert_eq!(s.painted_pixels(), 0);
    }

    #[test]
    fn off_surface_segments_do_not_panic() {
        let mut s = surface(1.0);
        let renderer = StrokeRenderer::new(PenStyle::default(), &s);
        renderer.draw_segment(&mut s, Point::new(-50.0, -50.0), Point::new(-10.0, 90.0));
        renderer.draw_dot(&mut s, Point::new(1000.0, 1000.0));
    }

    #[test]
    fn distant_segment_end_returns_promptly() {
        let mut s = surface(1.0);
        let renderer = StrokeRenderer::new(PenStyle::default(), &s);
        let started = std::time::Instant::now();
        renderer.draw_segment(&mut s, Point::new(5.0, 5.0), Point::new(1.0e9, 0.0));
        renderer.draw_segment(&mut s, Point::new(-1.0e9, -1.0e9), Point::new(1.0e9, 1.0e9));
        renderer.draw_segment(&mut s, Point::new(-1.0e9, 500.0), Point::new(1.0e9, 500.0));
        assert!(started.elapsed() < std::time::Duration::from_secs(1));

        assert_eq!(s.pixel(5, 5), Some(Color::BLACK));
        assert_eq!(s.pixel(39, 5), Some(Color::BLACK));
        assert_eq!(s.pixel(20, 20), Some(Color::BLACK));
    }

    #[test]
    fn clip_keeps_inner_segments_unchanged() {
        let a = Point::new(2.0, 3.0);
        let b = Point::new(10.0, 12.0);
        let min = Point::new(0.0, 0.0);
        let max = Point::new(40.0, 40.0);
        assert_eq!(clip_segment(a, b, min, max), Some((a, b)));
        assert_eq!(
            clip_segment(Point::new(50.0, 0.0), Point::new(60.0, 10.0), min, max),
            None
        );
    }

    #[test]
    fn replay_matches_incremental_painting() {
        let mut incremental = surface(1.0);
        let renderer = StrokeRenderer::new(PenStyle::default(), &incremental);
        let mut drawing = Drawing::default();

        drawing.begin(Point::new(4.0, 4.0));
        renderer.draw_dot(&mut incremental, Point::new(4.0, 4.0));
        for next in [Point::new(20.0, 8.0), Point::new(30.0, 30.0)] {
            if let Some(prev) = drawing.extend(next) {
                renderer.draw_segment(&mut incremental, prev, next);
            }
        }
        drawing.end();

        let mut replayed = surface(1.0);
        renderer.replay(&mut replayed, &drawing);
        assert_eq!(incremental.image(), replayed.image());
    }
}
