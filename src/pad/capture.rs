use crate::pad::export::{binarize, png_data_uri};
use crate::pad::input::PadEvent;
use crate::pad::model::{Drawing, Point, StrokeExport, SurfaceSize};
use crate::pad::render::{PenStyle, StrokeRenderer};
use crate::pad::surface::{DrawSurface, RasterSurface, SurfaceError};
use anyhow::Result;
use image::RgbaImage;

/// Drawing state plus the pixels it produced, handed to a recognizer.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingSnapshot {
    pub drawing: Drawing,
    pub image: RgbaImage,
}

impl DrawingSnapshot {
    pub fn has_content(&self) -> bool {
        self.drawing.has_content()
    }
}

/// Handwriting pad: records strokes and paints them as they arrive.
///
/// Each instance owns its own [`Drawing`] and surface; nothing is shared
/// between pads.
#[derive(Debug, Clone)]
pub struct StrokeCapture<S: DrawSurface = RasterSurface> {
    drawing: Drawing,
    surface: S,
    renderer: StrokeRenderer,
}

impl StrokeCapture<RasterSurface> {
    /// Allocate a raster-backed pad of `width` x `height` logical pixels.
    pub fn with_raster(
        width: f32,
        height: f32,
        dpr: f32,
        pen: PenStyle,
    ) -> Result<Self, SurfaceError> {
        let surface = RasterSurface::new(width, height, dpr)?;
        Ok(Self::new(surface, pen))
    }
}

impl<S: DrawSurface> StrokeCapture<S> {
    pub fn new(mut surface: S, pen: PenStyle) -> Self {
        let renderer = StrokeRenderer::new(pen, &surface);
        renderer.clear(&mut surface);
        Self {
            drawing: Drawing::default(),
            surface,
            renderer,
        }
    }

    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn renderer(&self) -> &StrokeRenderer {
        &self.renderer
    }

    pub fn has_content(&self) -> bool {
        self.drawing.has_content()
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing.is_drawing()
    }

    /// Start a stroke. Restarting while a stroke is active drops the old
    /// stroke and repaints the surface from what remains recorded.
    pub fn begin(&mut self, point: Point) {
        let restarted = self.drawing.is_drawing();
        if !self.drawing.begin(point) {
            return;
        }
        if restarted {
            tracing::debug!("pad stroke restarted before release");
            self.renderer.replay(&mut self.surface, &self.drawing);
        } else {
            self.renderer.draw_dot(&mut self.surface, point);
        }
    }

    pub fn extend(&mut self, point: Point) {
        if let Some(prev) = self.drawing.extend(point) {
            self.renderer.draw_segment(&mut self.surface, prev, point);
        }
    }

    pub fn end(&mut self) {
        if self.drawing.end() {
            tracing::trace!(strokes = self.drawing.stroke_count(), "pad stroke committed");
        }
    }

    pub fn clear(&mut self) {
        self.drawing.clear();
        self.renderer.clear(&mut self.surface);
        tracing::debug!("pad cleared");
    }

    /// Apply one event from the normalised input stream.
    pub fn handle(&mut self, event: PadEvent) {
        match event {
            PadEvent::Begin(point) => self.begin(point),
            PadEvent::Extend(point) => self.extend(point),
            PadEvent::End => self.end(),
        }
    }

    pub fn surface_size(&self) -> SurfaceSize {
        let (width, height) = self.surface.physical_size();
        SurfaceSize { width, height }
    }

    pub fn export_strokes(&self) -> StrokeExport {
        StrokeExport {
            strokes: self.drawing.strokes().to_vec(),
            captured_at: chrono::Utc::now(),
            surface_size: self.surface_size(),
        }
    }

    /// PNG data URI of the current pixels.
    pub fn serialize_to_image(&self) -> Result<String> {
        png_data_uri(&self.surface.to_image())
    }

    /// Like [`Self::serialize_to_image`] but black/white thresholded first.
    pub fn serialize_preprocessed(&self) -> Result<String> {
        png_data_uri(&binarize(&self.surface.to_image()))
    }

    pub fn snapshot(&self) -> DrawingSnapshot {
        DrawingSnapshot {
            drawing: self.drawing.clone(),
            image: self.surface.to_image(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad() -> StrokeCapture {
        StrokeCapture::with_raster(64.0, 64.0, 1.0, PenStyle::default()).unwrap()
    }

    #[test]
    fn painting_follows_recorded_points() {
        let mut pad = pad();
        pad.begin(Point::new(10.0, 10.0));
        pad.extend(Point::new(40.0, 10.0));
        pad.end();

        assert_eq!(pad.drawing().total_points(), 2);
        assert!(pad.surface().painted_pixels() > 0);
        assert_eq!(
            pad.surface().pixel(25, 10).map(|c| c.a),
            Some(255),
            "segment midpoint should be inked"
        );
    }

    #[test]
    fn extend_without_begin_paints_nothing() {
        let mut pad = pad();
        pad.extend(Point::new(10.0, 10.0));
        pad.end();
        assert_eq!(pad.surface().painted_pixels(), 0);
        assert!(pad.drawing().strokes().is_empty());
    }

    #[test]
    fn clear_resets_pixels_and_record() {
        let mut pad = pad();
        pad.handle(PadEvent::Begin(Point::new(5.0, 5.0)));
        pad.handle(PadEvent::Extend(Point::new(6.0, 30.0)));
        pad.clear();

        assert!(!pad.has_content());
        assert!(!pad.is_drawing());
        assert_eq!(pad.surface().painted_pixels(), 0);
    }

    #[test]
    fn snapshot_carries_surface_pixels() {
        let mut pad = pad();
        pad.begin(Point::new(20.0, 20.0));
        pad.end();
        let snapshot = pad.snapshot();
        assert!(snapshot.has_content());
        assert_eq!(snapshot.image.dimensions(), (64, 64));
    }
}
