use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Surface-local coordinate in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for Point {
    fn from(value: (f32, f32)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

pub type Stroke = Vec<Point>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

/// Strokes captured in one session.
///
/// `strokes` only ever holds committed strokes; the in-progress stroke lives
/// in `current` until [`Drawing::end`] moves it over. `has_content` latches
/// on the first recorded point and is only reset by [`Drawing::clear`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Drawing {
    strokes: Vec<Stroke>,
    current: Option<Stroke>,
    has_content: bool,
}

impl Drawing {
    /// Start a stroke at `point`.
    ///
    /// A stroke that is still active is discarded, not committed: the new
    /// press replaces it. Returns `false` for non-finite input.
    pub fn begin(&mut self, point: Point) -> bool {
        if !point.is_finite() {
            return false;
        }
        self.current = Some(vec![point]);
        self.has_content = true;
        true
    }

    /// Append `point` to the active stroke, returning the previous point so
    /// the caller can paint the connecting segment.
    pub fn extend(&mut self, point: Point) -> Option<Point> {
        if !point.is_finite() {
            return None;
        }
        let current = self.current.as_mut()?;
        let last = current.last().copied();
        current.push(point);
        last
    }

    /// Commit the active stroke. Returns `false` when nothing was active.
    pub fn end(&mut self) -> bool {
        match self.current.take() {
            Some(stroke) => {
                self.strokes.push(stroke);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.current = None;
        self.has_content = false;
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn current_stroke(&self) -> &[Point] {
        self.current.as_deref().unwrap_or(&[])
    }

    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }

    pub fn has_content(&self) -> bool {
        self.has_content
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    /// Points across committed strokes.
    pub fn total_points(&self) -> usize {
        self.strokes.iter().map(Vec::len).sum()
    }
}

/// Serializable snapshot returned by `export_strokes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeExport {
    pub strokes: Vec<Stroke>,
    pub captured_at: DateTime<Utc>,
    pub surface_size: SurfaceSize,
}
