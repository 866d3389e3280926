pub mod capture;
pub mod export;
pub mod input;
pub mod model;
pub mod render;
pub mod surface;

pub use capture::{DrawingSnapshot, StrokeCapture};
pub use input::{DeviceEvent, InputNormalizer, PadEvent, TouchPoint};
pub use model::{Drawing, Point, Stroke, StrokeExport, SurfaceSize};
pub use render::{PenStyle, StrokeRenderer};
pub use surface::{Color, DrawSurface, RasterSurface, SurfaceError};
