use image::{Rgba, RgbaImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Color {
    fn from(value: [u8; 4]) -> Self {
        Self::rgba(value[0], value[1], value[2], value[3])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    RenderTargetUnavailable { reason: String },
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::RenderTargetUnavailable { reason } => {
                write!(f, "render target unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Pixel-level drawing target.
///
/// Coordinates are physical pixels. Out-of-bounds writes are ignored.
pub trait DrawSurface {
    fn physical_size(&self) -> (u32, u32);
    fn device_pixel_ratio(&self) -> f32;
    fn pixel(&self, x: u32, y: u32) -> Option<Color>;
    fn blend_pixel(&mut self, x: u32, y: u32, color: Color);
    fn clear_rect(&mut self, x: u32, y: u32, width: u32, height: u32);
    fn to_image(&self) -> RgbaImage;
}

/// In-memory surface backed by an RGBA image.
///
/// `revision` bumps on every write so a presenter can tell when to upload
/// a fresh texture.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: RgbaImage,
    dpr: f32,
    revision: u64,
}

impl RasterSurface {
    /// Allocate a surface for a logical region at the given pixel density.
    pub fn new(logical_width: f32, logical_height: f32, dpr: f32) -> Result<Self, SurfaceError> {
        if !(dpr.is_finite() && dpr > 0.0) {
            return Err(SurfaceError::RenderTargetUnavailable {
                reason: format!("invalid device pixel ratio {dpr}"),
            });
        }
        if !(logical_width.is_finite() && logical_height.is_finite()) {
            return Err(SurfaceError::RenderTargetUnavailable {
                reason: "non-finite surface bounds".into(),
            });
        }
        let width = (logical_width * dpr).round();
        let height = (logical_height * dpr).round();
        if width < 1.0 || height < 1.0 {
            return Err(SurfaceError::RenderTargetUnavailable {
                reason: format!("surface bounds are empty ({logical_width}x{logical_height})"),
            });
        }
        Ok(Self {
            image: RgbaImage::new(width as u32, height as u32),
            dpr,
            revision: 0,
        })
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Count of pixels with non-zero alpha.
    pub fn painted_pixels(&self) -> usize {
        self.image.pixels().filter(|px| px.0[3] != 0).count()
    }
}

impl DrawSurface for RasterSurface {
    fn physical_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.dpr
    }

    fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.image.width() || y >= self.image.height() {
            return None;
        }
        let [r, g, b, a] = self.image.get_pixel(x, y).0;
        Some(Color::rgba(r, g, b, a))
    }

    fn blend_pixel(&mut self, x: u32, y: u32, color: Color) {
        if color.a == 0 || x >= self.image.width() || y >= self.image.height() {
            return;
        }
        let dst = self.image.get_pixel(x, y).0;
        let src_a = color.a as f32 / 255.0;
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        let blend = |src: u8, dst: u8| {
            let src_f = src as f32 / 255.0;
            let dst_f = dst as f32 / 255.0;
            ((src_f * src_a + dst_f * dst_a * (1.0 - src_a)) / out_a * 255.0)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        self.image.put_pixel(
            x,
            y,
            Rgba([
                blend(color.r, dst[0]),
                blend(color.g, dst[1]),
                blend(color.b, dst[2]),
                (out_a * 255.0).round() as u8,
            ]),
        );
        self.revision = self.revision.wrapping_add(1);
    }

    fn clear_rect(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let max_x = x.saturating_add(width).min(self.image.width());
        let max_y = y.saturating_add(height).min(self.image.height());
        for py in y..max_y {
            for px in x..max_x {
                self.image.put_pixel(px, py, Rgba(Color::TRANSPARENT.to_array()));
            }
        }
        self.revision = self.revision.wrapping_add(1);
    }

    fn to_image(&self) -> RgbaImage {
        self.image.clone()
    }
}
