/// Contains the rendering options that are exported as part of the public
/// API of this crate.
use image::{Luma, Pixel, Rgb, Rgba};

use crate::error::{QrError, Result};

/// Quiet region around the symbol in modules, as required by the standard
pub const DEFAULT_MARGIN: u32 = 4;

/// Pixels per module
pub const DEFAULT_SCALE: f64 = 6.0;

//-------------------------------------------------------------------------------------------------

/// How a symbol is drawn onto an image. The colors are plain pixel values of
/// whatever pixel type the image should have.
#[derive(Clone,Copy,PartialEq,Debug)]
pub struct RenderOptions<P: Pixel> {
    pub margin: u32,            // quiet region in modules, on every side
    pub scale: f64,             // pixels per module, may be fractional
    pub width: Option<u32>,     // total image width in pixels, overrides scale
    pub dark: P,
    pub light: P,
}

impl<P: Pixel> RenderOptions<P> {
    /// Default geometry with the given colors
    pub fn with_colors(dark: P, light: P) -> RenderOptions<P> {
        RenderOptions {
            margin: DEFAULT_MARGIN,
            scale: DEFAULT_SCALE,
            width: None,
            dark,
            light,
        }
    }

    pub fn margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Check the preconditions of the options. The margin can not be negative by type.
    pub fn validate(&self) -> Result<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(QrError::InvalidConfiguration(format!("scale must be > 0, got {}", self.scale)));
        }
        if self.width == Some(0) {
            return Err(QrError::InvalidConfiguration("width must be > 0".to_string()));
        }
        Ok(())
    }
}

impl Default for RenderOptions<Luma<u8>> {
    /// black on white
    fn default() -> Self {
        RenderOptions::with_colors(Luma([0]), Luma([255]))
    }
}

impl Default for RenderOptions<Rgb<u8>> {
    fn default() -> Self {
        RenderOptions::with_colors(Rgb([0, 0, 0]), Rgb([255, 255, 255]))
    }
}

impl Default for RenderOptions<Rgba<u8>> {
    fn default() -> Self {
        RenderOptions::with_colors(Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 255]))
    }
}
