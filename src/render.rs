use image::{ImageBuffer, Pixel};
use tracing::debug;

use crate::config::RenderOptions;
use crate::error::Result;
use crate::matrix::QrMatrix;

/// Draw the symbol onto a new square image, quiet region included.
///
/// Without a `width` the image is `(size + 2 * margin) * scale` pixels wide. With a
/// fractional scale, module edges are snapped down to whole pixels, so some modules
/// end up one pixel wider or taller than others but there are no gaps between them.
pub fn render<P: Pixel>(
    matrix: &QrMatrix,
    options: &RenderOptions<P>,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>> {
    options.validate()?;

    let margin = options.margin as usize;
    let modules = matrix.size() + 2 * margin;
    let (side, scale) = match options.width {
        Some(width) => (width, width as f64 / modules as f64),
        None => (((modules as f64) * options.scale).floor() as u32, options.scale),
    };
    debug!(size = matrix.size(), side, scale, "rendering symbol");

    let edge = |module: usize| (((module as f64) * scale).floor() as u32).min(side);

    let mut image = ImageBuffer::from_pixel(side, side, options.light);
    for (y, row) in matrix.rows().enumerate() {
        let (y_start, y_end) = (edge(y + margin), edge(y + margin + 1));
        for (x, _) in row.iter().enumerate().filter(|&(_, &dark)| dark) {
            let (x_start, x_end) = (edge(x + margin), edge(x + margin + 1));
            for py in y_start..y_end {
                for px in x_start..x_end {
                    image.put_pixel(px, py, options.dark);
                }
            }
        }
    }
    Ok(image)
}
