//! Display sink abstraction and sample rendering
//!
//! The driver never touches drawing resources directly. It calls the
//! operations of a [`DisplaySink`], which serializes access internally.

#[cfg(test)]
mod recording;
#[cfg(feature = "gui")]
pub mod window;

#[cfg(test)]
pub use recording::RecordingSink;
#[cfg(feature = "gui")]
pub use window::WindowSink;

use rayon::prelude::*;
use std::sync::Arc;

/// A pixel surface that can also report key presses.
///
/// Every operation may be called repeatedly and reports success as a bool.
/// Drawing before the surface is open is refused, not fatal.
pub trait DisplaySink: Send + Sync {
    /// Open (or raise) the window
    fn open(&self) -> bool;

    /// Close the window and stop any background work
    fn close(&self) -> bool;

    /// Horizontal resolution in pixels
    fn width(&self) -> u32;

    /// Vertical resolution in pixels
    fn height(&self) -> u32;

    /// Fill the drawing surface with one color
    fn clear(&self, r: u8, g: u8, b: u8) -> bool;

    /// Set a single pixel
    fn draw_point(&self, x: u32, y: u32, r: u8, g: u8, b: u8) -> bool;

    /// Paint gray `levels` row-major from the top left, returning how many
    /// pixels were set. Levels past the last row are dropped.
    fn draw_levels(&self, levels: &[u8]) -> usize {
        let (width, height) = (self.width(), self.height());
        levels
            .iter()
            .enumerate()
            .filter(|&(index, &level)| {
                grid_position(index, width, height)
                    .is_some_and(|(x, y)| self.draw_point(x, y, level, level, level))
            })
            .count()
    }

    /// Show everything drawn since the last present
    fn present(&self) -> bool;

    /// True at most once per key press
    fn poll_key_pressed(&self) -> bool;

    /// Block until the next key press
    fn block_until_key_pressed(&self) -> bool;
}

impl<T: DisplaySink + ?Sized> DisplaySink for Arc<T> {
    fn open(&self) -> bool {
        (**self).open()
    }

    fn close(&self) -> bool {
        (**self).close()
    }

    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn clear(&self, r: u8, g: u8, b: u8) -> bool {
        (**self).clear(r, g, b)
    }

    fn draw_point(&self, x: u32, y: u32, r: u8, g: u8, b: u8) -> bool {
        (**self).draw_point(x, y, r, g, b)
    }

    fn draw_levels(&self, levels: &[u8]) -> usize {
        (**self).draw_levels(levels)
    }

    fn present(&self) -> bool {
        (**self).present()
    }

    fn poll_key_pressed(&self) -> bool {
        (**self).poll_key_pressed()
    }

    fn block_until_key_pressed(&self) -> bool {
        (**self).block_until_key_pressed()
    }
}

/// Row-major position of a sample index, or `None` when it falls below the last row
pub fn grid_position(index: usize, width: u32, height: u32) -> Option<(u32, u32)> {
    if width == 0 {
        return None;
    }

    let width = width as usize;
    let (x, y) = (index % width, index / width);
    if y >= height as usize {
        return None;
    }
    Some((x as u32, y as u32))
}

/// Clamp a cell value into a grayscale intensity
pub fn intensity(value: f32) -> u8 {
    // NaN casts to 0
    value.clamp(0.0, 255.0) as u8
}

/// Paint `sample` onto the sink and present it, returning how many points were drawn.
///
/// Cells that fall past the last row are dropped rather than scaled or wrapped.
pub fn render_sample(sink: &dyn DisplaySink, sample: &[f32]) -> usize {
    let (width, height) = (sink.width(), sink.height());
    sink.clear(0, 0, 0);

    let visible = (width as usize)
        .saturating_mul(height as usize)
        .min(sample.len());

    let levels: Vec<u8> = sample[..visible]
        .par_iter()
        .map(|&value| intensity(value))
        .collect();
    let drawn = sink.draw_levels(&levels);

    sink.present();
    drawn
}
