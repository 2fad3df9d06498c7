//! Device trait: output interface for page replay.
//!
//! Devices translate the machine's paint calls into an output medium:
//! a rasterizer, a previewer canvas, a measuring pass. The machine assumes
//! nothing about the result; every hook defaults to a no-op so devices
//! implement only what they consume.

use crate::pk::PackedGlyph;
use num_rational::Ratio;

/// Paint callbacks invoked during page replay.
///
/// Coordinates are DVI units with the origin at the upper-left corner of
/// the page; `v` grows downward. Converting to device pixels (via the
/// program's unit fraction and the font magnification) is the device's
/// business.
pub trait Device {
    /// Called once before a page's instructions are replayed.
    fn begin_page(&mut self, _page_index: usize, _counts: &[i32; 10]) {}

    /// Called once after a page replays to completion.
    fn end_page(&mut self, _page_index: usize) {}

    /// Paint one glyph with its raster origin at `(x, y)`.
    fn paint_character(
        &mut self,
        _x: i64,
        _y: i64,
        _glyph: &PackedGlyph,
        _magnification: Ratio<u64>,
    ) {
    }

    /// Paint a solid rule with its bottom-left corner at `(x, y)`.
    fn paint_rule(&mut self, _x: i64, _y: i64, _width: i64, _height: i64) {}

    /// An extension blob the machine assigns no semantics to.
    fn special(&mut self, _payload: &[u8]) {}
}
