use image::RgbaImage;
use tiny_skia::{FillRule, Mask, Transform};

use super::font::FontHandle;
use super::layout::Anchor;
use super::{RenderConfig, Rgb};

const CHANNELS: usize = 4;

/// Mutable view over a run of whole rows of an RGBA8 buffer. Coordinates are
/// in full-image space; anything outside the view is dropped.
#[derive(Debug)]
pub struct Canvas<'a> {
    pixels: &'a mut [u8],
    width: u32,
    first_row: u32,
    rows: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(image: &'a mut RgbaImage) -> Self {
        let (width, rows) = image.dimensions();
        Self {
            pixels: &mut **image,
            width,
            first_row: 0,
            rows,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn rows(&self) -> std::ops::Range<u32> {
        self.first_row..self.first_row + self.rows
    }

    /// Splits into `[first_row, row)` and `[row, end)`. `row` is clamped to
    /// the view.
    pub fn split_at_row(self, row: u32) -> (Canvas<'a>, Canvas<'a>) {
        let row = row.clamp(self.first_row, self.first_row + self.rows);
        let upper_rows = row - self.first_row;
        let stride = self.width as usize * CHANNELS;
        let (upper, lower) = self.pixels.split_at_mut(upper_rows as usize * stride);
        (
            Canvas {
                pixels: upper,
                width: self.width,
                first_row: self.first_row,
                rows: upper_rows,
            },
            Canvas {
                pixels: lower,
                width: self.width,
                first_row: row,
                rows: self.rows - upper_rows,
            },
        )
    }

    fn blend(&mut self, x: i64, y: i64, coverage: u8, color: Rgb) {
        if coverage == 0 || x < 0 || x >= self.width as i64 {
            return;
        }
        let row = y - self.first_row as i64;
        if row < 0 || row >= self.rows as i64 {
            return;
        }
        let index = (row as usize * self.width as usize + x as usize) * CHANNELS;
        let pixel = &mut self.pixels[index..index + CHANNELS];
        let a = coverage as u32;
        let inv = 255 - a;
        for (dst, src) in pixel.iter_mut().zip([color.0, color.1, color.2]) {
            *dst = ((src as u32 * a + *dst as u32 * inv + 127) / 255) as u8;
        }
        pixel[3] = (a + pixel[3] as u32 * inv / 255) as u8;
    }
}

/// Draws `text` with its baseline-left origin at `anchor`, one glyph after
/// another. Glyphs the font lacks are skipped without moving the pen.
pub fn draw_text(
    canvas: &mut Canvas<'_>,
    anchor: Anchor,
    text: &str,
    font: &FontHandle,
    config: &RenderConfig,
) {
    let Some(font) = font.scaled(config) else {
        return;
    };
    let baseline = anchor.y as f32;
    let mut pen = anchor.x as f32;
    for ch in text.chars() {
        let Some(glyph) = font.glyph(ch) else {
            continue;
        };
        if let Some(path) = font.outline(glyph, pen, baseline) {
            fill_glyph(canvas, &path, config.foreground);
        }
        pen += font.pen_advance(glyph);
    }
}

fn fill_glyph(canvas: &mut Canvas<'_>, path: &tiny_skia::Path, color: Rgb) {
    let bounds = path.bounds();
    let left = bounds.left().floor() as i64;
    let top = bounds.top().floor() as i64;
    let right = bounds.right().ceil() as i64;
    let bottom = bounds.bottom().ceil() as i64;

    let rows = canvas.rows();
    if right <= 0
        || left >= canvas.width() as i64
        || bottom <= rows.start as i64
        || top >= rows.end as i64
    {
        return;
    }

    let width = (right - left).max(1) as u32;
    let height = (bottom - top).max(1) as u32;
    let Some(mut mask) = Mask::new(width, height) else {
        return;
    };
    mask.fill_path(
        path,
        FillRule::Winding,
        true,
        Transform::from_translate(-left as f32, -top as f32),
    );

    for (offset, coverage) in mask.data().iter().enumerate() {
        let x = left + (offset as u32 % width) as i64;
        let y = top + (offset as u32 / width) as i64;
        canvas.blend(x, y, *coverage, color);
    }
}
