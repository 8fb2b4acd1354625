use std::ops::Range;

use image::RgbaImage;
use tracing::debug;

use super::compositor::{Canvas, draw_text};
use super::font::FontHandle;
use super::layout::{Anchor, layout_band};
use super::{Band, RenderConfig};

struct BandJob<'t> {
    band: Band,
    text: &'t str,
    anchor: Anchor,
}

impl BandJob<'_> {
    fn draw(&self, canvas: &mut Canvas<'_>, font: &FontHandle, config: &RenderConfig) {
        debug!(
            "caption: {} band at ({}, {}) rows {:?}",
            self.band,
            self.anchor.x,
            self.anchor.y,
            canvas.rows()
        );
        draw_text(canvas, self.anchor, self.text, font, config);
    }

    fn rows(&self, above: i32, below: i32) -> Range<i64> {
        let baseline = self.anchor.y as i64;
        baseline - above as i64..baseline + below as i64
    }
}

/// Draws the top and bottom captions into `image` in place.
///
/// When the two bands cannot touch the same rows the buffer is split between
/// them and both are drawn on scoped threads; the function returns only after
/// both have finished. Otherwise they are drawn one after the other. Either
/// way the resulting pixels are the same.
pub fn render_captions<'a>(
    image: &'a mut RgbaImage,
    top_text: &str,
    bottom_text: &str,
    font: &FontHandle,
    config: &RenderConfig,
) -> &'a mut RgbaImage {
    let (width, height) = image.dimensions();
    let top = BandJob {
        band: Band::Top,
        text: top_text,
        anchor: layout_band(Band::Top, top_text, width, height, font, config),
    };
    let bottom = BandJob {
        band: Band::Bottom,
        text: bottom_text,
        anchor: layout_band(Band::Bottom, bottom_text, width, height, font, config),
    };

    let (above, below) = font
        .scaled(config)
        .map(|scaled| scaled.vertical_extent())
        .unwrap_or((0, 0));
    let top_rows = top.rows(above, below);
    let bottom_rows = bottom.rows(above, below);

    let mut canvas = Canvas::new(&mut *image);
    if top_rows.end <= bottom_rows.start {
        let split = top_rows.end.clamp(0, height as i64) as u32;
        let (mut upper, mut lower) = canvas.split_at_row(split);
        std::thread::scope(|scope| {
            let top_task = scope.spawn(|| top.draw(&mut upper, font, config));
            bottom.draw(&mut lower, font, config);
            if let Err(panic) = top_task.join() {
                std::panic::resume_unwind(panic);
            }
        });
    } else {
        debug!(
            "caption: bands overlap ({:?} / {:?}), drawing sequentially",
            top_rows, bottom_rows
        );
        top.draw(&mut canvas, font, config);
        bottom.draw(&mut canvas, font, config);
    }
    image
}
