use super::font::FontHandle;
use super::{Band, RenderConfig};

/// Baseline-left drawing origin of a caption, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub x: i32,
    pub y: i32,
}

/// Total advance width of `text` in whole pixels. Characters the font cannot
/// render contribute nothing.
pub fn measure(text: &str, font: &FontHandle, config: &RenderConfig) -> i32 {
    let Some(font) = font.scaled(config) else {
        return 0;
    };
    text.chars()
        .map(|ch| font.rounded_advance(ch).0)
        .fold(0i32, i32::saturating_add)
}

/// Horizontally centred, vertically offset from the band's edge. `x` goes
/// negative when the text is wider than the image; nothing is clamped.
pub fn place_anchor(
    band: Band,
    image_width: i32,
    image_height: i32,
    total_width: i32,
    offset: i32,
    ascent: i32,
    descent: i32,
) -> Anchor {
    let x = image_width.saturating_sub(total_width) / 2;
    let y = match band {
        Band::Top => offset,
        Band::Bottom => {
            image_height.saturating_sub(offset.saturating_sub(ascent).saturating_add(descent))
        }
    };
    Anchor { x, y }
}

pub fn layout_band(
    band: Band,
    text: &str,
    image_width: u32,
    image_height: u32,
    font: &FontHandle,
    config: &RenderConfig,
) -> Anchor {
    let width = measure(text, font, config);
    let metrics = font.metrics(config);
    place_anchor(
        band,
        clamp_dimension(image_width),
        clamp_dimension(image_height),
        width,
        config.offset,
        metrics.ascent,
        metrics.descent,
    )
}

fn clamp_dimension(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
