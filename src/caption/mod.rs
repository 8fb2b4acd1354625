//! Caption engine: font metrics, text layout, glyph compositing and the
//! two-band pipeline that puts top and bottom text on a template image.

mod compositor;
mod encode;
mod font;
mod layout;
mod pipeline;

use std::fmt;
use std::str::FromStr;

pub use compositor::{Canvas, draw_text};
pub use encode::encode_jpeg;
pub use font::{FontHandle, FontLoadError, FontMetrics};
pub use layout::{Anchor, layout_band, measure, place_anchor};
pub use pipeline::render_captions;

/// Hinting applied when advancing the pen between glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hinting {
    /// Pen advances by the exact scaled advance.
    #[default]
    None,
    /// Pen advances snap to whole pixels.
    Full,
}

impl FromStr for Hinting {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Hinting::None),
            "full" => Ok(Hinting::Full),
            other => Err(format!("unknown hinting mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);

    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn parse_hex(value: &str) -> Option<Rgb> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Rgb(r, g, b))
    }
}

/// Process-wide rendering parameters, fixed once the server starts.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Distance in pixels of the caption baselines from the top/bottom edge.
    pub offset: i32,
    pub font_size: f32,
    pub dpi: f32,
    pub hinting: Hinting,
    pub foreground: Rgb,
    /// JPEG quality, 1..=100.
    pub quality: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            offset: 75,
            font_size: 42.0,
            dpi: 72.0,
            hinting: Hinting::None,
            foreground: Rgb::WHITE,
            quality: 65,
        }
    }
}

impl RenderConfig {
    pub(crate) fn pixels_per_em(&self) -> f32 {
        self.font_size * self.dpi / 72.0
    }
}

/// One of the two caption regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Top,
    Bottom,
}

impl Band {
    pub fn as_str(self) -> &'static str {
        match self {
            Band::Top => "top",
            Band::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid caption band '{0}' (expected \"top\" or \"bottom\")")]
pub struct InvalidBandError(pub String);

impl FromStr for Band {
    type Err = InvalidBandError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "top" => Ok(Band::Top),
            "bottom" => Ok(Band::Bottom),
            other => Err(InvalidBandError(other.to_string())),
        }
    }
}
