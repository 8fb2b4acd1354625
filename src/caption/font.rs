use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tiny_skia::{PathBuilder, Path as GlyphPath};
use ttf_parser::{Face, GlyphId, OutlineBuilder, name_id};

use super::{Hinting, RenderConfig};

#[derive(Debug, thiserror::Error)]
pub enum FontLoadError {
    #[error("failed to read font: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse font: {origin} ({reason})")]
    Parse { origin: String, reason: String },
}

/// Ascent and descent in whole pixels. Descent is positive (below the baseline).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontMetrics {
    pub ascent: i32,
    pub descent: i32,
}

/// An outline font loaded once and shared read-only between requests.
#[derive(Clone)]
pub struct FontHandle {
    data: Arc<Vec<u8>>,
    face_index: u32,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    y_min: i16,
    y_max: i16,
    family: Option<String>,
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontHandle")
            .field("family", &self.family)
            .field("face_index", &self.face_index)
            .field("units_per_em", &self.units_per_em)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl FontHandle {
    pub fn load(path: &Path) -> Result<Self, FontLoadError> {
        let data = std::fs::read(path).map_err(|source| FontLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(data, path.display().to_string())
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FontLoadError> {
        Self::parse(data, "<memory>".to_string())
    }

    fn parse(data: Vec<u8>, origin: String) -> Result<Self, FontLoadError> {
        let mut last_error = None;
        let count = ttf_parser::fonts_in_collection(&data).unwrap_or(1);
        for index in 0..count {
            match Face::parse(&data, index) {
                Ok(face) => {
                    let bbox = face.global_bounding_box();
                    let units_per_em = face.units_per_em().max(1);
                    let ascender = face.ascender();
                    let descender = face.descender();
                    let family = extract_family_name(&face);
                    return Ok(Self {
                        face_index: index,
                        units_per_em,
                        ascender,
                        descender,
                        y_min: bbox.y_min.min(descender),
                        y_max: bbox.y_max.max(ascender),
                        family,
                        data: Arc::new(data),
                    });
                }
                Err(err) => last_error = Some(err),
            }
        }
        let reason = last_error
            .map(|err| err.to_string())
            .unwrap_or_else(|| "no font faces found".to_string());
        Err(FontLoadError::Parse { origin, reason })
    }

    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub fn metrics(&self, config: &RenderConfig) -> FontMetrics {
        self.scaled(config)
            .map(|font| font.metrics())
            .unwrap_or_default()
    }

    /// Horizontal advance of `ch` in whole pixels; `(0, false)` when the font
    /// has no glyph for it.
    pub fn advance(&self, config: &RenderConfig, ch: char) -> (i32, bool) {
        self.scaled(config)
            .map(|font| font.rounded_advance(ch))
            .unwrap_or((0, false))
    }

    pub(crate) fn scaled(&self, config: &RenderConfig) -> Option<ScaledFont<'_>> {
        let face = Face::parse(&self.data, self.face_index).ok()?;
        Some(ScaledFont {
            face,
            handle: self,
            scale: config.pixels_per_em() / self.units_per_em as f32,
            hinting: config.hinting,
        })
    }
}

/// A parsed face bound to a pixel size.
pub(crate) struct ScaledFont<'a> {
    face: Face<'a>,
    handle: &'a FontHandle,
    scale: f32,
    hinting: Hinting,
}

impl ScaledFont<'_> {
    pub(crate) fn glyph(&self, ch: char) -> Option<GlyphId> {
        self.face.glyph_index(ch)
    }

    fn advance_units(&self, glyph: GlyphId) -> Option<u16> {
        self.face.glyph_hor_advance(glyph)
    }

    pub(crate) fn rounded_advance(&self, ch: char) -> (i32, bool) {
        let Some(units) = self.glyph(ch).and_then(|glyph| self.advance_units(glyph)) else {
            return (0, false);
        };
        (round_fixed(fixed_nearest(units as f32 * self.scale)), true)
    }

    /// Pen movement in pixels after drawing `glyph`.
    pub(crate) fn pen_advance(&self, glyph: GlyphId) -> f32 {
        let exact = self.advance_units(glyph).unwrap_or(0) as f32 * self.scale;
        match self.hinting {
            Hinting::None => exact,
            Hinting::Full => round_fixed(fixed_nearest(exact)) as f32,
        }
    }

    pub(crate) fn metrics(&self) -> FontMetrics {
        FontMetrics {
            ascent: round_fixed(fixed_ceil(self.handle.ascender as f32 * self.scale)),
            descent: round_fixed(fixed_ceil(-(self.handle.descender as f32) * self.scale)),
        }
    }

    /// Rows any glyph can cover above and below its baseline.
    pub(crate) fn vertical_extent(&self) -> (i32, i32) {
        let above = (self.handle.y_max as f32 * self.scale).ceil() as i32 + 1;
        let below = (-(self.handle.y_min as f32) * self.scale).ceil() as i32 + 1;
        (above.max(0), below.max(0))
    }

    /// Outline of `glyph` in device pixels with its origin at `(x, baseline)`.
    /// Returns `None` for glyphs without contours (e.g. space).
    pub(crate) fn outline(&self, glyph: GlyphId, x: f32, baseline: f32) -> Option<GlyphPath> {
        let mut sink = PathSink {
            builder: PathBuilder::new(),
            scale: self.scale,
            origin_x: x,
            baseline,
        };
        self.face.outline_glyph(glyph, &mut sink)?;
        sink.builder.finish()
    }
}

struct PathSink {
    builder: PathBuilder,
    scale: f32,
    origin_x: f32,
    baseline: f32,
}

impl PathSink {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.baseline - y * self.scale)
    }
}

impl OutlineBuilder for PathSink {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

// Pixel quantities are quantised to 26.6 fixed point, then rounded to whole
// pixels half-up.
fn fixed_nearest(pixels: f32) -> i32 {
    (pixels * 64.0).round() as i32
}

fn fixed_ceil(pixels: f32) -> i32 {
    (pixels * 64.0).ceil() as i32
}

fn round_fixed(value: i32) -> i32 {
    (value + 32) >> 6
}

fn extract_family_name(face: &Face<'_>) -> Option<String> {
    let mut fallback = None;
    for name in face.names() {
        if name.name_id == name_id::TYPOGRAPHIC_FAMILY {
            if let Some(value) = name.to_string() {
                return Some(value);
            }
        } else if name.name_id == name_id::FAMILY && fallback.is_none() {
            fallback = name.to_string();
        }
    }
    fallback
}
