use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use image::{Rgba, RgbaImage};

use crate::caption::{FontHandle, encode_jpeg};

pub(crate) fn bundled_font_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("font.ttf")
}

pub(crate) fn bundled_font() -> FontHandle {
    static FONT: OnceLock<FontHandle> = OnceLock::new();
    FONT.get_or_init(|| FontHandle::load(&bundled_font_path()).expect("bundled font"))
        .clone()
}

/// Writes a dark gradient `<name>.jpg` into `dir`.
pub(crate) fn write_template(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 64) as u8, (y % 64) as u8, 32, 255])
    });
    let bytes = encode_jpeg(&image, 90).expect("encode template");
    let path = dir.join(format!("{}.jpg", name));
    std::fs::write(&path, bytes).expect("write template");
    path
}
