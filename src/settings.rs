use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::caption::{Hinting, RenderConfig, Rgb};

/// Largest accepted `[render] offset`, in pixels.
const MAX_RENDER_OFFSET: i32 = 10_000;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub templates_dir: PathBuf,
    pub font_path: PathBuf,
    pub render: RenderConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            templates_dir: PathBuf::from("./memes"),
            font_path: PathBuf::from("./font.ttf"),
            render: RenderConfig::default(),
        }
    }
}

impl Settings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    server: Option<ServerSettings>,
    render: Option<RenderSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSettings {
    host: Option<String>,
    port: Option<u16>,
    templates_dir: Option<String>,
    font_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RenderSettings {
    offset: Option<i32>,
    font_size: Option<f32>,
    dpi: Option<f32>,
    hinting: Option<String>,
    foreground: Option<String>,
    quality: Option<u8>,
}

/// Defaults, then `settings.toml` and `settings.local.toml` from the working
/// directory, then `extra_path` if given.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut ordered_paths = vec![
        PathBuf::from("settings.toml"),
        PathBuf::from("settings.local.toml"),
    ];
    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }
    load_settings_from(&ordered_paths)
}

pub(crate) fn load_settings_from(paths: &[PathBuf]) -> Result<Settings> {
    let mut settings = Settings::default();
    for path in paths {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }
    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(server) = incoming.server {
            if let Some(host) = server.host {
                if !host.trim().is_empty() {
                    self.host = host.trim().to_string();
                }
            }
            if let Some(port) = server.port {
                self.port = port;
            }
            if let Some(dir) = server.templates_dir {
                if !dir.trim().is_empty() {
                    self.templates_dir = PathBuf::from(dir);
                }
            }
            if let Some(path) = server.font_path {
                if !path.trim().is_empty() {
                    self.font_path = PathBuf::from(path);
                }
            }
        }
        if let Some(render) = incoming.render {
            if let Some(offset) = render.offset {
                if (0..=MAX_RENDER_OFFSET).contains(&offset) {
                    self.render.offset = offset;
                }
            }
            if let Some(size) = render.font_size {
                if size > 0.0 {
                    self.render.font_size = size;
                }
            }
            if let Some(dpi) = render.dpi {
                if dpi > 0.0 {
                    self.render.dpi = dpi;
                }
            }
            if let Some(hinting) = render.hinting {
                if let Ok(hinting) = hinting.parse::<Hinting>() {
                    self.render.hinting = hinting;
                }
            }
            if let Some(color) = render.foreground {
                if let Some(color) = Rgb::parse_hex(&color) {
                    self.render.foreground = color;
                }
            }
            if let Some(quality) = render.quality {
                if (1..=100).contains(&quality) {
                    self.render.quality = quality;
                }
            }
        }
    }
}
