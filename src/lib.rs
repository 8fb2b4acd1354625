use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

pub mod caption;
pub mod logging;
pub mod server;
pub mod settings;
pub mod templates;

#[cfg(test)]
mod test_util;

pub use caption::{FontHandle, RenderConfig, render_captions};
pub use server::ServerState;
pub use settings::Settings;
pub use templates::TemplateRegistry;

/// Command-line overrides applied on top of the loaded settings.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub templates_dir: Option<String>,
    pub font_path: Option<String>,
    pub settings_path: Option<String>,
}

pub async fn run(config: Config) -> Result<()> {
    let settings = resolve_settings(&config)?;
    let state = load_state(&settings)?;
    server::run_server(state, settings.addr()).await
}

pub fn resolve_settings(config: &Config) -> Result<Settings> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let mut settings = settings::load_settings(settings_path)?;
    if let Some(host) = config.host.as_deref() {
        settings.host = host.to_string();
    }
    if let Some(port) = config.port {
        settings.port = port;
    }
    if let Some(dir) = config.templates_dir.as_deref() {
        settings.templates_dir = PathBuf::from(dir);
    }
    if let Some(path) = config.font_path.as_deref() {
        settings.font_path = PathBuf::from(path);
    }
    Ok(settings)
}

/// Loads the font and scans the templates. Any failure here means the
/// service cannot start.
pub fn load_state(settings: &Settings) -> Result<ServerState> {
    let font = FontHandle::load(&settings.font_path).with_context(|| "failed to load caption font")?;
    info!(
        "font: {} ({})",
        settings.font_path.display(),
        font.family().unwrap_or("unknown family")
    );
    let templates = TemplateRegistry::scan(&settings.templates_dir)?;
    info!(
        "templates: {} found in {}",
        templates.len(),
        templates.dir().display()
    );
    Ok(ServerState::new(templates, font, settings.render.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{bundled_font_path, write_template};
    use tempfile::tempdir;

    fn settings_for(dir: &Path) -> Settings {
        Settings {
            templates_dir: dir.to_path_buf(),
            font_path: bundled_font_path(),
            ..Settings::default()
        }
    }

    #[test]
    fn cli_values_override_settings() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[server]\nport = 9000\nhost = \"127.0.0.1\"\n").expect("write");
        let config = Config {
            port: Some(8080),
            templates_dir: Some("/srv/memes".to_string()),
            settings_path: Some(path.to_string_lossy().to_string()),
            ..Config::default()
        };
        let settings = resolve_settings(&config).expect("settings");
        assert_eq!(settings.addr(), "127.0.0.1:8080");
        assert_eq!(settings.templates_dir, PathBuf::from("/srv/memes"));
    }

    #[test]
    fn load_state_reads_font_and_templates() {
        let dir = tempdir().expect("tempdir");
        write_template(dir.path(), "roll_safe", 16, 16);
        let state = load_state(&settings_for(dir.path())).expect("state");
        assert_eq!(state.templates().len(), 1);
    }

    #[test]
    fn startup_fails_without_font() {
        let dir = tempdir().expect("tempdir");
        write_template(dir.path(), "roll_safe", 16, 16);
        let settings = Settings {
            font_path: dir.path().join("missing.ttf"),
            ..settings_for(dir.path())
        };
        let err = load_state(&settings).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to read font"));
    }

    #[test]
    fn startup_fails_without_templates() {
        let dir = tempdir().expect("tempdir");
        let err = load_state(&settings_for(dir.path())).unwrap_err();
        assert!(err.to_string().contains("no .jpg templates"));
    }
}
