use anyhow::{Context, Result, anyhow};
use image::RgbaImage;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const TEMPLATE_EXTENSION: &str = ".jpg";

#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    path: PathBuf,
}

impl Template {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decodes the template from disk into a fresh RGBA buffer.
    pub fn load_image(&self) -> Result<RgbaImage> {
        let image = image::open(&self.path)
            .with_context(|| format!("failed to decode template: {}", self.path.display()))?;
        Ok(image.to_rgba8())
    }
}

/// Templates discovered once at startup; read-only afterwards.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    dir: PathBuf,
    templates: BTreeMap<String, Template>,
}

impl TemplateRegistry {
    pub fn scan(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("failed to read template directory: {}", dir.display()))?;
        let mut templates = BTreeMap::new();
        for entry in entries {
            let entry = entry.with_context(|| "failed to read template directory entry")?;
            let file_type = entry
                .file_type()
                .with_context(|| "failed to read file type")?;
            if !file_type.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Some(name) = file_name.strip_suffix(TEMPLATE_EXTENSION) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            templates.insert(
                name.to_string(),
                Template {
                    name: name.to_string(),
                    path: entry.path(),
                },
            );
        }
        if templates.is_empty() {
            return Err(anyhow!(
                "no {} templates found in {}",
                TEMPLATE_EXTENSION,
                dir.display()
            ));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            templates,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Template names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
