use crate::caption::{FontHandle, RenderConfig};
use crate::templates::TemplateRegistry;

/// Everything a request needs, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub(crate) templates: TemplateRegistry,
    pub(crate) font: FontHandle,
    pub(crate) render: RenderConfig,
}

impl ServerState {
    pub fn new(templates: TemplateRegistry, font: FontHandle, render: RenderConfig) -> Self {
        Self {
            templates,
            font,
            render,
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }
}
