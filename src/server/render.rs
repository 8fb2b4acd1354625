use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::caption::{encode_jpeg, render_captions};
use crate::templates::{Template, TemplateRegistry};

use super::models::CaptionRequest;
use super::state::ServerState;

#[derive(Debug)]
pub(crate) struct ServerError {
    pub(crate) status: StatusCode,
    pub(crate) message: String,
}

impl ServerError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::internal(format!("{:#}", err))
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        // Internal details stay in the log.
        let body = if self.status.is_server_error() {
            "500 internal server error\n".to_string()
        } else {
            self.message
        };
        (
            self.status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

pub(crate) fn not_found_body(templates: &TemplateRegistry) -> String {
    let mut body = String::from("404 not found\n\navailable templates:\n");
    for name in templates.names() {
        body.push_str(name);
        body.push('\n');
    }
    body
}

pub(crate) async fn render_caption(
    state: Arc<ServerState>,
    name: &str,
    request: CaptionRequest,
) -> Result<Vec<u8>, ServerError> {
    let template = state
        .templates
        .get(name)
        .cloned()
        .ok_or_else(|| ServerError::not_found(not_found_body(&state.templates)))?;
    tokio::task::spawn_blocking(move || caption_template(&state, &template, &request))
        .await
        .map_err(|err| ServerError::internal(format!("render task failed: {}", err)))?
}

fn caption_template(
    state: &ServerState,
    template: &Template,
    request: &CaptionRequest,
) -> Result<Vec<u8>, ServerError> {
    let mut image = template.load_image()?;
    render_captions(
        &mut image,
        &request.top_text,
        &request.bottom_text,
        &state.font,
        &state.render,
    );
    Ok(encode_jpeg(&image, state.render.quality)?)
}
