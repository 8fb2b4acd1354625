use anyhow::{Context, Result};
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use super::models::{CaptionQuery, CaptionRequest};
use super::render::render_caption;
use super::state::ServerState;

pub async fn run_server(state: ServerState, addr: String) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind server address: {}", addr))?;
    info!("listening on {}", addr);
    serve(listener, state).await
}

/// Serves on an already bound listener until the process stops.
pub async fn serve(listener: tokio::net::TcpListener, state: ServerState) -> Result<()> {
    let app = router(Arc::new(state));
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/favicon.ico", get(favicon))
        .route("/", get(index))
        .route("/:template", get(caption))
        .fallback(fallback)
        .with_state(state)
}

async fn favicon() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn index(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    handle_caption(state, remote, String::new(), query).await
}

async fn caption(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    Path(template): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    handle_caption(state, remote, template, query).await
}

/// Any other path, e.g. `/a/b` or `/roll_safe/`, names a template that cannot
/// exist and gets the usual 404 listing.
async fn fallback(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    uri: Uri,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let template = uri.path().strip_prefix('/').unwrap_or(uri.path()).to_string();
    handle_caption(state, remote, template, query).await
}

async fn handle_caption(
    state: Arc<ServerState>,
    remote: SocketAddr,
    template: String,
    query: Vec<(String, String)>,
) -> Response {
    let request_id = Uuid::new_v4();
    let request = CaptionRequest::from(CaptionQuery::from_pairs(query));
    info!(
        "{} request: remote={} template={} top_text={:?} bottom_text={:?}",
        request_id, remote, template, request.top_text, request.bottom_text
    );

    match render_caption(state, &template, request).await {
        Ok(bytes) => {
            info!("{} generated meme, length: {}", request_id, bytes.len());
            jpeg_response(bytes)
        }
        Err(err) => {
            if err.status == StatusCode::NOT_FOUND {
                info!("{} 404 template={}", request_id, template);
            } else {
                error!("{} {} {}", request_id, err.status.as_u16(), err.message);
            }
            err.into_response()
        }
    }
}

fn jpeg_response(bytes: Vec<u8>) -> Response {
    let length = HeaderValue::from(bytes.len());
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg")),
            (header::CONTENT_LENGTH, length),
        ],
        bytes,
    )
        .into_response()
}
