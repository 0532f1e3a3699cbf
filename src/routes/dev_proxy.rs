//! Passthrough de desarrollo
//!
//! Las peticiones a `{prefix}/...` se reenvían a la API remota quitando el
//! prefijo. Sólo tiene sentido en desarrollo local.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{HeaderMap, HeaderName},
    response::Response,
    routing::any,
    Router,
};

use crate::state::AppState;
use crate::utils::errors::{internal_error, AppError};

/// Límite del cuerpo reenviado (2 MiB)
const MAX_FORWARD_BODY: usize = 2 * 1024 * 1024;

const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

pub fn create_dev_proxy_router(prefix: &str) -> Router<AppState> {
    Router::new()
        .route(prefix, any(forward))
        .route(&format!("{}/*path", prefix), any(forward))
}

/// URL remota para una ruta local: se quita el prefijo y se conserva la query.
/// `None` si la ruta no empieza por el prefijo.
pub fn upstream_url(base_url: &str, prefix: &str, path_and_query: &str) -> Option<String> {
    let rest = path_and_query.strip_prefix(prefix)?;
    if !(rest.is_empty() || rest.starts_with('/') || rest.starts_with('?')) {
        return None;
    }

    let base = base_url.trim_end_matches('/');
    Some(if rest.is_empty() || rest.starts_with('?') {
        format!("{}/{}", base, rest)
    } else {
        format!("{}{}", base, rest)
    })
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

fn end_to_end_headers(headers: &HeaderMap) -> impl Iterator<Item = (&HeaderName, &axum::http::HeaderValue)> {
    headers.iter().filter(|(name, _)| !is_hop_by_hop(name))
}

async fn forward(State(state): State<AppState>, request: Request) -> Result<Response, AppError> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| parts.uri.path());

    let url = upstream_url(
        &state.config.api_base_url,
        &state.config.dev_proxy_prefix,
        path_and_query,
    )
    .ok_or_else(|| internal_error("ruta fuera del prefijo del proxy"))?;

    log::info!("🔀 {} {} -> {}", parts.method, path_and_query, url);

    let body = to_bytes(body, MAX_FORWARD_BODY)
        .await
        .map_err(|e| AppError::Internal(format!("cuerpo ilegible: {}", e)))?;

    let mut upstream = state.http_client.request(parts.method.clone(), &url);
    for (name, value) in end_to_end_headers(&parts.headers) {
        upstream = upstream.header(name, value);
    }

    let response = upstream.body(body).send().await?;
    let status = response.status();
    log::info!("📡 Upstream respondió {}", status);

    let mut builder = Response::builder().status(status);
    for (name, value) in end_to_end_headers(response.headers()) {
        builder = builder.header(name, value);
    }
    let bytes = response.bytes().await?;

    builder
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(e.to_string()))
}
