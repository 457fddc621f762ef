//! Forward a matched request to its upstream and relay the answer.

use axum::{
    Extension,
    body::{Body, to_bytes},
    extract::Request,
    http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    response::Response,
};

use crate::errors::ApiError;

use super::GatewayState;
use super::guard::MatchedRoute;

/// Largest request body the gateway buffers before forwarding.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub async fn forward(
    Extension(state): Extension<GatewayState>,
    Extension(MatchedRoute(route)): Extension<MatchedRoute>,
    req: Request,
) -> Result<Response, ApiError> {
    let (parts, body) = req.into_parts();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{}", state.upstreams.base_url(route.upstream), path_and_query);

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read request body: {e}")))?;

    let mut upstream = state.http.request(parts.method.clone(), &url).body(body);
    for name in [AUTHORIZATION, CONTENT_TYPE, ACCEPT] {
        if let Some(value) = parts.headers.get(&name) {
            upstream = upstream.header(name, value.clone());
        }
    }

    let response = upstream.send().await.map_err(|e| {
        tracing::warn!(upstream = ?route.upstream, url = %url, error = %e, "upstream unreachable");
        ApiError::BadGateway(format!("{:?} service is unavailable", route.upstream))
    })?;

    let status = response.status();
    let content_type = response.headers().get(CONTENT_TYPE).cloned();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::BadGateway(format!("failed to read upstream response: {e}")))?;

    tracing::debug!(upstream = ?route.upstream, status = status.as_u16(), "relayed upstream response");

    let mut relayed = Response::builder().status(status);
    if let Some(content_type) = content_type {
        relayed = relayed.header(CONTENT_TYPE, content_type);
    }
    relayed
        .body(Body::from(bytes))
        .map_err(|e| ApiError::Internal(format!("failed to build relayed response: {e}")))
}
