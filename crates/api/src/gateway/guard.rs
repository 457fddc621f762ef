//! Route matching and permission enforcement for proxied requests.

use axum::{
    Extension,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::Instrument;

use stockroom_auth::{RequiresPermission, authorize};

use crate::context::ClaimsContext;
use crate::errors::ApiError;

use super::{GatewayRoute, GatewayState};

/// The route table entry a request matched, attached for later layers.
#[derive(Debug, Clone)]
pub struct MatchedRoute(pub GatewayRoute);

pub async fn match_route(
    Extension(state): Extension<GatewayState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(route) = state.routes.find(req.method(), req.uri().path()).cloned() else {
        return ApiError::NotFound(format!(
            "no route for {} {}",
            req.method(),
            req.uri().path()
        ))
        .into_response();
    };

    let span = tracing::info_span!(
        "gateway",
        method = %req.method(),
        path = %req.uri().path(),
        route = route.pattern,
    );
    req.extensions_mut().insert(MatchedRoute(route));

    next.run(req).instrument(span).await
}

/// Runs after authentication: claims are already in the request extensions.
pub async fn enforce_permission(req: Request, next: Next) -> Response {
    let (Some(MatchedRoute(route)), Some(ctx)) = (
        req.extensions().get::<MatchedRoute>(),
        req.extensions().get::<ClaimsContext>(),
    ) else {
        // Layer ordering bug, not a caller error; fail closed.
        return ApiError::Internal("gateway guard ran without route or claims".to_string())
            .into_response();
    };

    if let Err(err) = authorize(ctx.claims(), route.required_permission()) {
        tracing::info!(subject = %ctx.subject(), route = route.pattern, "permission denied");
        return ApiError::from(err).into_response();
    }

    next.run(req).await
}
