//! API gateway: authenticates callers, enforces per-route permissions and
//! forwards matched requests to the inventory and order services.
//!
//! ```text
//! request
//!   ↓
//! match_route         unknown method/path ⇒ 404 (before authentication)
//!   ↓
//! auth_middleware     bearer token ⇒ claims in request extensions, else 401
//!   ↓
//! enforce_permission  route permission ∉ claims ⇒ 403
//!   ↓
//! proxy::forward      upstream response relayed, unreachable ⇒ 502
//! ```

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;

use stockroom_auth::PermissionCache;

use crate::middleware::{AuthState, auth_middleware};

pub mod guard;
pub mod identity;
pub mod proxy;
pub mod routes;

pub use routes::{GatewayRoute, RouteTable, Upstream};

/// Base URLs of the services behind the gateway.
#[derive(Debug, Clone)]
pub struct Upstreams {
    pub inventory: String,
    pub orders: String,
}

impl Upstreams {
    pub fn new(inventory: impl Into<String>, orders: impl Into<String>) -> Self {
        Self {
            inventory: inventory.into().trim_end_matches('/').to_string(),
            orders: orders.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self, upstream: Upstream) -> &str {
        match upstream {
            Upstream::Inventory => &self.inventory,
            Upstream::Orders => &self.orders,
        }
    }
}

#[derive(Clone)]
pub struct GatewayState {
    pub routes: Arc<RouteTable>,
    pub upstreams: Arc<Upstreams>,
    pub http: reqwest::Client,
    pub permission_cache: Arc<dyn PermissionCache>,
}

impl GatewayState {
    pub fn new(upstreams: Upstreams, permission_cache: Arc<dyn PermissionCache>) -> Self {
        Self {
            routes: Arc::new(RouteTable::default()),
            upstreams: Arc::new(upstreams),
            http: reqwest::Client::new(),
            permission_cache,
        }
    }
}

pub fn router(state: GatewayState, auth: AuthState) -> Router {
    let proxied = Router::new().fallback(proxy::forward).layer(
        ServiceBuilder::new()
            .layer(Extension(state.clone()))
            .layer(axum::middleware::from_fn(guard::match_route))
            .layer(axum::middleware::from_fn_with_state(
                auth.clone(),
                auth_middleware,
            ))
            .layer(axum::middleware::from_fn(guard::enforce_permission)),
    );

    let identity = Router::new()
        .route("/me", get(identity::me))
        .route("/me/permissions", get(identity::my_permissions))
        .route("/auth/logout", post(identity::logout))
        .route(
            "/auth/permission-cache/:user_id",
            delete(identity::invalidate_permission_cache),
        )
        .route_layer(axum::middleware::from_fn_with_state(auth, auth_middleware))
        .layer(Extension(state));

    Router::new()
        .route("/health", get(crate::health))
        .merge(identity)
        .fallback_service(proxied)
}
