//! Service wiring: turn parsed configuration into ready-to-serve routers.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use sqlx::PgPool;

use stockroom_auth::{PermissionCache, TokenVerification};
use stockroom_infra::{
    DirectorySeed, HttpInventoryLedger, InMemoryDirectory, InMemoryInventoryBook,
    InMemoryOrderStore, InMemoryPermissionCache, InventoryLedger, OrderStore, ReferenceDirectory,
    directory::PostgresDirectory, order_store::PostgresOrderStore,
};

use crate::config::{GatewayArgs, InventoryArgs, OrdersArgs};
use crate::gateway::{self, GatewayState, Upstreams};
use crate::inventory::{self, InventoryState};
use crate::middleware::AuthState;
use crate::orders::{self, OrdersState};

pub fn gateway_app(args: &GatewayArgs) -> anyhow::Result<Router> {
    let verification = match &args.jwt_secret {
        Some(secret) => TokenVerification::Hs256 {
            secret: secret.clone().into_bytes(),
        },
        None => {
            tracing::warn!(
                "GATEWAY_JWT_SECRET not set; bearer token signatures are NOT verified"
            );
            TokenVerification::Unverified
        }
    };

    let auth = AuthState {
        verification,
        enforce_expiry: args.enforce_expiry,
    };

    let state = GatewayState::new(
        Upstreams::new(&args.inventory_url, &args.orders_url),
        permission_cache(args)?,
    );

    tracing::info!(
        inventory = %args.inventory_url,
        orders = %args.orders_url,
        enforce_expiry = args.enforce_expiry,
        "gateway configured"
    );

    Ok(gateway::router(state, auth))
}

#[cfg(feature = "redis")]
fn permission_cache(args: &GatewayArgs) -> anyhow::Result<Arc<dyn PermissionCache>> {
    use stockroom_infra::permission_cache::RedisPermissionCache;

    if let Some(url) = &args.redis_url {
        let cache = RedisPermissionCache::new(url, args.permission_cache_ttl())
            .context("failed to open redis permission cache")?;
        tracing::info!("permission cache: redis");
        return Ok(Arc::new(cache));
    }
    Ok(Arc::new(InMemoryPermissionCache::new(args.permission_cache_ttl())))
}

#[cfg(not(feature = "redis"))]
fn permission_cache(args: &GatewayArgs) -> anyhow::Result<Arc<dyn PermissionCache>> {
    if args.redis_url.is_some() {
        tracing::warn!("GATEWAY_REDIS_URL set but redis feature not enabled, using in-memory cache");
    }
    Ok(Arc::new(InMemoryPermissionCache::new(args.permission_cache_ttl())))
}

pub async fn orders_app(args: &OrdersArgs) -> anyhow::Result<Router> {
    let ledger: Arc<dyn InventoryLedger> = Arc::new(HttpInventoryLedger::new(&args.inventory_url));

    let (store, directory): (Arc<dyn OrderStore>, Arc<dyn ReferenceDirectory>) =
        match &args.database_url {
            Some(url) => {
                let pool = PgPool::connect(url)
                    .await
                    .context("failed to connect to postgres")?;
                let store = PostgresOrderStore::new(pool.clone());
                store
                    .ensure_schema()
                    .await
                    .context("failed to create order tables")?;
                tracing::info!("order storage: postgres");
                (Arc::new(store), Arc::new(PostgresDirectory::new(pool)))
            }
            None => {
                let seed = match &args.directory_seed {
                    Some(path) => load_seed(path)?,
                    None => DirectorySeed::default(),
                };
                tracing::info!(
                    customers = seed.customers.len(),
                    staff = seed.staff.len(),
                    products = seed.products.len(),
                    "order storage: in-memory"
                );
                (
                    Arc::new(InMemoryOrderStore::new()),
                    Arc::new(InMemoryDirectory::from_seed(seed)),
                )
            }
        };

    Ok(orders::router(OrdersState::new(store, directory, ledger)))
}

fn load_seed(path: &std::path::Path) -> anyhow::Result<DirectorySeed> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read directory seed {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid directory seed {}", path.display()))
}

pub fn inventory_app(_args: &InventoryArgs) -> Router {
    inventory::router(InventoryState::new(Arc::new(InMemoryInventoryBook::new())))
}

/// Bind `listen` and serve `app` until ctrl-c.
pub async fn serve(listen: &str, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind {listen}"))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
