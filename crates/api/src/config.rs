//! Command-line and environment configuration for the three services.
//!
//! One binary, one subcommand per service. Every flag can also be set from
//! the environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use stockroom_observability::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "stockroom", about = "Stockroom gateway, order and inventory services", long_about = None)]
pub struct Cli {
    /// Log output format: `json` or `pretty`.
    #[arg(long, env = "LOG_FORMAT", default_value = "json", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub service: Service,
}

impl Cli {
    pub fn load() -> Result<Self, clap::Error> {
        Self::try_parse()
    }
}

#[derive(Debug, Subcommand)]
pub enum Service {
    /// Authenticating, authorizing reverse proxy.
    Gateway(GatewayArgs),
    /// Order service.
    Orders(OrdersArgs),
    /// Inventory service.
    Inventory(InventoryArgs),
}

#[derive(Debug, Clone, Args)]
pub struct GatewayArgs {
    #[arg(long, env = "GATEWAY_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: String,

    #[arg(long, env = "GATEWAY_INVENTORY_URL", default_value = "http://127.0.0.1:8082")]
    pub inventory_url: String,

    #[arg(long, env = "GATEWAY_ORDERS_URL", default_value = "http://127.0.0.1:8081")]
    pub orders_url: String,

    /// HS256 secret. Unset means bearer tokens are decoded without
    /// signature verification.
    #[arg(long, env = "GATEWAY_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Reject tokens whose `exp` is in the past.
    #[arg(long, env = "GATEWAY_ENFORCE_EXPIRY", default_value_t = false)]
    pub enforce_expiry: bool,

    /// Permission cache entry lifetime, in seconds.
    #[arg(long, env = "GATEWAY_PERMISSION_CACHE_TTL", default_value_t = 3600)]
    pub permission_cache_ttl: u64,

    /// Redis URL for the permission cache. Only read when built with the
    /// `redis` feature; otherwise an in-process cache is used.
    #[arg(long, env = "GATEWAY_REDIS_URL")]
    pub redis_url: Option<String>,
}

impl GatewayArgs {
    pub fn permission_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.permission_cache_ttl)
    }
}

#[derive(Debug, Clone, Args)]
pub struct OrdersArgs {
    #[arg(long, env = "ORDERS_LISTEN", default_value = "0.0.0.0:8081")]
    pub listen: String,

    /// Inventory service root used for stock movements and reconciliation.
    #[arg(long, env = "ORDERS_INVENTORY_URL", default_value = "http://127.0.0.1:8082")]
    pub inventory_url: String,

    /// Postgres connection string. Unset means in-memory storage.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// JSON file of known customer, staff and product ids, used by the
    /// in-memory directory.
    #[arg(long, env = "ORDERS_DIRECTORY_SEED")]
    pub directory_seed: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct InventoryArgs {
    #[arg(long, env = "INVENTORY_LISTEN", default_value = "0.0.0.0:8082")]
    pub listen: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_defaults() {
        let cli = Cli::try_parse_from(["stockroom", "gateway"]).unwrap();
        let Service::Gateway(args) = cli.service else {
            panic!("expected gateway subcommand");
        };
        assert_eq!(args.listen, "0.0.0.0:8080");
        assert_eq!(args.permission_cache_ttl(), Duration::from_secs(3600));
        assert!(!args.enforce_expiry);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "stockroom",
            "--log-format",
            "pretty",
            "orders",
            "--listen",
            "127.0.0.1:9000",
            "--directory-seed",
            "seed.json",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Pretty);
        let Service::Orders(args) = cli.service else {
            panic!("expected orders subcommand");
        };
        assert_eq!(args.listen, "127.0.0.1:9000");
        assert_eq!(args.directory_seed, Some(PathBuf::from("seed.json")));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(Cli::try_parse_from(["stockroom", "--log-format", "xml", "inventory"]).is_err());
    }
}
