use stockroom_api::config::{Cli, Service};
use stockroom_api::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::load().unwrap_or_else(|e| e.exit());
    stockroom_observability::init(cli.log_format);

    match cli.service {
        Service::Gateway(args) => {
            let app = server::gateway_app(&args)?;
            server::serve(&args.listen, app).await
        }
        Service::Orders(args) => {
            let app = server::orders_app(&args).await?;
            server::serve(&args.listen, app).await
        }
        Service::Inventory(args) => {
            let app = server::inventory_app(&args);
            server::serve(&args.listen, app).await
        }
    }
}
