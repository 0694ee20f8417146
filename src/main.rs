use anyhow::Context;
use clap::Parser;
use tracing::info;

use go_cooldown::config::Settings;
use go_cooldown::proxy::server::ProxyServer;

#[derive(Parser)]
#[command(name = "go-cooldown")]
#[command(version, about = "Go module proxy that hides versions newer than a cooldown period")]
struct Cli {
    #[command(flatten)]
    settings: Settings,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = go_cooldown::logging::init(cli.settings.log_format);

    let config = cli
        .settings
        .into_config()
        .context("invalid configuration")?;

    info!(
        port = config.port,
        upstream = %config.upstream,
        cache_size = config.cache_size,
        default_cooldown = %config.default_cooldown,
        "starting go-cooldown proxy"
    );

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let server = ProxyServer::new(config).context("failed to initialize proxy")?;
            server.run().await.context("server failed")
        })
}
