use std::error::Error;

use clap::Parser;
use ingest_server::{CannedHandler, Options, Server, ServerConfig, ShutdownContext};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let options = Options::parse();

    let subscriber = FmtSubscriber::builder().with_max_level(options.max_level()).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = ServerConfig::from(options);
    info!(address = %config.address, echo = config.echo, "initializing server");

    let server = Server::builder().config(&config).handler(CannedHandler::new(config.echo)).build()?;

    let shutdown = ShutdownContext::new();
    shutdown.listen_for_signals();

    server.start(shutdown).await?;
    info!("server stopped");
    Ok(())
}
