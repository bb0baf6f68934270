use clap::Parser;
use kutego::config::{CatConfig, setup_logging};
use tracing::error;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = kutego::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    let config = match CatConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            return;
        }
    };

    if let Err(err) = kutego::web::setup_server(&cli.listen_address, cli.port, config).await {
        error!("Application error: {}", err);
    }
}
