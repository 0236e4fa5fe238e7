use anyhow::Context;
use brgy::domain::config::ApiConfig;
use brgy::kernel::config::load_config;
use brgy_logger::Logger;
use brgy_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg: ApiConfig = load_config(Some("server")).context("Critical: Configuration is malformed")?;

    let logging = &cfg.logging;
    let mut logger = Logger::builder(env!("CARGO_PKG_NAME")).level_name(&logging.level)?.json(logging.json);
    if let Some(filter) = &logging.env_filter {
        logger = logger.env_filter(filter);
    }
    if let Some(directory) = &logging.directory {
        logger = logger.path(directory);
    }
    let _log = logger.init()?;

    Server::builder().config(cfg).build().await?.run().await
}
