use anyhow::Context;
use verneg_core::config::load_config;
use verneg_logger::Logger;
use verneg_server::Server;
use verneg_server::config::AppConfig;

#[cfg(feature = "profiling")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(feature = "profiling")]
    let _profiler = dhat::Profiler::new_heap();

    let path = std::env::args().nth(1);
    let cfg: AppConfig = load_config(path).context("Critical: Configuration is malformed")?;

    let _log = Logger::from_settings(env!("CARGO_PKG_NAME"), &cfg.logging)?;

    Server::builder().config(cfg).build()?.run().await
}
