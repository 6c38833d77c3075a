use anyhow::Result;
use mapkey::Config;
use mapkey::config::Mode;
use mapkey::inject::CONFIRMATION;
use mapkey::pipeline::inject_site;
use mapkey::server;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_cli()?;
    init_logging(&config);
    match &config.mode {
        Mode::Inject => {
            inject_site(&config)?;
            println!("{CONFIRMATION}");
            Ok(())
        }
        Mode::Serve(_) => server::run_server(config).await,
    }
}

fn init_logging(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
