use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weather_history::constants::DEFAULT_CONFIG_PATH;
use weather_history::{Config, PageBuilder, ProviderKind};

#[derive(Debug, Parser)]
#[clap(name = "weather-history", version = clap::crate_version!())]
struct WeatherHistoryApplication {
    /// Page configuration file (TOML)
    #[clap(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Weather provider to use instead of the one in the config file
    #[clap(long, value_enum)]
    provider: Option<ProviderKind>,

    /// Write the page here instead of the configured output path
    #[clap(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_history=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let opts = WeatherHistoryApplication::parse();
    let mut config = Config::load(&opts.config)?;
    if let Some(provider) = opts.provider {
        config.provider = provider;
    }
    if let Some(output) = opts.output {
        config.output = output;
    }

    tracing::info!(
        config = %opts.config.display(),
        provider = ?config.provider,
        locations = config.locations.len(),
        "building page"
    );

    let mut builder = PageBuilder::from_config(&config).await?;
    let summary = builder.build(&config.locations).await?;

    tracing::info!(
        output = %summary.output.display(),
        locations = summary.locations,
        months = summary.months,
        "build complete"
    );
    Ok(())
}
