use clap::{Parser, Subcommand};
use serde::Serialize;
use storefront_discovery::{config::DiscoveryConfig, context::AppContext};

mod index;
mod logging;
mod query;

#[derive(Debug, Parser)]
#[command(
    name = "storefront-discovery",
    about = "Product search, recommendations and view statistics",
    long_about = None
)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: DiscoveryConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage the search index
    Index(index::IndexCommand),
    /// Search active products
    Search(query::SearchArgs),
    /// Complete a partial product name
    Suggest(query::SuggestArgs),
    /// Products similar to a given product
    Similar(query::SimilarArgs),
    /// View statistics
    Stats(query::StatsArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        logging::init(&self.config.logging)?;

        let ctx = AppContext::from_config(&self.config)
            .await
            .map_err(|error| format!("failed to initialise: {error}"))?;

        match self.command {
            Commands::Index(command) => index::run(&ctx, command).await,
            Commands::Search(args) => query::search(&ctx, args).await,
            Commands::Suggest(args) => query::suggest(&ctx, args).await,
            Commands::Similar(args) => query::similar(&ctx, args).await,
            Commands::Stats(args) => query::stats(&ctx, args).await,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|error| format!("failed to encode output: {error}"))?;

    println!("{json}");

    Ok(())
}
