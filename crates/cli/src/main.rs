//! House Price Prediction CLI
//!
//! A command-line tool for listing models, inspecting features, and
//! requesting predictions from the House Price Prediction API.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{features, health, models, predict};

/// House Price Prediction CLI
#[derive(Parser)]
#[command(name = "hpp")]
#[command(author, version, about = "CLI for the House Price Prediction API", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via HPP_API_URL env var)
    #[arg(long, env = "HPP_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available models and their metrics
    Models,

    /// Show feature defaults and importances
    Features {
        /// Show only the best model's top features by importance
        #[arg(long)]
        top: bool,
    },

    /// Request a house price prediction
    Predict {
        /// Feature value, repeatable (e.g. --feature LotArea=9000)
        #[arg(long = "feature", short = 'F', value_name = "KEY=VALUE")]
        features: Vec<String>,

        /// Model to use (best model by test MAE when omitted)
        #[arg(long)]
        model: Option<String>,
    },

    /// Check service health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let client = client::ApiClient::new(&cli.api_url)?;

    match cli.command {
        Commands::Models => {
            models::list_models(&client, cli.format).await?;
        }
        Commands::Features { top } => {
            features::show_features(&client, top, cli.format).await?;
        }
        Commands::Predict { features, model } => {
            predict::predict(&client, &features, model, cli.format).await?;
        }
        Commands::Health => {
            health::check_health(&client, cli.format).await?;
        }
    }

    Ok(())
}
