//! Prediction CLI
//!
//! Runs KNN and polynomial regression predictions against the prediction
//! server, or in-process with `--offline`.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::predict::{self, Backend, EngineKind};
use commands::status;
use predict_lib::{DistanceMetric, Mode};

/// KNN and polynomial regression predictions
#[derive(Parser)]
#[command(name = "predict")]
#[command(author, version, about = "CLI for the KNN and regression prediction service", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via PREDICT_API_URL env var)
    #[arg(long, env = "PREDICT_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Run the engines in-process instead of calling the server
    #[arg(long)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify or average a query from its nearest neighbors
    Knn {
        /// Training rows, e.g. "0,0,A;0,1,A;5,5,B"
        #[arg(long)]
        points: String,

        /// Query coordinates, e.g. "0,0.5"
        #[arg(long)]
        query: String,

        /// Number of neighbors
        #[arg(short)]
        k: Option<usize>,

        /// Distance metric (euclidean, manhattan)
        #[arg(long)]
        metric: Option<DistanceMetric>,

        /// classify (majority label) or regress (mean target)
        #[arg(long)]
        mode: Option<Mode>,
    },

    /// Fit a polynomial and evaluate it at x
    Regress {
        /// Training rows as x,y pairs, e.g. "0,0;1,2;2,4"
        #[arg(long)]
        points: String,

        /// Value to predict at
        #[arg(long, allow_negative_numbers = true)]
        x: f64,

        /// Polynomial degree
        #[arg(long)]
        degree: Option<usize>,
    },

    /// Print a ready-made request for an engine
    Sample {
        #[arg(value_enum)]
        engine: EngineKind,
    },

    /// Show server health
    Health,
}

async fn run(cli: Cli) -> Result<()> {
    let backend = if cli.offline {
        Backend::Offline
    } else {
        Backend::Remote(client::ApiClient::new(&cli.api_url)?)
    };

    match cli.command {
        Commands::Knn {
            points,
            query,
            k,
            metric,
            mode,
        } => {
            let request = predict::knn_request(&points, &query, k, metric, mode)?;
            predict::run_knn(&backend, request, cli.format).await?;
        }
        Commands::Regress { points, x, degree } => {
            let request = predict::regression_request(&points, x, degree);
            predict::run_regression(&backend, request, cli.format).await?;
        }
        Commands::Sample { engine } => {
            predict::show_sample(&backend, engine).await?;
        }
        Commands::Health => match &backend {
            Backend::Remote(client) => status::show_health(client, cli.format).await?,
            Backend::Offline => anyhow::bail!("health needs a server; drop --offline"),
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
