use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

use shipment_tracker::carrier::{BrowserTrackingClient, FetchOptions};
use shipment_tracker::config::{load_config, TrackerConfig};
use shipment_tracker::normalize;
use shipment_tracker::observability::logging;

#[derive(Parser)]
#[command(name = "tracker-cli")]
#[command(about = "Command line client for the shipment tracker", long_about = None)]
struct Cli {
    /// Base URL of a running tracker.
    #[arg(short, long, default_value = "http://localhost:4001")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a reference through a running tracker
    Track {
        reference: String,
    },
    /// Show tracker health and cache size
    Health,
    /// Scrape a reference directly with a local browser (no server, no cache)
    Scrape {
        reference: String,

        /// Show the browser window
        #[arg(long)]
        headed: bool,

        /// Override the attempt budget
        #[arg(long)]
        attempts: Option<u32>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Track { reference } => {
            let res = client
                .get(format!("{}/track", cli.url))
                .query(&[("ref", reference.trim())])
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Scrape {
            reference,
            headed,
            attempts,
            config,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => TrackerConfig::default(),
            };
            logging::init_logging(&config.observability);

            let tracker = BrowserTrackingClient::from_config(&config);
            let options = FetchOptions {
                headless: !headed,
                max_attempts: attempts.unwrap_or(config.retries.max_attempts),
            };

            match tracker.fetch_tracking(reference.trim(), options).await {
                Ok(details) => {
                    let data = normalize(&details);
                    println!("{}", serde_json::to_string_pretty(&data)?);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(if e.is_not_found() { 2 } else { 1 });
                }
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await?;
    if status.is_success() {
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        eprintln!("Error: tracker returned status {}", status);
        eprintln!("{}", serde_json::to_string_pretty(&json)?);
    }
    Ok(())
}
