#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the 311 call stream browser.

use std::path::PathBuf;
use std::sync::Arc;

use call_stream_app::render;
use call_stream_feed::fetch::{FeedCache, FeedClient, FeedState};
use call_stream_feed_models::ServiceRequest;
use clap::{Parser, Subcommand};

/// Boston's 311 service request CSV export.
const DEFAULT_FEED_URL: &str =
    "https://data.boston.gov/datastore/dump/9d7c2214-4709-478a-a2e8-fb2020a5bb94?format=csv";

#[derive(Parser)]
#[command(name = "call_stream_app", about = "311 call stream browser")]
struct Cli {
    /// Feed URL to fetch the CSV export from
    #[arg(long, default_value = DEFAULT_FEED_URL)]
    url: String,
    /// Read the feed from a local CSV file instead of fetching
    #[arg(long)]
    file: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the most recent incidents
    List {
        /// Emit the records as JSON instead of text rows
        #[arg(long)]
        json: bool,
        /// Show at most this many rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one incident's details by case enquiry id
    Show {
        /// Case enquiry id (e.g. `101005632711`)
        case_id: String,
        /// Emit the record as JSON instead of the detail view
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut cache = FeedCache::new(FeedClient::new(&cli.url)?);

    let Some(command) = cli.command else {
        return call_stream_app::interactive::run(&mut cache, cli.file.as_deref()).await;
    };

    if let Some(path) = &cli.file {
        cache.load_path(path);
    } else {
        cache.load().await;
    }

    let requests = match cache.state() {
        FeedState::Ready(requests) => requests.clone(),
        FeedState::Error(message) => return Err(format!("failed to load feed: {message}").into()),
        FeedState::Loading => return Err("feed never finished loading".into()),
    };

    match command {
        Commands::List { json, limit } => list(&requests, json, limit)?,
        Commands::Show { case_id, json } => show(&requests, &case_id, json)?,
    }

    Ok(())
}

fn list(
    requests: &Arc<Vec<ServiceRequest>>,
    json: bool,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let count = limit.unwrap_or(requests.len()).min(requests.len());
    let shown = &requests[..count];

    if json {
        println!("{}", serde_json::to_string_pretty(shown)?);
    } else {
        println!("{} recent incidents", shown.len());
        for record in shown {
            println!("{}", render::list_row(record));
        }
    }

    Ok(())
}

fn show(
    requests: &Arc<Vec<ServiceRequest>>,
    case_id: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(record) = requests.iter().find(|r| r.case_enquiry_id == case_id) else {
        return Err(format!("no incident with case enquiry id '{case_id}' in the current window").into());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        println!("{}", render::detail(record));
    }

    Ok(())
}
