//! Fetch a catalog path and print the raw JSON next to what normalization keeps.
//! Usage:
//!   cargo run --bin catalog_raw -- "movie/popular?page=1"
//! Requires TMDB_BASE_URL and TMDB_ACCESS_TOKEN in the environment (.env supported).

use anyhow::{Context, Result};
use dotenvy::dotenv;
use movieshelf::catalog::normalize_results;
use movieshelf::config::Config;
use reqwest::Client;
use serde_json::Value;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo run --bin catalog_raw -- <path>");
        std::process::exit(1);
    }
    let path = args[1].trim_start_matches('/');

    let config = Config::from_env()?;
    let url = format!("{}/{}", config.base_url, path);

    let body: Value = Client::new()
        .get(&url)
        .bearer_auth(&config.access_token)
        .header("accept", "application/json")
        .send()
        .await
        .context("Failed to call catalog")?
        .error_for_status()
        .context("Catalog returned an error status")?
        .json()
        .await
        .context("Failed to parse catalog response")?;

    println!("{}", serde_json::to_string_pretty(&body)?);

    match normalize_results(&body) {
        Some(movies) => {
            let raw_len = body["results"].as_array().map(|a| a.len()).unwrap_or(0);
            eprintln!("normalized {} of {} results", movies.len(), raw_len);
            for m in movies {
                eprintln!("  {} {}", m.id, m.title);
            }
        }
        None => eprintln!("no results array in response"),
    }

    Ok(())
}
