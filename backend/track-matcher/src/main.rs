/// Convert a playlist against a local candidate catalog
///
/// Usage:
///   PLAYLIST_FILE=playlist.json CATALOG_FILE=catalog.json cargo run --bin track-matcher
///
/// Environment variables:
///   - PLAYLIST_FILE: JSON `{"name": ..., "tracks": [{"name": ..., "artists": [...]}]}`
///   - CATALOG_FILE: JSON array of `{"title", "url", "artist_name", "duration"}`
///   - BLACKLIST_FILE: optional JSON array of urls that must never be matched
///   - MATCHER_*: matcher tuning, see `MatcherConfig::from_env`
use anyhow::{Context, Result};
use serde_json::json;
use std::collections::HashSet;
use std::env;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;
use track_matcher::{CatalogSource, MatcherConfig, Playlist, PlaylistConverter, SearchCoordinator};

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path))
}

/// Load `.env` (the default lookup, or `path`), then build the log filter so
/// a `RUST_LOG` set there takes effect.
fn load_environment(path: Option<&Path>) -> EnvFilter {
    let _ = match path {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };

    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "track_matcher=info,resilience=info".into())
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = load_environment(None);
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let playlist_path = env::var("PLAYLIST_FILE").context("PLAYLIST_FILE must be set")?;
    let catalog_path = env::var("CATALOG_FILE").context("CATALOG_FILE must be set")?;

    let config = MatcherConfig::from_env();
    config.validate().context("Invalid matcher configuration")?;

    let playlist: Playlist = read_json(&playlist_path)?;
    let blacklist: HashSet<String> = match env::var("BLACKLIST_FILE") {
        Ok(path) => read_json(&path)?,
        Err(_) => HashSet::new(),
    };
    let source = CatalogSource::from_json_file(&catalog_path)
        .with_context(|| format!("Failed to load catalog {}", catalog_path))?;

    info!(
        playlist = %playlist.name,
        tracks = playlist.tracks.len(),
        catalog = source.len(),
        blacklisted = blacklist.len(),
        "Starting track matcher"
    );

    let coordinator = SearchCoordinator::new(source, config)?;
    let report = PlaylistConverter::new(&coordinator)
        .convert(&playlist, &blacklist)
        .await?;

    let output = json!({
        "report": report,
        "stats": coordinator.stats(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
