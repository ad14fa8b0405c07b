//! activity-routes CLI - draw recent activities on a map
//!
//! Usage:
//!   activity-routes --token <TOKEN> [--per-page 30] [--output routes.html]
//!   activity-routes --input saved.json --format geojson --output routes.geojson
//!
//! Fetches one page of activities (or reads a saved response), decodes every
//! summary polyline and writes either a standalone Leaflet page or a GeoJSON
//! FeatureCollection.

use std::fs;
use std::path::PathBuf;

use activity_routes::{
    map, ActivityClient, ActivitySource, MapCanvas, RendererConfig, RouteRenderer,
    StaticActivities,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};

#[derive(Parser)]
#[command(name = "activity-routes")]
#[command(author, version, about = "Draw fitness activity routes on a map", long_about = None)]
struct Cli {
    /// API access token
    #[arg(short, long, env = "STRAVA_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Number of activities to fetch
    #[arg(short = 'n', long, default_value = "30")]
    per_page: u32,

    /// Read a saved activities response instead of calling the API
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file
    #[arg(short, long, default_value = "routes.html")]
    output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// JSON config file (endpoint, tile layer, style, precision, timeout)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page title for HTML output
    #[arg(long, default_value = "Activity routes")]
    title: String,

    /// Enable verbose debug output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Geojson,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let config = match &cli.config {
        Some(path) => RendererConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RendererConfig::default(),
    };

    let canvas = map::shared(MapCanvas::new());

    match &cli.input {
        Some(path) => {
            let body = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let source = StaticActivities::from_json(&body)
                .with_context(|| format!("parsing {}", path.display()))?;
            // Saved responses need no credentials
            let token = cli.token.clone().unwrap_or_else(|| "offline".to_string());
            render(source, canvas.clone(), config, &token, cli.per_page).await?;
        }
        None => {
            let token = cli
                .token
                .clone()
                .context("an access token is required (--token or STRAVA_ACCESS_TOKEN)")?;
            let client = ActivityClient::new(&config).context("building HTTP client")?;
            render(client, canvas.clone(), config, &token, cli.per_page).await?;
        }
    }

    let canvas = canvas.lock().await;
    let contents = match cli.format {
        Format::Html => canvas.to_leaflet_html(&cli.title)?,
        Format::Geojson => serde_json::to_string_pretty(&canvas.to_feature_collection())?,
    };
    fs::write(&cli.output, contents)
        .with_context(|| format!("writing {}", cli.output.display()))?;

    info!("Wrote {} routes to {}", canvas.overlays().len(), cli.output.display());
    Ok(())
}

async fn render<S: ActivitySource>(
    source: S,
    canvas: map::SharedSurface<MapCanvas>,
    config: RendererConfig,
    token: &str,
    per_page: u32,
) -> Result<()> {
    let renderer = RouteRenderer::new(source, canvas, config);
    let summary = renderer
        .render(token, per_page)
        .await
        .context("rendering activities")?;

    for skipped in &summary.skipped {
        let id = skipped.activity_id.map_or_else(|| "-".to_string(), |id| id.to_string());
        warn!("Skipped record #{} (id {}): {}", skipped.index, id, skipped.reason);
    }
    println!(
        "Fetched {} activities: {} drawn, {} without GPS, {} skipped",
        summary.fetched,
        summary.drawn,
        summary.empty,
        summary.skipped.len()
    );
    Ok(())
}
