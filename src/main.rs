use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use pixel_gallery::gallery::{HttpGallerySource, HttpImageProbe};
use pixel_gallery::html_template::render_shell;
use pixel_gallery::map::LocationLists;
use pixel_gallery::page::PageAnchors;
use pixel_gallery::server::{start_server, AppState};
use pixel_gallery::settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pixel_gallery=info")),
        )
        .init();

    println!("📸 Pixel Alchemy gallery starting...");

    let settings = Settings::load().context("Failed to load settings")?;
    println!("   ⚙️  Settings: {}", Settings::config_path().display());

    let lists = LocationLists::load(settings.locations_file.as_deref()).context("Failed to load location lists")?;

    // Wire only the features whose elements the page actually has
    let anchors = PageAnchors::detect(&render_shell(&settings, &lists));

    let port = settings.port;
    let gallery_url = settings.gallery_url.clone();

    let client = reqwest::Client::builder()
        .user_agent(concat!("pixel_gallery/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
    let state = AppState::new(
        anchors,
        lists,
        settings,
        Arc::new(HttpGallerySource::new(client.clone(), gallery_url.clone())),
        Arc::new(HttpImageProbe::new(client)),
    );

    println!("   🌐 Gallery source: {} (fetched on every page load)", gallery_url);

    println!("🚀 Starting web server on port {}...", port);
    start_server(state, port).await?;

    println!("👋 Gallery stopped");
    Ok(())
}
