use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

pub mod events;
pub mod handlers;
pub mod session;
pub mod state;

pub use self::events::GalleryEvent;
pub use self::session::{PageSession, SharedSession};
pub use self::state::AppState;

use handlers::*;

// Create the main application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_html))
        .route("/style.css", get(style_css))
        .route("/app.js", get(app_js))
        .route("/api/gallery", get(get_gallery))
        .route("/api/menus", get(get_menus))
        .route("/api/filter/orientation", post(filter_orientation))
        .route("/api/filter/location", post(filter_location))
        .route("/api/filter/year", post(filter_year))
        .route("/api/filter/apply", post(filter_apply))
        .route("/api/filter/tick", post(filter_tick))
        .route("/api/filter/frame", post(filter_frame))
        .route("/api/columns", post(set_columns))
        .route("/api/lightbox/open", post(lightbox_open))
        .route("/api/lightbox/close", post(lightbox_close))
        .route("/api/lightbox/overlay", post(lightbox_overlay))
        .route("/api/lightbox/key", post(lightbox_key))
        .route("/api/map/view", post(map_view))
        .route("/api/map/list", post(map_list))
        .route("/api/map/script", get(map_script))
        .route("/api/events", get(gallery_events_stream))
        .route("/api/settings", get(get_settings).post(update_settings))
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, port: u16) -> Result<()> {
    let app = create_app(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;

    println!("   ✅ HTTP server started successfully at http://127.0.0.1:{}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
