use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response, Sse},
};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;

use crate::assets::Asset;
use crate::controller::{PageUpdate, UiEvent};
use crate::error::GalleryError;
use crate::gallery::{FilterMenus, ItemView};
use crate::html_template::{render_page, PageContext};
use crate::page::ControlView;
use crate::settings::Settings;

use super::events::GalleryEvent;
use super::session::SharedSession;
use super::state::AppState;

// Request bodies posted by app.js

#[derive(Debug, Deserialize)]
pub struct ValueBody {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct ItemBody {
    pub id: usize,
}

/// Every page API call names the page load it belongs to.
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyBody {
    pub view: ControlView,
    #[serde(default)]
    pub panel_shown: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ColumnsBody {
    pub view: ControlView,
    pub value: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayBody {
    pub on_image: bool,
}

#[derive(Debug, Deserialize)]
pub struct KeyBody {
    pub key: String,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StatusCode> {
    mutex.lock().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

fn status_for(error: &GalleryError) -> StatusCode {
    match error {
        GalleryError::MissingAnchor(_) | GalleryError::UnknownItem(_) | GalleryError::ListNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        GalleryError::UnknownView(_) | GalleryError::UnknownOrientation(_) | GalleryError::Coordinates(_) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn find_session(state: &AppState, id: u64) -> Result<SharedSession, StatusCode> {
    state.session(id).ok_or_else(|| {
        tracing::debug!(session = id, "unknown page session");
        StatusCode::NOT_FOUND
    })
}

/// Run one UI event through the page's controller and collect map commands it produced.
fn dispatch(state: &AppState, id: u64, event: UiEvent) -> Result<Json<PageUpdate>, StatusCode> {
    let session = find_session(state, id)?;
    let mut session = lock(&session)?;
    let page = &mut session.page;
    let mut update = page.handle(event, Instant::now()).map_err(|e| {
        tracing::warn!(error = %e, "UI event rejected");
        status_for(&e)
    })?;

    if let Some(map) = page.map_mut() {
        let commands = map.provider_mut().take_pending();
        if !commands.is_empty() {
            update.script = Some(match update.script.take() {
                Some(script) => format!("{script}\n{commands}"),
                None => commands,
            });
        }
    }
    Ok(Json(update))
}

// HTTP API Handlers

// Every page load starts from a fresh controller and its own gallery fetch
pub async fn index_html(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let (id, session, _load) = state.open_session().map_err(|e| {
        tracing::error!(error = %e, "Failed to open page session");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let session = lock(&session)?;
    Ok(Html(render_page(&PageContext::from_controller(&session.page, &state.lists, id))))
}

fn asset(path: &str, content_type: &'static str) -> Response {
    match Asset::get(path) {
        Some(file) => ([(header::CONTENT_TYPE, content_type)], file.data.into_owned()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn style_css() -> Response {
    asset("style.css", "text/css")
}

pub async fn app_js() -> Response {
    asset("app.js", "application/javascript")
}

// Current items with their visibility and load status
pub async fn get_gallery(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let session = find_session(&state, query.session)?;
    let session = lock(&session)?;
    let page = &session.page;
    let items: Vec<ItemView> = page.items().iter().map(ItemView::from).collect();
    Ok(Json(serde_json::json!({
        "status": page.status(),
        "columns": page.columns(),
        "filters": page.filters().snapshot(),
        "items": items,
    })))
}

pub async fn get_menus(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<FilterMenus>, StatusCode> {
    let session = find_session(&state, query.session)?;
    let session = lock(&session)?;
    Ok(Json(session.page.menus().clone()))
}

pub async fn filter_orientation(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    Json(body): Json<ValueBody>,
) -> Result<Json<PageUpdate>, StatusCode> {
    dispatch(&state, query.session, UiEvent::Orientation { value: body.value })
}

pub async fn filter_location(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    Json(body): Json<ValueBody>,
) -> Result<Json<PageUpdate>, StatusCode> {
    dispatch(&state, query.session, UiEvent::Location { value: body.value })
}

pub async fn filter_year(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    Json(body): Json<ValueBody>,
) -> Result<Json<PageUpdate>, StatusCode> {
    dispatch(&state, query.session, UiEvent::Year { value: body.value })
}

pub async fn filter_apply(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    Json(body): Json<ApplyBody>,
) -> Result<Json<PageUpdate>, StatusCode> {
    dispatch(&state, query.session, UiEvent::Apply { view: body.view, panel_shown: body.panel_shown })
}

pub async fn filter_tick(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<PageUpdate>, StatusCode> {
    dispatch(&state, query.session, UiEvent::Tick)
}

pub async fn filter_frame(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<PageUpdate>, StatusCode> {
    dispatch(&state, query.session, UiEvent::AnimationFrame)
}

pub async fn set_columns(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    Json(body): Json<ColumnsBody>,
) -> Result<Json<PageUpdate>, StatusCode> {
    dispatch(&state, query.session, UiEvent::SliderInput { view: body.view, value: body.value })
}

pub async fn lightbox_open(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    Json(body): Json<ItemBody>,
) -> Result<Json<PageUpdate>, StatusCode> {
    dispatch(&state, query.session, UiEvent::ItemClicked { id: body.id })
}

pub async fn lightbox_close(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<PageUpdate>, StatusCode> {
    dispatch(&state, query.session, UiEvent::LightboxClose)
}

pub async fn lightbox_overlay(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    Json(body): Json<OverlayBody>,
) -> Result<Json<PageUpdate>, StatusCode> {
    dispatch(&state, query.session, UiEvent::LightboxOverlay { on_image: body.on_image })
}

pub async fn lightbox_key(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    Json(body): Json<KeyBody>,
) -> Result<Json<PageUpdate>, StatusCode> {
    dispatch(&state, query.session, UiEvent::KeyDown { key: body.key })
}

pub async fn map_view(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    Json(body): Json<ValueBody>,
) -> Result<Json<PageUpdate>, StatusCode> {
    dispatch(&state, query.session, UiEvent::MapView { value: body.value })
}

pub async fn map_list(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    Json(body): Json<ValueBody>,
) -> Result<Json<PageUpdate>, StatusCode> {
    dispatch(&state, query.session, UiEvent::MapList { value: body.value })
}

// Script that rebuilds the map as it currently stands
pub async fn map_script(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Response, StatusCode> {
    let session = find_session(&state, query.session)?;
    let session = lock(&session)?;
    let map = session.page.map().ok_or(StatusCode::NOT_FOUND)?;
    Ok(([(header::CONTENT_TYPE, "application/javascript")], map.provider().full_script()).into_response())
}

// API endpoint to get current settings
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<Settings>, StatusCode> {
    let settings = lock(&state.settings)?;
    Ok(Json(settings.clone()))
}

// API endpoint to update settings; they take effect on the next start
pub async fn update_settings(
    State(state): State<AppState>,
    Json(new_settings): Json<Settings>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let mut settings = lock(&state.settings)?;
    *settings = new_settings;

    if let Err(e) = settings.save() {
        tracing::error!(error = %e, "Failed to save settings");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Settings updated successfully"
    })))
}

// SSE endpoint for gallery load progress
pub async fn gallery_events_stream(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, StatusCode> {
    let (tx, rx) = mpsc::channel(100);

    // Events published before the stream opened are replayed first
    let (backlog, mut event_receiver) = {
        let session = find_session(&state, query.session)?;
        let session = lock(&session)?;
        let subscription = session.subscribe();
        subscription
    };

    tokio::spawn(async move {
        for gallery_event in backlog {
            let sse_event = SseEvent::default()
                .json_data(&gallery_event)
                .unwrap_or_else(|_| SseEvent::default().data("Error serializing event"));
            if tx.send(Ok(sse_event)).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                event = event_receiver.recv() => {
                    match event {
                        Ok(gallery_event) => {
                            let sse_event = SseEvent::default()
                                .json_data(&gallery_event)
                                .unwrap_or_else(|_| SseEvent::default().data("Error serializing event"));

                            if tx.send(Ok(sse_event)).await.is_err() {
                                break; // Client disconnected
                            }
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "SSE client lagged behind gallery events");
                        }
                        Err(_) => break, // Channel closed
                    }
                }
                _ = tokio::time::sleep(Duration::from_secs(30)) => {
                    let sse_event = SseEvent::default()
                        .json_data(GalleryEvent::heartbeat())
                        .unwrap_or_else(|_| SseEvent::default().data("Error serializing heartbeat"));

                    if tx.send(Ok(sse_event)).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    Ok(Sse::new(ReceiverStream::new(rx)).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive-message"),
    ))
}

use axum::response::sse::Event as SseEvent;
