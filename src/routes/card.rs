use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::readings::{ChartWindow, ProjectedPoint, ReadingKind, UnknownKind};
use crate::sync::{HistoryProjection, TickOutcome};
use crate::view::{html, CardSnapshot, ChartDataset};

fn parse_kind(raw: &str) -> AppResult<ReadingKind> {
    raw.parse()
        .map_err(|e: UnknownKind| AppError::BadRequest(e.to_string()))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChartResponse {
    pub kind: ReadingKind,
    /// Localized kind name
    pub label: String,
    pub dataset: ChartDataset,
    /// Card revision the dataset belongs to
    pub revision: u64,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Chart window: `hour`, `half-day`, `day` (default) or `week`; `1h`, `12h`, `24h` and `7d` also work
    #[serde(default)]
    #[param(value_type = String)]
    pub window: ChartWindow,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub kind: ReadingKind,
    pub window: ChartWindow,
    /// Readings currently retained for the sensor, all kinds
    pub retained: usize,
    pub points: Vec<ProjectedPoint>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub outcome: TickOutcome,
    pub revision: u64,
}

/// The card as an HTML page
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Card page", body = String, content_type = "text/html"),
    ),
    tag = "card"
)]
pub async fn card_page(State(state): State<AppState>) -> Html<String> {
    let card = state.card.read();
    Html(html::render_page(
        &card,
        state.localization.as_ref(),
        state.config.poll_interval_seconds,
    ))
}

/// Current card contents
#[utoipa::path(
    get,
    path = "/api/card",
    responses(
        (status = 200, description = "Card snapshot", body = CardSnapshot),
    ),
    tag = "card"
)]
pub async fn get_card(State(state): State<AppState>) -> Json<CardSnapshot> {
    Json(state.card.read().snapshot(state.localization.as_ref()))
}

/// Chart dataset last pushed for a reading kind
#[utoipa::path(
    get,
    path = "/api/card/chart/{kind}",
    params(
        ("kind" = String, Path, description = "Reading kind: T or H"),
    ),
    responses(
        (status = 200, description = "Chart dataset", body = ChartResponse),
        (status = 400, description = "Unknown reading kind"),
    ),
    tag = "card"
)]
pub async fn get_chart(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> AppResult<Json<ChartResponse>> {
    let kind = parse_kind(&kind)?;
    let card = state.card.read();
    let dataset = card.chart(kind).cloned().unwrap_or_default();

    Ok(Json(ChartResponse {
        kind,
        label: state.localization.label(kind).to_string(),
        dataset,
        revision: card.revision(),
    }))
}

/// Project the retained history with any chart window
#[utoipa::path(
    get,
    path = "/api/card/history/{kind}",
    params(
        ("kind" = String, Path, description = "Reading kind: T or H"),
        HistoryQuery,
    ),
    responses(
        (status = 200, description = "Projected points", body = HistoryResponse),
        (status = 400, description = "Unknown reading kind or window"),
    ),
    tag = "card"
)]
pub async fn get_history(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<HistoryResponse>> {
    let kind = parse_kind(&kind)?;
    let HistoryProjection { points, retained } = state.poller.project(kind, query.window).await;

    Ok(Json(HistoryResponse {
        kind,
        window: query.window,
        retained,
        points,
    }))
}

/// Run one update tick now
#[utoipa::path(
    post,
    path = "/api/card/refresh",
    responses(
        (status = 200, description = "Tick succeeded", body = RefreshResponse),
        (status = 409, description = "A tick is already in flight", body = RefreshResponse),
        (status = 502, description = "Tick failed", body = RefreshResponse),
    ),
    tag = "card"
)]
pub async fn refresh(State(state): State<AppState>) -> Response {
    let outcome = state.poller.tick().await;
    let status = match outcome {
        TickOutcome::Succeeded => StatusCode::OK,
        TickOutcome::Skipped => StatusCode::CONFLICT,
        TickOutcome::Failed => StatusCode::BAD_GATEWAY,
    };
    let revision = state.card.read().revision();

    (status, Json(RefreshResponse { outcome, revision })).into_response()
}
