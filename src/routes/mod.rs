pub mod card;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        card::card_page,
        card::get_card,
        card::get_chart,
        card::get_history,
        card::refresh,
    ),
    components(
        schemas(
            crate::view::CardSnapshot,
            crate::view::card::ReadingSnapshot,
            crate::view::ChartDataset,
            crate::readings::ProjectedPoint,
            crate::readings::Reading,
            crate::readings::ReadingKind,
            crate::readings::ChartWindow,
            crate::sync::TickOutcome,
            card::ChartResponse,
            card::HistoryResponse,
            card::RefreshResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "card", description = "Sensor card contents and charts"),
    ),
    info(
        title = "Sensor Card",
        description = "Live dashboard card for a temperature/humidity sensor",
        version = "0.1.0"
    )
)]
struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let card_routes = Router::new()
        .route("/card", get(card::get_card))
        .route("/card/chart/{kind}", get(card::get_chart))
        .route("/card/history/{kind}", get(card::get_history))
        .route("/card/refresh", post(card::refresh))
        .layer(RequestBodyLimitLayer::new(16 * 1024));

    // Health check routes
    let health_routes = Router::new().route("/healthz", get(health::healthz));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    Router::new()
        .route("/", get(card::card_page))
        .nest("/api", card_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
