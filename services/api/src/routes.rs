use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use slotbook::booking::{
    booking_router, validate_batch, BookingService, EvaluationSink, ListingStore,
    NotificationSink, ReservationStore, UserId, WeekDay, WeeklySlot,
};
use slotbook::catalog::CatalogImporter;
use slotbook::error::AppError;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogPreviewRequest {
    pub(crate) csv: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CatalogPreviewResponse {
    pub(crate) valid: bool,
    pub(crate) listings: Vec<SeedPreview>,
}

/// What one seed row would publish, before anything is written.
#[derive(Debug, Serialize)]
pub(crate) struct SeedPreview {
    pub(crate) owner_id: UserId,
    pub(crate) title: String,
    pub(crate) category: String,
    pub(crate) slots: Vec<WeeklySlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

pub(crate) fn with_booking_routes<L, R, N, E>(
    service: Arc<BookingService<L, R, N, E>>,
) -> axum::Router
where
    L: ListingStore + 'static,
    R: ReservationStore + 'static,
    N: NotificationSink + 'static,
    E: EvaluationSink + 'static,
{
    booking_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/catalog/preview",
            axum::routing::post(catalog_preview_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Dry-run a catalog seed file: parse it and check each row's time range
/// without publishing anything. Syntax errors fail the whole request with
/// the offending line; a bad range only flags its own row.
pub(crate) async fn catalog_preview_endpoint(
    Json(payload): Json<CatalogPreviewRequest>,
) -> Result<Json<CatalogPreviewResponse>, AppError> {
    let reader = Cursor::new(payload.csv.into_bytes());
    let seeds = CatalogImporter::from_reader(reader)?;

    let listings: Vec<SeedPreview> = seeds
        .into_iter()
        .map(|seed| {
            let days: Vec<WeekDay> = seed.slots.iter().map(|slot| slot.day).collect();
            // Each row stands alone against an empty template, so gap
            // warnings cannot arise and the gap minimum is moot.
            let error = seed.slots.first().and_then(|first| {
                validate_batch(&[], &days, first.start, first.end, 0)
                    .err()
                    .map(|err| err.to_string())
            });
            SeedPreview {
                owner_id: seed.draft.owner_id,
                title: seed.draft.title,
                category: seed.draft.category,
                slots: seed.slots,
                error,
            }
        })
        .collect();

    let valid = listings.iter().all(|listing| listing.error.is_none());
    Ok(Json(CatalogPreviewResponse { valid, listings }))
}
