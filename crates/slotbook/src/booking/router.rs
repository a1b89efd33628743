use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::search::SearchQuery;

use super::domain::{ListingId, ReservationId, UserId};
use super::guard::ConflictError;
use super::service::{BookingService, BookingServiceError, ListingDraft, SlotBatch};
use super::store::{EvaluationSink, ListingStore, NotificationSink, ReservationStore, StoreError};

/// Router builder exposing the booking engine over HTTP.
pub fn booking_router<L, R, N, E>(service: Arc<BookingService<L, R, N, E>>) -> Router
where
    L: ListingStore + 'static,
    R: ReservationStore + 'static,
    N: NotificationSink + 'static,
    E: EvaluationSink + 'static,
{
    Router::new()
        .route("/api/v1/listings", post(publish_handler::<L, R, N, E>))
        .route(
            "/api/v1/listings/:listing_id",
            get(listing_handler::<L, R, N, E>),
        )
        .route(
            "/api/v1/listings/:listing_id/slots",
            post(add_slots_handler::<L, R, N, E>).put(replace_slots_handler::<L, R, N, E>),
        )
        .route(
            "/api/v1/listings/:listing_id/availability",
            put(set_available_handler::<L, R, N, E>),
        )
        .route(
            "/api/v1/listings/:listing_id/availability/:date",
            get(availability_handler::<L, R, N, E>),
        )
        .route(
            "/api/v1/listings/:listing_id/reservations",
            get(listing_reservations_handler::<L, R, N, E>),
        )
        .route("/api/v1/reservations", post(reserve_handler::<L, R, N, E>))
        .route(
            "/api/v1/reservations/:reservation_id",
            get(reservation_handler::<L, R, N, E>),
        )
        .route(
            "/api/v1/reservations/:reservation_id/payment",
            post(payment_handler::<L, R, N, E>),
        )
        .route(
            "/api/v1/reservations/:reservation_id/evaluation",
            post(evaluation_handler::<L, R, N, E>),
        )
        .route(
            "/api/v1/users/:user_id/reservations",
            get(consumer_reservations_handler::<L, R, N, E>),
        )
        .route("/api/v1/search", post(search_handler::<L, R, N, E>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReplaceSlotsRequest {
    pub batches: Vec<SlotBatch>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SetAvailableRequest {
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReserveRequest {
    pub listing_id: ListingId,
    pub slot_index: usize,
    pub consumer_id: UserId,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EvaluationRequest {
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

pub(crate) async fn publish_handler<L, R, N, E>(
    State(service): State<Arc<BookingService<L, R, N, E>>>,
    axum::Json(draft): axum::Json<ListingDraft>,
) -> Response
where
    L: ListingStore + 'static,
    R: ReservationStore + 'static,
    N: NotificationSink + 'static,
    E: EvaluationSink + 'static,
{
    match service.publish_listing(draft) {
        Ok(listing) => (StatusCode::CREATED, axum::Json(listing)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn listing_handler<L, R, N, E>(
    State(service): State<Arc<BookingService<L, R, N, E>>>,
    Path(listing_id): Path<String>,
) -> Response
where
    L: ListingStore + 'static,
    R: ReservationStore + 'static,
    N: NotificationSink + 'static,
    E: EvaluationSink + 'static,
{
    match service.listing(&ListingId(listing_id)) {
        Ok(listing) => (StatusCode::OK, axum::Json(listing)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_slots_handler<L, R, N, E>(
    State(service): State<Arc<BookingService<L, R, N, E>>>,
    Path(listing_id): Path<String>,
    axum::Json(batch): axum::Json<SlotBatch>,
) -> Response
where
    L: ListingStore + 'static,
    R: ReservationStore + 'static,
    N: NotificationSink + 'static,
    E: EvaluationSink + 'static,
{
    match service.add_slots(&ListingId(listing_id), &batch) {
        Ok(update) => (StatusCode::OK, axum::Json(update)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn replace_slots_handler<L, R, N, E>(
    State(service): State<Arc<BookingService<L, R, N, E>>>,
    Path(listing_id): Path<String>,
    axum::Json(request): axum::Json<ReplaceSlotsRequest>,
) -> Response
where
    L: ListingStore + 'static,
    R: ReservationStore + 'static,
    N: NotificationSink + 'static,
    E: EvaluationSink + 'static,
{
    match service.replace_slots(&ListingId(listing_id), &request.batches) {
        Ok(update) => (StatusCode::OK, axum::Json(update)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn set_available_handler<L, R, N, E>(
    State(service): State<Arc<BookingService<L, R, N, E>>>,
    Path(listing_id): Path<String>,
    axum::Json(request): axum::Json<SetAvailableRequest>,
) -> Response
where
    L: ListingStore + 'static,
    R: ReservationStore + 'static,
    N: NotificationSink + 'static,
    E: EvaluationSink + 'static,
{
    match service.set_listing_available(&ListingId(listing_id), request.available) {
        Ok(listing) => (StatusCode::OK, axum::Json(listing)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn availability_handler<L, R, N, E>(
    State(service): State<Arc<BookingService<L, R, N, E>>>,
    Path((listing_id, date)): Path<(String, NaiveDate)>,
) -> Response
where
    L: ListingStore + 'static,
    R: ReservationStore + 'static,
    N: NotificationSink + 'static,
    E: EvaluationSink + 'static,
{
    match service.availability(&ListingId(listing_id), date) {
        Ok(availability) => (StatusCode::OK, axum::Json(availability)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reserve_handler<L, R, N, E>(
    State(service): State<Arc<BookingService<L, R, N, E>>>,
    axum::Json(request): axum::Json<ReserveRequest>,
) -> Response
where
    L: ListingStore + 'static,
    R: ReservationStore + 'static,
    N: NotificationSink + 'static,
    E: EvaluationSink + 'static,
{
    match service.try_reserve(
        &request.listing_id,
        request.slot_index,
        &request.consumer_id,
        request.date,
    ) {
        Ok(reservation) => (StatusCode::CREATED, axum::Json(reservation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reservation_handler<L, R, N, E>(
    State(service): State<Arc<BookingService<L, R, N, E>>>,
    Path(reservation_id): Path<String>,
) -> Response
where
    L: ListingStore + 'static,
    R: ReservationStore + 'static,
    N: NotificationSink + 'static,
    E: EvaluationSink + 'static,
{
    match service.reservation(&ReservationId(reservation_id)) {
        Ok(reservation) => (StatusCode::OK, axum::Json(reservation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn payment_handler<L, R, N, E>(
    State(service): State<Arc<BookingService<L, R, N, E>>>,
    Path(reservation_id): Path<String>,
) -> Response
where
    L: ListingStore + 'static,
    R: ReservationStore + 'static,
    N: NotificationSink + 'static,
    E: EvaluationSink + 'static,
{
    match service.confirm_payment(&ReservationId(reservation_id)) {
        Ok(reservation) => (StatusCode::OK, axum::Json(reservation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn evaluation_handler<L, R, N, E>(
    State(service): State<Arc<BookingService<L, R, N, E>>>,
    Path(reservation_id): Path<String>,
    axum::Json(request): axum::Json<EvaluationRequest>,
) -> Response
where
    L: ListingStore + 'static,
    R: ReservationStore + 'static,
    N: NotificationSink + 'static,
    E: EvaluationSink + 'static,
{
    match service.submit_evaluation(
        &ReservationId(reservation_id),
        request.rating,
        &request.comment,
    ) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn consumer_reservations_handler<L, R, N, E>(
    State(service): State<Arc<BookingService<L, R, N, E>>>,
    Path(user_id): Path<String>,
) -> Response
where
    L: ListingStore + 'static,
    R: ReservationStore + 'static,
    N: NotificationSink + 'static,
    E: EvaluationSink + 'static,
{
    match service.reservations_for_consumer(&UserId(user_id)) {
        Ok(reservations) => (StatusCode::OK, axum::Json(reservations)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn listing_reservations_handler<L, R, N, E>(
    State(service): State<Arc<BookingService<L, R, N, E>>>,
    Path(listing_id): Path<String>,
) -> Response
where
    L: ListingStore + 'static,
    R: ReservationStore + 'static,
    N: NotificationSink + 'static,
    E: EvaluationSink + 'static,
{
    match service.reservations_for_listing(&ListingId(listing_id)) {
        Ok(reservations) => (StatusCode::OK, axum::Json(reservations)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn search_handler<L, R, N, E>(
    State(service): State<Arc<BookingService<L, R, N, E>>>,
    axum::Json(query): axum::Json<SearchQuery>,
) -> Response
where
    L: ListingStore + 'static,
    R: ReservationStore + 'static,
    N: NotificationSink + 'static,
    E: EvaluationSink + 'static,
{
    match service.search(&query) {
        Ok(listings) => (StatusCode::OK, axum::Json(listings)).into_response(),
        Err(error) => error_response(error),
    }
}

/// Shared mapping from engine errors to HTTP responses. The double-booking
/// refusal keeps its "was that my own booking" flag in the payload.
fn error_response(error: BookingServiceError) -> Response {
    let status = match &error {
        BookingServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BookingServiceError::Conflict(ConflictError::SlotAlreadyTaken { .. }) => {
            StatusCode::CONFLICT
        }
        BookingServiceError::Conflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BookingServiceError::Transition(_) => StatusCode::CONFLICT,
        BookingServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        BookingServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        BookingServiceError::Store(StoreError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = match &error {
        BookingServiceError::Conflict(ConflictError::SlotAlreadyTaken { by_requester }) => json!({
            "error": error.to_string(),
            "own_reservation": by_requester,
        }),
        _ => json!({
            "error": error.to_string(),
        }),
    };
    (status, axum::Json(payload)).into_response()
}
