use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryEvaluationSink, InMemoryListingStore, InMemoryNotificationSink,
    InMemoryReservationStore,
};
use crate::routes::with_booking_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use slotbook::booking::BookingService;
use slotbook::config::AppConfig;
use slotbook::error::AppError;
use slotbook::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let listings = Arc::new(InMemoryListingStore::default());
    let reservations = Arc::new(InMemoryReservationStore::default());
    let notifications = Arc::new(InMemoryNotificationSink::default());
    let evaluations = Arc::new(InMemoryEvaluationSink::default());
    let booking_service = Arc::new(BookingService::new(
        listings,
        reservations,
        notifications,
        evaluations,
        config.booking.min_gap_minutes,
    ));

    spawn_evaluation_sweep(
        booking_service.clone(),
        config.booking.sweep_interval_secs,
    );

    let app = with_booking_routes(booking_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "booking service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Background task that periodically moves paid reservations whose service
/// date has passed into the evaluation stage. Sweep failures are logged and
/// the loop keeps going.
fn spawn_evaluation_sweep(
    service: Arc<
        BookingService<
            InMemoryListingStore,
            InMemoryReservationStore,
            InMemoryNotificationSink,
            InMemoryEvaluationSink,
        >,
    >,
    interval_secs: u64,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            if let Err(error) = service.sweep_due() {
                tracing::error!(%error, "evaluation sweep failed");
            }
        }
    });
}
