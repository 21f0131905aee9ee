use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let files = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/services/:id/offers",
            get(handlers::offers::list_offers),
        )
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .route("/api/bookings/:id", get(handlers::bookings::get_booking))
        .route(
            "/api/bookings/:id/status",
            post(handlers::bookings::update_status),
        )
        .route(
            "/api/bookings/:id/complete",
            post(handlers::bookings::complete_booking),
        )
        .route(
            "/api/commissions/:id/settle",
            post(handlers::bookings::settle_commission),
        )
        .route(
            "/api/technicians/:id/earnings",
            get(handlers::earnings::technician_earnings),
        )
        .route(
            "/api/partners/:id/earnings",
            get(handlers::earnings::partner_earnings),
        )
        .route(
            "/api/technicians/:id/documents/:kind",
            post(handlers::documents::upload_document),
        )
        .nest_service("/files", files)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
