use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use domain::services::extraction::Extractor;

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id,
};
use crate::routes::{bookings, events, feed, groups, health, inbound_email, inventory, registrations};
use crate::services::{EmailService, HttpExtractor};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub email: EmailService,
    pub extractor: Arc<dyn Extractor>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let extractor: Arc<dyn Extractor> = Arc::new(HttpExtractor::new(config.extraction.clone()));
    create_app_with_extractor(config, pool, extractor)
}

/// Build the application with an injected extractor.
///
/// The extraction capability is an opaque collaborator; tests swap in a
/// deterministic fake here.
pub fn create_app_with_extractor(
    config: Config,
    pool: PgPool,
    extractor: Arc<dyn Extractor>,
) -> Router {
    let config = Arc::new(config);
    let email = EmailService::new(config.email.clone());

    let state = AppState {
        pool,
        config: config.clone(),
        email,
        extractor,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Inbound email webhook, idempotent on provider message id
    let webhook_routes = Router::new().route(
        "/api/v1/email/inbound",
        post(inbound_email::receive_inbound_email),
    );

    // Guest capability-token surface: the token is the only credential
    let guest_routes = Router::new()
        .route("/api/v1/registrations/:token", get(registrations::resolve))
        .route(
            "/api/v1/registrations/:token",
            patch(registrations::update),
        )
        .route(
            "/api/v1/registrations/:token/confirm",
            post(registrations::confirm),
        );

    // Booking submission and administrator decisions
    let booking_routes = Router::new()
        .route("/api/v1/bookings", post(bookings::create_booking))
        .route("/api/v1/bookings", get(bookings::list_bookings))
        .route("/api/v1/bookings/:id", get(bookings::get_booking))
        .route("/api/v1/bookings/:id/approve", post(bookings::approve_booking))
        .route("/api/v1/bookings/:id/reject", post(bookings::reject_booking));

    // Calendar administration: groups, events, inventory
    let admin_routes = Router::new()
        .route("/api/v1/groups", get(groups::list_groups))
        .route("/api/v1/groups", post(groups::create_group))
        .route("/api/v1/groups/:id", delete(groups::delete_group))
        .route("/api/v1/events", get(events::list_events))
        .route("/api/v1/events/:id", get(events::get_event))
        .route("/api/v1/inventory", get(inventory::list_items))
        .route("/api/v1/inventory", post(inventory::create_item))
        .route("/api/v1/inventory/:id", put(inventory::update_item))
        .route(
            "/api/v1/inventory/availability",
            post(inventory::check_availability),
        );

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/api/v1/calendar.ics", get(feed::calendar_feed))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(webhook_routes)
        .merge(guest_routes)
        .merge(booking_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
