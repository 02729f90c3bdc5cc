//! Booking registration routes: submission and administrator decisions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::booking::{
    BookingRegistration, BookingStatus, CreateBookingRequest, DecideBookingRequest,
    DecideBookingResponse, ListBookingsQuery, ListBookingsResponse, Pagination,
};
use persistence::entities::BookingStatusDb;
use persistence::repositories::BookingRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_event_materialized;

const MAX_PER_PAGE: i64 = 100;

/// Submit a booking registration.
///
/// POST /api/v1/bookings
///
/// The registration starts pending; nothing is scheduled or allocated
/// until an administrator approves it.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingRegistration>), ApiError> {
    request.validate()?;

    let repo = BookingRepository::new(state.pool.clone());
    let (booking, requests) = repo.create(&request).await?;

    info!(booking_id = %booking.id, "Booking registration submitted");

    Ok((StatusCode::CREATED, Json(booking.into_model(requests))))
}

/// List booking registrations, newest first.
///
/// GET /api/v1/bookings?status=pending&page=1&per_page=20
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<ListBookingsResponse>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            BookingStatus::from_str(s)
                .map(BookingStatusDb::from)
                .map_err(ApiError::Validation)
        })
        .transpose()?;

    let per_page = query.per_page.clamp(1, MAX_PER_PAGE);
    let page = query.page.max(1);

    let repo = BookingRepository::new(state.pool.clone());
    let (bookings, total) = repo.list(status, page, per_page).await?;

    Ok(Json(ListBookingsResponse {
        data: bookings
            .into_iter()
            .map(|(booking, requests)| booking.into_model(requests))
            .collect(),
        pagination: Pagination {
            page,
            per_page,
            total,
        },
    }))
}

/// Fetch one booking registration.
///
/// GET /api/v1/bookings/:id
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingRegistration>, ApiError> {
    let repo = BookingRepository::new(state.pool.clone());

    let (booking, requests) = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking registration not found".to_string()))?;

    Ok(Json(booking.into_model(requests)))
}

/// Approve a pending booking.
///
/// POST /api/v1/bookings/:id/approve
///
/// Reserves the requested inventory all-or-nothing and materializes the
/// event in one transaction. On `inventory_unavailable` nothing is
/// allocated and the booking stays pending for the administrator to
/// resolve.
pub async fn approve_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<DecideBookingRequest>>,
) -> Result<Json<DecideBookingResponse>, ApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    request.validate()?;

    let repo = BookingRepository::new(state.pool.clone());
    let booking = repo
        .approve(
            id,
            request.note.as_deref(),
            &state.config.intake.default_group,
            &state.config.intake.default_group_color,
        )
        .await?;

    record_event_materialized("booking");
    info!(
        booking_id = %booking.id,
        event_id = ?booking.event_id,
        "Booking approved, event materialized"
    );

    Ok(Json(decision_response(booking)))
}

/// Reject a pending booking.
///
/// POST /api/v1/bookings/:id/reject
pub async fn reject_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<DecideBookingRequest>>,
) -> Result<Json<DecideBookingResponse>, ApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    request.validate()?;

    let repo = BookingRepository::new(state.pool.clone());
    let booking = repo.reject(id, request.note.as_deref()).await?;

    info!(booking_id = %booking.id, "Booking rejected");

    Ok(Json(decision_response(booking)))
}

fn decision_response(
    booking: persistence::entities::BookingRegistrationEntity,
) -> DecideBookingResponse {
    DecideBookingResponse {
        id: booking.id,
        status: booking.status.into(),
        event_id: booking.event_id,
        decided_at: booking.decided_at.unwrap_or(booking.updated_at),
        note: booking.decision_note,
    }
}
