//! Read-only iCalendar feed.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;

use domain::models::event::{CalendarEvent, ListEventsQuery};
use domain::services::feed::render_calendar;
use persistence::repositories::EventRepository;

use crate::app::AppState;
use crate::error::ApiError;

/// Serve confirmed events as an iCalendar feed.
///
/// GET /api/v1/calendar.ics
///
/// Downstream calendar clients poll this; it reads confirmed events only
/// and never mutates anything.
pub async fn calendar_feed(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = EventRepository::new(state.pool.clone());
    let events: Vec<CalendarEvent> = repo
        .list(&query)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let body = render_calendar(&events, Utc::now());

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/calendar; charset=utf-8")],
        body,
    ))
}
