//! Calendar event read routes.
//!
//! Events exist only once a registration has been confirmed or approved;
//! these handlers never create anything.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use domain::models::event::{
    CalendarEvent, EventDetail, ListEventsQuery, ListEventsResponse,
};
use persistence::repositories::EventRepository;

use crate::app::AppState;
use crate::error::ApiError;

/// List events, optionally filtered by group and time window.
///
/// GET /api/v1/events?group_id=..&from=..&to=..
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<ListEventsResponse>, ApiError> {
    let repo = EventRepository::new(state.pool.clone());
    let events: Vec<CalendarEvent> = repo
        .list(&query)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ListEventsResponse {
        count: events.len(),
        data: events,
    }))
}

/// Fetch one event with its inventory allocations.
///
/// GET /api/v1/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventDetail>, ApiError> {
    let repo = EventRepository::new(state.pool.clone());

    let event = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    let allocations = repo
        .allocations(id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(EventDetail {
        event: event.into(),
        allocations,
    }))
}
