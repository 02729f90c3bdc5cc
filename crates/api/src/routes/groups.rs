//! Calendar group routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::group::{CreateGroupRequest, DeleteGroupResponse, Group, ListGroupsResponse};
use persistence::repositories::GroupRepository;

use crate::app::AppState;
use crate::error::ApiError;

const DEFAULT_GROUP_COLOR: &str = "#2563eb";

/// Create a calendar group.
///
/// POST /api/v1/groups
pub async fn create_group(
    State(state): State<AppState>,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    request.validate()?;

    let repo = GroupRepository::new(state.pool.clone());
    let color = request.color.as_deref().unwrap_or(DEFAULT_GROUP_COLOR);
    let group = repo.create(&request.name, color).await?;

    Ok((StatusCode::CREATED, Json(group.into())))
}

/// List groups.
///
/// GET /api/v1/groups
pub async fn list_groups(
    State(state): State<AppState>,
) -> Result<Json<ListGroupsResponse>, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());
    let groups: Vec<Group> = repo.list().await?.into_iter().map(Into::into).collect();

    Ok(Json(ListGroupsResponse {
        count: groups.len(),
        data: groups,
    }))
}

/// Delete a group and, by cascade, its events.
///
/// DELETE /api/v1/groups/:id
pub async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteGroupResponse>, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());

    let events_deleted = repo
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;

    info!(group_id = %id, events_deleted, "Group deleted");

    Ok(Json(DeleteGroupResponse {
        deleted: true,
        group_id: id,
        events_deleted,
    }))
}
