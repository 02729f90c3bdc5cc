//! Inventory ledger routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use domain::models::inventory::{
    Availability, AvailabilityQuery, CreateInventoryItemRequest, InventoryItem,
    ListInventoryResponse, UpdateInventoryItemRequest,
};
use persistence::repositories::InventoryRepository;

use crate::app::AppState;
use crate::error::ApiError;

/// Create an inventory item.
///
/// POST /api/v1/inventory
pub async fn create_item(
    State(state): State<AppState>,
    Json(request): Json<CreateInventoryItemRequest>,
) -> Result<(StatusCode, Json<InventoryItem>), ApiError> {
    request.validate()?;

    let repo = InventoryRepository::new(state.pool.clone());
    let item = repo
        .create(&request.name, request.quantity_available)
        .await?;

    Ok((StatusCode::CREATED, Json(item.into())))
}

/// List inventory items.
///
/// GET /api/v1/inventory
pub async fn list_items(
    State(state): State<AppState>,
) -> Result<Json<ListInventoryResponse>, ApiError> {
    let repo = InventoryRepository::new(state.pool.clone());
    let items: Vec<InventoryItem> = repo.list().await?.into_iter().map(Into::into).collect();

    Ok(Json(ListInventoryResponse {
        count: items.len(),
        data: items,
    }))
}

/// Set an item's stock level (restock or correction).
///
/// PUT /api/v1/inventory/:id
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateInventoryItemRequest>,
) -> Result<Json<InventoryItem>, ApiError> {
    request.validate()?;

    let repo = InventoryRepository::new(state.pool.clone());
    let item = repo
        .set_quantity(id, request.quantity_available)
        .await?
        .ok_or_else(|| ApiError::NotFound("Inventory item not found".to_string()))?;

    Ok(Json(item.into()))
}

/// Advisory availability check for a set of requests.
///
/// POST /api/v1/inventory/availability
///
/// Reports whether every request could currently be satisfied. The
/// authoritative check is the atomic reservation at approval time.
pub async fn check_availability(
    State(state): State<AppState>,
    Json(query): Json<AvailabilityQuery>,
) -> Result<Json<Availability>, ApiError> {
    query.validate()?;

    let repo = InventoryRepository::new(state.pool.clone());
    let availability = repo.check_availability(&query.items).await?;

    Ok(Json(availability))
}
