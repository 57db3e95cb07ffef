//! services/api/src/web/shopping.rs
//!
//! Handlers for shopping lists.

use crate::error::{ApiError, ErrorResponse};
use crate::planning;
use crate::web::dto::{ShoppingItemDto, ShoppingListDto, UpdateShoppingItemRequest};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use meal_planner_core::FamilyMember;
use std::sync::Arc;
use uuid::Uuid;

/// Rebuild the shopping list of a plan, replacing the previous one.
#[utoipa::path(
    post,
    path = "/shopping-lists/generate/{weekly_plan_id}",
    params(("weekly_plan_id" = Uuid, Path, description = "The weekly plan to shop for.")),
    responses(
        (status = 201, description = "Shopping list generated", body = ShoppingListDto),
        (status = 403, description = "Another family's plan", body = ErrorResponse),
        (status = 404, description = "Plan not found", body = ErrorResponse)
    )
)]
pub async fn generate_shopping_list_handler(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<FamilyMember>,
    Path(weekly_plan_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ShoppingListDto>), ApiError> {
    let list = planning::regenerate_shopping_list(state.db.as_ref(), &member, weekly_plan_id, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(list.into())))
}

#[utoipa::path(
    get,
    path = "/shopping-lists/{plan_id}",
    params(("plan_id" = Uuid, Path, description = "The weekly plan.")),
    responses(
        (status = 200, description = "The current shopping list", body = ShoppingListDto),
        (status = 403, description = "Another family's plan", body = ErrorResponse),
        (status = 404, description = "No list generated yet", body = ErrorResponse)
    )
)]
pub async fn get_shopping_list_handler(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<FamilyMember>,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<ShoppingListDto>, ApiError> {
    let list = planning::get_shopping_list(state.db.as_ref(), &member, plan_id).await?;
    Ok(Json(list.into()))
}

/// Tick an item off, or mark it as already in the pantry.
#[utoipa::path(
    patch,
    path = "/shopping-items/{item_id}",
    request_body = UpdateShoppingItemRequest,
    params(("item_id" = Uuid, Path, description = "The shopping item.")),
    responses(
        (status = 200, description = "The updated item", body = ShoppingItemDto),
        (status = 403, description = "Another family's list", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse)
    )
)]
pub async fn update_shopping_item_handler(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<FamilyMember>,
    Path(item_id): Path<Uuid>,
    Json(req): Json<UpdateShoppingItemRequest>,
) -> Result<Json<ShoppingItemDto>, ApiError> {
    let item = planning::set_item_flags(state.db.as_ref(), &member, item_id, req.checked, req.in_stock).await?;
    Ok(Json(item.into()))
}
