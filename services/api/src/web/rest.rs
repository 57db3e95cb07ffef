//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification, plus the health check.

use crate::error::ErrorResponse;
use crate::web::auth::{AuthResponse, LoginRequest};
use crate::web::dto::{
    ChangeLogDto, ChangeStatusRequest, ComponentInput, GeneratePlanRequest, GeneratedPlanResponse, GuestDto,
    MealComponentDto, MealDto, ShoppingItemDto, ShoppingListDto, SlotDto, UpdateMealRequest,
    UpdateShoppingItemRequest, WeeklyPlanDto,
};
use axum::Json;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        crate::web::plans::generate_plan_handler,
        crate::web::plans::generate_express_handler,
        crate::web::plans::get_plan_handler,
        crate::web::plans::change_status_handler,
        crate::web::plans::unlock_plan_handler,
        crate::web::plans::list_changes_handler,
        crate::web::plans::update_meal_handler,
        crate::web::shopping::generate_shopping_list_handler,
        crate::web::shopping::get_shopping_list_handler,
        crate::web::shopping::update_shopping_item_handler,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            LoginRequest,
            AuthResponse,
            SlotDto,
            GeneratePlanRequest,
            GeneratedPlanResponse,
            WeeklyPlanDto,
            MealDto,
            MealComponentDto,
            GuestDto,
            ComponentInput,
            UpdateMealRequest,
            ChangeStatusRequest,
            ChangeLogDto,
            ShoppingListDto,
            ShoppingItemDto,
            UpdateShoppingItemRequest,
        )
    ),
    tags(
        (name = "Meal Planner API", description = "Weekly meal plans and shopping lists for families.")
    )
)]
pub struct ApiDoc;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "The service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
