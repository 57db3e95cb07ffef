//! services/api/src/web/plans.rs
//!
//! Handlers for weekly plans and their meals.

use crate::error::{ApiError, ErrorResponse};
use crate::planning;
use crate::web::dto::{
    ChangeLogDto, ChangeStatusRequest, GeneratePlanRequest, GeneratedPlanResponse, MealDto, UpdateMealRequest,
    WeeklyPlanDto,
};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use meal_planner_core::{FamilyMember, GenerationMode};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use uuid::Uuid;

async fn generate(
    state: &AppState,
    member: &FamilyMember,
    family_id: Uuid,
    mode: GenerationMode,
    req: &GeneratePlanRequest,
) -> Result<(StatusCode, Json<GeneratedPlanResponse>), ApiError> {
    let request = req.to_domain()?;
    let mut rng = StdRng::from_entropy();
    let generated =
        planning::generate_plan(state.db.as_ref(), member, family_id, mode, request, &mut rng, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(generated.into())))
}

/// Generate the family's plan for a week from the whole catalog.
#[utoipa::path(
    post,
    path = "/weekly-plans/{family_id}/generate",
    request_body = GeneratePlanRequest,
    params(("family_id" = Uuid, Path, description = "The family to plan for.")),
    responses(
        (status = 201, description = "Plan generated", body = GeneratedPlanResponse),
        (status = 400, description = "No recipe fits the family or the request is invalid", body = ErrorResponse),
        (status = 403, description = "Another family, or the plan can no longer be edited", body = ErrorResponse),
        (status = 404, description = "Family not found", body = ErrorResponse),
        (status = 409, description = "The plan is validated or locked", body = ErrorResponse)
    )
)]
pub async fn generate_plan_handler(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<FamilyMember>,
    Path(family_id): Path<Uuid>,
    Json(req): Json<GeneratePlanRequest>,
) -> Result<(StatusCode, Json<GeneratedPlanResponse>), ApiError> {
    generate(&state, &member, family_id, GenerationMode::Auto, &req).await
}

/// Generate a quick plan from favorites plus one novelty.
#[utoipa::path(
    post,
    path = "/weekly-plans/{family_id}/generate-express",
    request_body = GeneratePlanRequest,
    params(("family_id" = Uuid, Path, description = "The family to plan for.")),
    responses(
        (status = 201, description = "Plan generated", body = GeneratedPlanResponse),
        (status = 400, description = "The family has no favorite recipes", body = ErrorResponse),
        (status = 403, description = "Another family, or the plan can no longer be edited", body = ErrorResponse),
        (status = 404, description = "Family not found", body = ErrorResponse),
        (status = 409, description = "The plan is validated or locked", body = ErrorResponse)
    )
)]
pub async fn generate_express_handler(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<FamilyMember>,
    Path(family_id): Path<Uuid>,
    Json(req): Json<GeneratePlanRequest>,
) -> Result<(StatusCode, Json<GeneratedPlanResponse>), ApiError> {
    generate(&state, &member, family_id, GenerationMode::Express, &req).await
}

#[utoipa::path(
    get,
    path = "/weekly-plans/{plan_id}",
    params(("plan_id" = Uuid, Path, description = "The weekly plan.")),
    responses(
        (status = 200, description = "The plan with its meals", body = WeeklyPlanDto),
        (status = 403, description = "Another family's plan", body = ErrorResponse),
        (status = 404, description = "Plan not found", body = ErrorResponse)
    )
)]
pub async fn get_plan_handler(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<FamilyMember>,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<WeeklyPlanDto>, ApiError> {
    let plan = planning::get_plan(state.db.as_ref(), &member, plan_id).await?;
    Ok(Json(plan.into()))
}

/// Move a plan along its validation workflow.
#[utoipa::path(
    post,
    path = "/weekly-plans/{plan_id}/status",
    request_body = ChangeStatusRequest,
    params(("plan_id" = Uuid, Path, description = "The weekly plan.")),
    responses(
        (status = 200, description = "Status changed", body = WeeklyPlanDto),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 403, description = "Not allowed to change the status", body = ErrorResponse),
        (status = 409, description = "Transition not allowed from the current status", body = ErrorResponse)
    )
)]
pub async fn change_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<FamilyMember>,
    Path(plan_id): Path<Uuid>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<WeeklyPlanDto>, ApiError> {
    let next = req.to_domain()?;
    let plan = planning::change_status(state.db.as_ref(), &member, plan_id, next, Utc::now()).await?;
    Ok(Json(plan.into()))
}

/// Reopen a validated or locked plan. Administrators only.
#[utoipa::path(
    post,
    path = "/weekly-plans/{plan_id}/unlock",
    params(("plan_id" = Uuid, Path, description = "The weekly plan.")),
    responses(
        (status = 200, description = "Plan is a draft again", body = WeeklyPlanDto),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 409, description = "The plan is not validated or locked", body = ErrorResponse)
    )
)]
pub async fn unlock_plan_handler(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<FamilyMember>,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<WeeklyPlanDto>, ApiError> {
    let plan = planning::unlock_plan(state.db.as_ref(), &member, plan_id, Utc::now()).await?;
    Ok(Json(plan.into()))
}

/// The plan's audit trail, oldest first.
#[utoipa::path(
    get,
    path = "/weekly-plans/{plan_id}/changes",
    params(("plan_id" = Uuid, Path, description = "The weekly plan.")),
    responses(
        (status = 200, description = "Change log", body = [ChangeLogDto]),
        (status = 403, description = "Another family's plan", body = ErrorResponse),
        (status = 404, description = "Plan not found", body = ErrorResponse)
    )
)]
pub async fn list_changes_handler(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<FamilyMember>,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<Vec<ChangeLogDto>>, ApiError> {
    let changes = planning::list_changes(state.db.as_ref(), &member, plan_id).await?;
    Ok(Json(changes.into_iter().map(ChangeLogDto::from).collect()))
}

/// Edit one meal: recipe, components, portions, guests, source, skip or lock.
#[utoipa::path(
    patch,
    path = "/meals/{meal_id}",
    request_body = UpdateMealRequest,
    params(("meal_id" = Uuid, Path, description = "The meal to edit.")),
    responses(
        (status = 200, description = "The updated meal", body = MealDto),
        (status = 400, description = "Invalid edit or a recipe the family may not eat", body = ErrorResponse),
        (status = 403, description = "Cutoff passed or another family's meal", body = ErrorResponse),
        (status = 404, description = "Meal or recipe not found", body = ErrorResponse),
        (status = 409, description = "The plan is validated or locked", body = ErrorResponse)
    )
)]
pub async fn update_meal_handler(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<FamilyMember>,
    Path(meal_id): Path<Uuid>,
    Json(req): Json<UpdateMealRequest>,
) -> Result<Json<MealDto>, ApiError> {
    let update = req.to_domain()?;
    let meal = planning::update_meal(state.db.as_ref(), &member, meal_id, update, Utc::now()).await?;
    Ok(Json(meal.into()))
}
