//! crates/meal_planner_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to stay independent of the concrete database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    FamilyDietProfile, FamilyMember, InventoryItem, Meal, MemberCredentials, PlanChangeLog, PlanStatus,
    Recipe, ShoppingList, WeeklyPlan,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Auth Methods ---
    async fn get_member_credentials(&self, email: &str) -> PortResult<MemberCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        member_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the member owning a live (unexpired) session.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Families ---
    async fn get_member(&self, member_id: Uuid) -> PortResult<FamilyMember>;

    async fn count_family_members(&self, family_id: Uuid) -> PortResult<u32>;

    async fn get_diet_profile(&self, family_id: Uuid) -> PortResult<FamilyDietProfile>;

    async fn list_inventory(&self, family_id: Uuid) -> PortResult<Vec<InventoryItem>>;

    // --- Recipe Catalog ---
    async fn list_recipes(&self, family_id: Uuid) -> PortResult<Vec<Recipe>>;

    /// Loads the given recipes. Unknown ids are silently absent from the result.
    async fn get_recipes(&self, recipe_ids: &[Uuid]) -> PortResult<Vec<Recipe>>;

    // --- Weekly Plans ---
    async fn find_weekly_plan(
        &self,
        family_id: Uuid,
        week_number: u32,
        year: i32,
    ) -> PortResult<Option<WeeklyPlan>>;

    async fn get_weekly_plan(&self, plan_id: Uuid) -> PortResult<WeeklyPlan>;

    /// Inserts or updates the plan and replaces its meals with `plan.meals`,
    /// atomically.
    async fn save_weekly_plan(&self, plan: &WeeklyPlan) -> PortResult<()>;

    async fn update_plan_status(&self, plan_id: Uuid, status: PlanStatus) -> PortResult<()>;

    async fn get_meal(&self, meal_id: Uuid) -> PortResult<Meal>;

    async fn update_meal(&self, meal: &Meal) -> PortResult<()>;

    // --- Shopping Lists ---
    /// Deletes the plan's previous list, if any, and stores `list` in its place.
    async fn replace_shopping_list(&self, list: &ShoppingList) -> PortResult<()>;

    async fn get_shopping_list(&self, plan_id: Uuid) -> PortResult<ShoppingList>;

    /// The plan owning the list the item belongs to.
    async fn find_plan_for_shopping_item(&self, item_id: Uuid) -> PortResult<Uuid>;

    async fn update_shopping_item(&self, item_id: Uuid, checked: bool, in_stock: bool) -> PortResult<()>;

    // --- Audit Trail ---
    async fn append_change_log(&self, entry: &PlanChangeLog) -> PortResult<()>;

    async fn list_change_log(&self, plan_id: Uuid) -> PortResult<Vec<PlanChangeLog>>;
}
