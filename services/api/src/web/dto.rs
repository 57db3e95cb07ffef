//! services/api/src/web/dto.rs
//!
//! JSON payloads of the REST API. Enums travel as their lowercase names and are
//! parsed into the core types at the edge.

use crate::error::ApiError;
use crate::planning::{GenerateRequest, GeneratedPlan, MealUpdate};
use chrono::{DateTime, Utc};
use meal_planner_core::domain::ParseEnumError;
use meal_planner_core::{
    ComponentRole, GuestEntry, Meal, MealSource, PlanChangeLog, PlanStatus, ShoppingItem, ShoppingList, Slot,
    WeeklyPlan,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

fn parse<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = ParseEnumError>,
{
    raw.parse().map_err(|e: ParseEnumError| ApiError::BadRequest(e.to_string()))
}

/// Counts are persisted as 32-bit signed integers.
fn count(value: u32, field: &str) -> Result<u32, ApiError> {
    if value > i32::MAX as u32 {
        Err(ApiError::BadRequest(format!("{} must be at most {}", field, i32::MAX)))
    } else {
        Ok(value)
    }
}

//=========================================================================================
// Requests
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlotDto {
    /// `monday` .. `sunday`
    pub day: String,
    /// `breakfast`, `lunch`, `snack` or `dinner`
    pub meal_type: String,
}

impl SlotDto {
    pub fn to_domain(&self) -> Result<Slot, ApiError> {
        Ok(Slot::new(parse(&self.day)?, parse(&self.meal_type)?))
    }
}

impl From<Slot> for SlotDto {
    fn from(slot: Slot) -> Self {
        Self {
            day: slot.day.to_string(),
            meal_type: slot.meal_type.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GeneratePlanRequest {
    pub week_number: u32,
    pub year: i32,
    /// Lunch and dinner on every day when omitted.
    pub slots: Option<Vec<SlotDto>>,
    pub cutoff_at: Option<DateTime<Utc>>,
}

impl GeneratePlanRequest {
    pub fn to_domain(&self) -> Result<GenerateRequest, ApiError> {
        let slots = match &self.slots {
            Some(slots) => Some(slots.iter().map(SlotDto::to_domain).collect::<Result<Vec<_>, _>>()?),
            None => None,
        };
        Ok(GenerateRequest {
            week_number: self.week_number,
            year: self.year,
            slots,
            cutoff_at: self.cutoff_at,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GuestDto {
    pub adults: u32,
    pub children: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ComponentInput {
    pub recipe_id: Uuid,
    /// `starter`, `main`, `side` or `dessert`
    pub role: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateMealRequest {
    pub recipe_id: Option<Uuid>,
    pub components: Option<Vec<ComponentInput>>,
    pub portions: Option<u32>,
    pub skipped: Option<bool>,
    pub skip_reason: Option<String>,
    pub locked: Option<bool>,
    /// `home`, `school` or `external`
    pub source: Option<String>,
    pub guests: Option<Vec<GuestDto>>,
}

impl UpdateMealRequest {
    pub fn to_domain(self) -> Result<MealUpdate, ApiError> {
        let components = match self.components {
            Some(list) => Some(
                list.iter()
                    .map(|c| -> Result<(Uuid, ComponentRole), ApiError> { Ok((c.recipe_id, parse(&c.role)?)) })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };
        let source: Option<MealSource> = match self.source.as_deref() {
            Some(raw) => Some(parse(raw)?),
            None => None,
        };
        let portions = match self.portions {
            Some(portions) => Some(count(portions, "portions")?),
            None => None,
        };
        let guests = match self.guests {
            Some(guests) => Some(
                guests
                    .into_iter()
                    .map(|g| -> Result<GuestEntry, ApiError> {
                        Ok(GuestEntry {
                            adults: count(g.adults, "adults")?,
                            children: count(g.children, "children")?,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };
        Ok(MealUpdate {
            recipe_id: self.recipe_id,
            components,
            portions,
            skipped: self.skipped,
            skip_reason: self.skip_reason,
            locked: self.locked,
            source,
            guests,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeStatusRequest {
    /// `draft`, `in_validation`, `validated` or `locked`
    pub status: String,
}

impl ChangeStatusRequest {
    pub fn to_domain(&self) -> Result<PlanStatus, ApiError> {
        parse(&self.status)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateShoppingItemRequest {
    pub checked: Option<bool>,
    pub in_stock: Option<bool>,
}

//=========================================================================================
// Responses
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct MealComponentDto {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub role: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MealDto {
    pub id: Uuid,
    pub weekly_plan_id: Uuid,
    pub day: String,
    pub meal_type: String,
    pub recipe_id: Option<Uuid>,
    pub components: Vec<MealComponentDto>,
    pub portions: u32,
    pub locked: bool,
    pub skipped: bool,
    pub skip_reason: Option<String>,
    pub source: String,
    pub guests: Vec<GuestDto>,
}

impl From<Meal> for MealDto {
    fn from(meal: Meal) -> Self {
        Self {
            id: meal.id,
            weekly_plan_id: meal.weekly_plan_id,
            day: meal.day.to_string(),
            meal_type: meal.meal_type.to_string(),
            recipe_id: meal.recipe_id,
            components: meal
                .components
                .into_iter()
                .map(|c| MealComponentDto {
                    id: c.id,
                    recipe_id: c.recipe_id,
                    role: c.role.to_string(),
                })
                .collect(),
            portions: meal.portions,
            locked: meal.locked,
            skipped: meal.skipped,
            skip_reason: meal.skip_reason,
            source: meal.source.to_string(),
            guests: meal
                .guests
                .into_iter()
                .map(|g| GuestDto {
                    adults: g.adults,
                    children: g.children,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WeeklyPlanDto {
    pub id: Uuid,
    pub family_id: Uuid,
    pub week_number: u32,
    pub year: i32,
    pub status: String,
    pub cutoff_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub meals: Vec<MealDto>,
}

impl From<WeeklyPlan> for WeeklyPlanDto {
    fn from(plan: WeeklyPlan) -> Self {
        Self {
            id: plan.id,
            family_id: plan.family_id,
            week_number: plan.week_number,
            year: plan.year,
            status: plan.status.to_string(),
            cutoff_at: plan.cutoff_at,
            created_at: plan.created_at,
            meals: plan.meals.into_iter().map(MealDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GeneratedPlanResponse {
    pub plan: WeeklyPlanDto,
    /// Slots where no recipe avoided repeating the previous meal's category.
    pub warnings: Vec<String>,
}

impl From<GeneratedPlan> for GeneratedPlanResponse {
    fn from(generated: GeneratedPlan) -> Self {
        Self {
            warnings: generated.warnings.iter().map(ToString::to_string).collect(),
            plan: generated.plan.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShoppingItemDto {
    pub id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: String,
    pub checked: bool,
    pub in_stock: bool,
    pub alternatives: Vec<String>,
}

impl From<ShoppingItem> for ShoppingItemDto {
    fn from(item: ShoppingItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            quantity: item.quantity,
            unit: item.unit,
            category: item.category,
            checked: item.checked,
            in_stock: item.in_stock,
            alternatives: item.alternatives,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShoppingListDto {
    pub id: Uuid,
    pub weekly_plan_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub items: Vec<ShoppingItemDto>,
}

impl From<ShoppingList> for ShoppingListDto {
    fn from(list: ShoppingList) -> Self {
        Self {
            id: list.id,
            weekly_plan_id: list.weekly_plan_id,
            generated_at: list.generated_at,
            items: list.items.into_iter().map(ShoppingItemDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChangeLogDto {
    pub id: Uuid,
    pub meal_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
    pub change_type: String,
    pub description_en: String,
    pub description_fr: String,
    pub description_nl: String,
    pub created_at: DateTime<Utc>,
}

impl From<PlanChangeLog> for ChangeLogDto {
    fn from(entry: PlanChangeLog) -> Self {
        Self {
            id: entry.id,
            meal_id: entry.meal_id,
            member_id: entry.member_id,
            change_type: entry.change_type.to_string(),
            description_en: entry.description.en,
            description_fr: entry.description.fr,
            description_nl: entry.description.nl,
            created_at: entry.created_at,
        }
    }
}
