//! services/api/src/planning.rs
//!
//! The request workflows behind the REST handlers. Each one loads what the
//! pure core needs through the `DatabaseService` port, runs the computation,
//! persists the result and appends to the plan's audit trail.
//!
//! Handlers stay thin so these functions can be driven directly in tests.

use crate::error::ApiError;
use chrono::{DateTime, Utc};
use meal_planner_core::audit::{log_entry, ChangeEvent};
use meal_planner_core::compliance::violations;
use meal_planner_core::lifecycle::{ensure_meals_editable, ensure_regenerable, transition, unlock};
use meal_planner_core::planner::{default_template, validate_template, GenerationWarning};
use meal_planner_core::ports::{DatabaseService, PortError};
use meal_planner_core::shopping::{aggregate, needs_groceries};
use meal_planner_core::{
    AggregationInput, ComponentRole, FamilyDietProfile, FamilyMember, GenerationMode, GenerationOutcome,
    GuestEntry, Meal, MealComponent, MealSource, PlanChangeLog, PlanGenerator, PlanStatus, Recipe,
    ShoppingItem, ShoppingList, Slot, WeeklyPlan,
};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};
use uuid::Uuid;

//=========================================================================================
// Inputs & Outputs
//=========================================================================================

/// Which week to plan and, optionally, which slots.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub week_number: u32,
    pub year: i32,
    /// Defaults to lunch and dinner on every day.
    pub slots: Option<Vec<Slot>>,
    pub cutoff_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct GeneratedPlan {
    pub plan: WeeklyPlan,
    pub warnings: Vec<GenerationWarning>,
}

/// A partial edit of one meal. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct MealUpdate {
    pub recipe_id: Option<Uuid>,
    /// Replaces the meal's components; the main one (or the first) becomes the
    /// meal's recipe. The list must not be empty.
    pub components: Option<Vec<(Uuid, ComponentRole)>>,
    pub portions: Option<u32>,
    pub skipped: Option<bool>,
    pub skip_reason: Option<String>,
    pub locked: Option<bool>,
    pub source: Option<MealSource>,
    pub guests: Option<Vec<GuestEntry>>,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn ensure_family(actor: &FamilyMember, family_id: Uuid) -> Result<(), ApiError> {
    if actor.family_id == family_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden("this resource belongs to another family".to_string()))
    }
}

async fn load_own_plan(
    db: &dyn DatabaseService,
    actor: &FamilyMember,
    plan_id: Uuid,
) -> Result<WeeklyPlan, ApiError> {
    let plan = db.get_weekly_plan(plan_id).await?;
    ensure_family(actor, plan.family_id)?;
    Ok(plan)
}

async fn record(db: &dyn DatabaseService, entry: PlanChangeLog) -> Result<(), ApiError> {
    db.append_change_log(&entry).await?;
    Ok(())
}

/// Loads `ids` and rejects any recipe that is unknown or the family may not eat.
async fn load_compliant_recipes(
    db: &dyn DatabaseService,
    profile: &FamilyDietProfile,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, Recipe>, ApiError> {
    let recipes: HashMap<Uuid, Recipe> = db.get_recipes(ids).await?.into_iter().map(|r| (r.id, r)).collect();
    for id in ids {
        let recipe = recipes
            .get(id)
            .ok_or_else(|| PortError::NotFound(format!("Recipe {} not found", id)))?;
        let problems = violations(profile, recipe);
        if !problems.is_empty() {
            let reasons: Vec<String> = problems.iter().map(ToString::to_string).collect();
            return Err(ApiError::BadRequest(format!(
                "Recipe '{}' does not fit the family's diet: {}",
                recipe.title,
                reasons.join(", ")
            )));
        }
    }
    Ok(recipes)
}

//=========================================================================================
// Weekly Plans
//=========================================================================================

/// Generates (or regenerates) the family's plan for one week.
///
/// Locked meals of an existing plan keep their recipe, and novelties among them
/// count against the weekly cap. Every other slot of the template is
/// reassigned. Unlocked meals outside the template are dropped. A shopping list
/// that already exists for the plan is rebuilt.
pub async fn generate_plan<R: Rng + Send>(
    db: &dyn DatabaseService,
    actor: &FamilyMember,
    family_id: Uuid,
    mode: GenerationMode,
    request: GenerateRequest,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<GeneratedPlan, ApiError> {
    ensure_family(actor, family_id)?;
    if !(1..=53).contains(&request.week_number) {
        return Err(ApiError::BadRequest(format!(
            "week number {} is outside 1..=53",
            request.week_number
        )));
    }
    let template = match &request.slots {
        Some(slots) => validate_template(slots)?,
        None => default_template(),
    };

    let profile = db.get_diet_profile(family_id).await?;
    let recipes = db.list_recipes(family_id).await?;
    let existing = db.find_weekly_plan(family_id, request.week_number, request.year).await?;
    if let Some(plan) = &existing {
        ensure_regenerable(plan)?;
        ensure_meals_editable(plan, actor.role, now)?;
    }
    let portions = db.count_family_members(family_id).await?.max(1);

    let mut plan =
        existing.unwrap_or_else(|| WeeklyPlan::new(family_id, request.week_number, request.year, now));
    if request.cutoff_at.is_some() {
        plan.cutoff_at = request.cutoff_at;
    }

    let open_slots: Vec<Slot> = template
        .iter()
        .copied()
        .filter(|slot| !plan.meal_at(*slot).is_some_and(|m| m.locked))
        .collect();
    let outcome = if open_slots.is_empty() {
        GenerationOutcome::default()
    } else {
        let generator = PlanGenerator::new(&profile, &recipes)?;
        let kept_novelties =
            generator.count_novelties(plan.meals.iter().filter(|m| m.locked).flat_map(Meal::recipe_ids));
        generator.generate_with(mode, &open_slots, kept_novelties, rng)?
    };

    plan.meals.retain(|m| m.locked || template.contains(&m.slot()));
    for assignment in &outcome.assignments {
        match plan.meal_at_mut(assignment.slot) {
            Some(meal) => {
                meal.recipe_id = Some(assignment.recipe_id);
                meal.components.clear();
                meal.skipped = false;
                meal.skip_reason = None;
            }
            None => {
                let mut meal = Meal::empty(plan.id, assignment.slot, portions);
                meal.recipe_id = Some(assignment.recipe_id);
                plan.meals.push(meal);
            }
        }
    }
    plan.sort_meals();

    for warning in &outcome.warnings {
        warn!("Plan {}: {}", plan.id, warning);
    }

    db.save_weekly_plan(&plan).await?;
    let event = ChangeEvent::PlanGenerated {
        mode,
        slots: outcome.assignments.len(),
    };
    record(db, log_entry(plan.id, None, Some(actor.id), &event, now)).await?;
    refresh_existing_list(db, &plan, actor.id, now).await?;

    info!(
        "Generated {:?} plan {} for family {} (week {}/{}, {} novelties)",
        mode,
        plan.id,
        family_id,
        plan.week_number,
        plan.year,
        outcome.novelty_count()
    );

    Ok(GeneratedPlan {
        plan,
        warnings: outcome.warnings,
    })
}

pub async fn get_plan(db: &dyn DatabaseService, actor: &FamilyMember, plan_id: Uuid) -> Result<WeeklyPlan, ApiError> {
    load_own_plan(db, actor, plan_id).await
}

/// Applies a status transition requested by `actor`.
pub async fn change_status(
    db: &dyn DatabaseService,
    actor: &FamilyMember,
    plan_id: Uuid,
    next: PlanStatus,
    now: DateTime<Utc>,
) -> Result<WeeklyPlan, ApiError> {
    let mut plan = load_own_plan(db, actor, plan_id).await?;
    let from = plan.status;
    plan.status = transition(from, next, actor.role)?;

    db.update_plan_status(plan.id, plan.status).await?;
    let event = ChangeEvent::StatusChanged { from, to: plan.status };
    record(db, log_entry(plan.id, None, Some(actor.id), &event, now)).await?;
    info!("Plan {} moved from {} to {}", plan.id, from, plan.status);
    Ok(plan)
}

/// Reopens a validated or locked plan as a draft.
pub async fn unlock_plan(
    db: &dyn DatabaseService,
    actor: &FamilyMember,
    plan_id: Uuid,
    now: DateTime<Utc>,
) -> Result<WeeklyPlan, ApiError> {
    let mut plan = load_own_plan(db, actor, plan_id).await?;
    let from = plan.status;
    plan.status = unlock(from, actor.role)?;

    db.update_plan_status(plan.id, plan.status).await?;
    record(db, log_entry(plan.id, None, Some(actor.id), &ChangeEvent::Unlocked { from }, now)).await?;
    info!("Plan {} unlocked by member {}", plan.id, actor.id);
    Ok(plan)
}

pub async fn list_changes(
    db: &dyn DatabaseService,
    actor: &FamilyMember,
    plan_id: Uuid,
) -> Result<Vec<PlanChangeLog>, ApiError> {
    load_own_plan(db, actor, plan_id).await?;
    Ok(db.list_change_log(plan_id).await?)
}

//=========================================================================================
// Meals
//=========================================================================================

/// Applies a partial edit to one meal, logging one entry per changed aspect.
pub async fn update_meal(
    db: &dyn DatabaseService,
    actor: &FamilyMember,
    meal_id: Uuid,
    update: MealUpdate,
    now: DateTime<Utc>,
) -> Result<Meal, ApiError> {
    if update.recipe_id.is_some() && update.components.is_some() {
        return Err(ApiError::BadRequest(
            "set either a recipe or components, not both".to_string(),
        ));
    }

    if update.components.as_ref().is_some_and(Vec::is_empty) {
        return Err(ApiError::BadRequest(
            "a composed meal needs at least one component".to_string(),
        ));
    }

    let mut meal = db.get_meal(meal_id).await?;
    let mut plan = load_own_plan(db, actor, meal.weekly_plan_id).await?;
    ensure_meals_editable(&plan, actor.role, now)?;

    let slot = meal.slot();
    let mut events = Vec::new();

    if let Some(recipe_id) = update.recipe_id {
        if meal.recipe_id != Some(recipe_id) || !meal.components.is_empty() {
            let profile = db.get_diet_profile(plan.family_id).await?;
            let recipes = load_compliant_recipes(db, &profile, &[recipe_id]).await?;
            let title = recipes.get(&recipe_id).map(|r| r.title.clone()).unwrap_or_default();
            meal.recipe_id = Some(recipe_id);
            meal.components.clear();
            events.push(ChangeEvent::RecipeChanged { slot, recipe_title: title });
        }
    }

    if let Some(components) = update.components {
        let ids: Vec<Uuid> = components.iter().map(|(id, _)| *id).collect();
        let profile = db.get_diet_profile(plan.family_id).await?;
        let recipes = load_compliant_recipes(db, &profile, &ids).await?;
        let titles: Vec<&str> = ids
            .iter()
            .filter_map(|id| recipes.get(id).map(|r| r.title.as_str()))
            .collect();

        meal.recipe_id = components
            .iter()
            .find(|(_, role)| *role == ComponentRole::Main)
            .or_else(|| components.first())
            .map(|(id, _)| *id);
        meal.components = components
            .iter()
            .map(|(recipe_id, role)| MealComponent {
                id: Uuid::new_v4(),
                recipe_id: *recipe_id,
                role: *role,
            })
            .collect();
        events.push(ChangeEvent::RecipeChanged {
            slot,
            recipe_title: titles.join(" + "),
        });
    }

    if let Some(portions) = update.portions {
        if portions != meal.portions {
            events.push(ChangeEvent::PortionsChanged {
                slot,
                from: meal.portions,
                to: portions,
            });
            meal.portions = portions;
        }
    }

    match update.skipped {
        Some(true) if !meal.skipped => {
            meal.skipped = true;
            meal.skip_reason = update.skip_reason.filter(|r| !r.trim().is_empty());
            events.push(ChangeEvent::MealSkipped {
                slot,
                reason: meal.skip_reason.clone(),
            });
        }
        Some(false) if meal.skipped => {
            meal.skipped = false;
            meal.skip_reason = None;
            events.push(ChangeEvent::MealRestored { slot });
        }
        _ => {}
    }

    if let Some(locked) = update.locked {
        if locked != meal.locked {
            meal.locked = locked;
            events.push(ChangeEvent::LockChanged { slot, locked });
        }
    }

    if let Some(source) = update.source {
        if source != meal.source {
            meal.source = source;
            events.push(ChangeEvent::SourceChanged { slot, source });
        }
    }

    if let Some(guests) = update.guests {
        if guests != meal.guests {
            let total = guests
                .iter()
                .fold(0u32, |n, g| n.saturating_add(g.adults).saturating_add(g.children));
            meal.guests = guests;
            events.push(ChangeEvent::GuestsChanged { slot, guests: total });
        }
    }

    if events.is_empty() {
        return Ok(meal);
    }

    db.update_meal(&meal).await?;
    for event in &events {
        record(db, log_entry(plan.id, Some(meal.id), Some(actor.id), event, now)).await?;
    }
    if events.iter().any(changes_groceries) {
        if let Some(stored) = plan.meals.iter_mut().find(|m| m.id == meal.id) {
            *stored = meal.clone();
        }
        refresh_existing_list(db, &plan, actor.id, now).await?;
    }
    info!("Meal {} ({}) updated with {} change(s)", meal.id, slot, events.len());
    Ok(meal)
}

fn changes_groceries(event: &ChangeEvent) -> bool {
    !matches!(event, ChangeEvent::LockChanged { .. })
}

//=========================================================================================
// Shopping Lists
//=========================================================================================

/// Recomputes the plan's shopping list from scratch and replaces the stored one.
pub async fn regenerate_shopping_list(
    db: &dyn DatabaseService,
    actor: &FamilyMember,
    plan_id: Uuid,
    now: DateTime<Utc>,
) -> Result<ShoppingList, ApiError> {
    let plan = load_own_plan(db, actor, plan_id).await?;
    rebuild_list(db, &plan, actor.id, now).await
}

/// Rebuilds the plan's list after its meals changed, if it has one.
async fn refresh_existing_list(
    db: &dyn DatabaseService,
    plan: &WeeklyPlan,
    member_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    match db.get_shopping_list(plan.id).await {
        Ok(_) => {
            rebuild_list(db, plan, member_id, now).await?;
            Ok(())
        }
        Err(PortError::NotFound(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

async fn rebuild_list(
    db: &dyn DatabaseService,
    plan: &WeeklyPlan,
    member_id: Uuid,
    now: DateTime<Utc>,
) -> Result<ShoppingList, ApiError> {
    let profile = db.get_diet_profile(plan.family_id).await?;
    let inventory = db.list_inventory(plan.family_id).await?;

    let recipe_ids: Vec<Uuid> = plan
        .meals
        .iter()
        .filter(|m| needs_groceries(m))
        .flat_map(Meal::recipe_ids)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let recipes: HashMap<Uuid, Recipe> = db
        .get_recipes(&recipe_ids)
        .await?
        .into_iter()
        .map(|r| (r.id, r))
        .collect();

    let items = aggregate(&AggregationInput {
        plan,
        recipes: &recipes,
        profile: &profile,
        inventory: &inventory,
    })?;

    let list = ShoppingList {
        id: Uuid::new_v4(),
        weekly_plan_id: plan.id,
        items,
        generated_at: now,
    };
    db.replace_shopping_list(&list).await?;

    let event = ChangeEvent::ShoppingListGenerated { items: list.items.len() };
    record(db, log_entry(plan.id, None, Some(member_id), &event, now)).await?;
    info!("Shopping list for plan {} regenerated with {} items", plan.id, list.items.len());
    Ok(list)
}

pub async fn get_shopping_list(
    db: &dyn DatabaseService,
    actor: &FamilyMember,
    plan_id: Uuid,
) -> Result<ShoppingList, ApiError> {
    load_own_plan(db, actor, plan_id).await?;
    Ok(db.get_shopping_list(plan_id).await?)
}

/// Ticks an item off or marks it as already in the pantry.
pub async fn set_item_flags(
    db: &dyn DatabaseService,
    actor: &FamilyMember,
    item_id: Uuid,
    checked: Option<bool>,
    in_stock: Option<bool>,
) -> Result<ShoppingItem, ApiError> {
    let plan_id = db.find_plan_for_shopping_item(item_id).await?;
    load_own_plan(db, actor, plan_id).await?;

    let mut item = db
        .get_shopping_list(plan_id)
        .await?
        .items
        .into_iter()
        .find(|i| i.id == item_id)
        .ok_or_else(|| PortError::NotFound(format!("Shopping item {} not found", item_id)))?;

    item.checked = checked.unwrap_or(item.checked);
    item.in_stock = in_stock.unwrap_or(item.in_stock);
    db.update_shopping_item(item.id, item.checked, item.in_stock).await?;
    Ok(item)
}
