//! crates/meal_planner_core/src/shopping.rs
//!
//! Turns a weekly plan into a shopping list: scales every cooked recipe to the
//! people eating it, merges identical ingredients, adds substitution hints,
//! deducts what is already in the pantry and rounds to buyable amounts.
//!
//! The list is always recomputed from scratch.

use crate::domain::{FamilyDietProfile, InventoryItem, Meal, MealSource, Recipe, ShoppingItem, WeeklyPlan};
use crate::rounding::round_quantity;
use std::collections::HashMap;
use uuid::Uuid;

/// A child guest eats this fraction of an adult portion.
pub const CHILD_PORTION_WEIGHT: f64 = 0.7;

pub const GLUTEN_FREE_HINT: &str = "gluten-free version";
pub const LACTOSE_FREE_HINT: &str = "lactose-free version";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregationError {
    #[error("Meal {meal_id} references recipe {recipe_id}, which was not loaded")]
    MissingRecipe { meal_id: Uuid, recipe_id: Uuid },
}

/// Everything the aggregation reads. Loaded by the caller beforehand.
pub struct AggregationInput<'a> {
    pub plan: &'a WeeklyPlan,
    pub recipes: &'a HashMap<Uuid, Recipe>,
    pub profile: &'a FamilyDietProfile,
    pub inventory: &'a [InventoryItem],
}

/// Whether a meal needs groceries at all.
pub fn needs_groceries(meal: &Meal) -> bool {
    !meal.skipped && meal.source == MealSource::Home && meal.portions > 0
}

/// Adults plus weighted children across all guest entries of a meal.
pub fn guest_portions(meal: &Meal) -> f64 {
    meal.guests
        .iter()
        .map(|g| f64::from(g.adults) + f64::from(g.children) * CHILD_PORTION_WEIGHT)
        .sum()
}

/// How much of `recipe` must be bought for `meal`, relative to its native servings.
pub fn scaling_factor(meal: &Meal, recipe: &Recipe) -> f64 {
    if meal.portions == 0 {
        return 0.0;
    }
    let portions = f64::from(meal.portions);
    let serving_factor = portions / f64::from(recipe.servings.max(1));
    serving_factor * (1.0 + guest_portions(meal) / portions)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct IngredientKey {
    name: String,
    unit: String,
    category: String,
}

impl IngredientKey {
    fn new(name: &str, unit: &str, category: &str) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            unit: unit.trim().to_lowercase(),
            category: category.trim().to_lowercase(),
        }
    }
}

/// An ingredient line summed over every meal. Keeps the first spelling seen.
#[derive(Debug, Clone)]
struct Accumulated {
    name: String,
    unit: String,
    category: String,
    quantity: f64,
    contains_gluten: bool,
    contains_lactose: bool,
}

/// Sums scaled ingredient quantities per (name, unit, category), sorted by
/// category then name, ignoring case. Quantities are neither deducted nor rounded.
fn accumulate(input: &AggregationInput<'_>) -> Result<Vec<Accumulated>, AggregationError> {
    let mut totals: HashMap<IngredientKey, Accumulated> = HashMap::new();

    for meal in input.plan.meals.iter().filter(|m| needs_groceries(m)) {
        for recipe_id in meal.recipe_ids() {
            let recipe = input
                .recipes
                .get(&recipe_id)
                .ok_or(AggregationError::MissingRecipe { meal_id: meal.id, recipe_id })?;
            let factor = scaling_factor(meal, recipe);

            for ingredient in &recipe.ingredients {
                let key = IngredientKey::new(&ingredient.name, &ingredient.unit, &ingredient.category);
                let entry = totals.entry(key).or_insert_with(|| Accumulated {
                    name: ingredient.name.trim().to_string(),
                    unit: ingredient.unit.trim().to_string(),
                    category: ingredient.category.trim().to_string(),
                    quantity: 0.0,
                    contains_gluten: false,
                    contains_lactose: false,
                });
                entry.quantity += ingredient.quantity * factor;
                entry.contains_gluten |= ingredient.contains_gluten();
                entry.contains_lactose |= ingredient.contains_lactose();
            }
        }
    }

    let mut lines: Vec<Accumulated> = totals.into_values().collect();
    lines.sort_by(|a, b| {
        a.category
            .to_lowercase()
            .cmp(&b.category.to_lowercase())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.unit.to_lowercase().cmp(&b.unit.to_lowercase()))
    });
    Ok(lines)
}

fn substitution_hints(line: &Accumulated, profile: &FamilyDietProfile) -> Vec<String> {
    let mut hints = Vec::new();
    if profile.requirements.lactose_free && line.contains_lactose {
        hints.insert(0, LACTOSE_FREE_HINT.to_string());
    }
    if profile.requirements.gluten_free && line.contains_gluten {
        hints.insert(0, GLUTEN_FREE_HINT.to_string());
    }
    hints
}

/// Pantry stock by lowercase name. Stock is consumed as lines claim it.
fn pantry(inventory: &[InventoryItem]) -> HashMap<String, f64> {
    let mut stock: HashMap<String, f64> = HashMap::new();
    for item in inventory.iter().filter(|i| i.quantity > 0.0) {
        *stock.entry(item.name.trim().to_lowercase()).or_insert(0.0) += item.quantity;
    }
    stock
}

/// Builds the shopping items for `input.plan`, in list order.
pub fn aggregate(input: &AggregationInput<'_>) -> Result<Vec<ShoppingItem>, AggregationError> {
    let lines = accumulate(input)?;
    let mut stock = pantry(input.inventory);

    let items = lines
        .into_iter()
        .map(|line| {
            let alternatives = substitution_hints(&line, input.profile);

            let mut required = line.quantity;
            if let Some(available) = stock.get_mut(&line.name.to_lowercase()) {
                if *available > 0.0 {
                    let used = available.min(required);
                    required -= used;
                    *available -= used;
                }
            }
            let in_stock = required == 0.0;

            ShoppingItem {
                id: Uuid::new_v4(),
                quantity: round_quantity(required, &line.unit),
                name: line.name,
                unit: line.unit,
                category: line.category,
                checked: false,
                in_stock,
                alternatives,
            }
        })
        .collect();

    Ok(items)
}
