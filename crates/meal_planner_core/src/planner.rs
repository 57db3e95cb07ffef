//! crates/meal_planner_core/src/planner.rs
//!
//! Weekly plan generation. Assigns one recipe to every slot of a template,
//! mixing favorites, novelties and the rest of the catalog.
//!
//! Generation is a pure function of its inputs and the supplied random
//! number generator. All round-robin state lives in a `SelectionCursor`
//! owned by a single run.

use crate::compliance::compliant_recipes;
use crate::domain::{DayOfWeek, FamilyDietProfile, MealType, Recipe, Slot};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

//=========================================================================================
// Errors
//=========================================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanningError {
    #[error("No recipes available for this family after dietary filtering")]
    NoRecipesAvailable,
    #[error("No favorite recipes available for express generation")]
    NoFavorites,
    #[error("Only novelty recipes fit slot {slot} but the weekly cap of {cap} novelties is reached")]
    NoveltyCapReached { slot: Slot, cap: u32 },
    #[error("Invalid diet profile: {0}")]
    InvalidProfile(String),
    #[error("The slot template is empty")]
    EmptyTemplate,
    #[error("Slot {0} appears more than once in the template")]
    DuplicateSlot(Slot),
}

//=========================================================================================
// Inputs & Outputs
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Full catalog, favorites and novelties mixed by the family's ratios.
    Auto,
    /// Favorites only, plus exactly one novelty when one exists.
    Express,
}

/// The pool a recipe was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Favorite,
    Novelty,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub slot: Slot,
    pub recipe_id: Uuid,
    pub pool: PoolKind,
}

/// Something the caller should know about a plan that was still produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationWarning {
    /// No recipe avoided repeating the previous slot's category.
    CategoryRepeated { slot: Slot, category: Option<String> },
}

impl fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationWarning::CategoryRepeated { slot, category } => write!(
                f,
                "{}: category '{}' repeats the previous meal, no alternative was available",
                slot,
                category.as_deref().unwrap_or("none")
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub assignments: Vec<SlotAssignment>,
    pub warnings: Vec<GenerationWarning>,
}

impl GenerationOutcome {
    pub fn novelty_count(&self) -> usize {
        self.count(PoolKind::Novelty)
    }

    pub fn count(&self, pool: PoolKind) -> usize {
        self.assignments.iter().filter(|a| a.pool == pool).count()
    }
}

/// Round-robin positions for one generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionCursor {
    pub favorite: usize,
    pub novelty: usize,
    pub other: usize,
    pub novelties_used: u32,
}

impl SelectionCursor {
    fn position_mut(&mut self, kind: PoolKind) -> &mut usize {
        match kind {
            PoolKind::Favorite => &mut self.favorite,
            PoolKind::Novelty => &mut self.novelty,
            PoolKind::Other => &mut self.other,
        }
    }
}

//=========================================================================================
// Templates
//=========================================================================================

/// Seven days of lunch and dinner.
pub fn default_template() -> Vec<Slot> {
    DayOfWeek::ALL
        .iter()
        .flat_map(|&day| [MealType::Lunch, MealType::Dinner].map(|meal_type| Slot::new(day, meal_type)))
        .collect()
}

/// Rejects empty or duplicated templates and returns the slots in planning order.
pub fn validate_template(slots: &[Slot]) -> Result<Vec<Slot>, PlanningError> {
    if slots.is_empty() {
        return Err(PlanningError::EmptyTemplate);
    }
    let mut seen = HashSet::with_capacity(slots.len());
    for slot in slots {
        if !seen.insert(*slot) {
            return Err(PlanningError::DuplicateSlot(*slot));
        }
    }
    let mut ordered = slots.to_vec();
    ordered.sort();
    Ok(ordered)
}

//=========================================================================================
// Pools & Round-robin Selection
//=========================================================================================

/// Compliant recipes split by how they are picked.
#[derive(Debug, Default)]
pub struct RecipePools<'a> {
    pub favorites: Vec<&'a Recipe>,
    pub novelties: Vec<&'a Recipe>,
    pub others: Vec<&'a Recipe>,
}

impl<'a> RecipePools<'a> {
    /// A recipe flagged both favorite and novelty is treated as a favorite.
    pub fn partition(recipes: impl IntoIterator<Item = &'a Recipe>) -> Self {
        let mut pools = Self::default();
        for recipe in recipes {
            if recipe.is_favorite {
                pools.favorites.push(recipe);
            } else if recipe.is_novelty {
                pools.novelties.push(recipe);
            } else {
                pools.others.push(recipe);
            }
        }
        pools
    }

    pub fn get(&self, kind: PoolKind) -> &[&'a Recipe] {
        match kind {
            PoolKind::Favorite => &self.favorites,
            PoolKind::Novelty => &self.novelties,
            PoolKind::Other => &self.others,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty() && self.novelties.is_empty() && self.others.is_empty()
    }
}

/// The recipe at round-robin position `index`. Positions wrap around the pool.
pub fn round_robin<'a>(pool: &[&'a Recipe], index: usize) -> Option<&'a Recipe> {
    if pool.is_empty() {
        None
    } else {
        Some(pool[index % pool.len()])
    }
}

fn repeats_category(recipe: &Recipe, previous: Option<&str>) -> bool {
    match (recipe.category.as_deref(), previous) {
        (Some(current), Some(previous)) => current.trim().eq_ignore_ascii_case(previous.trim()),
        _ => false,
    }
}

/// Walks the pool from `position` and takes the first recipe whose category
/// differs from `previous`. On success `position` moves past the pick.
fn next_eligible<'a>(
    pool: &[&'a Recipe],
    position: &mut usize,
    previous: Option<&str>,
) -> Option<&'a Recipe> {
    (0..pool.len()).find_map(|offset| {
        let at = *position + offset;
        let recipe = round_robin(pool, at)?;
        if repeats_category(recipe, previous) {
            None
        } else {
            *position = at + 1;
            Some(recipe)
        }
    })
}

fn next_any<'a>(pool: &[&'a Recipe], position: &mut usize) -> Option<&'a Recipe> {
    let recipe = round_robin(pool, *position)?;
    *position += 1;
    Some(recipe)
}

struct Pick<'a> {
    recipe: &'a Recipe,
    pool: PoolKind,
    relaxed: bool,
}

//=========================================================================================
// The Generator
//=========================================================================================

/// Plans meals for one family out of its compliant recipes.
pub struct PlanGenerator<'a> {
    profile: &'a FamilyDietProfile,
    pools: RecipePools<'a>,
}

impl<'a> PlanGenerator<'a> {
    /// Validates the profile and drops every recipe the family may not eat.
    pub fn new(profile: &'a FamilyDietProfile, recipes: &'a [Recipe]) -> Result<Self, PlanningError> {
        if !(0.0..=1.0).contains(&profile.favorite_ratio) {
            return Err(PlanningError::InvalidProfile(format!(
                "favorite ratio {} is outside [0, 1]",
                profile.favorite_ratio
            )));
        }
        let pools = RecipePools::partition(compliant_recipes(profile, recipes));
        Ok(Self { profile, pools })
    }

    /// How many of `recipe_ids` are drawn from the novelty pool.
    pub fn count_novelties(&self, recipe_ids: impl IntoIterator<Item = Uuid>) -> u32 {
        let novelties: HashSet<Uuid> = self.pools.novelties.iter().map(|r| r.id).collect();
        let count = recipe_ids.into_iter().filter(|id| novelties.contains(id)).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Assigns a recipe to every slot of `slots`, in planning order.
    pub fn generate<R: Rng>(
        &self,
        mode: GenerationMode,
        slots: &[Slot],
        rng: &mut R,
    ) -> Result<GenerationOutcome, PlanningError> {
        self.generate_with(mode, slots, 0, rng)
    }

    /// Like [`generate`](Self::generate) for a partial week whose other meals
    /// already hold `novelties_used` novelties. Those count against the weekly cap.
    pub fn generate_with<R: Rng>(
        &self,
        mode: GenerationMode,
        slots: &[Slot],
        novelties_used: u32,
        rng: &mut R,
    ) -> Result<GenerationOutcome, PlanningError> {
        let slots = validate_template(slots)?;
        match mode {
            GenerationMode::Auto => self.generate_auto(&slots, novelties_used, rng),
            GenerationMode::Express => self.generate_express(&slots, novelties_used, rng),
        }
    }

    fn generate_auto<R: Rng>(
        &self,
        slots: &[Slot],
        novelties_used: u32,
        rng: &mut R,
    ) -> Result<GenerationOutcome, PlanningError> {
        if self.pools.is_empty() {
            return Err(PlanningError::NoRecipesAvailable);
        }

        let mut cursor = SelectionCursor {
            novelties_used,
            ..SelectionCursor::default()
        };
        let mut outcome = GenerationOutcome::default();
        let mut previous_category: Option<&str> = None;

        for &slot in slots {
            let pick = self.pick_auto(slot, &mut cursor, previous_category, rng)?;
            if pick.relaxed {
                outcome.warnings.push(GenerationWarning::CategoryRepeated {
                    slot,
                    category: pick.recipe.category.clone(),
                });
            }
            outcome.assignments.push(SlotAssignment {
                slot,
                recipe_id: pick.recipe.id,
                pool: pick.pool,
            });
            previous_category = pick.recipe.category.as_deref();
        }

        Ok(outcome)
    }

    fn pick_auto<R: Rng>(
        &self,
        slot: Slot,
        cursor: &mut SelectionCursor,
        previous: Option<&str>,
        rng: &mut R,
    ) -> Result<Pick<'a>, PlanningError> {
        let novelty_allowed = cursor.novelties_used < self.profile.max_novelties;

        if novelty_allowed {
            if let Some(recipe) = next_eligible(&self.pools.novelties, &mut cursor.novelty, previous) {
                cursor.novelties_used += 1;
                return Ok(Pick { recipe, pool: PoolKind::Novelty, relaxed: false });
            }
        }

        let order = if rng.gen_bool(self.profile.favorite_ratio) {
            [PoolKind::Favorite, PoolKind::Other]
        } else {
            [PoolKind::Other, PoolKind::Favorite]
        };
        for kind in order {
            let pool = self.pools.get(kind);
            if let Some(recipe) = next_eligible(pool, cursor.position_mut(kind), previous) {
                return Ok(Pick { recipe, pool: kind, relaxed: false });
            }
        }

        // Nothing avoids the previous category: take the next recipe regardless.
        for kind in [PoolKind::Favorite, PoolKind::Other] {
            let pool = self.pools.get(kind);
            if let Some(recipe) = next_any(pool, cursor.position_mut(kind)) {
                return Ok(Pick { recipe, pool: kind, relaxed: true });
            }
        }
        if novelty_allowed {
            if let Some(recipe) = next_any(&self.pools.novelties, &mut cursor.novelty) {
                cursor.novelties_used += 1;
                return Ok(Pick { recipe, pool: PoolKind::Novelty, relaxed: true });
            }
        }

        if self.pools.novelties.is_empty() {
            Err(PlanningError::NoRecipesAvailable)
        } else {
            Err(PlanningError::NoveltyCapReached {
                slot,
                cap: self.profile.max_novelties,
            })
        }
    }

    fn generate_express<R: Rng>(
        &self,
        slots: &[Slot],
        novelties_used: u32,
        rng: &mut R,
    ) -> Result<GenerationOutcome, PlanningError> {
        let favorites = &self.pools.favorites;
        if favorites.is_empty() {
            return Err(PlanningError::NoFavorites);
        }

        let mut assignments: Vec<SlotAssignment> = slots
            .iter()
            .enumerate()
            .filter_map(|(index, &slot)| {
                round_robin(favorites, index).map(|recipe| SlotAssignment {
                    slot,
                    recipe_id: recipe.id,
                    pool: PoolKind::Favorite,
                })
            })
            .collect();

        // One novelty per week; a kept meal may already hold it.
        let novelty = if novelties_used == 0 {
            self.pools.novelties.choose(rng)
        } else {
            None
        };
        if let Some(novelty) = novelty {
            let at = rng.gen_range(0..assignments.len());
            assignments[at].recipe_id = novelty.id;
            assignments[at].pool = PoolKind::Novelty;
        }

        Ok(GenerationOutcome {
            assignments,
            warnings: Vec::new(),
        })
    }
}

/// One-shot generation: filter, partition and assign.
pub fn generate<R: Rng>(
    profile: &FamilyDietProfile,
    recipes: &[Recipe],
    mode: GenerationMode,
    slots: &[Slot],
    rng: &mut R,
) -> Result<GenerationOutcome, PlanningError> {
    PlanGenerator::new(profile, recipes)?.generate(mode, slots, rng)
}
