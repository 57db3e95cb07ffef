//! crates/meal_planner_core/src/compliance.rs
//!
//! Hard dietary filtering. A recipe that breaks any of the family's
//! requirements never reaches recipe selection.

use crate::domain::{FamilyDietProfile, Recipe};
use std::fmt;

/// Why a recipe cannot be served to a family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The recipe lacks a dietary flag the family requires.
    MissingDiet(&'static str),
    /// An ingredient matches one of the family's allergies.
    Allergen { ingredient: String, allergy: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingDiet(flag) => write!(f, "recipe is not {}", flag),
            Violation::Allergen { ingredient, allergy } => {
                write!(f, "ingredient '{}' matches allergy '{}'", ingredient, allergy)
            }
        }
    }
}

/// Lists every rule of `profile` that `recipe` breaks.
///
/// An allergy matches an ingredient when it equals one of the ingredient's
/// allergen tags or appears in its name, ignoring case.
pub fn violations(profile: &FamilyDietProfile, recipe: &Recipe) -> Vec<Violation> {
    let mut found: Vec<Violation> = recipe
        .diet
        .missing(&profile.requirements)
        .into_iter()
        .map(Violation::MissingDiet)
        .collect();

    for allergy in profile.allergies.iter().map(|a| a.trim()).filter(|a| !a.is_empty()) {
        let needle = allergy.to_lowercase();
        for ingredient in &recipe.ingredients {
            if ingredient.has_allergen(allergy) || ingredient.name.to_lowercase().contains(&needle) {
                found.push(Violation::Allergen {
                    ingredient: ingredient.name.clone(),
                    allergy: allergy.to_string(),
                });
            }
        }
    }

    found
}

pub fn is_compliant(profile: &FamilyDietProfile, recipe: &Recipe) -> bool {
    violations(profile, recipe).is_empty()
}

/// The recipes of `recipes` the family may eat, in their original order.
pub fn compliant_recipes<'a>(profile: &FamilyDietProfile, recipes: &'a [Recipe]) -> Vec<&'a Recipe> {
    recipes.iter().filter(|r| is_compliant(profile, r)).collect()
}
