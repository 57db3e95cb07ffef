//! crates/meal_planner_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database. They derive `serde` so that
//! adapters can store or ship them without a second set of mirror types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//=========================================================================================
// String-backed Enums
//=========================================================================================

/// Returned when a stored or submitted string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a fieldless enum together with its canonical lowercase spelling,
/// used for the database columns, the JSON payloads and `FromStr`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name { $($variant),+ }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// A day of the planning week. Declaration order is the planning order.
    pub enum DayOfWeek {
        Monday => "monday",
        Tuesday => "tuesday",
        Wednesday => "wednesday",
        Thursday => "thursday",
        Friday => "friday",
        Saturday => "saturday",
        Sunday => "sunday",
    }
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Zero-based index, Monday = 0.
    pub fn index(self) -> i16 {
        self as i16
    }

    pub fn from_index(index: i16) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

string_enum! {
    /// The kind of meal a slot holds. Declaration order is the order within a day.
    pub enum MealType {
        Breakfast => "breakfast",
        Lunch => "lunch",
        Snack => "snack",
        Dinner => "dinner",
    }
}

string_enum! {
    /// Lifecycle of a weekly plan.
    pub enum PlanStatus {
        Draft => "draft",
        InValidation => "in_validation",
        Validated => "validated",
        Locked => "locked",
    }
}

string_enum! {
    /// Where a meal is eaten. Only home meals need groceries.
    pub enum MealSource {
        Home => "home",
        School => "school",
        External => "external",
    }
}

string_enum! {
    pub enum ComponentRole {
        Starter => "starter",
        Main => "main",
        Side => "side",
        Dessert => "dessert",
    }
}

string_enum! {
    pub enum MemberRole {
        Admin => "admin",
        Adult => "adult",
        Child => "child",
    }
}

impl MemberRole {
    /// Privileged members may unlock plans and edit past the cutoff.
    pub fn is_privileged(self) -> bool {
        matches!(self, MemberRole::Admin)
    }
}

string_enum! {
    /// The kind of change recorded in a plan's audit trail.
    pub enum ChangeType {
        PlanGenerated => "plan_generated",
        MealUpdated => "meal_updated",
        MealSkipped => "meal_skipped",
        PortionsChanged => "portions_changed",
        MealLockChanged => "meal_lock_changed",
        StatusChanged => "status_changed",
        PlanUnlocked => "plan_unlocked",
        ShoppingListGenerated => "shopping_list_generated",
    }
}

//=========================================================================================
// Slots
//=========================================================================================

/// One (day, meal type) position of a weekly plan.
///
/// Ordering is day first, then meal type, which is the order plans are filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub day: DayOfWeek,
    pub meal_type: MealType,
}

impl Slot {
    pub fn new(day: DayOfWeek, meal_type: MealType) -> Self {
        Self { day, meal_type }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.meal_type)
    }
}

//=========================================================================================
// Recipes & Diet
//=========================================================================================

/// Dietary flags. On a recipe they say what it is; on a family, what it requires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietaryFlags {
    pub vegetarian: bool,
    pub vegan: bool,
    pub gluten_free: bool,
    pub lactose_free: bool,
    pub kosher: bool,
    pub halal: bool,
}

impl DietaryFlags {
    /// Names of the flags required by `required` that `self` does not carry.
    /// A vegan recipe counts as vegetarian.
    pub fn missing(&self, required: &DietaryFlags) -> Vec<&'static str> {
        let checks = [
            (required.vegetarian, self.vegetarian || self.vegan, "vegetarian"),
            (required.vegan, self.vegan, "vegan"),
            (required.gluten_free, self.gluten_free, "gluten_free"),
            (required.lactose_free, self.lactose_free, "lactose_free"),
            (required.kosher, self.kosher, "kosher"),
            (required.halal, self.halal, "halal"),
        ];
        checks
            .into_iter()
            .filter(|(needed, has, _)| *needed && !*has)
            .map(|(_, _, name)| name)
            .collect()
    }
}

/// Allergen tag marking a gluten-containing ingredient.
pub const GLUTEN_TAG: &str = "gluten";
/// Allergen tag marking a lactose-containing ingredient.
pub const LACTOSE_TAG: &str = "lactose";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: String,
    #[serde(default)]
    pub allergens: Vec<String>,
}

impl Ingredient {
    pub fn has_allergen(&self, tag: &str) -> bool {
        self.allergens
            .iter()
            .any(|a| a.trim().eq_ignore_ascii_case(tag.trim()))
    }

    pub fn contains_gluten(&self) -> bool {
        self.has_allergen(GLUTEN_TAG)
    }

    pub fn contains_lactose(&self) -> bool {
        self.has_allergen(LACTOSE_TAG)
    }
}

/// A recipe of the family's catalog. Read-only during a planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub category: Option<String>,
    /// Native serving size the ingredient quantities are written for.
    pub servings: u32,
    pub diet: DietaryFlags,
    pub is_favorite: bool,
    pub is_novelty: bool,
    pub ingredients: Vec<Ingredient>,
}

/// Per-family planning constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyDietProfile {
    pub family_id: Uuid,
    pub requirements: DietaryFlags,
    pub allergies: Vec<String>,
    /// Target fraction of non-novelty meals drawn from favorites, in [0, 1].
    pub favorite_ratio: f64,
    /// Cap on novelty recipes per generated week.
    pub max_novelties: u32,
}

//=========================================================================================
// Weekly Plans & Meals
//=========================================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestEntry {
    pub adults: u32,
    pub children: u32,
}

/// Part of a composed meal, e.g. a starter next to a main course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealComponent {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub role: ComponentRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: Uuid,
    pub weekly_plan_id: Uuid,
    pub day: DayOfWeek,
    pub meal_type: MealType,
    pub recipe_id: Option<Uuid>,
    pub components: Vec<MealComponent>,
    pub portions: u32,
    pub locked: bool,
    pub skipped: bool,
    pub skip_reason: Option<String>,
    pub source: MealSource,
    pub guests: Vec<GuestEntry>,
}

impl Meal {
    /// A fresh, home-cooked meal without a recipe.
    pub fn empty(weekly_plan_id: Uuid, slot: Slot, portions: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            weekly_plan_id,
            day: slot.day,
            meal_type: slot.meal_type,
            recipe_id: None,
            components: Vec::new(),
            portions,
            locked: false,
            skipped: false,
            skip_reason: None,
            source: MealSource::Home,
            guests: Vec::new(),
        }
    }

    pub fn slot(&self) -> Slot {
        Slot::new(self.day, self.meal_type)
    }

    /// Recipes cooked for this meal: the components when present, else the single recipe.
    pub fn recipe_ids(&self) -> Vec<Uuid> {
        if self.components.is_empty() {
            self.recipe_id.into_iter().collect()
        } else {
            self.components.iter().map(|c| c.recipe_id).collect()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlan {
    pub id: Uuid,
    pub family_id: Uuid,
    pub week_number: u32,
    pub year: i32,
    pub status: PlanStatus,
    pub cutoff_at: Option<DateTime<Utc>>,
    pub meals: Vec<Meal>,
    pub created_at: DateTime<Utc>,
}

impl WeeklyPlan {
    pub fn new(family_id: Uuid, week_number: u32, year: i32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            family_id,
            week_number,
            year,
            status: PlanStatus::Draft,
            cutoff_at: None,
            meals: Vec::new(),
            created_at: now,
        }
    }

    pub fn meal_at(&self, slot: Slot) -> Option<&Meal> {
        self.meals.iter().find(|m| m.slot() == slot)
    }

    pub fn meal_at_mut(&mut self, slot: Slot) -> Option<&mut Meal> {
        self.meals.iter_mut().find(|m| m.slot() == slot)
    }

    /// Keeps meals in planning order.
    pub fn sort_meals(&mut self) {
        self.meals.sort_by_key(Meal::slot);
    }
}

//=========================================================================================
// Shopping & Inventory
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: String,
    pub checked: bool,
    pub in_stock: bool,
    /// Substitution hints, most relevant first.
    pub alternatives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: Uuid,
    pub weekly_plan_id: Uuid,
    pub items: Vec<ShoppingItem>,
    pub generated_at: DateTime<Utc>,
}

/// Something the family already has in the pantry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

//=========================================================================================
// Members & Audit Trail
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: Uuid,
    pub family_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub role: MemberRole,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct MemberCredentials {
    pub member_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// The same sentence in every supported interface language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub fr: String,
    pub nl: String,
}

/// An append-only audit entry. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanChangeLog {
    pub id: Uuid,
    pub weekly_plan_id: Uuid,
    pub meal_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
    pub change_type: ChangeType,
    pub description: LocalizedText,
    pub created_at: DateTime<Utc>,
}
