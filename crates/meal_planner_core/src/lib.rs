pub mod audit;
pub mod compliance;
pub mod domain;
pub mod lifecycle;
pub mod planner;
pub mod ports;
pub mod rounding;
pub mod shopping;

pub use domain::{
    ChangeType, ComponentRole, DayOfWeek, DietaryFlags, FamilyDietProfile, FamilyMember, GuestEntry, Ingredient,
    InventoryItem, LocalizedText, Meal, MealComponent, MealSource, MealType, MemberCredentials, MemberRole,
    PlanChangeLog, PlanStatus, Recipe, ShoppingItem, ShoppingList, Slot, WeeklyPlan,
};
pub use planner::{GenerationMode, GenerationOutcome, PlanGenerator, PlanningError};
pub use ports::{DatabaseService, PortError, PortResult};
pub use shopping::{AggregationError, AggregationInput};
