//! An in-memory `DatabaseService` and fixtures shared by the API tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meal_planner_core::ports::{DatabaseService, PortError, PortResult};
use meal_planner_core::{
    DietaryFlags, FamilyDietProfile, FamilyMember, Ingredient, InventoryItem, Meal, MemberCredentials, MemberRole,
    PlanChangeLog, PlanStatus, Recipe, ShoppingList, WeeklyPlan,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
struct Store {
    members: HashMap<Uuid, FamilyMember>,
    profiles: HashMap<Uuid, FamilyDietProfile>,
    recipes: Vec<(Uuid, Recipe)>,
    inventory: HashMap<Uuid, Vec<InventoryItem>>,
    plans: HashMap<Uuid, WeeklyPlan>,
    lists: HashMap<Uuid, ShoppingList>,
    logs: Vec<PlanChangeLog>,
    sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
}

#[derive(Default)]
pub struct InMemoryDb {
    store: Mutex<Store>,
}

impl InMemoryDb {
    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().expect("store lock poisoned")
    }

    /// Registers a family with no dietary requirements and returns its id.
    pub fn add_family(&self) -> Uuid {
        self.add_family_with(|_| {})
    }

    pub fn add_family_with(&self, configure: impl FnOnce(&mut FamilyDietProfile)) -> Uuid {
        let mut profile = FamilyDietProfile {
            family_id: Uuid::new_v4(),
            requirements: DietaryFlags::default(),
            allergies: Vec::new(),
            favorite_ratio: 0.6,
            max_novelties: 2,
        };
        configure(&mut profile);
        let id = profile.family_id;
        self.store().profiles.insert(id, profile);
        id
    }

    pub fn add_member(&self, family_id: Uuid, role: MemberRole) -> FamilyMember {
        let member = FamilyMember {
            id: Uuid::new_v4(),
            family_id,
            display_name: format!("{} member", role),
            email: format!("{}@example.org", Uuid::new_v4()),
            role,
        };
        self.store().members.insert(member.id, member.clone());
        member
    }

    pub fn add_recipe(&self, family_id: Uuid, recipe: Recipe) -> Uuid {
        let id = recipe.id;
        self.store().recipes.push((family_id, recipe));
        id
    }

    pub fn set_inventory(&self, family_id: Uuid, items: Vec<InventoryItem>) {
        self.store().inventory.insert(family_id, items);
    }

    pub fn plan(&self, plan_id: Uuid) -> Option<WeeklyPlan> {
        self.store().plans.get(&plan_id).cloned()
    }

    pub fn logs(&self) -> Vec<PlanChangeLog> {
        self.store().logs.clone()
    }

    pub fn list_count(&self) -> usize {
        self.store().lists.len()
    }
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn get_member_credentials(&self, email: &str) -> PortResult<MemberCredentials> {
        self.store()
            .members
            .values()
            .find(|m| m.email.eq_ignore_ascii_case(email))
            .map(|m| MemberCredentials {
                member_id: m.id,
                email: m.email.clone(),
                hashed_password: String::new(),
            })
            .ok_or_else(|| PortError::NotFound(email.to_string()))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        member_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.store()
            .sessions
            .insert(session_id.to_string(), (member_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        match self.store().sessions.get(session_id) {
            Some((member_id, expires_at)) if *expires_at > Utc::now() => Ok(*member_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.store().sessions.remove(session_id);
        Ok(())
    }

    async fn get_member(&self, member_id: Uuid) -> PortResult<FamilyMember> {
        self.store()
            .members
            .get(&member_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Member {}", member_id)))
    }

    async fn count_family_members(&self, family_id: Uuid) -> PortResult<u32> {
        Ok(self.store().members.values().filter(|m| m.family_id == family_id).count() as u32)
    }

    async fn get_diet_profile(&self, family_id: Uuid) -> PortResult<FamilyDietProfile> {
        self.store()
            .profiles
            .get(&family_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Family {}", family_id)))
    }

    async fn list_inventory(&self, family_id: Uuid) -> PortResult<Vec<InventoryItem>> {
        Ok(self.store().inventory.get(&family_id).cloned().unwrap_or_default())
    }

    async fn list_recipes(&self, family_id: Uuid) -> PortResult<Vec<Recipe>> {
        Ok(self
            .store()
            .recipes
            .iter()
            .filter(|(owner, _)| *owner == family_id)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn get_recipes(&self, recipe_ids: &[Uuid]) -> PortResult<Vec<Recipe>> {
        Ok(self
            .store()
            .recipes
            .iter()
            .filter(|(_, r)| recipe_ids.contains(&r.id))
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn find_weekly_plan(
        &self,
        family_id: Uuid,
        week_number: u32,
        year: i32,
    ) -> PortResult<Option<WeeklyPlan>> {
        Ok(self
            .store()
            .plans
            .values()
            .find(|p| p.family_id == family_id && p.week_number == week_number && p.year == year)
            .cloned())
    }

    async fn get_weekly_plan(&self, plan_id: Uuid) -> PortResult<WeeklyPlan> {
        self.plan(plan_id)
            .ok_or_else(|| PortError::NotFound(format!("Weekly plan {}", plan_id)))
    }

    async fn save_weekly_plan(&self, plan: &WeeklyPlan) -> PortResult<()> {
        self.store().plans.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn update_plan_status(&self, plan_id: Uuid, status: PlanStatus) -> PortResult<()> {
        let mut store = self.store();
        let plan = store
            .plans
            .get_mut(&plan_id)
            .ok_or_else(|| PortError::NotFound(format!("Weekly plan {}", plan_id)))?;
        plan.status = status;
        Ok(())
    }

    async fn get_meal(&self, meal_id: Uuid) -> PortResult<Meal> {
        self.store()
            .plans
            .values()
            .flat_map(|p| p.meals.iter())
            .find(|m| m.id == meal_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Meal {}", meal_id)))
    }

    async fn update_meal(&self, meal: &Meal) -> PortResult<()> {
        let mut store = self.store();
        let slot = store
            .plans
            .get_mut(&meal.weekly_plan_id)
            .and_then(|p| p.meals.iter_mut().find(|m| m.id == meal.id))
            .ok_or_else(|| PortError::NotFound(format!("Meal {}", meal.id)))?;
        *slot = meal.clone();
        Ok(())
    }

    async fn replace_shopping_list(&self, list: &ShoppingList) -> PortResult<()> {
        self.store().lists.insert(list.weekly_plan_id, list.clone());
        Ok(())
    }

    async fn get_shopping_list(&self, plan_id: Uuid) -> PortResult<ShoppingList> {
        self.store()
            .lists
            .get(&plan_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("No shopping list for {}", plan_id)))
    }

    async fn find_plan_for_shopping_item(&self, item_id: Uuid) -> PortResult<Uuid> {
        self.store()
            .lists
            .values()
            .find(|l| l.items.iter().any(|i| i.id == item_id))
            .map(|l| l.weekly_plan_id)
            .ok_or_else(|| PortError::NotFound(format!("Shopping item {}", item_id)))
    }

    async fn update_shopping_item(&self, item_id: Uuid, checked: bool, in_stock: bool) -> PortResult<()> {
        let mut store = self.store();
        let item = store
            .lists
            .values_mut()
            .flat_map(|l| l.items.iter_mut())
            .find(|i| i.id == item_id)
            .ok_or_else(|| PortError::NotFound(format!("Shopping item {}", item_id)))?;
        item.checked = checked;
        item.in_stock = in_stock;
        Ok(())
    }

    async fn append_change_log(&self, entry: &PlanChangeLog) -> PortResult<()> {
        self.store().logs.push(entry.clone());
        Ok(())
    }

    async fn list_change_log(&self, plan_id: Uuid) -> PortResult<Vec<PlanChangeLog>> {
        Ok(self
            .store()
            .logs
            .iter()
            .filter(|l| l.weekly_plan_id == plan_id)
            .cloned()
            .collect())
    }
}

//=========================================================================================
// Fixtures
//=========================================================================================

pub fn ingredient(name: &str, quantity: f64, unit: &str, category: &str) -> Ingredient {
    Ingredient {
        name: name.to_string(),
        quantity,
        unit: unit.to_string(),
        category: category.to_string(),
        allergens: Vec::new(),
    }
}

pub fn recipe(title: &str, category: &str, favorite: bool, novelty: bool) -> Recipe {
    Recipe {
        id: Uuid::new_v4(),
        title: title.to_string(),
        category: Some(category.to_string()),
        servings: 4,
        diet: DietaryFlags::default(),
        is_favorite: favorite,
        is_novelty: novelty,
        ingredients: Vec::new(),
    }
}
