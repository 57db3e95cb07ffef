//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meal_planner_core::domain::{
    DayOfWeek, DietaryFlags, FamilyDietProfile, FamilyMember, GuestEntry, Ingredient, InventoryItem,
    LocalizedText, Meal, MealComponent, MemberCredentials, ParseEnumError, PlanChangeLog, PlanStatus,
    Recipe, ShoppingItem, ShoppingList, WeeklyPlan,
};
use meal_planner_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found(what: String) -> impl FnOnce(sqlx::Error) -> PortError {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        other => unexpected(other),
    }
}

/// Unique violations become conflicts, everything else is unexpected.
fn write_error(e: sqlx::Error) -> PortError {
    let unique_violation = e
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505");
    if unique_violation {
        PortError::Conflict(e.to_string())
    } else {
        unexpected(e)
    }
}

fn corrupt(e: ParseEnumError) -> PortError {
    PortError::Unexpected(format!("Corrupt row: {}", e))
}

/// Counts are stored in `INTEGER` columns.
fn to_column(value: u32, what: &str) -> PortResult<i32> {
    i32::try_from(value)
        .map_err(|_| PortError::Unexpected(format!("{} {} does not fit an INTEGER column", what, value)))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct MemberRecord {
    id: Uuid,
    family_id: Uuid,
    display_name: String,
    email: String,
    role: String,
}
impl MemberRecord {
    fn to_domain(self) -> PortResult<FamilyMember> {
        Ok(FamilyMember {
            id: self.id,
            family_id: self.family_id,
            display_name: self.display_name,
            email: self.email,
            role: self.role.parse().map_err(corrupt)?,
        })
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> MemberCredentials {
        MemberCredentials {
            member_id: self.id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct FamilyRecord {
    id: Uuid,
    vegetarian: bool,
    vegan: bool,
    gluten_free: bool,
    lactose_free: bool,
    kosher: bool,
    halal: bool,
    allergies: Vec<String>,
    favorite_ratio: f64,
    max_novelties: i32,
}
impl FamilyRecord {
    fn to_domain(self) -> FamilyDietProfile {
        FamilyDietProfile {
            family_id: self.id,
            requirements: DietaryFlags {
                vegetarian: self.vegetarian,
                vegan: self.vegan,
                gluten_free: self.gluten_free,
                lactose_free: self.lactose_free,
                kosher: self.kosher,
                halal: self.halal,
            },
            allergies: self.allergies,
            favorite_ratio: self.favorite_ratio,
            max_novelties: self.max_novelties.max(0) as u32,
        }
    }
}

#[derive(FromRow)]
struct RecipeRecord {
    id: Uuid,
    title: String,
    category: Option<String>,
    servings: i32,
    vegetarian: bool,
    vegan: bool,
    gluten_free: bool,
    lactose_free: bool,
    kosher: bool,
    halal: bool,
    is_favorite: bool,
    is_novelty: bool,
}
impl RecipeRecord {
    fn to_domain(self, ingredients: Vec<Ingredient>) -> Recipe {
        Recipe {
            id: self.id,
            title: self.title,
            category: self.category,
            servings: self.servings.max(1) as u32,
            diet: DietaryFlags {
                vegetarian: self.vegetarian,
                vegan: self.vegan,
                gluten_free: self.gluten_free,
                lactose_free: self.lactose_free,
                kosher: self.kosher,
                halal: self.halal,
            },
            is_favorite: self.is_favorite,
            is_novelty: self.is_novelty,
            ingredients,
        }
    }
}

#[derive(FromRow)]
struct IngredientRecord {
    recipe_id: Uuid,
    name: String,
    quantity: f64,
    unit: String,
    category: String,
    allergens: Vec<String>,
}

#[derive(FromRow)]
struct InventoryRecord {
    name: String,
    quantity: f64,
    unit: String,
}

#[derive(FromRow)]
struct PlanRecord {
    id: Uuid,
    family_id: Uuid,
    week_number: i32,
    year: i32,
    status: String,
    cutoff_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}
impl PlanRecord {
    fn to_domain(self, meals: Vec<Meal>) -> PortResult<WeeklyPlan> {
        Ok(WeeklyPlan {
            id: self.id,
            family_id: self.family_id,
            week_number: self.week_number.max(0) as u32,
            year: self.year,
            status: self.status.parse().map_err(corrupt)?,
            cutoff_at: self.cutoff_at,
            meals,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct MealRecord {
    id: Uuid,
    weekly_plan_id: Uuid,
    day_of_week: i16,
    meal_type: String,
    recipe_id: Option<Uuid>,
    portions: i32,
    locked: bool,
    skipped: bool,
    skip_reason: Option<String>,
    source: String,
}
impl MealRecord {
    fn to_domain(self, components: Vec<MealComponent>, guests: Vec<GuestEntry>) -> PortResult<Meal> {
        let day = DayOfWeek::from_index(self.day_of_week).ok_or_else(|| {
            PortError::Unexpected(format!("Corrupt row: day_of_week {}", self.day_of_week))
        })?;
        Ok(Meal {
            id: self.id,
            weekly_plan_id: self.weekly_plan_id,
            day,
            meal_type: self.meal_type.parse().map_err(corrupt)?,
            recipe_id: self.recipe_id,
            components,
            portions: self.portions.max(0) as u32,
            locked: self.locked,
            skipped: self.skipped,
            skip_reason: self.skip_reason,
            source: self.source.parse().map_err(corrupt)?,
            guests,
        })
    }
}

#[derive(FromRow)]
struct ComponentRecord {
    id: Uuid,
    meal_id: Uuid,
    recipe_id: Uuid,
    role: String,
}

#[derive(FromRow)]
struct GuestRecord {
    meal_id: Uuid,
    adults: i32,
    children: i32,
}

#[derive(FromRow)]
struct ShoppingListRecord {
    id: Uuid,
    weekly_plan_id: Uuid,
    generated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct ShoppingItemRecord {
    id: Uuid,
    name: String,
    quantity: f64,
    unit: String,
    category: String,
    checked: bool,
    in_stock: bool,
    alternatives: Vec<String>,
}
impl ShoppingItemRecord {
    fn to_domain(self) -> ShoppingItem {
        ShoppingItem {
            id: self.id,
            name: self.name,
            quantity: self.quantity,
            unit: self.unit,
            category: self.category,
            checked: self.checked,
            in_stock: self.in_stock,
            alternatives: self.alternatives,
        }
    }
}

#[derive(FromRow)]
struct ChangeLogRecord {
    id: Uuid,
    weekly_plan_id: Uuid,
    meal_id: Option<Uuid>,
    member_id: Option<Uuid>,
    change_type: String,
    description_en: String,
    description_fr: String,
    description_nl: String,
    created_at: DateTime<Utc>,
}
impl ChangeLogRecord {
    fn to_domain(self) -> PortResult<PlanChangeLog> {
        Ok(PlanChangeLog {
            id: self.id,
            weekly_plan_id: self.weekly_plan_id,
            meal_id: self.meal_id,
            member_id: self.member_id,
            change_type: self.change_type.parse().map_err(corrupt)?,
            description: LocalizedText {
                en: self.description_en,
                fr: self.description_fr,
                nl: self.description_nl,
            },
            created_at: self.created_at,
        })
    }
}

//=========================================================================================
// Loading Helpers
//=========================================================================================

const RECIPE_COLUMNS: &str = "id, title, category, servings, vegetarian, vegan, gluten_free, \
     lactose_free, kosher, halal, is_favorite, is_novelty";

const MEAL_COLUMNS: &str =
    "id, weekly_plan_id, day_of_week, meal_type, recipe_id, portions, locked, skipped, skip_reason, source";

impl DbAdapter {
    async fn attach_ingredients(&self, records: Vec<RecipeRecord>) -> PortResult<Vec<Recipe>> {
        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        let rows = sqlx::query_as::<_, IngredientRecord>(
            "SELECT recipe_id, name, quantity, unit, category, allergens FROM recipe_ingredients \
             WHERE recipe_id = ANY($1) ORDER BY recipe_id, position",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mut by_recipe: HashMap<Uuid, Vec<Ingredient>> = HashMap::new();
        for row in rows {
            by_recipe.entry(row.recipe_id).or_default().push(Ingredient {
                name: row.name,
                quantity: row.quantity,
                unit: row.unit,
                category: row.category,
                allergens: row.allergens,
            });
        }

        Ok(records
            .into_iter()
            .map(|r| {
                let ingredients = by_recipe.remove(&r.id).unwrap_or_default();
                r.to_domain(ingredients)
            })
            .collect())
    }

    async fn attach_meal_parts(&self, records: Vec<MealRecord>) -> PortResult<Vec<Meal>> {
        let ids: Vec<Uuid> = records.iter().map(|m| m.id).collect();

        let components = sqlx::query_as::<_, ComponentRecord>(
            "SELECT id, meal_id, recipe_id, role FROM meal_components \
             WHERE meal_id = ANY($1) ORDER BY meal_id, position",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let guests = sqlx::query_as::<_, GuestRecord>(
            "SELECT meal_id, adults, children FROM meal_guests WHERE meal_id = ANY($1) ORDER BY meal_id, position",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mut components_by_meal: HashMap<Uuid, Vec<MealComponent>> = HashMap::new();
        for c in components {
            components_by_meal.entry(c.meal_id).or_default().push(MealComponent {
                id: c.id,
                recipe_id: c.recipe_id,
                role: c.role.parse().map_err(corrupt)?,
            });
        }
        let mut guests_by_meal: HashMap<Uuid, Vec<GuestEntry>> = HashMap::new();
        for g in guests {
            guests_by_meal.entry(g.meal_id).or_default().push(GuestEntry {
                adults: g.adults.max(0) as u32,
                children: g.children.max(0) as u32,
            });
        }

        records
            .into_iter()
            .map(|m| {
                let components = components_by_meal.remove(&m.id).unwrap_or_default();
                let guests = guests_by_meal.remove(&m.id).unwrap_or_default();
                m.to_domain(components, guests)
            })
            .collect()
    }

    async fn load_plan(&self, record: PlanRecord) -> PortResult<WeeklyPlan> {
        let meal_records = sqlx::query_as::<_, MealRecord>(&format!(
            "SELECT {} FROM meals WHERE weekly_plan_id = $1",
            MEAL_COLUMNS
        ))
        .bind(record.id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let meals = self.attach_meal_parts(meal_records).await?;
        let mut plan = record.to_domain(meals)?;
        plan.sort_meals();
        Ok(plan)
    }
}

/// Inserts a meal row with its components and guests.
async fn insert_meal(conn: &mut PgConnection, meal: &Meal) -> PortResult<()> {
    sqlx::query(
        "INSERT INTO meals (id, weekly_plan_id, day_of_week, meal_type, recipe_id, portions, locked, skipped, skip_reason, source) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(meal.id)
    .bind(meal.weekly_plan_id)
    .bind(meal.day.index())
    .bind(meal.meal_type.as_str())
    .bind(meal.recipe_id)
    .bind(to_column(meal.portions, "portions")?)
    .bind(meal.locked)
    .bind(meal.skipped)
    .bind(meal.skip_reason.as_deref())
    .bind(meal.source.as_str())
    .execute(&mut *conn)
    .await
    .map_err(write_error)?;

    insert_meal_parts(conn, meal).await
}

async fn insert_meal_parts(conn: &mut PgConnection, meal: &Meal) -> PortResult<()> {
    for (position, component) in meal.components.iter().enumerate() {
        sqlx::query(
            "INSERT INTO meal_components (id, meal_id, recipe_id, role, position) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(component.id)
        .bind(meal.id)
        .bind(component.recipe_id)
        .bind(component.role.as_str())
        .bind(position as i32)
        .execute(&mut *conn)
        .await
        .map_err(write_error)?;
    }
    for (position, guest) in meal.guests.iter().enumerate() {
        sqlx::query(
            "INSERT INTO meal_guests (id, meal_id, adults, children, position) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(meal.id)
        .bind(to_column(guest.adults, "adult guests")?)
        .bind(to_column(guest.children, "child guests")?)
        .bind(position as i32)
        .execute(&mut *conn)
        .await
        .map_err(write_error)?;
    }
    Ok(())
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn get_member_credentials(&self, email: &str) -> PortResult<MemberCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, hashed_password FROM family_members WHERE lower(email) = lower($1)",
        )
        .bind(email.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(not_found(format!("Member {} not found", email)))?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        member_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, member_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(member_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT member_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            other => unexpected(other),
        })
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn get_member(&self, member_id: Uuid) -> PortResult<FamilyMember> {
        let record = sqlx::query_as::<_, MemberRecord>(
            "SELECT id, family_id, display_name, email, role FROM family_members WHERE id = $1",
        )
        .bind(member_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found(format!("Member {} not found", member_id)))?;
        record.to_domain()
    }

    async fn count_family_members(&self, family_id: Uuid) -> PortResult<u32> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM family_members WHERE family_id = $1")
            .bind(family_id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(count.max(0) as u32)
    }

    async fn get_diet_profile(&self, family_id: Uuid) -> PortResult<FamilyDietProfile> {
        let record = sqlx::query_as::<_, FamilyRecord>(
            "SELECT id, vegetarian, vegan, gluten_free, lactose_free, kosher, halal, allergies, \
             favorite_ratio, max_novelties FROM families WHERE id = $1",
        )
        .bind(family_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found(format!("Family {} not found", family_id)))?;
        Ok(record.to_domain())
    }

    async fn list_inventory(&self, family_id: Uuid) -> PortResult<Vec<InventoryItem>> {
        let records = sqlx::query_as::<_, InventoryRecord>(
            "SELECT name, quantity, unit FROM inventory_items WHERE family_id = $1 ORDER BY name",
        )
        .bind(family_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records
            .into_iter()
            .map(|r| InventoryItem {
                name: r.name,
                quantity: r.quantity,
                unit: r.unit,
            })
            .collect())
    }

    async fn list_recipes(&self, family_id: Uuid) -> PortResult<Vec<Recipe>> {
        let records = sqlx::query_as::<_, RecipeRecord>(&format!(
            "SELECT {} FROM recipes WHERE family_id = $1 ORDER BY created_at, id",
            RECIPE_COLUMNS
        ))
        .bind(family_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        self.attach_ingredients(records).await
    }

    async fn get_recipes(&self, recipe_ids: &[Uuid]) -> PortResult<Vec<Recipe>> {
        if recipe_ids.is_empty() {
            return Ok(Vec::new());
        }
        let records = sqlx::query_as::<_, RecipeRecord>(&format!(
            "SELECT {} FROM recipes WHERE id = ANY($1)",
            RECIPE_COLUMNS
        ))
        .bind(recipe_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        self.attach_ingredients(records).await
    }

    async fn find_weekly_plan(
        &self,
        family_id: Uuid,
        week_number: u32,
        year: i32,
    ) -> PortResult<Option<WeeklyPlan>> {
        let record = sqlx::query_as::<_, PlanRecord>(
            "SELECT id, family_id, week_number, year, status, cutoff_at, created_at FROM weekly_plans \
             WHERE family_id = $1 AND week_number = $2 AND year = $3",
        )
        .bind(family_id)
        .bind(to_column(week_number, "week number")?)
        .bind(year)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        match record {
            Some(record) => Ok(Some(self.load_plan(record).await?)),
            None => Ok(None),
        }
    }

    async fn get_weekly_plan(&self, plan_id: Uuid) -> PortResult<WeeklyPlan> {
        let record = sqlx::query_as::<_, PlanRecord>(
            "SELECT id, family_id, week_number, year, status, cutoff_at, created_at FROM weekly_plans WHERE id = $1",
        )
        .bind(plan_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found(format!("Weekly plan {} not found", plan_id)))?;
        self.load_plan(record).await
    }

    async fn save_weekly_plan(&self, plan: &WeeklyPlan) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query(
            "INSERT INTO weekly_plans (id, family_id, week_number, year, status, cutoff_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET status = EXCLUDED.status, cutoff_at = EXCLUDED.cutoff_at",
        )
        .bind(plan.id)
        .bind(plan.family_id)
        .bind(to_column(plan.week_number, "week number")?)
        .bind(plan.year)
        .bind(plan.status.as_str())
        .bind(plan.cutoff_at)
        .bind(plan.created_at)
        .execute(&mut *tx)
        .await
        .map_err(write_error)?;

        sqlx::query("DELETE FROM meals WHERE weekly_plan_id = $1")
            .bind(plan.id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        for meal in &plan.meals {
            insert_meal(&mut tx, meal).await?;
        }

        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn update_plan_status(&self, plan_id: Uuid, status: PlanStatus) -> PortResult<()> {
        let result = sqlx::query("UPDATE weekly_plans SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(plan_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Weekly plan {} not found", plan_id)));
        }
        Ok(())
    }

    async fn get_meal(&self, meal_id: Uuid) -> PortResult<Meal> {
        let record = sqlx::query_as::<_, MealRecord>(&format!("SELECT {} FROM meals WHERE id = $1", MEAL_COLUMNS))
            .bind(meal_id)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found(format!("Meal {} not found", meal_id)))?;

        self.attach_meal_parts(vec![record])
            .await?
            .pop()
            .ok_or_else(|| PortError::NotFound(format!("Meal {} not found", meal_id)))
    }

    async fn update_meal(&self, meal: &Meal) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let result = sqlx::query(
            "UPDATE meals SET recipe_id = $1, portions = $2, locked = $3, skipped = $4, skip_reason = $5, \
             source = $6 WHERE id = $7",
        )
        .bind(meal.recipe_id)
        .bind(to_column(meal.portions, "portions")?)
        .bind(meal.locked)
        .bind(meal.skipped)
        .bind(meal.skip_reason.as_deref())
        .bind(meal.source.as_str())
        .bind(meal.id)
        .execute(&mut *tx)
        .await
        .map_err(write_error)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Meal {} not found", meal.id)));
        }

        sqlx::query("DELETE FROM meal_components WHERE meal_id = $1")
            .bind(meal.id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        sqlx::query("DELETE FROM meal_guests WHERE meal_id = $1")
            .bind(meal.id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        insert_meal_parts(&mut tx, meal).await?;

        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn replace_shopping_list(&self, list: &ShoppingList) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query("DELETE FROM shopping_lists WHERE weekly_plan_id = $1")
            .bind(list.weekly_plan_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        sqlx::query("INSERT INTO shopping_lists (id, weekly_plan_id, generated_at) VALUES ($1, $2, $3)")
            .bind(list.id)
            .bind(list.weekly_plan_id)
            .bind(list.generated_at)
            .execute(&mut *tx)
            .await
            .map_err(write_error)?;

        for (position, item) in list.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO shopping_items (id, shopping_list_id, position, name, quantity, unit, category, \
                 checked, in_stock, alternatives) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            )
            .bind(item.id)
            .bind(list.id)
            .bind(position as i32)
            .bind(&item.name)
            .bind(item.quantity)
            .bind(&item.unit)
            .bind(&item.category)
            .bind(item.checked)
            .bind(item.in_stock)
            .bind(&item.alternatives)
            .execute(&mut *tx)
            .await
            .map_err(write_error)?;
        }

        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn get_shopping_list(&self, plan_id: Uuid) -> PortResult<ShoppingList> {
        let list = sqlx::query_as::<_, ShoppingListRecord>(
            "SELECT id, weekly_plan_id, generated_at FROM shopping_lists WHERE weekly_plan_id = $1",
        )
        .bind(plan_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found(format!("No shopping list for weekly plan {}", plan_id)))?;

        let items = sqlx::query_as::<_, ShoppingItemRecord>(
            "SELECT id, name, quantity, unit, category, checked, in_stock, alternatives FROM shopping_items \
             WHERE shopping_list_id = $1 ORDER BY position",
        )
        .bind(list.id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(ShoppingList {
            id: list.id,
            weekly_plan_id: list.weekly_plan_id,
            items: items.into_iter().map(|i| i.to_domain()).collect(),
            generated_at: list.generated_at,
        })
    }

    async fn find_plan_for_shopping_item(&self, item_id: Uuid) -> PortResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT l.weekly_plan_id FROM shopping_items i \
             JOIN shopping_lists l ON l.id = i.shopping_list_id WHERE i.id = $1",
        )
        .bind(item_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found(format!("Shopping item {} not found", item_id)))
    }

    async fn update_shopping_item(&self, item_id: Uuid, checked: bool, in_stock: bool) -> PortResult<()> {
        let result = sqlx::query("UPDATE shopping_items SET checked = $1, in_stock = $2 WHERE id = $3")
            .bind(checked)
            .bind(in_stock)
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Shopping item {} not found", item_id)));
        }
        Ok(())
    }

    async fn append_change_log(&self, entry: &PlanChangeLog) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO plan_change_logs (id, weekly_plan_id, meal_id, member_id, change_type, \
             description_en, description_fr, description_nl, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(entry.id)
        .bind(entry.weekly_plan_id)
        .bind(entry.meal_id)
        .bind(entry.member_id)
        .bind(entry.change_type.as_str())
        .bind(&entry.description.en)
        .bind(&entry.description.fr)
        .bind(&entry.description.nl)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(())
    }

    async fn list_change_log(&self, plan_id: Uuid) -> PortResult<Vec<PlanChangeLog>> {
        let records = sqlx::query_as::<_, ChangeLogRecord>(
            "SELECT id, weekly_plan_id, meal_id, member_id, change_type, description_en, description_fr, \
             description_nl, created_at FROM plan_change_logs WHERE weekly_plan_id = $1 ORDER BY created_at ASC",
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }
}
