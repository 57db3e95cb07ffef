//! Request workflows driven against the in-memory database.

mod common;

use api_lib::error::ApiError;
use api_lib::planning::{self, GenerateRequest, MealUpdate};
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{ingredient, recipe, InMemoryDb};
use meal_planner_core::lifecycle::LifecycleError;
use meal_planner_core::{
    ChangeType, ComponentRole, DayOfWeek, FamilyMember, GenerationMode, GuestEntry, InventoryItem, MealType,
    MemberRole, PlanStatus, PlanningError, Slot, WeeklyPlan,
};
use rand::{rngs::StdRng, SeedableRng};
use uuid::Uuid;

fn week(week_number: u32) -> GenerateRequest {
    GenerateRequest {
        week_number,
        year: 2026,
        ..Default::default()
    }
}

async fn generate(db: &InMemoryDb, actor: &FamilyMember, mode: GenerationMode, seed: u64) -> WeeklyPlan {
    let mut rng = StdRng::seed_from_u64(seed);
    planning::generate_plan(db, actor, actor.family_id, mode, week(12), &mut rng, Utc::now())
        .await
        .expect("generation should succeed")
        .plan
}

/// A family of four with three everyday recipes in different categories.
fn family_with_catalog(db: &InMemoryDb) -> (FamilyMember, FamilyMember) {
    let family = db.add_family();
    let admin = db.add_member(family, MemberRole::Admin);
    let adult = db.add_member(family, MemberRole::Adult);
    db.add_member(family, MemberRole::Child);
    db.add_member(family, MemberRole::Child);
    db.add_recipe(family, recipe("Lasagna", "pasta", false, false));
    db.add_recipe(family, recipe("Curry", "asian", false, false));
    db.add_recipe(family, recipe("Fish pie", "fish", false, false));
    (admin, adult)
}

//=========================================================================================
// Generation
//=========================================================================================

#[tokio::test]
async fn generation_creates_a_draft_with_default_template() {
    let db = InMemoryDb::default();
    let (_, adult) = family_with_catalog(&db);

    let plan = generate(&db, &adult, GenerationMode::Auto, 7).await;

    assert_eq!(plan.status, PlanStatus::Draft);
    assert_eq!(plan.meals.len(), 14);
    assert!(plan.meals.iter().all(|m| m.recipe_id.is_some() && m.portions == 4));
    assert_eq!(plan.meals[0].slot(), Slot::new(DayOfWeek::Monday, MealType::Lunch));
    assert_eq!(db.plan(plan.id).map(|p| p.meals.len()), Some(14));

    let logs = db.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].change_type, ChangeType::PlanGenerated);
    assert_eq!(logs[0].member_id, Some(adult.id));
    assert_eq!(logs[0].description.en, "Plan generated for 14 meals");
}

#[tokio::test]
async fn express_generation_uses_favorites_and_one_novelty() {
    let db = InMemoryDb::default();
    let family = db.add_family();
    let adult = db.add_member(family, MemberRole::Adult);
    let f1 = db.add_recipe(family, recipe("Pancakes", "sweet", true, false));
    let f2 = db.add_recipe(family, recipe("Soup", "soup", true, false));
    let n1 = db.add_recipe(family, recipe("Ramen", "asian", false, true));

    let plan = generate(&db, &adult, GenerationMode::Express, 3).await;

    let novelties = plan.meals.iter().filter(|m| m.recipe_id == Some(n1)).count();
    let favorites = plan
        .meals
        .iter()
        .filter(|m| m.recipe_id == Some(f1) || m.recipe_id == Some(f2))
        .count();
    assert_eq!(novelties, 1);
    assert_eq!(favorites, 13);
}

#[tokio::test]
async fn express_generation_without_favorites_is_a_bad_request() {
    let db = InMemoryDb::default();
    let (_, adult) = family_with_catalog(&db);
    let mut rng = StdRng::seed_from_u64(1);

    let err = planning::generate_plan(&db, &adult, adult.family_id, GenerationMode::Express, week(12), &mut rng, Utc::now())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Planning(PlanningError::NoFavorites)));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn families_cannot_plan_for_each_other() {
    let db = InMemoryDb::default();
    let (_, adult) = family_with_catalog(&db);
    let other_family = db.add_family();
    let mut rng = StdRng::seed_from_u64(1);

    let err = planning::generate_plan(&db, &adult, other_family, GenerationMode::Auto, week(12), &mut rng, Utc::now())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    assert!(db.logs().is_empty());
}

#[tokio::test]
async fn requests_with_bad_weeks_or_duplicate_slots_are_rejected() {
    let db = InMemoryDb::default();
    let (_, adult) = family_with_catalog(&db);
    let mut rng = StdRng::seed_from_u64(1);

    let err = planning::generate_plan(&db, &adult, adult.family_id, GenerationMode::Auto, week(54), &mut rng, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let dinner = Slot::new(DayOfWeek::Friday, MealType::Dinner);
    let request = GenerateRequest {
        slots: Some(vec![dinner, dinner]),
        ..week(12)
    };
    let err = planning::generate_plan(&db, &adult, adult.family_id, GenerationMode::Auto, request, &mut rng, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Planning(PlanningError::DuplicateSlot(slot)) if slot == dinner));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn regeneration_keeps_locked_meals() {
    let db = InMemoryDb::default();
    let (_, adult) = family_with_catalog(&db);
    let plan = generate(&db, &adult, GenerationMode::Auto, 1).await;
    let kept = plan.meals[0].clone();

    let update = MealUpdate {
        locked: Some(true),
        ..Default::default()
    };
    planning::update_meal(&db, &adult, kept.id, update, Utc::now())
        .await
        .expect("locking should succeed");

    for seed in 2..6 {
        let regenerated = generate(&db, &adult, GenerationMode::Auto, seed).await;
        assert_eq!(regenerated.id, plan.id);
        assert_eq!(regenerated.meals.len(), 14);
        let meal = regenerated.meal_at(kept.slot()).expect("locked slot is still planned");
        assert_eq!(meal.id, kept.id);
        assert_eq!(meal.recipe_id, kept.recipe_id);
        assert!(meal.locked);
    }

    let last = db.logs().pop().expect("regeneration is logged");
    assert_eq!(last.description.en, "Plan generated for 13 meals");
}

#[tokio::test]
async fn a_locked_novelty_uses_up_the_weekly_cap() {
    let db = InMemoryDb::default();
    let family = db.add_family_with(|p| {
        p.favorite_ratio = 1.0;
        p.max_novelties = 1;
    });
    let adult = db.add_member(family, MemberRole::Adult);
    db.add_recipe(family, recipe("Pancakes", "sweet", true, false));
    db.add_recipe(family, recipe("Soup", "soup", true, false));
    let novelties = [
        db.add_recipe(family, recipe("Ramen", "asian", false, true)),
        db.add_recipe(family, recipe("Ceviche", "fish", false, true)),
    ];
    let count_novelties =
        |plan: &WeeklyPlan| plan.meals.iter().filter(|m| m.recipe_id.is_some_and(|id| novelties.contains(&id))).count();

    let plan = generate(&db, &adult, GenerationMode::Auto, 1).await;
    let first = &plan.meals[0];
    assert_eq!(first.recipe_id, Some(novelties[0]));
    assert_eq!(count_novelties(&plan), 1);

    let update = MealUpdate {
        locked: Some(true),
        ..Default::default()
    };
    planning::update_meal(&db, &adult, first.id, update, Utc::now())
        .await
        .expect("locking should succeed");

    for seed in 2..6 {
        let regenerated = generate(&db, &adult, GenerationMode::Auto, seed).await;
        assert_eq!(regenerated.meals[0].recipe_id, Some(novelties[0]));
        assert_eq!(count_novelties(&regenerated), 1);
    }
    for seed in 6..10 {
        let regenerated = generate(&db, &adult, GenerationMode::Express, seed).await;
        assert_eq!(regenerated.meals.len(), 14);
        assert_eq!(count_novelties(&regenerated), 1);
    }
}

//=========================================================================================
// Lifecycle
//=========================================================================================

#[tokio::test]
async fn validated_plans_are_frozen_until_an_admin_unlocks_them() {
    let db = InMemoryDb::default();
    let (admin, adult) = family_with_catalog(&db);
    let plan = generate(&db, &adult, GenerationMode::Auto, 1).await;
    let now = Utc::now();

    planning::change_status(&db, &adult, plan.id, PlanStatus::InValidation, now)
        .await
        .expect("draft goes to validation");
    let validated = planning::change_status(&db, &adult, plan.id, PlanStatus::Validated, now)
        .await
        .expect("validation succeeds");
    assert_eq!(validated.status, PlanStatus::Validated);

    let mut rng = StdRng::seed_from_u64(9);
    let err = planning::generate_plan(&db, &adult, adult.family_id, GenerationMode::Auto, week(12), &mut rng, now)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Lifecycle(LifecycleError::Frozen(PlanStatus::Validated))));
    assert_eq!(err.status_code(), StatusCode::CONFLICT);

    let update = MealUpdate {
        portions: Some(2),
        ..Default::default()
    };
    let err = planning::update_meal(&db, &adult, plan.meals[0].id, update, now)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::CONFLICT);

    let err = planning::unlock_plan(&db, &adult, plan.id, now).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

    let reopened = planning::unlock_plan(&db, &admin, plan.id, now)
        .await
        .expect("admins can unlock");
    assert_eq!(reopened.status, PlanStatus::Draft);
    assert_eq!(db.plan(plan.id).map(|p| p.status), Some(PlanStatus::Draft));

    let types: Vec<ChangeType> = planning::list_changes(&db, &adult, plan.id)
        .await
        .expect("changes are listed")
        .into_iter()
        .map(|c| c.change_type)
        .collect();
    assert_eq!(
        types,
        vec![
            ChangeType::PlanGenerated,
            ChangeType::StatusChanged,
            ChangeType::StatusChanged,
            ChangeType::PlanUnlocked,
        ]
    );
}

#[tokio::test]
async fn children_cannot_move_a_plan_and_skipping_states_is_a_conflict() {
    let db = InMemoryDb::default();
    let (admin, adult) = family_with_catalog(&db);
    let child = db.add_member(adult.family_id, MemberRole::Child);
    let plan = generate(&db, &adult, GenerationMode::Auto, 1).await;

    let err = planning::change_status(&db, &child, plan.id, PlanStatus::InValidation, Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

    let err = planning::change_status(&db, &admin, plan.id, PlanStatus::Locked, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Lifecycle(LifecycleError::InvalidTransition {
            from: PlanStatus::Draft,
            to: PlanStatus::Locked
        })
    ));
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn the_cutoff_binds_members_but_not_admins() {
    let db = InMemoryDb::default();
    let (admin, adult) = family_with_catalog(&db);
    let now = Utc::now();
    let request = GenerateRequest {
        cutoff_at: Some(now - Duration::hours(1)),
        ..week(12)
    };
    let mut rng = StdRng::seed_from_u64(4);
    let plan = planning::generate_plan(&db, &admin, admin.family_id, GenerationMode::Auto, request, &mut rng, now)
        .await
        .expect("a new plan can be created past its cutoff")
        .plan;
    let meal_id = plan.meals[3].id;

    let update = MealUpdate {
        portions: Some(6),
        ..Default::default()
    };
    let err = planning::update_meal(&db, &adult, meal_id, update.clone(), now)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Lifecycle(LifecycleError::CutoffPassed(_))));
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

    let meal = planning::update_meal(&db, &admin, meal_id, update, now)
        .await
        .expect("admins edit past the cutoff");
    assert_eq!(meal.portions, 6);

    let last = db.logs().pop().expect("edit is logged");
    assert_eq!(last.change_type, ChangeType::PortionsChanged);
    assert_eq!(last.meal_id, Some(meal_id));
}

//=========================================================================================
// Meal edits
//=========================================================================================

#[tokio::test]
async fn swapped_recipes_must_fit_the_family_diet() {
    let db = InMemoryDb::default();
    let family = db.add_family_with(|p| p.requirements.vegetarian = true);
    let adult = db.add_member(family, MemberRole::Adult);
    let mut risotto = recipe("Risotto", "rice", true, false);
    risotto.diet.vegetarian = true;
    let mut falafel = recipe("Falafel", "street", false, false);
    falafel.diet.vegan = true;
    let steak = db.add_recipe(family, recipe("Steak", "meat", true, false));
    db.add_recipe(family, risotto);
    let falafel = db.add_recipe(family, falafel);

    let plan = generate(&db, &adult, GenerationMode::Auto, 5).await;
    assert!(plan.meals.iter().all(|m| m.recipe_id != Some(steak)));
    let meal_id = plan.meals[0].id;

    let update = MealUpdate {
        recipe_id: Some(steak),
        ..Default::default()
    };
    let err = planning::update_meal(&db, &adult, meal_id, update, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(ref msg) if msg.contains("vegetarian")));

    let update = MealUpdate {
        recipe_id: Some(Uuid::new_v4()),
        ..Default::default()
    };
    let err = planning::update_meal(&db, &adult, meal_id, update, Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

    let update = MealUpdate {
        components: Some(vec![(falafel, meal_planner_core::ComponentRole::Main)]),
        ..Default::default()
    };
    let meal = planning::update_meal(&db, &adult, meal_id, update, Utc::now())
        .await
        .expect("a vegan recipe suits a vegetarian family");
    assert_eq!(meal.recipe_id, Some(falafel));
    assert_eq!(meal.components.len(), 1);
    assert_eq!(db.logs().pop().map(|l| l.change_type), Some(ChangeType::MealUpdated));
}

#[tokio::test]
async fn composed_meals_need_a_component() {
    let db = InMemoryDb::default();
    let (_, adult) = family_with_catalog(&db);
    let plan = generate(&db, &adult, GenerationMode::Auto, 1).await;
    let meal = &plan.meals[2];

    let update = MealUpdate {
        components: Some(Vec::new()),
        ..Default::default()
    };
    let err = planning::update_meal(&db, &adult, meal.id, update, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let stored = db.plan(plan.id).expect("plan is stored");
    assert_eq!(stored.meals[2].recipe_id, meal.recipe_id);
    assert_eq!(db.logs().len(), 1);

    let update = MealUpdate {
        components: Some(vec![(plan.meals[0].recipe_id.expect("planned"), ComponentRole::Side)]),
        ..Default::default()
    };
    let composed = planning::update_meal(&db, &adult, meal.id, update, Utc::now())
        .await
        .expect("a single side is enough");
    assert_eq!(composed.recipe_id, plan.meals[0].recipe_id);
}

#[tokio::test]
async fn huge_guest_counts_are_logged_without_overflow() {
    let db = InMemoryDb::default();
    let (_, adult) = family_with_catalog(&db);
    let plan = generate(&db, &adult, GenerationMode::Auto, 1).await;

    let update = MealUpdate {
        guests: Some(vec![GuestEntry {
            adults: u32::MAX,
            children: 1,
        }]),
        ..Default::default()
    };
    let meal = planning::update_meal(&db, &adult, plan.meals[0].id, update, Utc::now())
        .await
        .expect("guest edit succeeds");
    assert_eq!(meal.guests.len(), 1);

    let last = db.logs().pop().expect("edit is logged");
    assert_eq!(last.change_type, ChangeType::MealUpdated);
    assert!(last.description.en.contains(&u32::MAX.to_string()));
}

#[tokio::test]
async fn edits_without_changes_are_not_logged() {
    let db = InMemoryDb::default();
    let (_, adult) = family_with_catalog(&db);
    let plan = generate(&db, &adult, GenerationMode::Auto, 1).await;
    let meal = &plan.meals[1];

    let update = MealUpdate {
        portions: Some(meal.portions),
        locked: Some(false),
        skipped: Some(false),
        ..Default::default()
    };
    planning::update_meal(&db, &adult, meal.id, update, Utc::now())
        .await
        .expect("no-op edit succeeds");

    assert_eq!(db.logs().len(), 1);
}

//=========================================================================================
// Shopping lists
//=========================================================================================

#[tokio::test]
async fn shopping_list_deducts_the_pantry_and_rounds_up() {
    let db = InMemoryDb::default();
    let family = db.add_family();
    let adult = db.add_member(family, MemberRole::Adult);
    for _ in 0..3 {
        db.add_member(family, MemberRole::Child);
    }
    let mut pasta = recipe("Tomato pasta", "pasta", false, false);
    pasta.ingredients = vec![ingredient("Tomatoes", 430.0, "g", "vegetables")];
    db.add_recipe(family, pasta);
    db.set_inventory(
        family,
        vec![InventoryItem {
            name: "tomatoes".to_string(),
            quantity: 100.0,
            unit: "g".to_string(),
        }],
    );

    let request = GenerateRequest {
        slots: Some(vec![Slot::new(DayOfWeek::Monday, MealType::Dinner)]),
        ..week(20)
    };
    let mut rng = StdRng::seed_from_u64(2);
    let plan = planning::generate_plan(&db, &adult, family, GenerationMode::Auto, request, &mut rng, Utc::now())
        .await
        .expect("single slot plan")
        .plan;
    assert_eq!(plan.meals[0].portions, 4);

    let list = planning::regenerate_shopping_list(&db, &adult, plan.id, Utc::now())
        .await
        .expect("list is generated");
    assert_eq!(list.items.len(), 1);
    let tomatoes = &list.items[0];
    assert_eq!(tomatoes.name, "Tomatoes");
    assert_eq!(tomatoes.unit, "g");
    assert!((tomatoes.quantity - 350.0).abs() < 1e-9);
    assert!(!tomatoes.in_stock);

    let again = planning::regenerate_shopping_list(&db, &adult, plan.id, Utc::now())
        .await
        .expect("list is regenerated");
    assert_ne!(again.id, list.id);
    assert_eq!(db.list_count(), 1);
    let stored = planning::get_shopping_list(&db, &adult, plan.id)
        .await
        .expect("list is stored");
    assert_eq!(stored.id, again.id);

    let last = db.logs().pop().expect("generation is logged");
    assert_eq!(last.change_type, ChangeType::ShoppingListGenerated);
    assert_eq!(last.description.en, "Shopping list generated with 1 items");
}

#[tokio::test]
async fn skipped_meals_drop_out_of_the_list() {
    let db = InMemoryDb::default();
    let family = db.add_family();
    let adult = db.add_member(family, MemberRole::Adult);
    let mut soup = recipe("Leek soup", "soup", true, false);
    soup.ingredients = vec![ingredient("Leeks", 2.0, "piece", "vegetables")];
    db.add_recipe(family, soup);

    let request = GenerateRequest {
        slots: Some(vec![Slot::new(DayOfWeek::Sunday, MealType::Lunch)]),
        ..week(20)
    };
    let mut rng = StdRng::seed_from_u64(2);
    let plan = planning::generate_plan(&db, &adult, family, GenerationMode::Auto, request, &mut rng, Utc::now())
        .await
        .expect("single slot plan")
        .plan;

    let update = MealUpdate {
        skipped: Some(true),
        skip_reason: Some("birthday party".to_string()),
        ..Default::default()
    };
    planning::update_meal(&db, &adult, plan.meals[0].id, update, Utc::now())
        .await
        .expect("meal is skipped");
    assert_eq!(
        db.logs().pop().map(|l| l.description.en),
        Some("Sunday lunch skipped (birthday party)".to_string())
    );

    let list = planning::regenerate_shopping_list(&db, &adult, plan.id, Utc::now())
        .await
        .expect("list is generated");
    assert!(list.items.is_empty());
}

#[tokio::test]
async fn items_can_be_ticked_off_by_their_family_only() {
    let db = InMemoryDb::default();
    let family = db.add_family();
    let adult = db.add_member(family, MemberRole::Adult);
    let mut salad = recipe("Salad", "salad", false, false);
    salad.ingredients = vec![ingredient("Lettuce", 1.0, "piece", "vegetables")];
    db.add_recipe(family, salad);
    let plan = generate(&db, &adult, GenerationMode::Auto, 8).await;
    let list = planning::regenerate_shopping_list(&db, &adult, plan.id, Utc::now())
        .await
        .expect("list is generated");
    let item_id = list.items[0].id;

    let stranger = db.add_member(db.add_family(), MemberRole::Admin);
    let err = planning::set_item_flags(&db, &stranger, item_id, Some(true), None)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

    let item = planning::set_item_flags(&db, &adult, item_id, Some(true), None)
        .await
        .expect("item is ticked off");
    assert!(item.checked);
    assert!(!item.in_stock);

    let stored = planning::get_shopping_list(&db, &adult, plan.id)
        .await
        .expect("list is stored");
    assert!(stored.items[0].checked);
}

#[tokio::test]
async fn an_existing_list_follows_meal_and_plan_changes() {
    let db = InMemoryDb::default();
    let family = db.add_family();
    let adult = db.add_member(family, MemberRole::Adult);
    for _ in 0..3 {
        db.add_member(family, MemberRole::Child);
    }
    let mut pasta = recipe("Tomato pasta", "pasta", false, false);
    pasta.ingredients = vec![ingredient("Tomatoes", 430.0, "g", "vegetables")];
    db.add_recipe(family, pasta);
    db.set_inventory(
        family,
        vec![InventoryItem {
            name: "Tomatoes".to_string(),
            quantity: 100.0,
            unit: "g".to_string(),
        }],
    );

    let request = GenerateRequest {
        slots: Some(vec![Slot::new(DayOfWeek::Wednesday, MealType::Dinner)]),
        ..week(21)
    };
    let mut rng = StdRng::seed_from_u64(2);
    let plan = planning::generate_plan(&db, &adult, family, GenerationMode::Auto, request.clone(), &mut rng, Utc::now())
        .await
        .expect("single slot plan")
        .plan;
    let meal_id = plan.meals[0].id;

    let update = MealUpdate {
        locked: Some(true),
        ..Default::default()
    };
    planning::update_meal(&db, &adult, meal_id, update, Utc::now())
        .await
        .expect("locking without a list");
    assert_eq!(db.list_count(), 0);

    let first = planning::regenerate_shopping_list(&db, &adult, plan.id, Utc::now())
        .await
        .expect("list is generated");
    assert!((first.items[0].quantity - 350.0).abs() < 1e-9);

    let update = MealUpdate {
        portions: Some(8),
        ..Default::default()
    };
    planning::update_meal(&db, &adult, meal_id, update, Utc::now())
        .await
        .expect("portions change");
    let stored = planning::get_shopping_list(&db, &adult, plan.id)
        .await
        .expect("list is stored");
    assert_ne!(stored.id, first.id);
    assert_eq!(stored.items.len(), 1);
    assert!((stored.items[0].quantity - 800.0).abs() < 1e-9);
    assert_eq!(db.logs().pop().map(|l| l.change_type), Some(ChangeType::ShoppingListGenerated));

    let update = MealUpdate {
        locked: Some(false),
        ..Default::default()
    };
    planning::update_meal(&db, &adult, meal_id, update, Utc::now())
        .await
        .expect("unlocking");
    let after_unlock = planning::get_shopping_list(&db, &adult, plan.id)
        .await
        .expect("list is stored");
    assert_eq!(after_unlock.id, stored.id);

    planning::generate_plan(&db, &adult, family, GenerationMode::Auto, request, &mut rng, Utc::now())
        .await
        .expect("regeneration");
    let regenerated = planning::get_shopping_list(&db, &adult, plan.id)
        .await
        .expect("list is stored");
    assert_ne!(regenerated.id, stored.id);
    assert!((regenerated.items[0].quantity - 800.0).abs() < 1e-9);
    assert_eq!(db.list_count(), 1);
}
