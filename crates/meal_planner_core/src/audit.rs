//! crates/meal_planner_core/src/audit.rs
//!
//! Builds the entries of a plan's audit trail, with a human readable
//! description in English, French and Dutch.

use crate::domain::{ChangeType, DayOfWeek, LocalizedText, MealSource, MealType, PlanChangeLog, PlanStatus, Slot};
use crate::planner::GenerationMode;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Something that happened to a plan.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    PlanGenerated { mode: GenerationMode, slots: usize },
    RecipeChanged { slot: Slot, recipe_title: String },
    MealSkipped { slot: Slot, reason: Option<String> },
    MealRestored { slot: Slot },
    PortionsChanged { slot: Slot, from: u32, to: u32 },
    LockChanged { slot: Slot, locked: bool },
    GuestsChanged { slot: Slot, guests: u32 },
    SourceChanged { slot: Slot, source: MealSource },
    StatusChanged { from: PlanStatus, to: PlanStatus },
    Unlocked { from: PlanStatus },
    ShoppingListGenerated { items: usize },
}

impl ChangeEvent {
    pub fn change_type(&self) -> ChangeType {
        match self {
            ChangeEvent::PlanGenerated { .. } => ChangeType::PlanGenerated,
            ChangeEvent::RecipeChanged { .. }
            | ChangeEvent::GuestsChanged { .. }
            | ChangeEvent::SourceChanged { .. } => ChangeType::MealUpdated,
            ChangeEvent::MealSkipped { .. } | ChangeEvent::MealRestored { .. } => ChangeType::MealSkipped,
            ChangeEvent::PortionsChanged { .. } => ChangeType::PortionsChanged,
            ChangeEvent::LockChanged { .. } => ChangeType::MealLockChanged,
            ChangeEvent::StatusChanged { .. } => ChangeType::StatusChanged,
            ChangeEvent::Unlocked { .. } => ChangeType::PlanUnlocked,
            ChangeEvent::ShoppingListGenerated { .. } => ChangeType::ShoppingListGenerated,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Lang {
    En,
    Fr,
    Nl,
}

fn day_name(day: DayOfWeek, lang: Lang) -> &'static str {
    const EN: [&str; 7] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];
    const FR: [&str; 7] = ["lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche"];
    const NL: [&str; 7] = ["maandag", "dinsdag", "woensdag", "donderdag", "vrijdag", "zaterdag", "zondag"];
    let names = match lang {
        Lang::En => EN,
        Lang::Fr => FR,
        Lang::Nl => NL,
    };
    names[day.index() as usize]
}

fn meal_name(meal_type: MealType, lang: Lang) -> &'static str {
    match (meal_type, lang) {
        (MealType::Breakfast, Lang::En) => "breakfast",
        (MealType::Breakfast, Lang::Fr) => "petit-déjeuner",
        (MealType::Breakfast, Lang::Nl) => "ontbijt",
        (MealType::Lunch, Lang::En) => "lunch",
        (MealType::Lunch, Lang::Fr) => "déjeuner",
        (MealType::Lunch, Lang::Nl) => "middagmaal",
        (MealType::Snack, Lang::En) => "snack",
        (MealType::Snack, Lang::Fr) => "goûter",
        (MealType::Snack, Lang::Nl) => "tussendoortje",
        (MealType::Dinner, Lang::En) => "dinner",
        (MealType::Dinner, Lang::Fr) => "dîner",
        (MealType::Dinner, Lang::Nl) => "avondmaal",
    }
}

fn status_name(status: PlanStatus, lang: Lang) -> &'static str {
    match (status, lang) {
        (PlanStatus::Draft, Lang::En) => "draft",
        (PlanStatus::Draft, Lang::Fr) => "brouillon",
        (PlanStatus::Draft, Lang::Nl) => "concept",
        (PlanStatus::InValidation, Lang::En) => "in validation",
        (PlanStatus::InValidation, Lang::Fr) => "en validation",
        (PlanStatus::InValidation, Lang::Nl) => "ter validatie",
        (PlanStatus::Validated, Lang::En) => "validated",
        (PlanStatus::Validated, Lang::Fr) => "validé",
        (PlanStatus::Validated, Lang::Nl) => "gevalideerd",
        (PlanStatus::Locked, Lang::En) => "locked",
        (PlanStatus::Locked, Lang::Fr) => "verrouillé",
        (PlanStatus::Locked, Lang::Nl) => "vergrendeld",
    }
}

fn source_name(source: MealSource, lang: Lang) -> &'static str {
    match (source, lang) {
        (MealSource::Home, Lang::En) => "at home",
        (MealSource::Home, Lang::Fr) => "à la maison",
        (MealSource::Home, Lang::Nl) => "thuis",
        (MealSource::School, Lang::En) => "at school",
        (MealSource::School, Lang::Fr) => "à l'école",
        (MealSource::School, Lang::Nl) => "op school",
        (MealSource::External, Lang::En) => "eaten out",
        (MealSource::External, Lang::Fr) => "à l'extérieur",
        (MealSource::External, Lang::Nl) => "buitenshuis",
    }
}

fn slot_name(slot: Slot, lang: Lang) -> String {
    let day = day_name(slot.day, lang);
    let meal = meal_name(slot.meal_type, lang);
    match lang {
        Lang::En => format!("{} {}", day, meal),
        Lang::Fr => format!("{} du {}", meal, day),
        Lang::Nl => format!("{} op {}", meal, day),
    }
}

fn sentence(event: &ChangeEvent, lang: Lang) -> String {
    match (event, lang) {
        (ChangeEvent::PlanGenerated { mode, slots }, _) => {
            let express = *mode == GenerationMode::Express;
            match lang {
                Lang::En if express => format!("Express plan generated for {} meals", slots),
                Lang::En => format!("Plan generated for {} meals", slots),
                Lang::Fr if express => format!("Planning express généré pour {} repas", slots),
                Lang::Fr => format!("Planning généré pour {} repas", slots),
                Lang::Nl if express => format!("Expressplanning gegenereerd voor {} maaltijden", slots),
                Lang::Nl => format!("Planning gegenereerd voor {} maaltijden", slots),
            }
        }
        (ChangeEvent::RecipeChanged { slot, recipe_title }, Lang::En) => {
            format!("{}: recipe changed to \"{}\"", slot_name(*slot, lang), recipe_title)
        }
        (ChangeEvent::RecipeChanged { slot, recipe_title }, Lang::Fr) => {
            format!("{} : recette remplacée par « {} »", slot_name(*slot, lang), recipe_title)
        }
        (ChangeEvent::RecipeChanged { slot, recipe_title }, Lang::Nl) => {
            format!("{}: recept gewijzigd naar \"{}\"", slot_name(*slot, lang), recipe_title)
        }
        (ChangeEvent::MealSkipped { slot, reason }, _) => {
            let base = match lang {
                Lang::En => format!("{} skipped", slot_name(*slot, lang)),
                Lang::Fr => format!("{} annulé", slot_name(*slot, lang)),
                Lang::Nl => format!("{} overgeslagen", slot_name(*slot, lang)),
            };
            match reason.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
                Some(reason) => format!("{} ({})", base, reason),
                None => base,
            }
        }
        (ChangeEvent::MealRestored { slot }, Lang::En) => format!("{} restored", slot_name(*slot, lang)),
        (ChangeEvent::MealRestored { slot }, Lang::Fr) => format!("{} rétabli", slot_name(*slot, lang)),
        (ChangeEvent::MealRestored { slot }, Lang::Nl) => format!("{} hersteld", slot_name(*slot, lang)),
        (ChangeEvent::PortionsChanged { slot, from, to }, Lang::En) => {
            format!("{}: portions changed from {} to {}", slot_name(*slot, lang), from, to)
        }
        (ChangeEvent::PortionsChanged { slot, from, to }, Lang::Fr) => {
            format!("{} : portions modifiées de {} à {}", slot_name(*slot, lang), from, to)
        }
        (ChangeEvent::PortionsChanged { slot, from, to }, Lang::Nl) => {
            format!("{}: porties gewijzigd van {} naar {}", slot_name(*slot, lang), from, to)
        }
        (ChangeEvent::LockChanged { slot, locked }, _) => {
            let name = slot_name(*slot, lang);
            match (lang, *locked) {
                (Lang::En, true) => format!("{} locked", name),
                (Lang::En, false) => format!("{} unlocked", name),
                (Lang::Fr, true) => format!("{} verrouillé", name),
                (Lang::Fr, false) => format!("{} déverrouillé", name),
                (Lang::Nl, true) => format!("{} vergrendeld", name),
                (Lang::Nl, false) => format!("{} ontgrendeld", name),
            }
        }
        (ChangeEvent::GuestsChanged { slot, guests }, Lang::En) => {
            format!("{}: {} guest(s)", slot_name(*slot, lang), guests)
        }
        (ChangeEvent::GuestsChanged { slot, guests }, Lang::Fr) => {
            format!("{} : {} invité(s)", slot_name(*slot, lang), guests)
        }
        (ChangeEvent::GuestsChanged { slot, guests }, Lang::Nl) => {
            format!("{}: {} gast(en)", slot_name(*slot, lang), guests)
        }
        (ChangeEvent::SourceChanged { slot, source }, Lang::En) => {
            format!("{} now {}", slot_name(*slot, lang), source_name(*source, lang))
        }
        (ChangeEvent::SourceChanged { slot, source }, Lang::Fr) => {
            format!("{} désormais {}", slot_name(*slot, lang), source_name(*source, lang))
        }
        (ChangeEvent::SourceChanged { slot, source }, Lang::Nl) => {
            format!("{} voortaan {}", slot_name(*slot, lang), source_name(*source, lang))
        }
        (ChangeEvent::StatusChanged { from, to }, Lang::En) => format!(
            "Plan status changed from {} to {}",
            status_name(*from, lang),
            status_name(*to, lang)
        ),
        (ChangeEvent::StatusChanged { from, to }, Lang::Fr) => format!(
            "Statut du planning passé de {} à {}",
            status_name(*from, lang),
            status_name(*to, lang)
        ),
        (ChangeEvent::StatusChanged { from, to }, Lang::Nl) => format!(
            "Status van de planning gewijzigd van {} naar {}",
            status_name(*from, lang),
            status_name(*to, lang)
        ),
        (ChangeEvent::Unlocked { from }, Lang::En) => {
            format!("Plan unlocked (was {})", status_name(*from, lang))
        }
        (ChangeEvent::Unlocked { from }, Lang::Fr) => {
            format!("Planning déverrouillé (était {})", status_name(*from, lang))
        }
        (ChangeEvent::Unlocked { from }, Lang::Nl) => {
            format!("Planning ontgrendeld (was {})", status_name(*from, lang))
        }
        (ChangeEvent::ShoppingListGenerated { items }, Lang::En) => {
            format!("Shopping list generated with {} items", items)
        }
        (ChangeEvent::ShoppingListGenerated { items }, Lang::Fr) => {
            format!("Liste de courses générée avec {} articles", items)
        }
        (ChangeEvent::ShoppingListGenerated { items }, Lang::Nl) => {
            format!("Boodschappenlijst gegenereerd met {} artikelen", items)
        }
    }
}

pub fn describe(event: &ChangeEvent) -> LocalizedText {
    LocalizedText {
        en: sentence(event, Lang::En),
        fr: sentence(event, Lang::Fr),
        nl: sentence(event, Lang::Nl),
    }
}

/// A ready-to-append audit entry for `event`.
pub fn log_entry(
    weekly_plan_id: Uuid,
    meal_id: Option<Uuid>,
    member_id: Option<Uuid>,
    event: &ChangeEvent,
    now: DateTime<Utc>,
) -> PlanChangeLog {
    PlanChangeLog {
        id: Uuid::new_v4(),
        weekly_plan_id,
        meal_id,
        member_id,
        change_type: event.change_type(),
        description: describe(event),
        created_at: now,
    }
}
