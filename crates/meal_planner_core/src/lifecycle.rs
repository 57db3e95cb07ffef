//! crates/meal_planner_core/src/lifecycle.rs
//!
//! Weekly plan status transitions and who may edit a plan when.

use crate::domain::{MemberRole, PlanStatus, WeeklyPlan};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("Cannot move a plan from {from} to {to}")]
    InvalidTransition { from: PlanStatus, to: PlanStatus },
    #[error("Insufficient permission: {0}")]
    Forbidden(&'static str),
    #[error("The plan is {0} and can no longer be edited")]
    Frozen(PlanStatus),
    #[error("The edit cutoff passed at {0}")]
    CutoffPassed(DateTime<Utc>),
}

impl PlanStatus {
    /// Forward moves plus sending a plan under validation back to draft.
    /// Unlocking is separate, see [`unlock`].
    pub fn can_transition_to(self, next: PlanStatus) -> bool {
        use PlanStatus::*;
        matches!(
            (self, next),
            (Draft, InValidation) | (InValidation, Validated) | (InValidation, Draft) | (Validated, Locked)
        )
    }

    /// Meals can be edited by everyone while the plan is still being discussed.
    pub fn is_open(self) -> bool {
        matches!(self, PlanStatus::Draft | PlanStatus::InValidation)
    }
}

/// Moves a plan to `next`. Children cannot change a plan's status.
pub fn transition(current: PlanStatus, next: PlanStatus, role: MemberRole) -> Result<PlanStatus, LifecycleError> {
    if role == MemberRole::Child {
        return Err(LifecycleError::Forbidden("children cannot change a plan's status"));
    }
    if !current.can_transition_to(next) {
        return Err(LifecycleError::InvalidTransition { from: current, to: next });
    }
    Ok(next)
}

/// Reopens a validated or locked plan as a draft. Privileged roles only.
pub fn unlock(current: PlanStatus, role: MemberRole) -> Result<PlanStatus, LifecycleError> {
    if !role.is_privileged() {
        return Err(LifecycleError::Forbidden("only administrators can unlock a plan"));
    }
    match current {
        PlanStatus::Validated | PlanStatus::Locked => Ok(PlanStatus::Draft),
        other => Err(LifecycleError::InvalidTransition { from: other, to: PlanStatus::Draft }),
    }
}

/// Meals of an open plan may be edited until the cutoff.
/// Privileged roles are exempt from both rules.
pub fn ensure_meals_editable(plan: &WeeklyPlan, role: MemberRole, now: DateTime<Utc>) -> Result<(), LifecycleError> {
    if role.is_privileged() {
        return Ok(());
    }
    if !plan.status.is_open() {
        return Err(LifecycleError::Frozen(plan.status));
    }
    match plan.cutoff_at {
        Some(cutoff) if now >= cutoff => Err(LifecycleError::CutoffPassed(cutoff)),
        _ => Ok(()),
    }
}

/// Regeneration rewrites slots wholesale, so it needs an open plan for everyone.
pub fn ensure_regenerable(plan: &WeeklyPlan) -> Result<(), LifecycleError> {
    if plan.status.is_open() {
        Ok(())
    } else {
        Err(LifecycleError::Frozen(plan.status))
    }
}
