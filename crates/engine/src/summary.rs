//! Budget totals per root element and option.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    budget_result::{SubSystemBudgetResult, SystemLevelKind},
    extra_contribution::ExtraContribution,
};

/// Everything computed for one root element in one option.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub root_element: Uuid,
    pub option: Uuid,
    pub domain: Uuid,
    pub results: Vec<SubSystemBudgetResult>,
    pub extra_contributions: Vec<ExtraContribution>,
}

impl BudgetSummary {
    /// Total with margin of the budget: every sub-system at the level it
    /// uses plus every extra contribution.
    pub fn total(&self) -> f64 {
        let sub_systems: f64 = self
            .results
            .iter()
            .filter_map(SubSystemBudgetResult::total_with_margin)
            .sum();
        let extra: f64 = self
            .extra_contributions
            .iter()
            .map(|e| e.total_with_margin)
            .sum();
        sub_systems + extra
    }

    /// Total without margin, read the same way as [`BudgetSummary::total`].
    pub fn total_without_margin(&self) -> f64 {
        let sub_systems: f64 = self
            .results
            .iter()
            .filter_map(|r| match r.system_level_used {
                SystemLevelKind::Equipment => Some(r.value_from_equipment),
                SystemLevelKind::SubSystem => r.value_from_sub_system,
            })
            .sum();
        let extra: f64 = self
            .extra_contributions
            .iter()
            .map(|e| e.total_contribution)
            .sum();
        sub_systems + extra
    }
}
