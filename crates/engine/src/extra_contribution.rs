//! Extra mass contributions.
//!
//! Some mass does not belong to any sub-system (harness, balance mass,
//! consumables). Each configured contributor group collects the usages of
//! its categories and sums their mass, with margin, over one walk of the
//! tree.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    budget_result::{ScaleReconciler, accumulate, margin_ratio},
    config::ExtraMassContributionConfiguration,
    product_tree::{ElementDefinition, ProductNode, ProductTree},
    walker::walk_product_tree,
};

/// Mass total of one contributor group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtraContribution {
    pub categories: Vec<Uuid>,
    pub total_contribution: f64,
    pub total_with_margin: f64,
    /// The parameter type the mass was read from.
    pub parameter_type: Uuid,
    pub scale: Option<Uuid>,
}

impl ExtraContribution {
    /// Margin in mass units.
    pub fn margin(&self) -> f64 {
        self.total_with_margin - self.total_contribution
    }

    /// Margin in percent of the contribution, 0 without contribution.
    pub fn margin_ratio(&self) -> f64 {
        margin_ratio(self.total_contribution, self.total_with_margin)
    }
}

/// Computes one [`ExtraContribution`] per group, in configuration order.
///
/// Groups without any member give a zero contribution.
pub fn extra_mass_contributions(
    tree: &ProductTree,
    root: &ElementDefinition,
    groups: &[ExtraMassContributionConfiguration],
    option: Uuid,
    domain: Uuid,
) -> ResultEngine<Vec<ExtraContribution>> {
    let mut members: Vec<Vec<ProductNode<'_>>> = vec![Vec::new(); groups.len()];
    let mut failure = None;

    walk_product_tree(tree, root, option, &mut |node| {
        if failure.is_some() {
            return;
        }
        let mut matching = groups
            .iter()
            .enumerate()
            .filter(|(_, group)| node.is_member_of_all(&group.categories))
            .map(|(index, _)| index);
        if let Some(index) = matching.next() {
            if matching.next().is_some() {
                failure = Some(EngineError::MultipleExtraContributions(
                    node.name().to_string(),
                ));
                return;
            }
            members[index].push(node);
        }
    });
    if let Some(err) = failure {
        return Err(err);
    }

    groups
        .iter()
        .zip(&members)
        .map(|(group, nodes)| {
            let mut scales = ScaleReconciler::default();
            let totals = accumulate(nodes, &group.spec(), None, option, domain, &mut scales)?;
            Ok(ExtraContribution {
                categories: group.categories.clone(),
                total_contribution: totals.value,
                total_with_margin: totals.with_margin,
                parameter_type: group.mass_parameter_type,
                scale: scales.scale(),
            })
        })
        .collect()
}
