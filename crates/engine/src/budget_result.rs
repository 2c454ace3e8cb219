//! Budget figures of one sub-system.
//!
//! A sub-system budget is read two ways. The value "from sub-system" is the
//! quantity the sub-system usage itself carries. The value "from equipment"
//! is the sum of its equipment quantities, each multiplied by its number of
//! items and optionally inflated by its margin. Which one is authoritative is
//! decided by the system level parameter of the sub-system usage.
//!
//! Mass, cost and generic budgets only differ in the parameter types they
//! read, see [`BudgetParameterConfig::quantity_margin`].
//!
//! [`BudgetParameterConfig::quantity_margin`]: crate::config::BudgetParameterConfig::quantity_margin
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    config::{BudgetConfig, BudgetKind, QuantityMarginSpec},
    product_tree::ProductNode,
    sub_system::SubSystem,
};

/// The level whose figures are displayed for a sub-system.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemLevelKind {
    #[default]
    Equipment,
    SubSystem,
}

/// Keeps the first scale seen and rejects any other one.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ScaleReconciler {
    scale: Option<Uuid>,
}

impl ScaleReconciler {
    pub(crate) fn reconcile(
        &mut self,
        node: &ProductNode<'_>,
        scale: Option<Uuid>,
    ) -> ResultEngine<()> {
        match (self.scale, scale) {
            (_, None) => Ok(()),
            (None, Some(scale)) => {
                self.scale = Some(scale);
                Ok(())
            }
            (Some(current), Some(scale)) if current == scale => Ok(()),
            (Some(_), Some(_)) => Err(EngineError::ScaleMismatch(node.name().to_string())),
        }
    }

    pub(crate) fn scale(&self) -> Option<Uuid> {
        self.scale
    }
}

/// Plain and margin inflated sums over a set of usages.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Totals {
    pub(crate) value: f64,
    pub(crate) with_margin: f64,
}

/// Sums `quantity × items` and `quantity × items × (1 + margin / 100)` over
/// `nodes`.
///
/// Every usage takes part in the scale check, but usages without a quantity
/// add nothing to the sums. A missing margin counts as 0 and a missing number
/// of items as 1.
pub(crate) fn accumulate<'n, 'a: 'n>(
    nodes: impl IntoIterator<Item = &'n ProductNode<'a>>,
    spec: &QuantityMarginSpec,
    number_of_items: Option<Uuid>,
    option: Uuid,
    domain: Uuid,
    scales: &mut ScaleReconciler,
) -> ResultEngine<Totals> {
    let mut totals = Totals::default();
    let Some(quantity_type) = spec.quantity else {
        return Ok(totals);
    };

    for node in nodes {
        scales.reconcile(node, node.scale(quantity_type))?;
        let Some(quantity) = node.float_actual_value(quantity_type, 0, option, domain) else {
            continue;
        };

        let margin = spec
            .margin
            .and_then(|margin| node.float_actual_value(margin, 0, option, domain))
            .unwrap_or(0.0);
        let items = number_of_items
            .and_then(|number| node.float_actual_value(number, 0, option, domain))
            .unwrap_or(1.0);

        let value = quantity * items;
        totals.value += value;
        totals.with_margin += value * (1.0 + margin / 100.0);
    }

    Ok(totals)
}

/// Margin ratio in percent of `with_margin` over `value`; 0 when there is no
/// positive value.
pub(crate) fn margin_ratio(value: f64, with_margin: f64) -> f64 {
    if value > 0.0 {
        (with_margin / value - 1.0) * 100.0
    } else {
        0.0
    }
}

/// Reads which level is used for the sub-system. Anything but an explicit
/// sub-system value means equipment.
pub fn resolve_system_level(
    node: &ProductNode<'_>,
    config: &BudgetConfig,
    option: Uuid,
    domain: Uuid,
) -> SystemLevelKind {
    let (Some(level), Some(sub_system_value), Some(equipment_value)) = (
        config.system_level_to_use,
        config.sub_system_level_enum.as_deref(),
        config.equipment_level_enum.as_deref(),
    ) else {
        return SystemLevelKind::Equipment;
    };

    match node.actual_value(level, 0, option, domain) {
        Some(value) if value == equipment_value => SystemLevelKind::Equipment,
        Some(value) if value == sub_system_value => SystemLevelKind::SubSystem,
        _ => SystemLevelKind::Equipment,
    }
}

/// An equipment usage of a sub-system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentRef {
    pub id: Uuid,
    pub name: String,
}

/// Budget figures of one sub-system for one option and domain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubSystemBudgetResult {
    pub kind: BudgetKind,
    pub sub_system_id: Uuid,
    pub sub_system_name: String,
    pub definition_index: usize,
    pub equipment: Vec<EquipmentRef>,
    pub option: Uuid,
    pub domain: Uuid,
    pub scale: Option<Uuid>,
    pub system_level_used: SystemLevelKind,
    pub value_from_sub_system: Option<f64>,
    pub value_margin_ratio_from_sub_system: Option<f64>,
    pub value_from_equipment: f64,
    pub value_with_margin_from_equipment: f64,
    pub value_margin_ratio_from_equipment: f64,
}

impl SubSystemBudgetResult {
    /// Computes the figures of `sub_system` with the parameter types of
    /// `config`.
    pub fn compute<R>(
        sub_system: &SubSystem<'_, R>,
        config: &BudgetConfig,
        option: Uuid,
        domain: Uuid,
    ) -> ResultEngine<Self> {
        let node = sub_system.node();
        let spec = config.parameter_config.quantity_margin();

        // From the sub-system usage itself; the margin is not defaulted.
        let system_level_used = resolve_system_level(&node, config, option, domain);
        let value_from_sub_system = spec
            .quantity
            .and_then(|quantity| node.float_actual_value(quantity, 0, option, domain));
        let value_margin_ratio_from_sub_system = spec
            .margin
            .and_then(|margin| node.float_actual_value(margin, 0, option, domain));

        let mut scales = ScaleReconciler::default();
        let totals = accumulate(
            sub_system.equipment(),
            spec,
            config.number_of_element,
            option,
            domain,
            &mut scales,
        )?;

        let result = Self {
            kind: config.kind(),
            sub_system_id: node.id(),
            sub_system_name: node.name().to_string(),
            definition_index: sub_system.definition_index(),
            equipment: sub_system
                .equipment()
                .iter()
                .map(|e| EquipmentRef {
                    id: e.id(),
                    name: e.name().to_string(),
                })
                .collect(),
            option,
            domain,
            scale: scales.scale(),
            system_level_used,
            value_from_sub_system,
            value_margin_ratio_from_sub_system,
            value_from_equipment: totals.value,
            value_with_margin_from_equipment: totals.with_margin,
            value_margin_ratio_from_equipment: margin_ratio(totals.value, totals.with_margin),
        };
        tracing::debug!(
            sub_system = %result.sub_system_name,
            kind = result.kind.as_str(),
            value = result.value_from_equipment,
            with_margin = result.value_with_margin_from_equipment,
            "sub-system budget computed"
        );
        Ok(result)
    }

    /// The total with margin at the level in use, `None` when the sub-system
    /// level is used and the sub-system carries no value.
    pub fn total_with_margin(&self) -> Option<f64> {
        match self.system_level_used {
            SystemLevelKind::Equipment => Some(self.value_with_margin_from_equipment),
            SystemLevelKind::SubSystem => self.value_from_sub_system.map(|value| {
                value * (1.0 + self.value_margin_ratio_from_sub_system.unwrap_or(0.0) / 100.0)
            }),
        }
    }
}
