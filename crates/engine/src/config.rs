//! Budget configuration.
//!
//! A [`BudgetConfig`] tells the engine which element definitions are the
//! roots of the budget, how sub-systems and their equipment are recognised,
//! and which parameter types carry the budgeted quantity. It is persisted as
//! JSON so that a budget set-up can be saved and loaded again.
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, product_tree::ProductTree, sub_system::SubSystemDefinition,
};

/// The kind of quantity a budget aggregates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetKind {
    Mass,
    Cost,
    Generic,
}

impl BudgetKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mass => "mass",
            Self::Cost => "cost",
            Self::Generic => "generic",
        }
    }
}

/// The parameter type holding a quantity and the one holding its margin, in
/// percent. Either may be left unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityMarginSpec {
    #[serde(default)]
    pub quantity: Option<Uuid>,
    #[serde(default)]
    pub margin: Option<Uuid>,
}

impl QuantityMarginSpec {
    pub fn new(quantity: Uuid, margin: Option<Uuid>) -> Self {
        Self {
            quantity: Some(quantity),
            margin,
        }
    }
}

/// Usages belonging to all `categories` add their mass to a separate total,
/// outside of the sub-system partition (harness, balance mass, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraMassContributionConfiguration {
    pub categories: Vec<Uuid>,
    pub mass_parameter_type: Uuid,
    #[serde(default)]
    pub margin_parameter_type: Option<Uuid>,
}

impl ExtraMassContributionConfiguration {
    pub fn spec(&self) -> QuantityMarginSpec {
        QuantityMarginSpec {
            quantity: Some(self.mass_parameter_type),
            margin: self.margin_parameter_type,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BudgetParameterConfig {
    Mass {
        dry_mass: QuantityMarginSpec,
        #[serde(default)]
        extra_contributions: Vec<ExtraMassContributionConfiguration>,
    },
    Cost {
        cost: QuantityMarginSpec,
    },
    Generic {
        generic: QuantityMarginSpec,
    },
}

impl BudgetParameterConfig {
    pub fn kind(&self) -> BudgetKind {
        match self {
            Self::Mass { .. } => BudgetKind::Mass,
            Self::Cost { .. } => BudgetKind::Cost,
            Self::Generic { .. } => BudgetKind::Generic,
        }
    }

    /// The quantity/margin pair the sub-system results are computed from.
    pub fn quantity_margin(&self) -> &QuantityMarginSpec {
        match self {
            Self::Mass { dry_mass, .. } => dry_mass,
            Self::Cost { cost } => cost,
            Self::Generic { generic } => generic,
        }
    }

    /// Extra contributor groups; only mass budgets have any.
    pub fn extra_contributions(&self) -> &[ExtraMassContributionConfiguration] {
        match self {
            Self::Mass {
                extra_contributions,
                ..
            } => extra_contributions,
            Self::Cost { .. } | Self::Generic { .. } => &[],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Element definitions the budget is computed for.
    pub elements: Vec<Uuid>,
    pub sub_system_definitions: Vec<SubSystemDefinition>,
    pub parameter_config: BudgetParameterConfig,
    /// Quantity multiplying each equipment contribution.
    #[serde(default)]
    pub number_of_element: Option<Uuid>,
    /// Enumeration parameter telling which level of a sub-system is used.
    #[serde(default)]
    pub system_level_to_use: Option<Uuid>,
    #[serde(default)]
    pub sub_system_level_enum: Option<String>,
    #[serde(default)]
    pub equipment_level_enum: Option<String>,
}

impl BudgetConfig {
    pub fn new(
        elements: Vec<Uuid>,
        sub_system_definitions: Vec<SubSystemDefinition>,
        parameter_config: BudgetParameterConfig,
    ) -> Self {
        Self {
            elements,
            sub_system_definitions,
            parameter_config,
            number_of_element: None,
            system_level_to_use: None,
            sub_system_level_enum: None,
            equipment_level_enum: None,
        }
    }

    pub fn kind(&self) -> BudgetKind {
        self.parameter_config.kind()
    }

    pub fn from_json_reader<R: Read>(reader: R) -> ResultEngine<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json_str(json: &str) -> ResultEngine<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_writer<W: Write>(&self, writer: W) -> ResultEngine<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Checks that the configuration is complete and consistent with `tree`.
    ///
    /// Computations never require this: incomplete parameter settings only
    /// degrade to missing values. It catches set-ups that cannot give a
    /// meaningful budget.
    pub fn validate(&self, tree: &ProductTree) -> ResultEngine<()> {
        if self.elements.is_empty() {
            return Err(EngineError::InvalidConfig(
                "at least one element must be selected".to_string(),
            ));
        }
        for element in &self.elements {
            if tree.element_definition(*element).is_none() {
                return Err(EngineError::InvalidConfig(format!(
                    "unknown element definition {element}"
                )));
            }
        }

        for (index, definition) in self.sub_system_definitions.iter().enumerate() {
            if definition.categories.is_empty() || definition.equipment_categories.is_empty() {
                return Err(EngineError::InvalidConfig(format!(
                    "sub-system definition {index} needs sub-system and equipment categories"
                )));
            }
        }

        let spec = self.parameter_config.quantity_margin();
        let extra = self
            .parameter_config
            .extra_contributions()
            .iter()
            .flat_map(|e| [Some(e.mass_parameter_type), e.margin_parameter_type]);
        let referenced = [spec.quantity, spec.margin, self.number_of_element]
            .into_iter()
            .chain(extra)
            .flatten();
        for parameter_type in referenced {
            if tree.parameter_type(parameter_type).is_none() {
                return Err(EngineError::InvalidConfig(format!(
                    "unknown parameter type {parameter_type}"
                )));
            }
        }

        if let Some(level) = self.system_level_to_use {
            let parameter_type = tree.parameter_type(level).ok_or_else(|| {
                EngineError::InvalidConfig(format!("unknown parameter type {level}"))
            })?;
            if !parameter_type.is_enumeration() {
                return Err(EngineError::InvalidConfig(format!(
                    "system level parameter type {} is not an enumeration",
                    parameter_type.short_name
                )));
            }
            for value in [&self.sub_system_level_enum, &self.equipment_level_enum] {
                let Some(value) = value else {
                    return Err(EngineError::InvalidConfig(
                        "system level needs both the sub-system and the equipment value"
                            .to_string(),
                    ));
                };
                if parameter_type.enumeration_value(value).is_none() {
                    return Err(EngineError::InvalidConfig(format!(
                        "{} is not a value of {}",
                        value, parameter_type.short_name
                    )));
                }
            }
        }

        Ok(())
    }
}
