//! Budget computation over an engineering product tree.
//!
//! The engine partitions a product tree into sub-systems and their
//! equipment, then aggregates a quantity (mass, cost, or any configured
//! quantity) per sub-system, with margins. Mass budgets also sum the extra
//! contributions that sit outside the sub-systems.
//!
//! ```rust,no_run
//! use budget_engine::{BudgetConfig, BudgetEngine, ProductTree};
//!
//! # fn run(tree: ProductTree, config: BudgetConfig, root: uuid::Uuid, option: uuid::Uuid, domain: uuid::Uuid) -> Result<(), budget_engine::EngineError> {
//! let engine = BudgetEngine::builder().config(config).build()?;
//! for result in engine.compute_result(&tree, root, option, domain)? {
//!     println!("{}: {}", result.sub_system_name, result.value_from_equipment);
//! }
//! # Ok(())
//! # }
//! ```
use std::collections::HashSet;

use uuid::Uuid;

pub use budget_result::{EquipmentRef, SubSystemBudgetResult, SystemLevelKind, resolve_system_level};
pub use config::{
    BudgetConfig, BudgetKind, BudgetParameterConfig, ExtraMassContributionConfiguration,
    QuantityMarginSpec,
};
pub use error::EngineError;
pub use extra_contribution::{ExtraContribution, extra_mass_contributions};
pub use parameter::{
    NO_VALUE, Parameter, ParameterOverride, ParameterSubscription, ParameterSwitchKind,
    SubscriptionValueSet, ValueSet,
};
pub use product_tree::{ElementDefinition, ElementUsage, ProductNode, ProductTree, ProductTreeData};
pub use reference_data::{
    Category, DesignOption, DomainOfExpertise, EnumerationValue, MeasurementScale, ParameterType,
    ParameterTypeKind,
};
pub use sub_system::{
    FnRules, SubSystem, SubSystemDefinition, SubSystemRules, classify, find_sub_system,
    find_sub_system_equipment,
};
pub use summary::BudgetSummary;
pub use walker::walk_product_tree;

mod budget_result;
mod config;
mod error;
mod extra_contribution;
mod parameter;
mod product_tree;
mod reference_data;
mod sub_system;
mod summary;
mod walker;

type ResultEngine<T> = Result<T, EngineError>;

/// Computes the budgets of one configuration.
///
/// Every call walks the tree again; nothing is cached between calls.
#[derive(Debug)]
pub struct BudgetEngine {
    config: BudgetConfig,
}

impl BudgetEngine {
    /// Return a builder for `BudgetEngine`. Help to build the struct.
    pub fn builder() -> BudgetEngineBuilder {
        BudgetEngineBuilder::default()
    }

    pub fn config(&self) -> &BudgetConfig {
        &self.config
    }

    pub fn kind(&self) -> BudgetKind {
        self.config.kind()
    }

    fn root<'a>(&self, tree: &'a ProductTree, root: Uuid) -> ResultEngine<&'a ElementDefinition> {
        tree.element_definition(root)
            .ok_or_else(|| EngineError::KeyNotFound(root.to_string()))
    }

    /// Computes one result per sub-system found below `root`, in tree
    /// pre-order.
    ///
    /// All results must share the same scale.
    pub fn compute_result(
        &self,
        tree: &ProductTree,
        root: Uuid,
        option: Uuid,
        domain: Uuid,
    ) -> ResultEngine<Vec<SubSystemBudgetResult>> {
        let root = self.root(tree, root)?;
        let sub_systems = classify(tree, root, option, &self.config.sub_system_definitions)?;

        let results = sub_systems
            .iter()
            .map(|sub_system| SubSystemBudgetResult::compute(sub_system, &self.config, option, domain))
            .collect::<ResultEngine<Vec<_>>>()?;

        let scales: HashSet<Uuid> = results.iter().filter_map(|r| r.scale).collect();
        if scales.len() > 1 {
            return Err(EngineError::MultipleScales);
        }

        tracing::debug!(
            root = %root.short_name,
            kind = self.kind().as_str(),
            sub_systems = results.len(),
            "budget computed"
        );
        Ok(results)
    }

    /// Computes the extra mass contributions below `root`. Budgets other than
    /// mass have none.
    pub fn extra_mass_contributions(
        &self,
        tree: &ProductTree,
        root: Uuid,
        option: Uuid,
        domain: Uuid,
    ) -> ResultEngine<Vec<ExtraContribution>> {
        let root = self.root(tree, root)?;
        let groups = self.config.parameter_config.extra_contributions();
        if groups.is_empty() {
            return Ok(Vec::new());
        }
        extra_mass_contributions(tree, root, groups, option, domain)
    }

    /// Computes the sub-system results and extra contributions of `root`.
    pub fn summary(
        &self,
        tree: &ProductTree,
        root: Uuid,
        option: Uuid,
        domain: Uuid,
    ) -> ResultEngine<BudgetSummary> {
        Ok(BudgetSummary {
            root_element: root,
            option,
            domain,
            results: self.compute_result(tree, root, option, domain)?,
            extra_contributions: self.extra_mass_contributions(tree, root, option, domain)?,
        })
    }

    /// Computes a summary for every option of the tree and every configured
    /// root element, options first.
    pub fn option_overview(
        &self,
        tree: &ProductTree,
        domain: Uuid,
    ) -> ResultEngine<Vec<BudgetSummary>> {
        let mut summaries = Vec::with_capacity(tree.options().len() * self.config.elements.len());
        for option in tree.options() {
            for root in &self.config.elements {
                summaries.push(self.summary(tree, *root, option.id, domain)?);
            }
        }
        Ok(summaries)
    }
}

#[derive(Debug, Default)]
pub struct BudgetEngineBuilder {
    config: Option<BudgetConfig>,
}

impl BudgetEngineBuilder {
    /// Pass the required budget configuration
    pub fn config(mut self, config: BudgetConfig) -> BudgetEngineBuilder {
        self.config = Some(config);
        self
    }

    /// Construct `BudgetEngine`
    pub fn build(self) -> ResultEngine<BudgetEngine> {
        let config = self
            .config
            .ok_or_else(|| EngineError::KeyNotFound("budget configuration".to_string()))?;
        Ok(BudgetEngine { config })
    }
}
