//! The module contains the product tree read by the budget computation.
//!
//! A [`ProductTree`] holds the reference data of a model and its element
//! definitions. Element definitions contain element usages, and every usage
//! instantiates another element definition, which gives the hierarchical
//! product structure. A [`ProductNode`] is the borrowed view of one usage
//! inside its tree and exposes everything the computation needs.
use std::{collections::HashMap, fmt, io::Read};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    parameter::{Parameter, ParameterOverride, ResolvedParameter, parse_float},
    reference_data::{Category, DesignOption, DomainOfExpertise, MeasurementScale, ParameterType},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementDefinition {
    pub id: Uuid,
    pub short_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub categories: Vec<Uuid>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub contained_elements: Vec<ElementUsage>,
}

impl ElementDefinition {
    pub fn new(short_name: &str, name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            short_name: short_name.to_string(),
            name: name.to_string(),
            categories: Vec::new(),
            parameters: Vec::new(),
            contained_elements: Vec::new(),
        }
    }

    pub fn parameter(&self, parameter_type: Uuid) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.parameter_type == parameter_type)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementUsage {
    pub id: Uuid,
    pub short_name: String,
    #[serde(default)]
    pub name: String,
    /// The element definition this usage instantiates.
    pub element_definition: Uuid,
    #[serde(default)]
    pub categories: Vec<Uuid>,
    #[serde(default)]
    pub excluded_options: Vec<Uuid>,
    #[serde(default)]
    pub parameter_overrides: Vec<ParameterOverride>,
}

impl ElementUsage {
    pub fn new(short_name: &str, name: &str, element_definition: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            short_name: short_name.to_string(),
            name: name.to_string(),
            element_definition,
            categories: Vec::new(),
            excluded_options: Vec::new(),
            parameter_overrides: Vec::new(),
        }
    }

    pub fn parameter_override(&self, parameter_type: Uuid) -> Option<&ParameterOverride> {
        self.parameter_overrides
            .iter()
            .find(|p| p.parameter_type == parameter_type)
    }
}

/// Plain (de)serialisable content of a [`ProductTree`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductTreeData {
    #[serde(default)]
    pub domains: Vec<DomainOfExpertise>,
    #[serde(default)]
    pub options: Vec<DesignOption>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub scales: Vec<MeasurementScale>,
    #[serde(default)]
    pub parameter_types: Vec<ParameterType>,
    #[serde(default)]
    pub element_definitions: Vec<ElementDefinition>,
}

/// A validated product tree.
///
/// Every usage references an existing element definition and no element
/// definition (directly or indirectly) contains itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "ProductTreeData", into = "ProductTreeData")]
pub struct ProductTree {
    data: ProductTreeData,
    definition_index: HashMap<Uuid, usize>,
}

impl TryFrom<ProductTreeData> for ProductTree {
    type Error = EngineError;

    fn try_from(data: ProductTreeData) -> Result<Self, Self::Error> {
        Self::new(data)
    }
}

impl From<ProductTree> for ProductTreeData {
    fn from(tree: ProductTree) -> Self {
        tree.data
    }
}

impl ProductTree {
    pub fn new(data: ProductTreeData) -> ResultEngine<Self> {
        let mut definition_index = HashMap::with_capacity(data.element_definitions.len());
        for (index, definition) in data.element_definitions.iter().enumerate() {
            if definition_index.insert(definition.id, index).is_some() {
                return Err(EngineError::InvalidModel(format!(
                    "duplicate element definition id {}",
                    definition.id
                )));
            }
        }

        let tree = Self {
            data,
            definition_index,
        };
        tree.validate()?;
        Ok(tree)
    }

    /// Reads and validates a tree from its JSON representation.
    pub fn from_json_reader<R: Read>(reader: R) -> ResultEngine<Self> {
        let data: ProductTreeData = serde_json::from_reader(reader)?;
        Self::new(data)
    }

    pub fn from_json_str(json: &str) -> ResultEngine<Self> {
        let data: ProductTreeData = serde_json::from_str(json)?;
        Self::new(data)
    }

    pub fn data(&self) -> &ProductTreeData {
        &self.data
    }

    pub fn element_definitions(&self) -> &[ElementDefinition] {
        &self.data.element_definitions
    }

    pub fn element_definition(&self, id: Uuid) -> Option<&ElementDefinition> {
        self.definition_index
            .get(&id)
            .map(|index| &self.data.element_definitions[*index])
    }

    pub fn element_definition_by_short_name(&self, short_name: &str) -> Option<&ElementDefinition> {
        self.data
            .element_definitions
            .iter()
            .find(|d| d.short_name == short_name)
    }

    pub fn options(&self) -> &[DesignOption] {
        &self.data.options
    }

    pub fn option(&self, id: Uuid) -> Option<&DesignOption> {
        self.data.options.iter().find(|o| o.id == id)
    }

    pub fn option_by_short_name(&self, short_name: &str) -> Option<&DesignOption> {
        self.data.options.iter().find(|o| o.short_name == short_name)
    }

    pub fn domains(&self) -> &[DomainOfExpertise] {
        &self.data.domains
    }

    pub fn domain(&self, id: Uuid) -> Option<&DomainOfExpertise> {
        self.data.domains.iter().find(|d| d.id == id)
    }

    pub fn domain_by_short_name(&self, short_name: &str) -> Option<&DomainOfExpertise> {
        self.data.domains.iter().find(|d| d.short_name == short_name)
    }

    pub fn categories(&self) -> &[Category] {
        &self.data.categories
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.data.categories.iter().find(|c| c.id == id)
    }

    pub fn scale(&self, id: Uuid) -> Option<&MeasurementScale> {
        self.data.scales.iter().find(|s| s.id == id)
    }

    pub fn parameter_types(&self) -> &[ParameterType] {
        &self.data.parameter_types
    }

    pub fn parameter_type(&self, id: Uuid) -> Option<&ParameterType> {
        self.data.parameter_types.iter().find(|p| p.id == id)
    }

    /// Resolves the element definition of a usage into a [`ProductNode`].
    pub fn node<'a>(&'a self, usage: &'a ElementUsage) -> Option<ProductNode<'a>> {
        let definition = self.element_definition(usage.element_definition)?;
        Some(ProductNode {
            tree: self,
            usage,
            definition,
        })
    }

    fn validate(&self) -> ResultEngine<()> {
        for definition in &self.data.element_definitions {
            for usage in &definition.contained_elements {
                if !self.definition_index.contains_key(&usage.element_definition) {
                    return Err(EngineError::InvalidModel(format!(
                        "element usage {} of {} references unknown element definition {}",
                        usage.short_name, definition.short_name, usage.element_definition
                    )));
                }
            }
        }

        // 0 = not visited, 1 = on the current path, 2 = done
        let mut state = vec![0u8; self.data.element_definitions.len()];
        for start in 0..self.data.element_definitions.len() {
            self.check_acyclic(start, &mut state)?;
        }
        Ok(())
    }

    /// Depth-first search from `start` with an explicit stack of
    /// (definition, next usage) frames.
    fn check_acyclic(&self, start: usize, state: &mut [u8]) -> ResultEngine<()> {
        if state[start] == 2 {
            return Ok(());
        }
        state[start] = 1;
        let mut stack = vec![(start, 0usize)];

        while let Some((index, next)) = stack.last_mut() {
            let definition = &self.data.element_definitions[*index];
            let Some(usage) = definition.contained_elements.get(*next) else {
                state[*index] = 2;
                stack.pop();
                continue;
            };
            *next += 1;

            let Some(&child) = self.definition_index.get(&usage.element_definition) else {
                continue;
            };
            match state[child] {
                1 => {
                    return Err(EngineError::InvalidModel(format!(
                        "element definition {} contains itself",
                        self.data.element_definitions[child].short_name
                    )));
                }
                2 => {}
                _ => {
                    state[child] = 1;
                    stack.push((child, 0));
                }
            }
        }
        Ok(())
    }
}

/// One element usage seen within its product tree.
#[derive(Clone, Copy, Debug)]
pub struct ProductNode<'a> {
    tree: &'a ProductTree,
    usage: &'a ElementUsage,
    definition: &'a ElementDefinition,
}

impl<'a> ProductNode<'a> {
    pub fn id(&self) -> Uuid {
        self.usage.id
    }

    pub fn short_name(&self) -> &'a str {
        &self.usage.short_name
    }

    /// Name used in messages: the usage name, or its short name when unnamed.
    pub fn name(&self) -> &'a str {
        if self.usage.name.is_empty() {
            &self.usage.short_name
        } else {
            &self.usage.name
        }
    }

    pub fn usage(&self) -> &'a ElementUsage {
        self.usage
    }

    pub fn element_definition(&self) -> &'a ElementDefinition {
        self.definition
    }

    pub fn tree(&self) -> &'a ProductTree {
        self.tree
    }

    /// Returns `true` when the usage or its definition is a member of the
    /// category.
    pub fn is_member_of(&self, category: Uuid) -> bool {
        self.usage.categories.contains(&category) || self.definition.categories.contains(&category)
    }

    /// Returns `true` when the node belongs to every given category. An empty
    /// list never matches.
    pub fn is_member_of_all(&self, categories: &[Uuid]) -> bool {
        !categories.is_empty() && categories.iter().all(|c| self.is_member_of(*c))
    }

    pub fn is_excluded_from(&self, option: Uuid) -> bool {
        self.usage.excluded_options.contains(&option)
    }

    fn resolved(&self, parameter_type: Uuid) -> Option<ResolvedParameter<'a>> {
        ResolvedParameter::resolve(
            self.definition.parameter(parameter_type),
            self.usage.parameter_override(parameter_type),
        )
    }

    /// Reads the actual value of a component as a string.
    pub fn actual_value(
        &self,
        parameter_type: Uuid,
        component: usize,
        option: Uuid,
        domain: Uuid,
    ) -> Option<&'a str> {
        self.resolved(parameter_type)?
            .actual_value(component, option, domain)
    }

    /// Reads the actual value of a component as a float.
    pub fn float_actual_value(
        &self,
        parameter_type: Uuid,
        component: usize,
        option: Uuid,
        domain: Uuid,
    ) -> Option<f64> {
        self.actual_value(parameter_type, component, option, domain)
            .and_then(parse_float)
    }

    /// Scale of the parameter of the given type.
    pub fn scale(&self, parameter_type: Uuid) -> Option<Uuid> {
        self.resolved(parameter_type)?.scale()
    }
}

impl fmt::Display for ProductNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
