//! Sub-system classification of a product tree.
//!
//! Classification takes two walks over the tree. The first one finds the
//! usage that *is* each configured sub-system, the second one assigns every
//! usage matching an equipment rule to the sub-system found for it. The
//! second walk needs the complete result of the first one, since equipment
//! may come before its sub-system in traversal order.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    product_tree::{ElementDefinition, ProductNode, ProductTree},
    walker::walk_product_tree,
};

/// The pair of rules that identify one kind of sub-system and its equipment.
pub trait SubSystemRules {
    fn is_this_sub_system(&self, node: &ProductNode<'_>) -> bool;

    fn is_this_sub_system_equipment(&self, node: &ProductNode<'_>) -> bool;
}

/// Category based sub-system definition, as stored in a budget
/// configuration.
///
/// A usage is the sub-system when it belongs to every category of
/// `categories`, and equipment of it when it belongs to every category of
/// `equipment_categories`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubSystemDefinition {
    pub categories: Vec<Uuid>,
    pub equipment_categories: Vec<Uuid>,
}

impl SubSystemDefinition {
    pub fn new(categories: Vec<Uuid>, equipment_categories: Vec<Uuid>) -> Self {
        Self {
            categories,
            equipment_categories,
        }
    }
}

impl SubSystemRules for SubSystemDefinition {
    fn is_this_sub_system(&self, node: &ProductNode<'_>) -> bool {
        node.is_member_of_all(&self.categories)
    }

    fn is_this_sub_system_equipment(&self, node: &ProductNode<'_>) -> bool {
        node.is_member_of_all(&self.equipment_categories)
    }
}

/// Sub-system rules given as two plain predicates.
pub struct FnRules<S, E> {
    pub sub_system: S,
    pub equipment: E,
}

impl<S, E> SubSystemRules for FnRules<S, E>
where
    S: Fn(&ProductNode<'_>) -> bool,
    E: Fn(&ProductNode<'_>) -> bool,
{
    fn is_this_sub_system(&self, node: &ProductNode<'_>) -> bool {
        (self.sub_system)(node)
    }

    fn is_this_sub_system_equipment(&self, node: &ProductNode<'_>) -> bool {
        (self.equipment)(node)
    }
}

/// One sub-system found in the tree.
#[derive(Debug)]
pub struct SubSystem<'a, R = SubSystemDefinition> {
    definition_index: usize,
    definition: &'a R,
    node: ProductNode<'a>,
    equipment: Vec<ProductNode<'a>>,
}

impl<'a, R> SubSystem<'a, R> {
    pub fn new(definition_index: usize, definition: &'a R, node: ProductNode<'a>) -> Self {
        Self {
            definition_index,
            definition,
            node,
            equipment: Vec::new(),
        }
    }

    /// Position of the matching definition in the configuration.
    pub fn definition_index(&self) -> usize {
        self.definition_index
    }

    pub fn definition(&self) -> &'a R {
        self.definition
    }

    /// The usage that is the sub-system.
    pub fn node(&self) -> ProductNode<'a> {
        self.node
    }

    /// Equipment usages in discovery order.
    pub fn equipment(&self) -> &[ProductNode<'a>] {
        &self.equipment
    }
}

/// Records `node` as a sub-system when exactly one definition claims it.
pub fn find_sub_system<'a, R: SubSystemRules>(
    node: ProductNode<'a>,
    accumulator: &mut Vec<SubSystem<'a, R>>,
    definitions: &'a [R],
) -> ResultEngine<()> {
    let mut matching = definitions
        .iter()
        .enumerate()
        .filter(|(_, definition)| definition.is_this_sub_system(&node));

    let Some((index, definition)) = matching.next() else {
        return Ok(());
    };
    if matching.next().is_some() {
        return Err(EngineError::MultipleSubSystemDefinitions(
            node.name().to_string(),
        ));
    }

    if accumulator.iter().any(|s| s.definition_index == index) {
        return Err(EngineError::DuplicateSubSystem(node.name().to_string()));
    }

    tracing::debug!(sub_system = %node, definition = index, "sub-system found");
    accumulator.push(SubSystem::new(index, definition, node));
    Ok(())
}

/// Adds `node` to the equipment of the one sub-system claiming it.
pub fn find_sub_system_equipment<'a, R: SubSystemRules>(
    node: ProductNode<'a>,
    accumulator: &mut [SubSystem<'a, R>],
) -> ResultEngine<()> {
    let mut matching = accumulator
        .iter_mut()
        .filter(|s| s.definition.is_this_sub_system_equipment(&node));

    let Some(sub_system) = matching.next() else {
        return Ok(());
    };
    if matching.next().is_some() {
        return Err(EngineError::MultipleSubSystemEquipment(
            node.name().to_string(),
        ));
    }

    sub_system.equipment.push(node);
    Ok(())
}

/// Classifies the tree below `root` for `option`.
///
/// Sub-systems come back in tree pre-order.
pub fn classify<'a, R: SubSystemRules>(
    tree: &'a ProductTree,
    root: &'a ElementDefinition,
    option: Uuid,
    definitions: &'a [R],
) -> ResultEngine<Vec<SubSystem<'a, R>>> {
    let mut sub_systems = Vec::new();
    let mut failure = None;

    walk_product_tree(tree, root, option, &mut |node| {
        if failure.is_none()
            && let Err(err) = find_sub_system(node, &mut sub_systems, definitions)
        {
            failure = Some(err);
        }
    });
    if let Some(err) = failure {
        return Err(err);
    }

    walk_product_tree(tree, root, option, &mut |node| {
        if failure.is_none()
            && let Err(err) = find_sub_system_equipment(node, &mut sub_systems)
        {
            failure = Some(err);
        }
    });
    if let Some(err) = failure {
        return Err(err);
    }

    Ok(sub_systems)
}
