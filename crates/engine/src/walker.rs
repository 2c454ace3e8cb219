//! Depth-first walk over the usages of a product tree.
use uuid::Uuid;

use crate::product_tree::{ElementDefinition, ProductNode, ProductTree};

/// Visits every usage below `root` in pre-order, skipping the usages excluded
/// from `option` together with their subtree.
///
/// The tree is expected to be acyclic; [`ProductTree`] guarantees it when it
/// is built.
pub fn walk_product_tree<'a, F>(
    tree: &'a ProductTree,
    root: &'a ElementDefinition,
    option: Uuid,
    visit: &mut F,
) where
    F: FnMut(ProductNode<'a>),
{
    let mut pending = vec![root.contained_elements.iter()];
    while let Some(usages) = pending.last_mut() {
        let Some(usage) = usages.next() else {
            pending.pop();
            continue;
        };
        if usage.excluded_options.contains(&option) {
            continue;
        }

        let Some(node) = tree.node(usage) else {
            tracing::warn!(
                usage = %usage.short_name,
                element_definition = %usage.element_definition,
                "skipping element usage with unknown element definition"
            );
            continue;
        };

        visit(node);
        pending.push(node.element_definition().contained_elements.iter());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product_tree::{ElementUsage, ProductTreeData};

    #[test]
    fn visits_in_pre_order_and_skips_excluded_subtrees() {
        let option_a = Uuid::new_v4();
        let option_b = Uuid::new_v4();

        let leaf = ElementDefinition::new("L", "Leaf");
        let mut mid = ElementDefinition::new("M", "Mid");
        mid.contained_elements.push(ElementUsage::new("l1", "l1", leaf.id));
        mid.contained_elements.push(ElementUsage::new("l2", "l2", leaf.id));

        let mut root = ElementDefinition::new("R", "Root");
        root.contained_elements.push(ElementUsage::new("m1", "m1", mid.id));
        let mut excluded = ElementUsage::new("m2", "m2", mid.id);
        excluded.excluded_options.push(option_b);
        root.contained_elements.push(excluded);
        root.contained_elements.push(ElementUsage::new("l3", "l3", leaf.id));

        let root_id = root.id;
        let tree = ProductTree::new(ProductTreeData {
            element_definitions: vec![root, mid, leaf],
            ..Default::default()
        })
        .unwrap();
        let root = tree.element_definition(root_id).unwrap();

        let mut visited = Vec::new();
        walk_product_tree(&tree, root, option_a, &mut |node| {
            visited.push(node.short_name().to_string())
        });
        assert_eq!(visited, ["m1", "l1", "l2", "m2", "l1", "l2", "l3"]);

        visited.clear();
        walk_product_tree(&tree, root, option_b, &mut |node| {
            visited.push(node.short_name().to_string())
        });
        assert_eq!(visited, ["m1", "l1", "l2", "l3"]);
    }

    #[test]
    fn deep_chains_are_walked() {
        let mut definitions = vec![ElementDefinition::new("D0", "D0")];
        for depth in 1..100_000 {
            let definition = ElementDefinition::new(&format!("D{depth}"), "");
            let child = definition.id;
            definitions[depth - 1]
                .contained_elements
                .push(ElementUsage::new("u", "u", child));
            definitions.push(definition);
        }
        let root_id = definitions[0].id;
        let tree = ProductTree::new(ProductTreeData {
            element_definitions: definitions,
            ..Default::default()
        })
        .unwrap();
        let root = tree.element_definition(root_id).unwrap();

        let mut count = 0;
        walk_product_tree(&tree, root, Uuid::new_v4(), &mut |_| count += 1);
        assert_eq!(count, 99_999);
    }
}
