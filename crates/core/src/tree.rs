//! Category tree building and flattening.
//!
//! Categories arrive as a flat list with parent references. [`build_tree`]
//! groups them into a forest ordered by `sort_order`, and [`flatten`] turns
//! the forest back into a pre-order list for indented rendering and
//! filtering.
//!
//! Parent chains are not trusted to be acyclic. Traversal emits each
//! category id at most once, so a loop in the data (or a duplicated id)
//! truncates the branch instead of recursing forever. Edits are checked up
//! front with [`validate_parent`].

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::types::{Category, CategoryId};

/// A category with its computed depth and ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub category: Category,
    /// Number of ancestor hops to a root (roots are level 0).
    pub level: usize,
    pub children: Vec<CategoryNode>,
}

/// One row of a flattened tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatCategory {
    pub category: Category,
    pub level: usize,
    pub child_count: usize,
}

/// Errors from validating a parent assignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The chosen parent does not exist.
    #[error("parent category {0} does not exist")]
    UnknownParent(CategoryId),
    /// The chosen parent is the category itself or one of its descendants.
    #[error("category {child} cannot be placed under {parent}: it would become its own ancestor")]
    Cycle {
        child: CategoryId,
        parent: CategoryId,
    },
}

/// Build the root forest.
#[must_use]
pub fn build_tree(categories: &[Category]) -> Vec<CategoryNode> {
    build_subtree(categories, None, 0)
}

/// Build the children of `parent_id`, assigning `level` to the first generation.
///
/// Siblings are sorted by `sort_order` ascending; ties keep input order.
#[must_use]
pub fn build_subtree(
    categories: &[Category],
    parent_id: Option<CategoryId>,
    level: usize,
) -> Vec<CategoryNode> {
    let mut by_parent: HashMap<Option<CategoryId>, Vec<&Category>> = HashMap::new();
    for category in categories {
        by_parent.entry(category.parent_id).or_default().push(category);
    }
    for siblings in by_parent.values_mut() {
        siblings.sort_by_key(|c| c.sort_order);
    }

    let mut emitted = HashSet::new();
    if let Some(parent) = parent_id {
        emitted.insert(parent);
    }
    attach(&by_parent, parent_id, level, &mut emitted)
}

fn attach(
    by_parent: &HashMap<Option<CategoryId>, Vec<&Category>>,
    parent_id: Option<CategoryId>,
    level: usize,
    emitted: &mut HashSet<CategoryId>,
) -> Vec<CategoryNode> {
    let Some(siblings) = by_parent.get(&parent_id) else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(siblings.len());
    for category in siblings {
        if !emitted.insert(category.id) {
            continue;
        }
        let children = attach(by_parent, Some(category.id), level + 1, emitted);
        nodes.push(CategoryNode {
            category: (*category).clone(),
            level,
            children,
        });
    }
    nodes
}

/// Pre-order traversal: each node is followed immediately by its subtree.
#[must_use]
pub fn flatten(tree: &[CategoryNode]) -> Vec<FlatCategory> {
    let mut rows = Vec::new();
    push_rows(tree, &mut rows);
    rows
}

fn push_rows(nodes: &[CategoryNode], rows: &mut Vec<FlatCategory>) {
    for node in nodes {
        rows.push(FlatCategory {
            category: node.category.clone(),
            level: node.level,
            child_count: node.children.len(),
        });
        push_rows(&node.children, rows);
    }
}

/// Categories that are not reachable from any root.
///
/// These are orphans whose parent no longer exists, members of a parent
/// loop, and repeated ids.
#[must_use]
pub fn detached(categories: &[Category]) -> Vec<&Category> {
    let reachable: HashSet<CategoryId> = flatten(&build_tree(categories))
        .into_iter()
        .map(|row| row.category.id)
        .collect();

    let mut seen = HashSet::new();
    categories
        .iter()
        .filter(|c| !reachable.contains(&c.id) || !seen.insert(c.id))
        .collect()
}

/// Whether any category names `id` as its parent.
#[must_use]
pub fn has_children(categories: &[Category], id: CategoryId) -> bool {
    categories.iter().any(|c| c.parent_id == Some(id))
}

/// Ancestor ids of `id`, nearest first. Stops at a root or at a loop.
#[must_use]
pub fn ancestors(categories: &[Category], id: CategoryId) -> Vec<CategoryId> {
    let by_id: HashMap<CategoryId, &Category> = categories.iter().map(|c| (c.id, c)).collect();
    let mut chain = Vec::new();
    let mut seen = HashSet::from([id]);
    let mut current = by_id.get(&id).and_then(|c| c.parent_id);

    while let Some(parent) = current {
        if !seen.insert(parent) {
            break;
        }
        chain.push(parent);
        current = by_id.get(&parent).and_then(|c| c.parent_id);
    }
    chain
}

/// Check that giving `child` (or a new category when `None`) the parent
/// `parent` keeps the tree acyclic and points at an existing category.
///
/// # Errors
///
/// Returns [`TreeError::UnknownParent`] if `parent` is not in `categories`,
/// or [`TreeError::Cycle`] if `parent` is `child` or one of its descendants.
pub fn validate_parent(
    categories: &[Category],
    child: Option<CategoryId>,
    parent: Option<CategoryId>,
) -> Result<(), TreeError> {
    let Some(parent) = parent else {
        return Ok(());
    };

    if !categories.iter().any(|c| c.id == parent) {
        return Err(TreeError::UnknownParent(parent));
    }

    if let Some(child) = child
        && (parent == child || ancestors(categories, parent).contains(&child))
    {
        return Err(TreeError::Cycle { child, parent });
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn category(id: i64, parent: Option<i64>, sort_order: i32, name: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            name: name.to_string(),
            slug: crate::slugify(name),
            description: None,
            parent_id: parent.map(CategoryId::new),
            is_active: true,
            sort_order,
        }
    }

    fn names(rows: &[FlatCategory]) -> Vec<&str> {
        rows.iter().map(|r| r.category.name.as_str()).collect()
    }

    #[test]
    fn test_indoor_succulents() {
        let list = vec![
            category(1, None, 0, "Indoor"),
            category(2, Some(1), 0, "Succulents"),
        ];
        let tree = build_tree(&list);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].category.name, "Indoor");
        assert_eq!(tree[0].level, 0);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].category.name, "Succulents");
        assert_eq!(tree[0].children[0].level, 1);

        let flat = flatten(&tree);
        assert_eq!(names(&flat), ["Indoor", "Succulents"]);
        assert_eq!(flat[0].child_count, 1);
    }

    #[test]
    fn test_siblings_sorted_by_sort_order_then_input() {
        let list = vec![
            category(1, None, 2, "Outdoor"),
            category(2, None, 1, "Indoor"),
            category(3, None, 1, "Seeds"),
            category(4, Some(1), 5, "Roses"),
            category(5, Some(1), 0, "Hedges"),
        ];
        let flat = flatten(&build_tree(&list));
        assert_eq!(names(&flat), ["Indoor", "Seeds", "Outdoor", "Hedges", "Roses"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(build_tree(&[]).is_empty());
        assert!(flatten(&[]).is_empty());
    }

    #[test]
    fn test_subtree_from_inner_node() {
        let list = vec![
            category(1, None, 0, "Indoor"),
            category(2, Some(1), 0, "Succulents"),
            category(3, Some(2), 0, "Echeveria"),
        ];
        let sub = build_subtree(&list, Some(CategoryId::new(1)), 1);
        let flat = flatten(&sub);
        assert_eq!(names(&flat), ["Succulents", "Echeveria"]);
        assert_eq!(flat[1].level, 2);
    }

    #[test]
    fn test_parent_loop_terminates() {
        // 2 -> 3 -> 2 never reaches a root
        let list = vec![
            category(1, None, 0, "Indoor"),
            category(2, Some(3), 0, "Loop A"),
            category(3, Some(2), 0, "Loop B"),
        ];
        let flat = flatten(&build_tree(&list));
        assert_eq!(names(&flat), ["Indoor"]);

        let sub = flatten(&build_subtree(&list, Some(CategoryId::new(2)), 0));
        assert_eq!(names(&sub), ["Loop B"]);

        let lost: Vec<_> = detached(&list).iter().map(|c| c.id.as_i64()).collect();
        assert_eq!(lost, [2, 3]);
    }

    #[test]
    fn test_duplicate_id_loop_terminates() {
        let list = vec![
            category(1, None, 0, "Indoor"),
            category(2, Some(1), 0, "Succulents"),
            category(1, Some(2), 0, "Indoor again"),
        ];
        let flat = flatten(&build_tree(&list));
        assert_eq!(names(&flat), ["Indoor", "Succulents"]);
        assert_eq!(detached(&list).len(), 1);
    }

    #[test]
    fn test_orphan_is_detached() {
        let list = vec![category(1, None, 0, "Indoor"), category(2, Some(9), 0, "Orphan")];
        assert_eq!(flatten(&build_tree(&list)).len(), 1);
        assert_eq!(detached(&list)[0].name, "Orphan");
    }

    #[test]
    fn test_validate_parent() {
        let list = vec![
            category(1, None, 0, "Indoor"),
            category(2, Some(1), 0, "Succulents"),
            category(3, Some(2), 0, "Echeveria"),
        ];
        let id = CategoryId::new;

        assert!(validate_parent(&list, Some(id(3)), None).is_ok());
        assert!(validate_parent(&list, None, Some(id(2))).is_ok());
        assert!(validate_parent(&list, Some(id(3)), Some(id(1))).is_ok());
        assert_eq!(
            validate_parent(&list, Some(id(1)), Some(id(1))),
            Err(TreeError::Cycle {
                child: id(1),
                parent: id(1)
            })
        );
        assert_eq!(
            validate_parent(&list, Some(id(1)), Some(id(3))),
            Err(TreeError::Cycle {
                child: id(1),
                parent: id(3)
            })
        );
        assert_eq!(
            validate_parent(&list, Some(id(1)), Some(id(42))),
            Err(TreeError::UnknownParent(id(42)))
        );
    }

    #[test]
    fn test_ancestors_and_children() {
        let list = vec![
            category(1, None, 0, "Indoor"),
            category(2, Some(1), 0, "Succulents"),
            category(3, Some(2), 0, "Echeveria"),
        ];
        assert_eq!(
            ancestors(&list, CategoryId::new(3)),
            [CategoryId::new(2), CategoryId::new(1)]
        );
        assert!(has_children(&list, CategoryId::new(2)));
        assert!(!has_children(&list, CategoryId::new(3)));
    }

    /// Acyclic lists: category `i` may only point at a lower index.
    fn acyclic_list() -> impl Strategy<Value = Vec<Category>> {
        prop::collection::vec((any::<prop::sample::Index>(), any::<bool>(), -3i32..3), 0..40)
            .prop_map(|specs| {
                specs
                    .into_iter()
                    .enumerate()
                    .map(|(i, (parent_index, is_root, sort_order))| {
                        let parent = (i > 0 && !is_root).then(|| parent_index.index(i) as i64);
                        category(i as i64, parent, sort_order, &format!("c{i}"))
                    })
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn flatten_is_preorder_permutation(list in acyclic_list()) {
            let flat = flatten(&build_tree(&list));
            prop_assert_eq!(flat.len(), list.len());

            let position: HashMap<CategoryId, usize> =
                flat.iter().enumerate().map(|(i, row)| (row.category.id, i)).collect();
            prop_assert_eq!(position.len(), list.len());

            for row in &flat {
                if let Some(parent) = row.category.parent_id {
                    prop_assert!(position[&parent] < position[&row.category.id]);
                }
            }
        }

        #[test]
        fn level_is_ancestor_hop_count(list in acyclic_list()) {
            for row in flatten(&build_tree(&list)) {
                prop_assert_eq!(row.level, ancestors(&list, row.category.id).len());
            }
        }

        #[test]
        fn subtrees_are_contiguous(list in acyclic_list()) {
            // A node's descendants occupy the rows directly after it.
            let flat = flatten(&build_tree(&list));
            for (i, row) in flat.iter().enumerate() {
                let end = flat[i + 1..]
                    .iter()
                    .position(|next| next.level <= row.level)
                    .map_or(flat.len(), |offset| i + 1 + offset);
                for inner in &flat[i + 1..end] {
                    prop_assert!(ancestors(&list, inner.category.id).contains(&row.category.id));
                }
            }
        }
    }
}
