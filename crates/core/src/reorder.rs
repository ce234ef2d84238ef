//! Drag-and-drop reordering of sibling categories.

use crate::types::{Category, CategoryId};

/// Move the sibling at `from` to position `to` and renumber `sort_order`
/// as the new index.
///
/// `siblings` should already be in display order. Returns the `(id,
/// sort_order)` pairs that changed, which is what needs persisting. Out of
/// range positions are clamped to the last index; an empty slice yields no
/// changes.
#[must_use]
pub fn reorder_siblings(siblings: &[Category], from: usize, to: usize) -> Vec<(CategoryId, i32)> {
    if siblings.is_empty() {
        return Vec::new();
    }
    let last = siblings.len() - 1;
    let (from, to) = (from.min(last), to.min(last));

    let mut order: Vec<&Category> = siblings.iter().collect();
    let moved = order.remove(from);
    order.insert(to, moved);

    order
        .into_iter()
        .zip(0..)
        .filter(|(category, index)| category.sort_order != *index)
        .map(|(category, index)| (category.id, index))
        .collect()
}

/// Siblings of `parent` in display order.
#[must_use]
pub fn siblings_of(categories: &[Category], parent: Option<CategoryId>) -> Vec<Category> {
    let mut siblings: Vec<Category> = categories
        .iter()
        .filter(|c| c.parent_id == parent)
        .cloned()
        .collect();
    siblings.sort_by_key(|c| c.sort_order);
    siblings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sibling(id: i64, sort_order: i32) -> Category {
        Category {
            id: CategoryId::new(id),
            name: format!("c{id}"),
            slug: format!("c{id}"),
            description: None,
            parent_id: None,
            is_active: true,
            sort_order,
        }
    }

    #[test]
    fn test_move_down() {
        let list = [sibling(1, 0), sibling(2, 1), sibling(3, 2)];
        let changes = reorder_siblings(&list, 0, 2);
        assert_eq!(
            changes,
            [
                (CategoryId::new(2), 0),
                (CategoryId::new(3), 1),
                (CategoryId::new(1), 2)
            ]
        );
    }

    #[test]
    fn test_move_up_only_reports_changed_rows() {
        let list = [sibling(1, 0), sibling(2, 1), sibling(3, 2), sibling(4, 3)];
        let changes = reorder_siblings(&list, 2, 1);
        assert_eq!(changes, [(CategoryId::new(3), 1), (CategoryId::new(2), 2)]);
    }

    #[test]
    fn test_renumbers_gappy_sort_orders() {
        let list = [sibling(1, 10), sibling(2, 20)];
        let changes = reorder_siblings(&list, 0, 0);
        assert_eq!(changes, [(CategoryId::new(1), 0), (CategoryId::new(2), 1)]);
    }

    #[test]
    fn test_out_of_range_and_empty() {
        assert!(reorder_siblings(&[], 0, 3).is_empty());
        let list = [sibling(1, 0), sibling(2, 1)];
        let changes = reorder_siblings(&list, 0, 99);
        assert_eq!(changes, [(CategoryId::new(2), 0), (CategoryId::new(1), 1)]);
    }

    #[test]
    fn test_siblings_of_sorts() {
        let mut child = sibling(3, 0);
        child.parent_id = Some(CategoryId::new(1));
        let list = [sibling(1, 5), sibling(2, 1), child];
        let roots: Vec<_> = siblings_of(&list, None).iter().map(|c| c.id.as_i64()).collect();
        assert_eq!(roots, [2, 1]);
    }
}
