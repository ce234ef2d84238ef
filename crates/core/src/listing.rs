//! Filtering and sorting of a flattened category list.
//!
//! Each filter is an independent pass over the rows and is a no-op when
//! unset. Sorting is applied last and is stable, so rows with equal keys
//! keep their tree order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::tree::FlatCategory;

/// Active/inactive filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    Active,
    Inactive,
}

/// Root vs nested filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindFilter {
    /// Categories without a parent.
    Parent,
    /// Categories with a parent.
    Child,
}

/// Filter controls for the category listing. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFilter {
    /// Case-insensitive substring match on name, slug or description.
    pub search: Option<String>,
    pub status: Option<StatusFilter>,
    pub kind: Option<KindFilter>,
    pub level: Option<usize>,
}

/// Sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Keep tree (pre-order) order.
    #[default]
    Tree,
    Name,
    Level,
    Status,
    SortOrder,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Sort controls for the category listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySort {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl CategoryFilter {
    /// Apply every filter in turn.
    #[must_use]
    pub fn apply(&self, rows: Vec<FlatCategory>) -> Vec<FlatCategory> {
        rows.into_iter()
            .filter(|row| self.matches_search(row))
            .filter(|row| self.matches_status(row))
            .filter(|row| self.matches_kind(row))
            .filter(|row| self.matches_level(row))
            .collect()
    }

    fn matches_search(&self, row: &FlatCategory) -> bool {
        let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let term = term.to_lowercase();
        let category = &row.category;
        category.name.to_lowercase().contains(&term)
            || category.slug.to_lowercase().contains(&term)
            || category
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&term))
    }

    fn matches_status(&self, row: &FlatCategory) -> bool {
        match self.status {
            None => true,
            Some(StatusFilter::Active) => row.category.is_active,
            Some(StatusFilter::Inactive) => !row.category.is_active,
        }
    }

    fn matches_kind(&self, row: &FlatCategory) -> bool {
        match self.kind {
            None => true,
            Some(KindFilter::Parent) => row.category.is_root(),
            Some(KindFilter::Child) => !row.category.is_root(),
        }
    }

    fn matches_level(&self, row: &FlatCategory) -> bool {
        self.level.is_none_or(|level| row.level == level)
    }
}

impl CategorySort {
    /// Sort rows in place.
    pub fn apply(&self, rows: &mut [FlatCategory]) {
        let compare: fn(&FlatCategory, &FlatCategory) -> Ordering = match self.key {
            SortKey::Tree => return,
            SortKey::Name => |a, b| {
                a.category
                    .name
                    .to_lowercase()
                    .cmp(&b.category.name.to_lowercase())
            },
            SortKey::Level => |a, b| a.level.cmp(&b.level),
            // Active first when ascending
            SortKey::Status => |a, b| b.category.is_active.cmp(&a.category.is_active),
            SortKey::SortOrder => |a, b| a.category.sort_order.cmp(&b.category.sort_order),
        };

        match self.direction {
            SortDirection::Asc => rows.sort_by(compare),
            SortDirection::Desc => rows.sort_by(|a, b| compare(b, a)),
        }
    }
}

/// Filter then sort a flattened category list.
#[must_use]
pub fn list_categories(
    rows: Vec<FlatCategory>,
    filter: &CategoryFilter,
    sort: CategorySort,
) -> Vec<FlatCategory> {
    let mut rows = filter.apply(rows);
    sort.apply(&mut rows);
    rows
}
