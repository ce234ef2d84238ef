//! Recently viewed products, most recent first.

use std::sync::Arc;

use nursery_core::ProductId;

use crate::storage::{LocalStore, keys, load_json, save_json};

/// How many products are remembered.
pub const RECENTLY_VIEWED_CAP: usize = 10;

/// Persisted list of product ids the shopper looked at.
pub struct RecentlyViewed {
    store: Arc<dyn LocalStore>,
    ids: Vec<ProductId>,
}

impl RecentlyViewed {
    /// Load the list from the store; a missing or malformed entry is empty.
    pub fn load(store: Arc<dyn LocalStore>) -> Self {
        let mut ids: Vec<ProductId> =
            load_json(store.as_ref(), keys::RECENTLY_VIEWED).unwrap_or_default();
        ids.truncate(RECENTLY_VIEWED_CAP);
        Self { store, ids }
    }

    /// Product ids, most recent first.
    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    /// Move `id` to the front, dropping the oldest entry past the cap.
    pub fn record(&mut self, id: ProductId) {
        self.ids.retain(|existing| *existing != id);
        self.ids.insert(0, id);
        self.ids.truncate(RECENTLY_VIEWED_CAP);
        save_json(self.store.as_ref(), keys::RECENTLY_VIEWED, &self.ids);
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.ids.clear();
        save_json(self.store.as_ref(), keys::RECENTLY_VIEWED, &self.ids);
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn ids(values: &[i64]) -> Vec<ProductId> {
        values.iter().copied().map(ProductId::new).collect()
    }

    #[test]
    fn test_most_recent_first_without_duplicates() {
        let mut recent = RecentlyViewed::load(Arc::new(MemoryStore::new()));
        recent.record(ProductId::new(1));
        recent.record(ProductId::new(2));
        recent.record(ProductId::new(1));
        assert_eq!(recent.ids(), ids(&[1, 2]));
    }

    #[test]
    fn test_capped_at_ten() {
        let mut recent = RecentlyViewed::load(Arc::new(MemoryStore::new()));
        for id in 1..=12 {
            recent.record(ProductId::new(id));
        }
        assert_eq!(recent.ids().len(), RECENTLY_VIEWED_CAP);
        assert_eq!(recent.ids()[0], ProductId::new(12));
        assert_eq!(recent.ids()[9], ProductId::new(3));
    }

    #[test]
    fn test_persists_between_loads() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let mut recent = RecentlyViewed::load(store.clone());
        recent.record(ProductId::new(5));
        recent.record(ProductId::new(6));

        let reloaded = RecentlyViewed::load(store.clone());
        assert_eq!(reloaded.ids(), ids(&[6, 5]));

        let mut reloaded = reloaded;
        reloaded.clear();
        assert!(RecentlyViewed::load(store).ids().is_empty());
    }
}
