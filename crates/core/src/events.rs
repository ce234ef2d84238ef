//! Server-sent change notifications.

use serde::{Deserialize, Serialize};

use crate::types::CategoryId;

/// What happened to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryChange {
    Created,
    Updated,
    Deleted,
}

/// A category change pushed over `/api/sse/events`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEvent {
    pub change: CategoryChange,
    /// The affected category, when the server included it.
    pub category_id: Option<CategoryId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventPayload {
    #[serde(default, alias = "id")]
    category_id: Option<CategoryId>,
}

impl CategoryEvent {
    /// Interpret an SSE event name and data field.
    ///
    /// Returns `None` for event types other than `category_created`,
    /// `category_updated` and `category_deleted`. Data that is not a JSON
    /// object with an id still yields an event, just without the id.
    #[must_use]
    pub fn from_sse(event: &str, data: &str) -> Option<Self> {
        let change = match event.trim() {
            "category_created" => CategoryChange::Created,
            "category_updated" => CategoryChange::Updated,
            "category_deleted" => CategoryChange::Deleted,
            _ => return None,
        };
        let category_id = serde_json::from_str::<EventPayload>(data)
            .ok()
            .and_then(|payload| payload.category_id);
        Some(Self {
            change,
            category_id,
        })
    }

    /// The SSE event name for this change.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self.change {
            CategoryChange::Created => "category_created",
            CategoryChange::Updated => "category_updated",
            CategoryChange::Deleted => "category_deleted",
        }
    }
}
