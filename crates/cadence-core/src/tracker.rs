//! The issue-tracker seam.
//!
//! The core never talks to a network directly; it reads and mutates items
//! through a [`Tracker`]. `linear-client` provides the production
//! implementation.

use crate::error::Result;
use crate::item::TrackedItem;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A catalog row: workflow state, team, project, or label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub id: String,
    pub name: String,
}

impl NamedEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Fields to change on an existing item. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemUpdate {
    pub description: Option<String>,
    pub state_id: Option<String>,
    /// Clear any snooze so the item resurfaces immediately.
    pub clear_snooze: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCreate {
    pub title: String,
    pub description: Option<String>,
    pub state_id: String,
    pub team_id: String,
    pub project_id: Option<String>,
    pub label_ids: Vec<String>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateResult {
    pub success: bool,
    pub item: Option<TrackedItem>,
}

#[async_trait]
pub trait Tracker: Send + Sync {
    async fn list_workflow_states(&self) -> Result<Vec<NamedEntity>>;

    async fn list_teams(&self) -> Result<Vec<NamedEntity>>;

    async fn list_projects(&self) -> Result<Vec<NamedEntity>>;

    async fn list_labels(&self) -> Result<Vec<NamedEntity>>;

    async fn list_items_by_state(&self, state_id: &str) -> Result<Vec<TrackedItem>>;

    async fn list_all_items(&self) -> Result<Vec<TrackedItem>>;

    /// Fuzzy/substring search. Callers filter for exact titles themselves.
    async fn search_items_by_title(&self, text: &str) -> Result<Vec<TrackedItem>>;

    /// Returns the tracker's success flag.
    async fn update_item(&self, id: &str, update: ItemUpdate) -> Result<bool>;

    async fn create_item(&self, input: ItemCreate) -> Result<CreateResult>;
}
