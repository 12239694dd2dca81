//! Wire types for the subset of Linear's GraphQL schema cadence touches.

use cadence_core::item::TrackedItem;
use cadence_core::tracker::{ItemCreate, ItemUpdate, NamedEntity};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct GraphQLRequest<V: Serialize> {
    pub query: &'static str,
    pub variables: V,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQLError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Connection<T> {
    pub nodes: Vec<T>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntityNode {
    pub id: String,
    pub name: String,
}

impl From<EntityNode> for NamedEntity {
    fn from(node: EntityNode) -> Self {
        NamedEntity::new(node.id, node.name)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IssueNode {
    pub id: String,
    pub identifier: String,
    pub title: String,
    pub description: Option<String>,
    pub state: Option<IdRef>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub snoozed_until_at: Option<DateTime<Utc>>,
}

impl From<IssueNode> for TrackedItem {
    fn from(node: IssueNode) -> Self {
        TrackedItem {
            id: node.id,
            identifier: node.identifier,
            title: node.title,
            description: node.description,
            state_id: node.state.map(|s| s.id),
            updated_at: node.updated_at,
            completed_at: node.completed_at,
            canceled_at: node.canceled_at,
            archived_at: node.archived_at,
            snoozed_until: node.snoozed_until_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IssueUpdateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<String>,
    /// `Some(None)` sends an explicit `null`, which clears the snooze.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snoozed_until_at: Option<Option<DateTime<Utc>>>,
}

impl From<ItemUpdate> for IssueUpdateInput {
    fn from(update: ItemUpdate) -> Self {
        Self {
            description: update.description,
            state_id: update.state_id,
            snoozed_until_at: update.clear_snooze.then_some(None),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IssueCreateInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub state_id: String,
    pub team_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub label_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl From<ItemCreate> for IssueCreateInput {
    fn from(input: ItemCreate) -> Self {
        Self {
            title: input.title,
            description: input.description,
            state_id: input.state_id,
            team_id: input.team_id,
            project_id: input.project_id,
            label_ids: input.label_ids,
            due_date: input.due_date,
        }
    }
}
