//! Per-run name → id lookups.
//!
//! A [`Catalog`] is built once per automation run. Each table is fetched from
//! the tracker on first use and then reused for the rest of the run;
//! concurrent first lookups share a single fetch. A new run builds a new
//! catalog and therefore refetches.
//!
//! Lookups are by name across the whole workspace. When several entries share
//! a name (each team has its own "Todo", for instance) the last one listed
//! wins, so the resolved state may belong to another team than the one an
//! item is created in; the tracker then rejects the create, which surfaces as
//! a `CreateFailed` outcome.

use crate::error::{CadenceError, Result};
use crate::tracker::{NamedEntity, Tracker};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

type NameIndex = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    States,
    Teams,
    Projects,
    Labels,
}

impl Table {
    fn as_str(self) -> &'static str {
        match self {
            Table::States => "workflow states",
            Table::Teams => "teams",
            Table::Projects => "projects",
            Table::Labels => "labels",
        }
    }
}

pub struct Catalog {
    tracker: Arc<dyn Tracker>,
    states: OnceCell<NameIndex>,
    teams: OnceCell<NameIndex>,
    projects: OnceCell<NameIndex>,
    labels: OnceCell<NameIndex>,
}

impl Catalog {
    pub fn new(tracker: Arc<dyn Tracker>) -> Self {
        Self {
            tracker,
            states: OnceCell::new(),
            teams: OnceCell::new(),
            projects: OnceCell::new(),
            labels: OnceCell::new(),
        }
    }

    pub fn tracker(&self) -> &Arc<dyn Tracker> {
        &self.tracker
    }

    pub async fn state_id(&self, name: &str) -> Result<String> {
        self.lookup(Table::States, name)
            .await?
            .ok_or_else(|| CadenceError::UnknownState(name.to_string()))
    }

    pub async fn team_id(&self, name: &str) -> Result<String> {
        self.lookup(Table::Teams, name)
            .await?
            .ok_or_else(|| CadenceError::UnknownTeam(name.to_string()))
    }

    pub async fn project_id(&self, name: &str) -> Result<String> {
        self.lookup(Table::Projects, name)
            .await?
            .ok_or_else(|| CadenceError::UnknownProject(name.to_string()))
    }

    pub async fn label_id(&self, name: &str) -> Result<String> {
        self.lookup(Table::Labels, name)
            .await?
            .ok_or_else(|| CadenceError::UnknownLabel(name.to_string()))
    }

    async fn lookup(&self, table: Table, name: &str) -> Result<Option<String>> {
        let index = self.index(table).await?;
        Ok(index.get(name).cloned())
    }

    async fn index(&self, table: Table) -> Result<&NameIndex> {
        let cell = match table {
            Table::States => &self.states,
            Table::Teams => &self.teams,
            Table::Projects => &self.projects,
            Table::Labels => &self.labels,
        };
        cell.get_or_try_init(|| self.fetch(table)).await
    }

    async fn fetch(&self, table: Table) -> Result<NameIndex> {
        let rows = match table {
            Table::States => self.tracker.list_workflow_states().await?,
            Table::Teams => self.tracker.list_teams().await?,
            Table::Projects => self.tracker.list_projects().await?,
            Table::Labels => self.tracker.list_labels().await?,
        };
        debug!(table = table.as_str(), count = rows.len(), "catalog populated");
        Ok(index_by_name(rows))
    }
}

/// Later rows win when names repeat (e.g. a "Todo" state in several teams).
fn index_by_name(rows: Vec<NamedEntity>) -> NameIndex {
    rows.into_iter().map(|row| (row.name, row.id)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
