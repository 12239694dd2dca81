//! Materializing recurring items.
//!
//! On days its schedule fires, a recurrence either creates a fresh item,
//! refreshes the existing item with the same title (new description, target
//! state, snooze cleared), or leaves a snoozed item alone. Which one happens is
//! decided by [`decide`]; the modifiers are checked in a fixed order:
//!
//! 1. `duplicate_if_already_open` → create, without looking for a match
//! 2. no item with the exact title → create
//! 3. `always_create_new` and the match is closed → create
//! 4. `do_not_unsnooze` and the match is snoozed → skip
//! 5. otherwise → reopen the match

use crate::catalog::Catalog;
use crate::error::{CadenceError, Result};
use crate::item::{ItemDefinition, TrackedItem};
use crate::schedule::Schedule;
use crate::tracker::{ItemCreate, ItemUpdate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Recurrence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceOptions {
    #[serde(default)]
    pub duplicate_if_already_open: bool,
    #[serde(default)]
    pub always_create_new: bool,
    #[serde(default)]
    pub do_not_unsnooze: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recurrence {
    pub item: ItemDefinition,
    /// Workflow state name new and reopened items are placed in.
    pub state: String,
    pub schedule: Schedule,
    pub options: RecurrenceOptions,
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<'a> {
    Create,
    Reopen(&'a TrackedItem),
    SkipSnoozed(&'a TrackedItem),
}

pub fn decide(options: RecurrenceOptions, existing: Option<&TrackedItem>) -> Decision<'_> {
    if options.duplicate_if_already_open {
        return Decision::Create;
    }
    let Some(item) = existing else {
        return Decision::Create;
    };
    if options.always_create_new && !item.is_open() {
        return Decision::Create;
    }
    if options.do_not_unsnooze && item.is_snoozed() {
        return Decision::SkipSnoozed(item);
    }
    Decision::Reopen(item)
}

/// First search hit whose title matches exactly.
pub fn exact_title_match<'a>(candidates: &'a [TrackedItem], title: &str) -> Option<&'a TrackedItem> {
    candidates.iter().find(|item| item.title == title)
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    NotScheduled,
    Created {
        #[serde(skip_serializing_if = "Option::is_none")]
        identifier: Option<String>,
    },
    CreateFailed {
        reason: String,
    },
    Reopened {
        identifier: String,
    },
    ReopenFailed {
        identifier: String,
        reason: String,
    },
    SkippedSnoozed {
        identifier: String,
    },
}

impl ReconcileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ReconcileOutcome::CreateFailed { .. } | ReconcileOutcome::ReopenFailed { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReconcileOutcome::NotScheduled => "not_scheduled",
            ReconcileOutcome::Created { .. } => "created",
            ReconcileOutcome::CreateFailed { .. } => "create_failed",
            ReconcileOutcome::Reopened { .. } => "reopened",
            ReconcileOutcome::ReopenFailed { .. } => "reopen_failed",
            ReconcileOutcome::SkippedSnoozed { .. } => "skipped_snoozed",
        }
    }
}

// ---------------------------------------------------------------------------
// RecurrenceReconciler
// ---------------------------------------------------------------------------

pub struct RecurrenceReconciler<'a> {
    catalog: &'a Catalog,
    default_team: Option<String>,
}

impl<'a> RecurrenceReconciler<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            default_team: None,
        }
    }

    /// Team used for new items whose definition names none.
    pub fn with_default_team(mut self, team: Option<String>) -> Self {
        self.default_team = team;
        self
    }

    /// Run one recurrence for `today`. Catalog misses (unknown state, team,
    /// project, label) and failed lookups are errors; failed creates and
    /// updates are outcomes.
    pub async fn reconcile(
        &self,
        recurrence: &Recurrence,
        today: NaiveDate,
    ) -> Result<ReconcileOutcome> {
        let title = &recurrence.item.title;
        if !recurrence.schedule.fires_on(today) {
            debug!(%title, schedule = %recurrence.schedule, "not scheduled today");
            return Ok(ReconcileOutcome::NotScheduled);
        }

        let state_id = self.catalog.state_id(&recurrence.state).await?;

        let candidates = if recurrence.options.duplicate_if_already_open {
            Vec::new()
        } else {
            self.catalog.tracker().search_items_by_title(title).await?
        };
        let existing = exact_title_match(&candidates, title);

        match decide(recurrence.options, existing) {
            Decision::Create => self.create(recurrence, state_id, today).await,
            Decision::Reopen(item) => Ok(self.reopen(recurrence, item, state_id).await),
            Decision::SkipSnoozed(item) => {
                info!(item = %item.identifier, %title, "left snoozed item alone");
                Ok(ReconcileOutcome::SkippedSnoozed {
                    identifier: item.identifier.clone(),
                })
            }
        }
    }

    async fn create(
        &self,
        recurrence: &Recurrence,
        state_id: String,
        today: NaiveDate,
    ) -> Result<ReconcileOutcome> {
        let def = &recurrence.item;
        let team = def
            .team
            .as_deref()
            .or(self.default_team.as_deref())
            .ok_or_else(|| CadenceError::MissingTeam(def.title.clone()))?;
        let team_id = self.catalog.team_id(team).await?;
        let project_id = match &def.project {
            Some(project) => Some(self.catalog.project_id(project).await?),
            None => None,
        };
        let mut label_ids = Vec::with_capacity(def.labels.len());
        for label in &def.labels {
            label_ids.push(self.catalog.label_id(label).await?);
        }

        let input = ItemCreate {
            title: def.title.clone(),
            description: def.description.clone(),
            state_id,
            team_id,
            project_id,
            label_ids,
            due_date: def.due.as_ref().and_then(|due| due.resolve(today)),
        };

        let outcome = match self.catalog.tracker().create_item(input).await {
            Ok(result) if result.success => ReconcileOutcome::Created {
                identifier: result.item.map(|item| item.identifier),
            },
            Ok(_) => ReconcileOutcome::CreateFailed {
                reason: "tracker reported failure".to_string(),
            },
            Err(e) => ReconcileOutcome::CreateFailed {
                reason: e.to_string(),
            },
        };

        match &outcome {
            ReconcileOutcome::Created { identifier } => info!(
                title = %def.title,
                item = identifier.as_deref().unwrap_or("?"),
                "created recurring item"
            ),
            ReconcileOutcome::CreateFailed { reason } => {
                warn!(title = %def.title, %reason, "failed to create recurring item")
            }
            _ => {}
        }
        Ok(outcome)
    }

    async fn reopen(
        &self,
        recurrence: &Recurrence,
        item: &TrackedItem,
        state_id: String,
    ) -> ReconcileOutcome {
        let update = ItemUpdate {
            description: recurrence.item.description.clone(),
            state_id: Some(state_id),
            clear_snooze: true,
        };
        let failure = match self.catalog.tracker().update_item(&item.id, update).await {
            Ok(true) => None,
            Ok(false) => Some("tracker reported failure".to_string()),
            Err(e) => Some(e.to_string()),
        };

        match failure {
            None => {
                info!(item = %item.identifier, to = %recurrence.state, "reopened recurring item");
                ReconcileOutcome::Reopened {
                    identifier: item.identifier.clone(),
                }
            }
            Some(reason) => {
                warn!(item = %item.identifier, %reason, "failed to reopen recurring item");
                ReconcileOutcome::ReopenFailed {
                    identifier: item.identifier.clone(),
                    reason,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
