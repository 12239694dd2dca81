use crate::duration::Duration;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TrackedItem
// ---------------------------------------------------------------------------

/// An issue as reported by the tracker. Read-only from the automation's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedItem {
    pub id: String,
    /// Human-facing key such as `ENG-42`.
    pub identifier: String,
    pub title: String,
    pub description: Option<String>,
    pub state_id: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub snoozed_until: Option<DateTime<Utc>>,
}

impl TrackedItem {
    pub fn is_open(&self) -> bool {
        self.completed_at.is_none() && self.canceled_at.is_none() && self.archived_at.is_none()
    }

    /// Snoozed means a snooze instant is recorded at all, even one in the past.
    pub fn is_snoozed(&self) -> bool {
        self.snoozed_until.is_some()
    }

    pub fn is_stale(&self, threshold: Duration, now: DateTime<Utc>) -> bool {
        Duration::between(self.updated_at, now).greater_than(threshold)
    }
}

// ---------------------------------------------------------------------------
// ItemDefinition
// ---------------------------------------------------------------------------

/// When a materialized item is due.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Due {
    On(NaiveDate),
    After(Duration),
}

impl Due {
    /// Offsets are counted in whole days from `today`, rounding down.
    pub fn resolve(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Due::On(date) => Some(*date),
            Due::After(offset) => {
                let days = offset.days();
                if days >= 0 {
                    today.checked_add_days(chrono::Days::new(days.unsigned_abs()))
                } else {
                    today.checked_sub_days(chrono::Days::new(days.unsigned_abs()))
                }
            }
        }
    }
}

/// What a recurring item looks like when it is created or refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<Due>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl ItemDefinition {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due: None,
            team: None,
            project: None,
            labels: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_due(mut self, due: Due) -> Self {
        self.due = Some(due);
        self
    }
}

/// Config-boundary input: a bare title or a full definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemSpec {
    Title(String),
    Definition(ItemDefinition),
}

impl ItemSpec {
    pub fn title(&self) -> &str {
        match self {
            ItemSpec::Title(title) => title,
            ItemSpec::Definition(def) => &def.title,
        }
    }

    pub fn into_definition(self) -> ItemDefinition {
        match self {
            ItemSpec::Title(title) => ItemDefinition::new(title),
            ItemSpec::Definition(def) => def,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
