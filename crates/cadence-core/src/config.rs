use crate::duration::Duration;
use crate::error::{CadenceError, Result};
use crate::item::{ItemDefinition, ItemSpec};
use crate::reconcile::{Recurrence, RecurrenceOptions};
use crate::schedule::{self, Schedule};
use crate::sweep::{SweepRule, DEFAULT_MAX_CONCURRENCY};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "cadence.yaml";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

impl ConfigWarning {
    fn warning(message: String) -> Self {
        Self {
            level: WarnLevel::Warning,
            message,
        }
    }

    fn error(message: String) -> Self {
        Self {
            level: WarnLevel::Error,
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Team for recurring items that do not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            team: None,
            max_concurrency: default_max_concurrency(),
        }
    }
}

// ---------------------------------------------------------------------------
// RecurrenceConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceConfig {
    pub item: ItemSpec,
    pub state: String,
    pub schedule: Schedule,
    #[serde(flatten)]
    pub options: RecurrenceOptions,
}

impl RecurrenceConfig {
    pub fn title(&self) -> &str {
        self.item.title()
    }

    pub fn to_recurrence(&self) -> Recurrence {
        Recurrence {
            item: self.item.clone().into_definition(),
            state: self.state.clone(),
            schedule: self.schedule,
            options: self.options,
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub sweeps: Vec<SweepRule>,
    #[serde(default)]
    pub recurrences: Vec<RecurrenceConfig>,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            defaults: Defaults::default(),
            sweeps: Vec::new(),
            recurrences: Vec::new(),
        }
    }
}

impl Config {
    /// The config written by `cadence init`: stale Todo items fall back to
    /// Triage after two days, stale Triage items to Backlog after a week.
    pub fn starter(team: Option<String>) -> Self {
        Self {
            defaults: Defaults {
                team,
                ..Defaults::default()
            },
            sweeps: vec![
                SweepRule::new("Todo", "Triage", Duration::of_days(2)),
                SweepRule::new("Triage", "Backlog", Duration::of_days(7)),
            ],
            recurrences: vec![RecurrenceConfig {
                item: ItemSpec::Definition(
                    ItemDefinition::new("Weekly planning")
                        .with_description("Review the backlog and pick this week's work."),
                ),
                state: "Todo".to_string(),
                schedule: schedule::EVERY_MONDAY,
                options: RecurrenceOptions::default(),
            }],
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CadenceError::ConfigNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    /// Like [`Config::save`], but leaves an existing file untouched.
    /// Returns true if the file was written.
    pub fn save_new(&self, path: &Path) -> Result<bool> {
        let data = serde_yaml::to_string(self)?;
        crate::io::write_if_missing(path, data.as_bytes())
    }

    pub fn recurrence_list(&self) -> Vec<Recurrence> {
        self.recurrences.iter().map(RecurrenceConfig::to_recurrence).collect()
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.sweeps.is_empty() && self.recurrences.is_empty() {
            warnings.push(ConfigWarning::warning(
                "no sweeps or recurrences configured; nothing to do".to_string(),
            ));
        }

        if self.defaults.max_concurrency == 0 {
            warnings.push(ConfigWarning::warning(
                "defaults.max_concurrency is 0; sweeps will run one update at a time".to_string(),
            ));
        }

        for sweep in &self.sweeps {
            if sweep.from == sweep.to {
                warnings.push(ConfigWarning::error(format!(
                    "sweep from '{}' to '{}' moves items into the state they are already in",
                    sweep.from, sweep.to
                )));
            }
            if !sweep.after.greater_than(Duration::ZERO) {
                warnings.push(ConfigWarning::warning(format!(
                    "sweep from '{}' to '{}' has threshold {}; every item will count as stale",
                    sweep.from, sweep.to, sweep.after
                )));
            }
        }

        let mut titles: HashMap<&str, usize> = HashMap::new();
        for recurrence in &self.recurrences {
            let title = recurrence.title();
            if title.trim().is_empty() {
                warnings.push(ConfigWarning::error(
                    "recurrence with an empty title".to_string(),
                ));
                continue;
            }
            *titles.entry(title).or_default() += 1;

            let has_team = match &recurrence.item {
                ItemSpec::Definition(def) => def.team.is_some(),
                ItemSpec::Title(_) => false,
            };
            if !has_team && self.defaults.team.is_none() {
                warnings.push(ConfigWarning::error(format!(
                    "recurrence '{title}' has no team and defaults.team is not set"
                )));
            }
        }

        let mut duplicates: Vec<&str> = titles
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(title, _)| title)
            .collect();
        duplicates.sort_unstable();
        for title in duplicates {
            warnings.push(ConfigWarning::warning(format!(
                "several recurrences share the title '{title}'; they will reopen the same item"
            )));
        }

        warnings
    }

    pub fn has_errors(&self) -> bool {
        self.validate().iter().any(|w| w.level == WarnLevel::Error)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
