//! One automation run: every configured sweep, then every recurrence.
//!
//! Errors are contained per rule. A sweep that names an unknown state is
//! reported and skipped; the remaining sweeps and recurrences still run.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::reconcile::{ReconcileOutcome, RecurrenceReconciler};
use crate::sweep::{StaleSweeper, SweepReport, SweepRule};
use crate::tracker::Tracker;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Clone, Serialize)]
pub struct SweepRun {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<SweepReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecurrenceRun {
    pub title: String,
    pub schedule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ReconcileOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub sweeps: Vec<SweepRun>,
    pub recurrences: Vec<RecurrenceRun>,
}

impl RunSummary {
    /// True when any rule errored or any item operation failed.
    pub fn has_failures(&self) -> bool {
        self.sweeps
            .iter()
            .any(|s| s.error.is_some() || s.report.as_ref().is_some_and(|r| r.failed() > 0))
            || self.recurrences.iter().any(|r| {
                r.error.is_some() || r.outcome.as_ref().is_some_and(ReconcileOutcome::is_failure)
            })
    }
}

pub struct Automation {
    catalog: Catalog,
    config: Config,
}

impl Automation {
    pub fn new(tracker: Arc<dyn Tracker>, config: Config) -> Self {
        Self {
            catalog: Catalog::new(tracker),
            config,
        }
    }

    pub async fn run(&self, now: DateTime<Utc>, today: NaiveDate) -> RunSummary {
        RunSummary {
            sweeps: self.run_sweeps(now).await,
            recurrences: self.run_recurrences(today).await,
        }
    }

    pub async fn run_sweeps(&self, now: DateTime<Utc>) -> Vec<SweepRun> {
        let mut runs = Vec::with_capacity(self.config.sweeps.len());
        for rule in &self.config.sweeps {
            runs.push(self.sweep(rule, now).await);
        }
        runs
    }

    pub async fn sweep(&self, rule: &SweepRule, now: DateTime<Utc>) -> SweepRun {
        let sweeper =
            StaleSweeper::new(&self.catalog).with_max_concurrency(self.config.defaults.max_concurrency);
        let (report, error) = match sweeper.sweep(rule, now).await {
            Ok(report) => (Some(report), None),
            Err(e) => {
                error!(from = %rule.from, to = %rule.to, error = %e, "sweep aborted");
                (None, Some(e.to_string()))
            }
        };
        SweepRun {
            from: rule.from.clone(),
            to: rule.to.clone(),
            report,
            error,
        }
    }

    pub async fn run_recurrences(&self, today: NaiveDate) -> Vec<RecurrenceRun> {
        let reconciler = RecurrenceReconciler::new(&self.catalog)
            .with_default_team(self.config.defaults.team.clone());
        let mut runs = Vec::with_capacity(self.config.recurrences.len());
        for recurrence in self.config.recurrence_list() {
            let (outcome, error) = match reconciler.reconcile(&recurrence, today).await {
                Ok(outcome) => (Some(outcome), None),
                Err(e) => {
                    error!(title = %recurrence.item.title, error = %e, "recurrence aborted");
                    (None, Some(e.to_string()))
                }
            };
            runs.push(RecurrenceRun {
                title: recurrence.item.title,
                schedule: recurrence.schedule.name(),
                outcome,
                error,
            });
        }
        runs
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
