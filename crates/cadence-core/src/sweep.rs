//! Moving stale items between workflow states.
//!
//! Snoozed items are never moved. Every other item in the source state whose
//! last update is older than the threshold gets one transition request; those
//! requests run concurrently (bounded) and succeed or fail independently.

use crate::catalog::Catalog;
use crate::duration::Duration;
use crate::error::Result;
use crate::item::TrackedItem;
use crate::tracker::ItemUpdate;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{info, warn};

pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

// ---------------------------------------------------------------------------
// SweepRule / outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRule {
    pub from: String,
    pub to: String,
    pub after: Duration,
}

impl SweepRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>, after: Duration) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            after,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveOutcome {
    pub id: String,
    pub identifier: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub from: String,
    pub to: String,
    pub examined: usize,
    pub skipped_snoozed: usize,
    /// One entry per item a transition was requested for, ordered by identifier.
    pub moves: Vec<MoveOutcome>,
}

impl SweepReport {
    pub fn moved(&self) -> usize {
        self.moves.iter().filter(|m| m.success).count()
    }

    pub fn failed(&self) -> usize {
        self.moves.len() - self.moved()
    }
}

// ---------------------------------------------------------------------------
// StaleSweeper
// ---------------------------------------------------------------------------

pub struct StaleSweeper<'a> {
    catalog: &'a Catalog,
    max_concurrency: usize,
}

impl<'a> StaleSweeper<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Cap on simultaneous update requests; zero is treated as one.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    /// Resolves both states before touching any item, so an unknown name
    /// aborts the sweep without side effects.
    pub async fn sweep(&self, rule: &SweepRule, now: DateTime<Utc>) -> Result<SweepReport> {
        let from_id = self.catalog.state_id(&rule.from).await?;
        let to_id = self.catalog.state_id(&rule.to).await?;
        let items = self.catalog.tracker().list_items_by_state(&from_id).await?;

        let examined = items.len();
        let (snoozed, awake): (Vec<TrackedItem>, Vec<TrackedItem>) =
            items.into_iter().partition(TrackedItem::is_snoozed);
        let stale: Vec<TrackedItem> = awake
            .into_iter()
            .filter(|item| item.is_stale(rule.after, now))
            .collect();

        let permits = Semaphore::new(self.max_concurrency.min(Semaphore::MAX_PERMITS));
        let (permits, to_id) = (&permits, to_id.as_str());
        let mut moves: Vec<MoveOutcome> = join_all(stale.into_iter().map(|item| async move {
            let _permit = permits.acquire().await.ok();
            self.move_item(item, to_id, &rule.to).await
        }))
        .await;
        moves.sort_by(|a, b| a.identifier.cmp(&b.identifier));

        Ok(SweepReport {
            from: rule.from.clone(),
            to: rule.to.clone(),
            examined,
            skipped_snoozed: snoozed.len(),
            moves,
        })
    }

    async fn move_item(&self, item: TrackedItem, to_id: &str, to_name: &str) -> MoveOutcome {
        let update = ItemUpdate {
            state_id: Some(to_id.to_string()),
            ..ItemUpdate::default()
        };
        let reason = match self.catalog.tracker().update_item(&item.id, update).await {
            Ok(true) => None,
            Ok(false) => Some("tracker reported failure".to_string()),
            Err(e) => Some(e.to_string()),
        };

        match &reason {
            None => info!(item = %item.identifier, to = to_name, "moved stale item"),
            Some(why) => warn!(item = %item.identifier, to = to_name, reason = %why, "failed to move item"),
        }

        MoveOutcome {
            id: item.id,
            identifier: item.identifier,
            success: reason.is_none(),
            reason,
        }
    }
}

/// Items older than `after`, from one state or (with `None`) from every state.
/// Snoozed items are included; this is a report, not a sweep.
pub async fn find_stale(
    catalog: &Catalog,
    state: Option<&str>,
    after: Duration,
    now: DateTime<Utc>,
) -> Result<Vec<TrackedItem>> {
    let items = match state {
        Some(name) => {
            let id = catalog.state_id(name).await?;
            catalog.tracker().list_items_by_state(&id).await?
        }
        None => catalog.tracker().list_all_items().await?,
    };
    let mut stale: Vec<TrackedItem> = items
        .into_iter()
        .filter(|item| item.is_open() && item.is_stale(after, now))
        .collect();
    stale.sort_by_key(|item| item.updated_at);
    Ok(stale)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CadenceError;
    use crate::testing::{sample_item, MemoryTracker};
    use chrono::{TimeDelta, TimeZone};
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap()
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        now() - TimeDelta::days(days)
    }

    fn tracker() -> Arc<MemoryTracker> {
        let tracker = MemoryTracker::new();
        tracker.add_state("s-todo", "Todo");
        tracker.add_state("s-triage", "Triage");
        tracker.add_state("s-backlog", "Backlog");
        Arc::new(tracker)
    }

    fn todo_to_triage() -> SweepRule {
        SweepRule::new("Todo", "Triage", Duration::of_days(2))
    }

    #[tokio::test]
    async fn moves_stale_and_skips_snoozed() {
        let tracker = tracker();
        tracker.add_item(sample_item("a", "Item A", "s-todo", days_ago(10)));
        tracker.add_item(TrackedItem {
            snoozed_until: Some(now() + TimeDelta::days(3)),
            ..sample_item("b", "Item B", "s-todo", days_ago(10))
        });
        let catalog = Catalog::new(tracker.clone());

        let report = StaleSweeper::new(&catalog)
            .sweep(&todo_to_triage(), now())
            .await
            .unwrap();

        assert_eq!(report.examined, 2);
        assert_eq!(report.skipped_snoozed, 1);
        assert_eq!(report.moved(), 1);
        assert_eq!(report.moves[0].id, "a");
        assert_eq!(tracker.item("a").unwrap().state_id.as_deref(), Some("s-triage"));
        assert_eq!(tracker.item("b").unwrap().state_id.as_deref(), Some("s-todo"));
        assert!(tracker.updates().iter().all(|(id, _)| id != "b"));
    }

    #[tokio::test]
    async fn snoozed_in_the_past_is_still_skipped() {
        let tracker = tracker();
        tracker.add_item(TrackedItem {
            snoozed_until: Some(days_ago(5)),
            ..sample_item("old", "Old", "s-todo", days_ago(30))
        });
        let catalog = Catalog::new(tracker.clone());

        let report = StaleSweeper::new(&catalog)
            .sweep(&todo_to_triage(), now())
            .await
            .unwrap();

        assert!(report.moves.is_empty());
        assert!(tracker.updates().is_empty());
    }

    #[tokio::test]
    async fn fresh_items_and_other_states_are_left_alone() {
        let tracker = tracker();
        tracker.add_item(sample_item("fresh", "Fresh", "s-todo", days_ago(1)));
        tracker.add_item(sample_item("elsewhere", "Elsewhere", "s-backlog", days_ago(40)));
        let catalog = Catalog::new(tracker.clone());

        let report = StaleSweeper::new(&catalog)
            .sweep(&todo_to_triage(), now())
            .await
            .unwrap();

        assert_eq!(report.examined, 1);
        assert!(report.moves.is_empty());
        assert!(tracker.updates().is_empty());
    }

    #[tokio::test]
    async fn one_failure_does_not_block_siblings() {
        let tracker = tracker();
        for id in ["a", "b", "c", "d"] {
            tracker.add_item(sample_item(id, id, "s-todo", days_ago(9)));
        }
        tracker.reject_updates_for("b");
        tracker.break_updates_for("c");
        let catalog = Catalog::new(tracker.clone());

        let report = StaleSweeper::new(&catalog)
            .with_max_concurrency(2)
            .sweep(&todo_to_triage(), now())
            .await
            .unwrap();

        assert_eq!(report.moves.len(), 4);
        assert_eq!(report.moved(), 2);
        assert_eq!(report.failed(), 2);
        let by_id = |id: &str| report.moves.iter().find(|m| m.id == id).unwrap().clone();
        assert!(by_id("a").success);
        assert_eq!(by_id("b").reason.as_deref(), Some("tracker reported failure"));
        assert!(by_id("c").reason.unwrap().contains("connection reset"));
        assert!(by_id("d").success);
        assert_eq!(tracker.item("d").unwrap().state_id.as_deref(), Some("s-triage"));
    }

    #[tokio::test]
    async fn unknown_state_aborts_before_any_update() {
        let tracker = tracker();
        tracker.add_item(sample_item("a", "A", "s-todo", days_ago(10)));
        let catalog = Catalog::new(tracker.clone());

        let err = StaleSweeper::new(&catalog)
            .sweep(&SweepRule::new("Todo", "Done", Duration::of_days(2)), now())
            .await
            .unwrap_err();

        assert!(matches!(err, CadenceError::UnknownState(name) if name == "Done"));
        assert!(tracker.updates().is_empty());
    }

    #[tokio::test]
    async fn concurrency_floor_is_one() {
        let tracker = tracker();
        tracker.add_item(sample_item("a", "A", "s-todo", days_ago(10)));
        tracker.add_item(sample_item("b", "B", "s-todo", days_ago(10)));
        let catalog = Catalog::new(tracker.clone());

        let report = StaleSweeper::new(&catalog)
            .with_max_concurrency(0)
            .sweep(&todo_to_triage(), now())
            .await
            .unwrap();

        assert_eq!(report.moved(), 2);
    }

    #[tokio::test]
    async fn concurrent_updates_never_exceed_the_cap() {
        let tracker = tracker();
        for n in 0..20 {
            let id = format!("i{n:02}");
            tracker.add_item(sample_item(&id, &id, "s-todo", days_ago(10)));
        }
        tracker.delay_updates(std::time::Duration::from_millis(20));
        let catalog = Catalog::new(tracker.clone());

        let report = StaleSweeper::new(&catalog)
            .with_max_concurrency(3)
            .sweep(&todo_to_triage(), now())
            .await
            .unwrap();

        assert_eq!(report.moved(), 20);
        let peak = tracker.peak_in_flight();
        assert!(peak <= 3, "peak {peak} exceeded the cap");
        assert!(peak > 1, "updates ran one at a time");
    }

    #[tokio::test]
    async fn find_stale_spans_all_states_and_skips_closed() {
        let tracker = tracker();
        tracker.add_item(sample_item("a", "A", "s-todo", days_ago(10)));
        tracker.add_item(sample_item("b", "B", "s-backlog", days_ago(20)));
        tracker.add_item(sample_item("c", "C", "s-backlog", days_ago(1)));
        tracker.add_item(TrackedItem {
            completed_at: Some(days_ago(15)),
            ..sample_item("d", "D", "s-backlog", days_ago(15))
        });
        let catalog = Catalog::new(tracker.clone());

        let all = find_stale(&catalog, None, Duration::of_days(7), now()).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let todo = find_stale(&catalog, Some("Todo"), Duration::of_days(7), now())
            .await
            .unwrap();
        assert_eq!(todo.len(), 1);
    }
}
