//! In-memory [`Tracker`] used by the core's unit tests.

use crate::error::{CadenceError, Result};
use crate::item::TrackedItem;
use crate::tracker::{CreateResult, ItemCreate, ItemUpdate, NamedEntity, Tracker};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryTracker {
    states: Mutex<Vec<NamedEntity>>,
    teams: Mutex<Vec<NamedEntity>>,
    projects: Mutex<Vec<NamedEntity>>,
    labels: Mutex<Vec<NamedEntity>>,
    items: Mutex<Vec<TrackedItem>>,
    updates: Mutex<Vec<(String, ItemUpdate)>>,
    creates: Mutex<Vec<ItemCreate>>,
    searches: AtomicUsize,
    state_fetches: AtomicUsize,
    rejected_updates: Mutex<HashSet<String>>,
    broken_updates: Mutex<HashSet<String>>,
    reject_creates: Mutex<bool>,
    update_delay: Mutex<Option<std::time::Duration>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state(&self, id: &str, name: &str) {
        self.states.lock().unwrap().push(NamedEntity::new(id, name));
    }

    pub fn add_team(&self, id: &str, name: &str) {
        self.teams.lock().unwrap().push(NamedEntity::new(id, name));
    }

    pub fn add_project(&self, id: &str, name: &str) {
        self.projects.lock().unwrap().push(NamedEntity::new(id, name));
    }

    pub fn add_label(&self, id: &str, name: &str) {
        self.labels.lock().unwrap().push(NamedEntity::new(id, name));
    }

    pub fn add_item(&self, item: TrackedItem) {
        self.items.lock().unwrap().push(item);
    }

    /// Updates to `id` report `success: false`.
    pub fn reject_updates_for(&self, id: &str) {
        self.rejected_updates.lock().unwrap().insert(id.to_string());
    }

    /// Updates to `id` fail at the transport level.
    pub fn break_updates_for(&self, id: &str) {
        self.broken_updates.lock().unwrap().insert(id.to_string());
    }

    pub fn reject_creates(&self) {
        *self.reject_creates.lock().unwrap() = true;
    }

    /// Every update sleeps this long while counted as in flight.
    pub fn delay_updates(&self, delay: std::time::Duration) {
        *self.update_delay.lock().unwrap() = Some(delay);
    }

    /// Most updates that were ever running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn item(&self, id: &str) -> Option<TrackedItem> {
        self.items.lock().unwrap().iter().find(|i| i.id == id).cloned()
    }

    pub fn updates(&self) -> Vec<(String, ItemUpdate)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn creates(&self) -> Vec<ItemCreate> {
        self.creates.lock().unwrap().clone()
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn state_fetches(&self) -> usize {
        self.state_fetches.load(Ordering::SeqCst)
    }
}

/// An open, unsnoozed item for tests to tweak with struct-update syntax.
pub fn sample_item(id: &str, title: &str, state_id: &str, updated_at: DateTime<Utc>) -> TrackedItem {
    TrackedItem {
        id: id.to_string(),
        identifier: format!("TST-{id}"),
        title: title.to_string(),
        description: None,
        state_id: Some(state_id.to_string()),
        updated_at,
        completed_at: None,
        canceled_at: None,
        archived_at: None,
        snoozed_until: None,
    }
}

#[async_trait]
impl Tracker for MemoryTracker {
    async fn list_workflow_states(&self) -> Result<Vec<NamedEntity>> {
        self.state_fetches.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(self.states.lock().unwrap().clone())
    }

    async fn list_teams(&self) -> Result<Vec<NamedEntity>> {
        Ok(self.teams.lock().unwrap().clone())
    }

    async fn list_projects(&self) -> Result<Vec<NamedEntity>> {
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn list_labels(&self) -> Result<Vec<NamedEntity>> {
        Ok(self.labels.lock().unwrap().clone())
    }

    async fn list_items_by_state(&self, state_id: &str) -> Result<Vec<TrackedItem>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.state_id.as_deref() == Some(state_id))
            .cloned()
            .collect())
    }

    async fn list_all_items(&self) -> Result<Vec<TrackedItem>> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn search_items_by_title(&self, text: &str) -> Result<Vec<TrackedItem>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let needle = text.to_lowercase();
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn update_item(&self, id: &str, update: ItemUpdate) -> Result<bool> {
        self.updates
            .lock()
            .unwrap()
            .push((id.to_string(), update.clone()));
        let delay = *self.update_delay.lock().unwrap();
        if let Some(delay) = delay {
            let now_running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now_running, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        if self.broken_updates.lock().unwrap().contains(id) {
            return Err(CadenceError::Remote(format!("connection reset updating {id}")));
        }
        if self.rejected_updates.lock().unwrap().contains(id) {
            return Ok(false);
        }

        let mut items = self.items.lock().unwrap();
        let Some(item) = items.iter_mut().find(|i| i.id == id) else {
            return Ok(false);
        };
        if let Some(description) = update.description {
            item.description = Some(description);
        }
        if let Some(state_id) = update.state_id {
            item.state_id = Some(state_id);
        }
        if update.clear_snooze {
            item.snoozed_until = None;
        }
        item.updated_at = Utc::now();
        Ok(true)
    }

    async fn create_item(&self, input: ItemCreate) -> Result<CreateResult> {
        self.creates.lock().unwrap().push(input.clone());
        if *self.reject_creates.lock().unwrap() {
            return Ok(CreateResult {
                success: false,
                item: None,
            });
        }

        let mut items = self.items.lock().unwrap();
        let id = format!("new-{}", items.len() + 1);
        let item = TrackedItem {
            description: input.description,
            ..sample_item(&id, &input.title, &input.state_id, Utc::now())
        };
        items.push(item.clone());
        Ok(CreateResult {
            success: true,
            item: Some(item),
        })
    }
}
