use std::collections::HashMap;

use thiserror::Error;

use crate::client::wizard::StepId;
use crate::models::{form::TripFormData, trip::TripPlan};

pub const FORM_KEY: &str = "trip_wizard_form";
pub const STEP_KEY: &str = "trip_wizard_step";
pub const PLAN_KEY: &str = "trip_plan";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session storage quota exceeded")]
    QuotaExceeded,
    #[error("session storage unavailable: {0}")]
    Unavailable(String),
}

/// Tab-scoped volatile key-value store, shaped like web sessionStorage.
/// All call sites go through `SessionPersistence`; nothing else touches the
/// underlying store.
pub trait SessionStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove_item(&mut self, key: &str);
}

/// In-process store. `with_quota` caps the total stored bytes so tests can
/// exercise quota failures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: HashMap::new(),
            quota: Some(quota),
        }
    }

    fn stored_bytes(&self) -> usize {
        self.items.values().map(|v| v.len()).sum()
    }
}

impl SessionStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota {
            let existing = self.items.get(key).map(|v| v.len()).unwrap_or(0);
            if self.stored_bytes() - existing + value.len() > quota {
                return Err(StoreError::QuotaExceeded);
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) {
        self.items.remove(key);
    }
}

/// What the shell should render. A stored plan always wins over leftover
/// draft keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    Wizard,
    Plan,
}

/// The one owner of the session store. Mirrors the wizard draft and the
/// finished plan under separate keys so they cannot corrupt each other, and
/// treats every storage failure as "state not remembered", never as an
/// error the UI sees.
pub struct SessionPersistence<S: SessionStore> {
    store: S,
}

impl<S: SessionStore> SessionPersistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Called after every field mutation and step transition.
    pub fn persist_draft(&mut self, form: &TripFormData, step: StepId) {
        let (Ok(form_json), Ok(step_json)) =
            (serde_json::to_string(form), serde_json::to_string(&step))
        else {
            eprintln!("Failed to serialize wizard draft");
            return;
        };
        if let Err(err) = self.store.set_item(FORM_KEY, &form_json) {
            eprintln!("Failed to persist wizard form: {}", err);
        }
        if let Err(err) = self.store.set_item(STEP_KEY, &step_json) {
            eprintln!("Failed to persist wizard step: {}", err);
        }
    }

    /// Restore the draft saved by `persist_draft`. Corrupt or partial data
    /// clears the draft keys and yields None: a fresh wizard, never a
    /// crash.
    pub fn restore_draft(&mut self) -> Option<(TripFormData, StepId)> {
        let (Some(form_json), Some(step_json)) =
            (self.store.get_item(FORM_KEY), self.store.get_item(STEP_KEY))
        else {
            // a half-written draft is as good as none
            self.clear_draft();
            return None;
        };

        let form = serde_json::from_str::<TripFormData>(&form_json);
        let step = serde_json::from_str::<StepId>(&step_json);
        match (form, step) {
            (Ok(form), Ok(step)) => Some((form, step)),
            _ => {
                eprintln!("Discarding corrupt wizard draft");
                self.clear_draft();
                None
            }
        }
    }

    pub fn persist_plan(&mut self, plan: &TripPlan) {
        match serde_json::to_string(plan) {
            Ok(json) => {
                if let Err(err) = self.store.set_item(PLAN_KEY, &json) {
                    eprintln!("Failed to persist trip plan: {}", err);
                }
            }
            Err(err) => eprintln!("Failed to serialize trip plan: {}", err),
        }
    }

    pub fn restore_plan(&mut self) -> Option<TripPlan> {
        let json = self.store.get_item(PLAN_KEY)?;
        match serde_json::from_str(&json) {
            Ok(plan) => Some(plan),
            Err(err) => {
                eprintln!("Discarding corrupt trip plan: {}", err);
                self.store.remove_item(PLAN_KEY);
                None
            }
        }
    }

    /// Drop the draft only; used once a plan has been produced from it.
    pub fn clear_draft(&mut self) {
        self.store.remove_item(FORM_KEY);
        self.store.remove_item(STEP_KEY);
    }

    /// "New trip" reset: every key goes.
    pub fn clear_all(&mut self) {
        self.store.remove_item(FORM_KEY);
        self.store.remove_item(STEP_KEY);
        self.store.remove_item(PLAN_KEY);
    }

    pub fn active_view(&self) -> ActiveView {
        if self.store.get_item(PLAN_KEY).is_some() {
            ActiveView::Plan
        } else {
            ActiveView::Wizard
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_round_trips() {
        let mut session = SessionPersistence::new(MemoryStore::new());
        let mut form = TripFormData::new();
        form.region = "부산".to_string();
        form.interests = vec!["맛집 탐방".to_string()];

        session.persist_draft(&form, StepId::Style);
        let (restored_form, restored_step) = session.restore_draft().unwrap();
        assert_eq!(restored_form, form);
        assert_eq!(restored_step, StepId::Style);
    }

    #[test]
    fn corrupt_draft_is_discarded_not_fatal() {
        let mut store = MemoryStore::new();
        store.set_item(FORM_KEY, "{not json").unwrap();
        store.set_item(STEP_KEY, "\"style\"").unwrap();

        let mut session = SessionPersistence::new(store);
        assert!(session.restore_draft().is_none());
        assert!(session.store().get_item(FORM_KEY).is_none());
        assert!(session.store().get_item(STEP_KEY).is_none());
    }

    #[test]
    fn quota_errors_never_propagate() {
        let mut session = SessionPersistence::new(MemoryStore::with_quota(8));
        let mut form = TripFormData::new();
        form.region = "제주".to_string();
        // should log and carry on
        session.persist_draft(&form, StepId::Region);
        assert!(session.restore_draft().is_none());
    }

    #[test]
    fn plan_wins_over_draft_for_rendering() {
        let mut session = SessionPersistence::new(MemoryStore::new());
        session.persist_draft(&TripFormData::new(), StepId::Region);
        assert_eq!(session.active_view(), ActiveView::Wizard);

        let plan: TripPlan = serde_json::from_value(serde_json::json!({
            "destination": "부산",
            "duration": "3일",
            "itinerary": [],
            "total_cost": "1인당 400,000원",
            "tips": []
        }))
        .unwrap();
        session.persist_plan(&plan);
        assert_eq!(session.active_view(), ActiveView::Plan);

        session.clear_all();
        assert_eq!(session.active_view(), ActiveView::Wizard);
        assert!(session.restore_plan().is_none());
    }
}
