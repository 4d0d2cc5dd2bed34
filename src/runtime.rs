//! Controller and simulated timeline
//!
//! The controller is the only owner of the wizard state. It runs `step`,
//! carries out storage effects best-effort and passes the rest on to the
//! presentation driver. `Timeline` stands in for `setTimeout` natively and
//! in tests.

use std::time::Duration;

use chrono::NaiveDate;

use crate::error::StorageError;
use crate::flow::{Effect, Event, WizardState, resume, step};
use crate::persistence::{KeyValueStore, RecordStore};
use crate::settings::Settings;

/// Owns the wizard and its storage
pub struct Controller<S> {
    state: WizardState,
    store: RecordStore<S>,
    settings: Settings,
    /// Set after the first storage failure; later failures log at debug
    degraded: bool,
}

impl<S: KeyValueStore> Controller<S> {
    /// Load any stored session and preferences and return the effects that
    /// render them
    pub fn start(backend: S, today: NaiveDate) -> (Self, Vec<Effect>) {
        let store = RecordStore::new(backend);
        let mut degraded = false;

        let settings = store
            .load_settings()
            .unwrap_or_else(|e| {
                log::warn!("Could not load settings: {}", e);
                None
            })
            .unwrap_or_default();

        let record = store.load().unwrap_or_else(|e| {
            log::warn!("Could not load user record: {}", e);
            degraded = matches!(e, StorageError::Unavailable(_));
            None
        });
        let draft = store.load_draft().unwrap_or_else(|e| {
            log::warn!("Could not load draft: {}", e);
            None
        });

        let (state, effects) = resume(record, draft, today);
        let mut controller = Self {
            state,
            store,
            settings,
            degraded,
        };
        let effects = controller.apply(effects);
        (controller, effects)
    }

    /// Handle one event, returning the effects left for the driver
    pub fn dispatch(&mut self, event: Event, today: NaiveDate) -> Vec<Effect> {
        let effects = step(&mut self.state, event, today);
        self.apply(effects)
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn store(&self) -> &RecordStore<S> {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply new preferences and store them (best-effort)
    pub fn set_settings(&mut self, settings: Settings) {
        if settings == self.settings {
            return;
        }
        let result = self.store.save_settings(&settings);
        self.storage_result("save settings", result);
        self.settings = settings;
    }

    /// True once a storage write has failed this session
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    fn apply(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        effects
            .into_iter()
            .filter_map(|effect| self.apply_one(effect))
            .collect()
    }

    fn apply_one(&mut self, effect: Effect) -> Option<Effect> {
        match effect {
            Effect::Persist(record) => {
                let result = self.store.save(&record);
                self.storage_result("save user record", result);
                None
            }
            Effect::PersistDraft(draft) => {
                let result = self.store.save_draft(&draft);
                self.storage_result("autosave draft", result);
                None
            }
            Effect::ClearPersisted => {
                let result = self.store.clear();
                self.storage_result("clear stored data", result);
                None
            }
            Effect::Celebrate if !self.settings.effective_celebration() => None,
            other => Some(other),
        }
    }

    fn storage_result(&mut self, what: &str, result: Result<(), StorageError>) {
        if let Err(e) = result {
            if self.degraded {
                log::debug!("Failed to {}: {}", what, e);
            } else {
                log::warn!("Failed to {}: {} (continuing in memory)", what, e);
                self.degraded = true;
            }
        }
    }
}

/// A scheduled event
#[derive(Debug, Clone)]
struct Timer {
    due: Duration,
    seq: u64,
    event: Event,
}

/// Simulated clock for `Effect::Schedule` directives
#[derive(Debug, Default)]
pub struct Timeline {
    now: Duration,
    seq: u64,
    pending: Vec<Timer>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn schedule(&mut self, after: Duration, event: Event) {
        self.seq += 1;
        self.pending.push(Timer {
            due: self.now + after,
            seq: self.seq,
            event,
        });
    }

    /// Take ownership of schedule directives, returning the other effects
    pub fn absorb(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut rest = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                Effect::Schedule { after, event } => self.schedule(after, event),
                other => rest.push(other),
            }
        }
        rest
    }

    /// Move time forward, delivering due events in order.
    ///
    /// Events scheduled while delivering are timed from their parent's due
    /// time and fire within the same call if they fall inside the window.
    pub fn advance<F>(&mut self, by: Duration, mut deliver: F) -> Vec<Effect>
    where
        F: FnMut(Event) -> Vec<Effect>,
    {
        let target = self.now + by;
        let mut out = Vec::new();

        while let Some(index) = self.next_due(target) {
            let timer = self.pending.remove(index);
            self.now = timer.due;
            let effects = deliver(timer.event);
            out.extend(self.absorb(effects));
        }

        self.now = target;
        out
    }

    fn next_due(&self, target: Duration) -> Option<usize> {
        self.pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= target)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)
    }
}
