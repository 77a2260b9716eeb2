//! Observable session state
//!
//! The store is the only place `PanelState` is mutated. Each effective
//! mutation bumps the revision and publishes the new snapshot on the bus, so
//! a view that renders the highest revision it has seen can never show a
//! value older than the last applied event.

use std::sync::Arc;

use crate::data::PanelState;
use crate::event_bus::{EventBus, EventCategory, EventFilter, PanelEvent, SubscriptionId};
use crate::types::{thread_safe_rw, ThreadSafeRw};

/// Owner of the session's [`PanelState`]
pub struct StateStore {
    state: ThreadSafeRw<PanelState>,
    bus: Arc<EventBus>,
}

impl StateStore {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            state: thread_safe_rw(PanelState::default()),
            bus,
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> PanelState {
        self.state.read().clone()
    }

    /// Read a projection of the current state without cloning all of it
    pub fn read<R>(&self, f: impl FnOnce(&PanelState) -> R) -> R {
        f(&self.state.read())
    }

    pub fn revision(&self) -> u64 {
        self.state.read().revision
    }

    /// Apply a mutation
    ///
    /// Returns the new snapshot if anything changed, `None` if the mutation
    /// was a no-op. No-ops neither bump the revision nor publish.
    pub fn update(&self, f: impl FnOnce(&mut PanelState)) -> Option<PanelState> {
        let snapshot = {
            let mut state = self.state.write();
            let before = state.clone();
            f(&mut state);
            state.revision = before.revision;
            if *state == before {
                return None;
            }
            state.revision += 1;
            state.clone()
        };

        tracing::trace!(revision = snapshot.revision, "state updated");
        self.bus.publish(PanelEvent::StateChanged(snapshot.clone()));
        Some(snapshot)
    }

    /// Call `observer` with every new snapshot
    pub fn observe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(PanelState) + Send + Sync + 'static,
    {
        self.bus.subscribe(
            EventFilter::Categories(vec![EventCategory::State]),
            move |event| {
                if let PanelEvent::StateChanged(state) = event {
                    observer(state);
                }
            },
        )
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &*self.state.read())
            .finish()
    }
}
