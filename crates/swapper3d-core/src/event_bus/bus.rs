//! Per-session event bus
//!
//! Handlers run synchronously on the publishing call, in subscription
//! order, after the subscriber list lock has been released, so a handler
//! may itself subscribe or publish. Async consumers take a broadcast
//! receiver instead.

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{EventCategory, PanelEvent};

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = self.0.simple().to_string();
        write!(f, "sub-{}", &id[..8])
    }
}

/// Which events a handler wants
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EventFilter {
    #[default]
    All,
    /// Any of these categories
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn only(category: EventCategory) -> Self {
        EventFilter::Categories(vec![category])
    }

    pub fn matches(&self, event: &PanelEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type Handler = Arc<dyn Fn(PanelEvent) + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    filter: EventFilter,
    handler: Handler,
}

#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Broadcast buffer for async receivers; slow receivers lag past this
    pub channel_capacity: usize,
    /// Keep the last N events for inspection; `None` keeps nothing
    pub history_limit: Option<usize>,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            history_limit: None,
        }
    }
}

/// Publish/subscribe hub for one panel session
pub struct EventBus {
    sender: broadcast::Sender<PanelEvent>,
    subscriptions: RwLock<Vec<Subscription>>,
    history: Mutex<VecDeque<PanelEvent>>,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            subscriptions: RwLock::new(Vec::new()),
            history: Mutex::new(VecDeque::new()),
            config,
        }
    }

    /// Deliver `event` to every matching handler and async receiver
    ///
    /// Returns how many handlers and receivers it reached.
    pub fn publish(&self, event: PanelEvent) -> usize {
        self.record(&event);

        let targets: Vec<Handler> = self
            .subscriptions
            .read()
            .iter()
            .filter(|s| s.filter.matches(&event))
            .map(|s| s.handler.clone())
            .collect();

        let receivers = self.sender.send(event.clone()).unwrap_or(0);
        if targets.is_empty() && receivers == 0 {
            tracing::trace!(event = %event.description(), "event had no listeners");
        }
        for handler in &targets {
            handler(event.clone());
        }
        targets.len() + receivers
    }

    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(PanelEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::fresh();
        self.subscriptions.write().push(Subscription {
            id,
            filter,
            handler: Arc::new(handler),
        });
        tracing::debug!(subscription = %id, "subscribed");
        id
    }

    /// Receiver for consuming events from an async task
    pub fn receiver(&self) -> broadcast::Receiver<PanelEvent> {
        self.sender.subscribe()
    }

    /// Returns whether `id` was subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        let removed = subscriptions.len() != before;
        if removed {
            tracing::debug!(subscription = %id, "unsubscribed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Retained events, oldest first
    pub fn history(&self) -> Vec<PanelEvent> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    fn record(&self, event: &PanelEvent) {
        let Some(limit) = self.config.history_limit else {
            return;
        };
        let mut history = self.history.lock();
        history.push_back(event.clone());
        while history.len() > limit {
            history.pop_front();
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}
