//! Panel event bus
//!
//! Publish/subscribe channel between the control core and whatever renders
//! it. The core never reads presentation state; views never poke into the
//! core. Views subscribe and redraw from the payload.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use swapper3d_core::event_bus::{EventBus, EventCategory, EventFilter, PanelEvent};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::only(EventCategory::State),
//!     |event| {
//!         if let PanelEvent::StateChanged(state) = event {
//!             println!("now {}", state.connection_label());
//!         }
//!     },
//! );
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::{EventBus, EventBusConfig, EventFilter, SubscriptionId};
pub use events::{EventCategory, PanelEvent};
