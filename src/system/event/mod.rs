//! Click notification fan-out
//!
//! Redirects publish a [`ClickEvent`] on the [`NotificationBus`]; every live
//! [`Subscription`] (one per `/api/events` connection) receives it.

mod bus;
mod events;

pub use bus::{NotificationBus, Subscription};
pub use events::ClickEvent;
