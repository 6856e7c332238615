//! Event bus and built-in subscribers

mod bus;
mod subscribers;

pub use bus::{DeliveryReport, EventBus};
pub use subscribers::{CollectingSubscriber, MetricsSubscriber, TracingSubscriber};
