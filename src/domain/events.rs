//! Event subscriber contract

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::PipelineEvent;

/// Failure raised inside a subscriber. Caught by the bus, never seen by the
/// publisher.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Subscriber '{subscriber}' failed: {message}")]
pub struct SubscriberError {
    pub subscriber: String,
    pub message: String,
}

impl SubscriberError {
    pub fn new(subscriber: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subscriber: subscriber.into(),
            message: message.into(),
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Anything that wants to observe pipeline events.
///
/// Callbacks run synchronously on the publishing task, so they should be
/// quick and must not block.
pub trait EventSubscriber: Send + Sync {
    fn on_event(&self, event: &PipelineEvent) -> Result<(), SubscriberError>;

    fn subscriber_name(&self) -> &str {
        "anonymous"
    }
}

impl<F> EventSubscriber for F
where
    F: Fn(&PipelineEvent) -> Result<(), SubscriberError> + Send + Sync,
{
    fn on_event(&self, event: &PipelineEvent) -> Result<(), SubscriberError> {
        self(event)
    }
}
