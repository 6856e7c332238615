//! In-process publish/subscribe for pipeline events
//!
//! The registration table sits behind a lock that is only held long enough
//! to copy it. Callbacks run on the publishing task after the lock is
//! released, in registration order. A subscriber that errors or panics is
//! logged and skipped; the publisher never sees the failure.
//!
//! A subscriber removed while a publish is in flight may or may not receive
//! that event. One added mid-publish only sees later events.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{trace, warn};

use crate::domain::{EventSubscriber, PipelineEvent, SubscriberError, SubscriptionId};

#[derive(Clone)]
struct Registration {
    id: SubscriptionId,
    subscriber: Arc<dyn EventSubscriber>,
}

/// Outcome of one publish call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryReport {
    /// Subscribers the event was handed to
    pub attempted: usize,
    /// Subscribers that returned an error or panicked
    pub failed: usize,
}

impl DeliveryReport {
    pub fn delivered(&self) -> usize {
        self.attempted - self.failed
    }
}

/// Event bus owned by whoever builds the pipeline, one per process or per test
pub struct EventBus {
    registrations: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            registrations: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a subscriber owned by the bus
    pub fn subscribe<S>(&self, subscriber: S) -> SubscriptionId
    where
        S: EventSubscriber + 'static,
    {
        self.subscribe_shared(Arc::new(subscriber))
    }

    /// Register a subscriber the caller keeps a handle to
    pub fn subscribe_shared(&self, subscriber: Arc<dyn EventSubscriber>) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));

        trace!(subscription = %id, subscriber = subscriber.subscriber_name(), "Subscribing");

        self.registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Registration { id, subscriber });

        id
    }

    /// Returns false when the handle was unknown or already removed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registrations = self
            .registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = registrations.len();
        registrations.retain(|registration| registration.id != id);

        before != registrations.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drop every registration
    pub fn clear(&self) {
        self.registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Deliver an event to every subscriber registered at call time
    pub fn publish(&self, event: impl Into<PipelineEvent>) -> DeliveryReport {
        let event = event.into();
        let snapshot = self.snapshot();
        let mut report = DeliveryReport {
            attempted: snapshot.len(),
            failed: 0,
        };

        for registration in &snapshot {
            if let Err(error) = Self::deliver(registration, &event) {
                report.failed += 1;
                warn!(
                    subscription = %registration.id,
                    event_kind = event.kind(),
                    correlation_id = %event.correlation_id(),
                    error = %error,
                    "Subscriber failed, continuing delivery"
                );
            }
        }

        report
    }

    fn snapshot(&self) -> Vec<Registration> {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn deliver(registration: &Registration, event: &PipelineEvent) -> Result<(), SubscriberError> {
        let subscriber = &registration.subscriber;

        match panic::catch_unwind(AssertUnwindSafe(|| subscriber.on_event(event))) {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "subscriber panicked".to_string());

                Err(SubscriberError::new(subscriber.subscriber_name(), message))
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
