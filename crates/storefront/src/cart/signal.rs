//! The "cart changed" signal and its observer list.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::trace;

use super::service::Command;

/// Something that wants to know when the cart may have changed.
///
/// The signal carries no payload; observers re-read the cart themselves.
/// Callbacks run on the cart service task and must not block.
pub trait CartObserver: Send + Sync {
    fn cart_changed(&self);
}

/// Identifies one registration in the observer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Observers in registration order.
#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Arc<dyn CartObserver>)>,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, observer: Arc<dyn CartObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        before != self.entries.len()
    }

    /// Signal every observer, oldest registration first.
    pub(crate) fn notify(&self) {
        trace!(observers = self.entries.len(), "Notifying cart observers");
        for (_, observer) in &self.entries {
            observer.cart_changed();
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Guard for an observer registration.
///
/// Dropping it deregisters the observer; no further signals are delivered
/// once the cart service has processed the removal.
#[must_use = "dropping a Subscription immediately deregisters the observer"]
pub struct Subscription {
    id: SubscriptionId,
    commands: mpsc::UnboundedSender<Command>,
}

impl Subscription {
    pub(crate) const fn new(id: SubscriptionId, commands: mpsc::UnboundedSender<Command>) -> Self {
        Self { id, commands }
    }

    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // The service may already be gone, in which case there is nothing to remove.
        let _ = self.commands.send(Command::Unsubscribe { id: self.id });
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl CartObserver for Recorder {
        fn cart_changed(&self) {
            self.log.lock().push(self.name);
        }
    }

    #[test]
    fn test_notify_in_insertion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut observers = Observers::default();
        for name in ["badge", "drawer", "stepper"] {
            observers.subscribe(Arc::new(Recorder {
                name,
                log: log.clone(),
            }));
        }

        observers.notify();
        assert_eq!(*log.lock(), vec!["badge", "drawer", "stepper"]);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_observer() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut observers = Observers::default();
        let first = observers.subscribe(Arc::new(Recorder {
            name: "first",
            log: log.clone(),
        }));
        observers.subscribe(Arc::new(Recorder {
            name: "second",
            log: log.clone(),
        }));

        assert!(observers.unsubscribe(first));
        assert!(!observers.unsubscribe(first));
        assert_eq!(observers.len(), 1);

        observers.notify();
        assert_eq!(*log.lock(), vec!["second"]);
    }
}
