use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

type Handler = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`ChangeNotifier::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Zero-payload broadcast fired after a refresh.
///
/// Handlers run synchronously in registration order. They are invoked
/// outside the internal lock, so a handler may subscribe, unsubscribe or
/// read state. A panicking handler stops delivery to later handlers.
#[derive(Default)]
pub struct ChangeNotifier {
    handlers: Mutex<Vec<(SubscriptionId, Handler)>>,
    next_id: AtomicU64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(handler)));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|(sub, _)| *sub != id);
        handlers.len() != before
    }

    pub fn fire(&self) {
        let handlers: Vec<Handler> = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, h)| h.clone())
            .collect();

        for handler in handlers {
            handler();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_fire_in_registration_order() {
        let notifier = ChangeNotifier::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order = order.clone();
            notifier.subscribe(move || order.lock().unwrap().push(i));
        }
        notifier.fire();

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_unsubscribe() {
        let notifier = ChangeNotifier::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        let id = notifier.subscribe(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        notifier.fire();
        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.fire();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn test_handler_can_subscribe_during_fire() {
        let notifier = Arc::new(ChangeNotifier::new());
        let n = notifier.clone();
        notifier.subscribe(move || {
            n.subscribe(|| {});
        });

        notifier.fire();
        assert_eq!(notifier.subscriber_count(), 2);
    }

    #[test]
    fn test_panicking_handler_stops_delivery() {
        let notifier = ChangeNotifier::new();
        let reached = Arc::new(AtomicUsize::new(0));

        notifier.subscribe(|| panic!("handler failed"));
        let r = reached.clone();
        notifier.subscribe(move || {
            r.fetch_add(1, Ordering::SeqCst);
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| notifier.fire()));
        assert!(result.is_err());
        assert_eq!(reached.load(Ordering::SeqCst), 0);
    }
}
