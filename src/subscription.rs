use tokio::sync::mpsc;
use tracing::debug;

/// A live, cancelable registration with a publisher.
///
/// Events are buffered in an unbounded channel until [`Subscription::recv`]
/// picks them up. Cancelling (explicitly or by dropping) closes the channel,
/// so nothing published afterwards can reach the holder, and the publisher
/// prunes the registration on its next publish.
#[derive(Debug)]
pub struct Subscription<T> {
    label: String,
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    pub fn new(label: impl Into<String>, rx: mpsc::UnboundedReceiver<T>) -> Self {
        let label = label.into();
        debug!(subscription = %label, "subscription registered");
        Self { label, rx }
    }

    /// Returns `None` once the publisher has gone away.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.rx.close();
        debug!(subscription = %self.label, "subscription cancelled");
    }
}

struct Watcher<T> {
    key: String,
    tx: mpsc::UnboundedSender<T>,
}

/// Publisher-side registry of subscriptions, each tagged with a key
/// (the owner id for entry queries).
pub struct Watchers<T> {
    watchers: Vec<Watcher<T>>,
}

impl<T> Default for Watchers<T> {
    fn default() -> Self {
        Self { watchers: Vec::new() }
    }
}

impl<T: Clone> Watchers<T> {
    pub fn register(&mut self, key: &str, label: impl Into<String>) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.watchers.push(Watcher {
            key: key.to_string(),
            tx,
        });
        Subscription::new(label, rx)
    }

    /// Registers and hands `initial` to the new subscription only.
    pub fn register_with(
        &mut self,
        key: &str,
        label: impl Into<String>,
        initial: T,
    ) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        // The receiver is alive until this function returns.
        let _ = tx.send(initial);
        self.watchers.push(Watcher {
            key: key.to_string(),
            tx,
        });
        Subscription::new(label, rx)
    }

    /// Sends `event` to every live registration under `key`.
    pub fn publish(&mut self, key: &str, event: T) {
        self.prune();
        for watcher in self.watchers.iter().filter(|w| w.key == key) {
            // A receiver closed since prune() is simply skipped.
            let _ = watcher.tx.send(event.clone());
        }
    }

    pub fn broadcast(&mut self, event: T) {
        self.prune();
        for watcher in &self.watchers {
            let _ = watcher.tx.send(event.clone());
        }
    }

    pub fn active(&self, key: &str) -> usize {
        self.watchers
            .iter()
            .filter(|w| w.key == key && !w.tx.is_closed())
            .count()
    }

    fn prune(&mut self) {
        self.watchers.retain(|w| !w.tx.is_closed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_only_matching_key() {
        let mut watchers = Watchers::default();
        let mut alice = watchers.register("alice", "entries:alice");
        let mut bob = watchers.register("bob", "entries:bob");

        watchers.publish("alice", 1);
        watchers.publish("bob", 2);

        assert_eq!(alice.recv().await, Some(1));
        assert_eq!(bob.recv().await, Some(2));
    }

    #[tokio::test]
    async fn cancelled_subscription_is_pruned() {
        let mut watchers = Watchers::default();
        let sub = watchers.register("alice", "entries:alice");
        let _other = watchers.register("alice", "entries:alice");
        assert_eq!(watchers.active("alice"), 2);

        sub.cancel();
        assert_eq!(watchers.active("alice"), 1);

        watchers.publish("alice", 7);
        assert_eq!(watchers.watchers.len(), 1);
    }

    #[tokio::test]
    async fn initial_event_goes_to_new_subscription_only() {
        let mut watchers = Watchers::default();
        let mut first = watchers.register_with("alice", "entries:alice", 1);
        let mut second = watchers.register_with("alice", "entries:alice", 2);
        watchers.publish("alice", 3);

        assert_eq!(first.recv().await, Some(1));
        assert_eq!(first.recv().await, Some(3));
        assert_eq!(second.recv().await, Some(2));
        assert_eq!(second.recv().await, Some(3));
    }

    #[tokio::test]
    async fn recv_ends_when_publisher_is_dropped() {
        let mut watchers = Watchers::default();
        let mut sub = watchers.register("", "identity");
        watchers.broadcast("hello");
        drop(watchers);

        assert_eq!(sub.recv().await, Some("hello"));
        assert_eq!(sub.recv().await, None);
        assert_eq!(sub.label(), "identity");
    }
}
