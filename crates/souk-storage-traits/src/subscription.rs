//! Live subscription handles
//!
//! Every `subscribe_*` method on the storage traits returns a
//! [`Subscription`]: an initial replay of the matching records followed by a
//! live, infinite tail of change events. The handle is also the disposer:
//! dropping it (or calling [`Subscription::cancel`]) detaches the underlying
//! watcher so the backend stops delivering events. A leaked handle is a
//! resource leak, not a correctness bug.

use flume::Receiver;

/// A live feed of items of type `T`.
///
/// Items can be consumed synchronously ([`Subscription::recv`],
/// [`Subscription::try_next`], [`Subscription::drain`]) or as an async
/// stream ([`Subscription::next`]). The feed ends only when the backing
/// store goes away or the subscription is cancelled.
pub struct Subscription<T> {
    receiver: Receiver<T>,
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("buffered", &self.receiver.len())
            .field("closed", &self.receiver.is_disconnected())
            .finish()
    }
}

impl<T> Subscription<T> {
    /// Wrap a channel receiver. Intended for storage implementations.
    pub fn new(receiver: Receiver<T>) -> Self {
        Self { receiver }
    }

    /// Wait asynchronously for the next item.
    ///
    /// Returns `None` once the feed is closed and fully drained.
    pub async fn next(&self) -> Option<T> {
        self.receiver.recv_async().await.ok()
    }

    /// Block until the next item arrives.
    ///
    /// Returns `None` once the feed is closed and fully drained.
    pub fn recv(&self) -> Option<T> {
        self.receiver.recv().ok()
    }

    /// Take the next item if one is already buffered.
    pub fn try_next(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Take every currently-buffered item without waiting.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }

    /// Whether the producing side has gone away.
    pub fn is_closed(&self) -> bool {
        self.receiver.is_disconnected()
    }

    /// Detach from the feed. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_then_live() {
        let (tx, rx) = flume::unbounded();
        tx.send(1).unwrap();
        tx.send(2).unwrap();

        let sub = Subscription::new(rx);
        assert_eq!(sub.try_next(), Some(1));

        tx.send(3).unwrap();
        assert_eq!(sub.drain(), vec![2, 3]);
        assert_eq!(sub.try_next(), None);
        assert!(!sub.is_closed());
    }

    #[test]
    fn test_closed_after_sender_drops() {
        let (tx, rx) = flume::unbounded();
        tx.send("last").unwrap();
        drop(tx);

        let sub = Subscription::new(rx);
        // Buffered items are still delivered after disconnection
        assert_eq!(sub.recv(), Some("last"));
        assert_eq!(sub.recv(), None);
        assert!(sub.is_closed());
    }

    #[test]
    fn test_cancel_disconnects_sender() {
        let (tx, rx) = flume::unbounded::<u8>();
        let sub = Subscription::new(rx);
        sub.cancel();
        assert!(tx.send(1).is_err());
    }
}
