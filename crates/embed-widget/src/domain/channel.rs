//! Subscriber registry for the page-wide message channel.
//!
//! There is exactly one channel per host page, and it is shared by every
//! mounted embed.  A message posted on it is offered to every subscriber;
//! the channel knows nothing about which embed a message was meant for.
//! Partitioning is left to each subscriber's own filtering.
//!
//! The registry hands out a [`SubscriptionId`] per subscription so that the
//! subscriber can later remove exactly that entry, and nothing else.

use super::events::InstanceId;

/// Handle for one live subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The page-wide message channel's subscriber list.
#[derive(Debug, Default)]
pub struct MessageChannel {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, InstanceId)>,
}

impl MessageChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscription for `instance` and returns its handle.
    ///
    /// The registry itself does not deduplicate; keeping one subscription per
    /// instance is the subscriber's job (see `MessageBridge::attach`).
    pub fn subscribe(&mut self, instance: InstanceId) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push((id, instance));
        id
    }

    /// Removes a subscription.  Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.subscribers.iter().any(|(sub, _)| *sub == id)
    }

    /// Snapshot of the subscribed instances, in subscription order.
    ///
    /// A snapshot rather than an iterator so a handler may unsubscribe while
    /// a message is being delivered.
    pub fn subscribers(&self) -> Vec<InstanceId> {
        self.subscribers.iter().map(|(_, instance)| *instance).collect()
    }

    /// Number of live subscriptions held by `instance`.
    pub fn subscription_count(&self, instance: InstanceId) -> usize {
        self.subscribers.iter().filter(|(_, i)| *i == instance).count()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_then_unsubscribe() {
        // Arrange
        let mut channel = MessageChannel::new();
        let instance = InstanceId::new();

        // Act
        let sub = channel.subscribe(instance);

        // Assert
        assert!(channel.is_subscribed(sub));
        assert_eq!(channel.subscribers(), vec![instance]);
        assert!(channel.unsubscribe(sub));
        assert!(channel.is_empty());
    }

    #[test]
    fn test_unsubscribe_unknown_id_is_false() {
        let mut channel = MessageChannel::new();
        let sub = channel.subscribe(InstanceId::new());
        assert!(channel.unsubscribe(sub));
        assert!(!channel.unsubscribe(sub));
    }

    #[test]
    fn test_unsubscribe_removes_only_that_entry() {
        let mut channel = MessageChannel::new();
        let a = InstanceId::new();
        let b = InstanceId::new();
        let sub_a = channel.subscribe(a);
        let _sub_b = channel.subscribe(b);

        channel.unsubscribe(sub_a);

        assert_eq!(channel.subscribers(), vec![b]);
        assert_eq!(channel.subscription_count(a), 0);
        assert_eq!(channel.subscription_count(b), 1);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut channel = MessageChannel::new();
        let instance = InstanceId::new();
        let first = channel.subscribe(instance);
        channel.unsubscribe(first);
        let second = channel.subscribe(instance);
        assert_ne!(first, second);
    }
}
