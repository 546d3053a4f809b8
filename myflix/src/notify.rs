//! Last-value broadcast of the current user record.
//!
//! Backed by a `tokio::sync::watch` channel: every subscriber sees the most
//! recent value on its first `borrow()`, and is woken on each publish.

use tokio::sync::watch;
use tracing::debug;

use crate::models::UserRecord;

/// Shared slot holding the last published user.
#[derive(Debug)]
pub struct UserNotifier {
    tx: watch::Sender<Option<UserRecord>>,
}

impl Default for UserNotifier {
    fn default() -> Self {
        Self::new(None)
    }
}

impl UserNotifier {
    pub fn new(initial: Option<UserRecord>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Replace the current value and wake all subscribers.
    ///
    /// Publishing with no subscribers still updates the slot, so later
    /// subscribers receive it.
    pub fn publish(&self, user: Option<UserRecord>) {
        debug!(
            username = user.as_ref().map_or("", |u| u.username.as_str()),
            subscribers = self.tx.receiver_count(),
            "Publishing user"
        );
        self.tx.send_replace(user);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserRecord>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<UserRecord> {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserRecord {
        UserRecord {
            username: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_late_subscriber_sees_latest() {
        let notifier = UserNotifier::default();
        notifier.publish(Some(user("alice")));
        notifier.publish(Some(user("bob")));

        let rx = notifier.subscribe();
        assert_eq!(rx.borrow().as_ref().map(|u| u.username.as_str()), Some("bob"));
        assert_eq!(notifier.current(), Some(user("bob")));
    }

    #[tokio::test]
    async fn test_subscribers_are_woken() {
        let notifier = UserNotifier::new(Some(user("alice")));
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();

        notifier.publish(Some(user("carol")));

        first.changed().await.unwrap();
        second.changed().await.unwrap();
        assert_eq!(first.borrow_and_update().clone(), Some(user("carol")));
        assert_eq!(second.borrow_and_update().clone(), Some(user("carol")));
    }

    #[test]
    fn test_publish_none_clears() {
        let notifier = UserNotifier::new(Some(user("alice")));
        notifier.publish(None);
        assert_eq!(notifier.current(), None);
    }
}
