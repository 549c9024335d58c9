//! Auth-state observation as a cancellable stream.
//!
//! Backends own an [`AuthStateNotifier`] and publish every sign-in and
//! sign-out. Observers hold an [`AuthSubscription`]; dropping it or calling
//! [`AuthSubscription::unsubscribe`] ends the stream.

use std::pin::Pin;

use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::AuthUser;

/// Boxed stream of auth states (`None` = signed out).
pub type AuthStateStream = Pin<Box<dyn Stream<Item = Option<AuthUser>> + Send>>;

/// Publishing side of the auth state.
#[derive(Debug)]
pub struct AuthStateNotifier {
    tx: watch::Sender<Option<AuthUser>>,
}

impl AuthStateNotifier {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Replace the current state and wake every subscriber.
    pub fn publish(&self, state: Option<AuthUser>) {
        self.tx.send_replace(state);
    }

    pub fn current(&self) -> Option<AuthUser> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> AuthSubscription {
        let cancel = CancellationToken::new();
        AuthSubscription {
            rx: self.tx.subscribe(),
            guard: cancel.clone().drop_guard(),
            cancel,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for AuthStateNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// A live registration for auth-state changes.
///
/// The stream yields the state at subscription time first, then the latest
/// state after each change. Rapid successive changes may be coalesced.
pub struct AuthSubscription {
    rx: watch::Receiver<Option<AuthUser>>,
    cancel: CancellationToken,
    guard: DropGuard,
}

impl AuthSubscription {
    /// Stop delivery. The stream ends at its next poll.
    pub fn unsubscribe(&self) {
        self.cancel.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// A handle that can unsubscribe after the subscription has been
    /// turned into a stream.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Convert into a stream of states. Dropping the stream unsubscribes.
    pub fn into_stream(self) -> AuthStateStream {
        let Self { rx, cancel, guard } = self;
        Box::pin(async_stream::stream! {
            let _guard = guard;
            let states = WatchStream::new(rx).take_until(cancel.cancelled_owned());
            let mut states = std::pin::pin!(states);
            while let Some(state) = states.next().await {
                yield state;
            }
        })
    }
}

impl std::fmt::Debug for AuthSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSubscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserId;

    fn user(uid: &str) -> AuthUser {
        AuthUser {
            uid: UserId::new(uid),
            email: format!("{uid}@example.com"),
        }
    }

    #[tokio::test]
    async fn first_item_is_current_state() {
        let notifier = AuthStateNotifier::new();
        notifier.publish(Some(user("a")));

        let mut stream = notifier.subscribe().into_stream();
        assert_eq!(stream.next().await, Some(Some(user("a"))));
    }

    #[tokio::test]
    async fn changes_are_delivered_in_order() {
        let notifier = AuthStateNotifier::new();
        let mut stream = notifier.subscribe().into_stream();
        assert_eq!(stream.next().await, Some(None));

        notifier.publish(Some(user("a")));
        assert_eq!(stream.next().await, Some(Some(user("a"))));

        notifier.publish(None);
        assert_eq!(stream.next().await, Some(None));
    }

    #[tokio::test]
    async fn unsubscribe_ends_stream() {
        let notifier = AuthStateNotifier::new();
        let subscription = notifier.subscribe();
        let handle = subscription.cancel_handle();
        let mut stream = subscription.into_stream();
        assert_eq!(stream.next().await, Some(None));

        handle.cancel();
        notifier.publish(Some(user("a")));
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn unsubscribe_before_streaming() {
        let notifier = AuthStateNotifier::new();
        let subscription = notifier.subscribe();
        assert!(subscription.is_active());
        subscription.unsubscribe();
        assert!(!subscription.is_active());
    }

    #[tokio::test]
    async fn dropping_stream_releases_receiver() {
        let notifier = AuthStateNotifier::new();
        let stream = notifier.subscribe().into_stream();
        assert_eq!(notifier.subscriber_count(), 1);
        drop(stream);
        assert_eq!(notifier.subscriber_count(), 0);
    }
}
