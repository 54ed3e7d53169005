//! Delivery of one notification to a scoped set of connections.
//!
//! Every recipient is handled independently: a full or closed outbox is
//! counted and skipped, the rest still receive the message.

use coderoom_common::ConnectionId;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

use crate::protocol::Notification;
use crate::registry::ConnectionRegistry;

/// Outcome of a fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,
    pub dropped: usize,
}

impl Delivery {
    pub fn merge(self, other: Delivery) -> Delivery {
        Delivery {
            delivered: self.delivered + other.delivered,
            dropped: self.dropped + other.dropped,
        }
    }
}

/// Queue `notification` for every recipient not in `exclude`, in order.
pub fn deliver(
    registry: &ConnectionRegistry,
    recipients: &[ConnectionId],
    exclude: &[ConnectionId],
    notification: &Notification,
) -> Delivery {
    let mut outcome = Delivery::default();

    for recipient in recipients.iter().filter(|r| !exclude.contains(*r)) {
        let Some(outbox) = registry.outbox(recipient) else {
            outcome.dropped += 1;
            continue;
        };
        match outbox.try_send(notification.clone()) {
            Ok(()) => outcome.delivered += 1,
            Err(TrySendError::Full(_)) => {
                debug!(connection = %recipient, "outbox full, dropping notification");
                outcome.dropped += 1;
            }
            Err(TrySendError::Closed(_)) => {
                debug!(connection = %recipient, "outbox closed, dropping notification");
                outcome.dropped += 1;
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn ping() -> Notification {
        Notification::TypingNotice { user: "alice".into() }
    }

    #[test]
    fn excludes_sender() {
        let mut registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        let a = ConnectionId::from("a");
        let b = ConnectionId::from("b");
        registry.register(a.clone(), tx_a).unwrap();
        registry.register(b.clone(), tx_b).unwrap();

        let outcome = deliver(&registry, &[a.clone(), b], std::slice::from_ref(&a), &ping());
        assert_eq!(outcome, Delivery { delivered: 1, dropped: 0 });
        assert!(rx_a.try_recv().is_err());
        assert_eq!(rx_b.try_recv().unwrap(), ping());
    }

    #[test]
    fn full_outbox_does_not_block_other_peers() {
        let mut registry = ConnectionRegistry::new();
        let (tx_slow, _rx_slow) = mpsc::channel(1);
        let (tx_fast, mut rx_fast) = mpsc::channel(4);
        let slow = ConnectionId::from("slow");
        let fast = ConnectionId::from("fast");
        registry.register(slow.clone(), tx_slow).unwrap();
        registry.register(fast.clone(), tx_fast).unwrap();

        let recipients = [slow, fast];
        let first = deliver(&registry, &recipients, &[], &ping());
        let second = deliver(&registry, &recipients, &[], &ping());

        assert_eq!(first, Delivery { delivered: 2, dropped: 0 });
        assert_eq!(second, Delivery { delivered: 1, dropped: 1 });
        assert!(rx_fast.try_recv().is_ok());
        assert!(rx_fast.try_recv().is_ok());
    }

    #[test]
    fn closed_and_unknown_recipients_count_as_dropped() {
        let mut registry = ConnectionRegistry::new();
        let (tx_closed, rx_closed) = mpsc::channel(4);
        drop(rx_closed);
        let closed = ConnectionId::from("closed");
        registry.register(closed.clone(), tx_closed).unwrap();

        let outcome = deliver(&registry, &[closed, ConnectionId::from("ghost")], &[], &ping());
        assert_eq!(outcome, Delivery { delivered: 0, dropped: 2 });
    }

    #[test]
    fn merge_adds_counts() {
        let a = Delivery { delivered: 2, dropped: 1 };
        let b = Delivery { delivered: 1, dropped: 0 };
        assert_eq!(a.merge(b), Delivery { delivered: 3, dropped: 1 });
    }
}
