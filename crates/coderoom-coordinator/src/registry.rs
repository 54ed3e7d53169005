//! Connection registry: which session, if any, each live connection holds.

use std::collections::HashMap;

use coderoom_common::{ConnectionId, CoordinatorError, SessionId};
use tokio::sync::mpsc;

use crate::protocol::Notification;

/// Bounded queue feeding one connection's socket writer.
pub type Outbox = mpsc::Sender<Notification>;

/// The session a connection currently belongs to, and the name it joined with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub session_id: SessionId,
    pub display_name: String,
}

struct ConnectionEntry {
    outbox: Outbox,
    membership: Option<Membership>,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection with no membership.
    pub fn register(&mut self, id: ConnectionId, outbox: Outbox) -> Result<(), CoordinatorError> {
        if self.connections.contains_key(&id) {
            return Err(CoordinatorError::DuplicateConnection(id));
        }
        self.connections.insert(
            id,
            ConnectionEntry {
                outbox,
                membership: None,
            },
        );
        Ok(())
    }

    pub fn current_session(&self, id: &ConnectionId) -> Option<&Membership> {
        self.connections.get(id)?.membership.as_ref()
    }

    /// Overwrite the membership record. Only called inside a join transition.
    pub fn set_session(
        &mut self,
        id: &ConnectionId,
        session_id: SessionId,
        display_name: String,
    ) -> Result<(), CoordinatorError> {
        let entry = self
            .connections
            .get_mut(id)
            .ok_or_else(|| CoordinatorError::UnknownConnection(id.clone()))?;
        entry.membership = Some(Membership {
            session_id,
            display_name,
        });
        Ok(())
    }

    /// Reset membership to none, returning what was there.
    pub fn clear_session(&mut self, id: &ConnectionId) -> Option<Membership> {
        self.connections.get_mut(id)?.membership.take()
    }

    /// Remove the connection. Returns `Ok(false)` if it was not registered.
    ///
    /// The membership must have been cleared first.
    pub fn unregister(&mut self, id: &ConnectionId) -> Result<bool, CoordinatorError> {
        match self.connections.get(id) {
            None => Ok(false),
            Some(entry) if entry.membership.is_some() => {
                Err(CoordinatorError::DanglingMembership(id.clone()))
            }
            Some(_) => {
                self.connections.remove(id);
                Ok(true)
            }
        }
    }

    /// Drop the connection unconditionally, returning any membership it still
    /// held so the caller can repair the session directory.
    pub(crate) fn evict(&mut self, id: &ConnectionId) -> Option<Membership> {
        self.connections.remove(id)?.membership
    }

    pub fn outbox(&self, id: &ConnectionId) -> Option<&Outbox> {
        self.connections.get(id).map(|entry| &entry.outbox)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Number of connections currently holding a membership.
    pub fn joined_count(&self) -> usize {
        self.connections
            .values()
            .filter(|entry| entry.membership.is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outbox() -> Outbox {
        mpsc::channel(4).0
    }

    #[test]
    fn register_starts_without_session() {
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::from("c1");
        registry.register(id.clone(), outbox()).unwrap();

        assert!(registry.contains(&id));
        assert!(registry.current_session(&id).is_none());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.joined_count(), 0);
    }

    #[test]
    fn duplicate_register_fails() {
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::from("c1");
        registry.register(id.clone(), outbox()).unwrap();

        let err = registry.register(id.clone(), outbox()).unwrap_err();
        assert_eq!(err, CoordinatorError::DuplicateConnection(id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn clear_session_returns_previous_membership() {
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::from("c1");
        registry.register(id.clone(), outbox()).unwrap();
        registry
            .set_session(&id, SessionId::from("R1"), "alice".into())
            .unwrap();

        let previous = registry.clear_session(&id).unwrap();
        assert_eq!(previous.session_id, SessionId::from("R1"));
        assert_eq!(previous.display_name, "alice");
        assert!(registry.current_session(&id).is_none());
        assert!(registry.clear_session(&id).is_none());
    }

    #[test]
    fn set_session_on_unknown_connection_fails() {
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::from("ghost");
        let err = registry
            .set_session(&id, SessionId::from("R1"), "alice".into())
            .unwrap_err();
        assert_eq!(err, CoordinatorError::UnknownConnection(id));
    }

    #[test]
    fn unregister_with_membership_is_dangling() {
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::from("c1");
        registry.register(id.clone(), outbox()).unwrap();
        registry
            .set_session(&id, SessionId::from("R1"), "alice".into())
            .unwrap();

        let err = registry.unregister(&id).unwrap_err();
        assert_eq!(err, CoordinatorError::DanglingMembership(id.clone()));
        assert!(registry.contains(&id));

        registry.clear_session(&id);
        assert!(registry.unregister(&id).unwrap());
        assert!(!registry.contains(&id));
    }

    #[test]
    fn unregister_unknown_is_noop() {
        let mut registry = ConnectionRegistry::new();
        assert!(!registry.unregister(&ConnectionId::from("ghost")).unwrap());
    }

    #[test]
    fn evict_returns_leftover_membership() {
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::from("c1");
        registry.register(id.clone(), outbox()).unwrap();
        registry
            .set_session(&id, SessionId::from("R1"), "alice".into())
            .unwrap();

        let leftover = registry.evict(&id).unwrap();
        assert_eq!(leftover.session_id, SessionId::from("R1"));
        assert!(registry.is_empty());
    }
}
