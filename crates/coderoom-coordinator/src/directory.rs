//! Session directory: members of each live session plus the cached state a
//! late joiner needs.
//!
//! Membership is keyed by connection, not by display name, so two
//! participants sharing a name stay distinct. Sessions exist only while they
//! have at least one member.

use std::collections::HashMap;

use coderoom_common::{ConnectionId, SessionId};

/// Display names of a session's members, in join order.
pub type Roster = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub connection_id: ConnectionId,
    pub display_name: String,
}

/// Latest content and language seen in a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastKnown {
    pub content: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Default)]
struct Session {
    members: Vec<Member>,
    last_known: LastKnown,
}

impl Session {
    fn roster(&self) -> Roster {
        self.members.iter().map(|m| m.display_name.clone()).collect()
    }
}

#[derive(Debug, Default)]
pub struct SessionDirectory {
    sessions: HashMap<SessionId, Session>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session's roster, creating an empty session if absent.
    pub fn ensure_session(&mut self, session_id: &SessionId) -> Roster {
        self.sessions
            .entry(session_id.clone())
            .or_default()
            .roster()
    }

    /// Insert a member, creating the session on first use.
    ///
    /// A connection already in the session keeps its position; only its
    /// display name is updated.
    pub fn add_member(
        &mut self,
        session_id: &SessionId,
        connection_id: ConnectionId,
        display_name: String,
    ) -> Roster {
        let session = self.sessions.entry(session_id.clone()).or_default();
        match session
            .members
            .iter_mut()
            .find(|m| m.connection_id == connection_id)
        {
            Some(existing) => existing.display_name = display_name,
            None => session.members.push(Member {
                connection_id,
                display_name,
            }),
        }
        session.roster()
    }

    /// Remove a member. The session, cache included, is deleted once empty.
    pub fn remove_member(&mut self, session_id: &SessionId, connection_id: &ConnectionId) -> Roster {
        let Some(session) = self.sessions.get_mut(session_id) else {
            return Roster::new();
        };
        session.members.retain(|m| &m.connection_id != connection_id);
        if session.members.is_empty() {
            self.sessions.remove(session_id);
            return Roster::new();
        }
        session.roster()
    }

    /// Roster snapshot, empty if the session does not exist.
    pub fn members(&self, session_id: &SessionId) -> Roster {
        self.sessions
            .get(session_id)
            .map(Session::roster)
            .unwrap_or_default()
    }

    /// Connections currently in the session, in join order.
    pub fn member_connections(&self, session_id: &SessionId) -> Vec<ConnectionId> {
        self.sessions
            .get(session_id)
            .map(|s| s.members.iter().map(|m| m.connection_id.clone()).collect())
            .unwrap_or_default()
    }

    /// Cache content for late joiners. Returns `false` if the session is gone.
    pub fn set_last_known_content(&mut self, session_id: &SessionId, content: String) -> bool {
        match self.sessions.get_mut(session_id) {
            Some(session) => {
                session.last_known.content = Some(content);
                true
            }
            None => false,
        }
    }

    /// Cache language for late joiners. Returns `false` if the session is gone.
    pub fn set_last_known_language(&mut self, session_id: &SessionId, language: String) -> bool {
        match self.sessions.get_mut(session_id) {
            Some(session) => {
                session.last_known.language = Some(language);
                true
            }
            None => false,
        }
    }

    pub fn last_known(&self, session_id: &SessionId) -> Option<&LastKnown> {
        self.sessions.get(session_id).map(|s| &s.last_known)
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
