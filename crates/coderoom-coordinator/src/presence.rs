//! Join, switch, leave and disconnect transitions.
//!
//! Per connection: `Unjoined -> Joined(s) -> Unjoined`, or
//! `Joined(a) -> Joined(b)` as a leave of `a` followed by a join of `b`
//! inside the same critical section. The registry and the directory are
//! only ever written together here.

use coderoom_common::{ConnectionId, CoordinatorError, SessionId};
use tracing::{debug, info, warn};

use crate::coordinator::{Coordinator, State};
use crate::directory::Roster;
use crate::protocol::Notification;
use crate::registry::Outbox;
use crate::relay::{announce_roster, bootstrap_joiner};

impl Coordinator {
    /// Register a new transport link and greet it with its connection id.
    pub async fn connect(
        &self,
        connection_id: ConnectionId,
        outbox: Outbox,
    ) -> Result<(), CoordinatorError> {
        let mut state = self.state.lock().await;
        let greeting = Notification::Connected {
            connection_id: connection_id.clone(),
        };
        state.registry.register(connection_id.clone(), outbox.clone())?;
        if outbox.try_send(greeting).is_err() {
            debug!(connection = %connection_id, "could not queue greeting");
        }
        debug!(connection = %connection_id, "connection registered");
        Ok(())
    }

    /// Join `session_id` as `display_name`, leaving any other session first.
    ///
    /// On success every member, the joiner included, receives the new roster.
    /// On failure nothing has changed and the caller may retry.
    pub async fn join(
        &self,
        connection_id: &ConnectionId,
        session_id: SessionId,
        display_name: String,
    ) -> Result<Roster, CoordinatorError> {
        self.check_join(&session_id, &display_name)?;

        let mut state = self.state.lock().await;
        if !state.registry.contains(connection_id) {
            return Err(CoordinatorError::UnknownConnection(connection_id.clone()));
        }

        let switching = state
            .registry
            .current_session(connection_id)
            .is_some_and(|m| m.session_id != session_id);
        if switching {
            leave_locked(&mut state, connection_id);
        }

        state.directory.ensure_session(&session_id);
        let roster =
            state
                .directory
                .add_member(&session_id, connection_id.clone(), display_name.clone());
        state
            .registry
            .set_session(connection_id, session_id.clone(), display_name.clone())?;

        info!(
            connection = %connection_id,
            session = %session_id,
            name = %display_name,
            members = roster.len(),
            "joined session"
        );

        announce_roster(&state, &session_id, roster.clone());
        if self.options.bootstrap_late_joiners {
            bootstrap_joiner(&state, connection_id, &session_id);
        }

        Ok(roster)
    }

    /// Leave the current session. Returns the session left and its remaining
    /// roster, or `None` if the connection held no session.
    pub async fn leave(&self, connection_id: &ConnectionId) -> Option<(SessionId, Roster)> {
        let mut state = self.state.lock().await;
        leave_locked(&mut state, connection_id)
    }

    /// Leave, then forget the connection. Safe to call more than once.
    pub async fn disconnect(&self, connection_id: &ConnectionId) -> Result<(), CoordinatorError> {
        let mut state = self.state.lock().await;
        leave_locked(&mut state, connection_id);
        if state.registry.unregister(connection_id)? {
            debug!(connection = %connection_id, "connection unregistered");
        }
        Ok(())
    }

    fn check_join(&self, session_id: &SessionId, display_name: &str) -> Result<(), CoordinatorError> {
        if session_id.as_str().trim().is_empty() {
            return Err(CoordinatorError::InvalidJoin("room id is empty".into()));
        }
        if display_name.trim().is_empty() {
            return Err(CoordinatorError::InvalidJoin("user name is empty".into()));
        }
        if session_id.len() > self.options.max_session_id_len {
            return Err(CoordinatorError::InvalidJoin(format!(
                "room id longer than {} bytes",
                self.options.max_session_id_len
            )));
        }
        if display_name.len() > self.options.max_display_name_len {
            return Err(CoordinatorError::InvalidJoin(format!(
                "user name longer than {} bytes",
                self.options.max_display_name_len
            )));
        }
        Ok(())
    }
}

/// Leave sequence run with the lock already held.
pub(crate) fn leave_locked(
    state: &mut State,
    connection_id: &ConnectionId,
) -> Option<(SessionId, Roster)> {
    let membership = state.registry.clear_session(connection_id)?;
    let session_id = membership.session_id;
    let roster = state.directory.remove_member(&session_id, connection_id);

    if roster.is_empty() {
        info!(
            connection = %connection_id,
            session = %session_id,
            "last member left, session closed"
        );
    } else {
        info!(
            connection = %connection_id,
            session = %session_id,
            members = roster.len(),
            "left session"
        );
        let delivery = announce_roster(state, &session_id, roster.clone());
        if delivery.dropped > 0 {
            warn!(
                session = %session_id,
                dropped = delivery.dropped,
                "roster update not delivered to every member"
            );
        }
    }

    Some((session_id, roster))
}
