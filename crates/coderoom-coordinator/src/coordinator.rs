//! The coordinator handle: one critical section guarding the connection
//! registry and the session directory.
//!
//! Every public operation takes the lock for its whole transition, so no two
//! joins, leaves or relays interleave their reads and writes. Delivery only
//! hands notifications to bounded outboxes and never waits on a socket.

use std::sync::Arc;

use coderoom_common::{ConnectionId, CoordinatorError, SessionId};
use tokio::sync::Mutex;
use tracing::warn;

use crate::directory::{LastKnown, Roster, SessionDirectory};
use crate::protocol::ClientEvent;
use crate::registry::{ConnectionRegistry, Membership};

/// Behavior knobs, usually built from the `[sessions]` config section.
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    pub bootstrap_late_joiners: bool,
    pub max_session_id_len: usize,
    pub max_display_name_len: usize,
    pub max_content_bytes: usize,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            bootstrap_late_joiners: true,
            max_session_id_len: 128,
            max_display_name_len: 64,
            max_content_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    pub sessions: usize,
    pub connections: usize,
    pub joined: usize,
}

#[derive(Default)]
pub(crate) struct State {
    pub(crate) registry: ConnectionRegistry,
    pub(crate) directory: SessionDirectory,
}

/// Cloneable handle shared by every connection task.
#[derive(Clone)]
pub struct Coordinator {
    pub(crate) state: Arc<Mutex<State>>,
    pub(crate) options: Arc<CoordinatorOptions>,
}

impl Coordinator {
    pub fn new(options: CoordinatorOptions) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            options: Arc::new(options),
        }
    }

    /// Route one inbound client event to the matching operation.
    pub async fn handle(
        &self,
        connection_id: &ConnectionId,
        event: ClientEvent,
    ) -> Result<(), CoordinatorError> {
        match event {
            ClientEvent::Join { room_id, user_name } => {
                self.join(connection_id, SessionId::from(room_id), user_name)
                    .await?;
            }
            ClientEvent::LeaveRoom => {
                self.leave(connection_id).await;
            }
            ClientEvent::CodeChange { code, .. } => {
                self.relay_content(connection_id, code).await;
            }
            ClientEvent::LanguageChange { language, .. } => {
                self.relay_language(connection_id, language).await;
            }
            ClientEvent::Typing { user_name, .. } => {
                self.relay_typing(connection_id, &user_name).await;
            }
        }
        Ok(())
    }

    /// Remove a connection whose transport integration misbehaved, repairing
    /// its session without touching any other.
    pub async fn drop_connection(&self, connection_id: &ConnectionId) {
        let mut state = self.state.lock().await;
        if let Some(membership) = state.registry.evict(connection_id) {
            warn!(
                connection = %connection_id,
                session = %membership.session_id,
                "evicting connection that still held a membership"
            );
            let roster = state
                .directory
                .remove_member(&membership.session_id, connection_id);
            crate::relay::announce_roster(&state, &membership.session_id, roster);
        }
    }

    pub async fn roster(&self, session_id: &SessionId) -> Roster {
        self.state.lock().await.directory.members(session_id)
    }

    pub async fn membership(&self, connection_id: &ConnectionId) -> Option<Membership> {
        self.state
            .lock()
            .await
            .registry
            .current_session(connection_id)
            .cloned()
    }

    pub async fn last_known(&self, session_id: &SessionId) -> Option<LastKnown> {
        self.state
            .lock()
            .await
            .directory
            .last_known(session_id)
            .cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.state.lock().await.directory.len()
    }

    pub async fn connection_count(&self) -> usize {
        self.state.lock().await.registry.len()
    }

    pub async fn stats(&self) -> CoordinatorStats {
        let state = self.state.lock().await;
        CoordinatorStats {
            sessions: state.directory.len(),
            connections: state.registry.len(),
            joined: state.registry.joined_count(),
        }
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(CoordinatorOptions::default())
    }
}
