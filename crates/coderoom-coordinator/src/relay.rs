//! Fan-out of content, language and typing signals to the sender's session.
//!
//! Relays are fire-and-forget. A sender without a session (never joined, or
//! already gone) is dropped silently; that is the normal race between a
//! disconnect and messages still in flight.

use coderoom_common::{ConnectionId, SessionId};
use tracing::{debug, trace, warn};

use crate::coordinator::{Coordinator, State};
use crate::directory::Roster;
use crate::fanout::{deliver, Delivery};
use crate::protocol::Notification;

impl Coordinator {
    /// Cache `content` as the session's latest and send it to every other member.
    pub async fn relay_content(&self, sender: &ConnectionId, content: String) -> Delivery {
        if content.len() > self.options.max_content_bytes {
            warn!(
                connection = %sender,
                bytes = content.len(),
                limit = self.options.max_content_bytes,
                "content update too large, dropped"
            );
            return Delivery::default();
        }

        let mut state = self.state.lock().await;
        let Some(session_id) = sender_session(&state, sender) else {
            return Delivery::default();
        };
        state
            .directory
            .set_last_known_content(&session_id, content.clone());
        let delivery = fan_out_from(
            &state,
            sender,
            &session_id,
            Notification::ContentUpdated { code: content },
        );
        debug!(connection = %sender, session = %session_id, peers = delivery.delivered, "content relayed");
        delivery
    }

    /// Cache `language` as the session's latest and send it to every other member.
    pub async fn relay_language(&self, sender: &ConnectionId, language: String) -> Delivery {
        let mut state = self.state.lock().await;
        let Some(session_id) = sender_session(&state, sender) else {
            return Delivery::default();
        };
        state
            .directory
            .set_last_known_language(&session_id, language.clone());
        let delivery = fan_out_from(
            &state,
            sender,
            &session_id,
            Notification::LanguageUpdated { language },
        );
        debug!(connection = %sender, session = %session_id, peers = delivery.delivered, "language relayed");
        delivery
    }

    /// Tell the other members the sender is typing. Nothing is cached.
    ///
    /// The announced name is the one the sender joined with; `claimed_name`
    /// from the client is only compared for diagnostics.
    pub async fn relay_typing(&self, sender: &ConnectionId, claimed_name: &str) -> Delivery {
        let state = self.state.lock().await;
        let Some(membership) = state.registry.current_session(sender).cloned() else {
            trace!(connection = %sender, "typing from connection without a session, dropped");
            return Delivery::default();
        };
        if membership.display_name != claimed_name {
            debug!(
                connection = %sender,
                claimed = %claimed_name,
                joined_as = %membership.display_name,
                "typing name differs from joined name"
            );
        }
        fan_out_from(
            &state,
            sender,
            &membership.session_id,
            Notification::TypingNotice {
                user: membership.display_name,
            },
        )
    }
}

fn sender_session(state: &State, sender: &ConnectionId) -> Option<SessionId> {
    match state.registry.current_session(sender) {
        Some(membership) => Some(membership.session_id.clone()),
        None => {
            trace!(connection = %sender, "relay from connection without a session, dropped");
            None
        }
    }
}

fn fan_out_from(
    state: &State,
    sender: &ConnectionId,
    session_id: &SessionId,
    notification: Notification,
) -> Delivery {
    let recipients = state.directory.member_connections(session_id);
    deliver(
        &state.registry,
        &recipients,
        std::slice::from_ref(sender),
        &notification,
    )
}

/// Send the settled roster to every current member of the session.
pub(crate) fn announce_roster(state: &State, session_id: &SessionId, users: Roster) -> Delivery {
    let recipients = state.directory.member_connections(session_id);
    if recipients.is_empty() {
        return Delivery::default();
    }
    deliver(
        &state.registry,
        &recipients,
        &[],
        &Notification::RosterChanged { users },
    )
}

/// Hand a fresh joiner the session's cached content and language, if any.
pub(crate) fn bootstrap_joiner(
    state: &State,
    joiner: &ConnectionId,
    session_id: &SessionId,
) -> Delivery {
    let Some(last_known) = state.directory.last_known(session_id) else {
        return Delivery::default();
    };
    let target = std::slice::from_ref(joiner);
    let mut delivery = Delivery::default();

    if let Some(code) = &last_known.content {
        delivery = delivery.merge(deliver(
            &state.registry,
            target,
            &[],
            &Notification::ContentUpdated { code: code.clone() },
        ));
    }
    if let Some(language) = &last_known.language {
        delivery = delivery.merge(deliver(
            &state.registry,
            target,
            &[],
            &Notification::LanguageUpdated {
                language: language.clone(),
            },
        ));
    }
    delivery
}
