//! Per-user live session fan-out.
//!
//! Each connected session owns the receiving half of an unbounded channel.
//! Publishing pushes events to every session of the task owner; a push into
//! a closed channel evicts that session. Heartbeats run outside this type and
//! call [`SessionRegistry::prune_closed`].

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::task::{
    domain::{TransitionEvent, UserId},
    ports::{EventPublishResult, TransitionEventPublisher},
};

/// Identifier of one live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receiving end of a connected session.
///
/// Dropping the handle closes the session; the next publish or prune evicts
/// it.
#[derive(Debug)]
pub struct SessionHandle {
    user: UserId,
    id: SessionId,
    receiver: UnboundedReceiver<TransitionEvent>,
}

impl SessionHandle {
    /// Returns the user the session belongs to.
    #[must_use]
    pub const fn user(&self) -> UserId {
        self.user
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Waits for the next event; `None` once the session was evicted.
    pub async fn recv(&mut self) -> Option<TransitionEvent> {
        self.receiver.recv().await
    }

    /// Returns an already delivered event without waiting.
    pub fn try_recv(&mut self) -> Option<TransitionEvent> {
        self.receiver.try_recv().ok()
    }
}

type SessionSinks = HashMap<SessionId, UnboundedSender<TransitionEvent>>;

/// Concurrent registry of live sessions keyed by user.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<UserId, SessionSinks>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session for `user`.
    #[must_use]
    pub fn connect(&self, user: UserId) -> SessionHandle {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = SessionId::new();
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user)
            .or_default()
            .insert(id, sender);
        tracing::debug!(%user, session = %id, "session connected");
        SessionHandle { user, id, receiver }
    }

    /// Removes a session. Returns `true` when it was registered.
    pub fn disconnect(&self, user: UserId, session: SessionId) -> bool {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(sinks) = sessions.get_mut(&user) else {
            return false;
        };
        let removed = sinks.remove(&session).is_some();
        if sinks.is_empty() {
            sessions.remove(&user);
        }
        removed
    }

    /// Returns the number of sessions registered for `user`.
    #[must_use]
    pub fn session_count(&self, user: UserId) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user)
            .map_or(0, HashMap::len)
    }

    /// Evicts sessions whose receiving end was dropped and returns how many
    /// were removed.
    pub fn prune_closed(&self) -> usize {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut evicted = 0;
        for sinks in sessions.values_mut() {
            let before = sinks.len();
            sinks.retain(|_, sender| !sender.is_closed());
            evicted += before - sinks.len();
        }
        sessions.retain(|_, sinks| !sinks.is_empty());
        if evicted > 0 {
            tracing::info!(evicted, "pruned closed sessions");
        }
        evicted
    }
}

/// Pushes `events` into `sender`, returning `false` once the channel is
/// closed.
fn push_all(sender: &UnboundedSender<TransitionEvent>, events: &[TransitionEvent]) -> bool {
    events.iter().all(|event| sender.send(*event).is_ok())
}

#[async_trait]
impl TransitionEventPublisher for SessionRegistry {
    async fn publish(&self, owner: UserId, events: &[TransitionEvent]) -> EventPublishResult<()> {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(sinks) = sessions.get_mut(&owner) else {
            return Ok(());
        };

        sinks.retain(|session, sender| {
            let delivered = push_all(sender, events);
            if !delivered {
                tracing::info!(user = %owner, %session, "evicted dead session");
            }
            delivered
        });
        if sinks.is_empty() {
            sessions.remove(&owner);
        }
        Ok(())
    }
}
