//! Client session state machine.
//!
//! State transitions:
//! - NoSession -> Establishing (only when no batch is outstanding)
//! - Establishing -> Active (establishment succeeded)
//! - Establishing -> NoSession (establishment failed; no automatic retry)
//! - Active -> NoSession (a batch or one of its items reported a session fault)
//!
//! `SessionState::transition` is a pure function; `SessionMachine` pairs the
//! state with the outstanding-batch counter so that "establishing while
//! batches are in flight" is rejected rather than represented.

use thiserror::Error;

use crate::domain::SessionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    NoSession,
    Establishing,
    Active(SessionId),
}

/// Input to the session state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A flush found no session. Carries the number of batches still in flight.
    Establish { outstanding: usize },
    Established(SessionId),
    EstablishFailed,
    /// The server no longer recognizes the session.
    Invalidated,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionTransitionError {
    #[error("session establishment already in flight")]
    AlreadyEstablishing,

    #[error("{0} batch(es) still outstanding")]
    Outstanding(usize),

    #[error("session already active")]
    AlreadyActive,

    #[error("no session establishment in flight")]
    NotEstablishing,
}

impl SessionState {
    /// Next state for `event`, or why the event is not allowed here.
    pub fn transition(&self, event: SessionEvent) -> Result<SessionState, SessionTransitionError> {
        use SessionEvent as E;
        use SessionState as S;

        match (self, event) {
            (S::NoSession, E::Establish { outstanding: 0 }) => Ok(S::Establishing),
            (S::NoSession, E::Establish { outstanding }) => {
                Err(SessionTransitionError::Outstanding(outstanding))
            }
            (S::Establishing, E::Establish { .. }) => Err(SessionTransitionError::AlreadyEstablishing),
            (S::Active(_), E::Establish { .. }) => Err(SessionTransitionError::AlreadyActive),

            (S::Establishing, E::Established(id)) => Ok(S::Active(id)),
            (S::Establishing, E::EstablishFailed) => Ok(S::NoSession),
            (_, E::Established(_) | E::EstablishFailed) => Err(SessionTransitionError::NotEstablishing),

            // invalidation is idempotent; an establishment in flight is left alone
            (S::Active(_) | S::NoSession, E::Invalidated) => Ok(S::NoSession),
            (S::Establishing, E::Invalidated) => Ok(S::Establishing),
        }
    }

    pub fn active(&self) -> Option<&SessionId> {
        match self {
            SessionState::Active(id) => Some(id),
            _ => None,
        }
    }
}

/// Session state plus the count of data batches awaiting a reply.
#[derive(Debug, Clone)]
pub struct SessionMachine {
    state: SessionState,
    outstanding: usize,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self {
            state: SessionState::NoSession,
            outstanding: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn active(&self) -> Option<&SessionId> {
        self.state.active()
    }

    fn apply(&mut self, event: SessionEvent) -> Result<&SessionState, SessionTransitionError> {
        self.state = self.state.transition(event)?;
        debug_assert!(
            !(self.state == SessionState::Establishing && self.outstanding > 0),
            "establishing a session while batches are outstanding"
        );
        Ok(&self.state)
    }

    pub fn begin_establishing(&mut self) -> Result<&SessionState, SessionTransitionError> {
        let outstanding = self.outstanding;
        self.apply(SessionEvent::Establish { outstanding })
    }

    pub fn established(&mut self, session: SessionId) -> Result<&SessionState, SessionTransitionError> {
        self.apply(SessionEvent::Established(session))
    }

    pub fn establishment_failed(&mut self) -> Result<&SessionState, SessionTransitionError> {
        self.apply(SessionEvent::EstablishFailed)
    }

    /// Returns true if an active session was dropped.
    pub fn invalidate(&mut self) -> bool {
        let was_active = self.active().is_some();
        // Invalidated is accepted from every state
        if let Ok(next) = self.state.transition(SessionEvent::Invalidated) {
            self.state = next;
        }
        was_active
    }

    pub fn batch_sent(&mut self) {
        self.outstanding += 1;
    }

    pub fn batch_returned(&mut self) {
        debug_assert!(self.outstanding > 0, "batch returned with none outstanding");
        self.outstanding = self.outstanding.saturating_sub(1);
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use ulid::Ulid;

    fn sid() -> SessionId {
        SessionId::from_ulid(Ulid::new())
    }

    #[test]
    fn happy_path() {
        let mut m = SessionMachine::new();
        assert_eq!(m.state(), &SessionState::NoSession);

        m.begin_establishing().unwrap();
        assert_eq!(m.state(), &SessionState::Establishing);

        let id = sid();
        m.established(id).unwrap();
        assert_eq!(m.active(), Some(&id));
    }

    #[test]
    fn only_one_establishment_in_flight() {
        let mut m = SessionMachine::new();
        m.begin_establishing().unwrap();
        assert_eq!(m.begin_establishing(), Err(SessionTransitionError::AlreadyEstablishing));
    }

    #[test]
    fn establishment_waits_for_outstanding_batches() {
        let mut m = SessionMachine::new();
        m.begin_establishing().unwrap();
        m.established(sid()).unwrap();
        m.batch_sent();
        m.batch_sent();
        assert!(m.invalidate());

        assert_eq!(m.begin_establishing(), Err(SessionTransitionError::Outstanding(2)));
        m.batch_returned();
        assert_eq!(m.begin_establishing(), Err(SessionTransitionError::Outstanding(1)));
        m.batch_returned();
        assert_eq!(m.begin_establishing(), Ok(&SessionState::Establishing));
    }

    #[test]
    fn failed_establishment_returns_to_no_session() {
        let mut m = SessionMachine::new();
        m.begin_establishing().unwrap();
        m.establishment_failed().unwrap();
        assert_eq!(m.state(), &SessionState::NoSession);
        // the next flush may retry
        assert!(m.begin_establishing().is_ok());
    }

    #[test]
    fn invalidating_twice_is_harmless() {
        let mut m = SessionMachine::new();
        m.begin_establishing().unwrap();
        m.established(sid()).unwrap();
        assert!(m.invalidate());
        assert!(!m.invalidate());
        assert_eq!(m.state(), &SessionState::NoSession);
    }

    #[rstest]
    #[case(SessionState::NoSession, SessionEvent::Established(SessionId::from_ulid(Ulid::nil())))]
    #[case(SessionState::NoSession, SessionEvent::EstablishFailed)]
    #[case(SessionState::Active(SessionId::from_ulid(Ulid::nil())), SessionEvent::EstablishFailed)]
    #[case(SessionState::Active(SessionId::from_ulid(Ulid::nil())), SessionEvent::Establish { outstanding: 0 })]
    fn illegal_transitions_are_rejected(#[case] from: SessionState, #[case] event: SessionEvent) {
        assert!(from.transition(event).is_err());
    }
}
