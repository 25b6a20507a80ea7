//! In-process API facade over an arbitration session, with SQLite
//! provenance persistence and an axum HTTP/WebSocket server.
//!
//! Persistence is write-only provenance: decisions and events are appended
//! after each resolved round and the engine never reads them back for
//! decision-making.

mod persistence;
mod server;

use std::path::Path;

use arbiter_core::{EngineError, Session};
use contracts::{Decision, Event, Proposal, RoundState, SessionConfig};

use persistence::SqliteLedgerStore;
pub use persistence::{PersistedSessionSummary, PersistenceError};
pub use server::{serve, ServerError};

#[derive(Debug)]
struct PersistenceState {
    store: SqliteLedgerStore,
    persisted_decision_count: usize,
    persisted_event_count: usize,
}

#[derive(Debug)]
pub struct EngineApi {
    session: Session,
    persistence: Option<PersistenceState>,
    last_persistence_error: Option<String>,
}

impl EngineApi {
    /// Validate the configuration and open the session. Registry problems
    /// fail here, before any round can observe them.
    pub fn from_config(config: SessionConfig) -> Result<Self, EngineError> {
        Ok(Self {
            session: Session::new(config)?,
            persistence: None,
            last_persistence_error: None,
        })
    }

    pub fn session_id(&self) -> &str {
        self.session.session_id()
    }

    pub fn config(&self) -> &SessionConfig {
        self.session.config()
    }

    pub fn state(&self) -> RoundState {
        self.session.round_state()
    }

    pub fn events(&self) -> &[Event] {
        self.session.events()
    }

    pub fn decisions(&self) -> &[Decision] {
        self.session.decisions()
    }

    pub fn suggestions(&self) -> Vec<Proposal> {
        self.session.suggested_proposals()
    }

    pub fn submit_proposal(&mut self, proposal: Proposal) -> Result<(), EngineError> {
        self.session.submit_proposal(proposal)
    }

    pub fn abort_round(&mut self) -> Result<(), EngineError> {
        self.session.abort_round()
    }

    /// Resolve the pending round and flush provenance afterwards. The
    /// decision is final before any I/O happens; persistence failures are
    /// recorded, never interleaved with arbitration.
    pub fn resolve_round(&mut self) -> Result<(Decision, RoundState), EngineError> {
        let decision = self.session.resolve_round()?;
        self.flush_persistence();
        Ok((decision, self.session.round_state()))
    }

    pub fn attach_sqlite_store(&mut self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let store = SqliteLedgerStore::open(path)?;
        self.persistence = Some(PersistenceState {
            store,
            persisted_decision_count: 0,
            persisted_event_count: 0,
        });
        Ok(())
    }

    pub fn initialize_session_storage(
        &mut self,
        replace_existing_session: bool,
    ) -> Result<(), PersistenceError> {
        let Some(state) = self.persistence.as_mut() else {
            return Err(PersistenceError::NotAttached);
        };

        let session_id = self.session.session_id().to_string();
        if state.store.session_exists(&session_id)? {
            if replace_existing_session {
                state.store.delete_session(&session_id)?;
                state.persisted_decision_count = 0;
                state.persisted_event_count = 0;
            } else {
                return Err(PersistenceError::SessionAlreadyExists(session_id));
            }
        }

        state.store.append_delta(
            self.session.config(),
            &self.session.round_state(),
            &[],
            self.session.events(),
        )?;
        state.persisted_event_count = self.session.events().len();
        self.last_persistence_error = None;
        Ok(())
    }

    pub fn flush_persistence_checked(&mut self) -> Result<(), PersistenceError> {
        let Some(state) = self.persistence.as_mut() else {
            return Err(PersistenceError::NotAttached);
        };

        let new_decisions = &self.session.decisions()[state.persisted_decision_count..];
        let new_events = &self.session.events()[state.persisted_event_count..];
        state.store.append_delta(
            self.session.config(),
            &self.session.round_state(),
            new_decisions,
            new_events,
        )?;
        state.persisted_decision_count = self.session.decisions().len();
        state.persisted_event_count = self.session.events().len();
        self.last_persistence_error = None;
        Ok(())
    }

    /// Best-effort flush: a detached store is fine, anything else is kept
    /// as a warning for the transport layer to surface.
    fn flush_persistence(&mut self) {
        match self.flush_persistence_checked() {
            Ok(()) | Err(PersistenceError::NotAttached) => {}
            Err(err) => self.last_persistence_error = Some(err.to_string()),
        }
    }

    pub fn last_persistence_error(&self) -> Option<&str> {
        self.last_persistence_error.as_deref()
    }
}
