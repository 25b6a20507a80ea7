//! Append-only SQLite provenance for sessions, decisions, and events.

use std::fmt;
use std::path::Path;

use contracts::{Decision, Event, RoundState, SessionConfig};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSessionSummary {
    pub session_id: String,
    pub turn_number: u32,
    pub max_turns: u32,
    pub city_index: f64,
    pub is_game_over: bool,
}

#[derive(Debug)]
pub enum PersistenceError {
    Sqlite(rusqlite::Error),
    Serde(serde_json::Error),
    NotAttached,
    SessionAlreadyExists(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::Serde(err) => write!(f, "serde error: {err}"),
            Self::NotAttached => write!(f, "sqlite store is not attached"),
            Self::SessionAlreadyExists(session_id) => {
                write!(f, "session {session_id} already exists in the store")
            }
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

#[derive(Debug)]
pub struct SqliteLedgerStore {
    conn: Connection,
}

impl SqliteLedgerStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.configure()?;
        store.migrate()?;
        Ok(store)
    }

    fn configure(&mut self) -> Result<(), PersistenceError> {
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "synchronous", "NORMAL")?;
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    }

    fn migrate(&mut self) -> Result<(), PersistenceError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                session_id   TEXT PRIMARY KEY,
                config_json  TEXT NOT NULL,
                state_json   TEXT NOT NULL,
                turn_number  INTEGER NOT NULL,
                max_turns    INTEGER NOT NULL,
                city_index   REAL NOT NULL,
                is_game_over INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS decisions (
                session_id    TEXT NOT NULL,
                turn          INTEGER NOT NULL,
                decision_json TEXT NOT NULL,
                PRIMARY KEY (session_id, turn)
            );
            CREATE TABLE IF NOT EXISTS events (
                session_id       TEXT NOT NULL,
                event_id         TEXT NOT NULL,
                turn             INTEGER NOT NULL,
                sequence_in_turn INTEGER NOT NULL,
                event_type       TEXT NOT NULL,
                event_json       TEXT NOT NULL,
                PRIMARY KEY (session_id, event_id)
            );
            CREATE INDEX IF NOT EXISTS idx_decisions_session
                ON decisions (session_id, turn);
            CREATE INDEX IF NOT EXISTS idx_events_session_turn
                ON events (session_id, turn, sequence_in_turn);",
        )?;
        Ok(())
    }

    /// Upsert the session row and append new decisions and events in one
    /// transaction. `INSERT OR IGNORE` keeps the history append-only: a
    /// (session, turn) decision can never be rewritten.
    pub fn append_delta(
        &mut self,
        config: &SessionConfig,
        state: &RoundState,
        decisions: &[Decision],
        events: &[Event],
    ) -> Result<(), PersistenceError> {
        let config_json = serde_json::to_string(config)?;
        let state_json = serde_json::to_string(state)?;

        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO sessions (
                session_id, config_json, state_json, turn_number, max_turns,
                city_index, is_game_over
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(session_id) DO UPDATE SET
                state_json = excluded.state_json,
                turn_number = excluded.turn_number,
                city_index = excluded.city_index,
                is_game_over = excluded.is_game_over",
            params![
                config.session_id.as_str(),
                config_json,
                state_json,
                i64::from(state.turn_number),
                i64::from(state.max_turns),
                state.city_stats.city_index,
                if state.is_game_over { 1_i64 } else { 0_i64 },
            ],
        )?;

        for decision in decisions {
            let decision_json = serde_json::to_string(decision)?;
            tx.execute(
                "INSERT OR IGNORE INTO decisions (session_id, turn, decision_json)
                 VALUES (?1, ?2, ?3)",
                params![
                    decision.session_id.as_str(),
                    i64::from(decision.turn),
                    decision_json,
                ],
            )?;
        }

        for event in events {
            let event_json = serde_json::to_string(event)?;
            let event_type_json = serde_json::to_string(&event.event_type)?;
            tx.execute(
                "INSERT OR IGNORE INTO events (
                    session_id, event_id, turn, sequence_in_turn, event_type, event_json
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    event.session_id.as_str(),
                    event.event_id.as_str(),
                    i64::from(event.turn),
                    i64::try_from(event.sequence_in_turn).unwrap_or(i64::MAX),
                    event_type_json.trim_matches('"'),
                    event_json,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    pub fn session_exists(&self, session_id: &str) -> Result<bool, PersistenceError> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM sessions WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn delete_session(&mut self, session_id: &str) -> Result<(), PersistenceError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM events WHERE session_id = ?1", params![session_id])?;
        tx.execute(
            "DELETE FROM decisions WHERE session_id = ?1",
            params![session_id],
        )?;
        tx.execute(
            "DELETE FROM sessions WHERE session_id = ?1",
            params![session_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn list_sessions(
        &self,
        limit: usize,
    ) -> Result<Vec<PersistedSessionSummary>, PersistenceError> {
        let mut statement = self.conn.prepare(
            "SELECT session_id, turn_number, max_turns, city_index, is_game_over
             FROM sessions ORDER BY session_id LIMIT ?1",
        )?;
        let rows = statement.query_map(params![i64::try_from(limit).unwrap_or(i64::MAX)], |row| {
            Ok(PersistedSessionSummary {
                session_id: row.get(0)?,
                turn_number: row.get::<_, i64>(1)? as u32,
                max_turns: row.get::<_, i64>(2)? as u32,
                city_index: row.get(3)?,
                is_game_over: row.get::<_, i64>(4)? != 0,
            })
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?);
        }
        Ok(summaries)
    }

    pub fn decisions_for_session(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Decision>, PersistenceError> {
        let mut statement = self.conn.prepare(
            "SELECT decision_json FROM decisions
             WHERE session_id = ?1 ORDER BY turn LIMIT ?2",
        )?;
        let rows = statement.query_map(
            params![session_id, i64::try_from(limit).unwrap_or(i64::MAX)],
            |row| row.get::<_, String>(0),
        )?;

        let mut decisions = Vec::new();
        for row in rows {
            decisions.push(serde_json::from_str(&row?)?);
        }
        Ok(decisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SessionConfig;

    fn store() -> (tempfile::TempDir, SqliteLedgerStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteLedgerStore::open(dir.path().join("ledger.sqlite")).expect("open");
        (dir, store)
    }

    fn run_session(session_id: &str, rounds: u32) -> arbiter_core::Session {
        let config = SessionConfig {
            session_id: session_id.to_string(),
            ..SessionConfig::default()
        };
        let mut session = arbiter_core::Session::new(config).expect("session");
        for _ in 0..rounds {
            session.resolve_round().expect("resolve");
        }
        session
    }

    #[test]
    fn decisions_are_append_only_per_turn() {
        let (_dir, mut store) = store();
        let session = run_session("persist_a", 2);

        store
            .append_delta(
                session.config(),
                &session.round_state(),
                session.decisions(),
                session.events(),
            )
            .expect("first append");

        // A second append of the same rows must be a no-op, not a rewrite.
        store
            .append_delta(
                session.config(),
                &session.round_state(),
                session.decisions(),
                session.events(),
            )
            .expect("second append");

        let decisions = store
            .decisions_for_session("persist_a", 100)
            .expect("decisions");
        assert_eq!(decisions.len(), 2);
        assert_eq!(decisions[0].turn, 1);
        assert_eq!(decisions[1].turn, 2);
    }

    #[test]
    fn list_sessions_reflects_the_latest_state() {
        let (_dir, mut store) = store();
        let session = run_session("persist_b", 1);
        store
            .append_delta(
                session.config(),
                &session.round_state(),
                session.decisions(),
                session.events(),
            )
            .expect("append");

        let summaries = store.list_sessions(10).expect("list");
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].session_id, "persist_b");
        assert_eq!(summaries[0].turn_number, 2);
        assert!(!summaries[0].is_game_over);
    }

    #[test]
    fn delete_session_removes_all_rows() {
        let (_dir, mut store) = store();
        let session = run_session("persist_c", 1);
        store
            .append_delta(
                session.config(),
                &session.round_state(),
                session.decisions(),
                session.events(),
            )
            .expect("append");

        store.delete_session("persist_c").expect("delete");
        assert!(!store.session_exists("persist_c").expect("exists"));
        assert!(store
            .decisions_for_session("persist_c", 10)
            .expect("decisions")
            .is_empty());
    }
}
