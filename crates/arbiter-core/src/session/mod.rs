use std::collections::{BTreeMap, BTreeSet};

mod events;
mod init;
mod resolve;
mod round;
mod snapshot;
#[cfg(test)]
mod tests;

use contracts::{
    ArbiterPhase, Decision, Event, GameOutcome, Proposal, SessionConfig,
};

use crate::aggregate::DepartmentState;
use crate::registry::PersonalityRegistry;
use crate::trust::TrustLedger;

/// One arbitration session: the single logical owner of round state, trust
/// state, and department scores.
///
/// All mutation happens under a single-writer discipline — one round
/// resolves fully before the next opens, and no partial-round state is ever
/// observable from the outside. Concurrent sessions share nothing.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    registry: PersonalityRegistry,
    departments: BTreeMap<String, DepartmentState>,
    trust: TrustLedger,
    phase: ArbiterPhase,
    turn_number: u32,
    pending: Vec<Proposal>,
    seen_proposal_ids: BTreeSet<String>,
    proposal_history: Vec<Proposal>,
    resistance_active: bool,
    bad_actor_influence: f64,
    win_streak: u32,
    is_game_over: bool,
    outcome: Option<GameOutcome>,
    decision_log: Vec<Decision>,
    event_log: Vec<Event>,
    sequence_in_turn: u64,
    evaluation_pool: Option<rayon::ThreadPool>,
}

impl Session {
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    pub fn phase(&self) -> ArbiterPhase {
        self.phase
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn registry(&self) -> &PersonalityRegistry {
        &self.registry
    }

    /// Finalized decisions, one per resolved round, in order.
    pub fn decisions(&self) -> &[Decision] {
        &self.decision_log
    }

    /// Every proposal ever consumed by arbitration, retained for audit.
    pub fn proposal_history(&self) -> &[Proposal] {
        &self.proposal_history
    }

    pub fn events(&self) -> &[Event] {
        &self.event_log
    }

    pub fn trust_of(&self, agent_id: &str) -> f64 {
        self.trust.get(agent_id)
    }
}
