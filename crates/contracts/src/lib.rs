//! v1 cross-boundary contracts for the arbitration engine, API, persistence,
//! and UI transport.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod serde_u64_string;

pub const SCHEMA_VERSION_V1: &str = "1.0";

// ---------------------------------------------------------------------------
// Personalities and departments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStyle {
    Aggressive,
    Cautious,
    Collaborative,
    Bureaucratic,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PriorityDimension {
    Sustainability,
    Economic,
    Political,
    Health,
    Budget,
    Approval,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Mayor,
    DepartmentHead,
    CivicDelegate,
    BadActor,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriorityWeight {
    pub dimension: PriorityDimension,
    pub weight: f64,
}

/// Immutable personality record. Created at session configuration time and
/// never mutated during play; all mutable state lives in the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentPersonality {
    pub agent_id: String,
    pub name: String,
    pub role: AgentRole,
    /// None for non-department agents (Mayor, civic delegate, bad actors).
    pub department: Option<String>,
    pub decision_style: DecisionStyle,
    pub priorities: Vec<PriorityWeight>,
    pub risk_tolerance: u8,
    /// Absent for roles that cannot be lobbied.
    pub corruption_resistance: Option<u8>,
    pub budget_sensitivity: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepartmentConfig {
    pub department_id: String,
    pub name: String,
    pub initial_score: u8,
}

// ---------------------------------------------------------------------------
// Session configuration
// ---------------------------------------------------------------------------

/// Every constant the arbitration rules reach for. These are a consistent
/// starting calibration, so they ride in the config instead of hiding as
/// literals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArbitrationTuning {
    pub bribe_scale: f64,
    pub max_influence: f64,
    pub corruption_significance: f64,
    pub trust_baseline: f64,
    pub trust_gain_base: f64,
    pub trust_loss_base: f64,
    pub max_trust_swing: f64,
    pub no_action_decay: f64,
    pub score_normalization: f64,
    pub corruption_threshold: f64,
    pub resistance_penalty: f64,
    pub acceptance_base: f64,
    pub aggressive_multiplier: f64,
    pub cautious_variance_penalty: f64,
    pub collaborative_bonus: f64,
    pub bureaucratic_penalty: f64,
    pub default_variance: f64,
    pub mayor_weight: f64,
    pub department_weight: f64,
    pub evaluation_jitter: f64,
    pub win_index: f64,
    pub win_streak_rounds: u32,
    pub loss_index: f64,
    pub bad_actor_influence_baseline: f64,
    pub bad_actor_influence_step: f64,
    pub bad_actor_influence_decay: f64,
}

impl Default for ArbitrationTuning {
    fn default() -> Self {
        Self {
            bribe_scale: 50_000.0,
            max_influence: 3.0,
            corruption_significance: 0.25,
            trust_baseline: 50.0,
            trust_gain_base: 10.0,
            trust_loss_base: 4.0,
            max_trust_swing: 15.0,
            no_action_decay: 1.5,
            score_normalization: 25.0,
            corruption_threshold: 50.0,
            resistance_penalty: 3.0,
            acceptance_base: 10.0,
            aggressive_multiplier: 1.25,
            cautious_variance_penalty: 0.05,
            collaborative_bonus: 2.0,
            bureaucratic_penalty: 4.0,
            default_variance: 10.0,
            mayor_weight: 0.5,
            department_weight: 0.2,
            evaluation_jitter: 0.0,
            win_index: 85.0,
            win_streak_rounds: 10,
            loss_index: 40.0,
            bad_actor_influence_baseline: 30.0,
            bad_actor_influence_step: 5.0,
            bad_actor_influence_decay: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    pub schema_version: String,
    pub session_id: String,
    #[serde(with = "serde_u64_string")]
    pub seed: u64,
    pub max_turns: u32,
    pub player_id: String,
    /// Empty → the engine seeds its default six-department city.
    #[serde(default)]
    pub departments: Vec<DepartmentConfig>,
    /// Empty → the engine seeds its default personality catalog.
    #[serde(default)]
    pub personalities: Vec<AgentPersonality>,
    /// 0 or 1 → opinions are evaluated serially.
    #[serde(default)]
    pub evaluation_worker_threads: u16,
    #[serde(default)]
    pub tuning: ArbitrationTuning,
    pub notes: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            session_id: "session_local_001".to_string(),
            seed: 1337,
            max_turns: 25,
            player_id: "player".to_string(),
            departments: Vec::new(),
            personalities: Vec::new(),
            evaluation_worker_threads: 0,
            tuning: ArbitrationTuning::default(),
            notes: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Proposals, opinions, bids
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImpactVector {
    pub sustainability: i32,
    pub economic: i32,
    pub political: i32,
    /// Uncertainty consumed by cautious evaluators; absent → configured default.
    #[serde(default)]
    pub variance: Option<u32>,
}

impl ImpactVector {
    pub fn new(sustainability: i32, economic: i32, political: i32) -> Self {
        Self {
            sustainability,
            economic,
            political,
            variance: None,
        }
    }
}

/// A structured policy change request. Immutable once created; consumed
/// exactly once by arbitration and retained in history for audit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Proposal {
    pub schema_version: String,
    pub proposal_id: String,
    pub proposer_id: String,
    pub target_department: String,
    pub title: String,
    /// Opaque text; never interpreted by the engine.
    pub description: String,
    pub impact: ImpactVector,
    /// Zero for the player.
    #[serde(default)]
    pub bribe_amount: u64,
    pub created_at_turn: u32,
}

impl Proposal {
    pub fn new(
        proposal_id: impl Into<String>,
        proposer_id: impl Into<String>,
        target_department: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        impact: ImpactVector,
        created_at_turn: u32,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            proposal_id: proposal_id.into(),
            proposer_id: proposer_id.into(),
            target_department: target_department.into(),
            title: title.into(),
            description: description.into(),
            impact,
            bribe_amount: 0,
            created_at_turn,
        }
    }

    pub fn with_bribe(mut self, bribe_amount: u64) -> Self {
        self.bribe_amount = bribe_amount;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Opinion {
    pub agent_id: String,
    pub score: f64,
    pub accept: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InfluenceBid {
    pub actor_id: String,
    pub target_agent_id: String,
    pub raw_influence: f64,
    pub applied_influence: f64,
    pub effective_score: f64,
    pub corrupted: bool,
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProposalTally {
    pub proposal_id: String,
    pub proposer_id: String,
    pub submission_sequence: u64,
    pub composite_score: f64,
    pub trust_multiplier: f64,
    pub final_score: f64,
    pub opinions: Vec<Opinion>,
    pub bid: Option<InfluenceBid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionReasoning {
    pub tallies: Vec<ProposalTally>,
    pub resistance_active: bool,
}

/// One binding outcome per round. Immutable, appended to history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    pub schema_version: String,
    pub session_id: String,
    pub turn: u32,
    /// None → "no action" round.
    pub winning_proposal_id: Option<String>,
    pub accepted_by: String,
    pub department_deltas: BTreeMap<String, i32>,
    pub trust_deltas: BTreeMap<String, f64>,
    pub reasoning: DecisionReasoning,
}

// ---------------------------------------------------------------------------
// Round state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArbiterPhase {
    AwaitingProposals,
    Evaluating,
    Resolved,
    Applied,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Victory,
    Defeat,
    TermLimit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityStats {
    pub city_index: f64,
    pub department_scores: BTreeMap<String, f64>,
    pub mayor_trust: f64,
    pub bad_actor_influence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundState {
    pub schema_version: String,
    pub session_id: String,
    pub turn_number: u32,
    pub max_turns: u32,
    pub phase: ArbiterPhase,
    pub pending_proposals: Vec<Proposal>,
    pub city_stats: CityStats,
    pub is_game_over: bool,
    pub outcome: Option<GameOutcome>,
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "session_id={} turn={}/{} phase={:?} index={:.1} pending={}",
            self.session_id,
            self.turn_number,
            self.max_turns,
            self.phase,
            self.city_stats.city_index,
            self.pending_proposals.len()
        )
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidDepartment,
    RoundNotAcceptingProposals,
    DuplicateProposal,
    UnknownAgent,
    InvalidConfig,
    SessionNotFound,
    SessionStateConflict,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub schema_version: String,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            error_code,
            message: message.into(),
            details,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    RoundStarted,
    ProposalSubmitted,
    BadActorAction,
    ProposalDecision,
    SustainabilityChange,
    TrustChanged,
    GameStateUpdate,
    GameEnded,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActorRef {
    pub actor_id: String,
    pub actor_kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub schema_version: String,
    pub session_id: String,
    pub turn: u32,
    pub sequence_in_turn: u64,
    pub event_id: String,
    pub event_type: EventType,
    pub actors: Vec<ActorRef>,
    pub details: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_round_trips_with_string_seed() {
        let config = SessionConfig::default();
        let json = serde_json::to_string(&config).expect("serialize config");
        assert!(json.contains("\"seed\":\"1337\""));
        let parsed: SessionConfig = serde_json::from_str(&json).expect("parse config");
        assert_eq!(parsed, config);
    }

    #[test]
    fn proposal_defaults_to_zero_bribe() {
        let proposal = Proposal::new(
            "prop-1",
            "player",
            "energy",
            "Solar Incentives",
            "Tax incentives for rooftop solar.",
            ImpactVector::new(20, -10, 5),
            1,
        );
        assert_eq!(proposal.bribe_amount, 0);
        assert_eq!(proposal.with_bribe(500).bribe_amount, 500);
    }

    #[test]
    fn error_codes_use_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::RoundNotAcceptingProposals).expect("code");
        assert_eq!(json, "\"ROUND_NOT_ACCEPTING_PROPOSALS\"");
    }
}
