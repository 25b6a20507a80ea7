//! Deterministic policy arbitration engine.
//!
//! A session pits a human sustainability strategist against configured bad
//! actors over the policy direction of a city. Each round collects competing
//! proposals, scores them against every voting personality, folds bribes
//! through corruption resistance, resolves exactly one binding decision,
//! updates the trust ledger, and re-aggregates the city sustainability index.
//!
//! Everything in this crate is a pure computation over session state: no
//! wall-clock, no I/O, no ambient randomness. Identical `(config, seed,
//! proposal sequence)` inputs replay to byte-identical decision sequences.

use std::fmt;

use contracts::{ArbiterPhase, ErrorCode};

pub mod aggregate;
pub mod evaluator;
pub mod lobbying;
pub mod registry;
pub mod session;
pub mod suggestions;
pub mod trust;

pub use registry::PersonalityRegistry;
pub use session::Session;

/// Recoverable rejection categories plus fatal configuration errors.
///
/// Anything not representable here (trust leaving its bounds, index drift)
/// is a programming bug, not an error value, and aborts the session with a
/// state dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    InvalidDepartment { department_id: String },
    RoundNotAcceptingProposals { phase: ArbiterPhase },
    DuplicateProposal { proposal_id: String },
    UnknownAgent { agent_id: String },
    InvalidConfig(String),
    SessionOver,
}

impl EngineError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidDepartment { .. } => ErrorCode::InvalidDepartment,
            Self::RoundNotAcceptingProposals { .. } => ErrorCode::RoundNotAcceptingProposals,
            Self::DuplicateProposal { .. } => ErrorCode::DuplicateProposal,
            Self::UnknownAgent { .. } => ErrorCode::UnknownAgent,
            Self::InvalidConfig(_) => ErrorCode::InvalidConfig,
            Self::SessionOver => ErrorCode::SessionStateConflict,
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDepartment { department_id } => {
                write!(f, "proposal targets unknown department {department_id}")
            }
            Self::RoundNotAcceptingProposals { phase } => {
                write!(f, "round is not accepting proposals in phase {phase:?}")
            }
            Self::DuplicateProposal { proposal_id } => {
                write!(f, "proposal {proposal_id} was already submitted")
            }
            Self::UnknownAgent { agent_id } => {
                write!(f, "agent {agent_id} is not in the personality registry")
            }
            Self::InvalidConfig(message) => write!(f, "invalid session config: {message}"),
            Self::SessionOver => write!(f, "session has ended"),
        }
    }
}

impl std::error::Error for EngineError {}
