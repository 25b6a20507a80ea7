use super::*;

use contracts::{CityStats, RoundState, SCHEMA_VERSION_V1};

use crate::{aggregate, suggestions};

impl Session {
    /// Aggregate city view. The index is recomputed from department scores
    /// on every read.
    pub fn city_stats(&self) -> CityStats {
        CityStats {
            city_index: aggregate::city_index(&self.departments),
            department_scores: self
                .departments
                .iter()
                .map(|(id, department)| (id.clone(), department.sustainability_score))
                .collect(),
            mayor_trust: self.trust.get(&self.config.player_id),
            bad_actor_influence: self.bad_actor_influence,
        }
    }

    pub fn round_state(&self) -> RoundState {
        RoundState {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            session_id: self.config.session_id.clone(),
            turn_number: self.turn_number,
            max_turns: self.config.max_turns,
            phase: self.phase,
            pending_proposals: self.pending.clone(),
            city_stats: self.city_stats(),
            is_game_over: self.is_game_over,
            outcome: self.outcome,
        }
    }

    /// Catalog-backed proposal suggestions for the current turn, restricted
    /// to departments this session actually has.
    pub fn suggested_proposals(&self) -> Vec<contracts::Proposal> {
        suggestions::proposals_for_turn(
            |department_id| self.departments.contains_key(department_id),
            &self.config.player_id,
            self.turn_number,
        )
    }

    /// Invariants that only a programming bug can break. Violations abort
    /// the session with a full state dump for postmortem.
    pub(super) fn assert_invariants(&self) {
        let mut violation = None;

        if !self.trust.in_bounds() {
            violation = Some("trust left [0,100]".to_string());
        }
        if violation.is_none() {
            for department in self.departments.values() {
                if !(0.0..=100.0).contains(&department.sustainability_score) {
                    violation = Some(format!(
                        "department {} score left [0,100]",
                        department.department_id
                    ));
                    break;
                }
            }
        }

        if let Some(detail) = violation {
            let dump = serde_json::json!({
                "round_state": self.round_state(),
                "trust": self.trust.snapshot(),
            });
            panic!(
                "arbitration invariant violated: {detail}; state dump: {}",
                serde_json::to_string(&dump).unwrap_or_default()
            );
        }
    }
}
