//! Per-agent trust state, mutated only by finalized round outcomes.

use std::collections::BTreeMap;

use contracts::ArbitrationTuning;

/// How a resolved round touches the ledger.
#[derive(Debug, Clone)]
pub enum RoundOutcome<'a> {
    Winner {
        proposer_id: &'a str,
        final_score: f64,
        losers: Vec<&'a str>,
    },
    /// No-action rounds apply a smaller universal decay to every proposer:
    /// stagnation, not defeat.
    NoAction { proposers: Vec<&'a str> },
}

/// Trust scalars in [0,100], keyed by agent id. Owned by the session;
/// mutated exclusively through `apply_deltas` after a decision is final.
#[derive(Debug, Clone)]
pub struct TrustLedger {
    trust: BTreeMap<String, f64>,
    baseline: f64,
}

impl TrustLedger {
    pub fn new(baseline: f64) -> Self {
        Self {
            trust: BTreeMap::new(),
            baseline: baseline.clamp(0.0, 100.0),
        }
    }

    pub fn register(&mut self, agent_id: &str) {
        self.trust
            .entry(agent_id.to_string())
            .or_insert(self.baseline);
    }

    pub fn get(&self, agent_id: &str) -> f64 {
        self.trust.get(agent_id).copied().unwrap_or(self.baseline)
    }

    pub fn snapshot(&self) -> &BTreeMap<String, f64> {
        &self.trust
    }

    /// Compute the per-agent deltas a finalized outcome implies. Pure: the
    /// ledger is not touched until `apply_deltas`.
    pub fn round_deltas(
        &self,
        outcome: &RoundOutcome<'_>,
        tuning: &ArbitrationTuning,
    ) -> BTreeMap<String, f64> {
        let mut deltas = BTreeMap::new();
        match outcome {
            RoundOutcome::Winner {
                proposer_id,
                final_score,
                losers,
            } => {
                let normalized = (final_score / tuning.score_normalization).clamp(0.0, 1.0);
                let gain = (tuning.trust_gain_base * normalized).min(tuning.max_trust_swing);
                deltas.insert((*proposer_id).to_string(), gain);
                for loser in losers {
                    deltas.insert((*loser).to_string(), -tuning.trust_loss_base);
                }
            }
            RoundOutcome::NoAction { proposers } => {
                for proposer in proposers {
                    deltas.insert((*proposer).to_string(), -tuning.no_action_decay);
                }
            }
        }
        deltas
    }

    /// Apply deltas with clamping. Clamp, not wrap: no adjustment magnitude
    /// can carry trust outside [0,100].
    pub fn apply_deltas(&mut self, deltas: &BTreeMap<String, f64>) {
        for (agent_id, delta) in deltas {
            let entry = self
                .trust
                .entry(agent_id.clone())
                .or_insert(self.baseline);
            *entry = (*entry + delta).clamp(0.0, 100.0);
        }
    }

    pub fn in_bounds(&self) -> bool {
        self.trust
            .values()
            .all(|value| (0.0..=100.0).contains(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> TrustLedger {
        let mut ledger = TrustLedger::new(50.0);
        ledger.register("player");
        ledger.register("developer_group");
        ledger
    }

    #[test]
    fn winner_gain_is_capped_by_max_swing() {
        let tuning = ArbitrationTuning {
            trust_gain_base: 40.0,
            max_trust_swing: 15.0,
            ..ArbitrationTuning::default()
        };
        let ledger = ledger();
        let deltas = ledger.round_deltas(
            &RoundOutcome::Winner {
                proposer_id: "player",
                final_score: 1_000.0,
                losers: vec!["developer_group"],
            },
            &tuning,
        );
        assert!((deltas["player"] - 15.0).abs() < 1e-9);
        assert!((deltas["developer_group"] + tuning.trust_loss_base).abs() < 1e-9);
    }

    #[test]
    fn no_action_decay_is_milder_than_defeat() {
        let tuning = ArbitrationTuning::default();
        let ledger = ledger();
        let deltas = ledger.round_deltas(
            &RoundOutcome::NoAction {
                proposers: vec!["player", "developer_group"],
            },
            &tuning,
        );
        assert!((deltas["player"] + tuning.no_action_decay).abs() < 1e-9);
        assert!(tuning.no_action_decay < tuning.trust_loss_base);
    }

    #[test]
    fn repeated_losses_never_leave_the_lower_bound() {
        let tuning = ArbitrationTuning {
            trust_loss_base: 40.0,
            ..ArbitrationTuning::default()
        };
        let mut ledger = ledger();
        for _ in 0..10 {
            let deltas = ledger.round_deltas(
                &RoundOutcome::Winner {
                    proposer_id: "player",
                    final_score: 5.0,
                    losers: vec!["developer_group"],
                },
                &tuning,
            );
            ledger.apply_deltas(&deltas);
        }
        assert_eq!(ledger.get("developer_group"), 0.0);
        assert!(ledger.in_bounds());
    }

    #[test]
    fn repeated_wins_never_leave_the_upper_bound() {
        let tuning = ArbitrationTuning::default();
        let mut ledger = ledger();
        for _ in 0..50 {
            let deltas = ledger.round_deltas(
                &RoundOutcome::Winner {
                    proposer_id: "player",
                    final_score: 1_000.0,
                    losers: vec![],
                },
                &tuning,
            );
            ledger.apply_deltas(&deltas);
        }
        assert_eq!(ledger.get("player"), 100.0);
        assert!(ledger.in_bounds());
    }

    #[test]
    fn unregistered_agents_read_the_baseline() {
        let ledger = TrustLedger::new(62.0);
        assert_eq!(ledger.get("ghost"), 62.0);
    }
}
