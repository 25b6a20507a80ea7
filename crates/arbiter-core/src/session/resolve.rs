use super::*;

use contracts::{ActorRef, DecisionReasoning, EventType, ProposalTally};
use rayon::prelude::*;
use serde_json::json;

use crate::evaluator::{self, EvaluationContext};
use crate::lobbying;
use crate::trust::RoundOutcome;
use crate::{aggregate, EngineError};

impl Session {
    /// Run the full arbitration pipeline for the pending round: evaluate →
    /// lobby → arbitrate → trust → aggregate, then advance the turn.
    ///
    /// Once this starts there is no cancellation point; the round runs to
    /// completion and the caller receives the finalized decision.
    pub fn resolve_round(&mut self) -> Result<Decision, EngineError> {
        if self.is_game_over {
            return Err(EngineError::SessionOver);
        }
        if self.phase != ArbiterPhase::AwaitingProposals {
            return Err(EngineError::RoundNotAcceptingProposals { phase: self.phase });
        }

        let turn = self.turn_number;
        let tuning = self.config.tuning.clone();
        self.phase = ArbiterPhase::Evaluating;
        let proposals = std::mem::take(&mut self.pending);

        // Pure scoring pass. Opinion evaluation is side-effect-free, so the
        // fan-out across personalities may run on the worker pool; results
        // are joined before any arbitration step below.
        let tallies: Vec<ProposalTally> = {
            let ctx = EvaluationContext {
                turn,
                mayor_trust: self.trust.get(&self.config.player_id),
                resistance_active: self.resistance_active,
                seed: self.config.seed,
            };
            let voters: Vec<_> = self.registry.voters().collect();
            let mayor_id = self.registry.mayor_id();

            let opinions: Vec<Vec<_>> = match self.evaluation_pool.as_ref() {
                Some(pool) => pool.install(|| {
                    proposals
                        .par_iter()
                        .map(|proposal| {
                            voters
                                .iter()
                                .map(|voter| evaluator::evaluate(voter, proposal, &ctx, &tuning))
                                .collect()
                        })
                        .collect()
                }),
                None => proposals
                    .iter()
                    .map(|proposal| {
                        voters
                            .iter()
                            .map(|voter| evaluator::evaluate(voter, proposal, &ctx, &tuning))
                            .collect()
                    })
                    .collect(),
            };

            proposals
                .iter()
                .zip(opinions)
                .enumerate()
                .map(|(index, (proposal, proposal_opinions))| {
                    let mut composite = 0.0;
                    let mut bid = None;

                    for (voter, opinion) in voters.iter().zip(&proposal_opinions) {
                        if voter.agent_id == mayor_id {
                            if proposal.bribe_amount > 0 {
                                let influence =
                                    lobbying::bid(proposal, voter, opinion, &tuning);
                                composite += tuning.mayor_weight * influence.effective_score;
                                bid = Some(influence);
                            } else {
                                composite += tuning.mayor_weight * opinion.score;
                            }
                        } else {
                            let voter_trust = self.trust.get(&voter.agent_id) / 100.0;
                            composite += tuning.department_weight * voter_trust * opinion.score;
                        }
                    }

                    // Zero trust halves a proposer's influence rather than
                    // zeroing it.
                    let trust_multiplier = 0.5 + self.trust.get(&proposal.proposer_id) / 200.0;

                    ProposalTally {
                        proposal_id: proposal.proposal_id.clone(),
                        proposer_id: proposal.proposer_id.clone(),
                        submission_sequence: index as u64,
                        composite_score: composite,
                        trust_multiplier,
                        final_score: composite * trust_multiplier,
                        opinions: proposal_opinions,
                        bid,
                    }
                })
                .collect()
        };

        self.phase = ArbiterPhase::Resolved;

        // Highest positive final score wins; the strictly-greater comparison
        // leaves ties with the earliest submission. Nothing positive → no
        // action.
        let mut winner_index: Option<usize> = None;
        for (index, tally) in tallies.iter().enumerate() {
            if tally.final_score > 0.0
                && winner_index
                    .map_or(true, |current| tally.final_score > tallies[current].final_score)
            {
                winner_index = Some(index);
            }
        }

        let outcome = match winner_index {
            Some(index) => RoundOutcome::Winner {
                proposer_id: &tallies[index].proposer_id,
                final_score: tallies[index].final_score,
                losers: tallies
                    .iter()
                    .enumerate()
                    .filter(|(other, _)| *other != index)
                    .map(|(_, tally)| tally.proposer_id.as_str())
                    .collect(),
            },
            None => RoundOutcome::NoAction {
                proposers: tallies
                    .iter()
                    .map(|tally| tally.proposer_id.as_str())
                    .collect(),
            },
        };
        let trust_deltas = self.trust.round_deltas(&outcome, &tuning);

        let mut department_deltas = BTreeMap::new();
        if let Some(index) = winner_index {
            let winning = &proposals[index];
            department_deltas.insert(
                winning.target_department.clone(),
                winning.impact.sustainability,
            );
        }

        let decision = Decision {
            schema_version: contracts::SCHEMA_VERSION_V1.to_string(),
            session_id: self.config.session_id.clone(),
            turn,
            winning_proposal_id: winner_index.map(|index| tallies[index].proposal_id.clone()),
            accepted_by: self.registry.mayor_id().to_string(),
            department_deltas,
            trust_deltas: trust_deltas.clone(),
            reasoning: DecisionReasoning {
                tallies,
                resistance_active: self.resistance_active,
            },
        };

        self.trust.apply_deltas(&trust_deltas);

        // A visible win (an accepted positive-sustainability proposal)
        // clears resistance; low approval re-raises it.
        let visible_win =
            winner_index.is_some_and(|index| proposals[index].impact.sustainability > 0);
        if visible_win {
            self.resistance_active = false;
        } else if self.trust.get(&self.config.player_id) < tuning.corruption_threshold {
            self.resistance_active = true;
        }

        let corrupted_bids = decision
            .reasoning
            .tallies
            .iter()
            .filter(|tally| tally.bid.as_ref().is_some_and(|bid| bid.corrupted))
            .count();
        self.bad_actor_influence = if corrupted_bids > 0 {
            (self.bad_actor_influence + tuning.bad_actor_influence_step * corrupted_bids as f64)
                .clamp(0.0, 100.0)
        } else {
            (self.bad_actor_influence - tuning.bad_actor_influence_decay).clamp(0.0, 100.0)
        };

        aggregate::apply_deltas(&mut self.departments, &decision.department_deltas);

        self.proposal_history.extend(proposals);
        self.emit_decision_events(&decision);

        let city_index = aggregate::city_index(&self.departments);
        if city_index <= tuning.loss_index {
            self.finish_game(GameOutcome::Defeat);
        } else {
            if city_index >= tuning.win_index {
                self.win_streak += 1;
            } else {
                self.win_streak = 0;
            }
            if self.win_streak >= tuning.win_streak_rounds {
                self.finish_game(GameOutcome::Victory);
            } else if turn >= self.config.max_turns {
                self.finish_game(GameOutcome::TermLimit);
            }
        }

        self.phase = ArbiterPhase::Applied;
        self.decision_log.push(decision.clone());
        self.assert_invariants();

        if !self.is_game_over {
            self.turn_number = turn + 1;
            self.open_round();
        }

        Ok(decision)
    }

    fn finish_game(&mut self, outcome: GameOutcome) {
        self.is_game_over = true;
        self.outcome = Some(outcome);
        self.push_event(
            EventType::GameEnded,
            Vec::new(),
            Some(json!({ "outcome": outcome })),
        );
    }

    fn emit_decision_events(&mut self, decision: &Decision) {
        let mayor = vec![ActorRef {
            actor_id: decision.accepted_by.clone(),
            actor_kind: "mayor".to_string(),
        }];
        self.push_event(
            EventType::ProposalDecision,
            mayor,
            Some(serde_json::to_value(decision).unwrap_or_else(|_| json!({}))),
        );

        if !decision.department_deltas.is_empty() {
            let stats = self.city_stats();
            self.push_event(
                EventType::SustainabilityChange,
                Vec::new(),
                Some(json!({
                    "department_deltas": &decision.department_deltas,
                    "city_index": stats.city_index,
                })),
            );
        }

        if !decision.trust_deltas.is_empty() {
            self.push_event(
                EventType::TrustChanged,
                Vec::new(),
                Some(json!({ "trust_deltas": &decision.trust_deltas })),
            );
        }

        let state = self.round_state();
        self.push_event(
            EventType::GameStateUpdate,
            Vec::new(),
            Some(serde_json::to_value(&state).unwrap_or_else(|_| json!({}))),
        );
    }
}
