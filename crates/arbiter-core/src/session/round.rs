use super::*;

use contracts::{ActorRef, AgentRole, EventType};
use serde_json::json;

use crate::EngineError;

impl Session {
    /// Open the next round: pending proposals cleared, arbiter back to
    /// accepting submissions.
    pub(super) fn open_round(&mut self) {
        self.pending.clear();
        self.sequence_in_turn = 0;
        self.phase = ArbiterPhase::AwaitingProposals;

        let stats = self.city_stats();
        self.push_event(
            EventType::RoundStarted,
            Vec::new(),
            Some(json!({
                "turn": self.turn_number,
                "max_turns": self.config.max_turns,
                "city_stats": serde_json::to_value(&stats).unwrap_or_else(|_| json!({})),
            })),
        );
    }

    /// Queue a proposal for the current round. Rejections leave all session
    /// state untouched — the caller observes the same round state as before.
    pub fn submit_proposal(&mut self, proposal: Proposal) -> Result<(), EngineError> {
        if self.is_game_over {
            return Err(EngineError::SessionOver);
        }
        if self.phase != ArbiterPhase::AwaitingProposals {
            return Err(EngineError::RoundNotAcceptingProposals { phase: self.phase });
        }
        if !self.departments.contains_key(&proposal.target_department) {
            return Err(EngineError::InvalidDepartment {
                department_id: proposal.target_department.clone(),
            });
        }
        if self.seen_proposal_ids.contains(&proposal.proposal_id) {
            return Err(EngineError::DuplicateProposal {
                proposal_id: proposal.proposal_id.clone(),
            });
        }

        let is_bad_actor = if proposal.proposer_id == self.config.player_id {
            false
        } else {
            self.registry.get(&proposal.proposer_id)?.role == AgentRole::BadActor
        };

        self.seen_proposal_ids.insert(proposal.proposal_id.clone());

        let actors = vec![ActorRef {
            actor_id: proposal.proposer_id.clone(),
            actor_kind: if is_bad_actor { "bad_actor" } else { "proposer" }.to_string(),
        }];
        self.push_event(
            EventType::ProposalSubmitted,
            actors.clone(),
            Some(json!({
                "proposal_id": &proposal.proposal_id,
                "target_department": &proposal.target_department,
                "title": &proposal.title,
            })),
        );
        if is_bad_actor {
            self.push_event(
                EventType::BadActorAction,
                actors,
                Some(json!({
                    "proposal_id": &proposal.proposal_id,
                    "target_department": &proposal.target_department,
                    "bribe_amount": proposal.bribe_amount,
                })),
            );
        }

        self.pending.push(proposal);
        Ok(())
    }

    /// Abort the round in flight. Only legal while proposals are still being
    /// collected; once evaluation starts the round runs to completion.
    pub fn abort_round(&mut self) -> Result<(), EngineError> {
        if self.is_game_over {
            return Err(EngineError::SessionOver);
        }
        if self.phase != ArbiterPhase::AwaitingProposals {
            return Err(EngineError::RoundNotAcceptingProposals { phase: self.phase });
        }

        // Discarded proposals were never consumed, so their ids free up.
        for proposal in &self.pending {
            self.seen_proposal_ids.remove(&proposal.proposal_id);
        }
        let discarded = self.pending.len();
        self.pending.clear();

        self.push_event(
            EventType::GameStateUpdate,
            Vec::new(),
            Some(json!({
                "round_aborted": true,
                "discarded_proposals": discarded,
            })),
        );
        Ok(())
    }
}
