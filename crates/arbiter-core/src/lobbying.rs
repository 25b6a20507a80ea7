//! Bribe-to-influence conversion, gated by corruption resistance.
//!
//! Corruption is probabilistic leverage, not a guaranteed override: the bid
//! shifts the target's effective opinion, it never bypasses arbitration.

use contracts::{AgentPersonality, ArbitrationTuning, InfluenceBid, Opinion, Proposal};

/// Convert a proposal's bribe into an influence bid against one target.
///
/// `effective_score` is monotonically non-decreasing in `bribe_amount` for a
/// fixed target; replay tests rely on that.
pub fn bid(
    proposal: &Proposal,
    target: &AgentPersonality,
    target_opinion: &Opinion,
    tuning: &ArbitrationTuning,
) -> InfluenceBid {
    let raw_influence =
        (proposal.bribe_amount as f64 / tuning.bribe_scale).min(tuning.max_influence);

    // A target with no declared resistance cannot be lobbied at all.
    let resistance = target
        .corruption_resistance
        .map(f64::from)
        .unwrap_or(100.0);
    let applied_influence = raw_influence * (1.0 - resistance / 100.0);

    InfluenceBid {
        actor_id: proposal.proposer_id.clone(),
        target_agent_id: target.agent_id.clone(),
        raw_influence,
        applied_influence,
        effective_score: target_opinion.score + applied_influence,
        corrupted: applied_influence > tuning.corruption_significance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        AgentRole, DecisionStyle, ImpactVector, PriorityDimension, PriorityWeight,
    };

    fn mayor(resistance: Option<u8>) -> AgentPersonality {
        AgentPersonality {
            agent_id: "mayor".into(),
            name: "Mayor".into(),
            role: AgentRole::Mayor,
            department: None,
            decision_style: DecisionStyle::Cautious,
            priorities: vec![PriorityWeight {
                dimension: PriorityDimension::Political,
                weight: 1.0,
            }],
            risk_tolerance: 40,
            corruption_resistance: resistance,
            budget_sensitivity: 60,
        }
    }

    fn bribed_proposal(bribe: u64) -> Proposal {
        Proposal::new(
            "prop-lobby",
            "developer_group",
            "housing",
            "Fast-Track Rezoning",
            "Waive review for waterfront towers.",
            ImpactVector::new(-20, 25, 5),
            3,
        )
        .with_bribe(bribe)
    }

    fn opinion(score: f64) -> Opinion {
        Opinion {
            agent_id: "mayor".into(),
            score,
            accept: false,
        }
    }

    #[test]
    fn resistance_scales_down_applied_influence() {
        let tuning = ArbitrationTuning::default();
        // 100_000 / 50_000 = 2.0 raw; 70% resistance leaves 0.6 applied.
        let bid = bid(
            &bribed_proposal(100_000),
            &mayor(Some(70)),
            &opinion(1.0),
            &tuning,
        );
        assert!((bid.raw_influence - 2.0).abs() < 1e-9);
        assert!((bid.applied_influence - 0.6).abs() < 1e-9);
        assert!((bid.effective_score - 1.6).abs() < 1e-9);
        assert!(bid.corrupted);
    }

    #[test]
    fn influence_is_capped_at_the_configured_maximum() {
        let tuning = ArbitrationTuning::default();
        let bid = bid(
            &bribed_proposal(10_000_000),
            &mayor(Some(0)),
            &opinion(0.0),
            &tuning,
        );
        assert!((bid.raw_influence - tuning.max_influence).abs() < 1e-9);
    }

    #[test]
    fn undeclared_resistance_blocks_all_influence() {
        let tuning = ArbitrationTuning::default();
        let bid = bid(
            &bribed_proposal(1_000_000),
            &mayor(None),
            &opinion(2.5),
            &tuning,
        );
        assert_eq!(bid.applied_influence, 0.0);
        assert_eq!(bid.effective_score, 2.5);
        assert!(!bid.corrupted);
    }

    #[test]
    fn effective_score_is_monotonic_in_bribe_amount() {
        let tuning = ArbitrationTuning::default();
        let target = mayor(Some(70));
        let mut previous = f64::NEG_INFINITY;
        for bribe in [0_u64, 10_000, 50_000, 100_000, 250_000, 1_000_000] {
            let bid = bid(&bribed_proposal(bribe), &target, &opinion(1.0), &tuning);
            assert!(bid.effective_score >= previous);
            previous = bid.effective_score;
        }
    }

    #[test]
    fn small_bribes_stay_below_the_significance_threshold() {
        let tuning = ArbitrationTuning::default();
        let bid = bid(
            &bribed_proposal(10_000),
            &mayor(Some(70)),
            &opinion(0.0),
            &tuning,
        );
        // 0.2 raw * 0.3 = 0.06 applied, under the 0.25 significance mark.
        assert!(!bid.corrupted);
    }
}
