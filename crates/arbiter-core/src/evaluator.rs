//! Proposal scoring against a single personality.
//!
//! `evaluate` is a pure function: `(personality, proposal, context)` plus an
//! explicit seed always produce the same opinion. The seed feeds only the
//! configured score jitter; the accept decision and the core score never
//! touch it, so replay tests can pin outcomes exactly.

use contracts::{
    AgentPersonality, ArbitrationTuning, DecisionStyle, Opinion, PriorityDimension, Proposal,
};

/// Round-scoped inputs shared by every evaluation in a round.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext {
    pub turn: u32,
    /// The Mayor's current confidence in the player; scales the approval axis.
    pub mayor_trust: f64,
    /// Raised acceptance thresholds while city approval is underwater.
    pub resistance_active: bool,
    pub seed: u64,
}

pub fn evaluate(
    personality: &AgentPersonality,
    proposal: &Proposal,
    ctx: &EvaluationContext,
    tuning: &ArbitrationTuning,
) -> Opinion {
    let raw = raw_score(personality, proposal, ctx);
    let styled = style_modifier(personality.decision_style)(raw, personality, proposal, tuning);
    let threshold = acceptance_threshold(personality, ctx.resistance_active, tuning);

    let jitter = jitter_offset(
        ctx.seed,
        ctx.turn,
        &personality.agent_id,
        &proposal.proposal_id,
        tuning.evaluation_jitter,
    );

    Opinion {
        agent_id: personality.agent_id.clone(),
        score: styled + jitter,
        accept: raw > threshold,
    }
}

/// Weighted sum of the proposal's impact vector over the personality's
/// priority dimensions.
fn raw_score(
    personality: &AgentPersonality,
    proposal: &Proposal,
    ctx: &EvaluationContext,
) -> f64 {
    personality
        .priorities
        .iter()
        .map(|priority| priority.weight * dimension_impact(priority.dimension, personality, proposal, ctx))
        .sum()
}

fn dimension_impact(
    dimension: PriorityDimension,
    personality: &AgentPersonality,
    proposal: &Proposal,
    ctx: &EvaluationContext,
) -> f64 {
    let impact = &proposal.impact;
    match dimension {
        PriorityDimension::Sustainability => f64::from(impact.sustainability),
        PriorityDimension::Economic => f64::from(impact.economic),
        PriorityDimension::Political => f64::from(impact.political),
        // Public-health benefit tracks the environmental axis of a proposal.
        PriorityDimension::Health => f64::from(impact.sustainability),
        PriorityDimension::Budget => {
            -f64::from(impact.economic.abs()) * f64::from(personality.budget_sensitivity) / 100.0
        }
        PriorityDimension::Approval => f64::from(impact.political) * ctx.mayor_trust / 100.0,
    }
}

type StyleModifier = fn(f64, &AgentPersonality, &Proposal, &ArbitrationTuning) -> f64;

/// Decision styles dispatch through a table of pure modifier functions
/// rather than a type hierarchy.
fn style_modifier(style: DecisionStyle) -> StyleModifier {
    match style {
        DecisionStyle::Aggressive => aggressive_style,
        DecisionStyle::Cautious => cautious_style,
        DecisionStyle::Collaborative => collaborative_style,
        DecisionStyle::Bureaucratic => bureaucratic_style,
    }
}

/// Bold proposals get amplified; negative ones are left alone.
fn aggressive_style(
    raw: f64,
    _personality: &AgentPersonality,
    _proposal: &Proposal,
    tuning: &ArbitrationTuning,
) -> f64 {
    if raw > 0.0 {
        raw * tuning.aggressive_multiplier
    } else {
        raw
    }
}

/// Penalty proportional to the proposal's uncertainty.
fn cautious_style(
    raw: f64,
    _personality: &AgentPersonality,
    proposal: &Proposal,
    tuning: &ArbitrationTuning,
) -> f64 {
    let variance = proposal
        .impact
        .variance
        .map(f64::from)
        .unwrap_or(tuning.default_variance);
    raw - tuning.cautious_variance_penalty * variance
}

/// Cross-department proposals are favored by evaluators who run a department
/// of their own.
fn collaborative_style(
    raw: f64,
    personality: &AgentPersonality,
    proposal: &Proposal,
    tuning: &ArbitrationTuning,
) -> f64 {
    match personality.department.as_deref() {
        Some(own) if own != proposal.target_department => raw + tuning.collaborative_bonus,
        _ => raw,
    }
}

/// Flat penalty on deficit spending, scaled by budget sensitivity.
fn bureaucratic_style(
    raw: f64,
    personality: &AgentPersonality,
    proposal: &Proposal,
    tuning: &ArbitrationTuning,
) -> f64 {
    if proposal.impact.economic < 0 {
        raw - tuning.bureaucratic_penalty * f64::from(personality.budget_sensitivity) / 100.0
    } else {
        raw
    }
}

/// Higher risk tolerance lowers the bar; active resistance raises it for
/// everyone.
pub fn acceptance_threshold(
    personality: &AgentPersonality,
    resistance_active: bool,
    tuning: &ArbitrationTuning,
) -> f64 {
    let base = tuning.acceptance_base * (1.0 - f64::from(personality.risk_tolerance) / 100.0);
    if resistance_active {
        base + tuning.resistance_penalty
    } else {
        base
    }
}

/// SplitMix64-style mixing of `(seed, turn, agent, proposal)` into a score
/// offset in `[-amplitude, amplitude]`.
fn jitter_offset(seed: u64, turn: u32, agent_id: &str, proposal_id: &str, amplitude: f64) -> f64 {
    if amplitude == 0.0 {
        return 0.0;
    }
    let mut h: u64 = seed;
    h = h.wrapping_add(u64::from(turn).wrapping_mul(0x9e37_79b9_7f4a_7c15));
    for b in agent_id.bytes().chain(proposal_id.bytes()) {
        h = h.wrapping_add(u64::from(b));
        h = h.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    }
    h = (h ^ (h >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    h ^= h >> 31;

    let unit = (h as f64) / (u64::MAX as f64);
    (unit * 2.0 - 1.0) * amplitude
}
