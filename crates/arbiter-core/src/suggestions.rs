//! Deterministic policy suggestion catalog.
//!
//! The engine validates shape, never authorship: these templates are the
//! whole extent of its text generation. External proposal generators can
//! replace them entirely.

use contracts::{ImpactVector, Proposal};

#[derive(Debug, Clone, Copy)]
pub struct SuggestionTemplate {
    pub department_id: &'static str,
    /// City situation the template suits best; carried for callers that
    /// want to rank suggestions, ignored by arbitration.
    pub situation: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub sustainability: i32,
    pub economic: i32,
    pub political: i32,
}

pub const CATALOG: &[SuggestionTemplate] = &[
    SuggestionTemplate {
        department_id: "energy",
        situation: "low_sustainability",
        title: "Emergency Renewable Energy Initiative",
        description: "Fast-track solar installation on all public buildings within six months.",
        sustainability: 25,
        economic: -20,
        political: 15,
    },
    SuggestionTemplate {
        department_id: "energy",
        situation: "low_budget",
        title: "Energy Efficiency Retrofits",
        description: "Low-cost efficiency improvements to cut city utility bills.",
        sustainability: 15,
        economic: 10,
        political: 5,
    },
    SuggestionTemplate {
        department_id: "energy",
        situation: "normal",
        title: "Smart Grid Modernization",
        description: "Upgrade the electrical grid with smart monitoring and renewable integration.",
        sustainability: 20,
        economic: -15,
        political: 10,
    },
    SuggestionTemplate {
        department_id: "transportation",
        situation: "low_sustainability",
        title: "Electric Bus Fleet Conversion",
        description: "Replace every diesel bus with an electric vehicle over eighteen months.",
        sustainability: 30,
        economic: -25,
        political: 20,
    },
    SuggestionTemplate {
        department_id: "transportation",
        situation: "low_approval",
        title: "Free Public Transit Month",
        description: "One month of free rides to rebuild ridership habits.",
        sustainability: 10,
        economic: -15,
        political: 25,
    },
    SuggestionTemplate {
        department_id: "transportation",
        situation: "normal",
        title: "Bike Lane Expansion Project",
        description: "Add twenty miles of protected bike lanes across the city.",
        sustainability: 15,
        economic: -10,
        political: 5,
    },
    SuggestionTemplate {
        department_id: "housing",
        situation: "low_approval",
        title: "Affordable Housing Guarantee",
        description: "Require thirty percent affordable units in every new development.",
        sustainability: 5,
        economic: -10,
        political: 30,
    },
    SuggestionTemplate {
        department_id: "housing",
        situation: "normal",
        title: "Green Building Standards",
        description: "Require certified sustainable construction for all new permits.",
        sustainability: 25,
        economic: -15,
        political: 10,
    },
    SuggestionTemplate {
        department_id: "waste",
        situation: "normal",
        title: "Citywide Composting Program",
        description: "Curbside compost pickup plus neighborhood compost hubs.",
        sustainability: 10,
        economic: -5,
        political: 8,
    },
    SuggestionTemplate {
        department_id: "waste",
        situation: "low_budget",
        title: "Waste Reduction Grants",
        description: "Small grants for businesses that cut single-use plastics.",
        sustainability: 8,
        economic: 5,
        political: 4,
    },
    SuggestionTemplate {
        department_id: "water",
        situation: "normal",
        title: "Stormwater Green Infrastructure",
        description: "Bioswales and rain gardens to reduce runoff and improve quality.",
        sustainability: 12,
        economic: -8,
        political: 6,
    },
    SuggestionTemplate {
        department_id: "water",
        situation: "low_budget",
        title: "Water Use Efficiency Rebates",
        description: "Rebates for low-flow fixtures and drought-resistant landscaping.",
        sustainability: 8,
        economic: 3,
        political: 5,
    },
    SuggestionTemplate {
        department_id: "economic_development",
        situation: "normal",
        title: "Green Jobs Training Initiative",
        description: "Workforce development programs for clean-technology trades.",
        sustainability: 7,
        economic: 10,
        political: 6,
    },
    SuggestionTemplate {
        department_id: "economic_development",
        situation: "low_approval",
        title: "Small Business Support Fund",
        description: "Microgrants and counseling for local small businesses.",
        sustainability: 2,
        economic: 12,
        political: 20,
    },
];

/// Materialize every catalog template whose department exists in the
/// session as a well-formed proposal for the given turn.
pub fn proposals_for_turn<'a>(
    known_departments: impl Fn(&str) -> bool + 'a,
    proposer_id: &'a str,
    turn: u32,
) -> Vec<Proposal> {
    CATALOG
        .iter()
        .filter(|template| known_departments(template.department_id))
        .enumerate()
        .map(|(index, template)| {
            Proposal::new(
                format!("sugg_t{}_{}_{}", turn, template.department_id, index),
                proposer_id,
                template.department_id,
                template.title,
                template.description,
                ImpactVector::new(template.sustainability, template.economic, template.political),
                turn,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_are_deterministic_per_turn() {
        let a = proposals_for_turn(|_| true, "player", 3);
        let b = proposals_for_turn(|_| true, "player", 3);
        assert_eq!(a, b);
        assert_eq!(a.len(), CATALOG.len());
    }

    #[test]
    fn unknown_departments_are_filtered_out() {
        let only_energy = proposals_for_turn(|id| id == "energy", "player", 1);
        assert!(!only_energy.is_empty());
        assert!(only_energy.iter().all(|p| p.target_department == "energy"));
    }

    #[test]
    fn suggested_proposals_carry_no_bribe() {
        assert!(proposals_for_turn(|_| true, "player", 1)
            .iter()
            .all(|p| p.bribe_amount == 0));
    }
}
