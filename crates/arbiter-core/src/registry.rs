//! Static catalog of agent personalities, validated once at session startup.
//!
//! A registry failure is a configuration error and fails the session before
//! any round opens; mid-round lookups can therefore never miss.

use std::collections::{BTreeMap, BTreeSet};

use contracts::{
    AgentPersonality, AgentRole, DecisionStyle, DepartmentConfig, PriorityDimension,
    PriorityWeight,
};

use crate::EngineError;

const PRIORITY_WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct PersonalityRegistry {
    agents: BTreeMap<String, AgentPersonality>,
    mayor_id: String,
}

impl PersonalityRegistry {
    pub fn from_config(
        personalities: &[AgentPersonality],
        known_departments: &BTreeSet<String>,
    ) -> Result<Self, EngineError> {
        if personalities.is_empty() {
            return Err(EngineError::InvalidConfig(
                "personality catalog is empty".to_string(),
            ));
        }

        let mut agents = BTreeMap::new();
        let mut mayor_id = None;

        for personality in personalities {
            validate_personality(personality, known_departments)?;

            if personality.role == AgentRole::Mayor {
                if mayor_id.is_some() {
                    return Err(EngineError::InvalidConfig(
                        "more than one mayor configured".to_string(),
                    ));
                }
                mayor_id = Some(personality.agent_id.clone());
            }

            if agents
                .insert(personality.agent_id.clone(), personality.clone())
                .is_some()
            {
                return Err(EngineError::InvalidConfig(format!(
                    "duplicate agent id {}",
                    personality.agent_id
                )));
            }
        }

        let mayor_id = mayor_id.ok_or_else(|| {
            EngineError::InvalidConfig("no mayor in personality catalog".to_string())
        })?;

        Ok(Self { agents, mayor_id })
    }

    pub fn get(&self, agent_id: &str) -> Result<&AgentPersonality, EngineError> {
        self.agents.get(agent_id).ok_or_else(|| EngineError::UnknownAgent {
            agent_id: agent_id.to_string(),
        })
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.agents.contains_key(agent_id)
    }

    pub fn mayor_id(&self) -> &str {
        &self.mayor_id
    }

    pub fn mayor(&self) -> &AgentPersonality {
        &self.agents[&self.mayor_id]
    }

    /// Every personality with a seat at the table: the Mayor, department
    /// heads, and civic delegates. Bad actors influence through bids, not
    /// votes.
    pub fn voters(&self) -> impl Iterator<Item = &AgentPersonality> {
        self.agents
            .values()
            .filter(|agent| agent.role != AgentRole::BadActor)
    }

    pub fn bad_actors(&self) -> impl Iterator<Item = &AgentPersonality> {
        self.agents
            .values()
            .filter(|agent| agent.role == AgentRole::BadActor)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentPersonality> {
        self.agents.values()
    }
}

fn validate_personality(
    personality: &AgentPersonality,
    known_departments: &BTreeSet<String>,
) -> Result<(), EngineError> {
    if personality.agent_id.trim().is_empty() {
        return Err(EngineError::InvalidConfig(
            "agent id must not be empty".to_string(),
        ));
    }

    if let Some(department) = &personality.department {
        if !known_departments.contains(department) {
            return Err(EngineError::InvalidConfig(format!(
                "agent {} references unknown department {}",
                personality.agent_id, department
            )));
        }
    }

    if personality.risk_tolerance > 100
        || personality.budget_sensitivity > 100
        || personality.corruption_resistance.is_some_and(|value| value > 100)
    {
        return Err(EngineError::InvalidConfig(format!(
            "agent {} has a scalar outside [0,100]",
            personality.agent_id
        )));
    }

    if personality.priorities.is_empty() {
        return Err(EngineError::InvalidConfig(format!(
            "agent {} has no priority dimensions",
            personality.agent_id
        )));
    }

    let mut seen = BTreeSet::new();
    let mut total = 0.0;
    for priority in &personality.priorities {
        if !(0.0..=1.0).contains(&priority.weight) {
            return Err(EngineError::InvalidConfig(format!(
                "agent {} has priority weight outside [0,1]",
                personality.agent_id
            )));
        }
        if !seen.insert(priority.dimension) {
            return Err(EngineError::InvalidConfig(format!(
                "agent {} repeats priority dimension {:?}",
                personality.agent_id, priority.dimension
            )));
        }
        total += priority.weight;
    }

    if (total - 1.0).abs() > PRIORITY_WEIGHT_TOLERANCE {
        return Err(EngineError::InvalidConfig(format!(
            "agent {} priority weights sum to {total:.4}, expected 1",
            personality.agent_id
        )));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Default city roster
// ---------------------------------------------------------------------------

pub fn default_departments() -> Vec<DepartmentConfig> {
    [
        ("energy", "Energy"),
        ("transportation", "Transportation"),
        ("housing", "Housing"),
        ("waste", "Waste"),
        ("water", "Water"),
        ("economic_development", "Economic Development"),
    ]
    .into_iter()
    .map(|(id, name)| DepartmentConfig {
        department_id: id.to_string(),
        name: name.to_string(),
        initial_score: 50,
    })
    .collect()
}

fn weights(entries: &[(PriorityDimension, f64)]) -> Vec<PriorityWeight> {
    entries
        .iter()
        .map(|(dimension, weight)| PriorityWeight {
            dimension: *dimension,
            weight: *weight,
        })
        .collect()
}

/// The stock roster: a pragmatic mayor, six department heads, a citizens'
/// delegate, and two bad actors working the other side of the table.
pub fn default_catalog() -> Vec<AgentPersonality> {
    use PriorityDimension::*;

    vec![
        AgentPersonality {
            agent_id: "mayor".to_string(),
            name: "Mayor Helen Ortiz".to_string(),
            role: AgentRole::Mayor,
            department: None,
            decision_style: DecisionStyle::Cautious,
            priorities: weights(&[
                (Political, 0.35),
                (Approval, 0.25),
                (Economic, 0.2),
                (Sustainability, 0.1),
                (Budget, 0.1),
            ]),
            risk_tolerance: 35,
            corruption_resistance: Some(60),
            budget_sensitivity: 70,
        },
        AgentPersonality {
            agent_id: "energy_chief".to_string(),
            name: "Dr. Ana Okafor".to_string(),
            role: AgentRole::DepartmentHead,
            department: Some("energy".to_string()),
            decision_style: DecisionStyle::Aggressive,
            priorities: weights(&[
                (Sustainability, 0.6),
                (Economic, 0.15),
                (Budget, 0.1),
                (Health, 0.1),
                (Political, 0.05),
            ]),
            risk_tolerance: 75,
            corruption_resistance: Some(85),
            budget_sensitivity: 50,
        },
        AgentPersonality {
            agent_id: "transport_chief".to_string(),
            name: "Luis Ferreira".to_string(),
            role: AgentRole::DepartmentHead,
            department: Some("transportation".to_string()),
            decision_style: DecisionStyle::Collaborative,
            priorities: weights(&[
                (Sustainability, 0.4),
                (Health, 0.2),
                (Approval, 0.15),
                (Economic, 0.15),
                (Political, 0.1),
            ]),
            risk_tolerance: 60,
            corruption_resistance: Some(75),
            budget_sensitivity: 55,
        },
        AgentPersonality {
            agent_id: "housing_chief".to_string(),
            name: "Dr. Maya Lindqvist".to_string(),
            role: AgentRole::DepartmentHead,
            department: Some("housing".to_string()),
            decision_style: DecisionStyle::Aggressive,
            priorities: weights(&[
                (Sustainability, 0.35),
                (Approval, 0.25),
                (Economic, 0.2),
                (Political, 0.2),
            ]),
            risk_tolerance: 80,
            corruption_resistance: Some(90),
            budget_sensitivity: 45,
        },
        AgentPersonality {
            agent_id: "waste_chief".to_string(),
            name: "Daniel Reyes".to_string(),
            role: AgentRole::DepartmentHead,
            department: Some("waste".to_string()),
            decision_style: DecisionStyle::Bureaucratic,
            priorities: weights(&[
                (Sustainability, 0.45),
                (Budget, 0.25),
                (Health, 0.2),
                (Economic, 0.1),
            ]),
            risk_tolerance: 55,
            corruption_resistance: Some(70),
            budget_sensitivity: 75,
        },
        AgentPersonality {
            agent_id: "water_chief".to_string(),
            name: "Ingrid Halvorsen".to_string(),
            role: AgentRole::DepartmentHead,
            department: Some("water".to_string()),
            decision_style: DecisionStyle::Cautious,
            priorities: weights(&[
                (Sustainability, 0.5),
                (Health, 0.25),
                (Budget, 0.15),
                (Economic, 0.1),
            ]),
            risk_tolerance: 45,
            corruption_resistance: Some(80),
            budget_sensitivity: 65,
        },
        AgentPersonality {
            agent_id: "econ_dev_chief".to_string(),
            name: "Priya Nair".to_string(),
            role: AgentRole::DepartmentHead,
            department: Some("economic_development".to_string()),
            decision_style: DecisionStyle::Collaborative,
            priorities: weights(&[
                (Economic, 0.4),
                (Sustainability, 0.2),
                (Political, 0.2),
                (Approval, 0.2),
            ]),
            risk_tolerance: 70,
            corruption_resistance: Some(55),
            budget_sensitivity: 40,
        },
        AgentPersonality {
            agent_id: "citizens_delegate".to_string(),
            name: "Citizens Assembly Delegate".to_string(),
            role: AgentRole::CivicDelegate,
            department: None,
            decision_style: DecisionStyle::Aggressive,
            priorities: weights(&[
                (Sustainability, 0.45),
                (Health, 0.25),
                (Approval, 0.15),
                (Political, 0.15),
            ]),
            risk_tolerance: 90,
            corruption_resistance: Some(95),
            budget_sensitivity: 30,
        },
        AgentPersonality {
            agent_id: "developer_group".to_string(),
            name: "Sterling Development Group".to_string(),
            role: AgentRole::BadActor,
            department: None,
            decision_style: DecisionStyle::Aggressive,
            priorities: weights(&[(Economic, 0.6), (Political, 0.3), (Sustainability, 0.1)]),
            risk_tolerance: 85,
            corruption_resistance: None,
            budget_sensitivity: 20,
        },
        AgentPersonality {
            agent_id: "fossil_fuel_lobby".to_string(),
            name: "Petrochemical Industry Council".to_string(),
            role: AgentRole::BadActor,
            department: None,
            decision_style: DecisionStyle::Aggressive,
            priorities: weights(&[(Economic, 0.7), (Political, 0.2), (Sustainability, 0.1)]),
            risk_tolerance: 80,
            corruption_resistance: None,
            budget_sensitivity: 15,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn departments() -> BTreeSet<String> {
        default_departments()
            .into_iter()
            .map(|d| d.department_id)
            .collect()
    }

    #[test]
    fn default_catalog_validates() {
        let registry =
            PersonalityRegistry::from_config(&default_catalog(), &departments()).expect("catalog");
        assert_eq!(registry.mayor_id(), "mayor");
        assert_eq!(registry.voters().count(), 8);
        assert_eq!(registry.bad_actors().count(), 2);
    }

    #[test]
    fn duplicate_mayor_is_a_config_error() {
        let mut catalog = default_catalog();
        let mut second = catalog[0].clone();
        second.agent_id = "mayor_2".to_string();
        catalog.push(second);
        let err = PersonalityRegistry::from_config(&catalog, &departments()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn unknown_department_reference_fails_startup() {
        let mut catalog = default_catalog();
        catalog[1].department = Some("parks".to_string());
        let err = PersonalityRegistry::from_config(&catalog, &departments()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn skewed_priority_weights_fail_startup() {
        let mut catalog = default_catalog();
        catalog[1].priorities[0].weight = 0.9;
        let err = PersonalityRegistry::from_config(&catalog, &departments()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn missing_agent_lookup_is_typed() {
        let registry =
            PersonalityRegistry::from_config(&default_catalog(), &departments()).expect("catalog");
        let err = registry.get("nobody").unwrap_err();
        assert!(matches!(err, EngineError::UnknownAgent { .. }));
    }
}
