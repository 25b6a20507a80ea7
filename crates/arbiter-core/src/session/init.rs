use super::*;

use crate::registry;
use crate::EngineError;

impl Session {
    /// Validate the configuration and open round 1. Registry problems are
    /// fatal here so they can never surface mid-round.
    pub fn new(config: SessionConfig) -> Result<Self, EngineError> {
        if config.max_turns == 0 {
            return Err(EngineError::InvalidConfig(
                "max_turns must be at least 1".to_string(),
            ));
        }
        if config.player_id.trim().is_empty() {
            return Err(EngineError::InvalidConfig(
                "player_id must not be empty".to_string(),
            ));
        }

        let department_configs = if config.departments.is_empty() {
            registry::default_departments()
        } else {
            config.departments.clone()
        };

        let mut departments = BTreeMap::new();
        for department in &department_configs {
            if department.department_id.trim().is_empty() {
                return Err(EngineError::InvalidConfig(
                    "department id must not be empty".to_string(),
                ));
            }
            if department.initial_score > 100 {
                return Err(EngineError::InvalidConfig(format!(
                    "department {} initial score exceeds 100",
                    department.department_id
                )));
            }
            if departments
                .insert(
                    department.department_id.clone(),
                    DepartmentState::from_config(department),
                )
                .is_some()
            {
                return Err(EngineError::InvalidConfig(format!(
                    "duplicate department id {}",
                    department.department_id
                )));
            }
        }

        let known_departments: BTreeSet<String> = departments.keys().cloned().collect();

        let personalities = if config.personalities.is_empty() {
            registry::default_catalog()
        } else {
            config.personalities.clone()
        };
        if personalities
            .iter()
            .any(|agent| agent.agent_id == config.player_id)
        {
            return Err(EngineError::InvalidConfig(
                "player_id collides with a personality id".to_string(),
            ));
        }

        let registry = PersonalityRegistry::from_config(&personalities, &known_departments)?;

        let mut trust = TrustLedger::new(config.tuning.trust_baseline);
        trust.register(&config.player_id);
        for agent in registry.iter() {
            trust.register(&agent.agent_id);
        }

        let worker_threads = usize::from(config.evaluation_worker_threads);
        let evaluation_pool = if worker_threads > 1 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(worker_threads)
                .build()
                .ok()
        } else {
            None
        };

        let bad_actor_influence = config
            .tuning
            .bad_actor_influence_baseline
            .clamp(0.0, 100.0);

        let mut session = Self {
            config,
            registry,
            departments,
            trust,
            phase: ArbiterPhase::Applied,
            turn_number: 1,
            pending: Vec::new(),
            seen_proposal_ids: BTreeSet::new(),
            proposal_history: Vec::new(),
            resistance_active: false,
            bad_actor_influence,
            win_streak: 0,
            is_game_over: false,
            outcome: None,
            decision_log: Vec::new(),
            event_log: Vec::new(),
            sequence_in_turn: 0,
            evaluation_pool,
        };
        session.open_round();
        Ok(session)
    }
}
