//! Department score application and city index aggregation.

use std::collections::BTreeMap;

use contracts::DepartmentConfig;

/// Live twin of `DepartmentConfig`: the only mutable field is the score,
/// and only a finalized decision moves it.
#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentState {
    pub department_id: String,
    pub name: String,
    pub sustainability_score: f64,
}

impl DepartmentState {
    pub fn from_config(config: &DepartmentConfig) -> Self {
        Self {
            department_id: config.department_id.clone(),
            name: config.name.clone(),
            sustainability_score: f64::from(config.initial_score.min(100)),
        }
    }
}

/// Apply a decision's department deltas, clamping each score to [0,100].
/// Unknown department ids are ignored; submission validation already
/// guarantees they cannot appear in a finalized decision.
pub fn apply_deltas(
    departments: &mut BTreeMap<String, DepartmentState>,
    deltas: &BTreeMap<String, i32>,
) {
    for (department_id, delta) in deltas {
        if let Some(department) = departments.get_mut(department_id) {
            department.sustainability_score =
                (department.sustainability_score + f64::from(*delta)).clamp(0.0, 100.0);
        }
    }
}

/// Mean of all department scores, recomputed on every read so the index can
/// never drift from its inputs.
pub fn city_index(departments: &BTreeMap<String, DepartmentState>) -> f64 {
    if departments.is_empty() {
        return 0.0;
    }
    let total: f64 = departments
        .values()
        .map(|department| department.sustainability_score)
        .sum();
    total / departments.len() as f64
}
