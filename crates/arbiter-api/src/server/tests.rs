use super::*;

use contracts::ImpactVector;

fn engine_with_one_round() -> EngineApi {
    let config = SessionConfig {
        session_id: "server_test".to_string(),
        ..SessionConfig::default()
    };
    let mut engine = EngineApi::from_config(config).expect("engine");
    let proposal = Proposal::new(
        "prop-1",
        "player",
        "energy",
        "Smart Grid Modernization",
        "Upgrade the grid with smart monitoring.",
        ImpactVector::new(20, -15, 10),
        1,
    );
    engine.submit_proposal(proposal).expect("submit");
    engine.resolve_round().expect("resolve");
    engine
}

#[test]
fn delta_collection_emits_each_event_exactly_once() {
    let mut inner = ServerInner::default();
    inner
        .engines
        .insert("server_test".to_string(), engine_with_one_round());

    let first = collect_delta_messages(&mut inner, "server_test");
    let event_count = first
        .iter()
        .filter(|message| message.kind == StreamMessageKind::EventAppended)
        .count();
    assert!(event_count > 0);

    // Nothing new happened: only the state snapshot should repeat.
    let second = collect_delta_messages(&mut inner, "server_test");
    assert!(second
        .iter()
        .all(|message| message.kind != StreamMessageKind::EventAppended));
}

#[test]
fn pagination_enforces_max_bounds() {
    let (start, end, next_cursor) = paginate(100, Some(10), Some(20)).expect("page should work");
    assert_eq!(start, 10);
    assert_eq!(end, 30);
    assert_eq!(next_cursor, Some(30));

    let out_of_range = paginate(5, Some(10), Some(1));
    assert!(out_of_range.is_err());
}

#[test]
fn event_type_filter_accepts_wire_names_and_rejects_garbage() {
    let filter = parse_event_type_filter(&[
        "proposal_decision".to_string(),
        "RoundStarted".to_string(),
    ])
    .expect("filter")
    .expect("non-empty");
    assert!(filter.contains(&EventType::ProposalDecision));
    assert!(filter.contains(&EventType::RoundStarted));

    assert!(parse_event_type_filter(&["mystery_event".to_string()]).is_err());
}

#[test]
fn engine_rejections_map_to_conflict_statuses() {
    let err = HttpApiError::from_engine(arbiter_core::EngineError::DuplicateProposal {
        proposal_id: "prop-1".to_string(),
    });
    assert_eq!(err.status, StatusCode::CONFLICT);
    assert_eq!(err.error.error_code, ErrorCode::DuplicateProposal);

    let err = HttpApiError::from_engine(arbiter_core::EngineError::InvalidDepartment {
        department_id: "parks".to_string(),
    });
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.error.error_code, ErrorCode::InvalidDepartment);
}
