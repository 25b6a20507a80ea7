#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum StreamMessageKind {
    SessionState,
    EventAppended,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
struct StreamMessage {
    schema_version: String,
    session_id: String,
    kind: StreamMessageKind,
    payload: serde_json::Value,
}

impl StreamMessage {
    fn session_state(state: &RoundState) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            session_id: state.session_id.clone(),
            kind: StreamMessageKind::SessionState,
            payload: serde_json::to_value(state).unwrap_or_else(|_| serde_json::json!({})),
        }
    }

    fn event_appended(event: &Event) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            session_id: event.session_id.clone(),
            kind: StreamMessageKind::EventAppended,
            payload: serde_json::to_value(event).unwrap_or_else(|_| serde_json::json!({})),
        }
    }

    fn warning(session_id: &str, message: String) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            session_id: session_id.to_string(),
            kind: StreamMessageKind::Warning,
            payload: serde_json::json!({ "message": message }),
        }
    }
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}

fn apply_cors_headers(headers: &mut axum::http::HeaderMap) {
    headers.insert(
        HeaderName::from_static("access-control-allow-origin"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-max-age"),
        HeaderValue::from_static("3600"),
    );
}

fn default_sqlite_path() -> String {
    std::env::var("ARBITER_SQLITE_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string())
}

fn paginate(
    total: usize,
    cursor: Option<usize>,
    page_size: Option<usize>,
) -> Result<(usize, usize, Option<usize>), HttpApiError> {
    let start = cursor.unwrap_or(0);
    if start > total {
        return Err(HttpApiError::invalid_query(
            "cursor is out of bounds",
            Some(format!("cursor={start} total={total}")),
        ));
    }

    let size = page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .max(1)
        .min(MAX_PAGE_SIZE);
    let end = start.saturating_add(size).min(total);
    let next_cursor = if end < total { Some(end) } else { None };

    Ok((start, end, next_cursor))
}

fn parse_event_type_filter(
    requested_types: &[String],
) -> Result<Option<HashSet<EventType>>, HttpApiError> {
    if requested_types.is_empty() {
        return Ok(None);
    }

    let mut filter = HashSet::new();

    for value in requested_types {
        let normalized = value.trim().to_lowercase();
        let event_type = match normalized.as_str() {
            "round_started" | "roundstarted" => EventType::RoundStarted,
            "proposal_submitted" | "proposalsubmitted" => EventType::ProposalSubmitted,
            "bad_actor_action" | "badactoraction" => EventType::BadActorAction,
            "proposal_decision" | "proposaldecision" => EventType::ProposalDecision,
            "sustainability_change" | "sustainabilitychange" => EventType::SustainabilityChange,
            "trust_changed" | "trustchanged" => EventType::TrustChanged,
            "game_state_update" | "gamestateupdate" => EventType::GameStateUpdate,
            "game_ended" | "gameended" => EventType::GameEnded,
            other => {
                return Err(HttpApiError::invalid_query(
                    "unknown event type in filter",
                    Some(format!("event_type={other}")),
                ));
            }
        };
        filter.insert(event_type);
    }

    Ok(Some(filter))
}
