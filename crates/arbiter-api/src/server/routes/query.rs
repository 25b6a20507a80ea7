async fn get_state(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RoundState>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_session(&inner, &session_id)?;
    Ok(Json(engine.state()))
}

#[derive(Debug, Deserialize)]
struct ListSessionsQuery {
    page_size: Option<usize>,
    sqlite_path: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListSessionsResponse {
    schema_version: String,
    active_session_ids: Vec<String>,
    sessions: Vec<crate::PersistedSessionSummary>,
}

async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<ListSessionsQuery>,
) -> Result<Json<ListSessionsResponse>, HttpApiError> {
    let page_size = query.page_size.unwrap_or(200).clamp(1, MAX_PAGE_SIZE);
    let sqlite_path = query
        .sqlite_path
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(default_sqlite_path);

    let active_session_ids = {
        let inner = state.inner.lock().await;
        inner.engines.keys().cloned().collect()
    };

    let store = crate::persistence::SqliteLedgerStore::open(sqlite_path)
        .map_err(HttpApiError::from_persistence)?;
    let sessions = store
        .list_sessions(page_size)
        .map_err(HttpApiError::from_persistence)?;

    Ok(Json(ListSessionsResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        active_session_ids,
        sessions,
    }))
}

#[derive(Debug, Serialize)]
struct SuggestionsResponse {
    schema_version: String,
    session_id: String,
    turn: u32,
    proposals: Vec<Proposal>,
}

async fn get_suggestions(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SuggestionsResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_session(&inner, &session_id)?;
    Ok(Json(SuggestionsResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        session_id: session_id.clone(),
        turn: engine.state().turn_number,
        proposals: engine.suggestions(),
    }))
}

#[derive(Debug, Deserialize, Default)]
struct PaginationQuery {
    cursor: Option<usize>,
    page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
struct DecisionPage {
    schema_version: String,
    session_id: String,
    cursor: usize,
    next_cursor: Option<usize>,
    decisions: Vec<Decision>,
}

async fn get_decisions(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<DecisionPage>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_session(&inner, &session_id)?;
    let decisions = engine.decisions();
    let (start, end, next_cursor) = paginate(decisions.len(), query.cursor, query.page_size)?;

    Ok(Json(DecisionPage {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        session_id: session_id.clone(),
        cursor: start,
        next_cursor,
        decisions: decisions[start..end].to_vec(),
    }))
}

#[derive(Debug, Deserialize, Default)]
struct EventsQuery {
    cursor: Option<usize>,
    page_size: Option<usize>,
    /// Comma-separated event type names.
    types: Option<String>,
}

#[derive(Debug, Serialize)]
struct EventPage {
    schema_version: String,
    session_id: String,
    cursor: usize,
    next_cursor: Option<usize>,
    events: Vec<Event>,
}

async fn get_events(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventPage>, HttpApiError> {
    let requested_types: Vec<String> = query
        .types
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
        .collect();
    let filter = parse_event_type_filter(&requested_types)?;

    let inner = state.inner.lock().await;
    let engine = require_session(&inner, &session_id)?;

    let filtered: Vec<&Event> = engine
        .events()
        .iter()
        .filter(|event| {
            filter
                .as_ref()
                .map_or(true, |types| types.contains(&event.event_type))
        })
        .collect();
    let (start, end, next_cursor) = paginate(filtered.len(), query.cursor, query.page_size)?;

    Ok(Json(EventPage {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        session_id: session_id.clone(),
        cursor: start,
        next_cursor,
        events: filtered[start..end].iter().map(|event| (*event).clone()).collect(),
    }))
}
