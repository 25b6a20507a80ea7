#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreateSessionRequest {
    Config(SessionConfig),
    WithOptions(CreateSessionOptions),
}

#[derive(Debug, Deserialize)]
struct CreateSessionOptions {
    config: SessionConfig,
    sqlite_path: Option<String>,
    replace_existing: Option<bool>,
}

#[derive(Debug, Serialize)]
struct CreateSessionResponse {
    schema_version: String,
    session_id: String,
    replaced_existing_session: bool,
    state: RoundState,
}

async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, HttpApiError> {
    let (config, sqlite_path, replace_existing) = match request {
        CreateSessionRequest::Config(config) => (config, Some(default_sqlite_path()), true),
        CreateSessionRequest::WithOptions(options) => (
            options.config,
            Some(
                options
                    .sqlite_path
                    .filter(|path| !path.trim().is_empty())
                    .unwrap_or_else(default_sqlite_path),
            ),
            options.replace_existing.unwrap_or(true),
        ),
    };

    let (response, messages) = {
        let mut inner = state.inner.lock().await;
        let session_id = config.session_id.clone();

        if inner.engines.contains_key(&session_id) && !replace_existing {
            return Err(HttpApiError::from_persistence(
                PersistenceError::SessionAlreadyExists(session_id),
            ));
        }

        let mut engine = EngineApi::from_config(config).map_err(HttpApiError::from_engine)?;
        if let Some(path) = sqlite_path {
            engine
                .attach_sqlite_store(path)
                .map_err(HttpApiError::from_persistence)?;
            engine
                .initialize_session_storage(replace_existing)
                .map_err(HttpApiError::from_persistence)?;
        }

        let replaced_existing_session = inner
            .engines
            .insert(session_id.clone(), engine)
            .is_some();
        inner.emitted_event_counts.insert(session_id.clone(), 0);

        let messages = collect_delta_messages(&mut inner, &session_id);
        let engine = require_session(&inner, &session_id)?;
        let response = CreateSessionResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            session_id,
            replaced_existing_session,
            state: engine.state(),
        };
        (response, messages)
    };

    broadcast_messages(&state, messages);
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct SubmitProposalResponse {
    schema_version: String,
    session_id: String,
    proposal_id: String,
    accepted: bool,
    state: RoundState,
}

async fn submit_proposal(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    Json(proposal): Json<Proposal>,
) -> Result<Json<SubmitProposalResponse>, HttpApiError> {
    let proposal_id = proposal.proposal_id.clone();

    let (response, messages) = {
        let mut inner = state.inner.lock().await;
        let engine = require_session_mut(&mut inner, &session_id)?;
        engine
            .submit_proposal(proposal)
            .map_err(HttpApiError::from_engine)?;

        let response = SubmitProposalResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            session_id: session_id.clone(),
            proposal_id,
            accepted: true,
            state: engine.state(),
        };
        let messages = collect_delta_messages(&mut inner, &session_id);
        (response, messages)
    };

    broadcast_messages(&state, messages);
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ResolveRoundResponse {
    schema_version: String,
    session_id: String,
    decision: Decision,
    state: RoundState,
}

async fn resolve_round(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ResolveRoundResponse>, HttpApiError> {
    let (response, messages) = {
        let mut inner = state.inner.lock().await;
        let engine = require_session_mut(&mut inner, &session_id)?;
        let (decision, round_state) = engine
            .resolve_round()
            .map_err(HttpApiError::from_engine)?;

        let response = ResolveRoundResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            session_id: session_id.clone(),
            decision,
            state: round_state,
        };
        let messages = collect_delta_messages(&mut inner, &session_id);
        (response, messages)
    };

    broadcast_messages(&state, messages);
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct AbortRoundResponse {
    schema_version: String,
    session_id: String,
    state: RoundState,
}

async fn abort_round(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AbortRoundResponse>, HttpApiError> {
    let (response, messages) = {
        let mut inner = state.inner.lock().await;
        let engine = require_session_mut(&mut inner, &session_id)?;
        engine.abort_round().map_err(HttpApiError::from_engine)?;

        let response = AbortRoundResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            session_id: session_id.clone(),
            state: engine.state(),
        };
        let messages = collect_delta_messages(&mut inner, &session_id);
        (response, messages)
    };

    broadcast_messages(&state, messages);
    Ok(Json(response))
}
