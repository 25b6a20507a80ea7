#[derive(Clone)]
struct AppState {
    inner: std::sync::Arc<Mutex<ServerInner>>,
    stream_tx: broadcast::Sender<StreamMessage>,
}

impl AppState {
    fn new() -> Self {
        let (stream_tx, _) = broadcast::channel(4096);
        Self {
            inner: std::sync::Arc::new(Mutex::new(ServerInner::default())),
            stream_tx,
        }
    }
}

/// Sessions are fully independent; the map is the only shared state and it
/// lives behind a single mutex, so each request observes a session either
/// before or after a round, never mid-resolution.
#[derive(Debug, Default)]
struct ServerInner {
    engines: BTreeMap<String, EngineApi>,
    emitted_event_counts: BTreeMap<String, usize>,
}

fn require_session<'a>(
    inner: &'a ServerInner,
    session_id: &str,
) -> Result<&'a EngineApi, HttpApiError> {
    inner
        .engines
        .get(session_id)
        .ok_or_else(|| HttpApiError::session_not_found(session_id))
}

fn require_session_mut<'a>(
    inner: &'a mut ServerInner,
    session_id: &str,
) -> Result<&'a mut EngineApi, HttpApiError> {
    inner
        .engines
        .get_mut(session_id)
        .ok_or_else(|| HttpApiError::session_not_found(session_id))
}

/// Drain events the stream has not seen yet and close with a fresh state
/// snapshot. Persistence warnings ride along so clients learn about a
/// degraded provenance log.
fn collect_delta_messages(inner: &mut ServerInner, session_id: &str) -> Vec<StreamMessage> {
    let mut messages = Vec::new();

    let Some(engine) = inner.engines.get(session_id) else {
        return messages;
    };

    let emitted = inner
        .emitted_event_counts
        .entry(session_id.to_string())
        .or_insert(0);
    for event in &engine.events()[*emitted..] {
        messages.push(StreamMessage::event_appended(event));
    }
    *emitted = engine.events().len();

    messages.push(StreamMessage::session_state(&engine.state()));

    if let Some(last_error) = engine.last_persistence_error() {
        messages.push(StreamMessage::warning(session_id, last_error.to_string()));
    }

    messages
}

fn broadcast_messages(state: &AppState, messages: Vec<StreamMessage>) {
    for message in messages {
        let _ = state.stream_tx.send(message);
    }
}
