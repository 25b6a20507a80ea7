#[derive(Debug)]
pub enum ServerError {
    Io(std::io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "server io error: {err}"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug)]
struct HttpApiError {
    status: StatusCode,
    error: ApiError,
}

impl HttpApiError {
    fn session_not_found(requested_session_id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: ApiError::new(
                ErrorCode::SessionNotFound,
                "session_id does not match an active session",
                Some(format!("requested_session_id={requested_session_id}")),
            ),
        }
    }

    fn invalid_query(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: ApiError::new(ErrorCode::InvalidConfig, message, details),
        }
    }

    fn internal(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::new(ErrorCode::InternalError, message, details),
        }
    }

    fn from_engine(err: arbiter_core::EngineError) -> Self {
        use arbiter_core::EngineError;

        let status = match &err {
            EngineError::InvalidDepartment { .. } | EngineError::InvalidConfig(_) => {
                StatusCode::BAD_REQUEST
            }
            EngineError::RoundNotAcceptingProposals { .. }
            | EngineError::DuplicateProposal { .. }
            | EngineError::SessionOver => StatusCode::CONFLICT,
            EngineError::UnknownAgent { .. } => StatusCode::NOT_FOUND,
        };

        Self {
            status,
            error: ApiError::new(err.error_code(), err.to_string(), None),
        }
    }

    fn from_persistence(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotAttached => {
                Self::invalid_query("persistence store is not attached", None)
            }
            PersistenceError::SessionAlreadyExists(session_id) => Self {
                status: StatusCode::CONFLICT,
                error: ApiError::new(
                    ErrorCode::SessionStateConflict,
                    "session_id already exists; pass replace_existing=true to replace",
                    Some(format!("session_id={session_id}")),
                ),
            },
            other => Self::internal("persistence operation failed", Some(other.to_string())),
        }
    }
}

impl IntoResponse for HttpApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}
