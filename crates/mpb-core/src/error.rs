/// Failure kinds surfaced by publishing operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Noop,
    Storage,
}

impl ErrorKind {
    /// Micropub error code for the wire response.
    pub fn micropub_code(&self) -> &'static str {
        match self {
            Self::Validation | Self::NotFound | Self::Conflict | Self::Noop => "invalid_request",
            Self::Storage => "server_error",
        }
    }

    /// HTTP status a transport should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation | Self::NotFound | Self::Conflict | Self::Noop => 400,
            Self::Storage => 500,
        }
    }
}

/// Every orchestrator failure carries one of these. Enrichment failures
/// (title fetch, photo upload) never become a `PublishError`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Noop(String),

    #[error("{0}")]
    Storage(String),
}

impl PublishError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Noop(_) => ErrorKind::Noop,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Reason string, identical to the `Display` output.
    pub fn reason(&self) -> &str {
        match self {
            Self::Validation(reason)
            | Self::NotFound(reason)
            | Self::Conflict(reason)
            | Self::Noop(reason)
            | Self::Storage(reason) => reason,
        }
    }

    pub fn nothing_to_add() -> Self {
        Self::Validation("nothing to add".into())
    }

    pub fn invalid_url() -> Self {
        Self::Validation("invalid url".into())
    }

    pub fn unparsable_file() -> Self {
        Self::Validation("could not parse file".into())
    }

    pub fn unparsable_data() -> Self {
        Self::Validation("could not parse data".into())
    }

    pub fn file_exists() -> Self {
        Self::Conflict("file exists".into())
    }

    pub fn file_missing() -> Self {
        Self::NotFound("file does not exist".into())
    }

    pub fn nothing_to_update() -> Self {
        Self::Noop("nothing to update".into())
    }

    pub fn cannot_update() -> Self {
        Self::Conflict("file cannot be updated".into())
    }

    pub fn cannot_delete() -> Self {
        Self::Storage("file cannot be deleted".into())
    }

    pub fn cannot_create() -> Self {
        Self::Storage("file cannot be created".into())
    }

    pub fn invalid_patch() -> Self {
        Self::Validation("invalid patch".into())
    }

    pub fn invalid_file() -> Self {
        Self::Validation("invalid file".into())
    }

    pub fn cannot_upload() -> Self {
        Self::Storage("file cannot be uploaded".into())
    }

    pub fn directory_missing() -> Self {
        Self::NotFound("directory does not exist".into())
    }
}
