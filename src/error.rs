//! Error types shared by every command.

/// The single domain failure: "this command's operation did not succeed".
///
/// It is caught at the invocation boundary, its message (if any) printed to
/// stderr, and turned into exit status 1.
#[derive(thiserror::Error, Debug, Default, Clone, PartialEq, Eq)]
#[error("{}", .message.as_deref().unwrap_or("command failed"))]
pub struct CommandError {
    message: Option<String>,
}

impl CommandError {
    /// A failure carrying a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// A failure without a message; the tool it wraps already reported why.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TaskError {
    #[error(transparent)]
    Failed(#[from] CommandError),
    #[error("Command not found: {0}")]
    CommandNotFound(String),
    #[error("Config not found: no {0} in the current directory or any parent")]
    ConfigNotFound(String),
    #[error(transparent)]
    Usage(#[from] clap::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config: {0}")]
    Config(#[from] figment::Error),
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("xshell: {0}")]
    Shell(#[from] xshell::Error),
}

impl TaskError {
    /// Whether this is the domain failure rather than a fatal error.
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskError::Failed(_))
    }
}

pub type TaskResult<T> = Result<T, TaskError>;
