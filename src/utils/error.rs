use thiserror::Error;

/// Failure to turn a backend response body into its expected schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed response from {endpoint}: {reason}")]
pub struct ParseError {
    pub endpoint: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned {status}{}", status_suffix(.message))]
    Status { status: u16, message: Option<String> },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("No bearer credential available: {reason}")]
    MissingCredential { reason: String },

    #[error("An action for {key} is already in flight")]
    ActionInFlight { key: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Backend,
    Data,
    Configuration,
    Auth,
    Concurrency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DeskError {
    pub fn config(message: impl Into<String>) -> Self {
        DeskError::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DeskError::Transport(_) => ErrorCategory::Network,
            DeskError::Status { status, .. } if *status == 401 || *status == 403 => {
                ErrorCategory::Auth
            }
            DeskError::Status { .. } => ErrorCategory::Backend,
            DeskError::Parse(_) | DeskError::Serialization(_) => ErrorCategory::Data,
            DeskError::Io(_)
            | DeskError::ConfigError { .. }
            | DeskError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            DeskError::MissingCredential { .. } => ErrorCategory::Auth,
            DeskError::ActionInFlight { .. } => ErrorCategory::Concurrency,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Concurrency => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Backend => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Auth => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// Message suitable for showing to the person at the keyboard.
    pub fn user_friendly_message(&self) -> String {
        match self {
            DeskError::Transport(_) => "Could not reach the course server".to_string(),
            DeskError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            DeskError::Status { status, .. } => {
                format!("The course server rejected the request ({})", status)
            }
            DeskError::Parse(_) | DeskError::Serialization(_) => {
                "The course server sent an unexpected response".to_string()
            }
            DeskError::MissingCredential { .. } => "You are not signed in".to_string(),
            DeskError::ActionInFlight { .. } => {
                "That action is already being processed".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the backend is running and base_url is correct",
            ErrorCategory::Backend => "Check the backend logs for the rejected request",
            ErrorCategory::Data => "Make sure the backend version matches this client",
            ErrorCategory::Configuration => "Fix the configuration file or command-line flags",
            ErrorCategory::Auth => "Sign in again or check the configured token source",
            ErrorCategory::Concurrency => "Wait for the pending action to finish",
        }
    }
}

fn status_suffix(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {}", message),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;
