use std::path::PathBuf;

use thiserror::Error;

use crate::tag::MAX_NAME_LEN;

/// Convenient result alias for the docking route library.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure raised while walking `in`/`out` links from a bay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A link names a waypoint that is not registered for the station.
    #[error("waypoint {from} links to unknown waypoint {name}")]
    DanglingReference { from: String, name: String },

    /// The walk revisited a waypoint it had already appended.
    #[error("waypoint links loop back to {at}")]
    CycleDetected { at: String },

    /// The walk produced more waypoints than the station registers.
    #[error("waypoint chain exceeds {limit} waypoints")]
    TooLong { limit: usize },
}

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A marker name does not follow the tag grammar.
    #[error("malformed tag '{tag}': {reason}")]
    MalformedTag { tag: String, reason: String },

    /// A waypoint or bay name is longer than the bounded identifier allows.
    #[error("name '{name}' exceeds {} characters", MAX_NAME_LEN)]
    NameTooLong { name: String },

    /// Two waypoint markers in one model share a name.
    #[error("duplicate waypoint name {name}")]
    DuplicateWaypoint { name: String },

    /// Raised when the approach or departure route of a bay cannot be resolved.
    #[error("bay {bay}: {source}")]
    Chain {
        bay: String,
        #[source]
        source: ChainError,
    },

    /// A legacy locator references a port with no entrance marker.
    #[error("locator '{tag}' references port {port} which has no entrance marker")]
    PortNotFound { tag: String, port: u32 },

    /// The model produced no docking bays at all.
    #[error("station model {model} defines no docking bays")]
    NoBays { model: String },

    /// The model referenced by a definition is not available.
    #[error("model {model} could not be found")]
    ModelNotFound { model: String },

    /// A station definition declared an unsupported docking method.
    #[error("unknown station type '{value}' (expected surface or orbital)")]
    UnknownDockMethod { value: String },

    /// A station definition could not be read or parsed.
    #[error("invalid station definition {path}: {message}")]
    InvalidDefinition { path: PathBuf, message: String },

    /// Raised when a station type id could not be found in the catalog.
    #[error("unknown station type: {name}{}", format_suggestions(.suggestions))]
    UnknownStationType {
        name: String,
        suggestions: Vec<String>,
    },

    /// Wrapper for JSON parsing errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(tag: &str, reason: impl Into<String>) -> Self {
        Error::MalformedTag {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
