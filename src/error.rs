//! Error types shared by the registry, the loader and the built-in plugins
//!
//! Two families live here and must never be confused:
//! - recoverable errors (`ResolutionError`, `RegistryError`, `ConfigError`,
//!   `ComponentError`) travel as ordinary `Result` values;
//! - `FatalError` is only ever turned into a process exit by the loader.

use crate::registry::Category;
use log::error;

/// Exit status used for every fatal load failure.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Error returned by a factory while building a component.
pub type FactoryError = Box<dyn std::error::Error + Send + Sync>;

/// The requested type name is not registered in the category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("there is no {} {category}.", .type_name.as_deref().unwrap_or("<unset>"))]
pub struct ResolutionError {
    pub category: Category,
    /// `None` when the configuration carried no usable `type` field
    pub type_name: Option<String>,
}

/// Registration-time errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("{category} factory '{name}' is already registered")]
    AlreadyRegistered { category: Category, name: String },
}

/// Errors reading or interpreting a configuration object
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("invalid value for '{field}': expected {expected}")]
    InvalidField { field: String, expected: &'static str },
}

/// Runtime errors raised by loaded components
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("{0} has not been prepared")]
    NotPrepared(&'static str),

    #[error("invalid action {action}: environment has {available} actions")]
    InvalidAction { action: usize, available: usize },

    #[error("episode finished, call reset first")]
    EpisodeFinished,

    #[error("empty dataset '{0}'")]
    EmptyDataset(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Unrecoverable load outcomes. There is no way to hand one of these back
/// to a caller: the only consumer is [`FatalError::exit`].
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    #[error("{operation}: {factory} call error: {source}")]
    Construction {
        operation: String,
        factory: String,
        #[source]
        source: FactoryError,
    },

    #[error("{operation}: {factory} has wrong return type")]
    InvariantViolation { operation: String, factory: String },

    /// A post-load lifecycle stage (e.g. trainer prepare) failed
    #[error("{stage}: {source}")]
    Stage {
        stage: String,
        #[source]
        source: FactoryError,
    },
}

impl FatalError {
    /// Log at the highest severity, including the cause chain, then exit.
    pub fn exit(self) -> ! {
        let mut message = self.to_string();
        // the direct source is already part of the message
        let mut cause = std::error::Error::source(&self).and_then(|s| s.source());
        while let Some(inner) = cause {
            message.push_str(&format!("\n  caused by: {}", inner));
            cause = inner.source();
        }
        error!("{}", message);
        log::logger().flush();
        std::process::exit(FATAL_EXIT_CODE)
    }
}
