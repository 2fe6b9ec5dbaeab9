//! Error handling for mlptext
//!
//! This module provides a unified error type and result type for rendering,
//! registry and reconciliation operations, plus the warning records collected
//! while a document is processed.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Processing error type
#[derive(Debug, Clone, Error)]
pub enum MlpError {
    /// The markup tree did not have the shape a handler expected
    #[error("Unexpected markup structure in {node}: {message}")]
    Structure { node: String, message: String },

    /// The external tagger failed
    #[error("Tagger error: {0}")]
    Tagger(String),

    /// The external identifier extractor failed
    #[error("Identifier extraction failed for '{tex}': {message}")]
    Identifiers { tex: String, message: String },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Registry failure
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// IO error (for file operations)
    #[error("IO error: {0}")]
    Io(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for MlpError {
    fn from(err: std::io::Error) -> Self {
        MlpError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MlpError {
    fn from(err: serde_json::Error) -> Self {
        MlpError::InvalidInput(err.to_string())
    }
}

/// Result type for mlptext operations
pub type MlpResult<T> = Result<T, MlpError>;

// Convenience constructors for errors
impl MlpError {
    pub fn structure(node: impl Into<String>, message: impl Into<String>) -> Self {
        MlpError::Structure {
            node: node.into(),
            message: message.into(),
        }
    }

    pub fn tagger(message: impl Into<String>) -> Self {
        MlpError::Tagger(message.into())
    }

    pub fn identifiers(tex: impl Into<String>, message: impl Into<String>) -> Self {
        MlpError::Identifiers {
            tex: tex.into(),
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        MlpError::InvalidInput(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        MlpError::Internal(message.into())
    }
}

/// Placeholder registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The token does not name a record in the registry
    #[error("Unknown placeholder '{0}'")]
    UnknownToken(String),

    /// The formula was closed before the extension arrived
    #[error("Formula '{token}' is closed; dropped extension '{rejected}'")]
    Closed { token: String, rejected: String },
}

/// Kind of non-fatal issue met while processing a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A node did not have the expected shape and was skipped
    MalformedNode,
    /// A sub/sup element appeared with no formula to attach to
    DetachedScript,
    /// A formula extension arrived after the formula was closed
    ClosedFormula,
    /// A template or tag was deliberately ignored
    Ignored,
    /// A placeholder token had no registry record
    UnknownPlaceholder,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::MalformedNode => write!(f, "malformed node"),
            WarningKind::DetachedScript => write!(f, "detached script"),
            WarningKind::ClosedFormula => write!(f, "closed formula"),
            WarningKind::Ignored => write!(f, "ignored"),
            WarningKind::UnknownPlaceholder => write!(f, "unknown placeholder"),
        }
    }
}

/// A warning generated while processing a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingWarning {
    pub kind: WarningKind,
    pub message: String,
    /// Location context (e.g. the template or tag name)
    pub location: Option<String>,
}

impl ProcessingWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for ProcessingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref loc) = self.location {
            write!(f, "[{}] {}: {}", self.kind, loc, self.message)
        } else {
            write!(f, "[{}] {}", self.kind, self.message)
        }
    }
}
