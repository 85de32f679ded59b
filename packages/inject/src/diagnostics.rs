// Diagnostics
//
// Error types raised by the element model, the builder and extension loading,
// plus the diagnostic records an element model collects for the build log.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Failures surfaced by an element model while reading the host program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A known defect of the host compiler. Builds treat it as "no metadata".
    #[error("environment defect: {0}")]
    EnvironmentDefect(String),
    /// Any other failure; aborts the build of the current element.
    #[error("{0}")]
    Failure(String),
}

impl ModelError {
    pub fn failure(message: impl Into<String>) -> Self {
        ModelError::Failure(message.into())
    }

    pub fn is_environment_defect(&self) -> bool {
        matches!(self, ModelError::EnvironmentDefect(_))
    }
}

/// Error returned by builder entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("failed to build annotation metadata for {element}: {source}")]
    Model {
        element: String,
        #[source]
        source: ModelError,
    },
}

impl BuildError {
    pub fn model(element: impl Into<String>, source: ModelError) -> Self {
        BuildError::Model {
            element: element.into(),
            source,
        }
    }
}

/// Error reported by an extension candidate that could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionLoadError {
    #[error("missing dependency {dependency} required by {extension}")]
    MissingDependency {
        extension: String,
        dependency: String,
    },
    #[error("invalid extension {extension}: {reason}")]
    Invalid { extension: String, reason: String },
}

/// Severity of a reported diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Error,
    Warning,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Error => f.write_str("error"),
            DiagnosticCategory::Warning => f.write_str("warning"),
        }
    }
}

/// A message attributed to the element it was reported against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub element: String,
    pub message: String,
}

impl Diagnostic {
    pub fn error(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            element: element.into(),
            message: message.into(),
        }
    }

    pub fn warning(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: DiagnosticCategory::Warning,
            element: element.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.category, self.element, self.message)
    }
}
