//! Error types for building API designs.

use std::fmt;

use thiserror::Error;

/// Broad class of a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Operation invoked outside of its required nesting.
    Context,
    /// Definitions that contradict each other across scopes.
    StructuralConflict,
    /// Reference to a named type that is not registered.
    Reference,
    /// Definition that may only be set once was set again.
    Redeclaration,
    /// Malformed combination of arguments.
    CallShape,
    /// Raised by a user callback.
    Custom,
}

/// A configuration error raised while evaluating a design.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DslError {
    // Context errors
    #[error("{operation} must be used inside {expected}")]
    Context {
        operation: &'static str,
        expected: &'static str,
    },

    #[error("cannot declare attribute \"{name}\" inside a non-object attribute")]
    NotAnObject { name: String },

    // Structural conflicts
    #[error(
        "duplicate wildcard \"{wildcard}\" in resource base path \"{resource_path}\" and action route \"{route_path}\""
    )]
    DuplicateWildcard {
        wildcard: String,
        resource_path: String,
        route_path: String,
    },

    // Reference errors
    #[error("unknown payload type {name}")]
    UnknownPayloadType { name: String },

    #[error("unknown attribute \"{name}\" in base type")]
    UnknownBaseAttribute { name: String },

    // Redeclaration errors
    #[error("headers already defined")]
    HeadersAlreadyDefined,

    // Call-shape errors
    #[error("invalid arguments in payload call, must be (type), (dsl) or (type, dsl)")]
    InvalidPayloadArguments,

    #[error("{0}")]
    Custom(String),
}

impl DslError {
    /// Create an error from a user callback.
    pub fn custom(message: impl Into<String>) -> Self {
        DslError::Custom(message.into())
    }

    /// Returns the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            DslError::Context { .. } | DslError::NotAnObject { .. } => ErrorCategory::Context,
            DslError::DuplicateWildcard { .. } => ErrorCategory::StructuralConflict,
            DslError::UnknownPayloadType { .. } | DslError::UnknownBaseAttribute { .. } => {
                ErrorCategory::Reference
            }
            DslError::HeadersAlreadyDefined => ErrorCategory::Redeclaration,
            DslError::InvalidPayloadArguments => ErrorCategory::CallShape,
            DslError::Custom(_) => ErrorCategory::Custom,
        }
    }
}

/// Result of a DSL operation. The error, if any, has already been collected.
pub type DslResult<T = ()> = Result<T, DslError>;

/// Collected error with the evaluation context it was reported in.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportedError {
    /// Path of active definitions, e.g. `resource "Account" / action "update"`.
    pub context: String,
    pub error: DslError,
}

impl fmt::Display for ReportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.error)
    }
}

/// Failure of a whole build pass.
#[derive(Debug, Error)]
pub enum DesignError {
    #[error("design has {} error(s)", errors.len())]
    Invalid { errors: Vec<ReportedError> },
}

impl DesignError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            DesignError::Invalid { .. } => 1,
        }
    }

    /// Errors collected during the pass, in reporting order.
    pub fn errors(&self) -> &[ReportedError] {
        match self {
            DesignError::Invalid { errors } => errors,
        }
    }
}
