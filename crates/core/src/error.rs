//! Error types for the schema/operation compiler.

use thiserror::Error;

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Every way a compilation run can fail.
///
/// There is no partial output: the first error aborts the run and is surfaced
/// verbatim by the CLI shell.
#[derive(Error, Debug)]
pub enum Error {
    /// The input document is not a well-formed OpenAPI 3.x document.
    #[error("Failed to parse OpenAPI document: {0}")]
    DocumentParse(String),

    /// A `$ref` names something that does not exist in the document.
    #[error("Unresolved reference '{reference}' (referenced from {from})")]
    UnresolvedReference {
        /// The `$ref` string as written.
        reference: String,
        /// Where the reference was found.
        from: String,
    },

    /// A schema or parameter feature with no mapping onto the target vocabulary.
    #[error("Unsupported construct '{construct}' at {path}")]
    UnsupportedConstruct {
        /// JSON pointer-like location of the construct.
        path: String,
        /// What could not be mapped.
        construct: String,
    },

    /// Two candidate names fold to the same identifier and disambiguation is off.
    #[error("Naming collision: '{candidate}' and '{existing}' both map to identifier '{identifier}'")]
    NamingCollision {
        /// Name being registered.
        candidate: String,
        /// Name that already holds the identifier.
        existing: String,
        /// The folded identifier both map to.
        identifier: String,
    },

    /// Path-template/parameter mismatch, duplicate parameters or ids.
    #[error("Invalid operation {operation}: {reason}")]
    OperationBuild {
        /// `METHOD /path` of the operation.
        operation: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Command-line or configuration input the shell cannot act on.
    #[error("Invalid argument: {0}")]
    InvalidCliArgument(String),
}

impl Error {
    pub(crate) fn unsupported(path: impl Into<String>, construct: impl Into<String>) -> Self {
        Self::UnsupportedConstruct {
            path: path.into(),
            construct: construct.into(),
        }
    }

    pub(crate) fn operation(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OperationBuild {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}
