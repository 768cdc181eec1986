//! # Error Handling
//!
//! This module defines the centralized error type for the schema compiler.
//! It uses the `thiserror` library to describe every failure the library can
//! report, with enough context (repository path, offending reference or
//! attribute) to locate the problem in the source repository.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. The first four variants are the compilation
//!   failure modes:
//!   - `StructuralViolation`: a path does not fit the repository grammar.
//!   - `MissingReference`: a lookup in the repository or overlay failed.
//!   - `ShapeViolation`: an operation met a definition of the wrong shape.
//!   - `UnknownType`: the renderer could not resolve an attribute type.
//!
//!   The remaining variants wrap parsing and I/O failures from the reader
//!   and the configuration loader.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Enrichment that simply does not apply (an unresolved include, an event
//! without a category) is never an error; planners skip it and log at
//! debug level instead.

use thiserror::Error;

/// Main error type for schema compilation
#[derive(Error, Debug)]
pub enum Error {
    /// A path does not fit the repository grammar.
    #[error("Structural violation at {path}: {message}")]
    StructuralViolation { path: String, message: String },

    /// A definition looked up by path is not present.
    #[error("Missing reference from {path}: {reference} is not in the repository")]
    MissingReference { path: String, reference: String },

    /// An operation or merge met a definition of an unexpected shape.
    #[error("Shape violation at {path}: expected {expected}, found {found}")]
    ShapeViolation {
        path: String,
        expected: String,
        found: String,
    },

    /// An attribute type names neither a dictionary type nor a known object.
    #[error("Unknown type `{type_name}` for attribute `{attribute}` in {path}")]
    UnknownType {
        path: String,
        attribute: String,
        type_name: String,
    },

    /// A definition file could not be deserialized into the shape its path implies.
    #[error("Failed to parse definition {path}: {source}")]
    DefinitionParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// An error occurred while parsing the compilation options file.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Directory traversal error
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl Error {
    /// Build a `ShapeViolation` for a definition at `path`.
    pub fn shape(path: &str, expected: impl ToString, found: impl ToString) -> Self {
        Error::ShapeViolation {
            path: path.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Build a `StructuralViolation` for `path`.
    pub fn structure(path: &str, message: impl Into<String>) -> Self {
        Error::StructuralViolation {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for schema compilation
pub type Result<T> = std::result::Result<T, Error>;
