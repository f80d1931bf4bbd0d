//! Error types for the Fieldwise core library
//!
//! This module defines the error handling system for Fieldwise, using
//! thiserror for error definitions and anyhow for opaque operator and
//! configuration failures.
//!
//! Every error carries a stable [`ErrorCode`], an HTTP-like status class and a
//! context map, so callers that only see the wrapping
//! [`Error::TransformationFailure`] can still tell what went wrong underneath.
//!
//! Copyright (c) 2025 Fieldwise Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Main error type for Fieldwise operations
#[derive(Error, Debug)]
pub enum Error {
    /// A selection references a field the target type does not declare
    #[error("Field '{field}' does not exist in type {type_name}")]
    FieldNotFound { field: String, type_name: String },

    /// An operator name resolved to nothing (absent or empty)
    #[error("Operator type cannot be null or empty")]
    OperatorKeyMissing,

    /// An operator name has no registered implementation
    #[error("Unknown operator type={name}")]
    UnknownOperator { name: String },

    /// The same operator name was registered twice
    #[error("Duplicate operator key found: {name}")]
    DuplicateOperatorKey { name: String },

    /// An operator returned an error while transforming a field
    #[error("Operator '{operator}' failed on field '{field}': {source}")]
    OperatorFailed {
        operator: String,
        field: String,
        #[source]
        source: anyhow::Error,
    },

    /// Converting a typed value into a tree failed
    #[error("Failed to serialize {type_name} into a tree: {source}")]
    Serialization {
        type_name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Converting a tree back into a typed value failed
    #[error("Failed to deserialize tree into {type_name}: {source}")]
    Deserialization {
        type_name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Any failure inside the serialize → walk → deserialize pipeline
    #[error("Transformation failed: {source}")]
    TransformationFailure {
        #[source]
        source: Box<Error>,
    },

    /// Failure while constructing the engine or its operator set
    #[error("Initialization failed: {message}")]
    InitializationFailure {
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Stable, machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    FieldNotExist,
    OperatorKeyNullOrEmptyError,
    UnknownOperatorTypeError,
    DuplicateOperatorKeyError,
    OperatorApplyError,
    SerializationError,
    DeserializationError,
    ConfigurationError,
    TransformationError,
    InitializationOperatorError,
}

impl ErrorCode {
    /// Status class: 400 for caller mistakes, 500 for everything else
    pub fn status(self) -> u16 {
        match self {
            ErrorCode::OperatorKeyNullOrEmptyError
            | ErrorCode::UnknownOperatorTypeError
            | ErrorCode::ConfigurationError => 400,
            ErrorCode::FieldNotExist
            | ErrorCode::DuplicateOperatorKeyError
            | ErrorCode::OperatorApplyError
            | ErrorCode::SerializationError
            | ErrorCode::DeserializationError
            | ErrorCode::TransformationError
            | ErrorCode::InitializationOperatorError => 500,
        }
    }

    /// The code as it appears on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::FieldNotExist => "FIELD_NOT_EXIST",
            ErrorCode::OperatorKeyNullOrEmptyError => "OPERATOR_KEY_NULL_OR_EMPTY_ERROR",
            ErrorCode::UnknownOperatorTypeError => "UNKNOWN_OPERATOR_TYPE_ERROR",
            ErrorCode::DuplicateOperatorKeyError => "DUPLICATE_OPERATOR_KEY_ERROR",
            ErrorCode::OperatorApplyError => "OPERATOR_APPLY_ERROR",
            ErrorCode::SerializationError => "SERIALIZATION_ERROR",
            ErrorCode::DeserializationError => "DESERIALIZATION_ERROR",
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorCode::TransformationError => "TRANSFORMATION_ERROR",
            ErrorCode::InitializationOperatorError => "INITIALIZATION_OPERATOR_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Create a configuration error with an optional underlying cause
    pub fn configuration(message: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Error::Configuration {
            message: message.into(),
            source,
        }
    }

    /// Wrap an error as a pipeline failure, without double wrapping
    pub fn transformation(source: Error) -> Self {
        match source {
            already @ Error::TransformationFailure { .. } => already,
            other => Error::TransformationFailure {
                source: Box::new(other),
            },
        }
    }

    /// Wrap an error raised while building the engine
    pub fn initialization(message: impl Into<String>, source: Option<Error>) -> Self {
        Error::InitializationFailure {
            message: message.into(),
            source: source.map(Box::new),
        }
    }

    /// The stable code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::FieldNotFound { .. } => ErrorCode::FieldNotExist,
            Error::OperatorKeyMissing => ErrorCode::OperatorKeyNullOrEmptyError,
            Error::UnknownOperator { .. } => ErrorCode::UnknownOperatorTypeError,
            Error::DuplicateOperatorKey { .. } => ErrorCode::DuplicateOperatorKeyError,
            Error::OperatorFailed { .. } => ErrorCode::OperatorApplyError,
            Error::Serialization { .. } => ErrorCode::SerializationError,
            Error::Deserialization { .. } => ErrorCode::DeserializationError,
            Error::Configuration { .. } => ErrorCode::ConfigurationError,
            Error::TransformationFailure { .. } => ErrorCode::TransformationError,
            Error::InitializationFailure { .. } => ErrorCode::InitializationOperatorError,
        }
    }

    /// Status class of [`Error::code`]
    pub fn status(&self) -> u16 {
        self.code().status()
    }

    /// The innermost Fieldwise error, looking through pipeline and
    /// initialization wrappers
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::TransformationFailure { source } => source.root_cause(),
            Error::InitializationFailure {
                source: Some(source),
                ..
            } => source.root_cause(),
            other => other,
        }
    }

    /// Structured context for logging or API responses
    pub fn context(&self) -> BTreeMap<String, String> {
        let mut context = BTreeMap::new();
        context.insert("detailMessage".to_string(), self.to_string());

        match self {
            Error::FieldNotFound { field, type_name } => {
                context.insert("field".to_string(), field.clone());
                context.insert("typeName".to_string(), type_name.clone());
            }
            Error::UnknownOperator { name } | Error::DuplicateOperatorKey { name } => {
                context.insert("operator".to_string(), name.clone());
            }
            Error::OperatorFailed { operator, field, .. } => {
                context.insert("operator".to_string(), operator.clone());
                context.insert("field".to_string(), field.clone());
            }
            Error::Serialization { type_name, .. } | Error::Deserialization { type_name, .. } => {
                context.insert("typeName".to_string(), type_name.clone());
            }
            Error::TransformationFailure { source } => {
                let root = source.root_cause();
                context.insert("message".to_string(), source.to_string());
                context.insert("causeCode".to_string(), root.code().to_string());
            }
            Error::InitializationFailure {
                source: Some(source),
                ..
            } => {
                context.insert("message".to_string(), source.to_string());
                context.insert("causeCode".to_string(), source.root_cause().code().to_string());
            }
            _ => {}
        }

        context
    }
}
