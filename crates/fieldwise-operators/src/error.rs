//! Error types for built-in operators and operator catalogs
//!
//! Copyright (c) 2025 Fieldwise Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Failures raised by built-in operators while transforming a value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperatorError {
    /// The value has no mapping and the mapping has no default
    #[error("Enum mapping not found for value: {value}")]
    EnumMapping {
        value: String,
        available_mappings: Vec<String>,
    },

    /// The operator only accepts values of a certain shape
    #[error("Expected {expected}, found {value}")]
    UnexpectedValue {
        expected: &'static str,
        value: String,
    },

    /// A numeric result cannot be represented in the tree
    #[error("Numeric result {result} is not representable")]
    NotRepresentable { result: f64 },
}

/// Failures while reading or validating an operator catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog entry #{index} has an empty operator name")]
    EmptyName { index: usize },

    #[error("Operator '{name}' is defined more than once")]
    DuplicateName { name: String },

    #[error("Invalid parameters for operator '{name}': {message}")]
    InvalidParameters { name: String, message: String },

    #[error(transparent)]
    Core(#[from] fieldwise_core::Error),
}

impl From<CatalogError> for fieldwise_core::Error {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Core(inner) => inner,
            CatalogError::EmptyName { .. } => fieldwise_core::Error::OperatorKeyMissing,
            CatalogError::DuplicateName { name } => {
                fieldwise_core::Error::DuplicateOperatorKey { name }
            }
            other @ CatalogError::InvalidParameters { .. } => {
                fieldwise_core::Error::configuration(other.to_string(), None)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
