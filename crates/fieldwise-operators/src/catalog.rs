//! Declarative operator catalogs
//!
//! A catalog maps operator names to built-in operator kinds and their
//! parameters, so operator sets can be defined in configuration instead of
//! code. Catalog files may be TOML, YAML or JSON:
//!
//! ```toml
//! [[operators]]
//! name = "mask"
//! kind = "mask"
//!
//! [[operators]]
//! name = "country"
//! kind = "enum_mapping"
//! mappings = { no = "Norway", se = "Sweden" }
//! default = "Unknown"
//!
//! [[operators]]
//! name = "preview"
//! kind = "truncate"
//! max_chars = 8
//! ```
//!
//! Copyright (c) 2025 Fieldwise Team
//! Licensed under the Apache-2.0 license

use crate::built_in::{
    Constant, DefaultValue, EnumMapping, Linear, Lower, Mask, Redact, Trim, Truncate, Upper,
    REDACTED,
};
use crate::error::{CatalogError, Result};
use fieldwise_core::config::{self, Format};
use fieldwise_core::{Operator, OperatorRegistry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

/// A built-in operator kind with its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperatorSpec {
    Mask,
    Upper,
    Lower,
    Trim,
    Redact {
        #[serde(default = "default_replacement")]
        replacement: String,
    },
    Constant {
        value: Value,
    },
    DefaultValue {
        value: Value,
    },
    EnumMapping {
        mappings: HashMap<String, String>,
        #[serde(default)]
        default: Option<String>,
    },
    Linear {
        #[serde(default = "default_scale")]
        scale: f64,
        #[serde(default)]
        offset: f64,
    },
    Truncate {
        max_chars: usize,
    },
}

fn default_replacement() -> String {
    REDACTED.to_string()
}

fn default_scale() -> f64 {
    1.0
}

impl OperatorSpec {
    /// Instantiate the described operator
    pub fn build(&self) -> Arc<dyn Operator> {
        match self {
            OperatorSpec::Mask => Arc::new(Mask),
            OperatorSpec::Upper => Arc::new(Upper),
            OperatorSpec::Lower => Arc::new(Lower),
            OperatorSpec::Trim => Arc::new(Trim),
            OperatorSpec::Redact { replacement } => Arc::new(Redact::new(replacement.clone())),
            OperatorSpec::Constant { value } => Arc::new(Constant {
                value: value.clone(),
            }),
            OperatorSpec::DefaultValue { value } => Arc::new(DefaultValue {
                value: value.clone(),
            }),
            OperatorSpec::EnumMapping { mappings, default } => {
                Arc::new(EnumMapping::new(mappings.clone(), default.clone()))
            }
            OperatorSpec::Linear { scale, offset } => Arc::new(Linear::new(*scale, *offset)),
            OperatorSpec::Truncate { max_chars } => Arc::new(Truncate {
                max_chars: *max_chars,
            }),
        }
    }

    fn check(&self, name: &str) -> Result<()> {
        let invalid = |message: &str| CatalogError::InvalidParameters {
            name: name.to_string(),
            message: message.to_string(),
        };

        match self {
            OperatorSpec::Linear { scale, offset } if !scale.is_finite() || !offset.is_finite() => {
                Err(invalid("scale and offset must be finite"))
            }
            OperatorSpec::Truncate { max_chars: 0 } => Err(invalid("max_chars must be positive")),
            _ => Ok(()),
        }
    }
}

/// One named catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorDefinition {
    pub name: String,
    #[serde(flatten)]
    pub spec: OperatorSpec,
}

/// A set of named operator definitions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorCatalog {
    #[serde(default)]
    operators: Vec<OperatorDefinition>,
}

impl OperatorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default operator set: `mask`, `upper`, `lower`, `trim` and `redact`
    pub fn standard() -> Self {
        Self::new()
            .with("mask", OperatorSpec::Mask)
            .with("upper", OperatorSpec::Upper)
            .with("lower", OperatorSpec::Lower)
            .with("trim", OperatorSpec::Trim)
            .with(
                "redact",
                OperatorSpec::Redact {
                    replacement: default_replacement(),
                },
            )
    }

    /// Load and validate a catalog file; the format follows the extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let catalog: Self = config::load_document(path)?;
        catalog.validate()?;

        tracing::info!(
            path = %path.display(),
            count = catalog.len(),
            "loaded operator catalog"
        );
        Ok(catalog)
    }

    /// Parse and validate a catalog document
    pub fn parse(content: &str, format: Format) -> Result<Self> {
        let catalog: Self = config::parse_document(content, format)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Append a definition; problems surface from [`OperatorCatalog::validate`]
    pub fn with(mut self, name: impl Into<String>, spec: OperatorSpec) -> Self {
        self.operators.push(OperatorDefinition {
            name: name.into(),
            spec,
        });
        self
    }

    /// Append every definition of `other`
    pub fn merge(mut self, other: OperatorCatalog) -> Self {
        self.operators.extend(other.operators);
        self
    }

    pub fn definitions(&self) -> &[OperatorDefinition] {
        &self.operators
    }

    pub fn get(&self, name: &str) -> Option<&OperatorSpec> {
        self.operators
            .iter()
            .find(|definition| definition.name.trim() == name)
            .map(|definition| &definition.spec)
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Reject empty names, duplicate names and invalid parameters
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (index, definition) in self.operators.iter().enumerate() {
            let name = definition.name.trim();
            if name.is_empty() {
                return Err(CatalogError::EmptyName { index });
            }
            if !seen.insert(name) {
                return Err(CatalogError::DuplicateName {
                    name: name.to_string(),
                });
            }
            definition.spec.check(name)?;
        }
        Ok(())
    }

    /// Validate the catalog and build an immutable registry from it
    pub fn build_registry(&self) -> Result<OperatorRegistry> {
        self.validate()?;

        let builder = self
            .operators
            .iter()
            .try_fold(OperatorRegistry::builder(), |builder, definition| {
                builder.register_shared(definition.name.trim(), definition.spec.build())
            })?;

        Ok(builder.build())
    }
}
