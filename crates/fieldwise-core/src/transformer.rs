//! The transformation facade
//!
//! A [`Transformer`] serializes a value into a tree, walks the tree with a
//! [`TransformationContext`], and deserializes the result back into the same
//! type:
//!
//! ```
//! use fieldwise_core::{
//!     operator, Described, OperatorRegistry, SelectionNode, TransformationContext,
//!     Transformer, TypeDescriptor,
//! };
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Account {
//!     owner: String,
//!     iban: String,
//! }
//!
//! impl Described for Account {
//!     fn describe() -> TypeDescriptor {
//!         TypeDescriptor::record::<Self>()
//!             .field::<String>("owner")
//!             .field::<String>("iban")
//!             .build()
//!     }
//! }
//!
//! let registry = OperatorRegistry::builder()
//!     .register("mask", operator::from_fn(|_value, _target| Ok(json!("***"))))
//!     .unwrap()
//!     .build();
//! let transformer = Transformer::new(registry);
//!
//! let context = TransformationContext::new(
//!     "mask",
//!     SelectionNode::new("account").transform(SelectionNode::new("iban")),
//! );
//! let account = Account { owner: "Ada".into(), iban: "NO93 8601 1117 947".into() };
//!
//! let masked = transformer.transform(account, &context).unwrap();
//! assert_eq!(masked, Account { owner: "Ada".into(), iban: "***".into() });
//! ```
//!
//! Copyright (c) 2025 Fieldwise Team
//! Licensed under the Apache-2.0 license

use crate::builder::TransformerBuilder;
use crate::codec::{JsonCodec, TreeCodec};
use crate::config::EngineConfig;
use crate::engine::NodeWalker;
use crate::error::{Error, Result};
use crate::registry::OperatorRegistry;
use crate::schema::{Described, SchemaCache, TypeDescriptor};
use crate::selection::TransformationContext;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Applies selections to typed values
///
/// Cheap to clone; clones share the operator registry and schema cache.
#[derive(Debug, Clone)]
pub struct Transformer<C = JsonCodec> {
    operators: Arc<OperatorRegistry>,
    schemas: Arc<SchemaCache>,
    codec: C,
}

impl Transformer<JsonCodec> {
    /// Create a transformer with the default configuration and JSON codec
    pub fn new(operators: OperatorRegistry) -> Self {
        Self::with_config(operators, &EngineConfig::default())
    }

    pub fn with_config(operators: OperatorRegistry, config: &EngineConfig) -> Self {
        Self::from_parts(
            Arc::new(operators),
            Arc::new(SchemaCache::with_config(&config.schema_cache)),
            JsonCodec,
        )
    }

    pub fn builder() -> TransformerBuilder<JsonCodec> {
        TransformerBuilder::new()
    }
}

impl<C: TreeCodec> Transformer<C> {
    pub(crate) fn from_parts(
        operators: Arc<OperatorRegistry>,
        schemas: Arc<SchemaCache>,
        codec: C,
    ) -> Self {
        Self {
            operators,
            schemas,
            codec,
        }
    }

    /// Transform `value` according to `context`
    ///
    /// Returns `value` untouched when the context is invalid or the value
    /// serializes to `null`. Every failure is reported as
    /// [`Error::TransformationFailure`] wrapping the underlying error.
    pub fn transform<T>(&self, value: T, context: &TransformationContext) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Described,
    {
        let Some(tree) = self.build_transformed_tree(&value, context)? else {
            return Ok(value);
        };

        self.codec.from_tree(tree).map_err(Error::transformation)
    }

    /// Run the pipeline up to the transformed tree without converting back
    ///
    /// `None` means nothing was transformed: the context is invalid or the
    /// value serializes to `null`.
    pub fn build_transformed_tree<T>(
        &self,
        value: &T,
        context: &TransformationContext,
    ) -> Result<Option<Value>>
    where
        T: Serialize + Described + ?Sized,
    {
        if !context.is_valid() {
            tracing::debug!("invalid transformation context, skipping");
            return Ok(None);
        }

        let mut tree = self.codec.to_tree(value).map_err(Error::transformation)?;
        if tree.is_null() {
            return Ok(None);
        }

        self.transform_tree(&mut tree, &T::describe(), context)?;
        Ok(Some(tree))
    }

    /// Transform a caller-owned tree in place, treating it as a value of `ty`
    ///
    /// On error the tree may be partially transformed.
    pub fn transform_tree(
        &self,
        tree: &mut Value,
        ty: &TypeDescriptor,
        context: &TransformationContext,
    ) -> Result<()> {
        if !context.is_valid() || tree.is_null() {
            return Ok(());
        }

        tracing::debug!(type_name = ty.name(), "transforming tree");
        NodeWalker::new(&self.schemas, &self.operators)
            .walk(tree, ty, context)
            .map_err(|err| {
                tracing::debug!(type_name = ty.name(), error = %err, "transformation failed");
                Error::transformation(err)
            })?;
        tracing::debug!(type_name = ty.name(), "tree transformed");

        Ok(())
    }

    pub fn operators(&self) -> &OperatorRegistry {
        &self.operators
    }

    pub fn schema_cache(&self) -> &SchemaCache {
        &self.schemas
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }
}
