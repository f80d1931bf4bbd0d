//! Builder for [`Transformer`]
//!
//! Registration problems are collected while building and reported once from
//! [`TransformerBuilder::build`] as [`Error::InitializationFailure`].

use crate::codec::{JsonCodec, TreeCodec};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::operator::Operator;
use crate::registry::{OperatorRegistry, OperatorRegistryBuilder};
use crate::schema::SchemaCache;
use crate::transformer::Transformer;
use std::path::Path;
use std::sync::Arc;

/// Step-by-step construction of a [`Transformer`]
pub struct TransformerBuilder<C = JsonCodec> {
    config: EngineConfig,
    operators: OperatorRegistryBuilder,
    codec: C,
    error: Option<Error>,
}

impl TransformerBuilder<JsonCodec> {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            operators: OperatorRegistryBuilder::default(),
            codec: JsonCodec,
            error: None,
        }
    }
}

impl Default for TransformerBuilder<JsonCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: TreeCodec> TransformerBuilder<C> {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the engine configuration from a TOML, YAML or JSON file
    ///
    /// `FIELDWISE_SCHEMA_CACHE_*` environment variables override file values.
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Self {
        match EngineConfig::load(path) {
            Ok(config) => self.config = config,
            Err(err) => self.fail(err),
        }
        self
    }

    /// Add every operator of an existing registry
    ///
    /// Names already registered on this builder are reported as duplicates.
    pub fn registry(self, registry: &OperatorRegistry) -> Self {
        registry.iter().fold(self, |builder, (name, operator)| {
            builder.operator_shared(name, Arc::clone(operator))
        })
    }

    pub fn operator<O>(self, name: impl Into<String>, operator: O) -> Self
    where
        O: Operator + 'static,
    {
        self.operator_shared(name, Arc::new(operator))
    }

    pub fn operator_shared(mut self, name: impl Into<String>, operator: Arc<dyn Operator>) -> Self {
        if self.error.is_some() {
            return self;
        }

        let operators = std::mem::take(&mut self.operators);
        match operators.register_shared(name, operator) {
            Ok(operators) => self.operators = operators,
            Err(err) => self.fail(err),
        }
        self
    }

    /// Replace the tree codec
    pub fn codec<D: TreeCodec>(self, codec: D) -> TransformerBuilder<D> {
        TransformerBuilder {
            config: self.config,
            operators: self.operators,
            codec,
            error: self.error,
        }
    }

    pub fn build(self) -> Result<Transformer<C>> {
        if let Some(err) = self.error {
            tracing::error!(error = %err, "failed to initialize transformer");
            return Err(Error::initialization("failed to initialize transformer", Some(err)));
        }

        if self.operators.is_empty() {
            tracing::warn!("transformer built without operators");
        }

        Ok(Transformer::from_parts(
            Arc::new(self.operators.build()),
            Arc::new(SchemaCache::with_config(&self.config.schema_cache)),
            self.codec,
        ))
    }

    fn fail(&mut self, err: Error) {
        self.error.get_or_insert(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::operator::from_fn;
    use serde_json::json;
    use std::io::Write;

    fn identity() -> impl Operator {
        from_fn(|value, _target| Ok(value.clone()))
    }

    #[test]
    fn test_build_with_operators_and_config() {
        let mut config = EngineConfig::default();
        config.schema_cache.max_entries = 8;

        let transformer = TransformerBuilder::new()
            .config(config)
            .operator("identity", identity())
            .operator("zero", from_fn(|_v, _t| Ok(json!(0))))
            .build()
            .unwrap();

        assert_eq!(transformer.operators().names(), vec!["identity", "zero"]);
        assert_eq!(transformer.schema_cache().stats().max_entries, 8);
    }

    #[test]
    fn test_duplicate_operator_fails_initialization() {
        let base = OperatorRegistry::builder()
            .register("identity", identity())
            .unwrap()
            .build();

        let err = TransformerBuilder::new()
            .registry(&base)
            .operator("identity", identity())
            .build()
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::InitializationOperatorError);
        assert!(matches!(err.root_cause(), Error::DuplicateOperatorKey { name } if name == "identity"));
    }

    #[test]
    fn test_first_error_is_kept() {
        let err = TransformerBuilder::new()
            .operator("", identity())
            .operator("a", identity())
            .operator("a", identity())
            .build()
            .unwrap_err();

        assert!(matches!(err.root_cause(), Error::OperatorKeyMissing));
    }

    #[test]
    fn test_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[schema_cache]\nenabled = false").unwrap();

        let transformer = Transformer::builder()
            .config_file(file.path())
            .operator("identity", identity())
            .build()
            .unwrap();
        assert!(!transformer.schema_cache().stats().enabled);

        let err = Transformer::builder()
            .config_file("missing.toml")
            .build()
            .unwrap_err();
        assert!(matches!(err.root_cause(), Error::Configuration { .. }));
    }

    #[derive(Clone, Copy)]
    struct PassthroughCodec;

    impl TreeCodec for PassthroughCodec {
        fn to_tree<T: serde::Serialize + ?Sized>(&self, value: &T) -> Result<serde_json::Value> {
            JsonCodec.to_tree(value)
        }

        fn from_tree<T: serde::de::DeserializeOwned>(&self, tree: serde_json::Value) -> Result<T> {
            JsonCodec.from_tree(tree)
        }
    }

    #[test]
    fn test_custom_codec() {
        let transformer = TransformerBuilder::new()
            .operator("identity", identity())
            .codec(PassthroughCodec)
            .build()
            .unwrap();

        let _: &PassthroughCodec = transformer.codec();
    }
}
