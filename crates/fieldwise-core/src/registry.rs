//! Operator registry
//!
//! Maps operator names to implementations. The registry is built once and is
//! immutable afterwards, so it can be shared freely between threads.
//!
//! Copyright (c) 2025 Fieldwise Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::operator::Operator;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Immutable name → operator mapping
#[derive(Clone, Default)]
pub struct OperatorRegistry {
    operators: HashMap<String, Arc<dyn Operator>>,
}

impl OperatorRegistry {
    /// Build a registry from an existing mapping
    ///
    /// The pairs are copied into the registry. If a name occurs more than once
    /// the last pair wins; use [`OperatorRegistry::builder`] to reject
    /// duplicates instead.
    pub fn new<I, S>(operators: I) -> Self
    where
        I: IntoIterator<Item = (S, Arc<dyn Operator>)>,
        S: Into<String>,
    {
        let operators: HashMap<String, Arc<dyn Operator>> = operators
            .into_iter()
            .map(|(name, operator)| (name.into(), operator))
            .collect();

        tracing::info!(count = operators.len(), "operator registry built");
        Self { operators }
    }

    /// Start an explicit registration
    pub fn builder() -> OperatorRegistryBuilder {
        OperatorRegistryBuilder::default()
    }

    /// Look up an operator by name
    ///
    /// Fails with [`Error::OperatorKeyMissing`] when `name` is absent or empty
    /// and with [`Error::UnknownOperator`] when nothing is registered under it.
    pub fn get(&self, name: Option<&str>) -> Result<&Arc<dyn Operator>> {
        let name = name
            .filter(|name| !name.is_empty())
            .ok_or(Error::OperatorKeyMissing)?;

        self.operators.get(name).ok_or_else(|| Error::UnknownOperator {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Iterate over registered operators in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Operator>)> {
        self.operators
            .iter()
            .map(|(name, operator)| (name.as_str(), operator))
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("operators", &self.names())
            .finish()
    }
}

/// Explicit operator registration that rejects empty and duplicate names
#[derive(Default)]
pub struct OperatorRegistryBuilder {
    operators: HashMap<String, Arc<dyn Operator>>,
}

impl OperatorRegistryBuilder {
    /// Register an operator under `name`
    pub fn register<O>(self, name: impl Into<String>, operator: O) -> Result<Self>
    where
        O: Operator + 'static,
    {
        self.register_shared(name, Arc::new(operator))
    }

    /// Register an already shared operator under `name`
    pub fn register_shared(
        mut self,
        name: impl Into<String>,
        operator: Arc<dyn Operator>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::OperatorKeyMissing);
        }
        if self.operators.contains_key(&name) {
            tracing::error!(operator = %name, "duplicate operator key");
            return Err(Error::DuplicateOperatorKey { name });
        }

        tracing::debug!(operator = %name, "registered operator");
        self.operators.insert(name, operator);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn build(self) -> OperatorRegistry {
        OperatorRegistry::new(self.operators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::from_fn;
    use crate::Described;
    use serde_json::{json, Value};

    fn constant(value: Value) -> Arc<dyn Operator> {
        Arc::new(from_fn(move |_input, _target| Ok(value.clone())))
    }

    #[test]
    fn test_get_registered_operator() {
        let registry = OperatorRegistry::new([("mask", constant(json!("***")))]);
        let operator = registry.get(Some("mask")).unwrap();

        assert_eq!(
            operator.apply(&json!("secret"), &String::describe()).unwrap(),
            json!("***")
        );
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("mask"));
    }

    #[test]
    fn test_missing_and_unknown_names() {
        let registry = OperatorRegistry::new([("mask", constant(json!("***")))]);

        assert!(matches!(registry.get(None), Err(Error::OperatorKeyMissing)));
        assert!(matches!(registry.get(Some("")), Err(Error::OperatorKeyMissing)));
        match registry.get(Some("rot13")) {
            Err(Error::UnknownOperator { name }) => assert_eq!(name, "rot13"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_new_keeps_last_duplicate() {
        let registry = OperatorRegistry::new([
            ("mask", constant(json!(1))),
            ("mask", constant(json!(2))),
        ]);

        assert_eq!(registry.len(), 1);
        let operator = registry.get(Some("mask")).unwrap();
        assert_eq!(operator.apply(&Value::Null, &i32::describe()).unwrap(), json!(2));
    }

    #[test]
    fn test_builder_rejects_duplicates_and_empty_names() {
        let builder = OperatorRegistry::builder()
            .register("mask", from_fn(|_v, _t| Ok(json!("***"))))
            .unwrap();

        match builder.register_shared("mask", constant(json!(0))) {
            Err(Error::DuplicateOperatorKey { name }) => assert_eq!(name, "mask"),
            other => panic!("unexpected result: {:?}", other.map(|b| b.len())),
        }

        let err = OperatorRegistry::builder()
            .register("  ", from_fn(|v, _t| Ok(v.clone())))
            .err()
            .expect("blank name rejected");
        assert!(matches!(err, Error::OperatorKeyMissing));
    }

    #[test]
    fn test_names_are_sorted() {
        let registry = OperatorRegistry::builder()
            .register_shared("upper", constant(json!("A")))
            .and_then(|b| b.register_shared("lower", constant(json!("a"))))
            .unwrap()
            .build();

        assert_eq!(registry.names(), vec!["lower", "upper"]);
        assert!(format!("{registry:?}").contains("lower"));
    }
}
