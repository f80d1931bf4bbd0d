//! Per-field strategy dispatch
//!
//! A field whose selection carries no sub-selection is a terminal value and is
//! handed to an operator ([`FieldStrategy::Direct`]). Any sub-selection, even
//! an empty list, means the walker descends into the field's value instead
//! ([`FieldStrategy::Nested`]).

use super::walker::NodeWalker;
use crate::error::{Error, Result};
use crate::registry::OperatorRegistry;
use crate::schema::FieldTypeDescriptor;
use crate::selection::TransformationContext;
use serde_json::{Map, Value};

/// How a selected field is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStrategy {
    /// Apply an operator to the field value (or to each element)
    Direct,
    /// Recurse into the field value with the field's own selection
    Nested,
}

impl FieldStrategy {
    /// Choose the strategy for a field from its context
    pub fn select(context: &TransformationContext) -> Self {
        match &context.selection {
            Some(node) if node.has_sub_selection() => FieldStrategy::Nested,
            _ => FieldStrategy::Direct,
        }
    }

    /// Process `field` of `parent` with this strategy
    pub(crate) fn process(
        self,
        walker: &NodeWalker<'_>,
        parent: &mut Map<String, Value>,
        field: &str,
        context: &TransformationContext,
        descriptor: &FieldTypeDescriptor,
    ) -> Result<()> {
        match self {
            FieldStrategy::Direct => {
                apply_direct(walker.operators(), parent, field, context, descriptor)
            }
            FieldStrategy::Nested => match parent.get_mut(field) {
                Some(child) => walker.walk(child, descriptor.effective_type(), context),
                None => Ok(()),
            },
        }
    }
}

fn apply_direct(
    operators: &OperatorRegistry,
    parent: &mut Map<String, Value>,
    field: &str,
    context: &TransformationContext,
    descriptor: &FieldTypeDescriptor,
) -> Result<()> {
    let operator_name = context.resolve_operator_name();
    let operator = operators.get(operator_name)?;
    let operator_name = operator_name.unwrap_or_default();
    let target = descriptor.effective_type();

    tracing::trace!(field, operator = operator_name, target = target.name(), "applying operator");

    if descriptor.is_collection() {
        // Absent or non-array values are left alone.
        if let Some(Value::Array(items)) = parent.get_mut(field) {
            for item in items.iter_mut() {
                *item = operator
                    .apply(item, target)
                    .map_err(|source| operator_failed(operator_name, field, source))?;
            }
        }
        return Ok(());
    }

    let null = Value::Null;
    let current = parent.get(field).unwrap_or(&null);
    let replacement = operator
        .apply(current, target)
        .map_err(|source| operator_failed(operator_name, field, source))?;
    parent.insert(field.to_string(), replacement);

    Ok(())
}

fn operator_failed(operator: &str, field: &str, source: anyhow::Error) -> Error {
    Error::OperatorFailed {
        operator: operator.to_string(),
        field: field.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::from_fn;
    use crate::schema::{Described, SchemaCache};
    use crate::selection::SelectionNode;
    use serde_json::json;

    fn registry() -> OperatorRegistry {
        OperatorRegistry::builder()
            .register(
                "upper",
                from_fn(|value, _target| {
                    Ok(match value {
                        Value::String(s) => Value::String(s.to_uppercase()),
                        other => other.clone(),
                    })
                }),
            )
            .and_then(|b| {
                b.register(
                    "type_name",
                    from_fn(|_value, target| Ok(Value::String(target.name().to_string()))),
                )
            })
            .and_then(|b| b.register("fail", from_fn(|_v, _t| anyhow::bail!("boom"))))
            .unwrap()
            .build()
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test fixture must be an object"),
        }
    }

    fn direct(
        parent: &mut Map<String, Value>,
        field: &str,
        context: &TransformationContext,
        descriptor: &FieldTypeDescriptor,
    ) -> Result<()> {
        let operators = registry();
        let schemas = SchemaCache::new();
        let walker = NodeWalker::new(&schemas, &operators);
        FieldStrategy::Direct.process(&walker, parent, field, context, descriptor)
    }

    #[test]
    fn test_strategy_selection() {
        let leaf = TransformationContext::new("mask", SelectionNode::new("name"));
        assert_eq!(FieldStrategy::select(&leaf), FieldStrategy::Direct);

        let all = TransformationContext::new("mask", SelectionNode::new("address").transform_all());
        assert_eq!(FieldStrategy::select(&all), FieldStrategy::Nested);

        let mut empty = SelectionNode::new("address");
        empty.skip_fields = Some(Vec::new());
        assert_eq!(
            FieldStrategy::select(&TransformationContext::new("mask", empty)),
            FieldStrategy::Nested
        );
    }

    #[test]
    fn test_direct_scalar() {
        let mut parent = object(json!({"name": "alice", "age": 3}));
        let ctx = TransformationContext::new("upper", SelectionNode::new("name"));

        direct(&mut parent, "name", &ctx, &FieldTypeDescriptor::new(String::describe())).unwrap();

        assert_eq!(parent["name"], json!("ALICE"));
        assert_eq!(parent["age"], json!(3));
    }

    #[test]
    fn test_direct_collection_targets_element_type() {
        let mut parent = object(json!({"tags": ["one", "two"]}));
        let ctx = TransformationContext::new("type_name", SelectionNode::new("tags"));

        direct(&mut parent, "tags", &ctx, &FieldTypeDescriptor::new(Vec::<u8>::describe())).unwrap();

        assert_eq!(parent["tags"], json!(["u8", "u8"]));
    }

    #[test]
    fn test_direct_collection_ignores_non_arrays() {
        let mut parent = object(json!({"tags": "not-a-list"}));
        let ctx = TransformationContext::new("upper", SelectionNode::new("tags"));
        let descriptor = FieldTypeDescriptor::new(Vec::<String>::describe());

        direct(&mut parent, "tags", &ctx, &descriptor).unwrap();
        direct(&mut parent, "missing", &ctx, &descriptor).unwrap();

        assert_eq!(parent["tags"], json!("not-a-list"));
        assert!(!parent.contains_key("missing"));
    }

    #[test]
    fn test_direct_absent_scalar_receives_null() {
        let mut parent = object(json!({}));
        let ctx = TransformationContext::new("type_name", SelectionNode::new("nickname"));

        direct(&mut parent, "nickname", &ctx, &FieldTypeDescriptor::new(String::describe())).unwrap();

        assert_eq!(parent["nickname"], json!(String::describe().name()));
    }

    #[test]
    fn test_direct_operator_errors() {
        let mut parent = object(json!({"name": "x"}));
        let descriptor = FieldTypeDescriptor::new(String::describe());

        let unknown = TransformationContext::new("rot13", SelectionNode::new("name"));
        assert!(matches!(
            direct(&mut parent, "name", &unknown, &descriptor),
            Err(Error::UnknownOperator { .. })
        ));

        let missing = TransformationContext::without_default(SelectionNode::new("name"));
        assert!(matches!(
            direct(&mut parent, "name", &missing, &descriptor),
            Err(Error::OperatorKeyMissing)
        ));

        let failing = TransformationContext::new("fail", SelectionNode::new("name"));
        match direct(&mut parent, "name", &failing, &descriptor) {
            Err(Error::OperatorFailed { operator, field, .. }) => {
                assert_eq!(operator, "fail");
                assert_eq!(field, "name");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
