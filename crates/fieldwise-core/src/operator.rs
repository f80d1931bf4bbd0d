//! The operator capability
//!
//! An operator is a named, pure value transformer. It receives the current
//! tree value of a field (`Value::Null` when the field is absent) and the type
//! the field is declared with, and returns the replacement value.

use crate::schema::TypeDescriptor;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A pluggable value transformer
pub trait Operator: Send + Sync {
    /// Transform `input`, a value destined for a field of type `target`
    ///
    /// For collection fields the operator is called once per element, and
    /// `target` is the element type.
    fn apply(&self, input: &Value, target: &TypeDescriptor) -> anyhow::Result<Value>;
}

impl<O: Operator + ?Sized> Operator for Arc<O> {
    fn apply(&self, input: &Value, target: &TypeDescriptor) -> anyhow::Result<Value> {
        (**self).apply(input, target)
    }
}

impl<O: Operator + ?Sized> Operator for Box<O> {
    fn apply(&self, input: &Value, target: &TypeDescriptor) -> anyhow::Result<Value> {
        (**self).apply(input, target)
    }
}

/// Operator backed by a closure, see [`from_fn`]
#[derive(Clone)]
pub struct FnOperator<F> {
    func: F,
}

/// Wrap a closure as an [`Operator`]
///
/// ```
/// use fieldwise_core::operator::{self, Operator};
/// use fieldwise_core::Described;
/// use serde_json::{json, Value};
///
/// let upper = operator::from_fn(|value, _target| {
///     Ok(match value {
///         Value::String(s) => Value::String(s.to_uppercase()),
///         other => other.clone(),
///     })
/// });
///
/// let out = upper.apply(&json!("abc"), &String::describe()).unwrap();
/// assert_eq!(out, json!("ABC"));
/// ```
pub fn from_fn<F>(func: F) -> FnOperator<F>
where
    F: Fn(&Value, &TypeDescriptor) -> anyhow::Result<Value> + Send + Sync,
{
    FnOperator { func }
}

impl<F> Operator for FnOperator<F>
where
    F: Fn(&Value, &TypeDescriptor) -> anyhow::Result<Value> + Send + Sync,
{
    fn apply(&self, input: &Value, target: &TypeDescriptor) -> anyhow::Result<Value> {
        (self.func)(input, target)
    }
}

impl<F> fmt::Debug for FnOperator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOperator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Described;
    use serde_json::json;

    #[test]
    fn test_from_fn_receives_target_type() {
        let describe = from_fn(|_value, target| Ok(Value::String(target.name().to_string())));

        let out = describe.apply(&Value::Null, &u64::describe()).unwrap();
        assert_eq!(out, json!("u64"));
    }

    #[test]
    fn test_shared_operator_delegates() {
        let shared: Arc<dyn Operator> = Arc::new(from_fn(|_value, _target| Ok(json!(1))));
        assert_eq!(shared.apply(&json!("x"), &String::describe()).unwrap(), json!(1));
    }

    #[test]
    fn test_errors_propagate() {
        let failing = from_fn(|value, _target| anyhow::bail!("cannot handle {value}"));
        let err = failing.apply(&json!(3), &i32::describe()).unwrap_err();
        assert_eq!(err.to_string(), "cannot handle 3");
    }
}
