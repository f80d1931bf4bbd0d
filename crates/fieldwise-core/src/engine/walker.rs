//! Recursive tree walker
//!
//! Objects are resolved against their type's schema one level at a time;
//! sequences are walked element by element with the same context.

use super::resolver::resolve;
use super::strategy::FieldStrategy;
use crate::error::{Error, Result};
use crate::registry::OperatorRegistry;
use crate::schema::{SchemaCache, TypeDescriptor};
use crate::selection::TransformationContext;
use serde_json::{Map, Value};

pub(crate) struct NodeWalker<'a> {
    schemas: &'a SchemaCache,
    operators: &'a OperatorRegistry,
}

impl<'a> NodeWalker<'a> {
    pub(crate) fn new(schemas: &'a SchemaCache, operators: &'a OperatorRegistry) -> Self {
        Self { schemas, operators }
    }

    pub(crate) fn operators(&self) -> &OperatorRegistry {
        self.operators
    }

    /// Walk `node`, a value of type `ty`, applying `context`
    ///
    /// Scalars and nulls are left untouched.
    pub(crate) fn walk(
        &self,
        node: &mut Value,
        ty: &TypeDescriptor,
        context: &TransformationContext,
    ) -> Result<()> {
        match node {
            Value::Object(map) => self.walk_object(map, ty, context),
            Value::Array(items) => self.walk_sequence(items, ty, context),
            _ => Ok(()),
        }
    }

    fn walk_object(
        &self,
        map: &mut Map<String, Value>,
        ty: &TypeDescriptor,
        context: &TransformationContext,
    ) -> Result<()> {
        let operations = resolve(context, ty);
        if operations.is_empty() {
            return Ok(());
        }

        let schema = self.schemas.get_or_inspect(ty);
        for (field, field_context) in &operations {
            let descriptor = schema.field(field).ok_or_else(|| Error::FieldNotFound {
                field: field.clone(),
                type_name: ty.name().to_string(),
            })?;

            if !field_context.is_valid() {
                continue;
            }

            let strategy = FieldStrategy::select(field_context);
            tracing::trace!(type_name = ty.name(), field = %field, ?strategy, "processing field");
            strategy.process(self, map, field, field_context, descriptor)?;
        }

        Ok(())
    }

    fn walk_sequence(
        &self,
        items: &mut [Value],
        ty: &TypeDescriptor,
        context: &TransformationContext,
    ) -> Result<()> {
        // Root sequences carry their own element type; nested ones are
        // already narrowed to it.
        let element = ty.element_type().unwrap_or_else(|| ty.clone());

        for item in items.iter_mut().filter(|item| item.is_object()) {
            self.walk(item, &element, context)?;
        }

        Ok(())
    }
}
