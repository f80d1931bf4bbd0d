//! Selection resolution: which fields of one object get which context

use crate::schema::TypeDescriptor;
use crate::selection::{SelectionNode, TransformationContext};
use std::collections::BTreeMap;

/// Field name → context for that field, for one level of an object
pub type FieldOperationMap = BTreeMap<String, TransformationContext>;

/// Resolve a context against a type into per-field contexts
///
/// Order matters: the `transform_all_fields` set is seeded first, then
/// `skip_fields` removes from it, then `transform_fields` inserts or
/// overwrites. Explicit entries therefore always win over skips. Invalid
/// contexts resolve to an empty map.
pub fn resolve(context: &TransformationContext, ty: &TypeDescriptor) -> FieldOperationMap {
    let mut operations = FieldOperationMap::new();
    let Some(node) = context.selection.as_ref().filter(|_| context.is_valid()) else {
        return operations;
    };

    if node.transform_all_fields {
        for name in ty.declared_field_names() {
            let selection = SelectionNode {
                field_name: Some(name.to_string()),
                operator_name: node.operator_name.clone(),
                ..SelectionNode::default()
            };
            operations.insert(name.to_string(), context.child(selection));
        }
    }

    for skipped in node.skip_fields.iter().flatten() {
        if let Some(name) = skipped.field_name.as_deref() {
            operations.remove(name);
        }
    }

    // A nameless entry is keyed by "" and surfaces as a missing field.
    for explicit in node.transform_fields.iter().flatten() {
        let name = explicit.field_name.clone().unwrap_or_default();
        operations.insert(name, context.child(explicit.clone()));
    }

    operations
}
