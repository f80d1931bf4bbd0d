//! Schema inspection: per-type field metadata
//!
//! Copyright (c) 2025 Fieldwise Team
//! Licensed under the Apache-2.0 license

use super::descriptor::{FieldDecl, TypeDescriptor};
use std::collections::HashMap;

/// Type information for one field of a record
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTypeDescriptor {
    declared: TypeDescriptor,
    element: Option<TypeDescriptor>,
}

impl FieldTypeDescriptor {
    /// Build a descriptor from a declared type, extracting the element type of
    /// collections
    pub fn new(declared: TypeDescriptor) -> Self {
        let element = if declared.is_collection() {
            let element = declared.element_type();
            if element.is_none() {
                tracing::warn!(
                    type_name = declared.name(),
                    "collection type has no resolvable element type"
                );
            }
            element
        } else {
            None
        };

        Self { declared, element }
    }

    fn from_decl(decl: &FieldDecl) -> Self {
        Self::new(decl.ty())
    }

    pub fn declared_type(&self) -> &TypeDescriptor {
        &self.declared
    }

    pub fn element_type(&self) -> Option<&TypeDescriptor> {
        self.element.as_ref()
    }

    pub fn is_collection(&self) -> bool {
        self.declared.is_collection()
    }

    /// The type operators should target: the element type for collections,
    /// otherwise the declared type
    pub fn effective_type(&self) -> &TypeDescriptor {
        self.element.as_ref().unwrap_or(&self.declared)
    }
}

/// Field metadata for one concrete type, inherited fields included
#[derive(Debug, Clone, Default)]
pub struct Schema {
    type_name: &'static str,
    fields: HashMap<String, FieldTypeDescriptor>,
}

impl Schema {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn field(&self, name: &str) -> Option<&FieldTypeDescriptor> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Compute the schema of a type
///
/// Base records are inspected first so that fields declared on the type itself
/// replace inherited fields of the same name. Non-record types have an empty
/// schema.
pub fn inspect(ty: &TypeDescriptor) -> Schema {
    let mut fields = HashMap::new();
    collect_fields(ty, &mut fields);

    Schema {
        type_name: ty.name(),
        fields,
    }
}

fn collect_fields(ty: &TypeDescriptor, fields: &mut HashMap<String, FieldTypeDescriptor>) {
    let Some(layout) = ty.layout() else {
        return;
    };

    if let Some(parent) = layout.parent() {
        collect_fields(&parent, fields);
    }

    for decl in layout.fields().iter().filter(|decl| !decl.is_synthetic()) {
        fields.insert(decl.name().to_string(), FieldTypeDescriptor::from_decl(decl));
    }
}
