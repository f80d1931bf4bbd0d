//! Declarative selection trees
//!
//! A [`SelectionNode`] says which fields of an object to transform, which to
//! skip, and where to descend further. A [`TransformationContext`] pairs a
//! selection with the operator applied to fields that do not name their own.
//!
//! Both types deserialize from camelCase documents, so selections can live in
//! configuration files:
//!
//! ```json
//! {
//!   "defaultOperatorName": "mask",
//!   "selection": {
//!     "fieldName": "root",
//!     "transformAllFields": true,
//!     "skipFields": [{ "fieldName": "id" }],
//!     "transformFields": [
//!       { "fieldName": "address", "transformAllFields": true }
//!     ]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// One node of a selection tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionNode {
    /// Field this node describes; for the root node, a token naming the subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,

    /// Operator override for this field
    #[serde(alias = "operateType", skip_serializing_if = "Option::is_none")]
    pub operator_name: Option<String>,

    /// Make every declared field of the current object a candidate
    pub transform_all_fields: bool,

    /// Fields removed from the `transform_all_fields` set; only names are read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_fields: Option<Vec<SelectionNode>>,

    /// Fields with an explicit, possibly nested, selection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform_fields: Option<Vec<SelectionNode>>,
}

impl SelectionNode {
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: Some(field_name.into()),
            ..Self::default()
        }
    }

    pub fn with_operator(mut self, operator_name: impl Into<String>) -> Self {
        self.operator_name = Some(operator_name.into());
        self
    }

    /// Select every declared field of the object this node describes
    pub fn transform_all(mut self) -> Self {
        self.transform_all_fields = true;
        self
    }

    pub fn skip(mut self, field_name: impl Into<String>) -> Self {
        self.skip_fields
            .get_or_insert_with(Vec::new)
            .push(SelectionNode::new(field_name));
        self
    }

    pub fn transform(mut self, node: SelectionNode) -> Self {
        self.transform_fields.get_or_insert_with(Vec::new).push(node);
        self
    }

    /// The field name, if present and non-empty
    pub fn name(&self) -> Option<&str> {
        self.field_name.as_deref().filter(|name| !name.is_empty())
    }

    /// The operator override, if present and non-empty
    pub fn operator(&self) -> Option<&str> {
        self.operator_name.as_deref().filter(|name| !name.is_empty())
    }

    /// True when this node asks to descend rather than transform a value
    ///
    /// An empty `skip_fields` or `transform_fields` list still counts.
    pub fn has_sub_selection(&self) -> bool {
        self.transform_all_fields || self.skip_fields.is_some() || self.transform_fields.is_some()
    }
}

/// A selection paired with its default operator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformationContext {
    /// Operator for fields without an explicit override
    #[serde(alias = "defaultOperatorType", skip_serializing_if = "Option::is_none")]
    pub default_operator_name: Option<String>,

    #[serde(alias = "nodeContext", skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionNode>,
}

impl TransformationContext {
    pub fn new(default_operator_name: impl Into<String>, selection: SelectionNode) -> Self {
        Self {
            default_operator_name: Some(default_operator_name.into()),
            selection: Some(selection),
        }
    }

    /// A context without a default operator; every field must name its own
    pub fn without_default(selection: SelectionNode) -> Self {
        Self {
            default_operator_name: None,
            selection: Some(selection),
        }
    }

    /// A context is valid when its selection has a non-empty field name.
    /// Invalid contexts turn every engine entry point into a no-op.
    pub fn is_valid(&self) -> bool {
        self.selection.as_ref().and_then(SelectionNode::name).is_some()
    }

    /// Operator for the field this context describes: the field's own
    /// override, falling back to the default
    pub fn resolve_operator_name(&self) -> Option<&str> {
        self.selection
            .as_ref()
            .and_then(SelectionNode::operator)
            .or_else(|| self.default_operator_name.as_deref().filter(|name| !name.is_empty()))
    }

    /// Context for a child selection, inheriting the default operator
    pub(crate) fn child(&self, selection: SelectionNode) -> Self {
        Self {
            default_operator_name: self.default_operator_name.clone(),
            selection: Some(selection),
        }
    }
}
