//! Fieldwise Operators - built-in operators and declarative operator catalogs
//!
//! # Example
//!
//! ```
//! use fieldwise_core::{Described, SelectionNode, TransformationContext, Transformer, TypeDescriptor};
//! use fieldwise_operators::OperatorCatalog;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Login {
//!     user: String,
//!     password: String,
//! }
//!
//! impl Described for Login {
//!     fn describe() -> TypeDescriptor {
//!         TypeDescriptor::record::<Self>()
//!             .field::<String>("user")
//!             .field::<String>("password")
//!             .build()
//!     }
//! }
//!
//! let registry = OperatorCatalog::standard().build_registry().unwrap();
//! let transformer = Transformer::new(registry);
//! let context = TransformationContext::new(
//!     "mask",
//!     SelectionNode::new("login").transform(SelectionNode::new("password")),
//! );
//!
//! let login = Login { user: "ada".into(), password: "hunter2".into() };
//! let masked = transformer.transform(login, &context).unwrap();
//! assert_eq!(masked.password, "***");
//! assert_eq!(masked.user, "ada");
//! ```

pub mod built_in;
pub mod catalog;
pub mod error;

pub use catalog::{OperatorCatalog, OperatorDefinition, OperatorSpec};
pub use error::{CatalogError, OperatorError};

use fieldwise_core::OperatorRegistry;

/// Registry of the standard operator set
pub fn standard_registry() -> fieldwise_core::Result<OperatorRegistry> {
    Ok(OperatorCatalog::standard().build_registry()?)
}
