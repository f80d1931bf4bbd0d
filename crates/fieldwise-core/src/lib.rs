//! Fieldwise Core - Selective, type-aware transformation of structured values
//!
//! This crate walks a serialized value tree and replaces the fields named by
//! a declarative selection with the output of pluggable operators. Values are
//! converted to a tree, transformed in place and converted back into their
//! original type.
//!
//! # Main Components
//!
//! - **Selections**: [`SelectionNode`] trees paired with a default operator in a
//!   [`TransformationContext`]
//! - **Schemas**: static [`TypeDescriptor`]s supplied through [`Described`],
//!   cached per type in a [`SchemaCache`]
//! - **Operators**: the [`Operator`] trait and an immutable [`OperatorRegistry`]
//! - **Engine**: the [`Transformer`] facade and its [`TransformerBuilder`]
//! - **Error Handling**: error types using `thiserror` and `anyhow`
//!
//! # Example
//!
//! ```
//! use fieldwise_core::{
//!     operator, Described, OperatorRegistry, Result, SelectionNode,
//!     TransformationContext, Transformer, TypeDescriptor,
//! };
//! use serde::{Deserialize, Serialize};
//! use serde_json::Value;
//!
//! #[derive(Serialize, Deserialize)]
//! struct User {
//!     login: String,
//!     tags: Vec<String>,
//! }
//!
//! impl Described for User {
//!     fn describe() -> TypeDescriptor {
//!         TypeDescriptor::record::<Self>()
//!             .field::<String>("login")
//!             .field::<Vec<String>>("tags")
//!             .build()
//!     }
//! }
//!
//! fn example() -> Result<()> {
//!     let transformer = Transformer::builder()
//!         .operator(
//!             "upper",
//!             operator::from_fn(|value, _target| {
//!                 Ok(match value {
//!                     Value::String(s) => Value::String(s.to_uppercase()),
//!                     other => other.clone(),
//!                 })
//!             }),
//!         )
//!         .build()?;
//!
//!     let context = TransformationContext::new("upper", SelectionNode::new("user").transform_all());
//!     let user = transformer.transform(
//!         User { login: "ada".into(), tags: vec!["admin".into()] },
//!         &context,
//!     )?;
//!
//!     assert_eq!(user.login, "ADA");
//!     assert_eq!(user.tags, vec!["ADMIN"]);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod builder;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod operator;
pub mod registry;
pub mod schema;
pub mod selection;
pub mod transformer;

// Re-export main types for convenience
pub use builder::TransformerBuilder;
pub use codec::{JsonCodec, TreeCodec};
pub use config::{EngineConfig, SchemaCacheConfig};
pub use error::{Error, ErrorCode, Result};
pub use operator::Operator;
pub use registry::{OperatorRegistry, OperatorRegistryBuilder};
pub use schema::{CacheStats, Described, SchemaCache, TypeDescriptor, TypeKind};
pub use selection::{SelectionNode, TransformationContext};
pub use transformer::Transformer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
