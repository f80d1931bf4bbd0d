//! Type descriptors, schema inspection and the schema cache

mod cache;
mod descriptor;
mod inspector;

pub use cache::{CacheStats, SchemaCache};
pub use descriptor::{
    Described, FieldDecl, RecordBuilder, RecordLayout, ScalarKind, TypeDescriptor, TypeFn, TypeKind,
};
pub use inspector::{inspect, FieldTypeDescriptor, Schema};
