//! Static type descriptors
//!
//! Rust has no runtime reflection, so every type that takes part in a
//! transformation describes itself through the [`Described`] trait. The
//! descriptor records what the engine needs to know about a type: whether it
//! is a scalar, a collection (and of what), a map, a record with named fields,
//! or something opaque.
//!
//! Field and element types are referenced through function pointers and only
//! resolved on demand, so self-referential types can be described without
//! infinite recursion.
//!
//! ```
//! use fieldwise_core::{Described, TypeDescriptor};
//!
//! struct Address {
//!     city: String,
//! }
//!
//! struct Person {
//!     name: String,
//!     tags: Vec<String>,
//!     address: Option<Address>,
//! }
//!
//! impl Described for Address {
//!     fn describe() -> TypeDescriptor {
//!         TypeDescriptor::record::<Self>().field::<String>("city").build()
//!     }
//! }
//!
//! impl Described for Person {
//!     fn describe() -> TypeDescriptor {
//!         TypeDescriptor::record::<Self>()
//!             .field::<String>("name")
//!             .field::<Vec<String>>("tags")
//!             .field::<Option<Address>>("address")
//!             .build()
//!     }
//! }
//! ```
//!
//! Copyright (c) 2025 Fieldwise Team
//! Licensed under the Apache-2.0 license

use std::any::{type_name, TypeId};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

/// Lazily resolved reference to another type's descriptor
pub type TypeFn = fn() -> TypeDescriptor;

/// Types that can describe their own shape to the engine
pub trait Described {
    /// Build the descriptor for this type
    fn describe() -> TypeDescriptor;
}

/// Scalar categories operators can dispatch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Char,
    String,
    Integer,
    Float,
    Unit,
}

/// Shape of a described type
#[derive(Clone)]
pub enum TypeKind {
    /// Strings, numbers, booleans and friends
    Scalar(ScalarKind),
    /// Sequences and sets with one element type
    Collection { element: Option<TypeFn> },
    /// Keyed maps. Maps are not collections: operators never fan out over them.
    Map { value: Option<TypeFn> },
    /// Structs with named fields
    Record(RecordLayout),
    /// Dynamic values with no declared fields
    Opaque,
}

/// Field layout of a record type
#[derive(Clone, Default)]
pub struct RecordLayout {
    parent: Option<TypeFn>,
    fields: Vec<FieldDecl>,
}

impl RecordLayout {
    /// The flattened base record, if any
    pub fn parent(&self) -> Option<TypeDescriptor> {
        self.parent.map(|describe| describe())
    }

    /// Fields declared directly on this record, in declaration order
    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }
}

/// One declared field of a record
#[derive(Clone)]
pub struct FieldDecl {
    name: String,
    ty: TypeFn,
    synthetic: bool,
}

impl FieldDecl {
    /// Field name as it appears in the serialized tree
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve the declared type of this field
    pub fn ty(&self) -> TypeDescriptor {
        (self.ty)()
    }

    /// Synthetic fields exist on the type but never in the serialized tree
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}

impl fmt::Debug for FieldDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDecl")
            .field("name", &self.name)
            .field("synthetic", &self.synthetic)
            .finish()
    }
}

/// Description of one concrete type
#[derive(Clone)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
    kind: TypeKind,
}

impl TypeDescriptor {
    /// Describe `T` with an explicit kind
    pub fn new<T: ?Sized + 'static>(kind: TypeKind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            kind,
        }
    }

    /// Describe `T` as a scalar
    pub fn scalar<T: ?Sized + 'static>(kind: ScalarKind) -> Self {
        Self::new::<T>(TypeKind::Scalar(kind))
    }

    /// Describe `T` as a collection of `E`
    pub fn collection<T: ?Sized + 'static, E: Described>() -> Self {
        Self::new::<T>(TypeKind::Collection {
            element: Some(E::describe),
        })
    }

    /// Describe `T` as a map with values of `V`
    pub fn map<T: ?Sized + 'static, V: Described>() -> Self {
        Self::new::<T>(TypeKind::Map {
            value: Some(V::describe),
        })
    }

    /// Describe `T` as opaque
    pub fn opaque<T: ?Sized + 'static>() -> Self {
        Self::new::<T>(TypeKind::Opaque)
    }

    /// Start describing `T` as a record
    pub fn record<T: ?Sized + 'static>() -> RecordBuilder {
        RecordBuilder {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            layout: RecordLayout::default(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Scalar category, if this is a scalar type
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self.kind {
            TypeKind::Scalar(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, TypeKind::Collection { .. })
    }

    pub fn is_record(&self) -> bool {
        matches!(self.kind, TypeKind::Record(_))
    }

    /// Element type of a collection
    pub fn element_type(&self) -> Option<TypeDescriptor> {
        match &self.kind {
            TypeKind::Collection { element } => element.map(|describe| describe()),
            _ => None,
        }
    }

    /// Record layout, if this is a record
    pub fn layout(&self) -> Option<&RecordLayout> {
        match &self.kind {
            TypeKind::Record(layout) => Some(layout),
            _ => None,
        }
    }

    /// Names of the non-synthetic fields declared directly on this type
    ///
    /// Base-record fields are not included; use the schema for the full set.
    pub fn declared_field_names(&self) -> impl Iterator<Item = &str> {
        self.layout()
            .map(|layout| layout.fields())
            .unwrap_or_default()
            .iter()
            .filter(|field| !field.is_synthetic())
            .map(FieldDecl::name)
    }

    /// Convenience check for string-typed targets
    pub fn is_string(&self) -> bool {
        matches!(self.scalar_kind(), Some(ScalarKind::String | ScalarKind::Char))
    }

    /// Convenience check for integer-typed targets
    pub fn is_integer(&self) -> bool {
        self.scalar_kind() == Some(ScalarKind::Integer)
    }

    /// Convenience check for numeric targets
    pub fn is_numeric(&self) -> bool {
        matches!(self.scalar_kind(), Some(ScalarKind::Integer | ScalarKind::Float))
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            TypeKind::Scalar(kind) => format!("Scalar({kind:?})"),
            TypeKind::Collection { .. } => "Collection".to_string(),
            TypeKind::Map { .. } => "Map".to_string(),
            TypeKind::Record(layout) => format!("Record({} fields)", layout.fields.len()),
            TypeKind::Opaque => "Opaque".to_string(),
        };
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

/// Fluent builder for record descriptors
pub struct RecordBuilder {
    id: TypeId,
    name: &'static str,
    layout: RecordLayout,
}

impl RecordBuilder {
    /// Inherit the fields of a flattened base record
    ///
    /// Fields declared on this record override base fields of the same name.
    pub fn extends<P: Described>(mut self) -> Self {
        self.layout.parent = Some(P::describe);
        self
    }

    /// Declare a field of type `F`
    pub fn field<F: Described>(mut self, name: impl Into<String>) -> Self {
        self.layout.fields.push(FieldDecl {
            name: name.into(),
            ty: F::describe,
            synthetic: false,
        });
        self
    }

    /// Declare a field that is never serialized (`#[serde(skip)]`, markers)
    pub fn synthetic_field<F: Described>(mut self, name: impl Into<String>) -> Self {
        self.layout.fields.push(FieldDecl {
            name: name.into(),
            ty: F::describe,
            synthetic: true,
        });
        self
    }

    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor {
            id: self.id,
            name: self.name,
            kind: TypeKind::Record(self.layout),
        }
    }
}

macro_rules! describe_scalars {
    ($kind:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Described for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::scalar::<$ty>($kind)
                }
            }
        )+
    };
}

describe_scalars!(ScalarKind::Bool => bool);
describe_scalars!(ScalarKind::Char => char);
describe_scalars!(ScalarKind::String => String, str);
describe_scalars!(ScalarKind::Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
describe_scalars!(ScalarKind::Float => f32, f64);
describe_scalars!(ScalarKind::Unit => ());

// Nullable and pointer wrappers are transparent.
impl<T: Described> Described for Option<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Described + ?Sized> Described for Box<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Described + ?Sized> Described for Arc<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Described + ?Sized> Described for Rc<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Described + 'static> Described for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::collection::<Self, T>()
    }
}

impl<T: Described + 'static> Described for VecDeque<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::collection::<Self, T>()
    }
}

impl<T: Described + 'static> Described for HashSet<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::collection::<Self, T>()
    }
}

impl<T: Described + 'static> Described for BTreeSet<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::collection::<Self, T>()
    }
}

impl<K: 'static, V: Described + 'static> Described for HashMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map::<Self, V>()
    }
}

impl<K: 'static, V: Described + 'static> Described for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map::<Self, V>()
    }
}

impl<T: 'static> Described for PhantomData<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::opaque::<Self>()
    }
}

impl Described for serde_json::Value {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::opaque::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Node {
        #[allow(dead_code)]
        children: Vec<Node>,
    }

    impl Described for Node {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::record::<Self>()
                .field::<Vec<Node>>("children")
                .build()
        }
    }

    #[test]
    fn test_scalar_descriptors() {
        assert_eq!(String::describe().scalar_kind(), Some(ScalarKind::String));
        assert_eq!(u32::describe().scalar_kind(), Some(ScalarKind::Integer));
        assert!(f64::describe().is_numeric());
        assert!(!bool::describe().is_collection());
    }

    #[test]
    fn test_wrappers_are_transparent() {
        assert_eq!(Option::<String>::describe(), String::describe());
        assert_eq!(Box::<i64>::describe(), i64::describe());
        assert_eq!(Option::<Arc<Node>>::describe(), Node::describe());
    }

    #[test]
    fn test_collection_element_type() {
        let ty = Vec::<Option<String>>::describe();
        assert!(ty.is_collection());
        assert_eq!(ty.element_type(), Some(String::describe()));

        let set = BTreeSet::<u8>::describe();
        assert_eq!(set.element_type(), Some(u8::describe()));
    }

    #[test]
    fn test_maps_are_not_collections() {
        let ty = HashMap::<String, String>::describe();
        assert!(!ty.is_collection());
        assert!(ty.element_type().is_none());
    }

    #[test]
    fn test_self_referential_record() {
        let ty = Node::describe();
        let layout = ty.layout().expect("record layout");
        let children = layout.fields()[0].ty();

        assert!(children.is_collection());
        assert_eq!(children.element_type(), Some(Node::describe()));
    }

    #[test]
    fn test_declared_field_names_skip_synthetic() {
        struct Tagged;
        impl Described for Tagged {
            fn describe() -> TypeDescriptor {
                TypeDescriptor::record::<Self>()
                    .field::<String>("label")
                    .synthetic_field::<PhantomData<u8>>("marker")
                    .build()
            }
        }

        let ty = Tagged::describe();
        let names: Vec<&str> = ty.declared_field_names().collect();
        assert_eq!(names, vec!["label"]);
    }
}
