//! Type descriptors and the registry the generic serializer walks.
//!
//! A [`TypeDescriptor`] is an ordered list of [`FieldDescriptor`]s. Each field has a name, a
//! declared [`FieldKind`] and an accessor that reads a [`Value`] out of an instance without
//! mutating it. Descriptors are built by composition through [`DescriptorBuilder`] and handed
//! to a [`TypeRegistry`], which owns them from then on.
//!
//! The registry is populated through `&mut self` and read through `&self`, so the borrow
//! checker enforces the build-once, read-many discipline: nothing can register a type while a
//! serializer holds a borrow of the registry.

use std::any::{type_name, Any};
use std::borrow::{Borrow, Cow};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;

use crate::error::SchemaError;

/// Identifier of a registered record type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Cow<'static, str>);

impl TypeName {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for TypeName {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl Borrow<str> for TypeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Semantic kind of a field, fixed when the field is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    FloatingPoint,
    Boolean,
    Text,
    NestedRecord(TypeName),
    SequenceOfRecord(TypeName),
}

impl FieldKind {
    /// Whether a value of this kind maps to a single scalar column.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, FieldKind::NestedRecord(_) | FieldKind::SequenceOfRecord(_))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Integer => f.write_str("Integer"),
            FieldKind::FloatingPoint => f.write_str("FloatingPoint"),
            FieldKind::Boolean => f.write_str("Boolean"),
            FieldKind::Text => f.write_str("Text"),
            FieldKind::NestedRecord(t) => write!(f, "NestedRecord({t})"),
            FieldKind::SequenceOfRecord(t) => write!(f, "SequenceOfRecord({t})"),
        }
    }
}

/// An ordered, indexable collection of records, as returned by sequence accessors.
pub trait RecordSeq {
    fn len(&self) -> usize;

    fn item(&self, index: usize) -> Option<&dyn Any>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Any> RecordSeq for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn item(&self, index: usize) -> Option<&dyn Any> {
        self.get(index).map(|v| v as &dyn Any)
    }
}

/// A tagged value read from an instance by a field accessor.
#[derive(Clone, Copy)]
pub enum Value<'a> {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(&'a str),
    Record(&'a dyn Any),
    Sequence(&'a dyn RecordSeq),
}

impl Value<'_> {
    /// Name of the variant, used in kind-mismatch diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Float(_) => "FloatingPoint",
            Value::Bool(_) => "Boolean",
            Value::Text(_) => "Text",
            Value::Record(_) => "NestedRecord",
            Value::Sequence(_) => "SequenceOfRecord",
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => f.debug_tuple("Integer").field(v).finish(),
            Value::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Text(v) => f.debug_tuple("Text").field(v).finish(),
            Value::Record(_) => f.write_str("Record(..)"),
            Value::Sequence(seq) => write!(f, "Sequence(len={})", seq.len()),
        }
    }
}

trait ErasedAccessor: Send + Sync {
    fn read<'a>(&self, instance: &'a dyn Any) -> Option<Value<'a>>;
}

struct TypedAccessor<T, F> {
    accessor: F,
    _instance: PhantomData<fn(&T)>,
}

impl<T, F> ErasedAccessor for TypedAccessor<T, F>
where
    T: Any,
    F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync,
{
    fn read<'a>(&self, instance: &'a dyn Any) -> Option<Value<'a>> {
        instance.downcast_ref::<T>().map(|t| (self.accessor)(t))
    }
}

/// Describes one member of a record type: name, kind and accessor.
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    rust_type: &'static str,
    accessor: Box<dyn ErasedAccessor>,
}

impl FieldDescriptor {
    /// Creates a descriptor for a field of `T`.
    ///
    /// The accessor must return a value matching `kind` for every instance; the generic
    /// serializer reports [`SchemaError::KindMismatch`] when it does not.
    pub fn new<T, F>(name: impl Into<String>, kind: FieldKind, accessor: F) -> Self
    where
        T: Any,
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            rust_type: type_name::<T>(),
            accessor: Box::new(TypedAccessor {
                accessor,
                _instance: PhantomData,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Rust type the accessor was written against.
    pub fn rust_type(&self) -> &'static str {
        self.rust_type
    }

    /// Reads the field from `instance`, or `None` if `instance` is not the accessor's type.
    pub fn read<'a>(&self, instance: &'a dyn Any) -> Option<Value<'a>> {
        self.accessor.read(instance)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("rust_type", &self.rust_type)
            .finish_non_exhaustive()
    }
}

/// Ordered field list for one record shape. Field order is serialization order.
#[derive(Debug)]
pub struct TypeDescriptor {
    name: TypeName,
    fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    pub fn builder<T: Any>(name: impl Into<TypeName>) -> DescriptorBuilder<T> {
        DescriptorBuilder {
            name: name.into(),
            fields: Vec::new(),
            _record: PhantomData,
        }
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Attaches typed field accessors to a descriptor for the record type `T`.
pub struct DescriptorBuilder<T> {
    name: TypeName,
    fields: Vec<FieldDescriptor>,
    _record: PhantomData<fn(&T)>,
}

impl<T: Any> DescriptorBuilder<T> {
    pub fn integer<F>(self, name: &str, get: F) -> Self
    where
        F: Fn(&T) -> i64 + Send + Sync + 'static,
    {
        self.field(FieldDescriptor::new::<T, _>(name, FieldKind::Integer, move |r: &T| {
            Value::Integer(get(r))
        }))
    }

    pub fn float<F>(self, name: &str, get: F) -> Self
    where
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        self.field(FieldDescriptor::new::<T, _>(name, FieldKind::FloatingPoint, move |r: &T| {
            Value::Float(get(r))
        }))
    }

    pub fn boolean<F>(self, name: &str, get: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.field(FieldDescriptor::new::<T, _>(name, FieldKind::Boolean, move |r: &T| {
            Value::Bool(get(r))
        }))
    }

    pub fn text<F>(self, name: &str, get: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> &'a str + Send + Sync + 'static,
    {
        self.field(FieldDescriptor::new::<T, _>(name, FieldKind::Text, move |r: &T| {
            Value::Text(get(r))
        }))
    }

    /// A nested record of the registered type `target`.
    pub fn nested<U, F>(self, name: &str, target: impl Into<TypeName>, get: F) -> Self
    where
        U: Any,
        F: for<'a> Fn(&'a T) -> &'a U + Send + Sync + 'static,
    {
        let kind = FieldKind::NestedRecord(target.into());
        self.field(FieldDescriptor::new::<T, _>(name, kind, move |r: &T| {
            Value::Record(get(r))
        }))
    }

    /// An ordered sequence of records of the registered type `target`.
    pub fn sequence<S, F>(self, name: &str, target: impl Into<TypeName>, get: F) -> Self
    where
        S: RecordSeq + 'static,
        F: for<'a> Fn(&'a T) -> &'a S + Send + Sync + 'static,
    {
        let kind = FieldKind::SequenceOfRecord(target.into());
        self.field(FieldDescriptor::new::<T, _>(name, kind, move |r: &T| {
            Value::Sequence(get(r))
        }))
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor {
            name: self.name,
            fields: self.fields,
        }
    }

    /// Builds the descriptor and registers it in one step.
    pub fn register(self, registry: &mut TypeRegistry) -> Result<(), SchemaError> {
        registry.add(self.build())
    }
}

/// Maps type names to their descriptors. Keys are unique and never re-registered.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<TypeName, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `fields` under `type_name`, preserving their order.
    pub fn register(
        &mut self,
        type_name: impl Into<TypeName>,
        fields: Vec<FieldDescriptor>,
    ) -> Result<(), SchemaError> {
        self.add(TypeDescriptor {
            name: type_name.into(),
            fields,
        })
    }

    /// Registers a fully built descriptor.
    pub fn add(&mut self, descriptor: TypeDescriptor) -> Result<(), SchemaError> {
        if self.types.contains_key(&descriptor.name) {
            return Err(SchemaError::DuplicateType(descriptor.name));
        }

        let mut seen = HashSet::with_capacity(descriptor.fields.len());
        for field in &descriptor.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    type_name: descriptor.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        tracing::debug!(
            type_name = %descriptor.name,
            fields = descriptor.fields.len(),
            "registered record type"
        );
        self.types.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    pub fn lookup(&self, type_name: &str) -> Result<&TypeDescriptor, SchemaError> {
        self.types
            .get(type_name)
            .ok_or_else(|| SchemaError::UnknownType(TypeName::from(type_name.to_string())))
    }

    pub fn fields_of(&self, type_name: &str) -> Result<&[FieldDescriptor], SchemaError> {
        self.lookup(type_name).map(TypeDescriptor::fields)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&TypeName> {
        let mut names: Vec<&TypeName> = self.types.keys().collect();
        names.sort();
        names
    }

    /// Checks that every nested or sequence field refers to a registered type.
    ///
    /// Registration allows forward references, so this is the point where a dangling target
    /// is caught without serializing anything.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for name in self.type_names() {
            for field in self.types[name.as_str()].fields() {
                if let FieldKind::NestedRecord(target) | FieldKind::SequenceOfRecord(target) =
                    field.kind()
                {
                    if !self.contains(target.as_str()) {
                        return Err(SchemaError::UnknownType(target.clone()));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: i64,
        label: String,
    }

    fn point_descriptor(name: &'static str) -> TypeDescriptor {
        TypeDescriptor::builder::<Point>(name)
            .integer("x", |p| p.x)
            .text("label", |p| &p.label)
            .build()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = TypeRegistry::new();
        registry.add(point_descriptor("Point")).unwrap();

        let fields = registry.fields_of("Point").unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["x", "label"]);
        assert_eq!(fields[0].kind(), &FieldKind::Integer);
        assert_eq!(fields[1].kind(), &FieldKind::Text);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let mut registry = TypeRegistry::new();
        registry.add(point_descriptor("Point")).unwrap();

        let err = registry.add(point_descriptor("Point")).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateType(TypeName::from("Point")));
        // First registration stays intact.
        assert_eq!(registry.fields_of("Point").unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let mut registry = TypeRegistry::new();
        let err = TypeDescriptor::builder::<Point>("Point")
            .integer("x", |p| p.x)
            .integer("x", |p| p.x * 2)
            .register(&mut registry)
            .unwrap_err();

        assert_eq!(
            err,
            SchemaError::DuplicateField {
                type_name: TypeName::from("Point"),
                field: "x".to_string(),
            }
        );
        assert!(!registry.contains("Point"));
    }

    #[test]
    fn test_unknown_type() {
        let registry = TypeRegistry::new();
        let err = registry.lookup("Missing").unwrap_err();
        assert_eq!(err, SchemaError::UnknownType(TypeName::from("Missing")));
        assert!(registry.fields_of("Missing").is_err());
    }

    #[test]
    fn test_accessor_reads_typed_instance() {
        let descriptor = point_descriptor("Point");
        let p = Point {
            x: 7,
            label: "seven".to_string(),
        };

        match descriptor.fields()[1].read(&p) {
            Some(Value::Text(s)) => assert_eq!(s, "seven"),
            other => panic!("unexpected value: {other:?}"),
        }
        // Wrong instance type yields no value.
        assert!(descriptor.fields()[0].read(&42u8).is_none());
    }

    #[test]
    fn test_validate_reports_dangling_target() {
        struct Holder {
            inner: Point,
        }

        let mut registry = TypeRegistry::new();
        TypeDescriptor::builder::<Holder>("Holder")
            .nested("inner", "Point", |h| &h.inner)
            .register(&mut registry)
            .unwrap();

        assert_eq!(
            registry.validate().unwrap_err(),
            SchemaError::UnknownType(TypeName::from("Point"))
        );

        registry.add(point_descriptor("Point")).unwrap();
        registry.validate().unwrap();
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(FieldKind::Integer.to_string(), "Integer");
        assert_eq!(
            FieldKind::SequenceOfRecord(TypeName::from("Product")).to_string(),
            "SequenceOfRecord(Product)"
        );
        assert!(!FieldKind::NestedRecord(TypeName::from("Person")).is_scalar());
        assert!(FieldKind::Boolean.is_scalar());
    }
}
