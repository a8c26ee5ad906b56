//! Descriptor-driven serializer.
//!
//! One code path encodes every registered record shape. Output is a brace-delimited,
//! comma-separated `"name":value` object in registration order. Nested records are spliced
//! inline and sequences are wrapped in `[...]`. See [`crate::format`] for scalar rendering.

use std::any::Any;

use crate::error::SchemaError;
use crate::format::{write_bool, write_fixed2, write_integer, write_key, write_text};
use crate::registry::{FieldDescriptor, FieldKind, TypeDescriptor, TypeRegistry, Value};

#[derive(Clone, Copy, Debug)]
pub struct GenericSerializer<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> GenericSerializer<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    pub fn serialize(&self, type_name: &str, instance: &dyn Any) -> Result<String, SchemaError> {
        let mut out = String::new();
        self.serialize_into(type_name, instance, &mut out)?;
        Ok(out)
    }

    /// Appends the encoding of `instance` to `out`.
    ///
    /// On error `out` may hold a partial encoding.
    pub fn serialize_into(
        &self,
        type_name: &str,
        instance: &dyn Any,
        out: &mut String,
    ) -> Result<(), SchemaError> {
        let descriptor = self.registry.lookup(type_name)?;
        self.write_record(descriptor, instance, out)
    }

    /// Serializes every item of `items`, one string per record.
    pub fn serialize_all<T: Any>(
        &self,
        type_name: &str,
        items: &[T],
    ) -> Result<Vec<String>, SchemaError> {
        let descriptor = self.registry.lookup(type_name)?;
        items
            .iter()
            .map(|item| {
                let mut out = String::new();
                self.write_record(descriptor, item, &mut out)?;
                Ok(out)
            })
            .collect()
    }

    fn write_record(
        &self,
        descriptor: &TypeDescriptor,
        instance: &dyn Any,
        out: &mut String,
    ) -> Result<(), SchemaError> {
        out.push('{');
        for (i, field) in descriptor.fields().iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            write_key(out, field.name());
            self.write_field(descriptor, field, instance, out)?;
        }
        out.push('}');
        Ok(())
    }

    fn write_field(
        &self,
        owner: &TypeDescriptor,
        field: &FieldDescriptor,
        instance: &dyn Any,
        out: &mut String,
    ) -> Result<(), SchemaError> {
        let value = field
            .read(instance)
            .ok_or_else(|| SchemaError::InstanceMismatch {
                type_name: owner.name().clone(),
                field: field.name().to_string(),
                expected_rust_type: field.rust_type(),
            })?;

        match (field.kind(), value) {
            (FieldKind::Integer, Value::Integer(v)) => write_integer(out, v),
            (FieldKind::FloatingPoint, Value::Float(v)) => write_fixed2(out, v),
            (FieldKind::Boolean, Value::Bool(v)) => write_bool(out, v),
            (FieldKind::Text, Value::Text(v)) => write_text(out, v),
            (FieldKind::NestedRecord(target), Value::Record(nested)) => {
                let descriptor = self.registry.lookup(target.as_str())?;
                self.write_record(descriptor, nested, out)?;
            }
            (FieldKind::SequenceOfRecord(target), Value::Sequence(items)) => {
                let descriptor = self.registry.lookup(target.as_str())?;
                let len = items.len();
                out.push('[');
                for index in 0..len {
                    if index > 0 {
                        out.push(',');
                    }
                    let item = items.item(index).ok_or_else(|| SchemaError::MissingElement {
                        type_name: owner.name().clone(),
                        field: field.name().to_string(),
                        index,
                        len,
                    })?;
                    self.write_record(descriptor, item, out)?;
                }
                out.push(']');
            }
            (expected, found) => {
                return Err(SchemaError::KindMismatch {
                    type_name: owner.name().clone(),
                    field: field.name().to_string(),
                    expected: expected.clone(),
                    found: found.kind_name(),
                });
            }
        }
        Ok(())
    }
}

/// Serializes `instance` as the registered type `type_name`.
pub fn serialize(
    registry: &TypeRegistry,
    type_name: &str,
    instance: &dyn Any,
) -> Result<String, SchemaError> {
    GenericSerializer::new(registry).serialize(type_name, instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RecordSeq, TypeDescriptor, TypeName};

    struct Empty;

    struct Person {
        name: String,
        age: i64,
        salary: f64,
    }

    struct Team {
        title: String,
        members: Vec<Person>,
    }

    struct Level3 {
        flag: bool,
    }

    struct Level2 {
        depth: i64,
        inner: Level3,
    }

    struct Level1 {
        label: String,
        inner: Level2,
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        TypeDescriptor::builder::<Empty>("Empty")
            .register(&mut registry)
            .unwrap();
        TypeDescriptor::builder::<Person>("Person")
            .text("name", |p| &p.name)
            .integer("age", |p| p.age)
            .float("salary", |p| p.salary)
            .register(&mut registry)
            .unwrap();
        TypeDescriptor::builder::<Team>("Team")
            .text("title", |t| &t.title)
            .sequence("members", "Person", |t| &t.members)
            .register(&mut registry)
            .unwrap();
        TypeDescriptor::builder::<Level3>("Level3")
            .boolean("flag", |l| l.flag)
            .register(&mut registry)
            .unwrap();
        TypeDescriptor::builder::<Level2>("Level2")
            .integer("depth", |l| l.depth)
            .nested("inner", "Level3", |l| &l.inner)
            .register(&mut registry)
            .unwrap();
        TypeDescriptor::builder::<Level1>("Level1")
            .text("label", |l| &l.label)
            .nested("inner", "Level2", |l| &l.inner)
            .register(&mut registry)
            .unwrap();
        registry
    }

    fn person(name: &str) -> Person {
        Person {
            name: name.to_string(),
            age: 30,
            salary: 75000.0,
        }
    }

    #[test]
    fn test_person_encoding() {
        let registry = registry();
        let out = serialize(&registry, "Person", &person("Alice")).unwrap();
        assert_eq!(out, r#"{"name":"Alice","age":30,"salary":75000.00}"#);
    }

    #[test]
    fn test_zero_field_record() {
        let registry = registry();
        assert_eq!(serialize(&registry, "Empty", &Empty).unwrap(), "{}");
    }

    #[test]
    fn test_sequence_separators() {
        let registry = registry();
        let ser = GenericSerializer::new(&registry);

        let mut team = Team {
            title: "core".to_string(),
            members: Vec::new(),
        };
        assert_eq!(
            ser.serialize("Team", &team).unwrap(),
            r#"{"title":"core","members":[]}"#
        );

        team.members.push(person("A"));
        let one = ser.serialize("Team", &team).unwrap();
        assert_eq!(
            one,
            r#"{"title":"core","members":[{"name":"A","age":30,"salary":75000.00}]}"#
        );

        team.members.push(person("B"));
        team.members.push(person("C"));
        let three = ser.serialize("Team", &team).unwrap();
        // Two separators between the three records, none elsewhere at that level.
        assert_eq!(three.matches("},{").count(), 2);
        assert!(three.ends_with(r#""salary":75000.00}]}"#));
    }

    #[test]
    fn test_nested_depth_three() {
        let registry = registry();
        let value = Level1 {
            label: "top".to_string(),
            inner: Level2 {
                depth: 2,
                inner: Level3 { flag: true },
            },
        };
        assert_eq!(
            serialize(&registry, "Level1", &value).unwrap(),
            r#"{"label":"top","inner":{"depth":2,"inner":{"flag":true}}}"#
        );
    }

    #[test]
    fn test_unknown_type() {
        let registry = registry();
        let err = serialize(&registry, "Ghost", &Empty).unwrap_err();
        assert_eq!(err, SchemaError::UnknownType(TypeName::from("Ghost")));
    }

    #[test]
    fn test_kind_mismatch() {
        let mut registry = TypeRegistry::new();
        registry
            .register(
                "Bad",
                vec![FieldDescriptor::new::<Person, _>("age", FieldKind::Integer, |p: &Person| {
                    Value::Text(&p.name)
                })],
            )
            .unwrap();

        let err = serialize(&registry, "Bad", &person("Alice")).unwrap_err();
        assert_eq!(
            err,
            SchemaError::KindMismatch {
                type_name: TypeName::from("Bad"),
                field: "age".to_string(),
                expected: FieldKind::Integer,
                found: "Text",
            }
        );
    }

    #[test]
    fn test_instance_mismatch() {
        let registry = registry();
        let err = serialize(&registry, "Person", &Empty).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InstanceMismatch { ref field, .. } if field == "name"
        ));
    }

    #[test]
    fn test_dangling_nested_target() {
        let mut registry = TypeRegistry::new();
        TypeDescriptor::builder::<Level2>("Level2")
            .integer("depth", |l| l.depth)
            .nested("inner", "Level3", |l| &l.inner)
            .register(&mut registry)
            .unwrap();

        let value = Level2 {
            depth: 1,
            inner: Level3 { flag: false },
        };
        let err = serialize(&registry, "Level2", &value).unwrap_err();
        assert_eq!(err, SchemaError::UnknownType(TypeName::from("Level3")));
    }

    /// Claims one more element than it can produce.
    struct Overcounted(Vec<Person>);

    impl RecordSeq for Overcounted {
        fn len(&self) -> usize {
            self.0.len() + 1
        }

        fn item(&self, index: usize) -> Option<&dyn Any> {
            self.0.get(index).map(|p| p as &dyn Any)
        }
    }

    struct Roster {
        members: Overcounted,
    }

    #[test]
    fn test_missing_sequence_element_is_an_error() {
        let mut registry = registry();
        TypeDescriptor::builder::<Roster>("Roster")
            .sequence("members", "Person", |r| &r.members)
            .register(&mut registry)
            .unwrap();

        let roster = Roster {
            members: Overcounted(vec![person("A"), person("B")]),
        };
        let err = serialize(&registry, "Roster", &roster).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingElement {
                type_name: TypeName::from("Roster"),
                field: "members".to_string(),
                index: 2,
                len: 3,
            }
        );
    }

    #[test]
    fn test_serialize_all_is_deterministic() {
        let registry = registry();
        let ser = GenericSerializer::new(&registry);
        let people = vec![person("A"), person("B")];
        let first = ser.serialize_all("Person", &people).unwrap();
        let second = ser.serialize_all("Person", &people).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
