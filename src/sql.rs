//! SQL statement text generated from registered descriptors.
//!
//! Columns are the record's fields in registration order. Only scalar fields map to
//! columns. Text values are wrapped in single quotes without escaping, and numbers use the
//! same rendering as the JSON serializer. The output targets no particular SQL dialect.

use std::any::Any;

use crate::error::SchemaError;
use crate::format::{write_bool, write_fixed2, write_integer};
use crate::registry::{FieldDescriptor, FieldKind, TypeDescriptor, TypeRegistry, Value};

#[derive(Clone, Copy, Debug)]
pub struct SqlGenerator<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> SqlGenerator<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// `INSERT INTO table (a, b) VALUES (1, 'x')`
    pub fn insert(
        &self,
        type_name: &str,
        table: &str,
        instance: &dyn Any,
    ) -> Result<String, SchemaError> {
        let descriptor = self.scalar_descriptor(type_name)?;
        let mut sql = format!("INSERT INTO {table} (");
        push_column_list(&mut sql, descriptor);
        sql.push_str(") VALUES (");
        for (i, field) in descriptor.fields().iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            write_literal(&mut sql, descriptor, field, instance)?;
        }
        sql.push(')');
        Ok(sql)
    }

    /// `UPDATE table SET b='x' WHERE a=1`, where `a` is `key_field`.
    pub fn update(
        &self,
        type_name: &str,
        table: &str,
        key_field: &str,
        instance: &dyn Any,
    ) -> Result<String, SchemaError> {
        let descriptor = self.scalar_descriptor(type_name)?;
        let key = descriptor
            .field(key_field)
            .ok_or_else(|| SchemaError::UnknownField {
                type_name: descriptor.name().clone(),
                field: key_field.to_string(),
            })?;

        let mut sql = format!("UPDATE {table} SET ");
        let columns = descriptor.fields().iter().filter(|f| f.name() != key_field);
        for (i, field) in columns.enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(field.name());
            sql.push('=');
            write_literal(&mut sql, descriptor, field, instance)?;
        }
        sql.push_str(" WHERE ");
        sql.push_str(key.name());
        sql.push('=');
        write_literal(&mut sql, descriptor, key, instance)?;
        Ok(sql)
    }

    /// `SELECT a, b FROM table`
    pub fn select_all(&self, type_name: &str, table: &str) -> Result<String, SchemaError> {
        let descriptor = self.scalar_descriptor(type_name)?;
        let mut sql = String::from("SELECT ");
        push_column_list(&mut sql, descriptor);
        sql.push_str(" FROM ");
        sql.push_str(table);
        Ok(sql)
    }

    fn scalar_descriptor(&self, type_name: &str) -> Result<&'r TypeDescriptor, SchemaError> {
        let descriptor = self.registry.lookup(type_name)?;
        if let Some(field) = descriptor.fields().iter().find(|f| !f.kind().is_scalar()) {
            return Err(SchemaError::UnsupportedColumn {
                type_name: descriptor.name().clone(),
                field: field.name().to_string(),
                kind: field.kind().clone(),
            });
        }
        Ok(descriptor)
    }
}

fn push_column_list(sql: &mut String, descriptor: &TypeDescriptor) {
    for (i, field) in descriptor.fields().iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push_str(field.name());
    }
}

fn write_literal(
    sql: &mut String,
    owner: &TypeDescriptor,
    field: &FieldDescriptor,
    instance: &dyn Any,
) -> Result<(), SchemaError> {
    let value = field
        .read(instance)
        .ok_or_else(|| SchemaError::InstanceMismatch {
            type_name: owner.name().clone(),
            field: field.name().to_string(),
            expected_rust_type: field.rust_type(),
        })?;

    match (field.kind(), value) {
        (FieldKind::Integer, Value::Integer(v)) => write_integer(sql, v),
        (FieldKind::FloatingPoint, Value::Float(v)) => write_fixed2(sql, v),
        (FieldKind::Boolean, Value::Bool(v)) => write_bool(sql, v),
        (FieldKind::Text, Value::Text(v)) => {
            sql.push('\'');
            sql.push_str(v);
            sql.push('\'');
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{record_registry, Person, User, ORDER, PERSON, USER};
    use crate::registry::TypeName;
    use crate::specialized::ToSql;

    fn user() -> User {
        User {
            id: 1,
            username: "user1".to_string(),
            email: "user1@test.com".to_string(),
            age: 21,
        }
    }

    #[test]
    fn test_insert() {
        let registry = record_registry().unwrap();
        let sql = SqlGenerator::new(&registry)
            .insert(USER, "users", &user())
            .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO users (id, username, email, age) VALUES (1, 'user1', 'user1@test.com', 21)"
        );
        assert_eq!(sql, user().to_insert_sql());
    }

    #[test]
    fn test_update() {
        let registry = record_registry().unwrap();
        let sql = SqlGenerator::new(&registry)
            .update(USER, "users", "id", &user())
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE users SET username='user1', email='user1@test.com', age=21 WHERE id=1"
        );
        assert_eq!(sql, user().to_update_sql());
    }

    #[test]
    fn test_select_all() {
        let registry = record_registry().unwrap();
        let generator = SqlGenerator::new(&registry);
        assert_eq!(
            generator.select_all(USER, "users").unwrap(),
            "SELECT id, username, email, age FROM users"
        );
        assert_eq!(
            generator.select_all(PERSON, "people").unwrap(),
            "SELECT name, age, salary, department, is_active FROM people"
        );
    }

    #[test]
    fn test_person_insert_renders_float_and_bool() {
        let registry = record_registry().unwrap();
        let p = Person {
            name: "Eve".to_string(),
            age: 40,
            salary: 50_000.125,
            department: "HR".to_string(),
            is_active: false,
        };
        let sql = SqlGenerator::new(&registry).insert(PERSON, "people", &p).unwrap();
        assert!(sql.ends_with("VALUES ('Eve', 40, 50000.13, 'HR', false)"), "{sql}");
    }

    #[test]
    fn test_nested_fields_rejected() {
        let registry = record_registry().unwrap();
        let err = SqlGenerator::new(&registry)
            .select_all(ORDER, "orders")
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::UnsupportedColumn { ref field, .. } if field == "customer"
        ));
    }

    #[test]
    fn test_unknown_key_field() {
        let registry = record_registry().unwrap();
        let err = SqlGenerator::new(&registry)
            .update(USER, "users", "uuid", &user())
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownField {
                type_name: TypeName::from(USER),
                field: "uuid".to_string(),
            }
        );
    }
}
