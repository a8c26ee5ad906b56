//! Hand-written encoders for the demo records.
//!
//! These are the baseline the generic serializer is measured against. Each one spells out its
//! record's fields directly and must produce byte-identical output to
//! [`crate::serialize::GenericSerializer`] for the registered shape.

use std::fmt::Write;

use crate::format::write_fixed2;
use crate::records::{Order, Person, Product, User};

pub trait ToJson {
    fn write_json(&self, out: &mut String);

    fn to_json(&self) -> String {
        let mut out = String::with_capacity(128);
        self.write_json(&mut out);
        out
    }
}

impl ToJson for Person {
    fn write_json(&self, out: &mut String) {
        out.push_str("{\"name\":\"");
        out.push_str(&self.name);
        let _ = write!(out, "\",\"age\":{},\"salary\":", self.age);
        write_fixed2(out, self.salary);
        out.push_str(",\"department\":\"");
        out.push_str(&self.department);
        out.push_str("\",\"is_active\":");
        out.push_str(if self.is_active { "true" } else { "false" });
        out.push('}');
    }
}

impl ToJson for Product {
    fn write_json(&self, out: &mut String) {
        out.push_str("{\"name\":\"");
        out.push_str(&self.name);
        out.push_str("\",\"price\":");
        write_fixed2(out, self.price);
        let _ = write!(out, ",\"quantity\":{},\"category\":\"", self.quantity);
        out.push_str(&self.category);
        out.push_str("\",\"rating\":");
        write_fixed2(out, self.rating);
        out.push('}');
    }
}

impl ToJson for Order {
    fn write_json(&self, out: &mut String) {
        let _ = write!(out, "{{\"order_id\":{},\"customer\":", self.order_id);
        self.customer.write_json(out);
        out.push_str(",\"items\":[");
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            item.write_json(out);
        }
        out.push_str("],\"total_amount\":");
        write_fixed2(out, self.total_amount);
        out.push_str(",\"order_date\":\"");
        out.push_str(&self.order_date);
        out.push_str("\"}");
    }
}

impl ToJson for User {
    fn write_json(&self, out: &mut String) {
        let _ = write!(out, "{{\"id\":{},\"username\":\"", self.id);
        out.push_str(&self.username);
        out.push_str("\",\"email\":\"");
        out.push_str(&self.email);
        let _ = write!(out, "\",\"age\":{}}}", self.age);
    }
}

/// Hand-written SQL for the `users` table, the baseline for [`crate::sql::SqlGenerator`].
pub trait ToSql {
    fn to_insert_sql(&self) -> String;

    fn to_update_sql(&self) -> String;
}

impl ToSql for User {
    fn to_insert_sql(&self) -> String {
        format!(
            "INSERT INTO users (id, username, email, age) VALUES ({}, '{}', '{}', {})",
            self.id, self.username, self.email, self.age
        )
    }

    fn to_update_sql(&self) -> String {
        format!(
            "UPDATE users SET username='{}', email='{}', age={} WHERE id={}",
            self.username, self.email, self.age, self.id
        )
    }
}

/// Encodes every record of `items`, one string per record.
pub fn to_json_all<T: ToJson>(items: &[T]) -> Vec<String> {
    items.iter().map(ToJson::to_json).collect()
}
