//! Demo record types and their registry descriptors.

use crate::error::SchemaError;
use crate::registry::{TypeDescriptor, TypeRegistry};

pub const PERSON: &str = "Person";
pub const PRODUCT: &str = "Product";
pub const ORDER: &str = "Order";
pub const USER: &str = "User";

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: u32,
    pub salary: f64,
    pub department: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    pub category: String,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: i64,
    pub customer: Person,
    pub items: Vec<Product>,
    pub total_amount: f64,
    pub order_date: String,
}

/// Database entity used by the SQL generation scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub age: u32,
}

/// Registers every demo record type.
pub fn register_records(registry: &mut TypeRegistry) -> Result<(), SchemaError> {
    TypeDescriptor::builder::<Person>(PERSON)
        .text("name", |p| &p.name)
        .integer("age", |p| i64::from(p.age))
        .float("salary", |p| p.salary)
        .text("department", |p| &p.department)
        .boolean("is_active", |p| p.is_active)
        .register(registry)?;

    TypeDescriptor::builder::<Product>(PRODUCT)
        .text("name", |p| &p.name)
        .float("price", |p| p.price)
        .integer("quantity", |p| i64::from(p.quantity))
        .text("category", |p| &p.category)
        .float("rating", |p| p.rating)
        .register(registry)?;

    TypeDescriptor::builder::<Order>(ORDER)
        .integer("order_id", |o| o.order_id)
        .nested("customer", PERSON, |o| &o.customer)
        .sequence("items", PRODUCT, |o| &o.items)
        .float("total_amount", |o| o.total_amount)
        .text("order_date", |o| &o.order_date)
        .register(registry)?;

    TypeDescriptor::builder::<User>(USER)
        .integer("id", |u| u.id)
        .text("username", |u| &u.username)
        .text("email", |u| &u.email)
        .integer("age", |u| i64::from(u.age))
        .register(registry)?;

    registry.validate()
}

/// A fresh registry holding the demo record types.
pub fn record_registry() -> Result<TypeRegistry, SchemaError> {
    let mut registry = TypeRegistry::new();
    register_records(&mut registry)?;
    Ok(registry)
}
