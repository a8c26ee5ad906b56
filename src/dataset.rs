//! Deterministic record datasets for the comparison scenarios.
//!
//! Every record is generated from its own `ChaCha8Rng`, seeded from the master seed and the
//! record index. That keeps a dataset identical across runs and thread counts, so generation
//! can run in parallel. Timing never happens here.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::records::{Order, Person, Product, User};

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Charlie", "Diana", "Eve", "Frank", "Grace", "Henry", "Ivy", "Jack",
];
const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez",
];
const DEPARTMENTS: &[&str] = &[
    "Engineering", "Marketing", "Sales", "HR", "Finance", "Operations", "Research", "Support",
];
const CATEGORIES: &[&str] = &[
    "Electronics", "Books", "Clothing", "Sports", "Home", "Garden", "Tools", "Toys",
];

/// Configuration for dataset generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateConfig {
    /// Number of records to generate.
    pub count: usize,
    /// Random seed for deterministic generation.
    pub seed: u64,
    /// Maximum number of line items per order.
    pub max_items: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            count: 1_000,
            seed: 42,
            max_items: 5,
        }
    }
}

fn per_record_seed(master_seed: u64, index: usize) -> u64 {
    master_seed
        .wrapping_add(index as u64)
        .wrapping_mul(0x517cc1b727220a95)
}

fn pick<'a>(rng: &mut ChaCha8Rng, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

fn generate_person(rng: &mut ChaCha8Rng) -> Person {
    let first = pick(rng, FIRST_NAMES);
    let last = pick(rng, LAST_NAMES);
    Person {
        name: format!("{first} {last}"),
        age: rng.gen_range(22..=65),
        salary: rng.gen_range(30_000.0..150_000.0),
        department: pick(rng, DEPARTMENTS).to_string(),
        is_active: rng.gen_bool(0.9),
    }
}

fn generate_product(rng: &mut ChaCha8Rng, index: usize) -> Product {
    Product {
        name: format!("Product {}", index + 1),
        price: rng.gen_range(9.99..999.99),
        quantity: rng.gen_range(0..=1_000),
        category: pick(rng, CATEGORIES).to_string(),
        rating: rng.gen_range(1.0..5.0),
    }
}

fn generate_order(rng: &mut ChaCha8Rng, index: usize, max_items: usize) -> Order {
    let customer = generate_person(rng);
    let item_count = rng.gen_range(0..=max_items);
    let items: Vec<Product> = (0..item_count)
        .map(|i| generate_product(rng, index * max_items.max(1) + i))
        .collect();
    let total_amount = items
        .iter()
        .map(|p| p.price * f64::from(p.quantity.min(10)))
        .sum();
    Order {
        order_id: index as i64 + 1,
        customer,
        items,
        total_amount,
        order_date: format!(
            "2025-{:02}-{:02}",
            rng.gen_range(1..=12),
            rng.gen_range(1..=28)
        ),
    }
}

fn generate_user(rng: &mut ChaCha8Rng, index: usize) -> User {
    User {
        id: index as i64,
        username: format!("user{index}"),
        email: format!("user{index}@test.com"),
        age: rng.gen_range(20..70),
    }
}

fn generate<T, F>(config: &GenerateConfig, make: F) -> Vec<T>
where
    T: Send,
    F: Fn(&mut ChaCha8Rng, usize) -> T + Sync,
{
    (0..config.count)
        .into_par_iter()
        .map(|i| {
            let mut rng = ChaCha8Rng::seed_from_u64(per_record_seed(config.seed, i));
            make(&mut rng, i)
        })
        .collect()
}

pub fn generate_people(config: &GenerateConfig) -> Vec<Person> {
    generate(config, |rng, _| generate_person(rng))
}

pub fn generate_products(config: &GenerateConfig) -> Vec<Product> {
    generate(config, generate_product)
}

pub fn generate_orders(config: &GenerateConfig) -> Vec<Order> {
    let max_items = config.max_items;
    generate(config, move |rng, i| generate_order(rng, i, max_items))
}

pub fn generate_users(config: &GenerateConfig) -> Vec<User> {
    generate(config, generate_user)
}
