//! Descriptor-driven record serialization and a harness that measures what it costs.
//!
//! Record types are described once in a [`registry::TypeRegistry`]. The
//! [`serialize::GenericSerializer`] and [`sql::SqlGenerator`] walk those descriptors at run
//! time, while [`specialized`] holds hand-written encoders for the same records. The
//! [`harness`] and [`compare`] modules time both paths over identical datasets and report the
//! overhead of the generic one.

use clap::ValueEnum;

pub mod compare;
pub mod dataset;
pub mod error;
pub mod format;
pub mod harness;
pub mod observe;
pub mod records;
pub mod registry;
pub mod schema;
pub mod serialize;
pub mod specialized;
pub mod sql;
pub mod stats;

pub use compare::{compare, ComparisonReport};
pub use error::{BenchError, ReportError, SchemaError};
pub use harness::{BenchConfig, BenchResult, Harness, Profile, TrialLog};
pub use registry::{FieldDescriptor, FieldKind, TypeDescriptor, TypeName, TypeRegistry, Value};
pub use serialize::GenericSerializer;

/// Record type(s) to run serialization scenarios for.
#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum RecordKind {
    /// Every demo record type.
    #[default]
    All,
    /// Flat record with text, integer, float and boolean fields.
    Person,
    Product,
    /// Nested `Person` plus a sequence of `Product`.
    Order,
    User,
}

impl RecordKind {
    /// Whether selecting `self` includes scenarios for `kind`.
    pub fn includes(self, kind: RecordKind) -> bool {
        self == RecordKind::All || self == kind
    }
}
