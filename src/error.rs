//! Error types for the registry, serializers, harness and report writer.
//!
//! Every variant carries the type name, field or parameter it concerns so a failure can be
//! diagnosed from the message alone. Nothing here is retried.

use thiserror::Error;

use crate::registry::{FieldKind, TypeName};

/// Structural errors raised by the registry, the generic serializer and the SQL builder.
///
/// These indicate a misconfigured schema and are surfaced immediately.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("type `{0}` is already registered")]
    DuplicateType(TypeName),

    #[error("field `{field}` is declared more than once on type `{type_name}`")]
    DuplicateField { type_name: TypeName, field: String },

    #[error("type `{0}` is not registered")]
    UnknownType(TypeName),

    #[error("type `{type_name}` has no field `{field}`")]
    UnknownField { type_name: TypeName, field: String },

    #[error("field `{type_name}.{field}` is declared as {expected} but its accessor returned {found}")]
    KindMismatch {
        type_name: TypeName,
        field: String,
        expected: FieldKind,
        found: &'static str,
    },

    #[error("sequence `{type_name}.{field}` reported {len} elements but has none at index {index}")]
    MissingElement {
        type_name: TypeName,
        field: String,
        index: usize,
        len: usize,
    },

    #[error("instance passed for `{type_name}` (field `{field}`) is not a `{expected_rust_type}`")]
    InstanceMismatch {
        type_name: TypeName,
        field: String,
        expected_rust_type: &'static str,
    },

    #[error("field `{type_name}.{field}` of kind {kind} cannot be mapped to a SQL column")]
    UnsupportedColumn {
        type_name: TypeName,
        field: String,
        kind: FieldKind,
    },
}

/// Errors raised while running a benchmark.
///
/// `E` is the error type of the user-supplied operation; it is propagated untouched.
#[derive(Debug, Error)]
pub enum BenchError<E> {
    #[error("invalid configuration: {param} = {value} ({reason})")]
    InvalidConfiguration {
        param: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("operation `{label}` failed during trial {trial}: {source}")]
    Operation {
        label: String,
        trial: usize,
        #[source]
        source: E,
    },
}

/// Errors produced while running scenarios and writing the JSON report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("benchmark failed: {0}")]
    Bench(#[from] BenchError<SchemaError>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}
