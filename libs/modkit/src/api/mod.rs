//! REST building blocks shared by every module: the type-state
//! [`OperationBuilder`] that keeps routes and OpenAPI in sync, and RFC 9457
//! problem responses.

pub mod operation_builder;
pub mod problem;

pub use operation_builder::{
    ensure_schema, state, Missing, OpenApiRegistry, OperationBuilder, OperationSpec,
    ParamLocation, ParamSpec, Present, RequestBodySpec, ResponseSpec,
};
