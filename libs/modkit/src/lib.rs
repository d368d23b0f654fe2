//! # ModKit
//!
//! A small module system for composing one HTTP server out of independent
//! feature modules.
//!
//! Each module implements [`Module`] and any of the optional capabilities
//! ([`DbModule`], [`RestfulModule`], [`RestHostModule`], [`StatefulModule`]),
//! then registers itself through [`inventory`]:
//!
//! ```rust,ignore
//! inventory::submit! {
//!     modkit::registry::Registrator(|b| {
//!         let m = std::sync::Arc::new(TodosModule::default());
//!         b.register_core("todos", &[], m.clone());
//!         b.register_db("todos", m.clone());
//!         b.register_rest("todos", m);
//!     })
//! }
//! ```
//!
//! [`run`] discovers the registrators, orders modules by their declared
//! dependencies and drives them through init → db → rest → start → stop.

pub use anyhow::Result;
pub use async_trait::async_trait;
pub use inventory;

pub mod api;
pub mod context;
pub mod contracts;
pub mod registry;
pub mod runtime;

pub use api::problem::{
    bad_request, internal_error, json_rejection, not_found, not_implemented, Problem,
    ProblemResponse, ValidationError,
};
pub use api::{OpenApiRegistry, OperationBuilder};
pub use context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};
pub use contracts::*;
pub use registry::{ModuleRegistry, Registrator, RegistryBuilder, RegistryError};
pub use runtime::{run, DbFactory, DbOptions, RunOptions, ShutdownOptions};
