//! rpcgen-core - Go RPC client bindings from Rust schemas
//!
//! This crate provides the generation engine behind the `rpcgen` CLI:
//! - [`Generator`] runs the client, struct and bulk modes
//! - [`GeneratorConfig`] holds the Go dialect (`rpcgen.toml`)
//! - [`Diagnostic`] describes a declaration that was skipped
//! - [`codegen`] exposes the extractors, type mapper and emitter

pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod pipeline;

pub use config::{BulkConfig, ClientConfig, GeneratorConfig, StructsConfig};
pub use diagnostics::{Diagnostic, MismatchKind};
pub use error::{GenError, GenResult};
pub use pipeline::{GeneratedUnit, Generator, read_input};
