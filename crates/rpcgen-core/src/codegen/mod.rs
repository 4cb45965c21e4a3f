//! Code generation from Rust RPC schemas and existing Go clients.
//!
//! Three generators share one scanner, one intermediate representation and
//! one Go emitter:
//!
//! - **Client stubs**: `#[rpc]` trait blocks become Go methods that perform a
//!   single synchronous call
//! - **Structs**: `pub struct` records become Go structs with json tags
//! - **Bulk callers**: methods of an existing Go client become batched
//!   variants that queue a call descriptor instead of calling
//!
//! # Architecture
//!
//! ```text
//! Rust schema / Go client
//!     ↓
//!  [Masked scanner]   comments and literals blanked out
//!     ↓
//!  [Extractors]       syn per fragment (Rust), statement scan (Go)
//!     ↓
//!    IR (StructDecl, MethodDecl, BatchCandidate)
//!     ↓
//!  [TypeMapper]       schema type → Go type
//!     ↓
//!  [GoEmitter] → *.go
//! ```
//!
//! Extractors return [`Extracted`] for every declaration they meet, so a
//! fragment that does not match the expected shape becomes a diagnostic and
//! the rest of the file is still generated.
//!
//! # Example
//!
//! ```rust
//! use rpcgen_core::codegen::{TraitOptions, extract_traits};
//!
//! let schema = r#"
//! pub trait TxPool {
//!     #[rpc(name = "txpool_status")]
//!     fn txpool_status(&self) -> JsonRpcResult<u64>;
//! }
//! "#;
//! let wrappers = vec!["JsonRpcResult".to_string()];
//! let traits = extract_traits(
//!     schema,
//!     TraitOptions { namespace: Some("txpool"), result_wrappers: &wrappers },
//! );
//!
//! let method = traits[0].methods[0].found().unwrap();
//! assert_eq!(method.function_name, "Status");
//! ```

pub mod bulk;
pub mod go;
pub mod go_types;
pub mod ir;
pub mod naming;
pub mod scan;
pub mod structs;
pub mod traits;

pub use bulk::{BulkOptions, ClientSource, extract_client};
pub use go::{GENERATED_BANNER, GoEmitter, render_header, render_skip};
pub use go_types::{TypeMapper, TypeTable};
pub use ir::{
    BatchCandidate, ClientMethod, Extracted, FieldDecl, MethodDecl, Param, StructDecl,
    TargetType, TraitDecl, TypeExpr,
};
pub use structs::extract_structs;
pub use traits::{TraitOptions, default_namespace, extract_traits};
