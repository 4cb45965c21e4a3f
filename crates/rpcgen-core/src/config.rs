//! Generator configuration (`rpcgen.toml`)
//!
//! Every section and field is optional; an empty file (or no file) selects
//! the built-in Conflux Go dialect.
//!
//! ```toml
//! [types]
//! EpochNumber = "*types.Epoch"
//!
//! [client]
//! package = "client"
//! invoke = "CallRPC"
//!
//! [bulk]
//! primitives = ["wrappedCallRPC", "CallRPC"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codegen::go_types::TypeTable;
use crate::codegen::naming::{swap_affixes, to_upper_camel};
use crate::error::{GenError, GenResult};

const SDK_TYPES: &str = "github.com/Conflux-Chain/go-conflux-sdk/types";
const HEXUTIL: &str = "github.com/ethereum/go-ethereum/common/hexutil";
const COMMON: &str = "github.com/ethereum/go-ethereum/common";

/// Complete generator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Extra or replacement scalar mappings, schema name to Go type
    #[serde(default)]
    pub types: BTreeMap<String, String>,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub structs: StructsConfig,

    #[serde(default)]
    pub bulk: BulkConfig,
}

/// Settings for client stubs generated from trait schemas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default = "default_client_package")]
    pub package: String,

    /// Candidate imports, as `path` or `alias path`; unused ones are dropped
    #[serde(default = "default_type_imports")]
    pub imports: Vec<String>,

    /// Receiver variable of generated stubs
    #[serde(default = "default_receiver")]
    pub receiver: String,

    /// Field of the client holding the transport core
    #[serde(default = "default_core_field")]
    pub core_field: String,

    /// Go type of the transport core
    #[serde(default = "default_core_type")]
    pub core_type: String,

    /// Method of the core performing a synchronous call
    #[serde(default = "default_invoke")]
    pub invoke: String,

    #[serde(default = "default_client_prefix")]
    pub type_prefix: String,

    #[serde(default = "default_client_suffix")]
    pub type_suffix: String,

    /// Generic return wrappers stripped from trait method results
    #[serde(default = "default_result_wrappers")]
    pub result_wrappers: Vec<String>,
}

/// Settings for Go structs generated from struct schemas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructsConfig {
    #[serde(default = "default_structs_package")]
    pub package: String,

    #[serde(default = "default_type_imports")]
    pub imports: Vec<String>,
}

/// Settings for batched callers derived from existing clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BulkConfig {
    #[serde(default = "default_bulk_package")]
    pub package: String,

    /// Imports in addition to those of the client file
    #[serde(default = "default_bulk_imports")]
    pub imports: Vec<String>,

    /// Synchronous invocation methods recognised in client bodies
    #[serde(default = "default_primitives")]
    pub primitives: Vec<String>,

    #[serde(default = "default_client_prefix")]
    pub client_prefix: String,

    #[serde(default = "default_client_suffix")]
    pub client_suffix: String,

    #[serde(default = "default_caller_prefix")]
    pub caller_prefix: String,

    #[serde(default = "default_caller_suffix")]
    pub caller_suffix: String,

    /// Go type of the batch transport
    #[serde(default = "default_caller_core_type")]
    pub caller_core_type: String,

    /// Element type of the queue of batch descriptors
    #[serde(default = "default_queue_elem_type")]
    pub queue_elem_type: String,

    #[serde(default = "default_queue_field")]
    pub queue_field: String,

    /// Function building one batch descriptor
    #[serde(default = "default_descriptor_fn")]
    pub descriptor_fn: String,

    /// Function flushing the queue
    #[serde(default = "default_execute_fn")]
    pub execute_fn: String,

    /// Hand-written functions appended verbatim to the output
    #[serde(default)]
    pub extra_functions: Vec<String>,
}

fn default_client_package() -> String {
    "client".to_string()
}

fn default_structs_package() -> String {
    "types".to_string()
}

fn default_bulk_package() -> String {
    "bulk".to_string()
}

fn default_type_imports() -> Vec<String> {
    vec![SDK_TYPES.to_string(), COMMON.to_string(), HEXUTIL.to_string()]
}

fn default_bulk_imports() -> Vec<String> {
    vec![
        "github.com/Conflux-Chain/go-conflux-sdk/interfaces".to_string(),
        "github.com/Conflux-Chain/go-conflux-sdk/rpc".to_string(),
        SDK_TYPES.to_string(),
        HEXUTIL.to_string(),
    ]
}

fn default_receiver() -> String {
    "c".to_string()
}

fn default_core_field() -> String {
    "core".to_string()
}

fn default_core_type() -> String {
    "ClientCore".to_string()
}

fn default_invoke() -> String {
    "CallRPC".to_string()
}

fn default_client_prefix() -> String {
    "Rpc".to_string()
}

fn default_client_suffix() -> String {
    "Client".to_string()
}

fn default_caller_prefix() -> String {
    "Bulk".to_string()
}

fn default_caller_suffix() -> String {
    "Caller".to_string()
}

fn default_result_wrappers() -> Vec<String> {
    ["JsonRpcResult", "RpcResult", "Result", "BoxFuture"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_primitives() -> Vec<String> {
    vec!["wrappedCallRPC".to_string(), "CallRPC".to_string()]
}

fn default_caller_core_type() -> String {
    "interfaces.RpcCallerCore".to_string()
}

fn default_queue_elem_type() -> String {
    "rpc.BatchElem".to_string()
}

fn default_queue_field() -> String {
    "batchElems".to_string()
}

fn default_descriptor_fn() -> String {
    "newBatchElem".to_string()
}

fn default_execute_fn() -> String {
    "batchCall".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            package: default_client_package(),
            imports: default_type_imports(),
            receiver: default_receiver(),
            core_field: default_core_field(),
            core_type: default_core_type(),
            invoke: default_invoke(),
            type_prefix: default_client_prefix(),
            type_suffix: default_client_suffix(),
            result_wrappers: default_result_wrappers(),
        }
    }
}

impl Default for StructsConfig {
    fn default() -> Self {
        Self {
            package: default_structs_package(),
            imports: default_type_imports(),
        }
    }
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            package: default_bulk_package(),
            imports: default_bulk_imports(),
            primitives: default_primitives(),
            client_prefix: default_client_prefix(),
            client_suffix: default_client_suffix(),
            caller_prefix: default_caller_prefix(),
            caller_suffix: default_caller_suffix(),
            caller_core_type: default_caller_core_type(),
            queue_elem_type: default_queue_elem_type(),
            queue_field: default_queue_field(),
            descriptor_fn: default_descriptor_fn(),
            execute_fn: default_execute_fn(),
            extra_functions: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Client type for a namespace: `Txpool` becomes `RpcTxpoolClient`.
    pub fn type_name(&self, namespace: &str) -> String {
        format!(
            "{}{}{}",
            self.type_prefix,
            to_upper_camel(namespace),
            self.type_suffix
        )
    }
}

impl BulkConfig {
    /// Batch caller type for a client type: `RpcCfxClient` becomes
    /// `BulkCfxCaller`.
    pub fn caller_name(&self, client_type: &str) -> String {
        swap_affixes(
            client_type,
            &self.client_prefix,
            &self.client_suffix,
            &self.caller_prefix,
            &self.caller_suffix,
        )
    }
}

impl GeneratorConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> GenResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| GenError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from TOML text
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> GenResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check the configuration for values that cannot produce valid Go
    pub fn validate(&self) -> GenResult<()> {
        for (section, package) in [
            ("client", &self.client.package),
            ("structs", &self.structs.package),
            ("bulk", &self.bulk.package),
        ] {
            if !is_go_identifier(package) {
                return Err(GenError::Config(format!(
                    "[{section}] package `{package}` is not a valid Go package name"
                )));
            }
        }

        for (source, target) in &self.types {
            if source.trim().is_empty() {
                return Err(GenError::Config("[types] has an empty source name".into()));
            }
            if target.trim().trim_start_matches(['*', '[', ']']).is_empty() {
                return Err(GenError::Config(format!(
                    "[types] `{source}` maps to an empty Go type"
                )));
            }
        }

        if self.bulk.primitives.is_empty() {
            return Err(GenError::Config(
                "[bulk] primitives must name at least one invocation method".into(),
            ));
        }
        if let Some(bad) = self
            .bulk
            .primitives
            .iter()
            .find(|primitive| !is_go_identifier(primitive))
        {
            return Err(GenError::Config(format!(
                "[bulk] primitive `{bad}` is not a Go identifier"
            )));
        }

        for (section, name) in [
            ("client", &self.client.receiver),
            ("client", &self.client.core_field),
            ("client", &self.client.invoke),
            ("bulk", &self.bulk.queue_field),
            ("bulk", &self.bulk.descriptor_fn),
            ("bulk", &self.bulk.execute_fn),
        ] {
            if !is_go_identifier(name) {
                return Err(GenError::Config(format!(
                    "[{section}] `{name}` is not a Go identifier"
                )));
            }
        }

        Ok(())
    }

    /// Built-in mappings with the `[types]` overrides applied
    pub fn type_table(&self) -> TypeTable {
        TypeTable::default().with_overrides(&self.types)
    }
}

fn is_go_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "config/config_tests.rs"]
mod config_tests;
