#![allow(non_snake_case)]

use super::*;
use crate::codegen::ir::{TargetType, TypeExpr};
use crate::codegen::go_types::TypeMapper;
use test_case::test_case;

#[test]
fn GeneratorConfig___empty_text___uses_defaults() {
    let config = GeneratorConfig::from_str("").unwrap();

    assert_eq!(config, GeneratorConfig::default());
    assert_eq!(config.client.package, "client");
    assert_eq!(config.bulk.primitives, vec!["wrappedCallRPC", "CallRPC"]);
    assert!(config.validate().is_ok());
}

#[test]
fn GeneratorConfig___partial_section___keeps_other_defaults() {
    let config = GeneratorConfig::from_str(
        r#"
[client]
package = "cfxclient"

[bulk]
caller_prefix = "Batch"
extra_functions = ["func (b *BatchCfxCaller) Len() int { return len(*b.batchElems) }"]
"#,
    )
    .unwrap();

    assert_eq!(config.client.package, "cfxclient");
    assert_eq!(config.client.invoke, "CallRPC");
    assert_eq!(config.bulk.caller_name("RpcCfxClient"), "BatchCfxCaller");
    assert_eq!(config.bulk.extra_functions.len(), 1);
    assert_eq!(config.structs, StructsConfig::default());
}

#[test]
fn GeneratorConfig___types_section___overrides_table() {
    let config = GeneratorConfig::from_str(
        r#"
[types]
U256 = "*big.Int"
EpochNumber = "*types.Epoch"
"#,
    )
    .unwrap();
    let mapper = TypeMapper::new(config.type_table());

    assert_eq!(
        mapper.resolve(&TypeExpr::scalar("U256")),
        TargetType::parse("*big.Int")
    );
    assert_eq!(
        mapper.resolve(&TypeExpr::optional(TypeExpr::scalar("EpochNumber"))),
        TargetType::parse("*types.Epoch")
    );
}

#[test]
fn GeneratorConfig___unknown_key___is_rejected() {
    let result = GeneratorConfig::from_str("[client]\npackge = \"x\"\n");

    assert!(matches!(result, Err(GenError::Config(_))));
}

#[test]
fn GeneratorConfig___from_missing_file___is_io_error() {
    let result = GeneratorConfig::from_file("/nonexistent/rpcgen.toml");

    match result {
        Err(GenError::Io { path, .. }) => {
            assert_eq!(path, Path::new("/nonexistent/rpcgen.toml"));
        }
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test_case("[client]\npackage = \"\"", "[client] package"; "empty package")]
#[test_case("[bulk]\npackage = \"go-bulk\"", "[bulk] package"; "dashed package")]
#[test_case("[bulk]\nprimitives = []", "at least one"; "no primitives")]
#[test_case("[bulk]\nprimitives = [\"call rpc\"]", "primitive `call rpc`"; "spaced primitive")]
#[test_case("[types]\nU256 = \"*\"", "`U256` maps to an empty Go type"; "empty target")]
#[test_case("[client]\nreceiver = \"1c\"", "`1c` is not a Go identifier"; "bad receiver")]
fn GeneratorConfig___validate___rejects_invalid_values(toml: &str, message: &str) {
    let config = GeneratorConfig::from_str(toml).unwrap();

    let error = config.validate().unwrap_err();

    assert!(
        error.to_string().contains(message),
        "`{error}` should mention `{message}`"
    );
}

#[test]
fn ClientConfig___type_name___wraps_namespace() {
    let config = ClientConfig::default();

    assert_eq!(config.type_name("txpool"), "RpcTxpoolClient");
    assert_eq!(config.type_name("Trace"), "RpcTraceClient");
}

#[test]
fn BulkConfig___caller_name___swaps_role_affixes() {
    let config = BulkConfig::default();

    assert_eq!(config.caller_name("RpcCfxClient"), "BulkCfxCaller");
    assert_eq!(config.caller_name("FooClient"), "BulkFooCaller");
}

#[test]
fn GeneratorConfig___serializes_back_to_toml() {
    let config = GeneratorConfig::default();

    let text = toml::to_string(&config).unwrap();
    let parsed = GeneratorConfig::from_str(&text).unwrap();

    assert_eq!(parsed, config);
}
