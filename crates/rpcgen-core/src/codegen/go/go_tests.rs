#![allow(non_snake_case)]

use super::*;
use crate::codegen::ir::{FieldDecl, Param, TypeExpr};
use crate::diagnostics::MismatchKind;
use test_case::test_case;

fn emitter(config: &GeneratorConfig) -> GoEmitter<'_> {
    GoEmitter::new(config, TypeMapper::new(config.type_table()))
}

fn field(name: &str, ty: TypeExpr) -> FieldDecl {
    FieldDecl {
        source_name: name.to_string(),
        ty,
        docs: Vec::new(),
        serde_rename: None,
    }
}

#[test]
fn render_struct___aligns_fields_with_json_tags() {
    let config = GeneratorConfig::default();
    let decl = StructDecl {
        name: "Decision".to_string(),
        docs: vec!["Pivot decision.".to_string()],
        fields: vec![
            field("block_hash", TypeExpr::scalar("H256")),
            field("height", TypeExpr::scalar("U64")),
        ],
    };

    let code = emitter(&config).render_struct(&decl);

    assert_eq!(
        code,
        "// Pivot decision.\n\
         type Decision struct {\n\
         \tBlockHash types.Hash     `json:\"blockHash\"`\n\
         \tHeight    hexutil.Uint64 `json:\"height\"`\n\
         }"
    );
}

#[test]
fn render_struct___uses_rename_and_field_docs() {
    let config = GeneratorConfig::default();
    let mut nonce = field("nonce", TypeExpr::optional(TypeExpr::scalar("U256")));
    nonce.serde_rename = Some("nonce_value".to_string());
    nonce.docs = vec!["Next nonce.".to_string()];
    let decl = StructDecl {
        name: "Account".to_string(),
        docs: Vec::new(),
        fields: vec![nonce],
    };

    let code = emitter(&config).render_struct(&decl);

    assert_eq!(
        code,
        "type Account struct {\n\t// Next nonce.\n\tNonce *hexutil.Big `json:\"nonce_value\"`\n}"
    );
}

#[test]
fn render_struct___empty_struct___has_empty_body() {
    let config = GeneratorConfig::default();
    let decl = StructDecl {
        name: "Empty".to_string(),
        docs: Vec::new(),
        fields: Vec::new(),
    };

    assert_eq!(emitter(&config).render_struct(&decl), "type Empty struct {\n}");
}

fn txpool_method() -> MethodDecl {
    MethodDecl {
        doc_comment: Some("// return account ready + deferred transactions".to_string()),
        rpc_name: "txpool_accountTransactions".to_string(),
        source_name: "txpool_get_account_transactions".to_string(),
        function_name: "GetAccountTransactions".to_string(),
        params: vec![Param {
            name: "address".to_string(),
            ty: TypeExpr::scalar("RpcAddress"),
        }],
        return_type: TypeExpr::sequence(TypeExpr::scalar("RpcTransaction")),
    }
}

#[test]
fn render_stub___renders_single_invocation() {
    let config = GeneratorConfig::default();

    let code = emitter(&config).render_stub(&txpool_method(), "Txpool");

    assert_eq!(
        code,
        "// return account ready + deferred transactions\n\
         func (c *RpcTxpoolClient) GetAccountTransactions(address types.Address) (val []types.Transaction, err error) {\n\
         \terr = c.core.CallRPC(&val, \"txpool_accountTransactions\", address)\n\
         \treturn\n\
         }"
    );
}

#[test]
fn render_stub___without_params___has_no_trailing_comma() {
    let config = GeneratorConfig::default();
    let method = MethodDecl {
        doc_comment: None,
        rpc_name: "cfx_epochNumber".to_string(),
        source_name: "epoch_number".to_string(),
        function_name: "EpochNumber".to_string(),
        params: Vec::new(),
        return_type: TypeExpr::scalar("U256"),
    };

    let code = emitter(&config).render_stub(&method, "cfx");

    assert_eq!(
        code,
        "func (c *RpcCfxClient) EpochNumber() (val *hexutil.Big, err error) {\n\
         \terr = c.core.CallRPC(&val, \"cfx_epochNumber\")\n\
         \treturn\n\
         }"
    );
}

#[test]
fn render_stub___param_named_val___renames_result() {
    let config = GeneratorConfig::default();
    let method = MethodDecl {
        doc_comment: None,
        rpc_name: "debug_echo".to_string(),
        source_name: "echo".to_string(),
        function_name: "Echo".to_string(),
        params: vec![Param {
            name: "val".to_string(),
            ty: TypeExpr::scalar("u64"),
        }],
        return_type: TypeExpr::scalar("u64"),
    };

    let code = emitter(&config).render_stub(&method, "Debug");

    assert!(code.contains("(result hexutil.Uint64, err error)"));
    assert!(code.contains("CallRPC(&result, \"debug_echo\", val)"));
}

#[test]
fn render_stub___params_named_err_or_receiver___are_suffixed() {
    let config = GeneratorConfig::default();
    let method = MethodDecl {
        doc_comment: None,
        rpc_name: "cfx_a".to_string(),
        source_name: "cfx_a".to_string(),
        function_name: "A".to_string(),
        params: vec![
            Param {
                name: "err".to_string(),
                ty: TypeExpr::scalar("U64"),
            },
            Param {
                name: "c".to_string(),
                ty: TypeExpr::scalar("H256"),
            },
        ],
        return_type: TypeExpr::scalar("U64"),
    };

    let code = emitter(&config).render_stub(&method, "cfx");

    assert_eq!(
        code,
        "func (c *RpcCfxClient) A(err_ hexutil.Uint64, c_ types.Hash) (val hexutil.Uint64, err error) {\n\
         \terr = c.core.CallRPC(&val, \"cfx_a\", err_, c_)\n\
         \treturn\n\
         }"
    );
}

#[test]
fn render_stub___unit_return___maps_to_empty_interface() {
    let config = GeneratorConfig::default();
    let mut method = txpool_method();
    method.return_type = TypeExpr::scalar("()");

    let code = emitter(&config).render_stub(&method, "Txpool");

    assert!(code.contains("(val interface{}, err error)"), "{code}");
}

#[test]
fn render_stub___honours_client_config() {
    let config = GeneratorConfig::from_str(
        "[client]\nreceiver = \"client\"\ncore_field = \"inner\"\ninvoke = \"wrappedCallRPC\"\n",
    )
    .unwrap();

    let code = emitter(&config).render_stub(&txpool_method(), "Txpool");

    assert!(code.contains("func (client *RpcTxpoolClient)"));
    assert!(code.contains("err = client.inner.wrappedCallRPC(&val,"));
}

#[test]
fn render_client_type___declares_struct_and_constructor() {
    let config = GeneratorConfig::default();

    let code = emitter(&config).render_client_type("Trace");

    assert_eq!(
        code,
        "type RpcTraceClient struct {\n\
         \tcore *ClientCore\n\
         }\n\
         \n\
         func NewRpcTraceClient(core *ClientCore) RpcTraceClient {\n\
         \treturn RpcTraceClient{core}\n\
         }"
    );
}

fn next_nonce() -> BatchCandidate {
    BatchCandidate {
        receiver_name: "client".to_string(),
        receiver_type: "RpcCfxClient".to_string(),
        signature: "GetNextNonce(address types.Address, epoch ...*types.Epoch)".to_string(),
        result_name: "nonce".to_string(),
        declared_return: TargetType::parse("*hexutil.Big"),
        pre_call: "realEpoch := get1stEpochIfy(epoch)".to_string(),
        rpc_name: Some("cfx_getNextNonce".to_string()),
        call_args: "\"cfx_getNextNonce\", address, realEpoch".to_string(),
        post_call: String::new(),
    }
}

#[test]
fn render_batch___queues_descriptor_instead_of_calling() {
    let config = GeneratorConfig::default();

    let code = emitter(&config).render_batch(&next_nonce());

    assert_eq!(
        code,
        "func (client *BulkCfxCaller) GetNextNonce(address types.Address, epoch ...*types.Epoch) (*hexutil.Big, *error) {\n\
         \tresult := new(hexutil.Big)\n\
         \terr := new(error)\n\
         \n\
         \trealEpoch := get1stEpochIfy(epoch)\n\
         \t*client.batchElems = append(*client.batchElems, newBatchElem(result, \"cfx_getNextNonce\", address, realEpoch))\n\
         \n\
         \treturn result, err\n\
         }"
    );
}

#[test_case("types.Status", "(*types.Status, *error)", "result := new(types.Status)"; "bare value")]
#[test_case("*hexutil.Big", "(*hexutil.Big, *error)", "result := new(hexutil.Big)"; "pointer")]
#[test_case("[]types.Hash", "([]types.Hash, *error)", "result := make([]types.Hash, 0)"; "slice")]
fn render_batch___allocates_holder_by_shape(declared: &str, returns: &str, allocation: &str) {
    let config = GeneratorConfig::default();
    let mut candidate = next_nonce();
    candidate.declared_return = TargetType::parse(declared);

    let code = emitter(&config).render_batch(&candidate);

    assert!(code.contains(returns), "{code}");
    assert!(code.contains(allocation), "{code}");
}

#[test]
fn render_batch___keeps_post_call_statements() {
    let config = GeneratorConfig::default();
    let mut candidate = next_nonce();
    candidate.pre_call = String::new();
    candidate.post_call = "post()\nif done {\n\tcleanup()\n}".to_string();

    let code = emitter(&config).render_batch(&candidate);

    assert!(code.contains(
        "err := new(error)\n\n\t*client.batchElems = append(*client.batchElems, newBatchElem(result, \"cfx_getNextNonce\", address, realEpoch))\n\tpost()\n\tif done {\n\t\tcleanup()\n\t}\n\n\treturn result, err\n}"
    ));
}

#[test]
fn render_bulk_header___declares_caller_constructor_and_execute() {
    let config = GeneratorConfig::default();

    let code = emitter(&config).render_bulk_header("RpcTraceClient");

    assert!(code.contains("type BulkTraceCaller struct {\n\tcaller interfaces.RpcCallerCore\n\tbatchElems *[]rpc.BatchElem\n}"));
    assert!(code.contains(
        "func NewBulkTraceCaller(caller interfaces.RpcCallerCore, batchElems *[]rpc.BatchElem) *BulkTraceCaller {\n\treturn &BulkTraceCaller{caller, batchElems}\n}"
    ));
    assert!(code.contains(
        "func (b *BulkTraceCaller) Execute() ([]error, error) {\n\treturn batchCall(b.caller, b.batchElems)\n}"
    ));
}

#[test]
fn render_skip___uses_diagnostic_marker() {
    let diagnostic = Diagnostic::new(MismatchKind::ClientMethod, "results are not named", "")
        .with_subject("GetStatus");

    assert_eq!(
        render_skip(&diagnostic),
        "// ignored client method `GetStatus`: results are not named"
    );
}

#[test]
fn render_header___keeps_only_referenced_imports() {
    let imports = vec![
        "github.com/Conflux-Chain/go-conflux-sdk/types".to_string(),
        "github.com/ethereum/go-ethereum/common/hexutil".to_string(),
        "math/big".to_string(),
    ];
    let body = "// big.Int is only mentioned here\ntype A struct {\n\tB types.Hash `json:\"b\"`\n}";

    let header = render_header("types", &imports, body);

    assert_eq!(
        header,
        "// Code generated by rpcgen. DO NOT EDIT.\n\npackage types\n\nimport \"github.com/Conflux-Chain/go-conflux-sdk/types\"\n\n"
    );
}

#[test]
fn render_header___groups_multiple_imports_and_aliases() {
    let imports = vec![
        "sdk github.com/Conflux-Chain/go-conflux-sdk".to_string(),
        "github.com/ethereum/go-ethereum/common/hexutil".to_string(),
        "github.com/ethereum/go-ethereum/common/hexutil".to_string(),
    ];
    let body = "var a sdk.Client\nvar b hexutil.Big";

    let header = render_header("bulk", &imports, body);

    assert!(header.ends_with(
        "import (\n\tsdk \"github.com/Conflux-Chain/go-conflux-sdk\"\n\t\"github.com/ethereum/go-ethereum/common/hexutil\"\n)\n\n"
    ));
}

#[test]
fn render_header___no_references___omits_import_clause() {
    let header = render_header("bulk", &["fmt".to_string()], "type A struct{}");

    assert_eq!(header, format!("{GENERATED_BANNER}\n\npackage bulk\n\n"));
}

#[test_case("github.com/x/y/v2", "y")]
#[test_case("math/big", "big")]
#[test_case("fmt", "fmt")]
#[test_case("github.com/x/v2ray", "v2ray")]
fn package_name___reads_last_element(path: &str, expected: &str) {
    assert_eq!(package_name(path), expected);
}
