//! Trait schema extraction.
//!
//! A trait block is split into member statements with the delimiter scanner;
//! each statement is then parsed on its own as a `syn::TraitItem`. Members
//! that are not `#[rpc(name = "...")] fn name(&self, ...) -> Wrapper<T>;`
//! signatures come back as skips, so a helper or an unusual member never
//! hides the methods after it.

use std::ops::Range;

use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{
    Attribute, Expr, ExprLit, FnArg, GenericArgument, Lit, Meta, Pat, PathArguments, ReturnType,
    Token, TraitItem, TraitItemFn, Type,
};

use super::ir::{Extracted, MethodDecl, Param, TraitDecl, TypeExpr};
use super::naming::{strip_namespace, to_upper_camel};
use super::scan::{Masked, Syntax};
use crate::diagnostics::{Diagnostic, MismatchKind};

/// Settings for trait extraction.
#[derive(Debug, Clone, Copy)]
pub struct TraitOptions<'a> {
    /// Namespace for every trait; `None` derives it from each trait's name.
    pub namespace: Option<&'a str>,

    /// Generic result wrappers to unwrap from return types, outermost first
    /// or in any order.
    pub result_wrappers: &'a [String],
}

/// Extract every trait block of `source`, in source order.
pub fn extract_traits(source: &str, options: TraitOptions<'_>) -> Vec<TraitDecl> {
    let masked = Masked::new(source, Syntax::Rust);
    let len = source.len();
    let mut traits = Vec::new();
    let mut cursor = 0;

    while let Some(keyword) = masked.find_keyword("trait", cursor) {
        cursor = keyword + "trait".len();

        let Some(name) = masked
            .skip_whitespace(cursor)
            .and_then(|at| masked.ident_at(at))
        else {
            continue;
        };
        let Some(open) = masked.find_top_level(name.end..len, b'{') else {
            tracing::warn!("trait `{}` has no body", masked.slice(name.clone()));
            break;
        };
        let Some(close) = masked.matching_close(open) else {
            tracing::warn!("trait `{}` has unbalanced braces", masked.slice(name.clone()));
            break;
        };

        let name = masked.slice(name).to_string();
        let namespace = options
            .namespace
            .map(str::to_string)
            .unwrap_or_else(|| default_namespace(&name));

        let methods = masked
            .split_statements(open + 1..close)
            .into_iter()
            .filter(|statement| !masked.is_blank(statement.clone()))
            .map(|statement| extract_method(&masked, statement, &namespace, options))
            .collect();

        traits.push(TraitDecl {
            name,
            namespace,
            methods,
        });
        cursor = close + 1;
    }

    traits
}

/// Namespace implied by a trait name: `Rpc` prefix or suffix removed.
///
/// ```
/// use rpcgen_core::codegen::traits::default_namespace;
///
/// assert_eq!(default_namespace("TransactionPool"), "TransactionPool");
/// assert_eq!(default_namespace("RpcTxpool"), "Txpool");
/// assert_eq!(default_namespace("DebugRpc"), "Debug");
/// ```
pub fn default_namespace(trait_name: &str) -> String {
    let core = trait_name
        .strip_prefix("Rpc")
        .filter(|rest| !rest.is_empty())
        .unwrap_or(trait_name);
    let core = core
        .strip_suffix("Rpc")
        .filter(|rest| !rest.is_empty())
        .unwrap_or(core);
    core.to_string()
}

fn extract_method(
    masked: &Masked<'_>,
    statement: Range<usize>,
    namespace: &str,
    options: TraitOptions<'_>,
) -> Extracted<MethodDecl> {
    let text = masked.slice(statement);
    let doc_comment = leading_comment(text);

    let skip = |reason: &str, subject: Option<String>| {
        let diagnostic = Diagnostic::new(MismatchKind::TraitStatement, reason, text);
        Extracted::Skipped(match subject {
            Some(subject) => diagnostic.with_subject(subject),
            None => diagnostic,
        })
    };

    let method = match syn::parse_str::<TraitItem>(text) {
        Ok(TraitItem::Fn(method)) => method,
        Ok(_) => return skip("not a method", None),
        Err(e) => return skip(&format!("not a method signature: {e}"), None),
    };
    let subject = Some(method.sig.ident.unraw().to_string());

    if method.default.is_some() {
        return skip("method has a default body", subject);
    }
    let Some(rpc_name) = rpc_name(&method.attrs) else {
        return skip("missing #[rpc(name = \"...\")] attribute", subject);
    };

    match signature(&method, options.result_wrappers) {
        Ok((params, return_type)) => {
            let source_name = method.sig.ident.unraw().to_string();
            Extracted::Found(MethodDecl {
                doc_comment,
                rpc_name,
                function_name: strip_namespace(&to_upper_camel(&source_name), namespace),
                source_name,
                params,
                return_type,
            })
        }
        Err(reason) => skip(reason, subject),
    }
}

/// Contiguous `//` lines at the start of a statement, indentation trimmed.
fn leading_comment(text: &str) -> Option<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .skip_while(|line| line.is_empty())
        .take_while(|line| line.starts_with("//"))
        .collect();

    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Wire-level name from `#[rpc(name = "...")]`.
fn rpc_name(attrs: &[Attribute]) -> Option<String> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("rpc"))
        .filter_map(|attr| {
            attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
                .ok()
        })
        .flatten()
        .find_map(|meta| match meta {
            Meta::NameValue(pair) if pair.path.is_ident("name") => match pair.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(name),
                    ..
                }) => Some(name.value()),
                _ => None,
            },
            _ => None,
        })
}

/// Parameters after `&self` and the unwrapped return type.
fn signature(
    method: &TraitItemFn,
    result_wrappers: &[String],
) -> Result<(Vec<Param>, TypeExpr), &'static str> {
    let mut inputs = method.sig.inputs.iter();

    match inputs.next() {
        Some(FnArg::Receiver(receiver))
            if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => return Err("first parameter is not &self"),
    }

    let params = inputs
        .map(|input| match input {
            FnArg::Typed(typed) => match typed.pat.as_ref() {
                Pat::Ident(pat) => Ok(Param {
                    name: pat.ident.unraw().to_string(),
                    ty: TypeExpr::from_syn(&typed.ty),
                }),
                _ => Err("parameter pattern is not a plain name"),
            },
            FnArg::Receiver(_) => Err("unexpected receiver"),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let ReturnType::Type(_, ty) = &method.sig.output else {
        return Err("no return type");
    };

    Ok((params, TypeExpr::from_syn(unwrap_result(ty, result_wrappers))))
}

/// Strip result wrappers such as `JsonRpcResult<T>` or `BoxFuture<Result<T>>`.
fn unwrap_result<'t>(mut ty: &'t Type, result_wrappers: &[String]) -> &'t Type {
    while let Type::Path(path) = ty {
        let Some(segment) = path.path.segments.last() else {
            break;
        };
        if !result_wrappers.iter().any(|w| segment.ident == w.as_str()) {
            break;
        }
        let PathArguments::AngleBracketed(args) = &segment.arguments else {
            break;
        };
        let Some(inner) = args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        }) else {
            break;
        };
        ty = inner;
    }
    ty
}
