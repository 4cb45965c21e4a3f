//! Struct schema extraction.
//!
//! Struct-bearing schema files interleave data records with helper
//! declarations, so only `pub struct Name { ... }` with named fields and no
//! generics is accepted. Each declaration is isolated with the delimiter
//! scanner and then parsed on its own with `syn`, which means one
//! unparseable helper never hides the records around it.

use syn::ext::IdentExt;
use syn::{Attribute, Expr, ExprLit, Fields, ItemStruct, Lit, Meta, Visibility};

use super::ir::{Extracted, FieldDecl, StructDecl, TypeExpr};
use super::scan::{Masked, Syntax};
use crate::diagnostics::{Diagnostic, MismatchKind};

/// Extract every struct declaration of `source`, in source order.
pub fn extract_structs(source: &str) -> Vec<Extracted<StructDecl>> {
    let masked = Masked::new(source, Syntax::Rust);
    let len = source.len();
    let mut results = Vec::new();
    let mut cursor = 0;

    while let Some(keyword) = masked.find_keyword("struct", cursor) {
        let start = masked.decoration_start(keyword);
        let subject = masked
            .skip_whitespace(keyword + "struct".len())
            .and_then(|at| masked.ident_at(at))
            .map(|range| masked.slice(range).to_string());

        let brace = masked.find_top_level(keyword..len, b'{');
        let semi = masked.find_top_level(keyword..len, b';');

        let (outcome, next) = match (brace, semi) {
            (Some(open), semi) if semi.is_none_or(|semi| open < semi) => {
                match masked.matching_close(open) {
                    Some(close) => (
                        parse_struct(masked.slice(start..close + 1)),
                        close + 1,
                    ),
                    None => (
                        Extracted::Skipped(Diagnostic::new(
                            MismatchKind::StructHead,
                            "unbalanced braces",
                            masked.slice(start..len),
                        )),
                        len,
                    ),
                }
            }
            (_, Some(semi)) => (
                Extracted::Skipped(Diagnostic::new(
                    MismatchKind::StructHead,
                    "tuple or unit struct",
                    masked.slice(start..semi + 1),
                )),
                semi + 1,
            ),
            (_, None) => (
                Extracted::Skipped(Diagnostic::new(
                    MismatchKind::StructHead,
                    "no struct body",
                    masked.slice(start..len),
                )),
                len,
            ),
        };

        results.push(match (outcome, &subject) {
            (Extracted::Skipped(diagnostic), Some(name)) if diagnostic.subject.is_none() => {
                Extracted::Skipped(diagnostic.with_subject(name.clone()))
            }
            (outcome, _) => outcome,
        });
        cursor = next;
    }

    results
}

/// Parse one isolated struct fragment.
fn parse_struct(fragment: &str) -> Extracted<StructDecl> {
    let skip = |reason: String| {
        Extracted::Skipped(Diagnostic::new(MismatchKind::StructHead, reason, fragment))
    };

    let item = match syn::parse_str::<ItemStruct>(fragment) {
        Ok(item) => item,
        Err(e) => return skip(format!("not a struct declaration: {e}")),
    };

    if !matches!(item.vis, Visibility::Public(_)) {
        return skip("struct is not `pub`".to_string());
    }
    if !item.generics.params.is_empty() {
        return skip("generic struct".to_string());
    }
    let Fields::Named(named) = &item.fields else {
        return skip("fields are not named".to_string());
    };

    let fields = named
        .named
        .iter()
        .filter(|field| !is_serde_skipped(&field.attrs))
        .filter_map(|field| {
            let ident = field.ident.as_ref()?;
            Some(FieldDecl {
                source_name: ident.unraw().to_string(),
                ty: TypeExpr::from_syn(&field.ty),
                docs: extract_docs(&field.attrs),
                serde_rename: extract_serde_rename(&field.attrs),
            })
        })
        .collect();

    Extracted::Found(StructDecl {
        name: item.ident.to_string(),
        docs: extract_docs(&item.attrs),
        fields,
    })
}

/// Extract `///` documentation lines.
fn extract_docs(attrs: &[Attribute]) -> Vec<String> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(meta) => match &meta.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(text),
                    ..
                }) => Some(text.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .filter(|doc| !doc.is_empty())
        .collect()
}

/// Extract `#[serde(rename = "...")]`.
fn extract_serde_rename(attrs: &[Attribute]) -> Option<String> {
    let mut rename = None;

    for attr in serde_attrs(attrs) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if let Ok(value) = meta.value() {
                    let lit: syn::LitStr = value.parse()?;
                    rename = Some(lit.value());
                }
            } else if meta.input.peek(syn::Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            }
            Ok(())
        });
    }

    rename
}

/// Whether a field carries `#[serde(skip)]` or `#[serde(skip_serializing)]`.
fn is_serde_skipped(attrs: &[Attribute]) -> bool {
    let mut skipped = false;

    for attr in serde_attrs(attrs) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                skipped = true;
            } else if meta.input.peek(syn::Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            }
            Ok(())
        });
    }

    skipped
}

fn serde_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("serde"))
}
