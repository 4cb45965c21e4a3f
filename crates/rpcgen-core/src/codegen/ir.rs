//! Intermediate representation shared by the extractors and the emitter.
//!
//! Extraction never renders text and rendering never inspects source text:
//! the extractors produce the values in this module, and the Go emitter
//! consumes them. This keeps every step independently testable against fixed
//! fixtures.
//!
//! # Structure
//!
//! - [`TypeExpr`]: a schema-side type (scalar, optional, sequence)
//! - [`TargetType`]: a Go-side type (named, pointer, slice)
//! - [`StructDecl`] / [`FieldDecl`]: a data record from a struct schema
//! - [`MethodDecl`] / [`Param`]: one RPC method from a trait block
//! - [`TraitDecl`]: one trait block and its extracted methods
//! - [`BatchCandidate`] / [`ClientMethod`]: one method of an existing client,
//!   ready for the bulk rewrite
//! - [`Extracted`]: the explicit found-or-skipped outcome of an extraction

use std::fmt;

use quote::ToTokens;
use syn::{GenericArgument, PathArguments, Type};

use crate::diagnostics::Diagnostic;

/// A type as written in the Rust schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// A plain type name, looked up in the type table.
    Scalar(String),
    /// `Option<T>`.
    Optional(Box<TypeExpr>),
    /// `Vec<T>`, `[T]` or `[T; N]`.
    Sequence(Box<TypeExpr>),
}

impl TypeExpr {
    /// Shorthand for a scalar.
    pub fn scalar(name: impl Into<String>) -> Self {
        TypeExpr::Scalar(name.into())
    }

    /// Shorthand for `Option<inner>`.
    pub fn optional(inner: TypeExpr) -> Self {
        TypeExpr::Optional(Box::new(inner))
    }

    /// Shorthand for `Vec<inner>`.
    pub fn sequence(inner: TypeExpr) -> Self {
        TypeExpr::Sequence(Box::new(inner))
    }

    /// Convert a parsed Rust type.
    ///
    /// `Option` and `Vec` become wrappers, `Box<T>` and `&T` are transparent,
    /// and any other path without generic arguments becomes a scalar named
    /// after its last segment. Everything else becomes a scalar holding the
    /// type's token text with whitespace removed, so it passes through the
    /// type table unchanged.
    pub fn from_syn(ty: &Type) -> TypeExpr {
        match ty {
            Type::Path(type_path) if type_path.qself.is_none() => {
                let Some(segment) = type_path.path.segments.last() else {
                    return TypeExpr::Scalar(token_text(ty));
                };

                match (segment.ident.to_string().as_str(), single_type_arg(segment)) {
                    ("Option", Some(inner)) => TypeExpr::optional(Self::from_syn(inner)),
                    ("Vec", Some(inner)) => TypeExpr::sequence(Self::from_syn(inner)),
                    ("Box", Some(inner)) => Self::from_syn(inner),
                    (name, _) if segment.arguments.is_none() => TypeExpr::scalar(name),
                    _ => TypeExpr::Scalar(token_text(ty)),
                }
            }
            Type::Reference(reference) => Self::from_syn(&reference.elem),
            Type::Slice(slice) => TypeExpr::sequence(Self::from_syn(&slice.elem)),
            Type::Array(array) => TypeExpr::sequence(Self::from_syn(&array.elem)),
            Type::Paren(paren) => Self::from_syn(&paren.elem),
            Type::Group(group) => Self::from_syn(&group.elem),
            _ => TypeExpr::Scalar(token_text(ty)),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Scalar(name) => f.write_str(name),
            TypeExpr::Optional(inner) => write!(f, "Option<{inner}>"),
            TypeExpr::Sequence(inner) => write!(f, "Vec<{inner}>"),
        }
    }
}

/// A type in the Go vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetType {
    /// A named type such as `types.Hash` or `map[string]string`.
    Named(String),
    /// `*T`.
    Pointer(Box<TargetType>),
    /// `[]T`.
    Slice(Box<TargetType>),
}

impl TargetType {
    /// Shorthand for a named type.
    pub fn named(name: impl Into<String>) -> Self {
        TargetType::Named(name.into())
    }

    /// Parse Go type text: leading `*` and `[]` become wrappers, the rest is
    /// kept as a named type.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(inner) = text.strip_prefix('*') {
            TargetType::Pointer(Box::new(Self::parse(inner)))
        } else if let Some(inner) = text.strip_prefix("[]") {
            TargetType::Slice(Box::new(Self::parse(inner)))
        } else {
            TargetType::Named(text.to_string())
        }
    }

    /// Whether the type already refers to its value indirectly.
    pub fn is_indirect(&self) -> bool {
        matches!(self, TargetType::Pointer(_) | TargetType::Slice(_))
    }

    /// Add one level of indirection unless the type already has one.
    pub fn indirect(self) -> Self {
        if self.is_indirect() {
            self
        } else {
            TargetType::Pointer(Box::new(self))
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Named(name) => f.write_str(name),
            TargetType::Pointer(inner) => write!(f, "*{inner}"),
            TargetType::Slice(inner) => write!(f, "[]{inner}"),
        }
    }
}

/// A data record extracted from a struct schema.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    /// The struct name.
    pub name: String,

    /// `///` documentation lines.
    pub docs: Vec<String>,

    /// Fields in declaration order.
    pub fields: Vec<FieldDecl>,
}

/// One field of a [`StructDecl`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    /// Field name as written in the schema.
    pub source_name: String,

    /// Field type.
    pub ty: TypeExpr,

    /// `///` documentation lines.
    pub docs: Vec<String>,

    /// Serde rename attribute, if present.
    pub serde_rename: Option<String>,
}

/// One RPC method extracted from a trait block.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    /// Comment lines preceding the method, verbatim.
    pub doc_comment: Option<String>,

    /// Wire-level method name from `#[rpc(name = "...")]`.
    pub rpc_name: String,

    /// Method name as declared in the trait.
    pub source_name: String,

    /// Exported Go name, namespace prefix removed.
    pub function_name: String,

    /// Parameters after `&self`, in order.
    pub params: Vec<Param>,

    /// Inner type of the result wrapper.
    pub return_type: TypeExpr,
}

/// One parameter of a [`MethodDecl`].
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeExpr,
}

/// A method of an existing Go client that can be rewritten into a batched
/// variant.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchCandidate {
    /// Receiver variable name (`client` in `func (client *RpcCfxClient)`).
    pub receiver_name: String,

    /// Receiver type without the pointer marker.
    pub receiver_type: String,

    /// Method name and parameter list, verbatim.
    pub signature: String,

    /// Name of the non-error named result.
    pub result_name: String,

    /// Type of the non-error named result.
    pub declared_return: TargetType,

    /// Statements before the invocation, error checks removed.
    pub pre_call: String,

    /// Wire-level method name, when the first call argument is a literal.
    pub rpc_name: Option<String>,

    /// Invocation arguments after the result pointer, verbatim.
    pub call_args: String,

    /// Statements after the invocation up to the final `return`, error
    /// checks removed.
    pub post_call: String,
}

impl BatchCandidate {
    /// Return type of the batched method: results are filled in after
    /// execution, so bare values are returned through a pointer.
    pub fn batched_return(&self) -> TargetType {
        self.declared_return.clone().indirect()
    }
}

/// One `trait` block of an interface schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitDecl {
    /// The trait name.
    pub name: String,

    /// Namespace used for the client type and for prefix stripping.
    pub namespace: String,

    /// Member statements in source order.
    pub methods: Vec<Extracted<MethodDecl>>,
}

/// One `func` of an existing Go client, with the comments that follow it.
///
/// Trailing comments sit beside the outcome rather than inside the
/// candidate so a skipped method still passes the next method's doc comment
/// through.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientMethod {
    pub outcome: Extracted<BatchCandidate>,

    /// Comment lines between this function and the next one.
    pub trailing_comments: Vec<String>,
}

/// Outcome of extracting one declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted<T> {
    /// The fragment matched the expected shape.
    Found(T),
    /// The fragment did not match and was skipped.
    Skipped(Diagnostic),
}

impl<T> Extracted<T> {
    /// The extracted value, if any.
    pub fn found(&self) -> Option<&T> {
        match self {
            Extracted::Found(value) => Some(value),
            Extracted::Skipped(_) => None,
        }
    }

    /// The skip diagnostic, if any.
    pub fn skipped(&self) -> Option<&Diagnostic> {
        match self {
            Extracted::Found(_) => None,
            Extracted::Skipped(diagnostic) => Some(diagnostic),
        }
    }
}

fn single_type_arg(segment: &syn::PathSegment) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first() {
        Some(GenericArgument::Type(inner)) => Some(inner),
        _ => None,
    }
}

fn token_text(ty: &Type) -> String {
    ty.to_token_stream()
        .to_string()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}
