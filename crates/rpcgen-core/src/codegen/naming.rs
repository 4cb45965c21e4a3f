//! Naming convention utilities for code generation.
//!
//! Rust schemas use `snake_case` for fields, parameters and methods, while the
//! generated Go code needs exported (`UpperCamel`) identifiers for types,
//! methods and struct fields, and `lowerCamel` identifiers for parameters and
//! JSON keys.
//!
//! # Supported Conversions
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `block_hash` | [`to_lower_camel`] | `blockHash` |
//! | `block-hash` | [`to_upper_camel`] | `BlockHash` |
//! | `word` | [`capitalize`] | `Word` |
//! | `TxpoolGetStatus`, `Txpool` | [`strip_namespace`] | `GetStatus` |

/// Go reserved words that cannot be used as parameter names.
const GO_KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Convert a snake_case or kebab-case identifier to lowerCamelCase.
///
/// Only the character following a separator is changed, so input that is
/// already camel-cased passes through.
///
/// # Examples
///
/// ```
/// use rpcgen_core::codegen::naming::to_lower_camel;
///
/// assert_eq!(to_lower_camel("block_hash"), "blockHash");
/// assert_eq!(to_lower_camel("epoch-number"), "epochNumber");
/// assert_eq!(to_lower_camel("already"), "already");
/// ```
pub fn to_lower_camel(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = false;

    for c in s.trim().chars() {
        if c == '_' || c == '-' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}

/// Convert a snake_case or kebab-case identifier to UpperCamelCase.
///
/// # Examples
///
/// ```
/// use rpcgen_core::codegen::naming::to_upper_camel;
///
/// assert_eq!(to_upper_camel("get_next_nonce"), "GetNextNonce");
/// assert_eq!(to_upper_camel("block-hash"), "BlockHash");
/// assert_eq!(to_upper_camel("blockHash"), "BlockHash");
/// ```
pub fn to_upper_camel(s: &str) -> String {
    capitalize(&to_lower_camel(s))
}

/// Capitalize the first letter of a string.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
    }
}

/// Remove a leading namespace from an exported function name.
///
/// The namespace is compared in its exported form and is only removed when a
/// new word follows it, so `Txpool` strips `TxpoolStatus` to `Status` but
/// leaves `Txpools` alone.
pub fn strip_namespace(exported: &str, namespace: &str) -> String {
    let namespace = to_upper_camel(namespace);
    if namespace.is_empty() {
        return exported.to_string();
    }

    match exported.strip_prefix(&namespace) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_uppercase()) => rest.to_string(),
        _ => exported.to_string(),
    }
}

/// Make a lowerCamel identifier safe to use as a Go parameter name.
pub fn go_param_name(source: &str) -> String {
    let name = to_lower_camel(source);
    if GO_KEYWORDS.contains(&name.as_str()) {
        format!("{name}_")
    } else {
        name
    }
}

/// Replace an optional prefix and suffix of `name` with new ones.
///
/// Used for the role renames `Rpc<Ns>Client` → `Bulk<Ns>Caller`; a name
/// lacking the old prefix or suffix keeps its core unchanged.
pub fn swap_affixes(
    name: &str,
    old_prefix: &str,
    old_suffix: &str,
    new_prefix: &str,
    new_suffix: &str,
) -> String {
    let core = name.strip_prefix(old_prefix).unwrap_or(name);
    let core = core.strip_suffix(old_suffix).unwrap_or(core);
    format!("{new_prefix}{core}{new_suffix}")
}
