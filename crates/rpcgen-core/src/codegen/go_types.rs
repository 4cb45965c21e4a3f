//! Go type mappings for schema types.
//!
//! The mapping table is a value, not module state: a [`TypeMapper`] owns the
//! [`TypeTable`] it was built with, so several dialects can be generated side
//! by side.
//!
//! # Built-in Mappings
//!
//! | Rust | Go |
//! |------|----|
//! | `u64` / `U64` | `hexutil.Uint64` |
//! | `U256` | `*hexutil.Big` |
//! | `H256` | `types.Hash` |
//! | `RpcAddress` | `types.Address` |
//! | `RpcTransaction` | `types.Transaction` |
//! | `()` | `interface{}` |
//! | `Option<T>` | `*T` (no second pointer) |
//! | `Vec<T>` | `[]T` |
//!
//! Unmapped scalars resolve to themselves.

use std::collections::BTreeMap;

use super::ir::{TargetType, TypeExpr};

/// Built-in scalar mappings, source name to Go type text.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    ("u64", "hexutil.Uint64"),
    ("U64", "hexutil.Uint64"),
    ("U256", "*hexutil.Big"),
    ("H256", "types.Hash"),
    ("H160", "common.Address"),
    ("RpcAddress", "types.Address"),
    ("RpcTransaction", "types.Transaction"),
    ("Bytes", "hexutil.Bytes"),
    ("usize", "hexutil.Uint"),
    ("u8", "uint8"),
    ("u16", "uint16"),
    ("u32", "uint32"),
    ("i32", "int32"),
    ("i64", "int64"),
    ("bool", "bool"),
    ("String", "string"),
    ("str", "string"),
    ("()", "interface{}"),
];

/// Mapping from schema scalar names to Go types.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeTable {
    entries: BTreeMap<String, TargetType>,
}

impl TypeTable {
    /// An empty table: every scalar passes through.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add or replace one mapping.
    pub fn insert(&mut self, source: impl Into<String>, target: TargetType) {
        self.entries.insert(source.into(), target);
    }

    /// Return a copy with `overrides` (source name to Go type text) applied.
    pub fn with_overrides<'a>(
        mut self,
        overrides: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Self {
        for (source, target) in overrides {
            self.insert(source.clone(), TargetType::parse(target));
        }
        self
    }

    pub fn get(&self, source: &str) -> Option<&TargetType> {
        self.entries.get(source)
    }

    /// Mappings in source-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TargetType)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for (source, target) in DEFAULT_MAPPINGS {
            table.insert(*source, TargetType::parse(target));
        }
        table
    }
}

/// Resolves schema types to Go types through an injected [`TypeTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMapper {
    table: TypeTable,
}

impl TypeMapper {
    pub fn new(table: TypeTable) -> Self {
        Self { table }
    }

    /// Resolve a schema type. Total: unmapped scalars pass through unchanged.
    pub fn resolve(&self, expr: &TypeExpr) -> TargetType {
        match expr {
            TypeExpr::Scalar(name) => self
                .table
                .get(name)
                .cloned()
                .unwrap_or_else(|| TargetType::Named(name.clone())),
            TypeExpr::Optional(inner) => self.resolve(inner).indirect(),
            TypeExpr::Sequence(inner) => TargetType::Slice(Box::new(self.resolve(inner))),
        }
    }
}

impl Default for TypeMapper {
    fn default() -> Self {
        Self::new(TypeTable::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use test_case::test_case;

    fn resolve(expr: TypeExpr) -> String {
        TypeMapper::default().resolve(&expr).to_string()
    }

    #[test_case("u64", "hexutil.Uint64")]
    #[test_case("U64", "hexutil.Uint64")]
    #[test_case("U256", "*hexutil.Big")]
    #[test_case("H256", "types.Hash")]
    #[test_case("RpcAddress", "types.Address")]
    #[test_case("RpcTransaction", "types.Transaction")]
    #[test_case("String", "string")]
    #[test_case("bool", "bool")]
    #[test_case("()", "interface{}")]
    fn resolve___mapped_scalar___uses_table(source: &str, expected: &str) {
        assert_eq!(resolve(TypeExpr::scalar(source)), expected);
    }

    #[test_case("RpcBlock")]
    #[test_case("EpochNumber")]
    #[test_case("BTreeMap<H256,U256>")]
    fn resolve___unmapped_scalar___passes_through(source: &str) {
        assert_eq!(resolve(TypeExpr::scalar(source)), source);
    }

    #[test]
    fn resolve___optional_bare_type___adds_pointer() {
        assert_eq!(
            resolve(TypeExpr::optional(TypeExpr::scalar("H256"))),
            "*types.Hash"
        );
    }

    #[test]
    fn resolve___optional_pointer_type___adds_no_second_pointer() {
        assert_eq!(
            resolve(TypeExpr::optional(TypeExpr::scalar("U256"))),
            "*hexutil.Big"
        );
    }

    #[test]
    fn resolve___optional_sequence___stays_slice() {
        assert_eq!(
            resolve(TypeExpr::optional(TypeExpr::sequence(TypeExpr::scalar(
                "RpcTransaction"
            )))),
            "[]types.Transaction"
        );
    }

    #[test]
    fn resolve___nested_optional___collapses_to_single_pointer() {
        assert_eq!(
            resolve(TypeExpr::optional(TypeExpr::optional(TypeExpr::scalar(
                "H256"
            )))),
            "*types.Hash"
        );
    }

    #[test]
    fn resolve___sequence_of_optional___keeps_element_pointer() {
        assert_eq!(
            resolve(TypeExpr::sequence(TypeExpr::optional(TypeExpr::scalar(
                "H256"
            )))),
            "[]*types.Hash"
        );
    }

    #[test]
    fn resolve___nested_sequence___maps_recursively() {
        assert_eq!(
            resolve(TypeExpr::sequence(TypeExpr::sequence(TypeExpr::scalar(
                "U256"
            )))),
            "[][]*hexutil.Big"
        );
    }

    #[test]
    fn resolve___empty_table___passes_everything_through() {
        let mapper = TypeMapper::new(TypeTable::empty());

        assert_eq!(
            mapper.resolve(&TypeExpr::scalar("U256")).to_string(),
            "U256"
        );
    }

    #[test]
    fn with_overrides___replaces_and_extends_defaults() {
        let overrides = BTreeMap::from([
            ("U256".to_string(), "*big.Int".to_string()),
            ("EpochNumber".to_string(), "types.Epoch".to_string()),
        ]);
        let mapper = TypeMapper::new(TypeTable::default().with_overrides(&overrides));

        assert_eq!(
            mapper.resolve(&TypeExpr::scalar("U256")).to_string(),
            "*big.Int"
        );
        assert_eq!(
            mapper
                .resolve(&TypeExpr::optional(TypeExpr::scalar("EpochNumber")))
                .to_string(),
            "*types.Epoch"
        );
        assert_eq!(
            mapper.resolve(&TypeExpr::scalar("H256")).to_string(),
            "types.Hash"
        );
    }

    #[test]
    fn default_table___is_sorted_by_source_name() {
        let table = TypeTable::default();
        let names: Vec<&String> = table.iter().map(|(name, _)| name).collect();
        let mut sorted = names.clone();
        sorted.sort();

        assert_eq!(names, sorted);
        assert_eq!(table.len(), DEFAULT_MAPPINGS.len());
    }
}
