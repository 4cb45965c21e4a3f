//! The `check-config` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::generate::{DEFAULT_CONFIG, load_config};

/// Validate a configuration and print its effective type table as JSON
pub fn run(config: Option<PathBuf>) -> Result<()> {
    let path = config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    eprintln!("Checking configuration: {}", path.display());

    let config = load_config(Some(path.as_path()))?;
    config.validate().context("Invalid configuration")?;

    eprintln!("✓ Client package: {}", config.client.package);
    eprintln!("✓ Structs package: {}", config.structs.package);
    eprintln!("✓ Bulk package: {}", config.bulk.package);
    eprintln!("✓ Type overrides: {}", config.types.len());

    println!("{}", type_table_json(&config)?);
    eprintln!("\nConfiguration is valid!");

    Ok(())
}

fn type_table_json(config: &rpcgen_core::GeneratorConfig) -> Result<String> {
    let type_table = config.type_table();
    let table: BTreeMap<&str, String> = type_table
        .iter()
        .map(|(source, target)| (source.as_str(), target.to_string()))
        .collect();

    Ok(serde_json::to_string_pretty(&table)?)
}
