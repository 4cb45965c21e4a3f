//! The `client`, `structs` and `bulk` commands.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rpcgen_core::{GeneratedUnit, Generator, GeneratorConfig, read_input};

/// Configuration file picked up from the working directory.
pub const DEFAULT_CONFIG: &str = "rpcgen.toml";

/// Which generator to run.
#[derive(Debug, Clone)]
pub enum Mode {
    Client { namespace: Option<String> },
    Structs,
    Bulk { client: Option<String> },
}

impl Mode {
    fn name(&self) -> &'static str {
        match self {
            Mode::Client { .. } => "client",
            Mode::Structs => "structs",
            Mode::Bulk { .. } => "bulk",
        }
    }
}

/// File arguments shared by the generation commands.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub input: PathBuf,
    pub output: String,
    pub config: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

/// Run one generation command
pub fn run(mode: Mode, options: &GenerateOptions) -> Result<()> {
    let config = load_config(options.config.as_deref())?;
    let generator = Generator::new(config).context("Invalid configuration")?;

    tracing::info!("reading {}", options.input.display());
    let input = read_input(&options.input)
        .with_context(|| format!("Failed to read input: {}", options.input.display()))?;

    let unit = match &mode {
        Mode::Client { namespace } => generator.client(&input, namespace.as_deref()),
        Mode::Structs => generator.structs(&input),
        Mode::Bulk { client } => generator
            .bulk(&input, client.as_deref())
            .with_context(|| format!("Failed to rewrite {}", options.input.display()))?,
    };

    write_output(&options.output, &unit.source())?;
    if let Some(report) = &options.report {
        write_report(report, &mode, &options.input, &unit)?;
    }

    if unit.skipped() > 0 {
        tracing::warn!(
            "{} declarations skipped; review the `// ignored` markers",
            unit.skipped()
        );
    }

    Ok(())
}

/// Load the given configuration, or `./rpcgen.toml` when present, or the
/// defaults.
pub fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG).is_file() => Path::new(DEFAULT_CONFIG),
        None => return Ok(GeneratorConfig::default()),
    };

    tracing::debug!("loading configuration {}", path.display());
    GeneratorConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration: {}", path.display()))
}

/// Write generated source to a file (creating parent directories) or to
/// stdout for `-`.
pub fn write_output(output: &str, source: &str) -> Result<()> {
    if output == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(source.as_bytes())
            .context("Failed to write to stdout")?;
        return stdout.flush().context("Failed to write to stdout");
    }

    let path = Path::new(output);
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, source).with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("generated {}", path.display());
    Ok(())
}

fn write_report(path: &Path, mode: &Mode, input: &Path, unit: &GeneratedUnit) -> Result<()> {
    let report = report_json(mode, input, unit);
    let text = serde_json::to_string_pretty(&report)?;

    fs::write(path, text + "\n")
        .with_context(|| format!("Failed to write report: {}", path.display()))
}

fn report_json(mode: &Mode, input: &Path, unit: &GeneratedUnit) -> serde_json::Value {
    serde_json::json!({
        "mode": mode.name(),
        "input": input.display().to_string(),
        "generated": unit.generated,
        "skipped": unit.skipped(),
        "diagnostics": unit.diagnostics,
    })
}
