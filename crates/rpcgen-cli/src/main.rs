//! rpcgen CLI - Go RPC client binding generator
//!
//! Commands:
//! - `rpcgen client` - Generate client stubs from a trait schema
//! - `rpcgen structs` - Generate Go structs from a struct schema
//! - `rpcgen bulk` - Generate a batched caller from an existing Go client
//! - `rpcgen check-config` - Validate an rpcgen.toml configuration

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod check;
mod generate;
mod logging;

use generate::{GenerateOptions, Mode};

#[derive(Parser)]
#[command(name = "rpcgen")]
#[command(author, version, about = "Go RPC client binding generator", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG wins
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct IoArgs {
    /// Input file
    #[arg(short, long)]
    input: PathBuf,

    /// Output Go file, or `-` for stdout
    #[arg(short, long)]
    output: String,

    /// Path to rpcgen.toml (default: ./rpcgen.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write skipped declarations as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

impl IoArgs {
    fn into_options(self) -> GenerateOptions {
        GenerateOptions {
            input: self.input,
            output: self.output,
            config: self.config,
            report: self.report,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate client stubs from a Rust trait schema
    Client {
        #[command(flatten)]
        io: IoArgs,

        /// Namespace for every trait (default: derived from the trait name)
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Generate Go structs from a Rust struct schema
    Structs {
        #[command(flatten)]
        io: IoArgs,
    },

    /// Generate a batched caller from an existing Go client
    Bulk {
        #[command(flatten)]
        io: IoArgs,

        /// Client type to rewrite (default: first receiver in the file)
        #[arg(long)]
        client: Option<String>,
    },

    /// Validate an rpcgen.toml and print the effective type table
    CheckConfig {
        /// Path to rpcgen.toml (default: ./rpcgen.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Client { io, namespace } => {
            generate::run(Mode::Client { namespace }, &io.into_options())?;
        }
        Commands::Structs { io } => {
            generate::run(Mode::Structs, &io.into_options())?;
        }
        Commands::Bulk { io, client } => {
            generate::run(Mode::Bulk { client }, &io.into_options())?;
        }
        Commands::CheckConfig { config } => {
            check::run(config)?;
        }
    }

    Ok(())
}
