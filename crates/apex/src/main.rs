use std::{env, process};

use apex_core::dwarf::read_debug_info;
use apex_core::ir::ApiSurface;
use apex_core::Result;
use apex_utils::{info, init_logging, init_logging_with_level, LogFormat, LogLevel};
use clap::{Parser, Subcommand};

mod render;

/// Extract the API surface of a compiled binary from its debug info.
#[derive(Parser, Debug)]
#[command(name = "apex")]
#[command(version)]
#[command(about = "Extract the API surface of a compiled binary from its debug info", long_about = None)]
struct Cli
{
    /// Log level override (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Print the full API surface: structures first, then free functions
    Dump
    {
        /// Path to the binary to inspect
        binary: String,
    },
    /// Print structures (classes and structs) only
    Classes
    {
        /// Path to the binary to inspect
        binary: String,
    },
    /// Print functions only, methods included
    Functions
    {
        /// Path to the binary to inspect
        binary: String,
    },
    /// Print build statistics for the binary's debug info
    Stats
    {
        /// Path to the binary to inspect
        binary: String,
    },
}

fn main()
{
    let cli = Cli::parse();

    // Initialize logging before any work. The --log-level flag wins over
    // RUST_LOG; the output format still comes from APEX_LOG_FORMAT.
    let logging = match cli.log_level {
        Some(level) => {
            let format = env::var("APEX_LOG_FORMAT")
                .ok()
                .and_then(|s| s.parse::<LogFormat>().ok())
                .unwrap_or(LogFormat::Pretty);
            init_logging_with_level(level, format)
        }
        None => init_logging(),
    };
    if let Err(e) = logging {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    if let Err(e) = run_command(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_command(cli: Cli) -> Result<()>
{
    match cli.command {
        Commands::Dump { binary } => {
            let surface = load_surface(&binary)?;
            render::print_structures(&surface.table);
            render::print_free_functions(&surface.table);
            Ok(())
        }
        Commands::Classes { binary } => {
            let surface = load_surface(&binary)?;
            render::print_structures(&surface.table);
            Ok(())
        }
        Commands::Functions { binary } => {
            let surface = load_surface(&binary)?;
            render::print_functions(&surface.table);
            Ok(())
        }
        Commands::Stats { binary } => {
            let surface = load_surface(&binary)?;
            render::print_stats(&surface);
            Ok(())
        }
    }
}

fn load_surface(binary: &str) -> Result<ApiSurface>
{
    info!("Reading debug info from {}", binary);
    let info = read_debug_info(binary)?;
    Ok(ApiSurface::build(&info))
}
