mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{check, compile, render, CheckArgs, CompileArgs, RenderArgs};
use tracing_subscriber::EnvFilter;

/// jsonui - compile and render JSON UI templates
#[derive(Parser, Debug)]
#[command(name = "jsonui")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log compilation and render details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a template and print its element tree
    Compile(CompileArgs),

    /// Compile every template in the template directory and check component cycles
    Check(CheckArgs),

    /// Render a template against a JSON context
    Render(RenderArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Compile(args) => compile(args, &cwd),
                Command::Check(args) => check(args, &cwd),
                Command::Render(args) => render(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
