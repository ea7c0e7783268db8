use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use lpkit_cli::{RunRequest, production_model, render_json, render_text};
use lpkit_solver::{Backend, SolveOptions};
use tracing::info;

#[derive(Parser)]
#[command(name = "lpkit")]
#[command(
    about = "Build linear programs and solve them with a pluggable backend",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the production model and report the result
    Solve {
        /// JSON solver config (gap-tolerance, time-limit-seconds)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Solver backend (simplex, scip)
        #[arg(short, long, default_value = "simplex")]
        solver: Backend,
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// List the variables and constraints of the production model
    Describe,
    /// Check a solver config file for errors
    CheckConfig {
        /// The file to check
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve { config, solver, format } => {
            info!("lpkit v{} using {}", env!("CARGO_PKG_VERSION"), solver);
            let request = RunRequest { config, backend: solver };
            let outcome = match lpkit_cli::run(&request, production_model) {
                Ok(o) => o,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            };

            let mut stdout = io::stdout().lock();
            let rendered = if format == "json" {
                render_json(&outcome.model, &outcome.solution, &mut stdout).map_err(io::Error::from)
            } else {
                render_text(&outcome.model, &outcome.solution, &mut stdout)
            };
            if let Err(e) = rendered {
                eprintln!("Error writing report: {}", e);
                process::exit(1);
            }
        }
        Commands::Describe => {
            let model = match production_model() {
                Ok(m) => m,
                Err(e) => {
                    eprintln!("Model error: {}", e);
                    process::exit(1);
                }
            };

            println!("Objective: {} {}", model.objective().sense(), model.objective().expression());
            println!();
            println!("Variables:");
            for variable in model.variables() {
                let domain = variable.domain();
                println!(
                    "  {} in [{}, {})",
                    variable.id(),
                    domain.lower_bound(),
                    domain.upper_bound()
                );
            }
            println!();
            println!("Constraints:");
            for constraint in model.constraints() {
                println!("  {}", constraint);
            }
        }
        Commands::CheckConfig { file } => match SolveOptions::from_path(&file) {
            Ok(options) => {
                println!("✓ {} is valid", file.display());
                if options.is_empty() {
                    println!("  no options set; backend defaults apply");
                }
                for (option, value) in options.iter() {
                    println!("  {} = {}", option, value);
                }
            }
            Err(e) => {
                eprintln!("✗ {} has errors:", file.display());
                eprintln!("  {}", e);
                process::exit(1);
            }
        },
    }
}
