//! Subval CLI - validate telecom subscriber CSV files
//!
//! # Commands
//!
//! ```bash
//! subval input.csv ACME                 # Full validation run into ./ACME/
//! subval input.csv ACME --output-root out
//! subval headers input.csv              # Header pre-check only
//! subval serve --port 3000              # Start the dashboard API
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use subval::api::logs::{log_error, log_info, log_success, log_warning};
use subval::{parse_csv_file_auto, precheck_headers, run_validation, RunOptions, Settings};

#[derive(Parser)]
#[command(name = "subval")]
#[command(about = "Validate telecom subscriber CSV files", long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input CSV file
    #[arg(required = true)]
    input: Option<PathBuf>,

    /// Company identifier, names the output directory
    #[arg(required = true)]
    company_id: Option<String>,

    /// Directory that holds the company output directories
    #[arg(long)]
    output_root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the header row of a CSV file without running the rules
    Headers {
        /// Input CSV file
        input: PathBuf,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory that holds the company output directories
        #[arg(long)]
        output_root: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let settings = Settings::from_env();
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Headers { input }) => cmd_headers(&input),

        Some(Commands::Serve { port, output_root }) => {
            cmd_serve(settings.with_port(port).with_output_root(output_root)).await
        }

        None => match (cli.input, cli.company_id) {
            (Some(input), Some(company_id)) => {
                let settings = settings.with_output_root(cli.output_root);
                cmd_run(&input, &company_id, &RunOptions::from(&settings))
            }
            _ => Err("an input file and a company identifier are required".into()),
        },
    };

    if let Err(e) = result {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn cmd_run(input: &Path, company_id: &str, options: &RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = run_validation(input, company_id, options)?;

    if outcome.summary.findings > 0 {
        log_warning(format!(
            "{} findings written to {}",
            outcome.summary.findings,
            outcome.summary.artifacts.errors.display()
        ));
    }
    log_success(format!("Output in {}", outcome.summary.artifacts.dir.display()));
    Ok(())
}

fn cmd_headers(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    log_info(format!("🔎 Checking headers: {}", input.display()));

    let parsed = parse_csv_file_auto(input)?;
    let issues = precheck_headers(&parsed.headers);

    if issues.is_empty() {
        log_success("All headers are correct");
        return Ok(());
    }

    for issue in &issues {
        log_warning(format!("{:<28} {}", issue.issue, issue.message));
    }
    Err(format!("{} header issues found", issues.len()).into())
}

async fn cmd_serve(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    subval::server::start_server(settings).await
}
