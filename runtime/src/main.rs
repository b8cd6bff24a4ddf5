// Copyright 2026 Brand Audit Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use brand_audit_runtime::cli;

#[derive(Parser)]
#[command(
    name = "brandaudit",
    about = "Brand Audit — score a website's brand presence and track it over time",
    version,
    after_help = "Run 'brandaudit <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a website and save the result
    Audit {
        /// URL or bare domain (e.g. "acme.com")
        url: String,
        /// Skip fetching and the model; score from the domain alone
        #[arg(long)]
        synthetic: bool,
        /// Do not save the audit
        #[arg(long)]
        no_save: bool,
        /// Whole-audit time budget in milliseconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Compare two or three saved audits, in the order given
    Compare {
        /// Audit ids
        #[arg(num_args = 2..=3, required = true)]
        ids: Vec<String>,
    },
    /// Compare the latest saved audits of a URL
    History {
        /// URL or bare domain
        url: String,
    },
    /// Show a saved audit
    Show {
        /// Audit id
        id: String,
    },
    /// List recent audits
    List {
        /// Maximum number of audits to list
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Check configuration and diagnose issues
    Doctor,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("BRANDAUDIT_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("BRANDAUDIT_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("BRANDAUDIT_VERBOSE", "1");
    }

    let default_level = if cli.verbose {
        "brand_audit=debug,brand_audit_runtime=debug"
    } else {
        "brand_audit=info,brand_audit_runtime=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Audit {
            url,
            synthetic,
            no_save,
            timeout,
        } => cli::audit_cmd::run(&url, synthetic, no_save, timeout).await,
        Commands::Compare { ids } => cli::compare_cmd::run(&ids).await,
        Commands::History { url } => cli::history_cmd::run(&url).await,
        Commands::Show { id } => cli::show_cmd::run(&id).await,
        Commands::List { limit } => cli::list_cmd::run(limit).await,
        Commands::Doctor => cli::doctor::run().await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "brandaudit", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        } else if !cli::output::is_quiet() {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
