use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use loglens_cli::{DEFAULT_CONFIG_FILE, OutputFormat, commands, load_config};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "loglens")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Build response-time reports from nginx access logs",
    long_about = "loglens finds the newest nginx-access-ui.log-YYYYMMDD[.gz] file in LOG_DIR, \
                  aggregates request times per URL and renders report-YYYY.MM.DD.html into REPORT_DIR. \
                  A log that already has a report is skipped."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (pretty, json, table)
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// JSON config file; without a value, ./default_config.json is used
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_CONFIG_FILE
    )]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report on the newest log file (default)
    Run,

    /// Print per-URL statistics for one log file without writing a report
    Stats {
        /// Path to the access log (plain or .gz)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of URLs to keep, slowest average first (defaults to REPORT_SIZE)
        #[arg(long)]
        top: Option<usize>,
    },

    /// Generate shell completion scripts
    #[command(long_about = "Generate shell completion scripts for loglens.\n\n\
        SUPPORTED SHELLS: bash, zsh, fish, powershell, elvish\n\n\
        INSTALLATION:\n  \
        bash: loglens completion --shell bash >> ~/.bashrc\n  \
        zsh:  loglens completion --shell zsh > ~/.zfunc/_loglens")]
    Completion {
        /// Target shell
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    if let Err(e) = init_logging(cli.verbose, config.log_filename.as_deref()) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::execute(&config, cli.format).map(|_| ()),
        Commands::Stats { file, top } => commands::stats::execute(&file, &config, top, cli.format),
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Exception occurred during execution: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    use std::fs::OpenOptions;
    use std::sync::Mutex;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt::time::ChronoLocal;

    let filter = if verbose {
        EnvFilter::new("loglens=debug,loglens_cli=debug,loglens_core=debug")
    } else {
        EnvFilter::new("loglens=info,loglens_cli=info,loglens_core=info")
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y.%m.%d %H:%M:%S".to_string()));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}
