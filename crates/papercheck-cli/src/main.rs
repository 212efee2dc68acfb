use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use papercheck_core::Config;
use papercheck_pdf_mupdf::MupdfBackend;
use papercheck_scoring::{ChatClient, CorrectionServiceClient};

mod output;

use output::ColorMode;

/// Academic paper checks: structure validation and quality scoring
#[derive(Parser, Debug)]
#[command(name = "papercheck", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a PDF looks like an academic paper
    Validate {
        /// Path to the PDF to check
        file_path: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Score grammar, style, and structure for one dataset row
    Report {
        /// JSON Lines file with `abstract` and `text` fields
        #[arg(long)]
        dataset: PathBuf,

        /// Row to score (0-based)
        #[arg(long, default_value_t = 0)]
        row: usize,

        /// Base URL of the grammar correction service
        #[arg(long)]
        grammar_url: Option<String>,

        /// Chat model for style and structure scoring
        #[arg(long)]
        model: Option<String>,

        /// Print the scores as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Validate {
            file_path,
            json,
            no_color,
        } => validate(file_path, json, ColorMode(!no_color)),
        Command::Report {
            dataset,
            row,
            grammar_url,
            model,
            json,
            no_color,
        } => {
            report(dataset, row, grammar_url, model, json, ColorMode(!no_color)).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Logs go to stderr so stdout stays parseable with `--json`.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,papercheck_scoring=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn validate(file_path: PathBuf, json: bool, color: ColorMode) -> anyhow::Result<ExitCode> {
    let result = papercheck_core::validate_path(&file_path, &MupdfBackend::new());

    let mut stdout = std::io::stdout().lock();
    if json {
        serde_json::to_writer(&mut stdout, &result)?;
        writeln!(stdout)?;
    } else {
        output::print_validation(&mut stdout, &file_path.display().to_string(), &result, color)?;
    }

    Ok(if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn report(
    dataset: PathBuf,
    row: usize,
    grammar_url: Option<String>,
    model: Option<String>,
    json: bool,
    color: ColorMode,
) -> anyhow::Result<()> {
    // CLI flags > env vars > config file > defaults
    let config = Config::load();
    let http = reqwest::Client::new();

    let corrector = match grammar_url {
        Some(url) => CorrectionServiceClient::new(http.clone(), &url),
        None => CorrectionServiceClient::from_config(http.clone(), &config.scoring),
    };
    let mut chat = ChatClient::from_config(http, &config.scoring);
    if let Some(model) = model {
        chat = chat.with_model(&model);
    }

    let record = papercheck_scoring::load_record(&dataset, row)
        .with_context(|| format!("failed to load row {row} of {}", dataset.display()))?;

    let mut stdout = std::io::stdout();
    if !json {
        output::print_step(&mut stdout, "Starting paper analysis...", color)?;
    }

    let started = Instant::now();
    let report = papercheck_scoring::score_paper(&record, &corrector, &chat).await?;
    let elapsed = started.elapsed();

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        output::print_report(&mut stdout, &report, elapsed, color)?;
    }
    Ok(())
}
