//! DocuFlow CLI
//!
//! ```text
//! docuflow extract invoice.pdf --field invoice_number --field total
//! docuflow extract-url https://example.com/scan.png --content-type image/png
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use docuflow_cli::{
    encode_file, remote_document, Document, ExtractionOptions, HttpDocuflowApi, PollConfig,
    ProcessingStep, ProcessingSteps, Session, SessionOutcome, StepStatus,
};
use serde_json::{Map, Value};

#[derive(Parser)]
#[command(name = "docuflow")]
#[command(about = "Extract structured data from documents with DocuFlow")]
#[command(version)]
struct Cli {
    /// DocuFlow API base URL
    #[arg(long, global = true, default_value = "http://localhost:8080")]
    server: String,

    /// What the document is, to guide extraction
    #[arg(short, long, global = true)]
    description: Option<String>,

    /// Field to extract (repeatable); the model picks fields when none are given
    #[arg(short, long = "field", global = true)]
    fields: Vec<String>,

    /// Seconds between status checks
    #[arg(long, global = true, default_value_t = 2)]
    interval_secs: u64,

    /// Give up after this many seconds (0 waits indefinitely)
    #[arg(long, global = true, default_value_t = 300)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a local PDF, JPG, PNG, TIFF or WEBP file
    Extract {
        file: PathBuf,
    },

    /// Extract from a document the server downloads itself
    ExtractUrl {
        url: String,

        /// Media type of the remote document (e.g. application/pdf)
        #[arg(long)]
        content_type: String,
    },
}

impl Cli {
    fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(self.interval_secs.max(1)),
            max_wait: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr, and only when asked for
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), e);
            ExitCode::from(1)
        }
    }
}

/// Returns whether the extraction completed.
async fn run() -> Result<bool> {
    let cli = Cli::parse();
    let config = cli.poll_config();

    let document = match &cli.command {
        Commands::Extract { file } => encode_file(file).await?,
        Commands::ExtractUrl { url, content_type } => remote_document(url, content_type)?,
    };
    let options = ExtractionOptions {
        description: cli.description.clone(),
        fields: cli.fields.clone(),
    };

    print_header(&document, &cli.server);

    let api = Arc::new(HttpDocuflowApi::new(cli.server.clone()));
    let mut session = Session::new(api, config);
    let mut renderer = StepRenderer::default();
    let mut on_change = |steps: &ProcessingSteps| renderer.render(steps);

    let finished = tokio::select! {
        outcome = session.run(document, options, &mut on_change) => Some(outcome),
        _ = tokio::signal::ctrl_c() => None,
    };
    let outcome = finished.unwrap_or_else(|| {
        session.cancel();
        SessionOutcome::Cancelled
    });

    println!();
    match outcome {
        SessionOutcome::Completed { extracted } => {
            print_extracted(&extracted);
            Ok(true)
        }
        SessionOutcome::Failed { step, message } => {
            println!(
                "{} {} ({})",
                "✗ Extraction failed:".bright_red().bold(),
                message,
                step.name()
            );
            Ok(false)
        }
        SessionOutcome::Cancelled => {
            println!("{}", "Cancelled.".bright_yellow());
            Ok(false)
        }
    }
}

fn print_header(document: &Document, server: &str) {
    println!(
        "{} {}",
        "📄 DocuFlow".bright_cyan().bold(),
        document.file_name().bold()
    );
    println!("{}", format!("   via {}", server).dimmed());
    println!();
}

/// Prints a line whenever a step's status or details change.
#[derive(Default)]
struct StepRenderer {
    last: Option<ProcessingSteps>,
}

impl StepRenderer {
    fn render(&mut self, steps: &ProcessingSteps) {
        for step in steps.iter() {
            let unchanged = self
                .last
                .as_ref()
                .map(|last| last.get(step.id) == step)
                .unwrap_or(false);
            if !unchanged && step.status != StepStatus::Pending {
                print_step(step);
            }
        }
        self.last = Some(steps.clone());
    }
}

fn print_step(step: &ProcessingStep) {
    let marker = match step.status {
        StepStatus::Pending => "○".dimmed(),
        StepStatus::InProgress => "●".bright_yellow(),
        StepStatus::Completed => "✓".bright_green(),
        StepStatus::Failed => "✗".bright_red(),
    };
    let details = step.details.as_deref().unwrap_or(step.id.description());
    println!("{} {} {}", marker, format!("{:<20}", step.id.name()).bold(), details);
}

fn print_extracted(extracted: &Map<String, Value>) {
    if extracted.is_empty() {
        println!("{}", "No specific fields were extracted by AI.".bright_yellow());
        return;
    }

    println!("{}", "Extracted data".bright_green().bold());
    let width = extracted.keys().map(|k| k.len()).max().unwrap_or(0);
    for (key, value) in extracted {
        let value = match value {
            Value::String(s) => s.clone(),
            Value::Null => "null".dimmed().to_string(),
            other => other.to_string(),
        };
        println!("  {}  {}", format!("{:<width$}", key, width = width).cyan(), value);
    }
}
