use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use docsight::commands::{self, OutputMode};
use docsight::config::{self, Environment, Overrides};
use docsight::InsightClient;

#[derive(Parser)]
#[command(name = "docsight")]
#[command(about = "Docsight - Document Insight Client\nUpload PDFs for AI-powered summaries and browse past analyses")]
#[command(version)]
struct Cli {
  /// Base URL of the analysis API (overrides config and DOCSIGHT_API_URL)
  #[arg(long, global = true)]
  api_url: Option<String>,

  /// Deployment to talk to when no explicit URL is given
  #[arg(long = "env", value_enum, global = true)]
  environment: Option<Environment>,

  /// Path to the YAML config file
  #[arg(long, env = "DOCSIGHT_CONFIG", global = true)]
  config: Option<PathBuf>,

  /// Print raw JSON instead of formatted output
  #[arg(long, global = true)]
  json: bool,

  /// Enable debug logging on stderr
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Upload a PDF and print its insight
  Upload {
    /// PDF file to analyse
    file: PathBuf,
  },
  /// List previously uploaded documents
  History,
  /// Show a stored insight in full
  Show {
    /// Document id as listed by `history`
    id: i64,
  },
  /// Check that the analysis API is reachable
  Ping,
  /// Check whether the API's AI summarizer is live
  ProbeAi,
}

fn init_logging(verbose: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if verbose {
      EnvFilter::new("docsight=debug,warn")
    } else {
      EnvFilter::new("docsight=warn,error")
    }
  });

  tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();
}

async fn run(cli: Cli) -> Result<()> {
  let overrides = Overrides { api_url: cli.api_url, environment: cli.environment };
  let client_config = config::resolve(cli.config.as_deref(), &overrides)?;
  tracing::debug!(base_url = %client_config.base_url, "resolved API address");

  let client = InsightClient::with_config(client_config)?;
  let output = if cli.json { OutputMode::Json } else { OutputMode::Pretty };

  match cli.command {
    Command::Upload { file } => commands::upload(client, &file, output).await,
    Command::History => commands::history(client, output).await,
    Command::Show { id } => commands::show(client, id, output).await,
    Command::Ping => commands::ping(client, output).await,
    Command::ProbeAi => commands::probe_ai(client, output).await,
  }
}

#[tokio::main]
async fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  if let Err(e) = run(cli).await {
    eprintln!("{} {:#}", "✗".red(), e);
    std::process::exit(1);
  }
}
