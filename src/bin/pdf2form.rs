//! CLI binary for pdf2form.
//!
//! A thin shim over the library crate that maps CLI flags to `AgentConfig`,
//! prints results, and keeps fatal errors human-readable: one error line on
//! stderr and a nonzero exit, never an unhandled panic.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pdf2form::{extract_form, extract_to_file, AgentConfig, ConversationSession, FormData};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract a form and print the structured result
  pdf2form extract application.pdf

  # Extract and persist for later conversations
  pdf2form extract application.pdf -o form_output.json

  # Use a different region
  pdf2form extract application.pdf -r eu-west-1 -o form_output.json

  # Chat about previously extracted data (type 'exit' to quit)
  pdf2form chat form_output.json

  # Cap the transcript for long sessions (opt-in; changes prompt replay)
  pdf2form chat form_output.json --max-turns 20

ENVIRONMENT VARIABLES:
  AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY / AWS_PROFILE
                        Standard AWS credential chain for Bedrock
  PDF2FORM_REGION       Override the default region (us-east-1)
  PDF2FORM_MODEL        Override the Bedrock model id

SETUP:
  1. Enable the model in the AWS Bedrock console for your region.
  2. Configure credentials:  aws configure
  3. Extract:                pdf2form extract application.pdf -o form_output.json
  4. Chat:                   pdf2form chat form_output.json
"#;

/// Extract structured data from PDF forms and chat about the result.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2form",
    version,
    about = "Extract structured data from PDF forms using AWS Bedrock",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF2FORM_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF2FORM_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract form fields from a PDF into structured JSON.
    Extract {
        /// Path to the PDF form file.
        pdf_path: PathBuf,

        /// Output JSON file path. Without it, the result prints to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// AWS region for the Bedrock endpoint.
        #[arg(short, long, env = "PDF2FORM_REGION", default_value = pdf2form::DEFAULT_REGION)]
        region: String,

        /// Bedrock model identifier.
        #[arg(long, env = "PDF2FORM_MODEL", default_value = pdf2form::DEFAULT_MODEL_ID)]
        model: String,
    },

    /// Ask questions about previously extracted form data.
    Chat {
        /// Path to the JSON file produced by `pdf2form extract -o`.
        #[arg(default_value = "form_output.json")]
        form_path: PathBuf,

        /// AWS region for the Bedrock endpoint.
        #[arg(short, long, env = "PDF2FORM_REGION", default_value = pdf2form::DEFAULT_REGION)]
        region: String,

        /// Bedrock model identifier.
        #[arg(long, env = "PDF2FORM_MODEL", default_value = pdf2form::DEFAULT_MODEL_ID)]
        model: String,

        /// Keep at most this many user/assistant turns in the transcript,
        /// evicting the oldest. Unset = unbounded (full history re-sent
        /// on every exchange).
        #[arg(long)]
        max_turns: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Default to warnings only: info-level library logs would interleave
    // with the interactive chat output.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Extract {
            pdf_path,
            output,
            region,
            model,
        } => run_extract(pdf_path, output, region, model).await,
        Command::Chat {
            form_path,
            region,
            model,
            max_turns,
        } => run_chat(form_path, region, model, max_turns).await,
    }
}

/// Print a fatal error and end the process without an unhandled fault.
fn fatal(err: impl std::fmt::Display) -> ! {
    eprintln!("Error: {err}");
    std::process::exit(1);
}

fn build_config(region: String, model: String, max_turns: Option<usize>) -> AgentConfig {
    let mut builder = AgentConfig::builder().region(region).model_id(model);
    if let Some(n) = max_turns {
        builder = builder.max_turns(n);
    }
    match builder.build() {
        Ok(config) => config,
        Err(e) => fatal(e),
    }
}

async fn run_extract(
    pdf_path: PathBuf,
    output: Option<PathBuf>,
    region: String,
    model: String,
) -> Result<()> {
    let config = build_config(region, model, None);

    match output {
        Some(output_path) => {
            if let Err(e) = extract_to_file(&pdf_path, &output_path, &config).await {
                fatal(e);
            }
            println!("Results saved to {}", output_path.display());
        }
        None => match extract_form(&pdf_path, &config).await {
            Ok(form) => {
                println!("Extracted Form Data:");
                println!(
                    "{}",
                    serde_json::to_string_pretty(&form)
                        .context("Failed to serialise form data")?
                );
            }
            Err(e) => fatal(e),
        },
    }

    Ok(())
}

async fn run_chat(
    form_path: PathBuf,
    region: String,
    model: String,
    max_turns: Option<usize>,
) -> Result<()> {
    let config = build_config(region, model, max_turns);

    let form = match FormData::load(&form_path) {
        Ok(form) => form,
        Err(e) => fatal(e),
    };

    let mut session = ConversationSession::start(&form, &config).await;

    println!("Form Conversation Agent");
    println!("Type 'exit' to end the conversation");
    println!("{}", "-".repeat(50));

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("\nYou: ");
        io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next() else {
            // EOF (piped input exhausted or ^D).
            println!();
            break;
        };
        let user_input = line.context("Failed to read from stdin")?.trim().to_string();

        if user_input.is_empty() {
            continue;
        }
        if user_input.eq_ignore_ascii_case("exit") {
            println!("\nGoodbye!");
            break;
        }

        // Transport failures are absorbed: the loop keeps going and the
        // failed question stays in the transcript as context.
        match session.ask(&user_input).await {
            Ok(response) => println!("\nAssistant: {response}"),
            Err(e) => println!("\nAssistant: Error processing your request: {e}"),
        }
    }

    Ok(())
}
