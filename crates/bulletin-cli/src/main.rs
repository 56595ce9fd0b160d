//! Command-line front end for the bulletin authoring engine.
//!
//! Usage:
//!   bulletin compose --file bsv.md --prompt "Rédige une synthèse météo."
//!   bulletin compose --file bsv.md --prompt "..." --replace
//!   bulletin prompts
//!   bulletin render --file bsv.md
//!
//! `compose` loads the file (if any), runs one submission through the
//! prompt controller, and writes the document back on success. The
//! endpoint comes from `BULLETIN_CHAT_URL` unless `--endpoint` overrides
//! it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use bulletin_ai::{EndpointConfig, GradioChatClient, SharedChatClient};
use bulletin_doc::{SharedDocument, shared_document};
use bulletin_editor::{ApplyMode, ControllerOptions, PromptController, SubmitOutcome, prompts};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "bulletin")]
#[command(about = "AI-assisted authoring for plant-health bulletins", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one prompt against a bulletin file and write the result back.
    Compose {
        /// Markdown file to compose into (created if missing).
        #[arg(long)]
        file: PathBuf,

        /// Prompt to submit.
        #[arg(long)]
        prompt: String,

        /// Rebuild the document from a one-shot answer instead of
        /// streaming onto the end.
        #[arg(long)]
        replace: bool,

        /// Endpoint base URL (overrides BULLETIN_CHAT_URL).
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// List the example prompts.
    Prompts,

    /// Parse a bulletin file and print its canonical markdown.
    Render {
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Compose {
            file,
            prompt,
            replace,
            endpoint,
        } => compose(&file, &prompt, replace, endpoint).await,
        Command::Prompts => {
            for (index, prompt) in prompts::EXAMPLE_PROMPTS.iter().enumerate() {
                println!("{}. {}", index + 1, prompt);
            }
            Ok(())
        }
        Command::Render { file } => {
            print!("{}", render_file(&file)?);
            Ok(())
        }
    }
}

async fn compose(file: &Path, prompt: &str, replace: bool, endpoint: Option<String>) -> Result<()> {
    let config = match endpoint {
        Some(url) => EndpointConfig::new(url),
        None => EndpointConfig::from_env().context("resolving chat endpoint")?,
    };
    let client: SharedChatClient = Arc::new(GradioChatClient::new(config)?);

    let document = load_file(file)?;
    let mode = if replace {
        ApplyMode::Replace
    } else {
        ApplyMode::Append
    };
    let controller = PromptController::with_options(
        document.clone(),
        client,
        ControllerOptions::default().with_mode(mode),
    );
    let mut notices = controller.subscribe_notices();

    controller.set_prompt(prompt);
    match controller.submit() {
        SubmitOutcome::Started(request) => {
            tracing::info!(request = %request.short(), mode = %mode, "submission started");
        }
        SubmitOutcome::EmptyPrompt => bail!("prompt is empty"),
        SubmitOutcome::Busy => bail!("another submission is in flight"),
    }
    controller.wait_idle().await;

    while let Ok(notice) = notices.try_recv() {
        if notice.is_error() {
            bail!("submission failed: {}", notice.message);
        }
        eprintln!("{}", notice.message);
    }

    std::fs::write(file, document.to_markdown())
        .with_context(|| format!("writing {}", file.display()))?;
    println!("{}", file.display());
    Ok(())
}

fn load_file(path: &Path) -> Result<SharedDocument> {
    let document = shared_document();
    if path.exists() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        document.load_markdown(&text)?;
    }
    Ok(document)
}

fn render_file(path: &Path) -> Result<String> {
    let document = load_file(path)?;
    Ok(document.to_markdown())
}
