//! doc-capture - upload a document to the reader endpoint and show the JSON it returns.

mod config;
mod error;
mod file;
mod session;
mod transport;
mod widget;

use clap::{Parser, Subcommand};
use config::{EndpointPreset, FailureMode, WidgetConfig};
use file::SelectedFile;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use widget::{UploadOutcome, UploadWidget};

#[derive(Parser)]
#[command(name = "doc-capture", version, about)]
struct Cli {
    /// Upload URL; overrides --preset
    #[arg(long, env = "DOC_CAPTURE_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// Known endpoint to use when no URL is given
    #[arg(long, env = "DOC_CAPTURE_PRESET", value_enum, default_value_t = EndpointPreset::Hosted, global = true)]
    preset: EndpointPreset,

    /// Whether failures are shown or only logged
    #[arg(long, env = "DOC_CAPTURE_FAILURE_MODE", value_enum, default_value_t = FailureMode::Silent, global = true)]
    failure_mode: FailureMode,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Upload one file and print the response
    Upload { file: PathBuf },
    /// Line-driven session (default)
    Interactive,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the widget
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "doc_capture=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = WidgetConfig::resolve(cli.endpoint.as_deref(), cli.preset, cli.failure_mode)?;
    let widget = Arc::new(UploadWidget::from_config(&config));

    match cli.command.unwrap_or(Mode::Interactive) {
        Mode::Upload { file } => {
            let file = SelectedFile::from_path(&file).await?;
            widget.select_file(file);

            match widget.submit_upload().await {
                UploadOutcome::Failed { reason } if config.failure_mode == FailureMode::Report => {
                    anyhow::bail!("Upload failed: {}", reason);
                }
                _ => println!("{}", widget.response_text()),
            }
        }
        Mode::Interactive => {
            info!("Interactive session started");
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            session::run(widget, stdin).await?;
        }
    }

    Ok(())
}
