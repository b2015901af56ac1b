//! Interactive line-driven front end for the widget.
//!
//! Uploads are spawned, so the prompt keeps accepting commands while a
//! request is in flight and several uploads can overlap. Uploads still in
//! flight when input ends are awaited before returning.

use crate::file::SelectedFile;
use crate::transport::UploadTransport;
use crate::widget::{UploadOutcome, UploadWidget};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tracing::{debug, warn};

const HELP: &str = "\
Commands:
  select <path>   stage a file for upload
  upload          send the staged file
  show            print the widget
  help            this text
  quit            leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select(PathBuf),
    Upload,
    Show,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "select" | "open" => {
                if rest.is_empty() {
                    anyhow::bail!("select needs a file path");
                }
                Self::Select(PathBuf::from(rest))
            }
            "upload" | "submit" => Self::Upload,
            "show" => Self::Show,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => anyhow::bail!("Unknown command: {} (try `help`)", other),
        };

        Ok(Some(command))
    }
}

/// Drive the widget from `input` until `quit` or end of input.
pub async fn run<T, R>(widget: Arc<UploadWidget<T>>, input: R) -> Result<()>
where
    T: UploadTransport + 'static,
    R: AsyncBufRead + Unpin,
{
    println!("{}", HELP);
    let mut lines = input.lines();
    let mut uploads = JoinSet::new();

    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match command {
            Command::Select(path) => match SelectedFile::from_path(&path).await {
                Ok(file) => {
                    widget.select_file(file);
                    if let Some(staged) = widget.selected_file() {
                        println!("Staged {}", staged.filename());
                    }
                }
                Err(e) => {
                    warn!("{:#}", e);
                    println!("Cannot open {}", path.display());
                }
            },
            Command::Upload => {
                let widget = widget.clone();
                uploads.spawn(async move {
                    match widget.submit_upload().await {
                        UploadOutcome::Uploaded { .. } => print!("{}", widget.render()),
                        UploadOutcome::Failed { .. } if widget.last_failure().is_some() => {
                            print!("{}", widget.render())
                        }
                        _ => {}
                    }
                });
            }
            Command::Show => print!("{}", widget.render()),
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }

    if !uploads.is_empty() {
        debug!("Waiting for {} upload(s) in flight", uploads.len());
    }
    while let Some(joined) = uploads.join_next().await {
        if let Err(e) = joined {
            warn!("Upload task ended abnormally: {}", e);
        }
    }

    Ok(())
}
