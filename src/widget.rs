//! The upload widget: one staged file, one display text.
//!
//! Uploads may overlap. Each submit snapshots the staged file when it starts
//! and the display takes whichever successful response lands last. State
//! locks are never held across an `.await`.

use crate::config::{FailureMode, WidgetConfig};
use crate::error::UploadError;
use crate::file::SelectedFile;
use crate::transport::{HttpTransport, UploadTransport};
use serde_json::Value;
use std::fmt::Write as _;
use std::sync::RwLock;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

// Largest integer an f64 holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Result of a single `submit_upload` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Nothing was staged; no request was made.
    Skipped,
    /// The endpoint answered 2xx; `display` is the pretty-printed body.
    Uploaded { display: String },
    /// Network error or non-2xx status.
    Failed { reason: String },
}

#[derive(Debug, Default)]
struct WidgetState {
    selected: Option<SelectedFile>,
    response_text: String,
    last_failure: Option<String>,
}

pub struct UploadWidget<T = HttpTransport> {
    transport: T,
    failure_mode: FailureMode,
    state: RwLock<WidgetState>,
}

impl UploadWidget<HttpTransport> {
    pub fn from_config(config: &WidgetConfig) -> Self {
        let transport = HttpTransport::new(reqwest::Client::new(), config.endpoint_url.clone());
        Self::new(transport, config.failure_mode)
    }
}

impl<T: UploadTransport> UploadWidget<T> {
    pub fn new(transport: T, failure_mode: FailureMode) -> Self {
        Self {
            transport,
            failure_mode,
            state: RwLock::new(WidgetState::default()),
        }
    }

    /// Stage a file, replacing any earlier selection.
    pub fn select_file(&self, file: SelectedFile) {
        info!("Selected {} ({} bytes, {})", file.filename(), file.size(), file.mime());
        self.state.write().unwrap().selected = Some(file);
    }

    /// Upload the staged file and update the display on success.
    ///
    /// Without a staged file this is a no-op. Failures are logged and leave
    /// the display text untouched.
    pub async fn submit_upload(&self) -> UploadOutcome {
        let selected = self.state.read().unwrap().selected.clone();
        let Some(file) = selected else {
            debug!("Upload requested with no file selected");
            return UploadOutcome::Skipped;
        };

        let span = info_span!("upload", attempt = %Uuid::new_v4(), filename = %file.filename());

        async move {
            let result = match self.transport.post_document(&file).await {
                Ok(value) => pretty_json(value),
                Err(e) => Err(e),
            };

            match result {
                Ok(text) => {
                    {
                        let mut state = self.state.write().unwrap();
                        state.response_text = text.clone();
                        state.last_failure = None;
                    }
                    info!("Upload complete ({} chars of JSON)", text.len());
                    UploadOutcome::Uploaded { display: text }
                }
                Err(e) => self.record_failure(e),
            }
        }
        .instrument(span)
        .await
    }

    fn record_failure(&self, err: UploadError) -> UploadOutcome {
        error!("Upload failed: {}", err);
        let reason = err.to_string();
        if self.failure_mode == FailureMode::Report {
            self.state.write().unwrap().last_failure = Some(reason.clone());
        }
        UploadOutcome::Failed { reason }
    }

    /// Pretty-printed body of the latest successful upload, empty before the first.
    pub fn response_text(&self) -> String {
        self.state.read().unwrap().response_text.clone()
    }

    pub fn selected_file(&self) -> Option<SelectedFile> {
        self.state.read().unwrap().selected.clone()
    }

    /// Reason of the latest failure. Only kept in `FailureMode::Report`.
    pub fn last_failure(&self) -> Option<String> {
        self.state.read().unwrap().last_failure.clone()
    }

    /// Text rendering of the widget.
    pub fn render(&self) -> String {
        let state = self.state.read().unwrap();
        let mut out = String::from("Document Capture\n================\n");

        match &state.selected {
            Some(file) => {
                let _ = writeln!(
                    out,
                    "File: {} ({}, {} bytes)",
                    file.filename(),
                    file.mime(),
                    file.size()
                );
            }
            None => out.push_str("File: (none selected)\n"),
        }

        if let Some(reason) = &state.last_failure {
            let _ = writeln!(out, "Upload failed: {}", reason);
        }

        out.push_str("----------------\n");
        out.push_str(&state.response_text);
        if !state.response_text.is_empty() {
            out.push('\n');
        }
        out
    }
}

/// Render a response body with 2-space indentation, keeping key order.
/// Integral floats print without a fraction (`2.0` becomes `2`).
fn pretty_json(mut value: Value) -> Result<String, UploadError> {
    integral_floats_to_ints(&mut value);
    Ok(serde_json::to_string_pretty(&value)?)
}

fn integral_floats_to_ints(value: &mut Value) {
    match value {
        Value::Number(n) if n.is_f64() => {
            if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
                    *value = Value::from(f as i64);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(integral_floats_to_ints),
        Value::Object(map) => map.values_mut().for_each(integral_floats_to_ints),
        _ => {}
    }
}
