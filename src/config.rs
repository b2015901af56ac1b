//! Widget configuration.
//!
//! The endpoint is chosen at startup from a preset or an explicit URL, never
//! hardcoded at the call site. Values arrive from CLI flags, which fall back
//! to `DOC_CAPTURE_*` environment variables (a `.env` file is honored).

use anyhow::{Context, Result};
use clap::ValueEnum;
use reqwest::Url;
use std::fmt;
use tracing::info;

/// Multipart field name the endpoint reads the file from.
pub const DOCUMENT_FIELD: &str = "document";

const HOSTED_ENDPOINT: &str = "https://license-or-document-reader-react-app.onrender.com/upload";
const LOCAL_ENDPOINT: &str = "http://localhost:5000/upload";

/// Known deployments of the document reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EndpointPreset {
    #[default]
    Hosted,
    Local,
}

impl EndpointPreset {
    pub fn url(self) -> &'static str {
        match self {
            Self::Hosted => HOSTED_ENDPOINT,
            Self::Local => LOCAL_ENDPOINT,
        }
    }
}

/// What the widget does with a failed upload besides logging it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FailureMode {
    /// Log only; the rendered widget shows nothing.
    #[default]
    Silent,
    /// Log and keep the reason so the widget renders it.
    Report,
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Silent => f.write_str("silent"),
            Self::Report => f.write_str("report"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub endpoint_url: Url,
    pub failure_mode: FailureMode,
}

impl WidgetConfig {
    /// Resolve the endpoint. An explicit URL wins over the preset.
    pub fn resolve(
        endpoint: Option<&str>,
        preset: EndpointPreset,
        failure_mode: FailureMode,
    ) -> Result<Self> {
        let raw = match endpoint.map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ => preset.url(),
        };

        let endpoint_url =
            Url::parse(raw).with_context(|| format!("Invalid endpoint URL: {}", raw))?;

        if !matches!(endpoint_url.scheme(), "http" | "https") {
            anyhow::bail!("Endpoint must be http or https, got: {}", endpoint_url);
        }

        info!("Upload endpoint: {} (failure mode: {})", endpoint_url, failure_mode);

        Ok(Self {
            endpoint_url,
            failure_mode,
        })
    }
}
