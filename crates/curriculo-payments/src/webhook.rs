//! Webhook Audit Log
//!
//! Mercado Pago notifications are appended to a human-readable log, one line
//! per delivery: `[<ISO-8601 timestamp>] <json body>`. Nothing reads the log
//! back; it is an audit trail, not a data store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::Result;

/// One received notification
#[derive(Clone, Debug)]
pub struct WebhookDelivery {
    pub received_at: DateTime<Utc>,
    pub body: String,
}

impl WebhookDelivery {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            received_at: Utc::now(),
            body: body.into(),
        }
    }

    /// Parsed body, if it is JSON
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// Notification topic (`type`, falling back to `topic`) and `action`
    pub fn summary(&self) -> WebhookSummary {
        let json = self.json();
        let field = |name: &str| {
            json.as_ref()
                .and_then(|v| v.get(name))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        WebhookSummary {
            kind: field("type").or_else(|| field("topic")),
            action: field("action"),
            data_id: json.as_ref().and_then(data_id_from_body),
        }
    }

    /// Log line, newline-terminated.
    ///
    /// One delivery is always one line: single-line JSON is written verbatim,
    /// multi-line JSON is compacted and anything else is written as a JSON string.
    pub fn log_line(&self) -> String {
        let timestamp = self.received_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        let raw = self.body.trim();

        let body = match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(_) if !raw.contains(['\n', '\r']) => raw.to_string(),
            Ok(value) => value.to_string(),
            Err(_) => serde_json::Value::String(self.body.clone()).to_string(),
        };

        format!("[{timestamp}] {body}\n")
    }
}

/// Fields worth logging from a notification
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WebhookSummary {
    pub kind: Option<String>,
    pub action: Option<String>,
    pub data_id: Option<String>,
}

/// `data.id` from a notification body; numbers are normalized to strings.
pub fn data_id_from_body(body: &serde_json::Value) -> Option<String> {
    match body.get("data")?.get("id")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Append-only sink for webhook deliveries
#[async_trait]
pub trait WebhookSink: Send + Sync {
    async fn record(&self, delivery: &WebhookDelivery) -> Result<()>;
}

/// File-backed webhook log with optional size-bounded rotation
pub struct FileWebhookLog {
    path: PathBuf,
    max_bytes: Option<u64>,
    write_lock: Mutex<()>,
}

impl FileWebhookLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_bytes: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Rotate to `<path>.1` before an append would exceed `max_bytes`.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rotated_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".1");
        PathBuf::from(name)
    }

    async fn rotate_if_needed(&self, incoming: u64) -> Result<()> {
        let Some(max_bytes) = self.max_bytes else {
            return Ok(());
        };

        let current = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        if current > 0 && current + incoming > max_bytes {
            let rotated = self.rotated_path();
            tokio::fs::rename(&self.path, &rotated).await?;
            tracing::info!(path = %rotated.display(), bytes = current, "Rotated webhook log");
        }

        Ok(())
    }
}

#[async_trait]
impl WebhookSink for FileWebhookLog {
    async fn record(&self, delivery: &WebhookDelivery) -> Result<()> {
        let line = delivery.log_line();
        let _guard = self.write_lock.lock().await;

        self.rotate_if_needed(line.len() as u64).await?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}
