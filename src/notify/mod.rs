pub mod email;
pub mod template;
pub mod webhook;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinSet;

use crate::config::NotifyConfig;
use crate::storage::StoredReport;
use crate::submission::Submission;

/// What a notifier gets to see about a freshly stored report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportContext {
    pub package_name: String,
    pub package_version: String,
    pub phone_model: Option<String>,
    pub android_version: Option<String>,
    pub filename: String,
    pub received_at: DateTime<Utc>,
    pub stacktrace: String,
}

impl ReportContext {
    pub fn new(submission: Submission, report: &StoredReport) -> Self {
        Self {
            package_name: submission.package_name,
            package_version: submission.package_version,
            phone_model: submission.phone_model,
            android_version: submission.android_version,
            filename: report.filename.clone(),
            received_at: DateTime::from_timestamp(report.timestamp, 0).unwrap_or_else(Utc::now),
            // Mail bodies and JSON need text; the file on disk keeps the bytes.
            stacktrace: crate::submission::into_text(submission.stacktrace),
        }
    }
}

#[derive(Debug)]
pub struct NotifyError {
    pub message: String,
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<String> for NotifyError {
    fn from(s: String) -> Self {
        NotifyError { message: s }
    }
}

impl From<&str> for NotifyError {
    fn from(s: &str) -> Self {
        NotifyError {
            message: s.to_string(),
        }
    }
}

/// Something to tell about each new crash report.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn id(&self) -> &str;
    async fn notify(&self, ctx: &ReportContext) -> Result<(), NotifyError>;
}

/// Clones share the same in-flight task set.
#[derive(Clone, Default)]
pub struct NotifierRegistry {
    notifiers: Vec<Arc<dyn Notifier>>,
    in_flight: Arc<Mutex<JoinSet<()>>>,
}

impl NotifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a notifier for every channel that is fully configured.
    /// A channel that fails to initialise is skipped with a warning.
    pub fn from_config(config: &NotifyConfig) -> Self {
        let mut registry = Self::new();

        if let Some(smtp) = &config.smtp {
            match email::EmailNotifier::new(smtp) {
                Ok(notifier) => {
                    tracing::info!("E-mail notifications enabled for {}", smtp.to);
                    registry.register(Arc::new(notifier));
                }
                Err(e) => tracing::warn!("E-mail notifications not available: {e}"),
            }
        }

        if let Some(url) = &config.webhook_url {
            match webhook::WebhookNotifier::new(url) {
                Ok(notifier) => {
                    tracing::info!("Webhook notifications enabled");
                    registry.register(Arc::new(notifier));
                }
                Err(e) => tracing::warn!("Webhook notifications not available: {e}"),
            }
        }

        registry
    }

    pub fn register(&mut self, notifier: Arc<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Runs every notifier in sequence, logging failures.
    pub async fn notify_all(&self, ctx: &ReportContext) {
        for notifier in &self.notifiers {
            if let Err(e) = notifier.notify(ctx).await {
                tracing::error!("Notifier {} failed for {}: {e}", notifier.id(), ctx.filename);
            }
        }
    }

    /// Fires notifications in the background; the caller never waits on them.
    pub fn dispatch(&self, ctx: ReportContext) {
        if self.is_empty() {
            return;
        }
        let registry = self.clone();
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        // Reap finished tasks so the set only holds running ones.
        while in_flight.try_join_next().is_some() {}
        in_flight.spawn(async move {
            registry.notify_all(&ctx).await;
        });
    }

    /// Waits up to `grace` for dispatched notifications, then aborts the rest.
    pub async fn drain(&self, grace: Duration) {
        let mut tasks = std::mem::take(
            &mut *self.in_flight.lock().unwrap_or_else(|e| e.into_inner()),
        );
        if tasks.is_empty() {
            return;
        }

        tracing::info!("Waiting for {} pending notification(s)", tasks.len());
        let finished = tokio::time::timeout(grace, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;

        if finished.is_err() {
            tracing::warn!("Dropping {} notification(s) still running after {grace:?}", tasks.len());
            tasks.shutdown().await;
        }
    }
}
