use async_trait::async_trait;

use super::{Notifier, NotifyError, ReportContext};

/// POSTs every new report as JSON to a configured URL.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn id(&self) -> &str {
        "webhook"
    }

    async fn notify(&self, ctx: &ReportContext) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.url)
            .json(ctx)
            .send()
            .await
            .map_err(|e| NotifyError::from(format!("Webhook request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(1024)
                .collect::<String>();
            return Err(NotifyError::from(format!(
                "Webhook returned {}: {body}",
                status.as_u16()
            )));
        }

        Ok(())
    }
}
