use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::template;
use super::{Notifier, NotifyError, ReportContext};
use crate::config::{SmtpConfig, TlsMode};

/// Mails the raw stack trace of every new report to a fixed recipient.
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    subject: String,
}

impl EmailNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let from = config
            .from
            .parse()
            .map_err(|e| format!("Invalid from address: {e}"))?;
        let to = config
            .to
            .parse()
            .map_err(|e| format!("Invalid to address: {e}"))?;

        Ok(Self {
            transport: build_smtp_transport(config)?,
            from,
            to,
            subject: config.subject.clone(),
        })
    }

    pub fn build_message(&self, ctx: &ReportContext) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(template::render(&self.subject, ctx))
            .header(ContentType::TEXT_PLAIN)
            .body(ctx.stacktrace.clone())
            .map_err(|e| NotifyError::from(format!("Failed to build email: {e}")))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn id(&self) -> &str {
        "email"
    }

    async fn notify(&self, ctx: &ReportContext) -> Result<(), NotifyError> {
        let message = self.build_message(ctx)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::from(format!("Failed to send email: {e}")))?;

        tracing::debug!("Mailed {} to {}", ctx.filename, self.to);
        Ok(())
    }
}

pub fn build_smtp_transport(
    config: &SmtpConfig,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
    let creds = Credentials::new(config.user.clone(), config.pass.clone());

    let transport = match config.tls {
        TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| format!("SMTP relay error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build(),
        TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .credentials(creds)
            .build(),
        TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP starttls error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build(),
    };

    Ok(transport)
}
