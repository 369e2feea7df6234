use std::net::IpAddr;
use std::path::PathBuf;

pub const DEFAULT_SUBJECT: &str = "IMPORTANT: Exception received ({{package_version}})";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub traces_dir: PathBuf,
    pub max_body_size: usize,
    pub log_level: String,
    pub notify: NotifyConfig,
}

/// Everything here is optional; an empty `NotifyConfig` means no notifications.
#[derive(Debug, Clone, Default)]
pub struct NotifyConfig {
    pub smtp: Option<SmtpConfig>,
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
    pub to: String,
    pub tls: TlsMode,
    pub subject: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TlsMode {
    StartTls,
    Tls,
    None,
}

impl TlsMode {
    fn parse(value: &str) -> Result<Self, String> {
        match value {
            "starttls" => Ok(TlsMode::StartTls),
            "tls" => Ok(TlsMode::Tls),
            "none" => Ok(TlsMode::None),
            other => Err(format!("Invalid STACKDROP_NOTIFY_SMTP_TLS: {other}")),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, so parsing can be
    /// exercised without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host: IpAddr = env_or("STACKDROP_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid STACKDROP_HOST: {e}"))?;

        let port: u16 = env_or("STACKDROP_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid STACKDROP_PORT: {e}"))?;

        let traces_dir = PathBuf::from(env_or("STACKDROP_TRACES_DIR", "."));

        let max_body_size: usize = env_or("STACKDROP_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid STACKDROP_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("STACKDROP_LOG_LEVEL", "info");

        let smtp = match (
            lookup("STACKDROP_NOTIFY_SMTP_HOST"),
            lookup("STACKDROP_NOTIFY_SMTP_PORT"),
            lookup("STACKDROP_NOTIFY_SMTP_USER"),
            lookup("STACKDROP_NOTIFY_SMTP_PASS"),
            lookup("STACKDROP_NOTIFY_SMTP_FROM"),
            lookup("STACKDROP_NOTIFY_SMTP_TO"),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from), Some(to)) => {
                Some(SmtpConfig {
                    host,
                    port: port
                        .parse()
                        .map_err(|e| format!("Invalid STACKDROP_NOTIFY_SMTP_PORT: {e}"))?,
                    user,
                    pass,
                    from,
                    to,
                    tls: TlsMode::parse(&env_or("STACKDROP_NOTIFY_SMTP_TLS", "starttls"))?,
                    subject: env_or("STACKDROP_NOTIFY_SUBJECT", DEFAULT_SUBJECT),
                })
            }
            _ => None,
        };

        let webhook_url = lookup("STACKDROP_NOTIFY_WEBHOOK_URL").filter(|s| !s.trim().is_empty());

        Ok(Config {
            host,
            port,
            traces_dir,
            max_body_size,
            log_level,
            notify: NotifyConfig { smtp, webhook_url },
        })
    }
}
