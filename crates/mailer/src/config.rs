use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::MailerError;

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// Plain connection upgraded with STARTTLS (port 587).
    StartTls,
    /// Implicit TLS from the first byte (port 465).
    Tls,
    /// No encryption. Only for local relays and tests.
    None,
}

impl FromStr for SmtpSecurity {
    type Err = MailerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "starttls" => Ok(Self::StartTls),
            "tls" | "ssl" => Ok(Self::Tls),
            "none" | "plain" => Ok(Self::None),
            other => Err(MailerError::Config(format!(
                "Invalid SMTP_SECURITY '{}' (expected starttls, tls or none)",
                other
            ))),
        }
    }
}

/// Configuration for the SMTP relay that delivers alerts.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// SMTP host (default: 127.0.0.1)
    pub smtp_host: String,
    /// SMTP port (default: 587)
    pub smtp_port: u16,
    /// Connection security (default: STARTTLS)
    pub security: SmtpSecurity,
    /// Address alerts are sent from
    pub from_address: String,
    /// SMTP username, if the relay requires authentication
    pub username: Option<String>,
    /// SMTP password
    password: Option<SecretString>,
    /// Per-command network timeout
    pub timeout: Duration,
}

impl MailerConfig {
    /// Create a new configuration with explicit values and no authentication.
    pub fn new(smtp_host: impl Into<String>, smtp_port: u16, from_address: impl Into<String>) -> Self {
        Self {
            smtp_host: smtp_host.into(),
            smtp_port,
            security: SmtpSecurity::StartTls,
            from_address: from_address.into(),
            username: None,
            password: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required:
    /// - `ALERT_FROM_ADDRESS` - sender address for alert emails
    ///
    /// Optional (with defaults):
    /// - `SMTP_HOST` - Default: 127.0.0.1
    /// - `SMTP_PORT` - Default: 587
    /// - `SMTP_SECURITY` - `starttls`, `tls` or `none`. Default: starttls
    /// - `SMTP_USERNAME` / `SMTP_PASSWORD` - credentials, both or neither
    /// - `SMTP_TIMEOUT_SECS` - Default: 30
    pub fn from_env() -> Result<Self, MailerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MailerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let smtp_host = lookup("SMTP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let smtp_port = lookup("SMTP_PORT")
            .unwrap_or_else(|| "587".to_string())
            .parse::<u16>()
            .map_err(|e| MailerError::Config(format!("Invalid SMTP_PORT: {}", e)))?;

        let security = match lookup("SMTP_SECURITY") {
            Some(value) => value.parse()?,
            None => SmtpSecurity::StartTls,
        };

        let from_address = lookup("ALERT_FROM_ADDRESS")
            .ok_or_else(|| MailerError::MissingEnvVar("ALERT_FROM_ADDRESS".to_string()))?;

        let timeout_secs = lookup("SMTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse::<u64>()
            .map_err(|e| MailerError::Config(format!("Invalid SMTP_TIMEOUT_SECS: {}", e)))?;

        let (username, password) = match (lookup("SMTP_USERNAME"), lookup("SMTP_PASSWORD")) {
            (Some(user), Some(pass)) => (Some(user), Some(SecretString::from(pass))),
            (None, None) => (None, None),
            (Some(_), None) => return Err(MailerError::MissingEnvVar("SMTP_PASSWORD".to_string())),
            (None, Some(_)) => return Err(MailerError::MissingEnvVar("SMTP_USERNAME".to_string())),
        };

        Ok(Self {
            smtp_host,
            smtp_port,
            security,
            from_address,
            username,
            password,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Username and password, if both are configured (exposes the secret).
    pub(crate) fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.expose_secret())),
            _ => None,
        }
    }

    /// Builder method to set credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Builder method to set connection security.
    pub fn with_security(mut self, security: SmtpSecurity) -> Self {
        self.security = security;
        self
    }

    /// Builder method to set the network timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
