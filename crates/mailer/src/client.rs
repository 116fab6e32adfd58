use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use risk_core::{async_trait, AlertError, Transport};
use tracing::{debug, info, instrument};

use crate::{Email, MailerConfig, MailerError, SmtpSecurity};

/// Client for sending alert emails through an SMTP relay.
///
/// Uses connection pooling, so one client can be shared by many concurrent
/// senders.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: Mailbox,
    host: String,
}

impl SmtpMailer {
    /// Create a new client with the given configuration.
    ///
    /// No connection is made until the first send or [`test_connection`](Self::test_connection).
    ///
    /// Must be called inside a Tokio runtime: the connection pool spawns its
    /// idle-connection reaper on the current runtime.
    pub fn new(config: MailerConfig) -> Result<Self, MailerError> {
        let from_address: Mailbox = config
            .from_address
            .parse()
            .map_err(|e| MailerError::InvalidAddress(format!("From '{}': {}", config.from_address, e)))?;

        let builder = match config.security {
            SmtpSecurity::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .map_err(|e| MailerError::Transport(e.to_string()))?,
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                .map_err(|e| MailerError::Transport(e.to_string()))?,
            SmtpSecurity::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host),
        };

        let mut builder = builder.port(config.smtp_port).timeout(Some(config.timeout));
        if let Some((username, password)) = config.credentials() {
            builder = builder.credentials(Credentials::new(username.to_string(), password.to_string()));
        }
        let transport = builder.build();

        info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            security = ?config.security,
            from = %config.from_address,
            "Created SMTP mailer"
        );

        Ok(Self {
            transport,
            from_address,
            host: config.smtp_host,
        })
    }

    /// Send an email.
    #[instrument(skip(self, email), fields(to = %email.to, subject = %email.subject))]
    pub async fn send(&self, email: &Email) -> Result<(), MailerError> {
        let message = self.build_message(email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::Send(e.to_string()))?;

        info!(to = %email.to, "Email sent successfully");
        Ok(())
    }

    /// Open a connection to the relay and check that it answers.
    pub async fn test_connection(&self) -> Result<(), MailerError> {
        debug!(host = %self.host, "Testing SMTP connection");
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailerError::Transport(format!(
                "SMTP relay {} did not accept the connection",
                self.host
            ))),
            Err(e) => Err(MailerError::Transport(e.to_string())),
        }
    }

    /// Build a lettre Message from our Email type.
    fn build_message(&self, email: &Email) -> Result<Message, MailerError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| MailerError::InvalidAddress(format!("To '{}': {}", email.to, e)))?;

        Message::builder()
            .from(self.from_address.clone())
            .to(to)
            .subject(&email.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| MailerError::BuildEmail(e.to_string()))
    }
}

#[async_trait]
impl Transport for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AlertError> {
        let email = Email::new(to, subject, body);
        SmtpMailer::send(self, &email).await.map_err(AlertError::from)
    }

    fn name(&self) -> &str {
        "SmtpMailer"
    }

    async fn check(&self) -> Result<(), AlertError> {
        self.test_connection().await.map_err(AlertError::from)
    }
}
