//! Example: send one alert-shaped email through the configured SMTP relay.
//!
//! Environment variables (or .env file):
//! - ALERT_FROM_ADDRESS=alerts@example.com
//! - SMTP_HOST / SMTP_PORT / SMTP_SECURITY / SMTP_USERNAME / SMTP_PASSWORD
//!
//! Run with:
//! ```bash
//! cargo run -p mailer --example send_email -- owner@example.com
//! ```

use mailer::{Email, MailerConfig, MailerError, SmtpMailer};

#[tokio::main]
async fn main() -> Result<(), MailerError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let to = std::env::args()
        .nth(1)
        .ok_or_else(|| MailerError::Config("usage: send_email <recipient>".to_string()))?;

    let mailer = SmtpMailer::new(MailerConfig::from_env()?)?;
    mailer.test_connection().await?;

    let email = Email::new(
        &to,
        "Wildfire Risk Alert: test message",
        "This is a test of the wildfire alert mail path.\n\n-- Cloud Wildfire Monitoring Platform",
    );
    mailer.send(&email).await?;
    println!("✓ Sent test alert to {}", to);

    Ok(())
}
