//! # mailer
//!
//! SMTP transport for wildfire risk alert emails.
//!
//! The client keeps a pooled connection and can be shared across concurrent
//! region workers. It implements [`risk_core::Transport`], so the alert
//! dispatcher can use it directly.
//!
//! ```no_run
//! use mailer::{Email, MailerConfig, SmtpMailer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mailer::MailerError> {
//!     let config = MailerConfig::from_env()?;
//!     let mailer = SmtpMailer::new(config)?;
//!
//!     let email = Email::new("owner@example.com", "Wildfire Risk Alert", "Fire points detected.");
//!     mailer.send(&email).await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod types;

pub use client::SmtpMailer;
pub use config::{MailerConfig, SmtpSecurity};
pub use error::MailerError;
pub use types::Email;
