//! Mail Transports
//!
//! `Mailer` implementations: SMTP for production, a file spool for
//! development when no SMTP host is configured, and an in-memory capture
//! for tests.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use uuid::Uuid;

use crate::error::{MailError, Result};
use crate::message::OutgoingMail;

/// Receipt handed back by a transport after a successful send.
#[derive(Clone, Debug)]
pub struct SendReceipt {
    /// Message-ID of the sent mail, angle brackets included
    pub message_id: String,
    /// Where a human can inspect the message, when the transport has one
    pub preview_url: Option<String>,
}

/// Outbound mail transport (Strategy pattern)
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<SendReceipt>;

    /// Transport name, for logs and the health endpoint
    fn name(&self) -> &str;
}

/// SMTP connection settings, usually read from the environment.
#[derive(Clone, Debug)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    /// Implicit TLS on connect instead of STARTTLS upgrade
    pub secure: bool,
}

/// Production transport speaking SMTP through lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let builder = if settings.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .map_err(|e| MailError::Transport(e.to_string()))?;

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.pass.clone(),
            ))
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<SendReceipt> {
        let (message, message_id) = mail.assemble()?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::info!(message_id = %message_id, "mail sent via smtp");

        Ok(SendReceipt {
            message_id,
            preview_url: None,
        })
    }

    fn name(&self) -> &str {
        "smtp"
    }
}

/// Development transport: spools the formatted message to disk and hands
/// back a `file://` preview URL, standing in for a throwaway test inbox.
pub struct FileMailer {
    dir: PathBuf,
}

impl FileMailer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn spool_dir(&self) -> &std::path::Path {
        &self.dir
    }
}

#[async_trait]
impl Mailer for FileMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<SendReceipt> {
        let (message, message_id) = mail.assemble()?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{}.eml", Uuid::new_v4()));
        tokio::fs::write(&path, message.formatted()).await?;

        let preview_url = format!("file://{}", path.display());
        tracing::info!(message_id = %message_id, path = %path.display(), "mail spooled to file");

        Ok(SendReceipt {
            message_id,
            preview_url: Some(preview_url),
        })
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// Test transport that captures every message in memory.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent through this transport so far
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<SendReceipt> {
        // assemble anyway so tests exercise address validation too
        let (_, message_id) = mail.assemble()?;
        self.sent.lock().unwrap().push(mail.clone());

        Ok(SendReceipt {
            message_id,
            preview_url: None,
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail() -> OutgoingMail {
        OutgoingMail {
            from: "a@example.org".to_string(),
            to: "b@example.org".to_string(),
            reply_to: None,
            subject: "spool me".to_string(),
            text: "body".to_string(),
            html: "<p>body</p>".to_string(),
            attachments: vec![],
        }
    }

    #[tokio::test]
    async fn test_memory_mailer_captures_messages() {
        let mailer = MemoryMailer::new();

        let receipt = mailer.send(&mail()).await.unwrap();
        assert!(receipt.message_id.ends_with("@gatekit.local>"));
        assert_eq!(receipt.preview_url, None);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "spool me");
    }

    #[tokio::test]
    async fn test_memory_mailer_rejects_bad_addresses() {
        let mailer = MemoryMailer::new();
        let mut bad = mail();
        bad.to = "nope".to_string();

        assert!(mailer.send(&bad).await.is_err());
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_file_mailer_spools_to_disk() {
        let dir = std::env::temp_dir().join(format!("gatekit-mail-{}", Uuid::new_v4()));
        let mailer = FileMailer::new(&dir);

        let receipt = mailer.send(&mail()).await.unwrap();
        let preview = receipt.preview_url.unwrap();
        assert!(preview.starts_with("file://"));
        assert!(preview.ends_with(".eml"));

        let mut entries = tokio::fs::read_dir(mailer.spool_dir()).await.unwrap();
        let entry = entries.next_entry().await.unwrap().unwrap();
        let contents = tokio::fs::read_to_string(entry.path()).await.unwrap();
        assert!(contents.contains("Subject: spool me"));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
