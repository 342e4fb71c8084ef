//! Outbound mail. Confirmation codes are the only thing this crate sends.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::{MailBackend, MailConfig};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Builds the backend selected by `mail.backend`.
#[must_use]
pub fn from_config(config: &MailConfig) -> Arc<dyn Notifier> {
    match config.backend {
        MailBackend::Log => Arc::new(LogNotifier::new(config.from_address.clone())),
        MailBackend::File => Arc::new(FileNotifier::new(
            config.from_address.clone(),
            PathBuf::from(&config.outbox_path),
        )),
    }
}

/// Emits each message as a log event.
pub struct LogNotifier {
    from: String,
}

impl LogNotifier {
    #[must_use]
    pub const fn new(from: String) -> Self {
        Self { from }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        info!(
            event = "mail_sent",
            backend = "log",
            from = %self.from,
            to = %to,
            subject = %subject,
            body = %body,
            "Mail message"
        );
        Ok(())
    }
}

/// Writes one `.eml`-style file per message into an outbox directory.
pub struct FileNotifier {
    from: String,
    outbox: PathBuf,
}

impl FileNotifier {
    #[must_use]
    pub const fn new(from: String, outbox: PathBuf) -> Self {
        Self { from, outbox }
    }
}

#[async_trait]
impl Notifier for FileNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.outbox)
            .await
            .with_context(|| format!("Failed to create outbox {}", self.outbox.display()))?;

        let file_name = format!(
            "{}-{}.eml",
            chrono::Utc::now().format("%Y%m%dT%H%M%S"),
            uuid::Uuid::new_v4()
        );
        let path = self.outbox.join(file_name);

        let message = format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nDate: {}\r\n\r\n{}\r\n",
            self.from,
            to,
            subject,
            chrono::Utc::now().to_rfc2822(),
            body
        );

        tokio::fs::write(&path, message)
            .await
            .with_context(|| format!("Failed to write message {}", path.display()))?;

        info!(event = "mail_sent", backend = "file", to = %to, path = %path.display(), "Mail message written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_notifier_writes_one_file_per_message() {
        let outbox = std::env::temp_dir().join(format!("yamdb_outbox_{}", uuid::Uuid::new_v4()));
        let notifier = FileNotifier::new("noreply@yamdb.local".to_string(), outbox.clone());

        notifier.send("a@example.com", "Hello", "first").await.unwrap();
        notifier.send("b@example.com", "Hello", "second").await.unwrap();

        let mut entries = std::fs::read_dir(&outbox)
            .unwrap()
            .map(|e| std::fs::read_to_string(e.unwrap().path()).unwrap())
            .collect::<Vec<_>>();
        entries.sort();

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|m| m.contains("To: a@example.com") && m.contains("first")));
        assert!(entries.iter().any(|m| m.contains("To: b@example.com") && m.contains("second")));

        let _ = std::fs::remove_dir_all(&outbox);
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        let notifier = LogNotifier::new("noreply@yamdb.local".to_string());
        assert!(notifier.send("a@example.com", "s", "b").await.is_ok());
    }
}
