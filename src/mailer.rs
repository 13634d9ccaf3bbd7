use async_trait::async_trait;
use tracing::info;

/// Out-of-band notification sender. The reset flow only needs `send`; the
/// delivery mechanism (SMTP, provider API) stays behind this trait.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Writes outgoing mail to the log instead of delivering it. Default until a
/// real SMTP sender is wired in.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!(to = %to, subject = %subject, body = %body, "outgoing mail");
        Ok(())
    }
}

/// Captures sent messages so tests can inspect them.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: std::sync::Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}
