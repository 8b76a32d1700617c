use std::sync::Mutex;

use tracing::info;

/// A rendered email waiting for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailIntent {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound notification seam.
///
/// Delivery is fire-and-forget from the caller's point of view: a failed
/// delivery is logged, never propagated into the order workflow.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, intent: EmailIntent) -> anyhow::Result<()>;
}

/// Logs each intent instead of sending it. Default sink for dev setups
/// without an SMTP relay.
#[derive(Debug, Default)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn deliver(&self, intent: EmailIntent) -> anyhow::Result<()> {
        info!(to = %intent.to, subject = %intent.subject, "email intent");
        Ok(())
    }
}

/// Captures intents in memory for assertions.
#[derive(Debug, Default)]
pub struct InMemoryNotificationSink {
    sent: Mutex<Vec<EmailIntent>>,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<EmailIntent> {
        match self.sent.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => vec![],
        }
    }
}

impl NotificationSink for InMemoryNotificationSink {
    fn deliver(&self, intent: EmailIntent) -> anyhow::Result<()> {
        self.sent
            .lock()
            .map_err(|_| anyhow::anyhow!("notification buffer poisoned"))?
            .push(intent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_sink_records_in_order() {
        let sink = InMemoryNotificationSink::new();
        sink.deliver(EmailIntent {
            to: "a@example.com".to_string(),
            subject: "first".to_string(),
            body: String::new(),
        })
        .unwrap();
        sink.deliver(EmailIntent {
            to: "b@example.com".to_string(),
            subject: "second".to_string(),
            body: String::new(),
        })
        .unwrap();

        let sent = sink.all();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].subject, "first");
        assert_eq!(sent[1].to, "b@example.com");
    }
}
