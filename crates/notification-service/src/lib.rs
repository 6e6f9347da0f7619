mod ntfy;

pub use ntfy::NtfyNotifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NTFY_URL: &str = "https://ntfy.sh";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Min,
    Low,
    #[default]
    Default,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Min => "min",
            Priority::Low => "low",
            Priority::Default => "default",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

/// A notification to be dispatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub priority: Priority,
    /// Emoji short codes / labels rendered by the client (e.g. `chart_with_upwards_trend`)
    pub tags: Vec<String>,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            priority: Priority::Default,
            tags: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// Trait for notification channels.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, alert: &Alert) -> Result<(), NotificationError>;
    fn name(&self) -> &str;
}

/// Errors from the notification system.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("ntfy error: {0}")]
    Ntfy(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Configuration for the notification service.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub ntfy_base_url: String,
    pub ntfy_topic: Option<String>,
}

impl NotificationConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        Self {
            ntfy_base_url: std::env::var("NTFY_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_NTFY_URL.to_string()),
            ntfy_topic: std::env::var("NTFY_TOPIC").ok().filter(|s| !s.is_empty()),
        }
    }
}

/// Dispatches alerts to all configured channels.
pub struct NotificationService {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl NotificationService {
    pub fn new(config: &NotificationConfig) -> Self {
        let mut channels: Vec<Box<dyn NotificationChannel>> = Vec::new();

        if let Some(ref topic) = config.ntfy_topic {
            match NtfyNotifier::new(&config.ntfy_base_url, topic) {
                Ok(notifier) => {
                    tracing::info!("ntfy notifications enabled ({})", notifier.topic_url());
                    channels.push(Box::new(notifier));
                }
                Err(e) => tracing::warn!("Failed to initialize ntfy notifier: {}", e),
            }
        }

        if channels.is_empty() {
            tracing::info!("No notification channels configured (set NTFY_TOPIC)");
        }

        Self { channels }
    }

    pub fn with_channel(mut self, channel: Box<dyn NotificationChannel>) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Send to every channel in turn, awaiting each. Returns how many accepted it.
    pub async fn send_alert_async(&self, alert: &Alert) -> usize {
        let mut delivered = 0;
        for channel in self.channels.iter() {
            match channel.send(alert).await {
                Ok(()) => {
                    tracing::info!("Sent notification via {}", channel.name());
                    delivered += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to send notification via {}: {}", channel.name(), e)
                }
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingChannel {
        sent: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationChannel for CountingChannel {
        async fn send(&self, _alert: &Alert) -> Result<(), NotificationError> {
            if self.fail {
                return Err(NotificationError::Ntfy("503".to_string()));
            }
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn empty_config() -> NotificationConfig {
        NotificationConfig {
            ntfy_base_url: DEFAULT_NTFY_URL.to_string(),
            ntfy_topic: None,
        }
    }

    #[test]
    fn test_alert_builder() {
        let alert = Alert::new("每日股市通報", "body")
            .with_priority(Priority::High)
            .with_tag("chart_with_upwards_trend");

        assert_eq!(alert.priority.as_str(), "high");
        assert_eq!(alert.tags, vec!["chart_with_upwards_trend".to_string()]);
    }

    #[test]
    fn test_topic_enables_ntfy_channel() {
        let config = NotificationConfig {
            ntfy_base_url: DEFAULT_NTFY_URL.to_string(),
            ntfy_topic: Some("kd-alerts".to_string()),
        };
        assert_eq!(NotificationService::new(&config).channel_count(), 1);
        assert_eq!(NotificationService::new(&empty_config()).channel_count(), 0);
    }

    #[tokio::test]
    async fn test_failing_channel_does_not_stop_others() {
        let sent = Arc::new(AtomicUsize::new(0));
        let service = NotificationService::new(&empty_config())
            .with_channel(Box::new(CountingChannel {
                sent: sent.clone(),
                fail: true,
            }))
            .with_channel(Box::new(CountingChannel {
                sent: sent.clone(),
                fail: false,
            }));

        let delivered = service.send_alert_async(&Alert::new("t", "m")).await;

        assert_eq!(delivered, 1);
        assert_eq!(sent.load(Ordering::SeqCst), 1);
    }
}
