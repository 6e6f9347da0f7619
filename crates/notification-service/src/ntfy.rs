use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};

use crate::{Alert, NotificationChannel, NotificationError};

/// Publishes alerts to an ntfy topic: `POST {base}/{topic}` with the message
/// as the raw body and title, priority and tags as headers.
pub struct NtfyNotifier {
    base_url: String,
    topic: String,
    client: reqwest::Client,
}

impl NtfyNotifier {
    pub fn new(base_url: &str, topic: &str) -> Result<Self, NotificationError> {
        let topic = topic.trim().trim_matches('/');
        if topic.is_empty() {
            return Err(NotificationError::Config("ntfy topic is empty".to_string()));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            topic: topic.to_string(),
            client: reqwest::Client::new(),
        })
    }

    pub fn topic_url(&self) -> String {
        format!("{}/{}", self.base_url, self.topic)
    }

    fn headers(alert: &Alert) -> Result<HeaderMap, NotificationError> {
        let mut headers = HeaderMap::new();

        // ntfy accepts raw UTF-8 titles
        let title = HeaderValue::from_bytes(alert.title.as_bytes())
            .map_err(|e| NotificationError::Config(format!("invalid title header: {e}")))?;
        headers.insert("title", title);
        headers.insert("priority", HeaderValue::from_static(alert.priority.as_str()));

        if !alert.tags.is_empty() {
            let tags = HeaderValue::from_str(&alert.tags.join(","))
                .map_err(|e| NotificationError::Config(format!("invalid tags header: {e}")))?;
            headers.insert("tags", tags);
        }

        Ok(headers)
    }
}

#[async_trait]
impl NotificationChannel for NtfyNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(self.topic_url())
            .headers(Self::headers(alert)?)
            .body(alert.message.clone().into_bytes())
            .send()
            .await
            .map_err(|e| NotificationError::Ntfy(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotificationError::Ntfy(format!(
                "HTTP {} from {}",
                response.status(),
                self.topic_url()
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "ntfy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Priority;

    #[test]
    fn test_topic_url_normalized() {
        let notifier = NtfyNotifier::new("https://ntfy.sh/", " /kd-alerts ").unwrap();
        assert_eq!(notifier.topic_url(), "https://ntfy.sh/kd-alerts");
    }

    #[test]
    fn test_empty_topic_rejected() {
        assert!(matches!(
            NtfyNotifier::new("https://ntfy.sh", "  "),
            Err(NotificationError::Config(_))
        ));
    }

    #[test]
    fn test_headers_carry_title_priority_and_tags() {
        let alert = Alert::new("每日股市通報", "body")
            .with_priority(Priority::High)
            .with_tag("chart_with_upwards_trend");

        let headers = NtfyNotifier::headers(&alert).unwrap();

        assert_eq!(headers["title"].as_bytes(), "每日股市通報".as_bytes());
        assert_eq!(headers["priority"], "high");
        assert_eq!(headers["tags"], "chart_with_upwards_trend");
    }

    #[test]
    fn test_no_tags_header_when_untagged() {
        let headers = NtfyNotifier::headers(&Alert::new("t", "m")).unwrap();
        assert!(!headers.contains_key("tags"));
    }

    #[test]
    fn test_control_characters_in_title_rejected() {
        let alert = Alert::new("line\nbreak", "m");
        assert!(matches!(
            NtfyNotifier::headers(&alert),
            Err(NotificationError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_ntfy_error() {
        let notifier = NtfyNotifier::new("http://127.0.0.1:9", "topic").unwrap();
        let err = notifier.send(&Alert::new("t", "m")).await.unwrap_err();
        assert!(matches!(err, NotificationError::Ntfy(_)));
    }
}
