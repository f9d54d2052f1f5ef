use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub target_url: Option<String>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            target_url: None,
        }
    }

    pub fn with_target(mut self, url: impl Into<String>) -> Self {
        self.target_url = Some(url.into());
        self
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// Delivers frame notifications to the client's notification endpoint.
pub struct HttpNotifier {
    client: reqwest::Client,
    url: String,
    token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotificationRequest<'a> {
    notification_id: String,
    title: &'a str,
    body: &'a str,
    target_url: Option<&'a str>,
    tokens: Vec<&'a str>,
}

impl HttpNotifier {
    pub fn new(url: String, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            token,
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let request = NotificationRequest {
            notification_id: Uuid::new_v4().to_string(),
            title: &notification.title,
            body: &notification.body,
            target_url: notification.target_url.as_deref(),
            tokens: vec![self.token.as_str()],
        };

        let response = self.client.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            bail!("Notification endpoint rejected request: {}", response.status());
        }

        tracing::debug!("Notification delivered: {}", notification.title);
        Ok(())
    }
}

/// Used when no notification endpoint is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        tracing::info!("Notification: {} - {}", notification.title, notification.body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn http_notifier_posts_title_and_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/notify")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"title":"Prompt Submitted!","tokens":["tok"],"targetUrl":"https://x/prompts/1"}"#
                    .to_string(),
            ))
            .with_status(200)
            .create_async()
            .await;

        let notifier = HttpNotifier::new(format!("{}/notify", server.url()), "tok".to_string());
        let note = Notification::new("Prompt Submitted!", "posted").with_target("https://x/prompts/1");
        notifier.send(&note).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_notifier_surfaces_rejection() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/notify").with_status(410).create_async().await;

        let notifier = HttpNotifier::new(format!("{}/notify", server.url()), "tok".to_string());
        assert!(notifier.send(&Notification::new("t", "b")).await.is_err());
    }
}
