use std::time::Duration;

use anyhow::Context;
use axum::async_trait;
use serde_json::json;
use tracing::debug;

use crate::config::NotificationConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Push delivery to a single device token.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, token: &str, note: &Notification) -> anyhow::Result<()>;
}

pub struct FcmNotifier {
    http: reqwest::Client,
    endpoint: String,
    server_key: Option<String>,
}

impl FcmNotifier {
    pub fn new(cfg: &NotificationConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            server_key: cfg.server_key.clone(),
        })
    }
}

#[async_trait]
impl Notifier for FcmNotifier {
    async fn send(&self, token: &str, note: &Notification) -> anyhow::Result<()> {
        let Some(key) = &self.server_key else {
            debug!("no FCM server key configured; notification skipped");
            return Ok(());
        };
        self.http
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("key={key}"))
            .json(&json!({
                "to": token,
                "notification": { "title": note.title, "body": note.body },
            }))
            .send()
            .await
            .context("fcm send")?
            .error_for_status()
            .context("fcm status")?;
        Ok(())
    }
}
