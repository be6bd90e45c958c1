//! DingTalk robot webhook transport.
//!
//! Sends a text message to the DingTalk group-robot endpoint, signing the
//! request URL with HMAC-SHA256 when a secret key is configured. The
//! signature is computed over `"{timestamp}\n{secret}"` keyed with the
//! secret, and the raw digest bytes are base64-encoded.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use super::Transport;
use crate::config::DingtalkConfig;
use crate::device::DeviceResolver;
use crate::types::{AlertEvent, DeliveryOutcome};

/// Signing parameters appended to the webhook URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequestParams {
    /// Unix seconds; the same value is signed and sent as a query parameter
    pub timestamp: i64,
    /// base64 of the raw HMAC-SHA256 digest
    pub signature: String,
}

pub struct DingtalkTransport {
    config: DingtalkConfig,
    client: reqwest::Client,
    resolver: Arc<dyn DeviceResolver>,
}

impl DingtalkTransport {
    pub fn new(
        config: DingtalkConfig,
        client: reqwest::Client,
        resolver: Arc<dyn DeviceResolver>,
    ) -> Self {
        Self { config, client, resolver }
    }

    /// Compute the request signature for a given timestamp.
    pub fn sign(timestamp: i64, secret: &str) -> SignedRequestParams {
        let payload = format!("{}\n{}", timestamp, secret);
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(payload.as_bytes());
        let digest = mac.finalize().into_bytes();
        SignedRequestParams {
            timestamp,
            signature: base64::engine::general_purpose::STANDARD.encode(digest),
        }
    }

    fn message_content(&self, alert: &AlertEvent) -> String {
        let mut details = format!("Librenms alert for: {}", alert.hostname);
        if !self.config.keyword.is_empty() {
            details = format!("{} > {}", self.config.keyword, details);
        }
        format!("{}\n{}", details, alert.msg)
    }

    fn build_url(&self, sign_params: Option<&SignedRequestParams>) -> String {
        let mut url = format!(
            "{}?access_token={}",
            self.config.api_url,
            urlencoding::encode(&self.config.token)
        );
        if let Some(params) = sign_params {
            url = format!(
                "{}&timestamp={}&sign={}",
                url,
                params.timestamp,
                urlencoding::encode(&params.signature)
            );
        }
        url
    }

    /// Field descriptions consumed by the surrounding system's config UI.
    pub fn config_template() -> serde_json::Value {
        json!({
            "config": [
                {
                    "title": "Access Token",
                    "name": "dingtalk-token",
                    "descr": "Dingtalk access token",
                    "type": "text",
                },
                {
                    "title": "Security Keyword",
                    "name": "dingtalk-keyword",
                    "descr": "Dingtalk security keyword to include in the alert message",
                    "type": "text",
                },
                {
                    "title": "Sign Secret Key",
                    "name": "dingtalk-secret-key",
                    "descr": "Secret key used to sign requests",
                    "type": "text",
                },
            ],
            "validation": {
                "dingtalk-token": "required|string",
                "dingtalk-keyword": "string",
                "dingtalk-secret-key": "string",
            },
        })
    }
}

#[async_trait]
impl Transport for DingtalkTransport {
    fn name(&self) -> &str {
        "dingtalk"
    }

    async fn deliver(&self, alert: &AlertEvent) -> Option<DeliveryOutcome> {
        let sign_params = if self.config.secret_key.is_empty() {
            None
        } else {
            Some(Self::sign(chrono::Utc::now().timestamp(), &self.config.secret_key))
        };

        // Don't notify on resolutions
        if alert.is_resolution() {
            return None;
        }

        // For the log line only, never sent to the remote
        let device = self
            .resolver
            .device_name(alert.device_id)
            .unwrap_or_else(|| format!("#{}", alert.device_id));

        let body = json!({
            "msgtype": "text",
            "text": { "content": self.message_content(alert) },
        });
        let url = self.build_url(sign_params.as_ref());

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await;

        let outcome = match response {
            Ok(resp) if resp.status().as_u16() == 200 => {
                let raw = resp.text().await.unwrap_or_default();
                // Best effort: a missing or unparseable `key` does not fail the call
                let key = serde_json::from_str::<serde_json::Value>(&raw)
                    .ok()
                    .and_then(|v| v.get("key").and_then(|k| k.as_str()).map(str::to_owned));
                let message = match key {
                    Some(key) => format!("created dingtalk notification {} for {}", key, device),
                    None => format!("created dingtalk notification for {}", device),
                };
                tracing::info!(transport = "dingtalk", "{}", message);
                DeliveryOutcome { success: true, message }
            }
            Ok(resp) => {
                let status = resp.status().as_u16();
                let raw = resp.text().await.unwrap_or_default();
                let message = format!("dingtalk connection error: HTTP {}: {}", status, raw);
                tracing::warn!(transport = "dingtalk", "{}", message);
                DeliveryOutcome { success: false, message }
            }
            Err(e) => {
                let message = format!("dingtalk connection error: {}", e);
                tracing::warn!(transport = "dingtalk", "{}", message);
                DeliveryOutcome { success: false, message }
            }
        };

        Some(outcome)
    }
}
