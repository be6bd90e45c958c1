pub mod dingtalk;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::Config;
use crate::device::DeviceResolver;
use crate::http;
use crate::types::{AlertEvent, DeliveryOutcome};

/// Trait for alert delivery transports
///
/// A transport formats the alert into its platform-specific shape and
/// performs a single outbound HTTP call. `deliver` returns `None` for
/// resolution events, which are suppressed by design; a failed delivery
/// is `Some` with `success == false`, never an `Err` across this boundary.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name
    fn name(&self) -> &str;

    /// Deliver a single alert
    async fn deliver(&self, alert: &AlertEvent) -> Option<DeliveryOutcome>;
}

/// Holds the enabled transports and dispatches alerts to all of them
pub struct TransportRegistry {
    transports: Vec<Box<dyn Transport>>,
}

impl TransportRegistry {
    pub fn new(config: &Config, resolver: Arc<dyn DeviceResolver>) -> Result<Self> {
        let client = http::build_http_client(config.proxy.as_ref())?;

        let mut transports: Vec<Box<dyn Transport>> = Vec::new();

        if let Some(ref dc) = config.transports.dingtalk {
            if dc.enabled {
                transports.push(Box::new(dingtalk::DingtalkTransport::new(
                    dc.clone(),
                    client.clone(),
                    Arc::clone(&resolver),
                )));
            }
        }

        tracing::info!(transports = transports.len(), "Initialized alert transports");

        Ok(Self { transports })
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    /// Dispatch one alert to every transport.
    ///
    /// Returns `false` when any transport reported a failed delivery.
    /// Suppressed (resolution) deliveries do not count as failures.
    pub async fn dispatch(&self, alert: &AlertEvent) -> bool {
        let mut all_ok = true;
        for transport in &self.transports {
            if let Some(outcome) = transport.deliver(alert).await {
                if !outcome.success {
                    tracing::error!(
                        transport = transport.name(),
                        "Failed to deliver alert"
                    );
                    all_ok = false;
                }
            }
        }
        all_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::StaticDeviceCache;

    #[test]
    fn registry_builds_enabled_transports() {
        let config = Config::from_toml(
            r#"
            [transports.dingtalk]
            enabled = true
            token = "AT1"
            "#,
        )
        .unwrap();

        let registry =
            TransportRegistry::new(&config, Arc::new(StaticDeviceCache::new(&[]))).unwrap();
        assert!(!registry.is_empty());
    }

    #[test]
    fn registry_skips_disabled_transports() {
        let config = Config::from_toml(
            r#"
            [transports.dingtalk]
            enabled = false
            token = "AT1"
            "#,
        )
        .unwrap();

        let registry =
            TransportRegistry::new(&config, Arc::new(StaticDeviceCache::new(&[]))).unwrap();
        assert!(registry.is_empty());
    }
}
