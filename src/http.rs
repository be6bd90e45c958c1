//! Proxy configuration and HTTP client factory.
//!
//! Transports receive a proxy-aware `reqwest::Client` at construction time
//! instead of relying on process-wide proxy settings.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Outbound proxy settings
#[derive(Debug, Deserialize, Clone)]
pub struct ProxyConfig {
    #[serde(default)]
    pub protocol: ProxyProtocol,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProxyProtocol {
    #[default]
    Http,
    Https,
    Socks5,
}

impl ProxyConfig {
    pub fn url(&self) -> String {
        let scheme = match self.protocol {
            ProxyProtocol::Http => "http",
            ProxyProtocol::Https => "https",
            ProxyProtocol::Socks5 => "socks5",
        };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

/// Build a `reqwest::Client` with the resolved proxy configuration.
///
/// - `Some(proxy)` -> configure proxy on the client
/// - `None` -> explicitly disable proxy (`no_proxy`), ignoring env vars
pub fn build_http_client(proxy: Option<&ProxyConfig>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    match proxy {
        Some(cfg) => {
            let url = cfg.url();
            let mut p = reqwest::Proxy::all(&url)
                .with_context(|| format!("Invalid proxy URL: {}", url))?;
            if let (Some(u), Some(pw)) = (&cfg.username, &cfg.password) {
                p = p.basic_auth(u, pw);
            }
            builder = builder.proxy(p);
        }
        None => {
            builder = builder.no_proxy();
        }
    }
    builder.build().context("Failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_url_without_auth() {
        let cfg = ProxyConfig {
            protocol: ProxyProtocol::Http,
            host: "127.0.0.1".to_string(),
            port: 8080,
            username: None,
            password: None,
        };
        assert_eq!(cfg.url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn proxy_url_socks5() {
        let cfg = ProxyConfig {
            protocol: ProxyProtocol::Socks5,
            host: "proxy.internal".to_string(),
            port: 1080,
            username: None,
            password: None,
        };
        assert_eq!(cfg.url(), "socks5://proxy.internal:1080");
    }

    #[test]
    fn builds_client_without_proxy() {
        assert!(build_http_client(None).is_ok());
    }

    #[test]
    fn builds_client_with_proxy() {
        let cfg = ProxyConfig {
            protocol: ProxyProtocol::Http,
            host: "127.0.0.1".to_string(),
            port: 8080,
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
        };
        assert!(build_http_client(Some(&cfg)).is_ok());
    }
}
