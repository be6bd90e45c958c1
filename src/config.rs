use anyhow::{Context, Result};
use serde::Deserialize;

use crate::http::ProxyConfig;

/// Top-level configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
    #[serde(default)]
    pub transports: TransportsConfig,
    #[serde(default)]
    pub devices: Vec<DeviceMapping>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TransportsConfig {
    #[serde(default)]
    pub dingtalk: Option<DingtalkConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DingtalkConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Bot access token
    pub token: String,
    /// Security keyword prepended to the message when non-empty
    #[serde(default)]
    pub keyword: String,
    /// Secret key; presence triggers HMAC signing of the request URL
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_dingtalk_api_url")]
    pub api_url: String,
}

/// Static device-id to display-name mapping used for log lines
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceMapping {
    pub id: u64,
    pub name: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        // Expand environment variables
        let expanded = expand_env_vars(content);

        let config: Config = toml::from_str(&expanded)
            .with_context(|| "Failed to parse configuration")?;

        Ok(config)
    }
}

/// Expand ${ENV_VAR} references in config string
fn expand_env_vars(input: &str) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
    re.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_default()
    })
    .to_string()
}

// Default value functions
fn default_log_level() -> String { "info".to_string() }
fn default_dingtalk_api_url() -> String { "https://oapi.dingtalk.com/robot/send".to_string() }
