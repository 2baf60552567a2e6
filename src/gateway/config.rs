use serde::{Deserialize, Serialize};
use std::fs;
use url::Url;

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::mappers::Provider;
use crate::logger::get_data_dir;

const CONFIG_FILE: &str = "gateway_config.json";

pub const GROQ_API_KEY_VAR: &str = "GROQ_API_KEY";
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Gateway service configuration. Constructed once at startup and never
/// mutated; handlers receive it through router state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Whether to accept LAN connections
    /// - false: loopback only (default)
    /// - true: bind 0.0.0.0
    #[serde(default)]
    pub allow_lan_access: bool,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upstream request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Groq chat-completions endpoint
    #[serde(default = "default_groq_endpoint")]
    pub groq_endpoint: String,

    /// Gemini API base; model and method are appended per request
    #[serde(default = "default_gemini_endpoint")]
    pub gemini_endpoint: String,

    /// Egress proxy configuration
    #[serde(default)]
    pub upstream_proxy: UpstreamProxyConfig,

    /// Provider credentials, snapshotted from the environment at load.
    /// Never serialized back to the config file.
    #[serde(skip)]
    pub credentials: Credentials,
}

/// Egress proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpstreamProxyConfig {
    pub enabled: bool,
    /// Proxy address (http://, https://, socks5://)
    pub url: String,
}

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub groq_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            groq_api_key: std::env::var(GROQ_API_KEY_VAR).ok(),
            gemini_api_key: std::env::var(GEMINI_API_KEY_VAR).ok(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            allow_lan_access: false,
            port: default_port(),
            request_timeout: default_request_timeout(),
            groq_endpoint: default_groq_endpoint(),
            gemini_endpoint: default_gemini_endpoint(),
            upstream_proxy: UpstreamProxyConfig::default(),
            credentials: Credentials::default(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    120
}

fn default_groq_endpoint() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl GatewayConfig {
    /// Load configuration from the data directory, falling back to
    /// defaults when no file exists. Credentials always come from the
    /// process environment, not the file.
    pub fn load() -> Result<Self, String> {
        let config_path = get_data_dir()?.join(CONFIG_FILE);

        let mut config: Self = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .map_err(|e| format!("Failed to read config file: {}", e))?;
            serde_json::from_str(&content)
                .map_err(|e| format!("Failed to parse config file: {}", e))?
        } else {
            Self::default()
        };

        config.credentials = Credentials::from_env();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        Url::parse(&self.groq_endpoint).map_err(|e| format!("Invalid Groq endpoint: {}", e))?;
        Url::parse(&self.gemini_endpoint)
            .map_err(|e| format!("Invalid Gemini endpoint: {}", e))?;
        Ok(())
    }

    /// Listen address
    /// - allow_lan_access = false: "127.0.0.1" (default)
    /// - allow_lan_access = true: "0.0.0.0"
    pub fn get_bind_address(&self) -> &str {
        if self.allow_lan_access {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }

    /// Resolve the credential for a provider. Must be called before any
    /// network activity so a missing key short-circuits the request.
    pub fn credential(&self, provider: Provider) -> GatewayResult<&str> {
        let (key, var) = match provider {
            Provider::Groq => (self.credentials.groq_api_key.as_deref(), GROQ_API_KEY_VAR),
            Provider::Gemini => (
                self.credentials.gemini_api_key.as_deref(),
                GEMINI_API_KEY_VAR,
            ),
        };

        key.filter(|k| !k.is_empty())
            .ok_or(GatewayError::MissingCredential(var))
    }
}
