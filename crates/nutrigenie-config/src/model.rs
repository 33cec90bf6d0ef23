use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub features: FeatureFlags,

    #[serde(default)]
    pub speech: SpeechConfig,

    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            provider: ProviderConfig::default(),
            features: FeatureFlags::default(),
            speech: SpeechConfig::default(),
            data_dir: None,
            log_level: Some("info".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            api_key: None,
            base_url: None,
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}

/// Optional surfaces of the application. Disabled features return 404 at
/// the gateway and an error in the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlags {
    #[serde(default = "default_true")]
    pub image_analysis: bool,

    #[serde(default)]
    pub speech: bool,

    #[serde(default = "default_true")]
    pub recipes: bool,

    #[serde(default = "default_true")]
    pub shopping_list: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            image_analysis: true,
            speech: false,
            recipes: true,
            shopping_list: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Command that captures microphone audio and prints a transcript on stdout.
    pub listen_command: Option<Vec<String>>,

    /// Command that reads text from stdin and plays it as speech.
    pub speak_command: Option<Vec<String>>,

    #[serde(default = "default_listen_timeout")]
    pub listen_timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            listen_command: None,
            speak_command: None,
            listen_timeout_secs: default_listen_timeout(),
        }
    }
}

fn default_listen_timeout() -> u64 {
    5
}
