use std::path::{Path, PathBuf};
use std::sync::Arc;

use nutrigenie_common::{Error, Result};
use nutrigenie_config::AppConfig;
use nutrigenie_providers::{GeminiProvider, GenerationProvider};
use tracing::info;

/// Resolve an API key using the priority chain: config -> env vars.
fn resolve_api_key(config_key: Option<&str>, env_vars: &[&str]) -> Option<String> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Some(key.to_string());
    }

    env_vars.iter().find_map(|var| std::env::var(var).ok())
}

/// Build the configured generation provider.
pub fn build_provider(config: &AppConfig) -> Result<Arc<dyn GenerationProvider>> {
    match config.provider.provider.as_str() {
        "gemini" => {
            let api_key = resolve_api_key(
                config.provider.api_key.as_deref(),
                &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            )
            .ok_or_else(|| {
                Error::Config(
                    "no gemini API key (set provider.api_key in config or the GEMINI_API_KEY env var)"
                        .into(),
                )
            })?;

            let provider = GeminiProvider::new(
                api_key,
                config.provider.model.clone(),
                config.provider.base_url.clone(),
            );
            info!("configured gemini provider");
            Ok(Arc::new(provider))
        }
        other => Err(Error::Config(format!(
            "unknown generation provider type: {other}"
        ))),
    }
}

/// Path of the search-history database under the data directory.
pub fn history_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("nutrigenie.db")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutrigenie_config::AppConfig;

    #[test]
    fn build_provider_uses_config_api_key() {
        let mut config = AppConfig::default();
        config.provider.api_key = Some("from-config".to_string());

        let provider = build_provider(&config).expect("gemini provider should build");
        assert_eq!(provider.provider_id(), "gemini");
    }

    #[test]
    fn build_provider_rejects_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider.provider = "palm".to_string();
        config.provider.api_key = Some("key".to_string());

        assert!(build_provider(&config).is_err());
    }

    #[test]
    fn history_db_path_is_under_data_dir() {
        let path = history_db_path(Path::new("/var/lib/nutrigenie"));
        assert_eq!(path, PathBuf::from("/var/lib/nutrigenie/nutrigenie.db"));
    }
}
