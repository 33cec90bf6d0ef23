pub mod loader;
pub mod model;

pub use loader::ConfigLoader;
pub use model::{AppConfig, FeatureFlags, GatewayConfig, ProviderConfig, SpeechConfig};
