pub mod gemini;
pub mod providers;
pub mod speech;

pub use gemini::GeminiProvider;
pub use providers::{GenerationProvider, GenerationRequest, GenerationResponse, ImagePayload, Usage};
pub use speech::{CommandSpeech, SpeechService};
