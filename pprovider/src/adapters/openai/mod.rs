mod provider;
mod transport;
pub mod wire;

pub use provider::OpenAiProvider;
pub use transport::{OPENAI_BASE_URL, OpenAiHttpTransport, OpenAiTransport, http_client};
pub use wire::{ChatCompletionRequest, ChatCompletionResponse, WireRole};
