//! relay-providers: OpenAI-style and Gemini-style adapters, the
//! fallback router, and the embedding router.

pub mod common;
pub mod embeddings;
pub mod error;
pub mod gemini;
pub mod openai;
pub mod router;

pub use embeddings::{embed, EmbeddingResult};
pub use error::{ProviderError, ProviderResult};
pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;
pub use router::ProviderRouter;
