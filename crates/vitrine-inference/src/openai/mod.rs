//! OpenAI-compatible generation backend.
//!
//! Serves both the Pollinations gateway and the OpenAI API itself; they
//! share the `/chat/completions` wire format and Bearer authentication.
//!
//! # Example
//!
//! ```rust,no_run
//! use vitrine_inference::openai::{OpenAIBackend, OpenAIConfig};
//! use vitrine_core::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAIBackend::new(OpenAIConfig::default()).unwrap();
//!     let text = backend
//!         .generate_with_system("Você é um Especialista em SEO.", "Resuma: ...")
//!         .await
//!         .unwrap();
//!     println!("{}", text);
//! }
//! ```

mod backend;
pub mod types;

pub use backend::{OpenAIBackend, OpenAIConfig, DEFAULT_OPENAI_URL, DEFAULT_POLLINATIONS_URL};
