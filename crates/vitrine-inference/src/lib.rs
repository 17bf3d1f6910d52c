//! # vitrine-inference
//!
//! Text-generation providers for vitrine.
//!
//! This crate provides:
//! - An OpenAI-compatible backend (Pollinations gateway and OpenAI)
//! - A Gemini `generateContent` backend
//! - Provider settings read from the settings store with env fallbacks
//! - [`FallbackChain`], which tries providers in order and reports every
//!   failure when none of them answers
//!
//! Every backend implements [`GenerationBackend`], so callers can swap the
//! chain for a single provider or a mock.

pub mod chain;
pub mod error;
pub mod gemini;
pub mod openai;
pub mod provider;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use vitrine_core::*;

pub use chain::FallbackChain;
pub use error::GenerationError;
pub use gemini::{GeminiBackend, GeminiConfig};
pub use openai::{OpenAIBackend, OpenAIConfig};
pub use provider::{ProviderCapability, ProviderConfig, ProviderKind, ProviderSettings};
