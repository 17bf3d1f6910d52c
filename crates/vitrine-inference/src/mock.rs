//! Mock generation backend for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vitrine_inference::mock::MockGenerationBackend;
//!
//! let backend = MockGenerationBackend::new()
//!     .with_response(Ok("primeira".to_string()))
//!     .with_default_response("padrão");
//! assert_eq!(backend.call_count(), 0);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use vitrine_core::{Error, GenerationBackend, Result};

/// One recorded generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub system: String,
    pub prompt: String,
}

#[derive(Debug)]
struct MockState {
    scripted: VecDeque<Result<String>>,
    default_response: Option<String>,
    failure: Option<String>,
    calls: Vec<MockCall>,
}

/// Generation backend returning scripted replies.
///
/// Scripted replies are consumed in order; afterwards every call gets the
/// default response, or the configured failure.
#[derive(Clone)]
pub struct MockGenerationBackend {
    state: Arc<Mutex<MockState>>,
    model: String,
}

impl MockGenerationBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                scripted: VecDeque::new(),
                default_response: Some("Mock response".to_string()),
                failure: None,
                calls: Vec::new(),
            })),
            model: "mock".to_string(),
        }
    }

    /// Backend whose every call fails with `Inference(message)`.
    pub fn always_fail(message: impl Into<String>) -> Self {
        let backend = Self::new();
        {
            let mut state = backend.lock();
            state.default_response = None;
            state.failure = Some(message.into());
        }
        backend
    }

    /// Queue one reply.
    pub fn with_response(self, response: Result<String>) -> Self {
        self.lock().scripted.push_back(response);
        self
    }

    /// Reply used once the script is exhausted.
    pub fn with_default_response(self, response: impl Into<String>) -> Self {
        {
            let mut state = self.lock();
            state.default_response = Some(response.into());
            state.failure = None;
        }
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(MockCall {
            system: system.to_string(),
            prompt: prompt.to_string(),
        });

        if let Some(next) = state.scripted.pop_front() {
            return next;
        }
        if let Some(message) = &state.failure {
            return Err(Error::Inference(message.clone()));
        }
        Ok(state.default_response.clone().unwrap_or_default())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
