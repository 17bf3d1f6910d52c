//! # vitrine-core
//!
//! Core types, traits, and abstractions for the vitrine CMS.
//!
//! This crate provides the foundational data structures and trait definitions
//! that other vitrine crates depend on.

pub mod defaults;
pub mod error;
pub mod keys;
pub mod logging;
pub mod models;
pub mod text;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use keys::marker_value;
pub use models::*;
pub use traits::*;
