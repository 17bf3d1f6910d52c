//! # vitrine-api
//!
//! WordPress REST v2 compatible HTTP surface for vitrine: posts, media,
//! taxonomies and the static admin user, plus the automation endpoints
//! (pillars, link preview/apply, backlink map, duplicate titles, settings).
//!
//! Reads are public; writes need Basic or Bearer credentials (see [`auth`]).

pub mod auth;
pub mod config;
pub mod error;
pub mod format;
pub mod handlers;
pub mod router;
pub mod state;

pub use auth::Credentials;
pub use config::ApiConfig;
pub use error::ApiError;
pub use router::router;
pub use state::AppState;
