//! # Backstage
//!
//! Backend for a band-management application: musicians register, form
//! bands, and manage who can do what inside each band.
//!
//! ## Architecture
//!
//! - **domain**: core models and store contracts (users, bands, membership)
//! - **infrastructure**: SeaORM entities, migrations and repositories
//! - **auth**: password hashing, JWT session tokens, the session-resolving
//!   middleware and the band-scoped authorization guards
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: the error taxonomy used across layers

pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::http::create_api_router;
