//! Book Catalog API Suite Library
//!
//! Fixtures, contexts, data generators and assertion helpers for testing the
//! book-catalog HTTP service (signup, login and books CRUD).

pub mod assertions;
pub mod client;
pub mod config;
pub mod context;
pub mod data;
pub mod endpoints;
pub mod error;
pub mod fixture;
pub mod models;
pub mod run_metadata;

// Re-export commonly used types for convenience
pub use client::{ApiClient, ApiResponse, RequestOptions};
pub use config::{ConfigKey, ConfigStore, EnvOverrides, SuiteSettings};
pub use error::{Result, SuiteError};
pub use fixture::{Fixture, SharedSession};
