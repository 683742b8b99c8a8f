//! Common test infrastructure
//!
//! Each test spawns an in-process stub of the book-catalog service and points
//! the suite's fixtures at it. Tests should only import from this module.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::TestServer;
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_health() {
//!     let server = TestServer::spawn().await;
//!     let response = server.client().health().await.unwrap();
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

#![allow(dead_code)]

mod fixtures;
mod server;

pub use constants::*;
pub use fixtures::{create_book, sign_in};
pub use server::TestServer;
