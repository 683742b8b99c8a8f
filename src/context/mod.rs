//! Per-test state holders.
//!
//! Every test gets fresh instances from the fixture; none of these types are
//! shared between tests.

mod auth;
mod book;
mod cleanup;
mod user;

pub use auth::{AuthContext, AuthData, AuthPatch};
pub use book::{BookContext, BookData, BookPatch};
pub use cleanup::{CleanupEntry, CleanupRegistry, ResourceKind};
pub use user::{UserContext, UserData, UserPatch};
