//! Per-test fixture: fresh contexts, a bound client and guaranteed teardown.
//!
//! # Example
//!
//! ```no_run
//! use book_api_suite::context::ResourceKind;
//! use book_api_suite::{data, ApiClient, Fixture, SuiteSettings};
//!
//! # async fn example() -> book_api_suite::Result<()> {
//! let client = ApiClient::from_settings(&SuiteSettings::for_base_url("http://127.0.0.1:8000"))?;
//! Fixture::run(client, |fx| {
//!     Box::pin(async move {
//!         data::populate_book_context(&mut fx.book, None);
//!         let auth = fx.auth.auth_header();
//!         let response = fx.client.create_book(&fx.book.payload(), Some(&auth)).await?;
//!         let book: book_api_suite::models::Book = response.json()?;
//!         fx.cleanup.record(book.id.to_string(), ResourceKind::Book);
//!         Ok(())
//!     })
//! })
//! .await
//! # }
//! ```

use std::panic::AssertUnwindSafe;

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::StatusCode;
use tracing::{debug, error, warn};

use crate::assertions::{assert_status, Annotations};
use crate::client::{bearer, ApiClient};
use crate::config::SuiteSettings;
use crate::context::{
    AuthContext, AuthPatch, BookContext, CleanupEntry, CleanupRegistry, ResourceKind, UserContext,
    UserPatch,
};
use crate::data;
use crate::error::{Result, SuiteError};

/// Everything one test owns.
pub struct Fixture {
    pub client: ApiClient,
    pub book: BookContext,
    pub user: UserContext,
    pub auth: AuthContext,
    pub cleanup: CleanupRegistry,
    pub annotations: Annotations,
}

impl Fixture {
    pub fn with_client(client: ApiClient) -> Self {
        Self {
            client,
            book: BookContext::new(),
            user: UserContext::new(),
            auth: AuthContext::new(),
            cleanup: CleanupRegistry::new(),
            annotations: Annotations::new(),
        }
    }

    /// Builds a fixture whose client is bound to the resolved base URL.
    pub fn provision(settings: &SuiteSettings) -> Result<Self> {
        Ok(Self::with_client(ApiClient::from_settings(settings)?))
    }

    /// Runs `body` against a fresh fixture, then always tears it down.
    ///
    /// Teardown runs whether the body succeeds, returns an error or panics;
    /// a panic is resumed once teardown is done. A body error takes
    /// precedence over a teardown error, and a teardown error fails an
    /// otherwise passing body.
    pub async fn run<T, F>(client: ApiClient, body: F) -> Result<T>
    where
        F: for<'a> FnOnce(&'a mut Fixture) -> BoxFuture<'a, Result<T>>,
    {
        let mut fixture = Fixture::with_client(client);
        let outcome = AssertUnwindSafe(body(&mut fixture)).catch_unwind().await;
        let teardown = fixture.teardown().await;

        match outcome {
            Err(panic) => {
                if let Err(e) = teardown {
                    error!("Teardown after panic failed: {}", e);
                }
                std::panic::resume_unwind(panic)
            }
            Ok(Err(e)) => {
                if let Err(teardown_err) = teardown {
                    error!("Teardown after failed test also failed: {}", teardown_err);
                }
                Err(e)
            }
            Ok(Ok(value)) => teardown.map(|_| value),
        }
    }

    /// Deletes recorded books oldest first, then resets every context.
    ///
    /// User entries stay in place: the service has no endpoint to remove
    /// accounts. Every book is attempted; the first failure is returned.
    pub async fn teardown(&mut self) -> Result<()> {
        let entries = self.cleanup.take_sorted();
        let deleted_book_id = self.cleanup.deleted_book_id();
        let authorization = self
            .auth
            .is_authenticated()
            .then(|| self.auth.auth_header());

        let mut first_failure = None;
        for entry in entries {
            match entry.kind {
                ResourceKind::Book => {
                    if deleted_book_id.is_some_and(|id| id.to_string() == entry.id) {
                        debug!("Book {} already deleted by the test", entry.id);
                        continue;
                    }
                    if let Err(e) = self.delete_book_entry(&entry, authorization.as_deref()).await
                    {
                        error!("{}", e);
                        first_failure.get_or_insert(e);
                    }
                }
                _ => debug!("Leaving {} {} in place", entry.kind, entry.id),
            }
        }

        self.reset();
        match first_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn delete_book_entry(&self, entry: &CleanupEntry, authorization: Option<&str>) -> Result<()> {
        let failure = |reason: String| SuiteError::CleanupFailure {
            id: entry.id.clone(),
            kind: entry.kind.clone(),
            reason,
        };

        let response = self
            .client
            .delete_book(&entry.id, authorization)
            .await
            .map_err(|e| failure(e.to_string()))?;

        // Already gone counts as cleaned up
        if response.ok() || response.status() == StatusCode::NOT_FOUND {
            debug!("Deleted book {} ({})", entry.id, response.status());
            Ok(())
        } else {
            Err(failure(format!(
                "DELETE returned {}: {}",
                response.status(),
                response.text()
            )))
        }
    }

    /// Clears every context and the cleanup registry.
    pub fn reset(&mut self) {
        self.book.clear();
        self.user.clear();
        self.auth.clear();
        self.cleanup.clear();
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        if !self.cleanup.is_empty() {
            let leaked: Vec<String> = self
                .cleanup
                .entries()
                .iter()
                .map(|e| format!("{} {}", e.kind, e.id))
                .collect();
            warn!("Fixture dropped without teardown, leaking: {}", leaked.join(", "));
        }
        self.reset();
    }
}

/// An account shared by the steps of a serial group.
///
/// Owned by the group rather than by any single fixture; each step copies
/// the token into its own fixture with [`SharedSession::apply_to`].
#[derive(Debug, Clone)]
pub struct SharedSession {
    pub email: String,
    pub password: String,
    pub token: String,
}

impl SharedSession {
    /// Signs up a fresh user and logs in.
    pub async fn establish(client: &ApiClient) -> Result<Self> {
        let mut user = UserContext::new();
        data::populate_user_context(&mut user, None);

        let response = client.signup(&user.credentials()).await?;
        assert_status(&response, StatusCode::OK, "Signup shared user")?;

        let mut auth = AuthContext::new();
        auth.login(client, user.email(), user.password()).await?;

        Ok(Self {
            email: user.email().to_string(),
            password: user.password().to_string(),
            token: auth.token().to_string(),
        })
    }

    pub fn auth_header(&self) -> String {
        bearer(&self.token)
    }

    pub fn apply_to(&self, fixture: &mut Fixture) {
        fixture.auth.set_data(AuthPatch {
            token: Some(self.token.clone()),
        });
        fixture.user.set_data(UserPatch {
            email: Some(self.email.clone()),
            password: Some(self.password.clone()),
            auth_token: Some(self.token.clone()),
        });
    }
}
