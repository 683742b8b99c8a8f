use reqwest::StatusCode;
use tracing::debug;

use crate::client::{bearer, ApiClient};
use crate::error::{Result, SuiteError};
use crate::models::TokenResponse;

/// Snapshot of every field of an [`AuthContext`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthData {
    pub token: String,
}

/// Partial update for an [`AuthContext`]; a `None` token is left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthPatch {
    pub token: Option<String>,
}

impl From<AuthData> for AuthPatch {
    fn from(data: AuthData) -> Self {
        Self {
            token: Some(data.token),
        }
    }
}

/// Bearer token used for authenticated book requests.
#[derive(Debug, Default)]
pub struct AuthContext {
    token: String,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs in and keeps the returned `access_token`.
    pub async fn login(&mut self, client: &ApiClient, email: &str, password: &str) -> Result<()> {
        let response = client.login(email, password).await?;
        if response.status() != StatusCode::OK {
            return Err(SuiteError::mismatch(
                "Login",
                "status 200",
                response.status().as_u16(),
                response.text(),
            ));
        }

        let body: TokenResponse = response.json()?;
        if !body.is_bearer() {
            return Err(SuiteError::mismatch(
                "Login",
                "token_type bearer",
                response.status().as_u16(),
                response.text(),
            ));
        }
        if body.access_token.is_empty() {
            return Err(SuiteError::mismatch(
                "Login",
                "a non-empty access_token",
                response.status().as_u16(),
                response.text(),
            ));
        }

        debug!("Logged in as {}", email);
        self.token = body.access_token;
        Ok(())
    }

    /// Value for the `Authorization` header.
    pub fn auth_header(&self) -> String {
        bearer(&self.token)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    pub fn data(&self) -> AuthData {
        AuthData {
            token: self.token.clone(),
        }
    }

    pub fn set_data(&mut self, patch: AuthPatch) {
        if let Some(token) = patch.token {
            self.token = token;
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn clear(&mut self) {
        self.token.clear();
    }
}
