use crate::models::UserPayload;

/// Snapshot of every field of a [`UserContext`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserData {
    pub email: String,
    pub password: String,
    pub auth_token: String,
}

/// Partial update for a [`UserContext`]; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password: Option<String>,
    pub auth_token: Option<String>,
}

impl From<UserData> for UserPatch {
    fn from(data: UserData) -> Self {
        Self {
            email: Some(data.email),
            password: Some(data.password),
            auth_token: Some(data.auth_token),
        }
    }
}

impl From<UserPayload> for UserPatch {
    fn from(payload: UserPayload) -> Self {
        Self {
            email: Some(payload.email),
            password: Some(payload.password),
            auth_token: None,
        }
    }
}

/// The account a test signs up or logs in with.
#[derive(Debug, Default)]
pub struct UserContext {
    data: UserData,
}

impl UserContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn email(&self) -> &str {
        &self.data.email
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.data.email = email.into();
    }

    pub fn password(&self) -> &str {
        &self.data.password
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.data.password = password.into();
    }

    pub fn auth_token(&self) -> &str {
        &self.data.auth_token
    }

    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        self.data.auth_token = token.into();
    }

    pub fn data(&self) -> UserData {
        self.data.clone()
    }

    pub fn set_data(&mut self, patch: UserPatch) {
        if let Some(email) = patch.email {
            self.data.email = email;
        }
        if let Some(password) = patch.password {
            self.data.password = password;
        }
        if let Some(token) = patch.auth_token {
            self.data.auth_token = token;
        }
    }

    /// Signup/login body for the current credentials.
    pub fn credentials(&self) -> UserPayload {
        UserPayload {
            email: self.data.email.clone(),
            password: self.data.password.clone(),
        }
    }

    pub fn clear(&mut self) {
        self.data = UserData::default();
    }
}
