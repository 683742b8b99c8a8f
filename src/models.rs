//! Request and response bodies of the book-catalog service.

use serde::{Deserialize, Serialize};

/// Body of `POST /signup` and `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    pub email: String,
    pub password: String,
}

/// Body of `POST /books/` and `PUT /books/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPayload {
    pub name: String,
    pub author: String,
    pub published_year: i32,
    pub book_summary: String,
}

/// A book as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub name: String,
    pub author: String,
    pub published_year: i32,
    pub book_summary: String,
}

impl Book {
    /// Drops the id, leaving the fields a client sends.
    pub fn payload(&self) -> BookPayload {
        BookPayload {
            name: self.name.clone(),
            author: self.author.clone(),
            published_year: self.published_year,
            book_summary: self.book_summary.clone(),
        }
    }

    pub fn matches(&self, payload: &BookPayload) -> bool {
        self.payload() == *payload
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    /// The scheme is compared case-insensitively, as HTTP auth schemes are.
    pub fn is_bearer(&self) -> bool {
        self.token_type.eq_ignore_ascii_case("bearer")
    }
}

/// Error body carrying a plain string detail (auth, not found, conflicts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailResponse {
    pub detail: String,
}

/// One entry of a request-validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "loc_segments")]
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(default)]
    pub input: serde_json::Value,
}

/// Location segments are field names or array/byte positions; positions are
/// kept as their decimal text.
fn loc_segments<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Vec<serde_json::Value> = Vec::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|segment| match segment {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}

/// Error body of a 422 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorResponse {
    pub detail: Vec<ValidationErrorDetail>,
}
