//! Checks for the service's error contract.
//!
//! Every helper returns [`SuiteError::AssertionMismatch`] (carrying the
//! received status and body) as soon as the response deviates, and records
//! an informational annotation when it matches.

use reqwest::StatusCode;
use tracing::info;

use crate::client::ApiResponse;
use crate::error::{Result, SuiteError};
use crate::models::{DetailResponse, ValidationErrorResponse};

pub const NOT_AUTHENTICATED: &str = "Not authenticated";
pub const INVALID_TOKEN: &str = "Invalid token or expired token";

/// Details the service may return when a token is rejected.
pub const FORBIDDEN_DETAILS: [&str; 2] = [INVALID_TOKEN, NOT_AUTHENTICATED];

/// A note attached to the running test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub kind: String,
    pub description: String,
}

/// Collects annotations for a test; helpers log instead when none is given.
#[derive(Debug, Default)]
pub struct Annotations {
    items: Vec<Annotation>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: impl Into<String>, description: impl Into<String>) {
        self.items.push(Annotation {
            kind: kind.into(),
            description: description.into(),
        });
    }

    pub fn items(&self) -> &[Annotation] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn report(message: String, sink: Option<&mut Annotations>) {
    match sink {
        Some(sink) => sink.push("info", message),
        None => info!("{}", message),
    }
}

fn expect_status(response: &ApiResponse, expected: StatusCode, operation: &str) -> Result<()> {
    if response.status() != expected {
        return Err(SuiteError::mismatch(
            operation,
            format!("status {}", expected.as_u16()),
            response.status().as_u16(),
            response.text(),
        ));
    }
    Ok(())
}

/// Reads a string `detail` field, failing when the body has another shape.
fn string_detail(response: &ApiResponse, operation: &str) -> Result<String> {
    response
        .json::<DetailResponse>()
        .map(|body| body.detail)
        .map_err(|_| {
            SuiteError::mismatch(
                operation,
                "a string detail",
                response.status().as_u16(),
                response.text(),
            )
        })
}

/// 403 with either of the accepted rejected-token details.
pub fn assert_forbidden(
    response: &ApiResponse,
    operation: &str,
    sink: Option<&mut Annotations>,
) -> Result<()> {
    expect_status(response, StatusCode::FORBIDDEN, operation)?;
    let detail = string_detail(response, operation)?;
    if !FORBIDDEN_DETAILS.contains(&detail.as_str()) {
        return Err(SuiteError::mismatch(
            operation,
            format!("detail in {:?}", FORBIDDEN_DETAILS),
            response.status().as_u16(),
            response.text(),
        ));
    }

    report(
        format!("{} failed as expected with invalid token: {}", operation, detail),
        sink,
    );
    Ok(())
}

/// 403 with "Not authenticated", i.e. no credentials were sent.
pub fn assert_unauthorized(
    response: &ApiResponse,
    operation: &str,
    sink: Option<&mut Annotations>,
) -> Result<()> {
    expect_status(response, StatusCode::FORBIDDEN, operation)?;
    let detail = string_detail(response, operation)?;
    if detail != NOT_AUTHENTICATED {
        return Err(SuiteError::mismatch(
            operation,
            format!("detail {:?}", NOT_AUTHENTICATED),
            response.status().as_u16(),
            response.text(),
        ));
    }

    report(
        format!("{} failed as expected with no token: {}", operation, detail),
        sink,
    );
    Ok(())
}

/// 404 whose detail mentions "not found" in any case.
pub fn assert_not_found(
    response: &ApiResponse,
    operation: &str,
    sink: Option<&mut Annotations>,
) -> Result<()> {
    expect_status(response, StatusCode::NOT_FOUND, operation)?;
    let detail = string_detail(response, operation)?;
    if !detail.to_lowercase().contains("not found") {
        return Err(SuiteError::mismatch(
            operation,
            "detail containing \"not found\"",
            response.status().as_u16(),
            response.text(),
        ));
    }

    report(
        format!("{} failed as expected with not found: {}", operation, detail),
        sink,
    );
    Ok(())
}

/// Exact status check.
pub fn assert_status(response: &ApiResponse, expected: StatusCode, operation: &str) -> Result<()> {
    expect_status(response, expected, operation)
}

/// Exact status and exact string detail.
pub fn assert_detail(
    response: &ApiResponse,
    expected_status: StatusCode,
    expected_detail: &str,
    operation: &str,
) -> Result<()> {
    expect_status(response, expected_status, operation)?;
    let detail = string_detail(response, operation)?;
    if detail != expected_detail {
        return Err(SuiteError::mismatch(
            operation,
            format!("detail {:?}", expected_detail),
            response.status().as_u16(),
            response.text(),
        ));
    }
    Ok(())
}

/// 422 with a list of validation errors; returns the parsed list.
pub fn assert_validation_error(
    response: &ApiResponse,
    operation: &str,
) -> Result<ValidationErrorResponse> {
    expect_status(response, StatusCode::UNPROCESSABLE_ENTITY, operation)?;
    response.json::<ValidationErrorResponse>().map_err(|_| {
        SuiteError::mismatch(
            operation,
            "a list of validation errors",
            response.status().as_u16(),
            response.text(),
        )
    })
}
