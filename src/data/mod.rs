//! Generators for test payloads.
//!
//! Everything here is a plain function; the only shared state is the counter
//! that keeps generated emails and names unique within the process.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;

use crate::context::{BookContext, BookPatch, UserContext, UserPatch};
use crate::models::{BookPayload, UserPayload};

/// Password meeting the service's policy (length, upper, lower, digit, special).
pub const DEFAULT_PASSWORD: &str = "StrongPassword123!";

/// Publication year of generated valid books.
pub const DEFAULT_PUBLISHED_YEAR: i32 = 2024;

static UNIQUE_COUNTER: AtomicU64 = AtomicU64::new(0);

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Fields to force on a generated book; `None` keeps the generated value.
#[derive(Debug, Clone, Default)]
pub struct BookOverrides {
    pub name: Option<String>,
    pub author: Option<String>,
    pub published_year: Option<i32>,
    pub book_summary: Option<String>,
}

/// Fields to force on a generated user; `None` keeps the generated value.
#[derive(Debug, Clone, Default)]
pub struct UserOverrides {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `<counter><4 random digits>`: unique because the counter is, and the fixed
/// width of the random part keeps distinct counters from running together.
fn unique_token() -> String {
    let n = UNIQUE_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    let random: u32 = rand::rng().random_range(0..10_000);
    format!("{}{:04}", n, random)
}

/// An email distinct from every other one generated in this process.
///
/// Format: `test-<timestamp ms>-<digits>@example.com`.
pub fn unique_email() -> String {
    format!(
        "test-{}-{}@example.com",
        Utc::now().timestamp_millis(),
        unique_token()
    )
}

pub fn valid_user() -> UserPayload {
    UserPayload {
        email: unique_email(),
        password: DEFAULT_PASSWORD.to_string(),
    }
}

pub fn valid_book() -> BookPayload {
    let suffix = format!("{}_{}", Utc::now().timestamp_millis(), unique_token());
    BookPayload {
        name: format!("Test Book {}", suffix),
        author: format!("Test Author {}", suffix),
        published_year: DEFAULT_PUBLISHED_YEAR,
        book_summary: format!("Test book summary {}", suffix),
    }
}

/// A fresh valid book with `overrides` applied on top.
pub fn book_with_overrides(overrides: BookOverrides) -> BookPayload {
    let book = valid_book();
    BookPayload {
        name: overrides.name.unwrap_or(book.name),
        author: overrides.author.unwrap_or(book.author),
        published_year: overrides.published_year.unwrap_or(book.published_year),
        book_summary: overrides.book_summary.unwrap_or(book.book_summary),
    }
}

/// Empty strings and a negative year.
pub fn invalid_book() -> BookPayload {
    BookPayload {
        name: String::new(),
        author: String::new(),
        published_year: -1,
        book_summary: String::new(),
    }
}

/// Malformed email and a password below the policy.
pub fn invalid_user() -> UserPayload {
    UserPayload {
        email: "invalid-email".to_string(),
        password: "123".to_string(),
    }
}

/// `count` valid books, each with its own unique text and year.
pub fn test_books(count: usize) -> Vec<BookPayload> {
    (1..=count)
        .map(|i| {
            let suffix = format!("{}_{}", Utc::now().timestamp_millis(), unique_token());
            BookPayload {
                name: format!("Test Book {} {}", i, suffix),
                author: format!("Test Author {} {}", i, suffix),
                published_year: 2020 + i as i32,
                book_summary: format!("Test book summary {} {}", i, suffix),
            }
        })
        .collect()
}

pub fn test_users(count: usize) -> Vec<UserPayload> {
    (0..count).map(|_| valid_user()).collect()
}

/// Very long strings and an extreme year, for boundary tests.
pub fn edge_case_book() -> BookPayload {
    BookPayload {
        name: "A".repeat(1000),
        author: "B".repeat(500),
        published_year: 9999,
        book_summary: "C".repeat(2000),
    }
}

/// Symbols, accented letters and emoji.
pub fn special_character_book() -> BookPayload {
    BookPayload {
        name: "Test Book with Special Chars: !@#$%^&*()".to_string(),
        author: "Author with Unicode: José María García".to_string(),
        published_year: DEFAULT_PUBLISHED_YEAR,
        book_summary: "Summary with emojis: 📚📖✨ and symbols: ©®™".to_string(),
    }
}

/// Fills the book context with a generated book, honoring `overrides`.
pub fn populate_book_context(ctx: &mut BookContext, overrides: Option<BookOverrides>) {
    let book = book_with_overrides(overrides.unwrap_or_default());
    ctx.set_data(BookPatch::from(book));
}

/// Fills the user context with generated credentials, honoring `overrides`.
pub fn populate_user_context(ctx: &mut UserContext, overrides: Option<UserOverrides>) {
    let overrides = overrides.unwrap_or_default();
    let user = valid_user();
    ctx.set_data(UserPatch {
        email: Some(overrides.email.unwrap_or(user.email)),
        password: Some(overrides.password.unwrap_or(user.password)),
        auth_token: None,
    });
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// At least 8 characters with upper, lower, digit and one of `!@#$%^&*`.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| "!@#$%^&*".contains(c))
}

pub fn is_valid_id(id: i64) -> bool {
    id > 0
}
