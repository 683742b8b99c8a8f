//! Paths of the book-catalog service under test.
//!
//! When API routes change, update only this file.

pub const HEALTH: &str = "/health";
pub const SIGNUP: &str = "/signup";
pub const LOGIN: &str = "/login";

/// Collection path, used both to list and to create books.
pub const BOOKS: &str = "/books/";

/// Path of a single book, used to get, update and delete it.
pub fn book(id: impl std::fmt::Display) -> String {
    format!("/books/{}", id)
}
