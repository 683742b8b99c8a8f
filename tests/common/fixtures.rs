//! Fixture helpers shared by the end-to-end tests

use book_api_suite::context::ResourceKind;
use book_api_suite::models::{Book, BookPayload};
use book_api_suite::{data, Fixture, Result};
use reqwest::StatusCode;

/// Signs up a fresh user into the fixture's user context and logs in.
///
/// The account is recorded in the cleanup registry for bookkeeping.
pub async fn sign_in(fx: &mut Fixture) -> Result<()> {
    data::populate_user_context(&mut fx.user, None);
    let response = fx.client.signup(&fx.user.credentials()).await?;
    book_api_suite::assertions::assert_status(&response, StatusCode::OK, "Signup")?;
    fx.cleanup
        .record(fx.user.email().to_string(), ResourceKind::User);

    let (email, password) = (fx.user.email().to_string(), fx.user.password().to_string());
    fx.auth.login(&fx.client, &email, &password).await?;
    fx.user.set_auth_token(fx.auth.token().to_string());
    Ok(())
}

/// Creates `payload` with the fixture's token and records it for teardown.
pub async fn create_book(fx: &mut Fixture, payload: &BookPayload) -> Result<Book> {
    let auth = fx.auth.auth_header();
    let response = fx.client.create_book(payload, Some(&auth)).await?;
    book_api_suite::assertions::assert_status(&response, StatusCode::OK, "Create Book")?;
    let book: Book = response.json()?;
    fx.cleanup.record(book.id.to_string(), ResourceKind::Book);
    Ok(book)
}
