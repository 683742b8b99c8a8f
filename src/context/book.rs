use crate::models::{Book, BookPayload};

/// Snapshot of every field of a [`BookContext`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookData {
    pub id: i64,
    pub name: String,
    pub author: String,
    pub published_year: i32,
    pub book_summary: String,
}

/// Partial update for a [`BookContext`].
///
/// `None` leaves the field untouched; `Some("")` does overwrite it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub author: Option<String>,
    pub published_year: Option<i32>,
    pub book_summary: Option<String>,
}

impl From<BookData> for BookPatch {
    fn from(data: BookData) -> Self {
        Self {
            id: Some(data.id),
            name: Some(data.name),
            author: Some(data.author),
            published_year: Some(data.published_year),
            book_summary: Some(data.book_summary),
        }
    }
}

impl From<&Book> for BookPatch {
    fn from(book: &Book) -> Self {
        Self {
            id: Some(book.id),
            name: Some(book.name.clone()),
            author: Some(book.author.clone()),
            published_year: Some(book.published_year),
            book_summary: Some(book.book_summary.clone()),
        }
    }
}

impl From<BookPayload> for BookPatch {
    fn from(payload: BookPayload) -> Self {
        Self {
            id: None,
            name: Some(payload.name),
            author: Some(payload.author),
            published_year: Some(payload.published_year),
            book_summary: Some(payload.book_summary),
        }
    }
}

/// The book a test is working with.
#[derive(Debug, Default)]
pub struct BookContext {
    data: BookData,
}

impl BookContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> i64 {
        self.data.id
    }

    pub fn set_id(&mut self, id: i64) {
        self.data.id = id;
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.data.name = name.into();
    }

    pub fn author(&self) -> &str {
        &self.data.author
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.data.author = author.into();
    }

    pub fn published_year(&self) -> i32 {
        self.data.published_year
    }

    pub fn set_published_year(&mut self, year: i32) {
        self.data.published_year = year;
    }

    pub fn book_summary(&self) -> &str {
        &self.data.book_summary
    }

    pub fn set_book_summary(&mut self, summary: impl Into<String>) {
        self.data.book_summary = summary.into();
    }

    pub fn data(&self) -> BookData {
        self.data.clone()
    }

    /// Applies the fields present in `patch`.
    pub fn set_data(&mut self, patch: BookPatch) {
        if let Some(id) = patch.id {
            self.data.id = id;
        }
        if let Some(name) = patch.name {
            self.data.name = name;
        }
        if let Some(author) = patch.author {
            self.data.author = author;
        }
        if let Some(year) = patch.published_year {
            self.data.published_year = year;
        }
        if let Some(summary) = patch.book_summary {
            self.data.book_summary = summary;
        }
    }

    /// Request body built from the current fields.
    pub fn payload(&self) -> BookPayload {
        BookPayload {
            name: self.data.name.clone(),
            author: self.data.author.clone(),
            published_year: self.data.published_year,
            book_summary: self.data.book_summary.clone(),
        }
    }

    pub fn clear(&mut self) {
        self.data = BookData::default();
    }
}
