use std::fmt;

use chrono::Utc;

/// Kind of remote resource a test created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Book,
    /// Recorded for bookkeeping only; the service has no user deletion endpoint.
    User,
    Other(String),
}

impl ResourceKind {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceKind::Book => "book",
            ResourceKind::User => "user",
            ResourceKind::Other(kind) => kind,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ResourceKind {
    fn from(kind: &str) -> Self {
        match kind {
            "book" => ResourceKind::Book,
            "user" => ResourceKind::User,
            other => ResourceKind::Other(other.to_string()),
        }
    }
}

/// One remote resource created during a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupEntry {
    pub id: String,
    pub kind: ResourceKind,
    /// Creation time in Unix milliseconds.
    pub created_at_ms: i64,
}

/// Resources a test created, in recording order, for teardown.
///
/// Entries are not sorted on insert. Teardown sorts them by creation time
/// (stable, so equal timestamps keep their recording order) before deleting.
#[derive(Debug, Default)]
pub struct CleanupRegistry {
    entries: Vec<CleanupEntry>,
    deleted_book_id: Option<i64>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a resource created now.
    pub fn record(&mut self, id: impl Into<String>, kind: ResourceKind) {
        self.record_at(id, kind, Utc::now().timestamp_millis());
    }

    /// Records a resource with an explicit creation time.
    pub fn record_at(&mut self, id: impl Into<String>, kind: ResourceKind, created_at_ms: i64) {
        self.entries.push(CleanupEntry {
            id: id.into(),
            kind,
            created_at_ms,
        });
    }

    /// Marks a book as already removed by the test itself.
    pub fn record_deleted_book(&mut self, id: i64) {
        self.deleted_book_id = Some(id);
    }

    pub fn deleted_book_id(&self) -> Option<i64> {
        self.deleted_book_id
    }

    /// Copy of the entries in their current order.
    pub fn entries(&self) -> Vec<CleanupEntry> {
        self.entries.clone()
    }

    pub fn sort_by_timestamp(&mut self) {
        self.entries.sort_by_key(|entry| entry.created_at_ms);
    }

    /// Sorts and removes every entry, leaving the deleted marker in place.
    pub fn take_sorted(&mut self) -> Vec<CleanupEntry> {
        self.sort_by_timestamp();
        std::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.deleted_book_id = None;
    }
}
