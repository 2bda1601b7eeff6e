//! Record models.
//!
//! A record is an opaque content item owned by the host store. The privacy
//! tooling only ever reads its identifier and its metadata values.

use derive_more::Display;
use std::collections::BTreeMap;

/// Unique numeric identifier of a record.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
pub struct RecordId(pub u64);
impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Publication status of a record.
///
/// Statuses are free-form strings in the host store (applications register
/// their own), so this only knows about the handful that change query
/// visibility.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
pub struct Status(String);
impl Status {
    pub const PUBLISH: &'static str = "publish";
    pub const PRIVATE: &'static str = "private";
    pub const TRASH: &'static str = "trash";
    pub const AUTO_DRAFT: &'static str = "auto-draft";

    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether an "any status" query includes records with this status.
    ///
    /// Trashed records and automatic drafts are excluded from "any", they
    /// must be asked for by name.
    pub fn is_included_in_any(&self) -> bool {
        !matches!(self.0.as_str(), Self::TRASH | Self::AUTO_DRAFT)
    }

    /// Whether reading a record with this status requires private access.
    pub fn is_private(&self) -> bool {
        self.0 == Self::PRIVATE
    }
}
impl Default for Status {
    fn default() -> Self {
        Self::new(Self::PUBLISH)
    }
}
impl From<&str> for Status {
    fn from(status: &str) -> Self {
        Self::new(status)
    }
}

/// A content item and its metadata.
///
/// # Examples
///
/// ```
/// use wcpt_store::Record;
///
/// let record = Record::new(7, "wordcamp")
///     .with_status("wcpt-needs-vetting")
///     .with_meta("Email Address", "organizer@example.org");
/// assert_eq!(record.meta("Email Address"), "organizer@example.org");
/// assert_eq!(record.meta("Telephone"), "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    pub id: RecordId,
    pub post_type: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: Status,
    #[cfg_attr(feature = "serde", serde(default))]
    pub meta: BTreeMap<String, String>,
}
impl Record {
    pub fn new(id: u64, post_type: impl Into<String>) -> Self {
        Self {
            id: RecordId(id),
            post_type: post_type.into(),
            status: Status::default(),
            meta: BTreeMap::new(),
        }
    }

    pub fn with_status(mut self, status: impl Into<Status>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Metadata value for `key`, or an empty string when absent.
    pub fn meta(&self, key: &str) -> &str {
        self.meta.get(key).map(String::as_str).unwrap_or_default()
    }
}
