//! Newtypes for remote identifiers and upsert field masks

use std::fmt::{self, Display, Formatter};
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// FileId
// ============================================================================

/// Identifier assigned by the remote service to a file or directory
///
/// Identifiers double as index file names, so they are restricted to
/// characters that are safe in a single path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileId(String);

impl FileId {
    /// Create a new FileId
    ///
    /// # Errors
    /// Returns error if the identifier is empty or contains characters
    /// other than ASCII alphanumerics, `-`, `_`, `!` and `.`
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::InvalidId("File ID cannot be empty".to_string()));
        }

        if id == "." || id == ".." {
            return Err(DomainError::InvalidId(format!("Reserved file ID: {id}")));
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '!' | '.'))
        {
            return Err(DomainError::InvalidId(format!(
                "File ID contains invalid characters: {id}"
            )));
        }

        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FileId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for FileId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<FileId> for String {
    fn from(id: FileId) -> Self {
        id.0
    }
}

// ============================================================================
// FieldMask
// ============================================================================

/// Set of metadata fields an upsert is allowed to compare and update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldMask(u8);

impl FieldMask {
    /// File content (and therefore size and checksum)
    pub const CONTENT: FieldMask = FieldMask(0b001);
    /// Modification time
    pub const MOD_TIME: FieldMask = FieldMask(0b010);
    /// Name / location
    pub const NAME: FieldMask = FieldMask(0b100);
    /// Every field
    pub const ALL: FieldMask = FieldMask(0b111);
    /// No field
    pub const NONE: FieldMask = FieldMask(0);

    /// Returns true if every field of `other` is part of this mask
    #[must_use]
    pub fn contains(self, other: FieldMask) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for FieldMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for FieldMask {
    type Output = FieldMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        FieldMask(self.0 | rhs.0)
    }
}
