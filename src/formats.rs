use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which of the two manuals a view or bookmark refers to.
///
/// Any value other than `"technical"` resolves to the user handbook, both when
/// parsed from a view parameter and when read back from a stored bookmark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ManualType {
    #[default]
    User,
    Technical,
}

impl ManualType {
    pub const ALL: [ManualType; 2] = [ManualType::User, ManualType::Technical];

    #[must_use]
    pub fn from_param(value: &str) -> Self {
        if value == "technical" {
            Self::Technical
        } else {
            Self::User
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Technical => "technical",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::User => "User Handbook",
            Self::Technical => "Technical Manual",
        }
    }
}

impl From<String> for ManualType {
    fn from(value: String) -> Self {
        Self::from_param(&value)
    }
}

impl std::fmt::Display for ManualType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A titled node in a manual's outline.
///
/// `parent_id` and `child_ids` are lookups into the owning manual's section
/// list, never owning links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_ids: Vec<String>,
}

impl Section {
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.child_ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualDoc {
    pub id: String,
    pub title: String,
    pub description: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDoc {
    pub user: ManualDoc,
    pub technical: ManualDoc,
}

/// Snapshot of a section taken when it was bookmarked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub manual_type: ManualType,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
}

/// Stored login; presence of the blob means authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
}
