use serde::{Deserialize, Serialize};

use crate::bookmarks::BookmarkStore;
use crate::catalog::{Manual, OutlineEntry};
use crate::formats::{Bookmark, ManualType, Section, User};
use crate::navigator::Navigator;
use crate::search::Fragment;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub authenticated: bool,
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManualSummary {
    pub manual_type: ManualType,
    pub id: String,
    pub title: String,
    pub description: String,
    pub section_count: usize,
}

impl ManualSummary {
    pub fn new(manual_type: ManualType, manual: &Manual) -> Self {
        Self {
            manual_type,
            id: manual.id().to_owned(),
            title: manual.title().to_owned(),
            description: manual.description().to_owned(),
            section_count: manual.sections().len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ManualView {
    #[serde(flatten)]
    pub summary: ManualSummary,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlineRow {
    pub id: String,
    pub title: String,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
}

impl From<OutlineEntry<'_>> for OutlineRow {
    fn from(entry: OutlineEntry<'_>) -> Self {
        Self {
            id: entry.section.id.clone(),
            title: entry.section.title.clone(),
            depth: entry.depth,
            has_children: entry.section.has_children(),
            expanded: entry.expanded,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionRef {
    pub id: String,
    pub title: String,
}

impl From<&Section> for SectionRef {
    fn from(section: &Section) -> Self {
        Self {
            id: section.id.clone(),
            title: section.title.clone(),
        }
    }
}

/// A section as the viewer shows it: position, neighbours and bookmark state.
#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub manual_type: ManualType,
    pub section: Section,
    /// Zero-based position in the manual's section list.
    pub index: usize,
    pub total: usize,
    pub previous: Option<SectionRef>,
    pub next: Option<SectionRef>,
    pub bookmarked: bool,
    /// False when the requested id was unknown and the view fell back.
    pub selected: bool,
}

impl SectionView {
    /// `None` when the navigator has no current section.
    pub fn from_navigator(navigator: &Navigator<'_>, bookmarks: &BookmarkStore) -> Option<Self> {
        let section = navigator.current()?;
        let index = navigator.current_index()?;
        Some(Self {
            manual_type: navigator.manual_type(),
            section: section.clone(),
            index,
            total: navigator.manual().sections().len(),
            previous: navigator.previous_section().map(SectionRef::from),
            next: navigator.next_section().map(SectionRef::from),
            bookmarked: bookmarks.is_bookmarked(&section.id),
            selected: true,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit<'a> {
    pub manual_type: ManualType,
    pub section: &'a Section,
    pub title_fragments: Vec<Fragment<'a>>,
    pub content_fragments: Vec<Fragment<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse<'a> {
    pub query: &'a str,
    pub results: Vec<SearchHit<'a>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddBookmarkRequest {
    #[serde(default)]
    pub manual_type: String,
    pub section_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookmarkChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<Bookmark>,
    pub bookmarked: bool,
    /// How many bookmarks a delete dropped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<usize>,
    /// Set when the change was applied but could not be persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
