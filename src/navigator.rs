use std::collections::HashSet;

use crate::bookmarks::BookmarkStore;
use crate::catalog::{Manual, ManualCatalog, OutlineEntry};
use crate::formats::{ManualType, Section};

/// Per-session viewing state over one manual.
///
/// Previous/next move through [`Manual::sections`] in stored order, not in
/// outline order, and stop at either end.
#[derive(Debug, Clone)]
pub struct Navigator<'m> {
    manual_type: ManualType,
    manual: &'m Manual,
    current: Option<String>,
    expanded: HashSet<String>,
}

impl<'m> Navigator<'m> {
    /// Starts with nothing selected.
    pub fn new(catalog: &'m ManualCatalog, manual_type: ManualType) -> Self {
        Self {
            manual_type,
            manual: catalog.manual(manual_type),
            current: None,
            expanded: HashSet::new(),
        }
    }

    /// Starts on the manual's first section, as the viewer does when opened.
    pub fn open(catalog: &'m ManualCatalog, manual_type: ManualType) -> Self {
        let mut navigator = Self::new(catalog, manual_type);
        navigator.current = navigator.manual.sections().first().map(|s| s.id.clone());
        navigator
    }

    pub fn manual_type(&self) -> ManualType {
        self.manual_type
    }

    pub fn manual(&self) -> &'m Manual {
        self.manual
    }

    /// Selects `id`; unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.manual.contains(id) {
            tracing::debug!(section_id = id, manual = self.manual.id(), "select: unknown section");
            return false;
        }
        self.current = Some(id.to_owned());
        true
    }

    pub fn current(&self) -> Option<&'m Section> {
        let manual = self.manual;
        self.current.as_deref().and_then(|id| manual.section(id))
    }

    /// Position of the current section in the flat section list.
    pub fn current_index(&self) -> Option<usize> {
        self.current
            .as_deref()
            .and_then(|id| self.manual.position(id))
    }

    pub fn has_previous(&self) -> bool {
        self.current_index().is_some_and(|index| index > 0)
    }

    pub fn has_next(&self) -> bool {
        self.current_index()
            .is_some_and(|index| index + 1 < self.manual.sections().len())
    }

    pub fn previous_section(&self) -> Option<&'m Section> {
        let index = self.current_index()?;
        index
            .checked_sub(1)
            .and_then(|prev| self.manual.sections().get(prev))
    }

    pub fn next_section(&self) -> Option<&'m Section> {
        let index = self.current_index()?;
        self.manual.sections().get(index + 1)
    }

    /// Moves to the following section; returns whether the selection moved.
    pub fn next(&mut self) -> bool {
        match self.next_section() {
            Some(section) => {
                self.current = Some(section.id.clone());
                true
            }
            None => false,
        }
    }

    /// Moves to the preceding section; returns whether the selection moved.
    pub fn previous(&mut self) -> bool {
        match self.previous_section() {
            Some(section) => {
                self.current = Some(section.id.clone());
                true
            }
            None => false,
        }
    }

    /// Flips whether `id` is expanded and returns the new state.
    pub fn toggle_expand(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_owned());
            true
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn expand_all(&mut self) {
        self.expanded = self
            .manual
            .sections()
            .iter()
            .filter(|section| section.has_children())
            .map(|section| section.id.clone())
            .collect();
    }

    pub fn expanded(&self) -> &HashSet<String> {
        &self.expanded
    }

    pub fn outline(&self) -> Vec<OutlineEntry<'m>> {
        self.manual.outline(&self.expanded)
    }

    /// Bookmarks or un-bookmarks the current section. `Ok(None)` when nothing
    /// is selected, otherwise whether the section is bookmarked afterwards.
    pub fn toggle_bookmark(&self, bookmarks: &mut BookmarkStore) -> anyhow::Result<Option<bool>> {
        let Some(section) = self.current() else {
            return Ok(None);
        };
        bookmarks.toggle(section, self.manual_type).map(Some)
    }
}
