use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Context as _;

use crate::formats::{CatalogDoc, ManualDoc, ManualType, Section};

/// A manual's sections stored as a flat arena with an id index.
///
/// Sections are immutable once the manual is built; parent/child links are
/// resolved through [`Manual::section`].
#[derive(Debug, Clone)]
pub struct Manual {
    id: String,
    title: String,
    description: String,
    sections: Vec<Section>,
    index: HashMap<String, usize>,
}

/// One visible row of a rendered outline.
#[derive(Debug, Clone, Copy)]
pub struct OutlineEntry<'a> {
    pub section: &'a Section,
    pub depth: usize,
    pub expanded: bool,
}

impl Manual {
    pub fn from_doc(doc: ManualDoc) -> anyhow::Result<Self> {
        let mut index = HashMap::with_capacity(doc.sections.len());
        for (position, section) in doc.sections.iter().enumerate() {
            if section.id.trim().is_empty() {
                anyhow::bail!("manual {}: section at position {position} has empty id", doc.id);
            }
            if index.insert(section.id.clone(), position).is_some() {
                anyhow::bail!("manual {}: duplicate section id: {}", doc.id, section.id);
            }
        }

        for section in &doc.sections {
            if section.level == 0 {
                anyhow::bail!("manual {}: section {} has level 0", doc.id, section.id);
            }
            match section.parent_id.as_deref() {
                None if section.level != 1 => {
                    anyhow::bail!(
                        "manual {}: root section {} must have level 1 (got {})",
                        doc.id,
                        section.id,
                        section.level
                    );
                }
                None => {}
                Some(parent_id) => {
                    let parent = index
                        .get(parent_id)
                        .map(|&position| &doc.sections[position])
                        .ok_or_else(|| {
                            anyhow::anyhow!(
                                "manual {}: section {} references unknown parent: {parent_id}",
                                doc.id,
                                section.id
                            )
                        })?;
                    if !parent.child_ids.iter().any(|id| id == &section.id) {
                        anyhow::bail!(
                            "manual {}: parent {parent_id} does not list child {}",
                            doc.id,
                            section.id
                        );
                    }
                    if section.level != parent.level + 1 {
                        anyhow::bail!(
                            "manual {}: section {} has level {} but parent {parent_id} has level {}",
                            doc.id,
                            section.id,
                            section.level,
                            parent.level
                        );
                    }
                }
            }
        }

        Ok(Self {
            id: doc.id,
            title: doc.title,
            description: doc.description,
            sections: doc.sections,
            index,
        })
    }

    #[must_use]
    pub fn to_doc(&self) -> ManualDoc {
        ManualDoc {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            sections: self.sections.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Sections in stored order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.index.get(id).map(|&position| &self.sections[position])
    }

    /// Position of `id` within [`Manual::sections`].
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn roots(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|section| section.level == 1)
    }

    /// Children of `section` in `child_ids` order; ids that do not resolve are skipped.
    pub fn children<'a>(&'a self, section: &'a Section) -> impl Iterator<Item = &'a Section> {
        section.child_ids.iter().filter_map(|id| self.section(id))
    }

    /// Rows of the table of contents, descending only into expanded sections.
    pub fn outline(&self, expanded: &HashSet<String>) -> Vec<OutlineEntry<'_>> {
        let mut rows = Vec::new();
        let mut path = Vec::new();
        for root in self.roots() {
            self.push_outline(root, 0, expanded, &mut path, &mut rows);
        }
        rows
    }

    fn push_outline<'a>(
        &'a self,
        section: &'a Section,
        depth: usize,
        expanded: &HashSet<String>,
        path: &mut Vec<&'a str>,
        rows: &mut Vec<OutlineEntry<'a>>,
    ) {
        // A child list naming one of its own ancestors would recurse forever.
        if path.contains(&section.id.as_str()) {
            return;
        }

        let is_expanded = expanded.contains(&section.id);
        rows.push(OutlineEntry {
            section,
            depth,
            expanded: is_expanded,
        });
        if !is_expanded || !section.has_children() {
            return;
        }

        path.push(section.id.as_str());
        for child in self.children(section) {
            self.push_outline(child, depth + 1, expanded, path, rows);
        }
        path.pop();
    }
}

/// Both manuals, owned by whoever composes the application.
#[derive(Debug, Clone)]
pub struct ManualCatalog {
    user: Manual,
    technical: Manual,
}

impl ManualCatalog {
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_doc(crate::manuals::builtin()).context("build builtin catalog")
    }

    pub fn from_doc(doc: CatalogDoc) -> anyhow::Result<Self> {
        Ok(Self {
            user: Manual::from_doc(doc.user).context("user handbook")?,
            technical: Manual::from_doc(doc.technical).context("technical manual")?,
        })
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let doc: CatalogDoc = serde_yaml::from_str(yaml).context("parse catalog yaml")?;
        Self::from_doc(doc)
    }

    pub fn from_yaml_path(path: &Path) -> anyhow::Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("read catalog: {}", path.display()))?;
        Self::from_yaml_str(&yaml).with_context(|| format!("load catalog: {}", path.display()))
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        let doc = CatalogDoc {
            user: self.user.to_doc(),
            technical: self.technical.to_doc(),
        };
        serde_yaml::to_string(&doc).context("serialize catalog yaml")
    }

    /// Resolves a view parameter; anything but `"technical"` yields the user handbook.
    pub fn get_manual(&self, manual_type: &str) -> &Manual {
        self.manual(ManualType::from_param(manual_type))
    }

    pub fn manual(&self, manual_type: ManualType) -> &Manual {
        match manual_type {
            ManualType::User => &self.user,
            ManualType::Technical => &self.technical,
        }
    }

    pub fn manuals(&self) -> [(ManualType, &Manual); 2] {
        [
            (ManualType::User, &self.user),
            (ManualType::Technical, &self.technical),
        ]
    }

    /// User handbook sections followed by technical manual sections.
    pub fn get_all_sections(&self) -> Vec<&Section> {
        self.user
            .sections()
            .iter()
            .chain(self.technical.sections())
            .collect()
    }

    /// Which manual owns `section_id`; the user handbook wins if both do.
    pub fn manual_type_of(&self, section_id: &str) -> Option<ManualType> {
        self.manuals()
            .into_iter()
            .find(|(_, manual)| manual.contains(section_id))
            .map(|(manual_type, _)| manual_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ManualCatalog {
        ManualCatalog::builtin().expect("builtin catalog is valid")
    }

    fn expanded(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|id| (*id).to_owned()).collect()
    }

    #[test]
    fn builtin_sections_keep_parent_links_symmetric() {
        let catalog = catalog();
        for (_, manual) in catalog.manuals() {
            for section in manual.sections() {
                let Some(parent_id) = section.parent_id.as_deref() else {
                    assert_eq!(section.level, 1, "{}", section.id);
                    continue;
                };
                let parent = manual.section(parent_id).expect("parent exists");
                assert!(parent.child_ids.contains(&section.id));
                assert_eq!(section.level, parent.level + 1);
            }
        }
    }

    #[test]
    fn get_manual_defaults_to_user_handbook() {
        let catalog = catalog();
        assert_eq!(catalog.get_manual("technical").id(), "technical-manual");
        assert_eq!(catalog.get_manual("user").id(), "user-handbook");
        assert_eq!(catalog.get_manual("").id(), "user-handbook");
        assert_eq!(catalog.get_manual("TECHNICAL").id(), "user-handbook");
    }

    #[test]
    fn all_sections_concatenate_user_then_technical() {
        let catalog = catalog();
        let all = catalog.get_all_sections();
        assert_eq!(all.len(), 16);
        assert_eq!(all[0].id, "uh-intro");
        assert_eq!(all[7].id, "uh-maintenance");
        assert_eq!(all[8].id, "tm-architecture");
        assert_eq!(all[15].id, "tm-specifications");
    }

    #[test]
    fn manual_type_of_uses_membership() {
        let catalog = catalog();
        assert_eq!(catalog.manual_type_of("uh-safety"), Some(ManualType::User));
        assert_eq!(catalog.manual_type_of("tm-repair"), Some(ManualType::Technical));
        assert_eq!(catalog.manual_type_of("nope"), None);
    }

    #[test]
    fn collapsed_outline_lists_roots_only() {
        let catalog = catalog();
        let rows = catalog.manual(ManualType::User).outline(&HashSet::new());
        let ids = rows.iter().map(|r| r.section.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["uh-intro", "uh-operation", "uh-maintenance"]);
    }

    #[test]
    fn expanded_outline_descends_into_children() {
        let catalog = catalog();
        let rows = catalog
            .manual(ManualType::User)
            .outline(&expanded(&["uh-operation"]));
        let ids = rows
            .iter()
            .map(|r| (r.section.id.as_str(), r.depth))
            .collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec![
                ("uh-intro", 0),
                ("uh-operation", 0),
                ("uh-startup", 1),
                ("uh-calibration", 1),
                ("uh-monitoring", 1),
                ("uh-maintenance", 0),
            ]
        );
    }

    #[test]
    fn outline_skips_unresolved_children() -> anyhow::Result<()> {
        let mut doc = crate::manuals::user_handbook();
        doc.sections[0].child_ids.push("uh-missing".to_owned());
        let manual = Manual::from_doc(doc)?;

        let rows = manual.outline(&expanded(&["uh-intro"]));
        assert!(rows.iter().all(|r| r.section.id != "uh-missing"));
        assert_eq!(rows.len(), 5);
        Ok(())
    }

    #[test]
    fn outline_stops_at_self_referencing_child_lists() -> anyhow::Result<()> {
        let mut doc = crate::manuals::user_handbook();
        doc.sections[0].child_ids.push("uh-intro".to_owned());
        let manual = Manual::from_doc(doc)?;

        let rows = manual.outline(&expanded(&["uh-intro"]));
        let intro_rows = rows.iter().filter(|r| r.section.id == "uh-intro").count();
        assert_eq!(intro_rows, 1);
        Ok(())
    }

    #[test]
    fn from_doc_rejects_duplicate_ids() {
        let mut doc = crate::manuals::user_handbook();
        doc.sections[1].id = "uh-intro".to_owned();
        let err = Manual::from_doc(doc).unwrap_err();
        assert!(format!("{err:#}").contains("duplicate section id"));
    }

    #[test]
    fn from_doc_rejects_one_sided_parent_link() {
        let mut doc = crate::manuals::user_handbook();
        doc.sections[0].child_ids.retain(|id| id != "uh-safety");
        let err = Manual::from_doc(doc).unwrap_err();
        assert!(format!("{err:#}").contains("does not list child uh-safety"));
    }

    #[test]
    fn from_doc_rejects_level_skips() {
        let mut doc = crate::manuals::technical_manual();
        doc.sections[1].level = 3;
        let err = Manual::from_doc(doc).unwrap_err();
        assert!(format!("{err:#}").contains("has level 3"));
    }

    #[test]
    fn yaml_dump_loads_back_to_the_same_catalog() -> anyhow::Result<()> {
        let catalog = catalog();
        let yaml = catalog.to_yaml()?;
        let reloaded = ManualCatalog::from_yaml_str(&yaml)?;
        assert_eq!(
            reloaded.manual(ManualType::Technical).to_doc(),
            catalog.manual(ManualType::Technical).to_doc()
        );
        Ok(())
    }
}
