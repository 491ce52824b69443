use chrono::{DateTime, TimeZone};

use crate::bookmarks::BookmarkStore;
use crate::catalog::ManualCatalog;
use crate::formats::{Bookmark, ManualType, Section, User};
use crate::navigator::Navigator;
use crate::search::mark;

pub const PREVIEW_CHARS: usize = 200;
const MARK_OPEN: &str = "[";
const MARK_CLOSE: &str = "]";

pub fn dashboard(catalog: &ManualCatalog, user: Option<&User>, bookmarks: &BookmarkStore) -> String {
    let mut out = String::new();
    out.push_str("Radar Manual Viewer\n");
    if let Some(user) = user {
        out.push_str(&format!("Logged in as {}\n", user.username));
    }
    out.push('\n');

    for (manual_type, manual) in catalog.manuals() {
        out.push_str(&format!("{} ({manual_type})\n", manual_type.display_name()));
        out.push_str(&format!("  {}\n", manual.description()));
        out.push_str(&format!("  {}\n", plural(manual.sections().len(), "section")));
    }
    out.push('\n');
    out.push_str(&format!(
        "{} saved\n",
        plural(bookmarks.bookmarks().len(), "bookmark")
    ));
    out
}

pub fn manual_dashboard(catalog: &ManualCatalog, manual_type: ManualType, user: Option<&User>) -> String {
    let manual = catalog.manual(manual_type);
    let param = manual_type.as_str();

    let mut out = String::new();
    out.push_str(&format!("{}\n", manual_type.display_name()));
    out.push_str(&format!("{}\n", manual.description()));
    if let Some(user) = user {
        out.push_str(&format!("Logged in as {}\n", user.username));
    }
    out.push('\n');
    let actions = [
        (
            "Open Radar Manual",
            "Browse and read radar system documentation",
            format!("ietm show --type {param}"),
        ),
        (
            "Table of Contents",
            "Outline of every section in this manual",
            format!("ietm toc --type {param}"),
        ),
        (
            "Search Manual",
            "Find specific information across all documents",
            "ietm search <query>".to_owned(),
        ),
        (
            "Bookmarks",
            "Access your saved sections and references",
            "ietm bookmarks list".to_owned(),
        ),
        (
            "Reader",
            "Step through sections interactively",
            format!("ietm read --type {param}"),
        ),
    ];
    for (title, description, command) in actions {
        out.push_str(&format!("{title}\n  {description}\n  $ {command}\n"));
    }
    out
}

/// Table of contents with the current section marked `>` and expandable
/// sections shown as `[+]`/`[-]`.
pub fn outline(navigator: &Navigator<'_>) -> String {
    let manual = navigator.manual();
    let selected = navigator.current().map(|section| section.id.as_str());

    let mut out = String::new();
    out.push_str(&format!("{}\n", manual.title()));
    for row in navigator.outline() {
        let cursor = if selected == Some(row.section.id.as_str()) { '>' } else { ' ' };
        let toggle = match (row.section.has_children(), row.expanded) {
            (false, _) => "   ",
            (true, false) => "[+]",
            (true, true) => "[-]",
        };
        let indent = "  ".repeat(row.depth);
        out.push_str(&format!(
            "{cursor} {indent}{toggle} {}  ({})\n",
            row.section.title, row.section.id
        ));
    }
    out
}

/// The manual viewer's main pane for the current section.
pub fn section(navigator: &Navigator<'_>, bookmarks: &BookmarkStore) -> String {
    let Some(section) = navigator.current() else {
        return "Select a section from the table of contents.\n".to_owned();
    };
    let manual = navigator.manual();
    let total = manual.sections().len();

    let mut out = String::new();
    let marker = if bookmarks.is_bookmarked(&section.id) {
        "Bookmarked"
    } else {
        "Not bookmarked"
    };
    out.push_str(&format!("{}  [{marker}]\n", section.title));
    if let Some(index) = navigator.current_index() {
        out.push_str(&format!(
            "Section {} of {total} - {}\n",
            index + 1,
            navigator.manual_type().display_name()
        ));
    }
    match (&section.document_ref, section.page_number) {
        (Some(document), Some(page)) => {
            out.push_str(&format!("Document: {document}, page {page}\n"));
        }
        (Some(document), None) => out.push_str(&format!("Document: {document}\n")),
        _ => out.push_str("No document available for this section.\n"),
    }
    out.push('\n');
    if let Some(content) = &section.content {
        out.push_str(&format!("{content}\n\n"));
    }

    let prev = navigator
        .previous_section()
        .map(|s| format!("< {} ({})", s.title, s.id))
        .unwrap_or_else(|| "< (first section)".to_owned());
    let next = navigator
        .next_section()
        .map(|s| format!("{} ({}) >", s.title, s.id))
        .unwrap_or_else(|| "(last section) >".to_owned());
    out.push_str(&format!("{prev} | {next}\n"));
    out
}

pub fn search_results(catalog: &ManualCatalog, query: &str, results: &[&Section]) -> String {
    let mut out = String::new();
    if query.trim().is_empty() {
        out.push_str("Enter keywords to find relevant sections in the radar manuals\n");
        return out;
    }

    out.push_str(&format!(
        "{} for \"{query}\"\n",
        plural(results.len(), "result")
    ));
    if results.is_empty() {
        out.push_str("No results found. Try different search terms or check your spelling\n");
        return out;
    }

    for section in results {
        let manual_type = catalog.manual_type_of(&section.id).unwrap_or_default();
        out.push('\n');
        out.push_str(&format!(
            "{}  ({} / {})\n",
            mark(&section.title, query, MARK_OPEN, MARK_CLOSE),
            manual_type.display_name(),
            section.id
        ));
        if let Some(content) = &section.content {
            out.push_str(&format!(
                "  {}\n",
                mark(&preview(content, PREVIEW_CHARS), query, MARK_OPEN, MARK_CLOSE)
            ));
        }
        out.push_str(&open_hint(manual_type, &section.id));
    }
    out
}

pub fn bookmark_list(bookmarks: &[Bookmark]) -> String {
    let mut out = String::new();
    if bookmarks.is_empty() {
        out.push_str("No bookmarks yet\n");
        out.push_str("Start bookmarking important sections while reading the manuals\n");
        return out;
    }

    out.push_str(&format!(
        "{} saved\n",
        plural(bookmarks.len(), "bookmark")
    ));
    for bookmark in bookmarks {
        out.push('\n');
        out.push_str(&format!("{}  ({})\n", bookmark.title, bookmark.id));
        out.push_str(&format!(
            "  {} - Saved {}\n",
            bookmark.manual_type.display_name(),
            format_saved_at(&bookmark.created_at.with_timezone(&chrono::Local))
        ));
        if !bookmark.content.is_empty() {
            out.push_str(&format!("  {}\n", preview(&bookmark.content, PREVIEW_CHARS)));
        }
        out.push_str(&open_hint(bookmark.manual_type, &bookmark.id));
    }
    out
}

// Command line that opens a section in the viewer.
fn open_hint(manual_type: ManualType, section_id: &str) -> String {
    format!("  $ ietm show --type {manual_type} --section {section_id}\n")
}

/// `Jan 5, 2026, 09:30 AM`
pub fn format_saved_at<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// First `limit` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_owned(),
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
