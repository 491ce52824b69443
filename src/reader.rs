use std::io::{BufRead, Write};

use anyhow::Context as _;

use crate::bookmarks::BookmarkStore;
use crate::navigator::Navigator;
use crate::views;

const HELP: &str = "\
commands:
  open <id>     select a section
  next, prev    move through sections in stored order
  expand <id>   expand or collapse a section in the table of contents
  toc           show the table of contents
  show          show the current section
  bookmark      bookmark or un-bookmark the current section
  quit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderCommand {
    Open(String),
    Next,
    Previous,
    Expand(String),
    Toc,
    Show,
    Bookmark,
    Help,
    Quit,
}

impl ReaderCommand {
    /// `Ok(None)` for blank lines.
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();

        let command = match (verb, arg) {
            ("open" | "o", Some(id)) => Self::Open(id.to_owned()),
            ("expand" | "e", Some(id)) => Self::Expand(id.to_owned()),
            ("open" | "o" | "expand" | "e", None) => anyhow::bail!("`{verb}` needs a section id"),
            ("next" | "n", _) => Self::Next,
            ("prev" | "previous" | "p", _) => Self::Previous,
            ("toc" | "t", _) => Self::Toc,
            ("show" | "s", _) => Self::Show,
            ("bookmark" | "b", _) => Self::Bookmark,
            ("help" | "h" | "?", _) => Self::Help,
            ("quit" | "q" | "exit", _) => Self::Quit,
            _ => anyhow::bail!("unknown command: {verb}"),
        };
        Ok(Some(command))
    }
}

/// Runs commands from `input` until `quit` or end of input.
///
/// Failures to persist a bookmark change are reported and the session goes on.
pub fn run<R: BufRead, W: Write>(
    mut input: R,
    mut out: W,
    navigator: &mut Navigator<'_>,
    bookmarks: &mut BookmarkStore,
) -> anyhow::Result<()> {
    write!(out, "{}", views::outline(navigator))?;
    writeln!(out)?;
    write!(out, "{}", views::section(navigator, bookmarks))?;

    let mut line = String::new();
    loop {
        write!(out, "> ")?;
        out.flush().context("flush reader output")?;

        line.clear();
        let read = input.read_line(&mut line).context("read reader command")?;
        if read == 0 {
            writeln!(out)?;
            break;
        }

        let command = match ReaderCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                writeln!(out, "{err}; type `help` for commands")?;
                continue;
            }
        };
        tracing::debug!(?command, "reader command");

        match command {
            ReaderCommand::Open(id) => {
                if navigator.select(&id) {
                    write!(out, "{}", views::section(navigator, bookmarks))?;
                } else {
                    writeln!(out, "no section {id} in {}", navigator.manual().title())?;
                }
            }
            ReaderCommand::Next => {
                if navigator.next() {
                    write!(out, "{}", views::section(navigator, bookmarks))?;
                } else {
                    writeln!(out, "already at the last section")?;
                }
            }
            ReaderCommand::Previous => {
                if navigator.previous() {
                    write!(out, "{}", views::section(navigator, bookmarks))?;
                } else {
                    writeln!(out, "already at the first section")?;
                }
            }
            ReaderCommand::Expand(id) => {
                navigator.toggle_expand(&id);
                write!(out, "{}", views::outline(navigator))?;
            }
            ReaderCommand::Toc => write!(out, "{}", views::outline(navigator))?,
            ReaderCommand::Show => write!(out, "{}", views::section(navigator, bookmarks))?,
            ReaderCommand::Bookmark => match navigator.toggle_bookmark(bookmarks) {
                Ok(Some(true)) => writeln!(out, "bookmarked")?,
                Ok(Some(false)) => writeln!(out, "bookmark removed")?,
                Ok(None) => writeln!(out, "no section selected")?,
                Err(err) => {
                    tracing::warn!(error = format!("{err:#}"), "bookmark change not saved");
                    writeln!(out, "warning: bookmark changed but not saved: {err:#}")?;
                }
            },
            ReaderCommand::Help => write!(out, "{HELP}")?,
            ReaderCommand::Quit => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::ManualCatalog;
    use crate::formats::ManualType;
    use crate::storage::MemoryBlobStore;

    fn run_script(
        script: &str,
        storage: Arc<MemoryBlobStore>,
    ) -> anyhow::Result<(String, BookmarkStore)> {
        let catalog = ManualCatalog::builtin()?;
        let mut navigator = Navigator::open(&catalog, ManualType::User);
        let mut bookmarks = BookmarkStore::load(storage)?;
        let mut out = Vec::new();
        run(script.as_bytes(), &mut out, &mut navigator, &mut bookmarks)?;
        Ok((String::from_utf8(out)?, bookmarks))
    }

    #[test]
    fn parse_understands_short_forms() -> anyhow::Result<()> {
        assert_eq!(ReaderCommand::parse("  ")?, None);
        assert_eq!(
            ReaderCommand::parse("o uh-safety")?,
            Some(ReaderCommand::Open("uh-safety".to_owned()))
        );
        assert_eq!(ReaderCommand::parse("p")?, Some(ReaderCommand::Previous));
        assert!(ReaderCommand::parse("open").is_err());
        assert!(ReaderCommand::parse("jump").is_err());
        Ok(())
    }

    #[test]
    fn script_navigates_and_bookmarks() -> anyhow::Result<()> {
        let (out, bookmarks) = run_script(
            "prev\nopen uh-calibration\nnext\nbookmark\nopen nowhere\nquit\nnext\n",
            Arc::new(MemoryBlobStore::new()),
        )?;

        assert!(out.contains("already at the first section"));
        assert!(out.contains("Calibration Procedures  [Not bookmarked]"));
        assert!(out.contains("System Monitoring  [Not bookmarked]"));
        assert!(out.contains("bookmarked\n"));
        assert!(out.contains("no section nowhere in Radar System User Handbook"));
        assert!(bookmarks.is_bookmarked("uh-monitoring"));
        assert_eq!(bookmarks.bookmarks().len(), 1);
        Ok(())
    }

    #[test]
    fn unsaved_bookmark_is_a_warning_not_an_error() -> anyhow::Result<()> {
        let storage = Arc::new(MemoryBlobStore::new());
        storage.set_read_only(true);
        let (out, bookmarks) = run_script("bookmark\n", storage)?;

        assert!(out.contains("warning: bookmark changed but not saved"));
        assert!(bookmarks.is_bookmarked("uh-intro"));
        Ok(())
    }
}
