use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context as _;

use crate::auth::SessionStore;
use crate::bookmarks::BookmarkStore;
use crate::catalog::ManualCatalog;
use crate::cli::{
    BookmarkAddArgs, BookmarkRemoveArgs, CatalogCheckArgs, LoginArgs, ManualArgs, SearchArgs,
    ShowArgs, TocArgs,
};
use crate::config::Config;
use crate::formats::ManualType;
use crate::navigator::Navigator;
use crate::storage::LoadStatus;
use crate::{reader, search, views};

/// Everything a command needs, composed once per process.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub catalog: ManualCatalog,
    pub sessions: SessionStore,
    pub bookmarks: BookmarkStore,
}

impl Context {
    pub fn load(config: Config) -> anyhow::Result<Self> {
        let catalog = config.load_catalog().context("load catalog")?;
        let storage = config.storage();
        let sessions = SessionStore::load(storage.clone())?;
        let bookmarks = BookmarkStore::load(storage)?;

        for (what, status) in [
            ("session", sessions.load_status()),
            ("bookmarks", bookmarks.load_status()),
        ] {
            if let LoadStatus::Recovered { reason } = status {
                eprintln!("warning: stored {what} were unreadable and have been reset ({reason})");
            }
        }

        Ok(Self {
            config,
            catalog,
            sessions,
            bookmarks,
        })
    }

    fn require_login(&self) -> anyhow::Result<()> {
        if self.config.require_login && !self.sessions.is_authenticated() {
            anyhow::bail!("not logged in; run `ietm login --username <name> --password <password>`");
        }
        Ok(())
    }
}

pub fn login(ctx: &mut Context, args: LoginArgs, out: &mut impl Write) -> anyhow::Result<()> {
    if !ctx.sessions.login(&args.username, &args.password)? {
        anyhow::bail!("invalid username or password");
    }
    writeln!(out, "Logged in as {}", args.username)?;
    Ok(())
}

pub fn logout(ctx: &mut Context, out: &mut impl Write) -> anyhow::Result<()> {
    ctx.sessions.logout()?;
    writeln!(out, "Logged out")?;
    Ok(())
}

pub fn whoami(ctx: &Context, out: &mut impl Write) -> anyhow::Result<()> {
    match ctx.sessions.user() {
        Some(user) => writeln!(out, "{}", user.username)?,
        None => anyhow::bail!("not logged in"),
    }
    Ok(())
}

pub fn dashboard(ctx: &Context, out: &mut impl Write) -> anyhow::Result<()> {
    ctx.require_login()?;
    let text = views::dashboard(&ctx.catalog, ctx.sessions.user(), &ctx.bookmarks);
    out.write_all(text.as_bytes())?;
    Ok(())
}

pub fn manual(ctx: &Context, args: ManualArgs, out: &mut impl Write) -> anyhow::Result<()> {
    ctx.require_login()?;
    let manual_type = ManualType::from_param(&args.manual_type);
    let text = views::manual_dashboard(&ctx.catalog, manual_type, ctx.sessions.user());
    out.write_all(text.as_bytes())?;
    Ok(())
}

pub fn toc(ctx: &Context, args: TocArgs, out: &mut impl Write) -> anyhow::Result<()> {
    ctx.require_login()?;
    let mut navigator = Navigator::new(&ctx.catalog, ManualType::from_param(&args.manual_type));
    if args.expand_all {
        navigator.expand_all();
    } else {
        let wanted = args.expand.into_iter().collect::<HashSet<_>>();
        for id in &wanted {
            navigator.toggle_expand(id);
        }
    }
    out.write_all(views::outline(&navigator).as_bytes())?;
    Ok(())
}

pub fn show(ctx: &Context, args: ShowArgs, out: &mut impl Write) -> anyhow::Result<()> {
    ctx.require_login()?;
    let mut navigator = Navigator::open(&ctx.catalog, ManualType::from_param(&args.manual_type));
    // Unknown ids keep the first section.
    if let Some(id) = args.section.as_deref() {
        navigator.select(id);
    }
    out.write_all(views::section(&navigator, &ctx.bookmarks).as_bytes())?;
    Ok(())
}

pub fn read(
    ctx: &mut Context,
    args: ManualArgs,
    input: impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    ctx.require_login()?;
    let mut navigator = Navigator::open(&ctx.catalog, ManualType::from_param(&args.manual_type));
    reader::run(input, out, &mut navigator, &mut ctx.bookmarks)
}

pub fn search(ctx: &Context, args: SearchArgs, out: &mut impl Write) -> anyhow::Result<()> {
    ctx.require_login()?;
    let results = search::search(ctx.catalog.get_all_sections(), &args.query);
    out.write_all(views::search_results(&ctx.catalog, &args.query, &results).as_bytes())?;
    Ok(())
}

pub fn bookmarks_list(ctx: &Context, out: &mut impl Write) -> anyhow::Result<()> {
    ctx.require_login()?;
    out.write_all(views::bookmark_list(ctx.bookmarks.bookmarks()).as_bytes())?;
    Ok(())
}

pub fn bookmarks_add(
    ctx: &mut Context,
    args: BookmarkAddArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    ctx.require_login()?;
    let manual_type = ManualType::from_param(&args.manual_type);
    let section = ctx
        .catalog
        .manual(manual_type)
        .section(&args.section)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "no section {} in the {}",
                args.section,
                manual_type.display_name()
            )
        })?;

    if ctx.bookmarks.is_bookmarked(&section.id) {
        writeln!(out, "Already bookmarked: {}", section.title)?;
        return Ok(());
    }
    ctx.bookmarks.add(section, manual_type)?;
    writeln!(out, "Bookmarked: {}", section.title)?;
    Ok(())
}

pub fn bookmarks_remove(
    ctx: &mut Context,
    args: BookmarkRemoveArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    ctx.require_login()?;
    let removed = ctx.bookmarks.remove(&args.id)?;
    if removed == 0 {
        writeln!(out, "No bookmark for {}", args.id)?;
    } else {
        writeln!(out, "Removed bookmark {}", args.id)?;
    }
    Ok(())
}

pub fn catalog_dump(config: &Config, out: &mut impl Write) -> anyhow::Result<()> {
    let catalog = config.load_catalog().context("load catalog")?;
    out.write_all(catalog.to_yaml()?.as_bytes())?;
    Ok(())
}

pub fn catalog_check(args: CatalogCheckArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let path = PathBuf::from(&args.file);
    let catalog = ManualCatalog::from_yaml_path(&path)?;
    for (manual_type, manual) in catalog.manuals() {
        writeln!(
            out,
            "{manual_type}: {} ({} sections)",
            manual.title(),
            manual.sections().len()
        )?;
    }
    writeln!(out, "ok: {}", path.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryBlobStore;

    fn context() -> anyhow::Result<Context> {
        let storage: Arc<dyn crate::storage::BlobStore> = Arc::new(MemoryBlobStore::new());
        Ok(Context {
            config: Config {
                data_dir: PathBuf::from("unused"),
                catalog: None,
                require_login: false,
            },
            catalog: ManualCatalog::builtin()?,
            sessions: SessionStore::load(storage.clone())?,
            bookmarks: BookmarkStore::load(storage)?,
        })
    }

    #[test]
    fn show_with_unknown_section_renders_first_section() -> anyhow::Result<()> {
        let ctx = context()?;
        let mut out = Vec::new();
        show(
            &ctx,
            ShowArgs {
                manual_type: "user".to_owned(),
                section: Some("nowhere".to_owned()),
            },
            &mut out,
        )?;

        let text = String::from_utf8(out)?;
        assert!(text.starts_with("Introduction  [Not bookmarked]\n"));
        assert!(text.contains("Section 1 of 8 - User Handbook"));
        Ok(())
    }

    #[test]
    fn show_with_known_section_selects_it() -> anyhow::Result<()> {
        let ctx = context()?;
        let mut out = Vec::new();
        show(
            &ctx,
            ShowArgs {
                manual_type: "technical".to_owned(),
                section: Some("tm-repair".to_owned()),
            },
            &mut out,
        )?;

        let text = String::from_utf8(out)?;
        assert!(text.starts_with("Repair Procedures  [Not bookmarked]\n"));
        Ok(())
    }
}
