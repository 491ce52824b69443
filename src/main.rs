use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use ietm::cli::{BookmarksCommand, CatalogCommand, Command};
use ietm::commands::{self, Context};
use ietm::config::Config;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    ietm::logging::init("warn").context("init logging")?;

    let cli = ietm::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let config = Config::resolve(&cli.global);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    // Catalog commands must work without touching stored state.
    let command = match cli.command {
        Command::Catalog { command } => return run_catalog(&config, command, &mut out),
        command => command,
    };

    let mut ctx = Context::load(config).context("load state")?;
    match command {
        Command::Login(args) => commands::login(&mut ctx, args, &mut out).context("login")?,
        Command::Logout => commands::logout(&mut ctx, &mut out).context("logout")?,
        Command::Whoami => commands::whoami(&ctx, &mut out).context("whoami")?,
        Command::Dashboard => commands::dashboard(&ctx, &mut out).context("dashboard")?,
        Command::Manual(args) => commands::manual(&ctx, args, &mut out).context("manual")?,
        Command::Toc(args) => commands::toc(&ctx, args, &mut out).context("toc")?,
        Command::Show(args) => commands::show(&ctx, args, &mut out).context("show")?,
        Command::Read(args) => {
            let stdin = std::io::stdin();
            commands::read(&mut ctx, args, stdin.lock(), &mut out).context("read")?;
        }
        Command::Search(args) => commands::search(&ctx, args, &mut out).context("search")?,
        Command::Bookmarks {
            command: BookmarksCommand::List,
        } => commands::bookmarks_list(&ctx, &mut out).context("bookmarks list")?,
        Command::Bookmarks {
            command: BookmarksCommand::Add(args),
        } => commands::bookmarks_add(&mut ctx, args, &mut out).context("bookmarks add")?,
        Command::Bookmarks {
            command: BookmarksCommand::Remove(args),
        } => commands::bookmarks_remove(&mut ctx, args, &mut out).context("bookmarks remove")?,
        Command::Catalog { command } => run_catalog(&ctx.config, command, &mut out)?,
    }

    Ok(())
}

fn run_catalog(
    config: &Config,
    command: CatalogCommand,
    out: &mut impl std::io::Write,
) -> anyhow::Result<()> {
    match command {
        CatalogCommand::Dump => commands::catalog_dump(config, out).context("catalog dump"),
        CatalogCommand::Check(args) => commands::catalog_check(args, out).context("catalog check"),
    }
}
