use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Directory holding the stored session and bookmarks (default: $IETM_DATA_DIR or `.ietm`).
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// YAML catalog replacing the built-in manuals (default: $IETM_CATALOG).
    #[arg(long, global = true)]
    pub catalog: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in with one of the configured accounts.
    Login(LoginArgs),
    Logout,
    /// Print the logged-in user.
    Whoami,
    /// Overview of both manuals.
    Dashboard,
    /// Overview of one manual and what can be done with it.
    Manual(ManualArgs),
    /// Table of contents.
    Toc(TocArgs),
    /// Show a section with its position and neighbours.
    Show(ShowArgs),
    /// Step through a manual interactively (commands on stdin).
    Read(ManualArgs),
    /// Search section titles and content in both manuals.
    Search(SearchArgs),
    Bookmarks {
        #[command(subcommand)]
        command: BookmarksCommand,
    },
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct ManualArgs {
    /// Manual to open: `technical`, anything else opens the user handbook.
    #[arg(long = "type", default_value = "user")]
    pub manual_type: String,
}

#[derive(Debug, Args)]
pub struct TocArgs {
    /// Manual to open: `technical`, anything else opens the user handbook.
    #[arg(long = "type", default_value = "user")]
    pub manual_type: String,

    /// Section to show expanded (repeatable).
    #[arg(long = "expand")]
    pub expand: Vec<String>,

    /// Expand every section that has children.
    #[arg(long, conflicts_with = "expand")]
    pub expand_all: bool,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Manual to open: `technical`, anything else opens the user handbook.
    #[arg(long = "type", default_value = "user")]
    pub manual_type: String,

    /// Section id (default: the manual's first section).
    #[arg(long)]
    pub section: Option<String>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Text to look for; matched case-insensitively as a literal substring.
    pub query: String,
}

#[derive(Debug, Subcommand)]
pub enum BookmarksCommand {
    List,
    Add(BookmarkAddArgs),
    Remove(BookmarkRemoveArgs),
}

#[derive(Debug, Args)]
pub struct BookmarkAddArgs {
    /// Manual the section belongs to: `technical`, anything else means the user handbook.
    #[arg(long = "type", default_value = "user")]
    pub manual_type: String,

    #[arg(long)]
    pub section: String,
}

#[derive(Debug, Args)]
pub struct BookmarkRemoveArgs {
    #[arg(long)]
    pub id: String,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// Write the active catalog as YAML to stdout.
    Dump,
    /// Validate a catalog YAML file.
    Check(CatalogCheckArgs),
}

#[derive(Debug, Args)]
pub struct CatalogCheckArgs {
    #[arg(long)]
    pub file: String,
}
