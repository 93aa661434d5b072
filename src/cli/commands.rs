use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "td", about = concat!("td v", env!("CARGO_PKG_VERSION"), " - to-do lists with sub-items"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different store directory
    #[arg(short = 'C', long = "store-dir", global = true)]
    pub store_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all lists
    Lists,
    /// Create a new list and print its id
    Create(CreateArgs),
    /// Show a list with its items
    Show(ListArg),
    /// Change a list's title
    Rename(RenameArgs),
    /// Delete a list and its items
    Delete(ListArg),
    /// Add an item to the end of a list
    Add(AddArgs),
    /// Add a sub-item under an item
    Sub(SubArgs),
    /// Change an item's text
    Edit(EditArgs),
    /// Remove an item (with its sub-items) or a sub-item
    Rm(RmArgs),
    /// Move a sub-item under a different item
    Mv(MvArgs),
    /// Turn a sub-item into a top-level item
    Promote(PromoteArgs),
    /// Reorder an item among its siblings
    Reorder(ReorderArgs),
    /// Print the share link for a list
    Share(ListArg),
    /// Replace a list's unreadable items with an empty list
    Reset(ListArg),
    /// View or prune the recovery log
    Recovery(RecoveryArgs),
}

// ---------------------------------------------------------------------------
// List commands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArg {
    /// List id or title
    pub list: String,
}

#[derive(Args)]
pub struct CreateArgs {
    /// Title of the new list
    pub title: String,
}

#[derive(Args)]
pub struct RenameArgs {
    /// List id or title
    pub list: String,
    /// New title
    pub title: String,
}

// ---------------------------------------------------------------------------
// Item commands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// List id or title
    pub list: String,
    /// Item text
    pub text: String,
}

#[derive(Args)]
pub struct SubArgs {
    /// List id or title
    pub list: String,
    /// Parent item id
    pub parent: String,
    /// Sub-item text
    pub text: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// List id or title
    pub list: String,
    /// Item or sub-item id
    pub id: String,
    /// New text
    pub text: String,
}

#[derive(Args)]
pub struct RmArgs {
    /// List id or title
    pub list: String,
    /// Item or sub-item id
    pub id: String,
    /// Treat the id as a sub-item
    #[arg(long)]
    pub sub: bool,
}

#[derive(Args)]
pub struct MvArgs {
    /// List id or title
    pub list: String,
    /// Sub-item id
    pub id: String,
    /// New parent item id
    pub parent: String,
}

#[derive(Args)]
pub struct PromoteArgs {
    /// List id or title
    pub list: String,
    /// Sub-item id
    pub id: String,
}

#[derive(Args)]
pub struct ReorderArgs {
    /// List id or title
    pub list: String,
    /// Item or sub-item id
    pub id: String,
    /// Move to the top
    #[arg(long, conflicts_with_all = ["bottom", "after"])]
    pub top: bool,
    /// Move to the bottom
    #[arg(long, conflicts_with = "after")]
    pub bottom: bool,
    /// Move after this sibling id
    #[arg(long)]
    pub after: Option<String>,
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryArgs {
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Remove entries older than 30 days
    #[arg(long)]
    pub prune: bool,
    /// With --prune, remove all entries
    #[arg(long, requires = "prune")]
    pub all: bool,
}
