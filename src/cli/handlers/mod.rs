use std::error::Error;
use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::engine::{Catalog, ListEngine, ListError};
use crate::io::config_io;
use crate::io::file_store::FileStore;
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::model::config::Config;
use crate::ops::item_ops::{self, InsertPosition, Location};
use crate::ops::share;

/// Entries `td recovery` shows when no --limit is given
const DEFAULT_RECOVERY_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli, config: Config) -> Result<(), Box<dyn Error>> {
    let json = cli.json;
    let store_dir = config_io::resolve_store_dir(&config, cli.store_dir.as_deref());

    // Works even when the store document itself is unreadable
    if let Commands::Recovery(args) = &cli.command {
        return cmd_recovery(&store_dir, args, json);
    }

    let mut ctx = Context::open(store_dir, config)?;
    match cli.command {
        // List commands
        Commands::Lists => cmd_lists(&ctx, json),
        Commands::Create(args) => cmd_create(&mut ctx, args, json),
        Commands::Show(args) => cmd_show(&ctx, args, json),
        Commands::Rename(args) => cmd_rename(&mut ctx, args),
        Commands::Delete(args) => cmd_delete(&mut ctx, args, json),
        Commands::Share(args) => cmd_share(&ctx, args, json),
        Commands::Reset(args) => cmd_reset(&mut ctx, args),

        // Item commands
        Commands::Add(args) => cmd_add(&mut ctx, args, json),
        Commands::Sub(args) => cmd_sub(&mut ctx, args, json),
        Commands::Edit(args) => cmd_edit(&mut ctx, args),
        Commands::Rm(args) => cmd_rm(&mut ctx, args),
        Commands::Mv(args) => cmd_mv(&mut ctx, args),
        Commands::Promote(args) => cmd_promote(&mut ctx, args),
        Commands::Reorder(args) => cmd_reorder(&mut ctx, args),

        Commands::Recovery(args) => cmd_recovery(&ctx.store_dir, &args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Everything a store-backed command needs
struct Context {
    store_dir: PathBuf,
    config: Config,
    catalog: Catalog<FileStore>,
}

impl Context {
    fn open(store_dir: PathBuf, config: Config) -> Result<Self, Box<dyn Error>> {
        let store = FileStore::open(&store_dir)?;
        let catalog = Catalog::new(store).with_default_title(config.lists.default_title.clone());
        Ok(Context {
            store_dir,
            config,
            catalog,
        })
    }

    /// Resolve a list argument: a known list id, else a unique title.
    fn resolve_list(&self, arg: &str) -> Result<String, Box<dyn Error>> {
        self.find_list(arg)?.ok_or_else(|| not_found("list", arg))
    }

    /// Like `resolve_list`, but `None` when nothing matches. An ambiguous
    /// title is still an error.
    fn find_list(&self, arg: &str) -> Result<Option<String>, Box<dyn Error>> {
        if self.catalog.exists(arg)? {
            return Ok(Some(arg.to_string()));
        }
        let matches: Vec<String> = self
            .catalog
            .list_lists()?
            .into_iter()
            .filter(|e| e.title == arg)
            .map(|e| e.id)
            .collect();
        match matches.as_slice() {
            [id] => Ok(Some(id.clone())),
            [] => Ok(None),
            ids => Err(format!(
                "list title '{}' is ambiguous (ids: {})",
                arg,
                ids.join(", ")
            )
            .into()),
        }
    }

    /// Open an editing session, pointing at `td reset` when the items are
    /// unreadable.
    fn open_list(&mut self, arg: &str) -> Result<ListEngine<&mut FileStore>, Box<dyn Error>> {
        let id = self.resolve_list(arg)?;
        self.catalog.open(&id).map_err(|e| with_reset_hint(e, &id))
    }
}

fn with_reset_hint(err: ListError, list_id: &str) -> Box<dyn Error> {
    match err {
        ListError::CorruptData { .. } => {
            format!("{} (run `td reset {}` to start the list over)", err, list_id).into()
        }
        other => other.into(),
    }
}

fn print_id(id: &str, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        let out = IdJson { id: id.to_string() };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", id);
    }
    Ok(())
}

fn blank_text_error() -> Box<dyn Error> {
    "item text is empty".into()
}

fn not_found(what: &str, id: &str) -> Box<dyn Error> {
    format!("{} not found: {}", what, id).into()
}

// ---------------------------------------------------------------------------
// List commands
// ---------------------------------------------------------------------------

fn cmd_lists(ctx: &Context, json: bool) -> Result<(), Box<dyn Error>> {
    let entries = ctx.catalog.list_lists()?;
    if json {
        let out: Vec<ListEntryJson> = entries.iter().map(entry_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if entries.is_empty() {
        println!("no lists yet (create one with `td create <title>`)");
    } else {
        for line in format_list_entries(&entries) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_create(ctx: &mut Context, args: CreateArgs, json: bool) -> Result<(), Box<dyn Error>> {
    if args.title.trim().is_empty() {
        return Err("list title is empty".into());
    }
    let id = ctx.catalog.create_list(&args.title)?;
    print_id(&id, json)
}

fn cmd_show(ctx: &Context, args: ListArg, json: bool) -> Result<(), Box<dyn Error>> {
    let id = ctx.resolve_list(&args.list)?;
    let list = ctx
        .catalog
        .load_list(&id)
        .map_err(|e| with_reset_hint(e, &id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&list_to_json(&list))?);
    } else {
        for line in format_list(&list) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_rename(ctx: &mut Context, args: RenameArgs) -> Result<(), Box<dyn Error>> {
    let id = ctx.resolve_list(&args.list)?;
    ctx.catalog.rename_list(&id, &args.title)?;
    Ok(())
}

fn cmd_delete(ctx: &mut Context, args: ListArg, json: bool) -> Result<(), Box<dyn Error>> {
    // Deleting is idempotent: an unknown id is deleted already
    let id = ctx
        .find_list(&args.list)?
        .unwrap_or_else(|| args.list.clone());

    if ctx.catalog.exists(&id)? {
        let title = ctx.catalog.stored_title(&id)?.unwrap_or_default();
        let items = ctx.catalog.raw_items(&id)?.unwrap_or_default();
        recovery::log_recovery(
            &ctx.store_dir,
            RecoveryEntry::now(RecoveryCategory::Delete, "list deleted")
                .field("List", id.clone())
                .field("Title", title)
                .body(items),
        );
    }
    ctx.catalog.delete_list(&id)?;

    if json {
        print_id(&id, true)
    } else {
        println!("deleted {}", id);
        Ok(())
    }
}

fn cmd_share(ctx: &Context, args: ListArg, json: bool) -> Result<(), Box<dyn Error>> {
    let id = ctx.resolve_list(&args.list)?;
    let url = share::share_url(&ctx.config.share.origin, &id);
    if json {
        let out = ShareJson { id, url };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", url);
    }
    Ok(())
}

fn cmd_reset(ctx: &mut Context, args: ListArg) -> Result<(), Box<dyn Error>> {
    let id = ctx.resolve_list(&args.list)?;
    match ctx.catalog.reset_corrupt_list(&id)? {
        Some(raw) => {
            recovery::log_recovery(
                &ctx.store_dir,
                RecoveryEntry::now(RecoveryCategory::Corrupt, "unreadable items reset")
                    .field("List", id.clone())
                    .body(raw),
            );
            println!(
                "reset {}; the unreadable items are in {}",
                id,
                recovery::recovery_log_path(&ctx.store_dir).display()
            );
        }
        None => println!("{} is readable, nothing to reset", id),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Item commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &mut Context, args: AddArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let mut engine = ctx.open_list(&args.list)?;
    let id = engine.add_item(&args.text)?.ok_or_else(blank_text_error)?;
    print_id(&id, json)
}

fn cmd_sub(ctx: &mut Context, args: SubArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let mut engine = ctx.open_list(&args.list)?;
    match engine.add_sub_item(&args.parent, &args.text)? {
        Some(id) => print_id(&id, json),
        None if args.text.trim().is_empty() => Err(blank_text_error()),
        None => Err(not_found("item", &args.parent)),
    }
}

fn cmd_edit(ctx: &mut Context, args: EditArgs) -> Result<(), Box<dyn Error>> {
    let mut engine = ctx.open_list(&args.list)?;
    if !engine.edit_item(&args.id, &args.text)? {
        return Err(not_found("item", &args.id));
    }
    Ok(())
}

fn cmd_rm(ctx: &mut Context, args: RmArgs) -> Result<(), Box<dyn Error>> {
    let mut engine = ctx.open_list(&args.list)?;
    let is_sub_item = args.sub
        || matches!(
            item_ops::locate(engine.items(), &args.id),
            Some(Location::Sub { .. })
        );
    if !engine.delete_item(&args.id, is_sub_item)? {
        return Err(not_found("item", &args.id));
    }
    Ok(())
}

fn cmd_mv(ctx: &mut Context, args: MvArgs) -> Result<(), Box<dyn Error>> {
    let mut engine = ctx.open_list(&args.list)?;
    if engine.move_sub_item(&args.id, Some(&args.parent))? {
        return Ok(());
    }
    match item_ops::locate(engine.items(), &args.id) {
        Some(Location::Sub { .. }) => Err(not_found("item", &args.parent)),
        _ => Err(not_found("sub-item", &args.id)),
    }
}

fn cmd_promote(ctx: &mut Context, args: PromoteArgs) -> Result<(), Box<dyn Error>> {
    let mut engine = ctx.open_list(&args.list)?;
    if !engine.promote_sub_item(&args.id)? {
        return Err(not_found("sub-item", &args.id));
    }
    Ok(())
}

fn cmd_reorder(ctx: &mut Context, args: ReorderArgs) -> Result<(), Box<dyn Error>> {
    let position = if args.top {
        InsertPosition::Top
    } else if let Some(ref after) = args.after {
        InsertPosition::After(after.clone())
    } else {
        InsertPosition::Bottom
    };

    let mut engine = ctx.open_list(&args.list)?;
    let location =
        item_ops::locate(engine.items(), &args.id).ok_or_else(|| not_found("item", &args.id))?;

    // The anchor must be a sibling; anything else is a usage error
    if let InsertPosition::After(ref anchor) = position {
        let anchor_location = item_ops::locate(engine.items(), anchor);
        let is_sibling = match (location, anchor_location) {
            (Location::TopLevel(_), Some(Location::TopLevel(_))) => true,
            (Location::Sub { parent, .. }, Some(Location::Sub { parent: p, .. })) => parent == p,
            _ => false,
        };
        if !is_sibling || anchor == &args.id {
            return Err(format!("{} is not a sibling of {}", anchor, args.id).into());
        }
    }

    // An unchanged result just means the item was already in place
    match location {
        Location::TopLevel(_) => engine.reorder_item(&args.id, &position)?,
        Location::Sub { .. } => engine.reorder_sub_item(&args.id, &position)?,
    };
    Ok(())
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

fn cmd_recovery(store_dir: &Path, args: &RecoveryArgs, json: bool) -> Result<(), Box<dyn Error>> {
    if args.prune {
        let removed = recovery::prune_recovery(store_dir, None, args.all)?;
        println!("pruned {} recovery entries", removed);
        return Ok(());
    }

    let limit = args.limit.unwrap_or(DEFAULT_RECOVERY_LIMIT);
    let entries = recovery::read_recovery_entries(store_dir, Some(limit));
    if json {
        let out: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if entries.is_empty() {
        println!("no recovery entries");
    } else {
        for entry in &entries {
            print!("{}", entry.to_markdown());
        }
    }
    Ok(())
}
