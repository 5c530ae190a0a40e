//! # Screenwright
//!
//! A block-based screenplay editor: blocks auto-format as you type,
//! structural keys drive scene flow, and finished drafts export to
//! industry-format PDF.
//!
//! ```bash
//! # Create a screenplay
//! cargo run -- new "The Long Goodbye"
//!
//! # List stored screenplays
//! cargo run -- list
//!
//! # Export one to PDF
//! cargo run -- export <id> -o draft.pdf
//!
//! # Watch the editor format a scripted typing session
//! cargo run -- demo
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use screenwright_buffer::TitlePage;
use screenwright_core::{Config, Editor, Key, KeyPress};
use screenwright_export::{paginate, write_pdf};
use screenwright_store::{fs::FileStore, ScreenplayStore};

/// Screenwright - a screenplay editor
#[derive(Parser, Debug)]
#[command(name = "screenwright")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new empty screenplay
    New {
        /// Screenplay title
        title: String,

        /// Author for the title page
        #[arg(short, long)]
        author: Option<String>,
    },

    /// List stored screenplays, newest first
    List,

    /// Export a screenplay to PDF
    Export {
        /// Screenplay id (from `list`)
        id: Uuid,

        /// Output path; defaults to `{title}.pdf`
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Skip the title page
        #[arg(long)]
        no_title_page: bool,
    },

    /// Delete a screenplay
    Delete {
        /// Screenplay id (from `list`)
        id: Uuid,
    },

    /// Run a scripted typing session and print the formatted blocks
    Demo {
        /// Also export the result to this PDF
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let config = Config::load();

    match args.command {
        Command::New { title, author } => cmd_new(&config, &title, author.as_deref()),
        Command::List => cmd_list(&config),
        Command::Export {
            id,
            output,
            no_title_page,
        } => cmd_export(&config, id, output, no_title_page),
        Command::Delete { id } => cmd_delete(&config, id),
        Command::Demo { output } => cmd_demo(config, output),
    }
}

fn open_store(config: &Config) -> anyhow::Result<FileStore> {
    let dir = config.data_dir().context("resolving data directory")?;
    FileStore::open(&dir).with_context(|| format!("opening store at {}", dir.display()))
}

fn cmd_new(config: &Config, title: &str, author: Option<&str>) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    let author = author
        .map(str::to_string)
        .or_else(|| config.export.default_author.clone())
        .unwrap_or_default();
    let title_page = TitlePage {
        title: title.to_string(),
        author,
        ..TitlePage::default()
    };
    let doc = store.create(title, Vec::new(), title_page)?;
    println!("Created \"{}\" ({})", doc.title, doc.id);
    Ok(())
}

fn cmd_list(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let docs = store.list()?;
    if docs.is_empty() {
        println!("No screenplays yet. Try `screenwright new <title>`.");
        return Ok(());
    }
    for doc in docs {
        println!(
            "{}  {:<30}  {} blocks  updated {}",
            doc.id,
            doc.title,
            doc.blocks.len(),
            doc.updated_at.format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

fn cmd_export(
    config: &Config,
    id: Uuid,
    output: Option<PathBuf>,
    no_title_page: bool,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let doc = store.get(id)?;

    let path = output.unwrap_or_else(|| {
        let name = format!("{}.pdf", doc.title.replace(['/', '\\'], "_"));
        match &config.export.output_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    });

    let include_title_page = config.export.title_page && !no_title_page;
    let title_page = include_title_page.then_some(&doc.title_page);
    let pages = paginate(&doc.blocks, title_page);
    write_pdf(&path, &pages)?;
    println!("Exported {} page(s) to {}", pages.len(), path.display());
    Ok(())
}

fn cmd_delete(config: &Config, id: Uuid) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    store.delete(id)?;
    println!("Deleted {id}");
    Ok(())
}

/// Feeds a short scene through the editor the way keystrokes would
/// arrive from a UI, prints what the blocks became, and optionally
/// exports the result, exercising the whole pipeline.
fn cmd_demo(config: Config, output: Option<PathBuf>) -> anyhow::Result<()> {
    let mut editor = Editor::with_config(config)?;
    editor.set_title("Demo Scene");

    type_line(&mut editor, "INT. WRITER'S ROOM - NIGHT");
    editor.handle_key(KeyPress::plain(Key::Enter));
    type_line(&mut editor, "A writer stares at a blinking cursor.");
    editor.handle_key(KeyPress::plain(Key::Tab));
    type_line(&mut editor, "WRITER");
    editor.handle_key(KeyPress::plain(Key::Enter));
    type_line(&mut editor, "It formats itself.");
    editor.handle_key(KeyPress::plain(Key::Enter));
    type_line(&mut editor, "CUT TO:");

    for block in editor.blocks() {
        println!("{:>14}  {}", block.kind.label(), block.text);
    }

    if let Some(path) = output {
        let pages = paginate(&editor.snapshot(), None);
        write_pdf(&path, &pages)?;
        println!("Exported {} page(s) to {}", pages.len(), path.display());
    }
    Ok(())
}

fn type_line(editor: &mut Editor, text: &str) {
    for c in text.chars() {
        editor.handle_key(KeyPress::ch(c));
    }
}
