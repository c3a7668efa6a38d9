//! Markbar - Markdown editing through toolbar plugins, from the command line.
//!
//! # Usage
//!
//! ```bash
//! markbar notes.md --select 0:5 --press Bold
//! markbar notes.md --press "🖼️ Images" --press "Insert Image" --image cat.png
//! markbar notes.md --plugin align --menu
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use markbar::config::{
    ConfigFlags, clear_config_flags, default_draft_store_path, global_config_path,
    load_config_flags, local_override_path, parse_flag_tokens, save_config_flags,
};
use markbar::editor::Selection;
use markbar::host::{
    ComrakRenderer, DirExporter, EditorContext, FileDraftStore, PREVIEW_BASE, PrintPreviewer,
    QueuedImages, Session, SystemPreviewer,
};
use markbar::perf;
use markbar::plugins::{BuiltinModules, DEFAULT_MODULES};
use markbar::toolbar::Toolbar;

/// Edit a Markdown file through toolbar plugins
#[derive(Parser, Debug)]
#[command(name = "markbar", version, about, long_about = None)]
struct Cli {
    /// Markdown file to edit (created if missing)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Select a byte range before pressing anything
    #[arg(long, value_name = "START:END", value_parser = parse_selection, conflicts_with = "cursor")]
    select: Option<Selection>,

    /// Place the caret at a byte offset before pressing anything
    #[arg(long, value_name = "OFFSET")]
    cursor: Option<usize>,

    /// Press a toolbar entry by label (repeatable, runs in order)
    #[arg(long = "press", value_name = "LABEL")]
    press: Vec<String>,

    /// Image file offered to "Insert Image" (repeatable, used in order)
    #[arg(long = "image", value_name = "PATH")]
    image: Vec<PathBuf>,

    /// Print the toolbar's current menus after pressing
    #[arg(long)]
    menu: bool,

    /// Write the rendered HTML preview to a file
    #[arg(long, value_name = "PATH")]
    html: Option<PathBuf>,

    /// Plugin module to load (repeatable)
    #[arg(long = "plugin", value_name = "NAME")]
    plugin: Vec<String>,

    /// JSON file holding saved drafts
    #[arg(long, value_name = "PATH")]
    draft_store: Option<PathBuf>,

    /// Directory Export writes into
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Address of the companion preview view
    #[arg(long, value_name = "URL")]
    preview_base: Option<String>,

    /// Open previews with the system URL handler instead of printing them
    #[arg(long)]
    open: bool,

    /// Enable timing output
    #[arg(long)]
    perf: bool,

    /// Write plugin and toolbar debug events to a file
    #[arg(long, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn parse_selection(s: &str) -> Result<Selection, String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got {s:?}"))?;
    let start = start.trim().parse().map_err(|e| format!("bad start: {e}"))?;
    let end = end.trim().parse().map_err(|e| format!("bad end: {e}"))?;
    Ok(Selection::new(start, end))
}

fn print_menu(toolbar: &Toolbar) {
    for plugin in toolbar.plugins() {
        let labels = toolbar
            .entries()
            .into_iter()
            .filter(|e| e.plugin == plugin)
            .map(|e| {
                if e.is_transition() {
                    format!("{} ▸", e.entry.label)
                } else {
                    e.entry.label
                }
            })
            .collect::<Vec<_>>();
        let menu = toolbar
            .current_menu(plugin)
            .map_or_else(String::new, ToString::to_string);
        println!("[{plugin}:{menu}] {}", labels.join(" | "));
    }
}

fn read_document(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(err).with_context(|| format!("Failed to read {}", path.display())),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let debug_log_path = effective
        .debug_log
        .clone()
        .or_else(|| std::env::var_os("MARKBAR_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize debug log {}: {}",
            debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    let modules: Vec<String> = if effective.plugins.is_empty() {
        DEFAULT_MODULES.iter().map(ToString::to_string).collect()
    } else {
        effective.plugins.clone()
    };

    let raw = read_document(&cli.file)?;

    let renderer = ComrakRenderer::new();
    let images = cli
        .image
        .iter()
        .fold(QueuedImages::new(), |queue, path| queue.with_path(path));
    let drafts = FileDraftStore::new(
        effective
            .draft_store
            .clone()
            .unwrap_or_else(default_draft_store_path),
    );
    let exporter = DirExporter::new(
        effective
            .export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(".")),
    );
    let base = effective
        .preview_base
        .clone()
        .unwrap_or_else(|| PREVIEW_BASE.to_string());

    let ctx = EditorContext::new()
        .with_renderer(renderer.clone())
        .with_drafts(drafts)
        .with_exporter(exporter)
        .with_image_source(images);
    let ctx = if effective.open_preview {
        ctx.with_previewer(SystemPreviewer::new(base))
    } else {
        ctx.with_previewer(PrintPreviewer::new(base))
    };

    let mut session = Session::new(ctx);
    session
        .open_document(&raw)
        .with_context(|| format!("Failed to open {}", cli.file.display()))?;
    let selection = cli
        .select
        .or_else(|| cli.cursor.map(Selection::caret))
        .unwrap_or_else(|| Selection::caret(session.context().content().len()));
    session.context_mut().set_selection(selection);

    let report = session.load_plugins(&BuiltinModules::new(), &modules);
    for (module, err) in &report.failed {
        eprintln!("[warn] plugin module {module} not loaded: {err}");
    }
    for (plugin, err) in &report.setup_failed {
        eprintln!("[warn] plugin {plugin} not set up: {err}");
    }

    for label in &cli.press {
        match session.press(label) {
            Ok(pressed) => tracing::debug!(?pressed, "pressed {label}"),
            Err(err) => eprintln!("[warn] {err}"),
        }
    }
    for notice in session.take_notices() {
        eprintln!("{notice}");
    }

    if cli.menu {
        print_menu(session.toolbar());
    }
    if let Some(out) = &cli.html {
        fs::write(out, renderer.html())
            .with_context(|| format!("Failed to write {}", out.display()))?;
    }

    let saved = session.saved_document();
    if saved != raw {
        fs::write(&cli.file, saved)
            .with_context(|| format!("Failed to write {}", cli.file.display()))?;
    }
    Ok(())
}
