//! fsnview, a headless filesystem navigator.
//!
//! Thin binary entry point. Scans a directory, computes a 3D layout, and
//! prints a summary or the flattened boxes as JSON for an external renderer.
//! All logic lives in the `fsnview-core` crate.

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use fsnview_core::color::Palette;
use fsnview_core::model::size::{format_count, format_size};
use fsnview_core::{LayoutOptions, Mode, ScanError, Scanner, ScannerOptions, Tree};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// How often progress is logged while the scan runs.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory to scan
    #[arg(long, short = 'p', default_value = ".")]
    path: PathBuf,

    /// Deepest directory level walked by the full scan (0 = unlimited)
    #[arg(long, short = 'd', default_value_t = 5)]
    depth: usize,

    /// Include dotfiles
    #[arg(long)]
    hidden: bool,

    /// Concurrent directory listings (0 = twice the CPU count)
    #[arg(long, default_value_t = 0)]
    workers: usize,

    /// Name or glob to skip; repeatable. Replaces the built-in list.
    #[arg(long, value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Layout algorithm
    #[arg(long, short = 'm', value_enum, default_value_t = ModeArg::Mapv)]
    mode: ModeArg,

    /// Deepest level laid out (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    layout_depth: usize,

    /// Show only the root's content; other directories stay collapsed
    #[arg(long)]
    collapsed: bool,

    /// Directory to load beyond the scan depth and expand; repeatable
    #[arg(long, value_name = "PATH")]
    expand: Vec<PathBuf>,

    /// Colour theme
    #[arg(long, value_enum, default_value_t = ThemeArg::Dark)]
    theme: ThemeArg,

    /// Print the flattened layout as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Number of largest root children listed in the summary
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Print details for one scanned entry and exit
    #[arg(long, value_name = "PATH")]
    inspect: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Mapv,
    Treev,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Mapv => Mode::MapV,
            ModeArg::Treev => Mode::TreeV,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThemeArg {
    Dark,
    Light,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so `--json` output stays machine-readable.
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("fsnview starting");

    let scanner = Scanner::new(ScannerOptions {
        workers: args.workers,
        max_depth: args.depth,
        ignore_patterns: args.ignore.clone(),
        show_hidden: args.hidden,
    });

    let mut tree = run_scan(&scanner, &args)?;
    let expanded = expand_requested(&scanner, &mut tree, &args.expand)?;

    if let Some(target) = &args.inspect {
        let target = std::path::absolute(target)
            .with_context(|| format!("cannot resolve {}", target.display()))?;
        let Some(entry) = tree.root.find(&target) else {
            bail!("{} is not part of the scanned tree", target.display());
        };
        println!("{}", serde_json::to_string_pretty(&entry.inspect())?);
        return Ok(());
    }

    let mut layout_options = LayoutOptions::for_mode(args.mode.into());
    layout_options.max_depth = args.layout_depth;
    layout_options.palette = match args.theme {
        ThemeArg::Dark => Palette::dark(),
        ThemeArg::Light => Palette::light(),
    };
    if args.collapsed {
        let mut visible: HashSet<PathBuf> = expanded;
        visible.insert(tree.root.path.clone());
        layout_options.expanded_paths = Some(visible);
    }

    let Some(layout) = fsnview_core::compute(Some(&tree), &layout_options) else {
        bail!("layout produced no output");
    };

    if args.json {
        println!("{}", layout.to_json().context("failed to serialise layout")?);
        return Ok(());
    }

    print_summary(&tree, &args);
    println!(
        "Layout:  {} boxes ({} mode)",
        format_count(layout.node_count() as u64),
        layout_options.mode
    );
    Ok(())
}

/// Start the background scan and log progress until the result arrives.
fn run_scan(scanner: &Scanner, args: &Args) -> anyhow::Result<Tree> {
    let mut handle = scanner.scan(&args.path);
    loop {
        if let Some(result) = handle.wait_timeout(PROGRESS_INTERVAL) {
            return result.with_context(|| format!("scan of {} failed", args.path.display()));
        }
        let progress = scanner.progress();
        tracing::info!(
            "Scanning... {} dirs, {} files, {}",
            format_count(progress.dirs_scanned),
            format_count(progress.files_found),
            format_size(progress.bytes_total)
        );
    }
}

/// Lazily load each `--expand` directory and return the set of paths to
/// show expanded.
fn expand_requested(
    scanner: &Scanner,
    tree: &mut Tree,
    paths: &[PathBuf],
) -> anyhow::Result<HashSet<PathBuf>> {
    let mut expanded = HashSet::new();
    for path in paths {
        let path = std::path::absolute(path)
            .with_context(|| format!("cannot resolve {}", path.display()))?;
        let Some(entry) = tree.root.find_mut(&path) else {
            bail!("{} is not part of the scanned tree", path.display());
        };
        match scanner.load_dir(entry) {
            Ok(()) => {}
            // Recorded on the entry; the layout shows it in the error colour.
            Err(err @ ScanError::ReadDir { .. }) => tracing::warn!("{err}"),
            Err(err) => return Err(err.into()),
        }

        // Every ancestor must be expanded for the directory to be visible.
        let mut current = Some(path.as_path());
        while let Some(p) = current {
            expanded.insert(p.to_path_buf());
            if p == tree.root.path {
                break;
            }
            current = p.parent();
        }
    }
    Ok(expanded)
}

fn print_summary(tree: &Tree, args: &Args) {
    println!("Root:    {}", tree.root.path.display());
    println!("Size:    {}", format_size(tree.total_size));
    println!(
        "Entries: {} files, {} directories, max depth {}",
        format_count(tree.file_count),
        format_count(tree.dir_count),
        tree.max_depth
    );
    println!("Scanned: {}", tree.scanned_at.format("%Y-%m-%d %H:%M:%S UTC"));

    if !tree.errors.is_empty() {
        println!("Errors:  {}", format_count(tree.errors.len() as u64));
        for error in tree.errors.iter().take(5) {
            println!("  {}: {}", error.path.display(), error.message);
        }
    }

    if args.top > 0 && !tree.root.children.is_empty() {
        println!();
        println!("Largest entries:");
        for child in tree.root.children.iter().take(args.top) {
            let share = if tree.total_size > 0 {
                child.size as f64 / tree.total_size as f64 * 100.0
            } else {
                0.0
            };
            println!(
                "  {:>10}  {:>5.1}%  {:<9}  {}",
                format_size(child.size),
                share,
                child.kind.label(),
                child.name
            );
        }
    }
    println!();
}
