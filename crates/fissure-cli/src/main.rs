//! fissure - Split source files holding several public types into one file per type
//!
//! This tool finds files that declare more than one top-level public type,
//! writes each type to its own sibling file with the original package and
//! imports, and removes the original once every unit is safely on disk.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use fissure_core::{CandidateOutcome, Dialect, SplitOutcome, SplitReport, Splitter};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Split source files holding several public types into one file per type
#[derive(Parser, Debug)]
#[command(name = "fissure")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Source files or directories (walked recursively)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Language of the inputs (default: inferred from each file's extension)
    #[arg(short, long, value_enum)]
    lang: Option<Lang>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Dry run - don't write or delete files, just show what would happen
    #[arg(long)]
    dry_run: bool,

    /// Only list the declarations found in each eligible file
    #[arg(long)]
    list_only: bool,

    /// Never delete the original file
    #[arg(long)]
    keep_original: bool,

    /// Overwrite existing sibling files whose content differs
    #[arg(long)]
    force: bool,
}

/// Input language
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Lang {
    /// Java (.java)
    Java,
    /// C# with file-scoped namespaces (.cs)
    Csharp,
}

impl From<Lang> for Dialect {
    fn from(lang: Lang) -> Self {
        match lang {
            Lang::Java => Dialect::Java,
            Lang::Csharp => Dialect::CSharp,
        }
    }
}

/// What to do with one derived unit's target path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteAction {
    /// Target does not exist yet
    Create,
    /// Target already holds exactly this content
    Unchanged,
    /// Target holds other content and --force was given
    Overwrite,
    /// Target is the original file itself
    ReplaceOriginal,
    /// Target is the original file, but the split needs review
    KeepOriginal,
}

#[derive(Debug, Default)]
struct RunStats {
    files_scanned: usize,
    files_split: usize,
    files_skipped: usize,
    units_written: usize,
    units_unchanged: usize,
    originals_removed: usize,
    failures: usize,
}

impl RunStats {
    fn print_summary(&self) {
        info!(
            "Summary: {} scanned, {} split, {} skipped, {} units written, {} unchanged, {} originals removed, {} failed",
            self.files_scanned,
            self.files_split,
            self.files_skipped,
            self.units_written,
            self.units_unchanged,
            self.originals_removed,
            self.failures
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    let stats = run(&cli)?;
    stats.print_summary();

    if stats.failures > 0 {
        bail!("{} file(s) could not be split", stats.failures);
    }
    Ok(())
}

/// Process every input and collect statistics
fn run(cli: &Cli) -> Result<RunStats> {
    let splitters = build_splitters(cli.lang)?;
    let inputs = collect_inputs(&cli.paths, cli.lang)?;
    let mut stats = RunStats::default();

    info!("Found {} candidate file(s)", inputs.len());

    for (path, dialect) in inputs {
        let Some(splitter) = splitters.get(&dialect) else {
            continue;
        };

        stats.files_scanned += 1;
        if let Err(e) = process_file(cli, &path, splitter, &mut stats) {
            // Log error but continue with other files
            error!("{:#}", e);
            stats.failures += 1;
        }
    }

    Ok(stats)
}

fn build_splitters(lang: Option<Lang>) -> Result<HashMap<Dialect, Splitter>> {
    let dialects: Vec<Dialect> = match lang {
        Some(lang) => vec![lang.into()],
        None => Dialect::ALL.to_vec(),
    };

    dialects
        .into_iter()
        .map(|dialect| -> Result<(Dialect, Splitter)> {
            let splitter = Splitter::for_dialect(dialect)
                .with_context(|| format!("Failed to build {} splitter", dialect.as_str()))?;
            Ok((dialect, splitter))
        })
        .collect()
}

/// Expand the command-line paths into the files to process
fn collect_inputs(paths: &[PathBuf], lang: Option<Lang>) -> Result<Vec<(PathBuf, Dialect)>> {
    let selected = lang.map(Dialect::from);
    let mut inputs = Vec::new();

    for path in paths {
        if !path.exists() {
            bail!("Input path does not exist: {}", path.display());
        }

        if path.is_file() {
            match selected.or_else(|| Dialect::from_path(path)) {
                Some(dialect) => inputs.push((path.clone(), dialect)),
                None => warn!("Skipping {}: unknown language", path.display()),
            }
            continue;
        }

        debug!("Scanning directory: {}", path.display());

        // Collected up front so files written during the run are not revisited
        for entry in WalkDir::new(path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
            .filter_map(|e| e.ok())
        {
            let file = entry.path();
            if !file.is_file() {
                continue;
            }

            match Dialect::from_path(file) {
                Some(dialect) if selected.map_or(true, |s| s == dialect) => {
                    inputs.push((file.to_path_buf(), dialect));
                }
                _ => trace!("Skipping {}", file.display()),
            }
        }
    }

    Ok(inputs)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

/// Split one file and write its units next to it
fn process_file(cli: &Cli, path: &Path, splitter: &Splitter, stats: &mut RunStats) -> Result<()> {
    trace!("Reading {}", path.display());
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read input file: {}", path.display()))?;

    let Ok(text) = String::from_utf8(bytes) else {
        warn!("Skipping non-UTF-8 file: {}", path.display());
        stats.files_skipped += 1;
        return Ok(());
    };

    let outcome = splitter
        .split(&text)
        .with_context(|| format!("Failed to split {}", path.display()))?;

    let report = match outcome {
        SplitOutcome::NotEligible { candidates } => {
            trace!(
                "{}: {} top-level declaration(s), nothing to split",
                path.display(),
                candidates
            );
            stats.files_skipped += 1;
            return Ok(());
        }
        SplitOutcome::Split(report) => report,
    };

    info!("Processing {}: {} unit(s)", path.display(), report.units.len());
    for err in report.failures() {
        warn!("{}: {}", path.display(), err);
    }
    for diagnostic in &report.diagnostics {
        warn!("{}: {}", path.display(), diagnostic);
    }

    if cli.list_only {
        print_candidates(path, &report);
        return Ok(());
    }

    let clean = report.is_clean();
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    // Plan every target before writing anything so a conflict leaves the directory untouched
    let mut plan = Vec::with_capacity(report.units.len());
    let mut targets = HashSet::new();
    for unit in &report.units {
        let target = dir.join(&unit.file_name);
        if !targets.insert(target.clone()) {
            bail!(
                "{}: more than one declaration would be written to {}",
                path.display(),
                target.display()
            );
        }
        let action = plan_write(&target, &unit.content, path, cli.force, clean)?;
        plan.push((unit, target, action));
    }

    // The original is overwritten last so an earlier failure leaves it intact
    plan.sort_by_key(|(_, _, action)| *action == WriteAction::ReplaceOriginal);
    let replaces_original = plan
        .iter()
        .any(|(_, _, action)| *action == WriteAction::ReplaceOriginal);

    for (unit, target, action) in &plan {
        if cli.dry_run {
            println!("Would write: {} ({:?})", target.display(), action);
            if cli.verbose > 0 {
                println!("---");
                print!("{}", unit.content);
                println!("---");
            }
            continue;
        }

        match action {
            WriteAction::Unchanged => {
                debug!("Unchanged: {}", target.display());
                stats.units_unchanged += 1;
            }
            WriteAction::KeepOriginal => {
                warn!(
                    "Not overwriting {} with '{}': split needs review",
                    target.display(),
                    unit.name
                );
            }
            WriteAction::Create | WriteAction::Overwrite | WriteAction::ReplaceOriginal => {
                write_unit(target, &unit.content)?;
                println!("Wrote {}", target.display());
                stats.units_written += 1;
            }
        }

        if unit.needs_review {
            warn!("{} needs review: its declaration span was clamped", target.display());
        }
    }

    stats.files_split += 1;

    if cli.dry_run || cli.keep_original || replaces_original {
        return Ok(());
    }
    if !clean {
        warn!("Keeping original {}: split needs review", path.display());
        return Ok(());
    }

    fs::remove_file(path)
        .with_context(|| format!("Failed to remove original file: {}", path.display()))?;
    info!("Removed original file: {}", path.display());
    stats.originals_removed += 1;

    Ok(())
}

fn print_candidates(path: &Path, report: &SplitReport) {
    println!("{}", path.display());
    for entry in &report.candidates {
        let status = match &entry.outcome {
            CandidateOutcome::Extracted { .. } => "extract",
            CandidateOutcome::Clamped { .. } => "extract, clamped",
            CandidateOutcome::Nested { .. } => "nested",
            CandidateOutcome::Malformed(_) => "malformed",
        };
        println!(
            "  {} {} [{}]",
            entry.candidate.kind, entry.candidate.name, status
        );
    }
}

/// Compute a short hash of the content (first 8 chars of blake3)
fn short_hash(content: &[u8]) -> String {
    let hash = blake3::hash(content);
    hash.to_hex()[..8].to_string()
}

/// Decide how to write `content` to `target`
fn plan_write(
    target: &Path,
    content: &str,
    original: &Path,
    force: bool,
    clean: bool,
) -> Result<WriteAction> {
    if target == original {
        return Ok(if clean {
            WriteAction::ReplaceOriginal
        } else {
            WriteAction::KeepOriginal
        });
    }

    if !target.exists() {
        return Ok(WriteAction::Create);
    }

    let existing = fs::read(target)
        .with_context(|| format!("Failed to read existing file: {}", target.display()))?;
    if blake3::hash(&existing) == blake3::hash(content.as_bytes()) {
        trace!("{} already up to date ({})", target.display(), short_hash(&existing));
        return Ok(WriteAction::Unchanged);
    }

    if force {
        debug!(
            "Overwriting {} ({} -> {})",
            target.display(),
            short_hash(&existing),
            short_hash(content.as_bytes())
        );
        return Ok(WriteAction::Overwrite);
    }

    bail!(
        "File already exists with different content: {} (use --force to overwrite)",
        target.display()
    )
}

/// Write one unit to disk
fn write_unit(target: &Path, content: &str) -> Result<()> {
    let mut file = fs::File::create(target)
        .with_context(|| format!("Failed to create file: {}", target.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write file: {}", target.display()))?;

    Ok(())
}
