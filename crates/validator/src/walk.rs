//! Candidate enumeration and the scan loop.

use artsize_core::{PipelineConfig, Target};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::constraints::ConstraintSet;
use crate::extract::{CoverExtractor, TagExtractor};
use crate::pipeline::{FileOutcome, Pipeline};
use crate::probe::{CodecProbe, ImageProbe};
use crate::report::{Reporter, RunProgress};

/// Totals for a finished scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub scanned: usize,
    pub violations: usize,
    /// Per-file failures plus failed size measurements
    pub errors: usize,
}

/// `root` and every directory below it that could be reached, in
/// depth-first order sorted by name. Unreadable subtrees are skipped.
pub fn accessible_directories(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(%err, "skipping inaccessible directory");
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .collect()
}

/// Lazily yield the audio files of each directory (not recursing), sorted by
/// name within a directory, directories in the given order.
pub fn candidates<'a>(
    directories: &'a [PathBuf],
    extensions: &'a [String],
) -> impl Iterator<Item = PathBuf> + 'a {
    directories
        .iter()
        .flat_map(move |dir| audio_files_in(dir, extensions))
}

fn audio_files_in(dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), %err, "skipping unreadable directory");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| has_audio_extension(p, extensions) && p.is_file())
        .collect();
    files.sort();
    files
}

/// Case-insensitive extension match; `extensions` are lowercase.
pub fn has_audio_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.contains(&ext))
}

/// Drives the per-file pipeline over the configured target.
pub struct Scanner<E, P> {
    target: Target,
    extensions: Vec<String>,
    pipeline: Pipeline<E, P>,
    reporter: Reporter,
}

impl Scanner<TagExtractor, CodecProbe> {
    /// Scanner reading real tags and reporting to stdout.
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_parts(config, TagExtractor, CodecProbe, Box::new(io::stdout()))
    }
}

impl<E: CoverExtractor, P: ImageProbe> Scanner<E, P> {
    pub fn with_parts(
        config: PipelineConfig,
        extractor: E,
        probe: P,
        console: Box<dyn Write>,
    ) -> Self {
        let constraints = ConstraintSet::from_config(&config);
        let PipelineConfig {
            target,
            extensions,
            logfile,
            playlist,
            ..
        } = config;

        let mut reporter = Reporter::new(console);
        if let Some(logfile) = logfile {
            reporter = reporter.with_logfile(Box::new(logfile.file));
        }
        if let Some(playlist) = playlist {
            reporter = reporter.with_playlist(Box::new(playlist.file));
        }

        Self {
            target,
            extensions,
            pipeline: Pipeline::new(extractor, probe, constraints),
            reporter,
        }
    }

    /// Check every candidate file. Only a failing output sink stops the run.
    pub fn run(self) -> io::Result<RunSummary> {
        let Scanner {
            target,
            extensions,
            pipeline,
            mut reporter,
        } = self;
        let mut summary = RunSummary::default();

        match &target {
            Target::File(path) => {
                check_file(&pipeline, &mut reporter, path, &mut summary)?;
            }
            Target::Directory(root) => {
                let directories = accessible_directories(root);
                let total = candidates(&directories, &extensions).count();
                info!(directories = directories.len(), files = total, "starting scan");

                let mut progress = RunProgress::new(total);
                for path in candidates(&directories, &extensions) {
                    check_file(&pipeline, &mut reporter, &path, &mut summary)?;
                    progress.advance();
                    reporter.progress(&progress)?;
                }
            }
        }

        reporter.finish()?;
        info!(?summary, "scan finished");
        Ok(summary)
    }
}

fn check_file<E: CoverExtractor, P: ImageProbe>(
    pipeline: &Pipeline<E, P>,
    reporter: &mut Reporter,
    path: &Path,
    summary: &mut RunSummary,
) -> io::Result<()> {
    let report = pipeline.check(path);
    summary.scanned += 1;

    for line in &report.diagnostics {
        summary.errors += 1;
        reporter.diagnostic(line)?;
    }

    match report.outcome {
        FileOutcome::Clean => {}
        FileOutcome::Violation(violation) => {
            summary.violations += 1;
            reporter.violation(&violation)?;
        }
        FileOutcome::Failed(err) => {
            summary.errors += 1;
            debug!(path = %path.display(), %err, "could not check file");
            reporter.file_error(path, &err)?;
        }
    }
    Ok(())
}
