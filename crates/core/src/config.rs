use crate::error::{ConfigError, Result};
use crate::types::Resolution;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extensions scanned when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3"];

/// Raw, unvalidated scan input.
///
/// Every optional setting is an `Option`; a present value enables the
/// matching check. Values come from CLI flags, a TOML profile, or both
/// (see [`ScanOptions::merge`]).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanOptions {
    pub target: Option<PathBuf>,
    /// Minimum resolution, `WIDTHxHEIGHT`
    pub threshold: Option<String>,
    /// Maximum resolution, `WIDTHxHEIGHT`
    pub max_threshold: Option<String>,
    pub ratio: Option<bool>,
    /// Maximum re-encoded artwork size in kB
    pub size: Option<f64>,
    pub extensions: Option<Vec<String>>,
    pub logfile: Option<PathBuf>,
    pub playlist: Option<PathBuf>,
}

/// TOML profile file structure
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProfile {
    #[serde(default)]
    scan: ScanOptions,
}

/// Parse a scan profile from a TOML file path
pub fn parse_profile_toml<P: AsRef<Path>>(path: P) -> Result<ScanOptions> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_profile_toml_str(&content)
}

/// Parse a scan profile from a string (useful for testing)
pub fn parse_profile_toml_str(content: &str) -> Result<ScanOptions> {
    let raw: RawProfile = toml::from_str(content)?;
    Ok(raw.scan)
}

/// What the scan runs against. Resolved once during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    File(PathBuf),
    Directory(PathBuf),
}

impl Target {
    pub fn path(&self) -> &Path {
        match self {
            Target::File(p) | Target::Directory(p) => p,
        }
    }
}

/// An output file opened in append mode while validating the configuration.
#[derive(Debug)]
pub struct OutputFile {
    pub path: PathBuf,
    pub file: File,
}

/// Validated scan configuration, owned by the run.
#[derive(Debug)]
pub struct PipelineConfig {
    pub target: Target,
    pub min_threshold: Option<Resolution>,
    pub max_threshold: Option<Resolution>,
    pub check_ratio: bool,
    pub max_size_kb: Option<f64>,
    /// Lowercase, without the leading dot
    pub extensions: Vec<String>,
    pub logfile: Option<OutputFile>,
    pub playlist: Option<OutputFile>,
}

impl ScanOptions {
    /// Overlay `overrides` on top of `self`. Set fields in `overrides` win.
    pub fn merge(self, overrides: ScanOptions) -> ScanOptions {
        ScanOptions {
            target: overrides.target.or(self.target),
            threshold: overrides.threshold.or(self.threshold),
            max_threshold: overrides.max_threshold.or(self.max_threshold),
            ratio: overrides.ratio.or(self.ratio),
            size: overrides.size.or(self.size),
            extensions: overrides.extensions.or(self.extensions),
            logfile: overrides.logfile.or(self.logfile),
            playlist: overrides.playlist.or(self.playlist),
        }
    }

    /// Validate every field and open the output files.
    ///
    /// The target is checked before the thresholds, and the logfile and
    /// playlist are only created once everything else is known to be valid.
    pub fn validate(self) -> Result<PipelineConfig> {
        if self.threshold.is_none() && self.size.is_none() {
            return Err(ConfigError::NoChecksEnabled);
        }

        let target = resolve_target(self.target.ok_or(ConfigError::MissingTarget)?)?;

        let min_threshold = self
            .threshold
            .as_deref()
            .map(str::parse::<Resolution>)
            .transpose()?;
        let max_threshold = self
            .max_threshold
            .as_deref()
            .map(str::parse::<Resolution>)
            .transpose()?;

        let max_size_kb = match self.size {
            Some(kb) if !kb.is_finite() || kb <= 0.0 => {
                return Err(ConfigError::InvalidSizeLimit(kb));
            }
            other => other,
        };

        let extensions = normalize_extensions(self.extensions.unwrap_or_default());

        let logfile = self.logfile.map(|p| open_output(p, "logfile")).transpose()?;
        let playlist = self.playlist.map(|p| open_output(p, "playlist")).transpose()?;

        let config = PipelineConfig {
            target,
            min_threshold,
            max_threshold,
            check_ratio: self.ratio.unwrap_or(false),
            max_size_kb,
            extensions,
            logfile,
            playlist,
        };
        debug!(?config, "configuration validated");

        Ok(config)
    }
}

impl PipelineConfig {
    /// Human-readable summary of the enabled settings, one line each.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(log) = &self.logfile {
            lines.push(format!("Logging enabled, writing log to: {}", log.path.display()));
        }

        match &self.target {
            Target::Directory(p) => lines.push(format!("Analyzing file(s) in {}", p.display())),
            Target::File(p) => lines.push(format!("Analyzing file {}", p.display())),
        }

        if let Some(min) = self.min_threshold {
            lines.push(format!("Threshold enabled, selected value: {}", min));
        }
        if self.check_ratio {
            lines.push("Checking for 1:1 ratio is enabled.".to_string());
        }
        if let Some(kb) = self.max_size_kb {
            lines.push(format!(
                "File size threshold enabled, reporting files above {} kB",
                kb
            ));
        }
        if let Some(max) = self.max_threshold {
            lines.push(format!("Maximum threshold enabled, selected value: {}", max));
        }
        if let Some(playlist) = &self.playlist {
            lines.push(format!("Playlist enabled, writing to {}", playlist.path.display()));
        }

        lines
    }
}

fn resolve_target(path: PathBuf) -> Result<Target> {
    if path.is_dir() {
        Ok(Target::Directory(path))
    } else if path.is_file() {
        Ok(Target::File(path))
    } else {
        Err(ConfigError::PathNotFound(path))
    }
}

/// Lowercase, strip dots, drop blanks and repeats. First occurrence wins.
fn normalize_extensions(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let extensions: Vec<String> = raw
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty() && seen.insert(e.clone()))
        .collect();

    if extensions.is_empty() {
        DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    } else {
        extensions
    }
}

/// Open `path` for appending. The parent directory must already exist;
/// a bare file name counts as living in the current directory.
fn open_output(path: PathBuf, kind: &'static str) -> Result<OutputFile> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(ConfigError::InvalidOutputPath { kind, path });
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

    Ok(OutputFile { path, file })
}
