use anyhow::{Context, Result, bail};
use artsize_core::{ConfigError, PipelineConfig, ScanOptions, parse_profile_toml};
use artsize_validator::{RunSummary, Scanner};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Audio file or directory to check (directories are searched recursively)
    pub path: PathBuf,

    /// Report artwork smaller than this resolution, e.g. 300x300
    #[arg(short, long, value_name = "WxH")]
    pub threshold: Option<String>,

    /// Report artwork larger than this resolution, e.g. 1500x1500
    #[arg(short, long, value_name = "WxH")]
    pub max_threshold: Option<String>,

    /// Report artwork that is not square
    #[arg(short, long)]
    pub ratio: bool,

    /// Report artwork larger than this many kB
    #[arg(short, long, value_name = "KB")]
    pub size: Option<f64>,

    /// Write the report to this file (appended) instead of the console
    #[arg(short, long, value_name = "FILE")]
    pub logfile: Option<PathBuf>,

    /// Append every reported file to this playlist
    #[arg(short, long, value_name = "FILE")]
    pub playlist: Option<PathBuf>,

    /// Audio file extension to scan for (repeatable, default: mp3)
    #[arg(short, long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// TOML profile with default scan settings ([scan] table)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ScanArgs {
    /// Flags as scan options. Unset flags stay `None` so a profile can fill them.
    fn to_options(&self) -> ScanOptions {
        ScanOptions {
            target: Some(self.path.clone()),
            threshold: self.threshold.clone(),
            max_threshold: self.max_threshold.clone(),
            ratio: self.ratio.then_some(true),
            size: self.size,
            extensions: (!self.extensions.is_empty()).then(|| self.extensions.clone()),
            logfile: self.logfile.clone(),
            playlist: self.playlist.clone(),
        }
    }
}

/// Run an artwork scan
pub fn run(args: ScanArgs) -> Result<()> {
    let result = scan(&args);

    match &result {
        Ok(summary) if summary.errors == 0 => println!("\nFinished!"),
        _ => println!("\nFinished with errors!"),
    }

    result.map(|_| ())
}

fn scan(args: &ScanArgs) -> Result<RunSummary> {
    let config = load_config(args)?;

    for line in config.describe() {
        println!("{}", line);
    }

    let summary = Scanner::new(config)
        .run()
        .context("Failed to write scan report")?;

    println!(
        "Scanned {} file(s): {} reported, {} error(s)",
        summary.scanned, summary.violations, summary.errors
    );

    Ok(summary)
}

fn load_config(args: &ScanArgs) -> Result<PipelineConfig> {
    let profile = match &args.config {
        Some(path) => parse_profile_toml(path)
            .with_context(|| format!("Failed to load profile {}", path.display()))?,
        None => ScanOptions::default(),
    };

    match profile.merge(args.to_options()).validate() {
        Ok(config) => Ok(config),
        Err(ConfigError::NoChecksEnabled) => {
            bail!("-t/--threshold and/or -s/--size are required.")
        }
        Err(err) => Err(err).context("Invalid configuration"),
    }
}
