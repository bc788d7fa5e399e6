//! Output routing.
//!
//! Two independent streams: the interactive console, which always carries
//! the progress line, and the report sink (the logfile when configured,
//! the console otherwise) for violations and per-file errors. Violating
//! paths are also appended to the playlist, if any.

use std::fmt;
use std::io::{self, Write};
use std::path::Path;

use crate::error::FileError;
use crate::pipeline::Violation;

/// Files processed so far out of the total counted before the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunProgress {
    pub total: usize,
    pub done: usize,
}

impl RunProgress {
    pub fn new(total: usize) -> Self {
        Self { total, done: 0 }
    }

    pub fn advance(&mut self) {
        self.done += 1;
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.done as f64 / self.total as f64 * 100.0
        }
    }
}

impl fmt::Display for RunProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} ({:.1}%) finished.",
            self.done,
            self.total,
            self.percent()
        )
    }
}

pub struct Reporter {
    console: Box<dyn Write>,
    logfile: Option<Box<dyn Write>>,
    playlist: Option<Box<dyn Write>>,
    /// Width of the progress line currently shown on the console, 0 if none
    progress_width: usize,
}

impl Reporter {
    pub fn new(console: Box<dyn Write>) -> Self {
        Self {
            console,
            logfile: None,
            playlist: None,
            progress_width: 0,
        }
    }

    pub fn with_logfile(mut self, logfile: Box<dyn Write>) -> Self {
        self.logfile = Some(logfile);
        self
    }

    pub fn with_playlist(mut self, playlist: Box<dyn Write>) -> Self {
        self.playlist = Some(playlist);
        self
    }

    /// Report a violation and add its path to the playlist.
    pub fn violation(&mut self, violation: &Violation) -> io::Result<()> {
        let message = violation.message();
        if message.is_empty() {
            return Ok(());
        }

        self.emit(&format!("{}: {}", violation.path.display(), message))?;

        if let Some(playlist) = self.playlist.as_mut() {
            write_path_line(playlist, &violation.path)?;
        }
        Ok(())
    }

    pub fn file_error(&mut self, path: &Path, err: &FileError) -> io::Result<()> {
        self.emit(&format!(
            "Error while reading tags for file {}: {}",
            path.display(),
            err
        ))
    }

    pub fn diagnostic(&mut self, line: &str) -> io::Result<()> {
        self.emit(line)
    }

    /// Redraw the progress line in place on the console.
    pub fn progress(&mut self, progress: &RunProgress) -> io::Result<()> {
        let line = progress.to_string();
        let pad = self.progress_width.saturating_sub(line.len());
        write!(self.console, "\r{}{}", line, " ".repeat(pad))?;
        self.console.flush()?;
        self.progress_width = line.len();
        Ok(())
    }

    /// End the progress line and flush every sink.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.progress_width > 0 {
            writeln!(self.console)?;
            self.progress_width = 0;
        }
        self.console.flush()?;
        if let Some(logfile) = self.logfile.as_mut() {
            logfile.flush()?;
        }
        if let Some(playlist) = self.playlist.as_mut() {
            playlist.flush()?;
        }
        Ok(())
    }

    fn emit(&mut self, line: &str) -> io::Result<()> {
        match self.logfile.as_mut() {
            Some(logfile) => write_line(logfile, line),
            None => {
                if self.progress_width > 0 {
                    let blank = " ".repeat(self.progress_width);
                    write!(self.console, "\r{}\r", blank)?;
                    self.progress_width = 0;
                }
                write_line(&mut self.console, line)
            }
        }
    }
}

/// One complete line per write so lines never interleave.
fn write_line(out: &mut Box<dyn Write>, line: &str) -> io::Result<()> {
    out.write_all(format!("{}\n", line).as_bytes())?;
    out.flush()
}

/// Raw path bytes so the entry names the file even when it is not UTF-8.
fn write_path_line(out: &mut Box<dyn Write>, path: &Path) -> io::Result<()> {
    let mut entry = path.as_os_str().as_encoded_bytes().to_vec();
    entry.push(b'\n');
    out.write_all(&entry)?;
    out.flush()
}
