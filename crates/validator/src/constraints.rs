//! Artwork constraints.
//!
//! The resolution checks (minimum, maximum, square ratio) share one output
//! fragment that only states the actual dimensions. Which check tripped is
//! recorded at debug level.

use artsize_core::{PipelineConfig, Resolution};
use tracing::debug;

/// Decoded artwork of a single file.
#[derive(Debug, Clone)]
pub struct CoverImage {
    pub data: Vec<u8>,
    pub dimensions: Resolution,
    /// Re-encoded size, present when a size limit is configured and the
    /// measurement succeeded
    pub size_kb: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionCheck {
    BelowMinimum,
    AboveMaximum,
    NotSquare,
}

/// The checks enabled for a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    pub min_threshold: Option<Resolution>,
    pub max_threshold: Option<Resolution>,
    pub check_ratio: bool,
    pub max_size_kb: Option<f64>,
}

impl ConstraintSet {
    pub fn from_config(config: &PipelineConfig) -> Self {
        ConstraintSet {
            min_threshold: config.min_threshold,
            max_threshold: config.max_threshold,
            check_ratio: config.check_ratio,
            max_size_kb: config.max_size_kb,
        }
    }

    /// Whether the probe has to measure the re-encoded size.
    pub fn measures_size(&self) -> bool {
        self.max_size_kb.is_some()
    }

    /// Evaluate `cover`, returning one message fragment per failed group:
    /// the size fragment first, then the shared dimension fragment.
    pub fn evaluate(&self, cover: &CoverImage) -> Vec<String> {
        let mut fragments = Vec::new();

        if let (Some(limit), Some(kb)) = (self.max_size_kb, cover.size_kb)
            && kb as f64 > limit
        {
            fragments.push(format!("Artwork file size is {} kB.", kb));
        }

        let failed = self.failed_dimension_checks(cover.dimensions);
        if !failed.is_empty() {
            debug!(dimensions = %cover.dimensions, ?failed, "dimension checks failed");
            fragments.push(format!("Artwork image size is {}", cover.dimensions));
        }

        fragments
    }

    /// Every dimension check `dimensions` fails, in min, max, ratio order.
    pub fn failed_dimension_checks(&self, dimensions: Resolution) -> Vec<DimensionCheck> {
        let mut failed = Vec::new();

        if let Some(min) = &self.min_threshold
            && dimensions.falls_short_of(min)
        {
            failed.push(DimensionCheck::BelowMinimum);
        }
        if let Some(max) = &self.max_threshold
            && dimensions.exceeds(max)
        {
            failed.push(DimensionCheck::AboveMaximum);
        }
        if self.check_ratio && !dimensions.is_square() {
            failed.push(DimensionCheck::NotSquare);
        }

        failed
    }
}
