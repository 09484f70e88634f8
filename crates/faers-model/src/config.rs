//! Pipeline configuration.
//!
//! Every threshold that governs reading, joining, and detection lives here
//! and is passed explicitly into components, keeping them independently
//! testable. Defaults match the documented operating values.

use serde::{Deserialize, Serialize};

/// High/moderate percentage thresholds for classifying row loss.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LossThresholds {
    pub high_percent: f64,
    pub moderate_percent: f64,
}

/// Rolling Z-score detector parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RollingParams {
    /// Trailing window length in months.
    pub window: usize,
    /// |z| above which a month is flagged.
    pub threshold: f64,
}

impl Default for RollingParams {
    fn default() -> Self {
        Self {
            window: 6,
            threshold: 2.0,
        }
    }
}

/// Seasonal-decomposition detector parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeasonalParams {
    /// Seasonal period in months. The detector needs at least `2 * period`
    /// observations.
    pub period: usize,
    /// |z| above which a month is flagged.
    pub threshold: f64,
}

impl Default for SeasonalParams {
    fn default() -> Self {
        Self {
            period: 12,
            threshold: 2.5,
        }
    }
}

/// Configuration for the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Field delimiter of the source files. Both `$` and tab occur in the
    /// wild; this is deployment configuration, never a code change.
    pub delimiter: u8,
    /// Rows per chunk when reading large files.
    pub chunk_size: usize,
    /// File size (MB) above which the reader switches to chunked mode.
    pub large_file_threshold_mb: u64,
    /// Dictionary-encode columns whose unique-value ratio is below 0.5.
    pub dictionary_encoding: bool,
    /// Release excess buffer capacity every N chunks on very large reads.
    pub reclaim_interval_chunks: usize,
    /// Per-join row-loss classification thresholds (inner joins).
    pub join_loss: LossThresholds,
    /// Quarter-level loss thresholds (initial DEMO rows to final events).
    pub total_loss: LossThresholds,
    /// Key-overlap percentage below which a low-overlap warning is raised.
    pub key_overlap_warning_percent: f64,
    pub rolling: RollingParams,
    pub seasonal: SeasonalParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delimiter: b'$',
            chunk_size: 50_000,
            large_file_threshold_mb: 1024,
            dictionary_encoding: true,
            reclaim_interval_chunks: 10,
            join_loss: LossThresholds {
                high_percent: 20.0,
                moderate_percent: 10.0,
            },
            total_loss: LossThresholds {
                high_percent: 30.0,
                moderate_percent: 15.0,
            },
            key_overlap_warning_percent: 80.0,
            rolling: RollingParams::default(),
            seasonal: SeasonalParams::default(),
        }
    }
}

impl PipelineConfig {
    /// Set the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the chunk size for large-file reading.
    #[must_use]
    pub fn with_chunk_size(mut self, rows: usize) -> Self {
        self.chunk_size = rows;
        self
    }

    /// Set the large-file threshold in megabytes.
    #[must_use]
    pub fn with_large_file_threshold_mb(mut self, mb: u64) -> Self {
        self.large_file_threshold_mb = mb;
        self
    }

    /// Enable or disable dictionary encoding of low-cardinality columns.
    #[must_use]
    pub fn with_dictionary_encoding(mut self, enabled: bool) -> Self {
        self.dictionary_encoding = enabled;
        self
    }

    /// Set rolling detector parameters.
    #[must_use]
    pub fn with_rolling(mut self, params: RollingParams) -> Self {
        self.rolling = params;
        self
    }

    /// Set seasonal detector parameters.
    #[must_use]
    pub fn with_seasonal(mut self, params: SeasonalParams) -> Self {
        self.seasonal = params;
        self
    }

    pub fn large_file_threshold_bytes(&self) -> u64 {
        self.large_file_threshold_mb * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_operating_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.chunk_size, 50_000);
        assert_eq!(config.large_file_threshold_mb, 1024);
        assert_eq!(config.join_loss.high_percent, 20.0);
        assert_eq!(config.join_loss.moderate_percent, 10.0);
        assert_eq!(config.total_loss.high_percent, 30.0);
        assert_eq!(config.total_loss.moderate_percent, 15.0);
        assert_eq!(config.key_overlap_warning_percent, 80.0);
        assert_eq!(config.rolling.window, 6);
        assert_eq!(config.rolling.threshold, 2.0);
        assert_eq!(config.seasonal.period, 12);
        assert_eq!(config.seasonal.threshold, 2.5);
    }

    #[test]
    fn builder_overrides() {
        let config = PipelineConfig::default()
            .with_delimiter(b'\t')
            .with_chunk_size(1000)
            .with_large_file_threshold_mb(1);
        assert_eq!(config.delimiter, b'\t');
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.large_file_threshold_bytes(), 1024 * 1024);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.chunk_size, config.chunk_size);
        assert_eq!(back.rolling.window, config.rolling.window);
    }
}
