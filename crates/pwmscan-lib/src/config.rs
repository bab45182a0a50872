//! Scan configuration
//!
//! Parameters that apply to a whole scan call: scoring order, worker pool
//! size and how unusual input is treated.

/// Configuration parameters for a scan
#[derive(Debug, Clone)]
pub struct ScanConfiguration {
    /// Scoring order: 1 scores single symbols, k > 1 scores composite k-mers
    pub k: usize,

    /// Number of worker threads (0 = all available cores)
    pub num_threads: usize,

    /// Emit one aggregate notice when characters outside the alphabet occur
    pub warn_on_unrecognized: bool,

    /// Accept matrices built with `-inf` entries (mapped to a large negative floor);
    /// scanning such a matrix is an error otherwise
    pub allow_nonfinite: bool,
}

impl Default for ScanConfiguration {
    fn default() -> Self {
        Self {
            k: 1,
            num_threads: 0, // 0 = use all available cores
            warn_on_unrecognized: true,
            allow_nonfinite: false,
        }
    }
}

impl ScanConfiguration {
    /// Create a configuration for scoring order `k`
    pub fn new(k: usize) -> Result<Self, String> {
        let config = Self { k, ..Self::default() };
        config.validate()?;
        Ok(config)
    }

    /// Set the worker count
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.k == 0 {
            return Err("k must be positive, got k=0".to_string());
        }
        Ok(())
    }

    /// Log configuration parameters via tracing
    pub fn print(&self) {
        tracing::info!("Scan Configuration:");
        tracing::info!("  k = {}", self.k);
        if self.num_threads == 0 {
            tracing::info!("  num_threads = all available cores");
        } else {
            tracing::info!("  num_threads = {}", self.num_threads);
        }
        tracing::debug!("  warn_on_unrecognized = {}", self.warn_on_unrecognized);
        tracing::debug!("  allow_nonfinite = {}", self.allow_nonfinite);
    }
}
