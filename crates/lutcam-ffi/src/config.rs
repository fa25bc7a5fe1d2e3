//! Environment configuration for the shared library.

use std::path::PathBuf;

/// Default `tracing` filter when `LUTCAM_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime configuration read when the library context is first created.
#[derive(Debug, Clone)]
pub struct FfiConfig {
    /// Directory of `.cube` files that make up the filter catalog.
    pub lut_dir: Option<PathBuf>,
    /// `tracing-subscriber` filter directive.
    pub log_filter: String,
}

impl Default for FfiConfig {
    fn default() -> Self {
        Self {
            lut_dir: std::env::var_os("LUTCAM_LUT_DIR").map(PathBuf::from),
            log_filter: std::env::var("LUTCAM_LOG")
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        }
    }
}
