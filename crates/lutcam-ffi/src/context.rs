//! Process-wide library state behind the C ABI.

use std::ffi::CString;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use lutcam_core::{FilterRegistry, FrameProcessor};
use tracing_subscriber::EnvFilter;

use crate::config::FfiConfig;

/// Shared processor plus NUL-terminated filter names for enumeration.
pub(crate) struct Context {
    pub(crate) processor: FrameProcessor,
    pub(crate) names: Vec<CString>,
}

static CONTEXT: OnceLock<Context> = OnceLock::new();

impl Context {
    fn load(lut_dir: Option<&Path>) -> Self {
        let mut registry = FilterRegistry::new();
        match lut_dir {
            Some(dir) => {
                if let Err(e) = registry.load_dir(dir) {
                    tracing::warn!("failed to read LUT directory {}: {e}", dir.display());
                }
            }
            None => tracing::info!("no LUT directory configured; only `None` is available"),
        }

        let names = registry
            .names()
            .into_iter()
            .filter_map(|name| CString::new(name).ok())
            .collect();

        Self {
            processor: FrameProcessor::new(Arc::new(registry)),
            names,
        }
    }
}

/// The library context, created from the environment on first use.
pub(crate) fn get() -> &'static Context {
    CONTEXT.get_or_init(|| create(None))
}

/// Create the context from an explicit LUT directory.
///
/// Returns `false` when the context already exists; it is left unchanged.
pub(crate) fn init(lut_dir: Option<&Path>) -> bool {
    let mut created = false;
    CONTEXT.get_or_init(|| {
        created = true;
        create(lut_dir)
    });
    created
}

/// Install logging and load the catalog. `lut_dir` overrides `LUTCAM_LUT_DIR`.
fn create(lut_dir: Option<&Path>) -> Context {
    let config = FfiConfig::default();
    init_logging(&config.log_filter);
    Context::load(lut_dir.or(config.lut_dir.as_deref()))
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    // The host may already have installed a subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_use_without_init_installs_logging() {
        let context = get();
        assert!(context.names.iter().any(|name| name.as_bytes() == b"None"));
        assert!(tracing::dispatcher::has_been_set());
        assert!(!init(None));
    }
}
