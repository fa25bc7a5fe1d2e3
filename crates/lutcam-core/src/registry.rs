//! Named filter catalog and the active filter selection.
//!
//! Registration happens up front through `&mut self`; afterwards the
//! registry is shared (usually behind an `Arc`) and only the active
//! selection changes. The selection sits behind a read-write lock and is
//! read as a single snapshot, so a frame never mixes two filters even when
//! `select` races with frame processing.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::GradeError;
use crate::transform::lut::Lut3D;

/// Name of the built-in pass-through filter.
pub const NONE_FILTER: &str = "None";

/// A catalog entry: a filter name, its display label, and its LUT.
///
/// An entry without a LUT grades as the identity.
#[derive(Debug, Clone)]
pub struct FilterEntry {
    pub name: String,
    pub label: String,
    lut: Option<Arc<Lut3D>>,
}

impl FilterEntry {
    pub fn lut(&self) -> Option<&Arc<Lut3D>> {
        self.lut.as_ref()
    }
}

#[derive(Debug, Clone)]
struct ActiveFilter {
    name: String,
    lut: Option<Arc<Lut3D>>,
}

/// Mapping from filter name to LUT, plus the process-wide active selection.
#[derive(Debug)]
pub struct FilterRegistry {
    filters: HashMap<String, FilterEntry>,
    active: RwLock<ActiveFilter>,
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterRegistry {
    /// A registry holding only the `"None"` filter, which is also selected.
    pub fn new() -> Self {
        let mut filters = HashMap::new();
        filters.insert(
            NONE_FILTER.to_string(),
            FilterEntry {
                name: NONE_FILTER.to_string(),
                label: NONE_FILTER.to_string(),
                lut: None,
            },
        );
        Self {
            filters,
            active: RwLock::new(ActiveFilter {
                name: NONE_FILTER.to_string(),
                lut: None,
            }),
        }
    }

    /// Insert or overwrite a filter. The label defaults to the name.
    pub fn register(&mut self, name: impl Into<String>, lut: Option<Lut3D>) {
        let name = name.into();
        let label = name.clone();
        self.register_labeled(name, label, lut.map(Arc::new));
    }

    /// Insert or overwrite a filter with a display label and a shared LUT.
    ///
    /// `"None"` stays a pass-through; attempts to attach a LUT to it are
    /// ignored. Overwriting the active filter also swaps the active LUT.
    pub fn register_labeled(
        &mut self,
        name: impl Into<String>,
        label: impl Into<String>,
        lut: Option<Arc<Lut3D>>,
    ) {
        let name = name.into();
        if name == NONE_FILTER && lut.is_some() {
            tracing::warn!("refusing to attach a LUT to the reserved `{NONE_FILTER}` filter");
            return;
        }

        {
            let mut active = self.active.write();
            if active.name == name {
                active.lut = lut.clone();
            }
        }

        let entry = FilterEntry {
            name: name.clone(),
            label: label.into(),
            lut,
        };
        if self.filters.insert(name.clone(), entry).is_some() {
            tracing::debug!("filter `{name}` overwritten");
        }
    }

    /// Register every `*.cube` file in `dir`, named by file stem.
    ///
    /// Files that fail to parse are logged and skipped. Returns the number
    /// of filters registered.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, GradeError> {
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("cube"))
            })
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match Lut3D::load_cube(&path) {
                Ok(lut) => {
                    let label = lut.title().unwrap_or(name).to_string();
                    self.register_labeled(name, label, Some(Arc::new(lut)));
                    loaded += 1;
                }
                Err(e) => tracing::warn!("skipping {}: {e}", path.display()),
            }
        }

        tracing::info!(
            "Initialized {} filters ({loaded} from {})",
            self.filters.len(),
            dir.display()
        );
        Ok(loaded)
    }

    /// Make `name` the active filter for all subsequent frames.
    ///
    /// Unknown names return [`GradeError::UnknownFilter`] and keep the
    /// previous selection.
    pub fn select(&self, name: &str) -> Result<(), GradeError> {
        let Some(entry) = self.filters.get(name) else {
            tracing::warn!("Filter not found: {name}");
            return Err(GradeError::UnknownFilter(name.to_string()));
        };

        *self.active.write() = ActiveFilter {
            name: entry.name.clone(),
            lut: entry.lut.clone(),
        };
        tracing::debug!("Filter: {name}");
        Ok(())
    }

    /// Snapshot of the active LUT; `None` means pass-through.
    pub fn active_lut(&self) -> Option<Arc<Lut3D>> {
        self.active.read().lut.clone()
    }

    pub fn active_name(&self) -> String {
        self.active.read().name.clone()
    }

    pub fn get(&self, name: &str) -> Option<&FilterEntry> {
        self.filters.get(name)
    }

    /// Filter names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Catalog entries sorted by name.
    pub fn entries(&self) -> Vec<&FilterEntry> {
        let mut entries: Vec<&FilterEntry> = self.filters.values().collect();
        entries.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Reserved entry point for installing a LUT from raw bytes.
    ///
    /// Always reports success and installs nothing: catalog LUTs come from
    /// `.cube` files or are registered in code. Callers must not rely on
    /// this having an effect.
    pub fn load_lut(&self, bytes: &[u8]) -> bool {
        tracing::debug!(
            "load_lut ignored {} bytes; catalog LUTs are in use",
            bytes.len()
        );
        true
    }
}
