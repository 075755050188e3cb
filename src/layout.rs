//! On-disk layout of one recipe invocation.

use std::path::{Path, PathBuf};

/// Paths used across the source, build, and package steps.
///
/// Everything lives under the base directory: `downloads/` holds the
/// verified archives, `source/` the extracted and patched tree,
/// `build/` the CMake build tree, and `package/` the install prefix
/// handed to the package manager.
pub struct RecipePaths {
    /// Base directory of the recipe invocation.
    pub base: PathBuf,
    /// Downloaded archives.
    pub downloads: PathBuf,
    /// Extracted upstream source.
    pub source: PathBuf,
    /// CMake build tree.
    pub build: PathBuf,
    /// Install prefix / final package tree.
    pub package: PathBuf,
}

impl RecipePaths {
    /// Create paths relative to the base directory.
    pub fn new(base_dir: &Path) -> Self {
        Self {
            downloads: base_dir.join("downloads"),
            source: base_dir.join("source"),
            build: base_dir.join("build"),
            package: base_dir.join("package"),
            base: base_dir.to_path_buf(),
        }
    }

    /// Archive location for an upstream file name.
    pub fn archive(&self, file_name: &str) -> PathBuf {
        self.downloads.join(file_name)
    }

    /// License directory inside the package tree.
    pub fn licenses(&self) -> PathBuf {
        self.package.join("licenses")
    }
}
