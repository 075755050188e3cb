//! Sources manifest: version-keyed acquisition records.
//!
//! The manifest pins every upstream release the recipe knows how to
//! build: download URL, archive checksum, and the patches to apply. A
//! copy ships embedded in the binary; a `sources.toml` in the working
//! directory overrides it.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Acquisition record for one upstream release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Upstream version string.
    pub version: String,
    /// Archive download URL.
    pub url: String,
    /// Expected SHA-256 of the archive, lowercase hex.
    pub sha256: String,
    /// Recipe patches to apply after extraction, relative to the
    /// manifest's directory.
    #[serde(default)]
    pub patches: Vec<String>,
}

/// All pinned upstream releases, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesManifest {
    #[serde(rename = "source")]
    pub sources: Vec<SourceEntry>,
}

impl SourcesManifest {
    /// The manifest compiled into the binary.
    pub fn builtin() -> Self {
        toml::from_str(include_str!("../sources.toml")).expect("embedded sources.toml is valid")
    }

    /// Load a manifest from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read sources manifest {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("invalid sources manifest {}", path.display()))
    }

    /// Load `sources.toml` from the base directory if present, the
    /// embedded manifest otherwise.
    pub fn load_or_builtin(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join("sources.toml");
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::builtin())
        }
    }

    /// Find the acquisition record for a version.
    pub fn lookup(&self, version: &str) -> Result<&SourceEntry> {
        self.sources
            .iter()
            .find(|s| s.version == version)
            .with_context(|| {
                format!(
                    "unknown soxr version '{}' (known versions: {})",
                    version,
                    self.known_versions().join(", ")
                )
            })
    }

    /// The newest pinned version.
    pub fn default_version(&self) -> Result<&str> {
        self.sources
            .first()
            .map(|s| s.version.as_str())
            .context("sources manifest has no entries")
    }

    /// All pinned versions, manifest order.
    pub fn known_versions(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.version.as_str()).collect()
    }
}
