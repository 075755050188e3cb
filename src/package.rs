//! Post-install artifact shaping.
//!
//! After CMake installs into the package prefix, the recipe puts the
//! license texts where the package manager expects them, removes trees
//! that must not ship, and emits the component metadata graph. All of
//! these operations are idempotent and order-independent.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::layout::RecipePaths;
use crate::resolve::{PackageComponent, Resolution};

/// Anchors delimiting the PFFFT license comment inside src/pffft.c.
const PFFFT_LICENSE_START: &str = "/* Copyright";
const PFFFT_LICENSE_END: &str = "modern CPUs.";

/// Install-tree directories the package must not ship.
const PRUNE_DIRS: &[&str] = &["doc", "lib/pkgconfig", "share"];

/// Shape the install tree for packaging.
pub fn shape(paths: &RecipePaths, resolution: &Resolution, version: &str) -> Result<()> {
    copy_main_license(paths)?;
    extract_pffft_license(&paths.source, &paths.package)?;
    prune_install_tree(&paths.package)?;

    let metadata_path = paths.package.join("soxr-metadata.json");
    let json = render_metadata(resolution, version)?;
    fs::write(&metadata_path, json)
        .with_context(|| format!("failed to write {}", metadata_path.display()))?;
    println!("  Metadata: {}", metadata_path.display());

    Ok(())
}

/// Copy the upstream LICENCE file into licenses/.
fn copy_main_license(paths: &RecipePaths) -> Result<()> {
    // Upstream ships the British spelling
    let src = paths.source.join("LICENCE");
    let dst_dir = paths.licenses();
    fs::create_dir_all(&dst_dir)?;
    fs::copy(&src, dst_dir.join("LICENCE"))
        .with_context(|| format!("failed to copy license from {}", src.display()))?;
    Ok(())
}

/// Extract the PFFFT license comment embedded in src/pffft.c and write
/// it as licenses/LICENSE.
///
/// The text between the two anchors is the license. A missing anchor
/// means the bundled source changed shape; that is a hard error and no
/// output file is written.
pub fn extract_pffft_license(source: &Path, package: &Path) -> Result<()> {
    let pffft = source.join("src").join("pffft.c");
    let text = fs::read_to_string(&pffft)
        .with_context(|| format!("failed to read {}", pffft.display()))?;

    let start = text.find(PFFFT_LICENSE_START).with_context(|| {
        format!(
            "license start anchor '{}' not found in {}",
            PFFFT_LICENSE_START,
            pffft.display()
        )
    })?;
    let end = text[start..]
        .find(PFFFT_LICENSE_END)
        .map(|offset| start + offset)
        .with_context(|| {
            format!(
                "license end anchor '{}' not found in {}",
                PFFFT_LICENSE_END,
                pffft.display()
            )
        })?;

    // Keep the text from "Copyright" through the final sentence
    let license = &text[start + 3..end + PFFFT_LICENSE_END.len()];

    let dst_dir = package.join("licenses");
    fs::create_dir_all(&dst_dir)?;
    fs::write(dst_dir.join("LICENSE"), license)?;
    Ok(())
}

/// Remove documentation, pkg-config, and share trees from the install
/// prefix. Missing directories are a no-op.
pub fn prune_install_tree(package: &Path) -> Result<()> {
    for dir in PRUNE_DIRS {
        let path = package.join(dir);
        if path.exists() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
    }
    Ok(())
}

/// Metadata graph consumed by the package manager.
#[derive(Debug, Serialize)]
struct PackageMetadata<'a> {
    name: &'a str,
    version: &'a str,
    license: &'a str,
    components: &'a [PackageComponent],
}

/// Render the package metadata graph as pretty JSON.
pub fn render_metadata(resolution: &Resolution, version: &str) -> Result<String> {
    let metadata = PackageMetadata {
        name: "soxr",
        version,
        license: "LGPL-2.1-or-later",
        components: &resolution.components,
    };
    serde_json::to_string_pretty(&metadata).context("failed to serialize package metadata")
}
