//! Upstream source acquisition.
//!
//! Download, verify, extract, patch. Each step is skipped when its
//! output already exists; failures are fatal and abort the whole
//! sequence.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};

use crate::layout::RecipePaths;
use crate::manifest::SourceEntry;
use crate::process::Cmd;

/// Download the source archive if not already cached, then verify it.
pub fn fetch(paths: &RecipePaths, entry: &SourceEntry) -> Result<PathBuf> {
    fs::create_dir_all(&paths.downloads)?;
    let archive = paths.archive(url_file_name(&entry.url));

    if archive.exists() {
        println!("Source archive: {} (cached)", archive.display());
    } else {
        println!("Downloading soxr {}...", entry.version);
        println!("  URL: {}", entry.url);

        Cmd::new("curl")
            .args(["-L", "-o"])
            .arg_path(&archive)
            .args(["--progress-bar", &entry.url])
            .error_msg("Failed to download soxr source archive")
            .run_interactive()?;

        println!("Source archive: {} (downloaded)", archive.display());
    }

    println!("Verifying checksum...");
    verify_sha256(&archive, &entry.sha256).context("source archive checksum verification failed")?;

    Ok(archive)
}

/// Extract the archive into the source directory, stripping the
/// archive's root directory.
pub fn extract(paths: &RecipePaths, archive: &Path) -> Result<()> {
    // CMakeLists.txt marks a complete extraction
    if paths.source.join("CMakeLists.txt").exists() {
        println!("Source already extracted to {}", paths.source.display());
        return Ok(());
    }

    println!("Extracting source archive...");
    fs::create_dir_all(&paths.source)?;

    Cmd::new("tar")
        .args(["xf"])
        .arg_path(archive)
        .args(["--strip-components=1", "-C"])
        .arg_path(&paths.source)
        .error_msg("Failed to extract soxr source archive")
        .run()?;

    if !paths.source.join("CMakeLists.txt").exists() {
        bail!(
            "extraction incomplete: CMakeLists.txt not found.\n\
             Expected at: {}",
            paths.source.join("CMakeLists.txt").display()
        );
    }

    println!("Source extracted to {}", paths.source.display());
    Ok(())
}

/// Apply recipe patches to the extracted source tree.
pub fn apply_patches(paths: &RecipePaths, patches: &[String]) -> Result<()> {
    for patch in patches {
        let patch_file = paths.base.join(patch);
        if !patch_file.exists() {
            bail!("patch not found: {}", patch_file.display());
        }
        // patch runs from inside the source tree, so the file path must
        // survive the directory change
        let patch_file = fs::canonicalize(&patch_file)?;

        println!("Applying {}...", patch);
        Cmd::new("patch")
            .args(["-p1", "-i"])
            .arg_path(&patch_file)
            .current_dir(&paths.source)
            .error_msg(format!("Failed to apply patch {}", patch))
            .run()?;
    }
    Ok(())
}

/// Full acquisition workflow: fetch, verify, extract, patch.
pub fn acquire(paths: &RecipePaths, entry: &SourceEntry) -> Result<()> {
    let archive = fetch(paths, entry)?;
    extract(paths, &archive)?;
    apply_patches(paths, &entry.patches)?;
    Ok(())
}

/// Verify a file against an expected SHA-256 digest (lowercase hex).
pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let data =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let digest = Sha256::digest(&data);
    let actual: String = digest.iter().map(|b| format!("{:02x}", b)).collect();

    if !actual.eq_ignore_ascii_case(expected) {
        bail!(
            "checksum mismatch for {}:\n  expected: {}\n  actual:   {}",
            path.display(),
            expected,
            actual
        );
    }
    Ok(())
}

/// File name component of a download URL.
fn url_file_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
