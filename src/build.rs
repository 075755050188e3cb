//! External build-tool invocation.
//!
//! CMake is an opaque collaborator: the recipe hands it the resolved
//! variable map and an install prefix, then waits for it to finish.
//! Failures abort the sequence immediately; there is no retry.

use std::fs;

use anyhow::{bail, Result};

use crate::layout::RecipePaths;
use crate::process::Cmd;
use crate::resolve::ToolchainMap;

/// Configure the build tree from the resolved toolchain variables.
pub fn configure(paths: &RecipePaths, toolchain: &ToolchainMap) -> Result<()> {
    if !paths.source.join("CMakeLists.txt").exists() {
        bail!(
            "soxr source not found at {}.\n\
             Run 'soxr-recipe source' first.",
            paths.source.display()
        );
    }
    fs::create_dir_all(&paths.build)?;

    println!("Configuring build...");
    for (key, value) in toolchain.iter() {
        println!("  {} = {}", key, value);
    }

    let mut cmd = Cmd::new("cmake")
        .arg("-S")
        .arg_path(&paths.source)
        .arg("-B")
        .arg_path(&paths.build)
        .arg(format!(
            "-DCMAKE_INSTALL_PREFIX={}",
            paths.package.display()
        ));
    for arg in toolchain.to_cmake_args() {
        cmd = cmd.arg(arg);
    }

    cmd.error_msg("CMake configure failed. Install: sudo dnf install cmake")
        .run_interactive()
}

/// Compile the configured build tree.
pub fn compile(paths: &RecipePaths) -> Result<()> {
    if !paths.build.join("CMakeCache.txt").exists() {
        bail!(
            "build tree not configured at {}.\n\
             Run 'soxr-recipe build' first.",
            paths.build.display()
        );
    }

    println!("Building soxr...");
    Cmd::new("cmake")
        .arg("--build")
        .arg_path(&paths.build)
        .error_msg("CMake build failed")
        .run_interactive()
}

/// Install the built artifacts into the package prefix.
pub fn install(paths: &RecipePaths) -> Result<()> {
    if !paths.build.join("CMakeCache.txt").exists() {
        bail!(
            "build tree not configured at {}.\n\
             Run 'soxr-recipe build' first.",
            paths.build.display()
        );
    }

    println!("Installing into {}...", paths.package.display());
    Cmd::new("cmake")
        .arg("--install")
        .arg_path(&paths.build)
        .error_msg("CMake install failed")
        .run_interactive()
}
