//! Build-configuration resolution.
//!
//! Maps (options, platform, version) to everything one build invocation
//! needs: the normalized option set, the toolchain variables forwarded
//! to the external CMake build, and the component metadata graph the
//! package manager republishes.
//!
//! Resolution is a pure function: no filesystem, no process state, and
//! every input combination yields a valid (if degenerate) output. The
//! only failure mode is an unparseable version string.

mod components;
mod toolchain;

pub use components::{components, PackageComponent};
pub use toolchain::{ToolchainMap, ToolchainValue};

use anyhow::Result;

use crate::options::RecipeOptions;
use crate::platform::Platform;
use crate::version::parse_lenient;

/// Everything the resolver produces for one build invocation.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Options after platform normalization.
    pub options: RecipeOptions,
    /// Variables forwarded to the external build tool.
    pub toolchain: ToolchainMap,
    /// Component metadata graph (`core`, optionally `lsr`).
    pub components: Vec<PackageComponent>,
}

/// Resolve a declared option set against a target platform and version.
pub fn resolve(options: &RecipeOptions, platform: &Platform, version: &str) -> Result<Resolution> {
    let options = options.clone().normalized(platform);
    let version = parse_lenient(version)?;

    let toolchain = toolchain::generate(&options, platform, &version);
    let components = components::components(&options, platform);

    Ok(Resolution {
        options,
        toolchain,
        components,
    })
}
