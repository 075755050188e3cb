//! Target platform description.
//!
//! The platform is an immutable input record: the resolver only reads
//! os/arch/compiler to pick toolchain variables and component metadata,
//! it never mutates it. Profiles can be loaded from TOML; malformed
//! descriptors fail there, at the loading boundary, so the resolver
//! itself stays total.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Operating system of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    FreeBsd,
    Windows,
    Macos,
    Other,
}

impl Os {
    /// Whether binaries on this OS link the separate math library.
    pub fn links_libm(&self) -> bool {
        matches!(self, Os::Linux | Os::FreeBsd)
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Os::Linux => "Linux",
            Os::FreeBsd => "FreeBSD",
            Os::Windows => "Windows",
            Os::Macos => "macOS",
            Os::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Processor architecture of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    #[serde(rename = "x86_64")]
    X86_64,
    Armv8,
    Other,
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Arch::X86_64 => "x86_64",
            Arch::Armv8 => "armv8",
            Arch::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Compiler family driving the build.
///
/// Closed enumeration: everything the rules don't recognize maps to
/// `Other` and degrades to empty flag sets rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compiler {
    Msvc,
    Gcc,
    Clang,
    AppleClang,
    Other,
}

impl Compiler {
    /// Link flags that enable OpenMP for this compiler family.
    ///
    /// Unrecognized compilers get no flags; the build proceeds without
    /// OpenMP rather than failing.
    pub fn openmp_flags(&self) -> &'static [&'static str] {
        match self {
            Compiler::Msvc => &["-openmp"],
            Compiler::Gcc | Compiler::Clang => &["-fopenmp"],
            Compiler::AppleClang => &["-Xpreprocessor", "-fopenmp"],
            Compiler::Other => &[],
        }
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compiler::Msvc => "msvc",
            Compiler::Gcc => "gcc",
            Compiler::Clang => "clang",
            Compiler::AppleClang => "apple-clang",
            Compiler::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// MSVC runtime linkage. `Dynamic` is /MD, `Static` is /MT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MsvcRuntime {
    Static,
    Dynamic,
}

/// Immutable description of the build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Platform {
    /// Target operating system.
    pub os: Os,
    /// Target architecture.
    pub arch: Arch,
    /// Compiler family.
    pub compiler: Compiler,
    /// Compiler version, recorded for provenance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_version: Option<String>,
    /// Runtime linkage; only meaningful when compiler is msvc.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msvc_runtime: Option<MsvcRuntime>,
}

impl Platform {
    /// Describe the build host.
    pub fn host() -> Self {
        let os = if cfg!(target_os = "linux") {
            Os::Linux
        } else if cfg!(target_os = "freebsd") {
            Os::FreeBsd
        } else if cfg!(target_os = "windows") {
            Os::Windows
        } else if cfg!(target_os = "macos") {
            Os::Macos
        } else {
            Os::Other
        };

        let arch = if cfg!(target_arch = "x86_64") {
            Arch::X86_64
        } else if cfg!(target_arch = "aarch64") {
            Arch::Armv8
        } else {
            Arch::Other
        };

        let compiler = match os {
            Os::Windows => Compiler::Msvc,
            Os::Macos => Compiler::AppleClang,
            _ => Compiler::Gcc,
        };

        // MSVC defaults to the dynamic runtime unless a profile says otherwise
        let msvc_runtime = match compiler {
            Compiler::Msvc => Some(MsvcRuntime::Dynamic),
            _ => None,
        };

        Self {
            os,
            arch,
            compiler,
            compiler_version: None,
            msvc_runtime,
        }
    }

    /// Load a platform profile from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read platform profile {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("invalid platform profile {}", path.display()))
    }
}
