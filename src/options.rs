//! Declared recipe options.
//!
//! Four options control the build: `shared`, `fpic`, `with-openmp`, and
//! `with-lsr-bindings`. Normalization removes `fpic` where it has no
//! meaning (shared builds, Windows), so the invariant "fpic is undefined
//! when shared or on Windows" holds everywhere past the loading
//! boundary.

use serde::{Deserialize, Serialize};

use crate::platform::{Os, Platform};

/// Option set for one build invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RecipeOptions {
    /// Build shared libraries instead of static archives.
    pub shared: bool,
    /// Position-independent code for static builds. `None` means the
    /// option is undefined for this configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fpic: Option<bool>,
    /// Enable OpenMP parallel resampling.
    pub with_openmp: bool,
    /// Build the libsamplerate-compatible lsr bindings.
    pub with_lsr_bindings: bool,
}

impl Default for RecipeOptions {
    fn default() -> Self {
        Self {
            shared: false,
            fpic: Some(true),
            with_openmp: false,
            with_lsr_bindings: true,
        }
    }
}

impl RecipeOptions {
    /// Drop options that have no meaning on this platform.
    ///
    /// `fpic` only applies to static builds on non-Windows targets.
    pub fn normalized(mut self, platform: &Platform) -> Self {
        if self.shared || platform.os == Os::Windows {
            self.fpic = None;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, Compiler, MsvcRuntime};

    fn platform(os: Os) -> Platform {
        Platform {
            os,
            arch: Arch::X86_64,
            compiler: match os {
                Os::Windows => Compiler::Msvc,
                Os::Macos => Compiler::AppleClang,
                _ => Compiler::Gcc,
            },
            compiler_version: None,
            msvc_runtime: match os {
                Os::Windows => Some(MsvcRuntime::Dynamic),
                _ => None,
            },
        }
    }

    #[test]
    fn defaults_match_recipe() {
        let opts = RecipeOptions::default();
        assert!(!opts.shared);
        assert_eq!(opts.fpic, Some(true));
        assert!(!opts.with_openmp);
        assert!(opts.with_lsr_bindings);
    }

    #[test]
    fn windows_never_defines_fpic() {
        let opts = RecipeOptions::default().normalized(&platform(Os::Windows));
        assert_eq!(opts.fpic, None);
    }

    #[test]
    fn shared_drops_fpic_on_every_platform() {
        for os in [Os::Linux, Os::FreeBsd, Os::Windows, Os::Macos] {
            let opts = RecipeOptions {
                shared: true,
                ..Default::default()
            }
            .normalized(&platform(os));
            assert_eq!(opts.fpic, None, "fpic should be undefined on {}", os);
        }
    }

    #[test]
    fn static_unix_build_keeps_fpic() {
        let opts = RecipeOptions::default().normalized(&platform(Os::Linux));
        assert_eq!(opts.fpic, Some(true));
    }

    #[test]
    fn partial_profile_fills_defaults() {
        let opts: RecipeOptions = toml::from_str("shared = true\n").unwrap();
        assert!(opts.shared);
        assert!(opts.with_lsr_bindings);
        assert!(!opts.with_openmp);
    }
}
