//! Toolchain variable generation.
//!
//! Each rule writes its own keys, so evaluation order never matters.
//! The map is ordered (BTreeMap) to keep generated command lines and
//! printed output deterministic.

use std::collections::BTreeMap;

use semver::Version;
use serde::Serialize;

use crate::options::RecipeOptions;
use crate::platform::{Arch, Compiler, MsvcRuntime, Os, Platform};

/// Value of a single toolchain variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ToolchainValue {
    Bool(bool),
    Str(String),
}

impl std::fmt::Display for ToolchainValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolchainValue::Bool(true) => write!(f, "ON"),
            ToolchainValue::Bool(false) => write!(f, "OFF"),
            ToolchainValue::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Ordered variable map handed to the external build tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolchainMap(BTreeMap<String, ToolchainValue>);

impl ToolchainMap {
    fn set_bool(&mut self, key: &str, value: bool) {
        self.0.insert(key.to_string(), ToolchainValue::Bool(value));
    }

    fn set_str(&mut self, key: &str, value: &str) {
        self.0
            .insert(key.to_string(), ToolchainValue::Str(value.to_string()));
    }

    /// Look up a variable.
    pub fn get(&self, key: &str) -> Option<&ToolchainValue> {
        self.0.get(key)
    }

    /// Whether a variable is defined at all.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate variables in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ToolchainValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Render as `-DKEY=VALUE` arguments for a CMake command line.
    pub fn to_cmake_args(&self) -> Vec<String> {
        self.iter()
            .map(|(key, value)| format!("-D{}={}", key, value))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Generate the toolchain variables for one build invocation.
///
/// Expects options already normalized for `platform`.
pub(crate) fn generate(
    options: &RecipeOptions,
    platform: &Platform,
    version: &Version,
) -> ToolchainMap {
    let mut tc = ToolchainMap::default();

    // CMP0077=NEW keeps BUILD_SHARED_LIBS visible inside the soxr
    // subproject; without it the option() calls shadow the cache value.
    tc.set_str("CMAKE_POLICY_DEFAULT_CMP0077", "NEW");

    // Releases before 3.21 trip a CMP0115 source-extension warning.
    if *version < Version::new(3, 21, 0) {
        tc.set_str("CMAKE_POLICY_DEFAULT_CMP0115", "OLD");
    }

    if platform.compiler == Compiler::Msvc {
        let dynamic = platform.msvc_runtime == Some(MsvcRuntime::Dynamic);
        tc.set_bool("BUILD_SHARED_RUNTIME", dynamic);
    }

    // SIMD resample engines do not build on Apple Silicon.
    if platform.os == Os::Macos && platform.arch == Arch::Armv8 {
        tc.set_bool("WITH_CR32S", false);
        tc.set_bool("WITH_CR64S", false);
    }

    // The recipe never builds upstream's test suite.
    tc.set_bool("BUILD_TESTS", false);

    tc.set_bool("WITH_OPENMP", options.with_openmp);
    tc.set_bool("WITH_LSR_BINDINGS", options.with_lsr_bindings);

    tc.set_bool("BUILD_SHARED_LIBS", options.shared);
    if let Some(fpic) = options.fpic {
        tc.set_bool("CMAKE_POSITION_INDEPENDENT_CODE", fpic);
    }

    tc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::parse_lenient;

    fn linux_gcc() -> Platform {
        Platform {
            os: Os::Linux,
            arch: Arch::X86_64,
            compiler: Compiler::Gcc,
            compiler_version: None,
            msvc_runtime: None,
        }
    }

    fn generate_for(options: &RecipeOptions, platform: &Platform, version: &str) -> ToolchainMap {
        generate(
            &options.clone().normalized(platform),
            platform,
            &parse_lenient(version).unwrap(),
        )
    }

    #[test]
    fn option_visibility_policy_always_new() {
        let tc = generate_for(&RecipeOptions::default(), &linux_gcc(), "0.1.3");
        assert_eq!(
            tc.get("CMAKE_POLICY_DEFAULT_CMP0077"),
            Some(&ToolchainValue::Str("NEW".to_string()))
        );
    }

    #[test]
    fn legacy_policy_only_below_threshold() {
        let tc = generate_for(&RecipeOptions::default(), &linux_gcc(), "3.20");
        assert_eq!(
            tc.get("CMAKE_POLICY_DEFAULT_CMP0115"),
            Some(&ToolchainValue::Str("OLD".to_string()))
        );

        let tc = generate_for(&RecipeOptions::default(), &linux_gcc(), "3.22");
        assert!(!tc.contains("CMAKE_POLICY_DEFAULT_CMP0115"));
    }

    #[test]
    fn msvc_runtime_flag_tracks_linkage() {
        let mut platform = Platform {
            os: Os::Windows,
            arch: Arch::X86_64,
            compiler: Compiler::Msvc,
            compiler_version: None,
            msvc_runtime: Some(MsvcRuntime::Dynamic),
        };

        let tc = generate_for(&RecipeOptions::default(), &platform, "0.1.3");
        assert_eq!(
            tc.get("BUILD_SHARED_RUNTIME"),
            Some(&ToolchainValue::Bool(true))
        );

        platform.msvc_runtime = Some(MsvcRuntime::Static);
        let tc = generate_for(&RecipeOptions::default(), &platform, "0.1.3");
        assert_eq!(
            tc.get("BUILD_SHARED_RUNTIME"),
            Some(&ToolchainValue::Bool(false))
        );

        // Unset linkage is MSVC's static default
        platform.msvc_runtime = None;
        let tc = generate_for(&RecipeOptions::default(), &platform, "0.1.3");
        assert_eq!(
            tc.get("BUILD_SHARED_RUNTIME"),
            Some(&ToolchainValue::Bool(false))
        );
    }

    #[test]
    fn non_msvc_has_no_runtime_flag() {
        let tc = generate_for(&RecipeOptions::default(), &linux_gcc(), "0.1.3");
        assert!(!tc.contains("BUILD_SHARED_RUNTIME"));
    }

    #[test]
    fn apple_silicon_disables_simd_engines() {
        let platform = Platform {
            os: Os::Macos,
            arch: Arch::Armv8,
            compiler: Compiler::AppleClang,
            compiler_version: None,
            msvc_runtime: None,
        };
        let tc = generate_for(&RecipeOptions::default(), &platform, "0.1.3");
        assert_eq!(tc.get("WITH_CR32S"), Some(&ToolchainValue::Bool(false)));
        assert_eq!(tc.get("WITH_CR64S"), Some(&ToolchainValue::Bool(false)));

        // Intel Macs keep the SIMD engines
        let platform = Platform {
            arch: Arch::X86_64,
            ..platform
        };
        let tc = generate_for(&RecipeOptions::default(), &platform, "0.1.3");
        assert!(!tc.contains("WITH_CR32S"));
        assert!(!tc.contains("WITH_CR64S"));
    }

    #[test]
    fn tests_never_built() {
        for openmp in [false, true] {
            let options = RecipeOptions {
                with_openmp: openmp,
                ..Default::default()
            };
            let tc = generate_for(&options, &linux_gcc(), "0.1.3");
            assert_eq!(tc.get("BUILD_TESTS"), Some(&ToolchainValue::Bool(false)));
        }
    }

    #[test]
    fn feature_options_propagate_verbatim() {
        let options = RecipeOptions {
            with_openmp: true,
            with_lsr_bindings: false,
            ..Default::default()
        };
        let tc = generate_for(&options, &linux_gcc(), "0.1.3");
        assert_eq!(tc.get("WITH_OPENMP"), Some(&ToolchainValue::Bool(true)));
        assert_eq!(
            tc.get("WITH_LSR_BINDINGS"),
            Some(&ToolchainValue::Bool(false))
        );
    }

    #[test]
    fn fpic_forwarded_only_when_defined() {
        let tc = generate_for(&RecipeOptions::default(), &linux_gcc(), "0.1.3");
        assert_eq!(
            tc.get("CMAKE_POSITION_INDEPENDENT_CODE"),
            Some(&ToolchainValue::Bool(true))
        );

        let shared = RecipeOptions {
            shared: true,
            ..Default::default()
        };
        let tc = generate_for(&shared, &linux_gcc(), "0.1.3");
        assert!(!tc.contains("CMAKE_POSITION_INDEPENDENT_CODE"));
        assert_eq!(
            tc.get("BUILD_SHARED_LIBS"),
            Some(&ToolchainValue::Bool(true))
        );
    }

    #[test]
    fn cmake_args_render_on_off_and_strings() {
        let tc = generate_for(&RecipeOptions::default(), &linux_gcc(), "0.1.3");
        let args = tc.to_cmake_args();
        assert!(args.contains(&"-DBUILD_TESTS=OFF".to_string()));
        assert!(args.contains(&"-DCMAKE_POLICY_DEFAULT_CMP0077=NEW".to_string()));
        assert!(args.contains(&"-DCMAKE_POSITION_INDEPENDENT_CODE=ON".to_string()));
        // Deterministic ordering
        let mut sorted = args.clone();
        sorted.sort();
        assert_eq!(args, sorted);
    }
}
