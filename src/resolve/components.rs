//! Package component metadata.
//!
//! The package manager consumes a small graph of named components:
//! `core` (always) and `lsr` (the libsamplerate-compatible bindings,
//! when enabled). Each component names its libraries, system
//! dependencies, preprocessor defines, and link flags.

use serde::Serialize;

use crate::options::RecipeOptions;
use crate::platform::{Os, Platform};

/// One independently linkable unit of the packaged library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageComponent {
    /// Component name within the package.
    pub name: String,
    /// Name exposed to pkg-config consumers.
    pub pkg_config_name: String,
    /// Libraries this component links.
    pub libs: Vec<String>,
    /// System libraries required on the target.
    pub system_libs: Vec<String>,
    /// Preprocessor defines consumers must set.
    pub defines: Vec<String>,
    /// Link flags for executables.
    pub exelinkflags: Vec<String>,
    /// Link flags for shared libraries.
    pub sharedlinkflags: Vec<String>,
    /// Components this one depends on, within the package.
    pub requires: Vec<String>,
}

/// Emit the component graph for one build invocation.
pub fn components(options: &RecipeOptions, platform: &Platform) -> Vec<PackageComponent> {
    let mut all = vec![core_component(options, platform)];
    if options.with_lsr_bindings {
        all.push(lsr_component(options, platform));
    }
    all
}

/// Consumers of the DLL need SOXR_DLL to pick up dllimport.
fn dll_defines(options: &RecipeOptions, platform: &Platform) -> Vec<String> {
    if platform.os == Os::Windows && options.shared {
        vec!["SOXR_DLL".to_string()]
    } else {
        Vec::new()
    }
}

fn core_component(options: &RecipeOptions, platform: &Platform) -> PackageComponent {
    let system_libs = if platform.os.links_libm() {
        vec!["m".to_string()]
    } else {
        Vec::new()
    };

    // Static builds leave OpenMP linkage to the consumer.
    let openmp_flags: Vec<String> = if !options.shared && options.with_openmp {
        platform
            .compiler
            .openmp_flags()
            .iter()
            .map(|f| f.to_string())
            .collect()
    } else {
        Vec::new()
    };

    PackageComponent {
        name: "core".to_string(),
        pkg_config_name: "soxr".to_string(),
        libs: vec!["soxr".to_string()],
        system_libs,
        defines: dll_defines(options, platform),
        exelinkflags: openmp_flags.clone(),
        sharedlinkflags: openmp_flags,
        requires: Vec::new(),
    }
}

fn lsr_component(options: &RecipeOptions, platform: &Platform) -> PackageComponent {
    PackageComponent {
        name: "lsr".to_string(),
        pkg_config_name: "soxr-lsr".to_string(),
        libs: vec!["soxr-lsr".to_string()],
        defines: dll_defines(options, platform),
        requires: vec!["core".to_string()],
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, Compiler, MsvcRuntime};

    fn platform(os: Os, compiler: Compiler) -> Platform {
        Platform {
            os,
            arch: Arch::X86_64,
            compiler,
            compiler_version: None,
            msvc_runtime: match compiler {
                Compiler::Msvc => Some(MsvcRuntime::Dynamic),
                _ => None,
            },
        }
    }

    fn core_of(components: &[PackageComponent]) -> &PackageComponent {
        components.iter().find(|c| c.name == "core").unwrap()
    }

    #[test]
    fn core_always_present_with_soxr_lib() {
        let all = components(
            &RecipeOptions::default().normalized(&platform(Os::Linux, Compiler::Gcc)),
            &platform(Os::Linux, Compiler::Gcc),
        );
        let core = core_of(&all);
        assert_eq!(core.pkg_config_name, "soxr");
        assert_eq!(core.libs, vec!["soxr"]);
        assert!(core.requires.is_empty());
    }

    #[test]
    fn lsr_requires_exactly_core() {
        let p = platform(Os::Linux, Compiler::Gcc);
        let all = components(&RecipeOptions::default().normalized(&p), &p);
        let lsr = all.iter().find(|c| c.name == "lsr").unwrap();
        assert_eq!(lsr.pkg_config_name, "soxr-lsr");
        assert_eq!(lsr.libs, vec!["soxr-lsr"]);
        assert_eq!(lsr.requires, vec!["core"]);
    }

    #[test]
    fn lsr_absent_when_bindings_disabled() {
        let p = platform(Os::Linux, Compiler::Gcc);
        let options = RecipeOptions {
            with_lsr_bindings: false,
            ..Default::default()
        }
        .normalized(&p);
        let all = components(&options, &p);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "core");
    }

    #[test]
    fn libm_only_on_linux_and_freebsd() {
        for (os, expect_m) in [
            (Os::Linux, true),
            (Os::FreeBsd, true),
            (Os::Windows, false),
            (Os::Macos, false),
            (Os::Other, false),
        ] {
            let p = platform(os, Compiler::Gcc);
            let all = components(&RecipeOptions::default().normalized(&p), &p);
            let expected: Vec<String> = if expect_m {
                vec!["m".to_string()]
            } else {
                Vec::new()
            };
            assert_eq!(core_of(&all).system_libs, expected, "os {}", os);
        }
    }

    #[test]
    fn windows_shared_defines_soxr_dll_on_both_components() {
        let p = platform(Os::Windows, Compiler::Msvc);
        let options = RecipeOptions {
            shared: true,
            ..Default::default()
        }
        .normalized(&p);
        let all = components(&options, &p);
        for component in &all {
            assert_eq!(
                component.defines,
                vec!["SOXR_DLL"],
                "component {}",
                component.name
            );
        }
    }

    #[test]
    fn windows_static_has_no_dll_define() {
        let p = platform(Os::Windows, Compiler::Msvc);
        let all = components(&RecipeOptions::default().normalized(&p), &p);
        assert!(core_of(&all).defines.is_empty());
    }

    #[test]
    fn static_openmp_links_by_compiler_family() {
        for (compiler, expected) in [
            (Compiler::Msvc, vec!["-openmp"]),
            (Compiler::Gcc, vec!["-fopenmp"]),
            (Compiler::Clang, vec!["-fopenmp"]),
            (Compiler::AppleClang, vec!["-Xpreprocessor", "-fopenmp"]),
            (Compiler::Other, vec![]),
        ] {
            let p = platform(Os::Linux, compiler);
            let options = RecipeOptions {
                with_openmp: true,
                ..Default::default()
            }
            .normalized(&p);
            let all = components(&options, &p);
            let core = core_of(&all);
            assert_eq!(core.exelinkflags, expected, "compiler {}", compiler);
            assert_eq!(core.sharedlinkflags, expected, "compiler {}", compiler);
        }
    }

    #[test]
    fn shared_build_carries_no_openmp_link_flags() {
        let p = platform(Os::Linux, Compiler::Gcc);
        let options = RecipeOptions {
            shared: true,
            with_openmp: true,
            ..Default::default()
        }
        .normalized(&p);
        let all = components(&options, &p);
        assert!(core_of(&all).exelinkflags.is_empty());
        assert!(core_of(&all).sharedlinkflags.is_empty());
    }
}
