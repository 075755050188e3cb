//! Preflight checks for recipe prerequisites.
//!
//! Validates that the external tools are installed BEFORE starting
//! expensive operations like downloading or building, and reports what
//! is already cached.

use std::path::Path;

use crate::layout::RecipePaths;
use crate::process::which;

/// Required host tools with their role and install suggestion.
const REQUIRED_TOOLS: &[(&str, &str, &str)] = &[
    ("cmake", "Configure and build soxr", "sudo dnf install cmake"),
    ("curl", "Download the source archive", "sudo dnf install curl"),
    ("tar", "Extract the source archive", "sudo dnf install tar"),
    ("patch", "Apply recipe patches", "sudo dnf install patch"),
];

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check.
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Human-readable message.
    pub message: String,
    /// Optional suggestion for fixing the issue.
    pub suggestion: Option<String>,
}

impl CheckResult {
    /// Create a passing check result.
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Create a failing check result.
    pub fn fail(
        name: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }
}

/// Preflight report: tool checks plus cache status.
#[derive(Debug, Default)]
pub struct PreflightReport {
    /// All check results.
    pub checks: Vec<CheckResult>,
    /// What is already on disk.
    pub cache_status: CacheStatus,
}

impl PreflightReport {
    /// Whether all checks passed.
    pub fn is_ok(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Count of passing checks.
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Print a summary of the preflight checks.
    pub fn print_summary(&self) {
        println!("=== Preflight Check Results ===\n");

        for check in &self.checks {
            let status = if check.passed { "[OK]" } else { "[FAIL]" };
            println!("{} {}: {}", status, check.name, check.message);
            if let Some(suggestion) = &check.suggestion {
                println!("     Suggestion: {}", suggestion);
            }
        }

        println!();
        self.cache_status.print();

        println!();
        if self.is_ok() {
            println!(
                "All preflight checks passed ({}/{})",
                self.passed_count(),
                self.checks.len()
            );
        } else {
            println!(
                "Preflight checks failed: {} of {} passed",
                self.passed_count(),
                self.checks.len()
            );
        }
    }
}

/// Status of cached recipe state.
#[derive(Debug, Default)]
pub struct CacheStatus {
    /// A source archive is downloaded.
    pub has_archive: bool,
    /// The source tree is extracted.
    pub has_source: bool,
    /// The build tree is configured.
    pub has_build: bool,
    /// The package tree is installed.
    pub has_package: bool,
}

impl CacheStatus {
    /// Print cache status.
    pub fn print(&self) {
        let status = |b: bool| if b { "[cached]" } else { "[missing]" };

        println!("{}  Source archive", status(self.has_archive));
        println!("{}  Extracted source", status(self.has_source));
        println!("{}  Configured build tree", status(self.has_build));
        println!("{}  Installed package", status(self.has_package));
    }
}

/// Check that all required host tools are installed.
pub fn check_host_tools() -> Vec<CheckResult> {
    REQUIRED_TOOLS
        .iter()
        .map(|(tool, purpose, install)| match which(tool) {
            Some(path) => CheckResult::pass(
                format!("{} tool", tool),
                format!("Found at {} ({})", path.display(), purpose),
            ),
            None => CheckResult::fail(
                format!("{} tool", tool),
                format!("Not found (needed for: {})", purpose),
                *install,
            ),
        })
        .collect()
}

/// Check what's already on disk for this base directory.
pub fn check_cache_status(base_dir: &Path) -> CacheStatus {
    let paths = RecipePaths::new(base_dir);

    let has_archive = std::fs::read_dir(&paths.downloads)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);

    CacheStatus {
        has_archive,
        has_source: paths.source.join("CMakeLists.txt").exists(),
        has_build: paths.build.join("CMakeCache.txt").exists(),
        has_package: paths.package.exists(),
    }
}

/// Run all preflight checks and return a report.
pub fn run(base_dir: &Path) -> PreflightReport {
    PreflightReport {
        checks: check_host_tools(),
        cache_status: check_cache_status(base_dir),
    }
}
