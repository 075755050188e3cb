//! Lenient version parsing for threshold comparisons.
//!
//! Upstream release tags are often two-component ("3.20"); `semver`
//! wants all three. Missing components are padded with zeros before
//! parsing, and anything else fails fast as unparseable rather than
//! silently skipping the comparison.

use anyhow::{bail, Context, Result};

pub use semver::Version;

/// Parse "3", "3.20", or "3.20.1" into a full semantic version.
pub fn parse_lenient(s: &str) -> Result<Version> {
    let s = s.trim();
    if s.is_empty() {
        bail!("unparseable version: empty string");
    }

    let padded = match s.matches('.').count() {
        0 => format!("{}.0.0", s),
        1 => format!("{}.0", s),
        _ => s.to_string(),
    };

    Version::parse(&padded).with_context(|| format!("unparseable version '{}'", s))
}
