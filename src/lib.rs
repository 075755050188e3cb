//! soxr package recipe library.
//!
//! Building blocks for fetching, building, and packaging the SoX
//! Resampler library (libsoxr) for a binary package manager.
//!
//! The core is [`resolve::resolve`]: a pure function from declared
//! options, a target platform, and an upstream version to the toolchain
//! variables handed to the external CMake build and the component
//! metadata graph the package manager republishes.

pub mod build;
pub mod layout;
pub mod manifest;
pub mod options;
pub mod package;
pub mod platform;
pub mod preflight;
pub mod process;
pub mod resolve;
pub mod source;
pub mod version;
