//! soxr recipe CLI
//!
//! Fetches, builds, and packages the SoX Resampler library (libsoxr)
//! for a binary package manager. The recipe resolves the declared
//! options against the target platform, hands CMake the resulting
//! variable map, and republishes the install tree with component
//! metadata.
//!
//! # Usage
//!
//! ```bash
//! # Check host prerequisites
//! soxr-recipe preflight
//!
//! # Download, verify, extract, and patch the upstream source
//! soxr-recipe source
//!
//! # Configure and compile (static by default)
//! soxr-recipe build
//!
//! # Shared build with OpenMP
//! soxr-recipe build --shared --openmp
//!
//! # Install, shape licenses, prune, and emit package metadata
//! soxr-recipe package
//!
//! # Inspect the resolved configuration without building
//! soxr-recipe resolve --openmp
//!
//! # Print the package metadata graph as JSON
//! soxr-recipe info
//!
//! # Show recipe status and next steps
//! soxr-recipe status
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use soxr_recipe::layout::RecipePaths;
use soxr_recipe::manifest::SourcesManifest;
use soxr_recipe::options::RecipeOptions;
use soxr_recipe::platform::Platform;
use soxr_recipe::resolve::{resolve, Resolution};
use soxr_recipe::{build, package, preflight, source};

#[derive(Parser)]
#[command(name = "soxr-recipe")]
#[command(author, version, about = "soxr package recipe", long_about = None)]
struct Cli {
    /// Working directory for downloads, build trees, and the package
    #[arg(long, global = true, default_value = ".")]
    base_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download, verify, extract, and patch the upstream source
    Source(RecipeArgs),

    /// Configure and compile with the resolved toolchain variables
    Build(RecipeArgs),

    /// Install, shape licenses, prune, and emit package metadata
    Package(RecipeArgs),

    /// Print the resolved toolchain variables and component graph
    Resolve(RecipeArgs),

    /// Print the package metadata graph as JSON
    Info(RecipeArgs),

    /// Check host prerequisites and cache status
    Preflight,

    /// Show recipe status and next steps
    Status(RecipeArgs),
}

/// Options shared by the lifecycle commands.
#[derive(Args)]
struct RecipeArgs {
    /// soxr version to build (defaults to the newest pinned release)
    #[arg(long)]
    pkg_version: Option<String>,

    /// Platform profile TOML (defaults to the build host)
    #[arg(long)]
    platform: Option<PathBuf>,

    /// Build shared libraries
    #[arg(long)]
    shared: bool,

    /// Disable position-independent code for static builds
    #[arg(long)]
    no_fpic: bool,

    /// Enable OpenMP parallel resampling
    #[arg(long)]
    openmp: bool,

    /// Skip the libsamplerate-compatible lsr bindings
    #[arg(long)]
    no_lsr: bool,
}

impl RecipeArgs {
    fn options(&self) -> RecipeOptions {
        RecipeOptions {
            shared: self.shared,
            fpic: Some(!self.no_fpic),
            with_openmp: self.openmp,
            with_lsr_bindings: !self.no_lsr,
        }
    }

    fn platform(&self) -> Result<Platform> {
        match &self.platform {
            Some(path) => Platform::load(path),
            None => Ok(Platform::host()),
        }
    }

    fn version(&self, manifest: &SourcesManifest) -> Result<String> {
        match &self.pkg_version {
            Some(v) => Ok(manifest.lookup(v)?.version.clone()),
            None => Ok(manifest.default_version()?.to_string()),
        }
    }

    fn resolution(&self, version: &str) -> Result<Resolution> {
        resolve(&self.options(), &self.platform()?, version)
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Source(args) => cmd_source(&cli.base_dir, args),
        Commands::Build(args) => cmd_build(&cli.base_dir, args),
        Commands::Package(args) => cmd_package(&cli.base_dir, args),
        Commands::Resolve(args) => cmd_resolve(&cli.base_dir, args),
        Commands::Info(args) => cmd_info(&cli.base_dir, args),
        Commands::Preflight => cmd_preflight(&cli.base_dir),
        Commands::Status(args) => cmd_status(&cli.base_dir, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn cmd_source(base_dir: &Path, args: &RecipeArgs) -> Result<()> {
    println!("=== soxr Source ===\n");

    let manifest = SourcesManifest::load_or_builtin(base_dir)?;
    let version = args.version(&manifest)?;
    let entry = manifest.lookup(&version)?;

    let paths = RecipePaths::new(base_dir);
    source::acquire(&paths, entry)?;

    println!("\nSource ready.");
    println!("Next: soxr-recipe build");
    Ok(())
}

fn cmd_build(base_dir: &Path, args: &RecipeArgs) -> Result<()> {
    println!("=== soxr Build ===\n");

    let manifest = SourcesManifest::load_or_builtin(base_dir)?;
    let version = args.version(&manifest)?;
    let resolution = args.resolution(&version)?;

    let paths = RecipePaths::new(base_dir);

    // Acquire the source first if this tree hasn't seen it yet
    if !paths.source.join("CMakeLists.txt").exists() {
        let entry = manifest.lookup(&version)?;
        source::acquire(&paths, entry)?;
        println!();
    }

    build::configure(&paths, &resolution.toolchain)?;
    build::compile(&paths)?;

    println!("\nBuild complete.");
    println!("Next: soxr-recipe package");
    Ok(())
}

fn cmd_package(base_dir: &Path, args: &RecipeArgs) -> Result<()> {
    println!("=== soxr Package ===\n");

    let manifest = SourcesManifest::load_or_builtin(base_dir)?;
    let version = args.version(&manifest)?;
    let resolution = args.resolution(&version)?;

    let paths = RecipePaths::new(base_dir);
    build::install(&paths)?;

    println!("Shaping package tree...");
    package::shape(&paths, &resolution, &version)?;

    println!("\nPackage ready at {}", paths.package.display());
    Ok(())
}

fn cmd_resolve(base_dir: &Path, args: &RecipeArgs) -> Result<()> {
    let manifest = SourcesManifest::load_or_builtin(base_dir)?;
    let version = args.version(&manifest)?;
    let platform = args.platform()?;
    let resolution = args.resolution(&version)?;

    println!("Resolved configuration for soxr {}", version);
    println!("==================================");
    println!();
    println!("Platform:");
    println!("  OS:       {}", platform.os);
    println!("  Arch:     {}", platform.arch);
    println!("  Compiler: {}", platform.compiler);
    if let Some(v) = &platform.compiler_version {
        println!("  Version:  {}", v);
    }
    println!();

    println!("Options:");
    println!("  shared:            {}", resolution.options.shared);
    match resolution.options.fpic {
        Some(fpic) => println!("  fpic:              {}", fpic),
        None => println!("  fpic:              (undefined)"),
    }
    println!("  with-openmp:       {}", resolution.options.with_openmp);
    println!(
        "  with-lsr-bindings: {}",
        resolution.options.with_lsr_bindings
    );
    println!();

    println!("Toolchain variables:");
    for (key, value) in resolution.toolchain.iter() {
        println!("  {} = {}", key, value);
    }
    println!();

    println!("Components:");
    for component in &resolution.components {
        println!("  {} ({})", component.name, component.pkg_config_name);
        println!("    libs:        {}", component.libs.join(", "));
        if !component.system_libs.is_empty() {
            println!("    system libs: {}", component.system_libs.join(", "));
        }
        if !component.defines.is_empty() {
            println!("    defines:     {}", component.defines.join(", "));
        }
        if !component.exelinkflags.is_empty() {
            println!("    link flags:  {}", component.exelinkflags.join(" "));
        }
        if !component.requires.is_empty() {
            println!("    requires:    {}", component.requires.join(", "));
        }
    }

    Ok(())
}

fn cmd_info(base_dir: &Path, args: &RecipeArgs) -> Result<()> {
    let manifest = SourcesManifest::load_or_builtin(base_dir)?;
    let version = args.version(&manifest)?;
    let resolution = args.resolution(&version)?;

    println!("{}", package::render_metadata(&resolution, &version)?);
    Ok(())
}

fn cmd_preflight(base_dir: &Path) -> Result<()> {
    let report = preflight::run(base_dir);
    report.print_summary();

    if !report.is_ok() {
        anyhow::bail!("preflight checks failed");
    }
    Ok(())
}

fn cmd_status(base_dir: &Path, args: &RecipeArgs) -> Result<()> {
    let manifest = SourcesManifest::load_or_builtin(base_dir)?;
    let version = args.version(&manifest)?;
    let platform = args.platform()?;
    let paths = RecipePaths::new(base_dir);

    println!("soxr Recipe Status");
    println!("==================");
    println!();
    println!("Configuration:");
    println!("  Version:  {}", version);
    println!(
        "  Known:    {}",
        manifest.known_versions().join(", ")
    );
    println!("  Platform: {} {} ({})", platform.os, platform.arch, platform.compiler);
    println!();

    let cache = preflight::check_cache_status(base_dir);
    println!("Recipe state:");
    cache.print();
    println!();

    println!("Next steps:");
    if !cache.has_source {
        println!("  1. Run 'soxr-recipe source' to fetch and extract soxr {}", version);
    } else if !cache.has_build {
        println!("  1. Run 'soxr-recipe build' to configure and compile");
    } else if !cache.has_package {
        println!("  1. Run 'soxr-recipe package' to install and shape the package");
    } else {
        println!("  Package ready at {}", paths.package.display());
    }

    Ok(())
}
