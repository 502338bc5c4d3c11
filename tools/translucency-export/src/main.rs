//! translucency-export - translucency texture baking tool
//!
//! Bakes object-space position/normal maps and translucency maps for
//! OBJ/glTF meshes and writes them as PNGs.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use translucency_core::BakeSettings;

use translucency_export::{BakeManifest, BakeSummary, export};

#[derive(Parser)]
#[command(name = "translucency-export")]
#[command(about = "Translucency texture baking tool")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bake object-space and translucency textures for one mesh
    Bake(MeshArgs),

    /// Bake every mesh of a manifest file
    Build {
        /// Path to bake.toml manifest
        #[arg(default_value = "bake.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate manifest without baking
    Check {
        /// Path to bake.toml manifest
        #[arg(default_value = "bake.toml")]
        manifest: PathBuf,
    },

    /// Bake only the object-space position/normal maps for one mesh
    Rasterize(MeshArgs),
}

#[derive(Args)]
struct MeshArgs {
    /// Input mesh file (OBJ/glTF/GLB)
    input: PathBuf,

    /// Settings file; its [settings] table is used
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Base name of the written textures (default: input file stem)
    #[arg(long)]
    name: Option<String>,

    /// Texture resolution (minimum 32)
    #[arg(short, long, allow_negative_numbers = true)]
    resolution: Option<i32>,

    /// Samples per texel axis (minimum 1)
    #[arg(short, long, allow_negative_numbers = true)]
    multisample: Option<i32>,

    /// Dilation iterations
    #[arg(short, long, allow_negative_numbers = true)]
    spread: Option<i32>,

    /// Rasterize even if cached maps match the resolution
    #[arg(short, long)]
    force: bool,

    /// Bake without writing textures
    #[arg(long)]
    no_save: bool,
}

impl MeshArgs {
    /// Manifest settings (or defaults) with command-line flags applied
    fn settings(&self) -> Result<BakeSettings> {
        let mut settings = match &self.config {
            Some(path) => BakeManifest::load(path)?.settings,
            None => BakeSettings::default(),
        };
        if let Some(resolution) = self.resolution {
            settings.resolution = resolution;
        }
        if let Some(multisample) = self.multisample {
            settings.multisample = multisample;
        }
        if let Some(spread) = self.spread {
            settings.spread = spread;
        }
        if let Some(output) = &self.output {
            settings.output_dir = output.clone();
        }
        settings.force_rebake |= self.force;
        settings.save_to_disk &= !self.no_save;
        Ok(settings)
    }

    fn name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| export::default_name(&self.input))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match cli.command {
        Commands::Bake(args) => {
            let settings = args.settings()?;
            let summary = export::bake_file(&args.input, &args.name(), &settings)?;
            log_summary(&summary);
            tracing::info!("Done!");
        }

        Commands::Build { manifest, output } => {
            tracing::info!("Baking meshes from {:?}", manifest);
            let config = BakeManifest::load(&manifest)?;
            let summaries =
                export::build_all(&config, &export::manifest_dir(&manifest), output.as_deref())?;
            for summary in &summaries {
                log_summary(summary);
            }
            tracing::info!("Build complete! {} meshes baked", summaries.len());
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = BakeManifest::load(&manifest)?;
            config.validate(&export::manifest_dir(&manifest))?;
            tracing::info!("Manifest is valid! {} meshes", config.meshes.len());
        }

        Commands::Rasterize(args) => {
            let settings = args.settings()?;
            let paths = export::rasterize_file(&args.input, &args.name(), &settings)?;
            if let Some(paths) = paths {
                log_path(&paths.position);
                log_path(&paths.normal);
            }
            tracing::info!("Done!");
        }
    }

    Ok(())
}

fn log_summary(summary: &BakeSummary) {
    let report = &summary.report;
    tracing::info!(
        "'{}': {}x{}, {} exact texels, {} reflections, max extent {:.3}{}",
        summary.name,
        report.resolution,
        report.resolution,
        report.exact_texels,
        report.reflection_count,
        report.max_extent,
        if report.rasterized { "" } else { " (cached maps)" }
    );
    if let Some(paths) = &summary.paths {
        for path in [&paths.position, &paths.normal, &paths.positive, &paths.negative] {
            log_path(path);
        }
    }
}

fn log_path(path: &Path) {
    tracing::info!("  {}", path.display());
}
