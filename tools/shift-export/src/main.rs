//! shift-export - scene asset export tool
//!
//! Converts COLLADA (.dae) and Wavefront (.obj) scenes into
//! `N.mesh`, `N.skin` and `N.morph` artifacts (`.xml` header + `.dat` data)

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use shift_export::{
    DaeOptions, DirectorySink, ObjOptions, TracingReporter, collada, inspect, manifest, obj,
};

#[derive(Parser)]
#[command(name = "shift-export")]
#[command(about = "COLLADA/OBJ scene export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build assets from a manifest file
    Build {
        /// Path to shift.toml manifest
        #[arg(default_value = "shift.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without building
    Check {
        /// Path to shift.toml manifest
        #[arg(default_value = "shift.toml")]
        manifest: PathBuf,
    },

    /// Convert a single OBJ file
    Obj {
        /// Input .obj file
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "out")]
        output: PathBuf,

        /// Start a new mesh at every `o` statement
        #[arg(short, long)]
        multiple: bool,
    },

    /// Convert a single COLLADA file
    Dae {
        /// Input .dae file
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "out")]
        output: PathBuf,

        /// Skip skin controllers
        #[arg(long)]
        no_skins: bool,

        /// Skip morph controllers
        #[arg(long)]
        no_morphs: bool,
    },

    /// Print a summary of an emitted artifact
    Inspect {
        /// Header file (e.g., cube.mesh.xml)
        header: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let reporter = TracingReporter;

    match cli.command {
        Commands::Build {
            manifest,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building assets from {:?}", manifest);
            }
            let config = manifest::load_manifest(&manifest)?;
            let count = manifest::build_all(&config, output.as_deref(), &reporter)?;
            tracing::info!("Build complete! {} artifact(s)", count);
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Obj {
            input,
            output,
            multiple,
        } => {
            tracing::info!("Converting {:?} -> {:?}", input, output);
            let mut sink = DirectorySink::create(&output)?;
            let options = ObjOptions {
                multiple_objects: multiple,
            };
            obj::convert_obj(&input, &mut sink, options, &reporter)?;
            tracing::info!("Done!");
        }

        Commands::Dae {
            input,
            output,
            no_skins,
            no_morphs,
        } => {
            tracing::info!("Converting {:?} -> {:?}", input, output);
            let mut sink = DirectorySink::create(&output)?;
            let options = DaeOptions {
                skins: !no_skins,
                morphs: !no_morphs,
            };
            collada::convert_collada(&input, &mut sink, options, &reporter)?;
            tracing::info!("Done!");
        }

        Commands::Inspect { header } => {
            let summary = inspect::inspect(&header)?;
            for line in summary.lines() {
                tracing::info!("{}", line);
            }
        }
    }

    Ok(())
}
