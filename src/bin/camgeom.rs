//! camgeom CLI: inspect and export camera geometries.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use camgeom::neighbors::median_neighbor_count;
use camgeom::{CameraGeometry, CameraRegistry, DirectoryRegistry};

#[derive(Parser)]
#[command(name = "camgeom")]
#[command(about = "Inspect and export Cherenkov camera pixel geometries")]
#[command(version)]
struct Cli {
    /// Resolve camera names from geometry table files in this directory
    /// instead of the built-in layouts.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List known camera names.
    List,
    /// Print a summary of a named camera.
    Info {
        /// Camera name, e.g. LSTCam.
        name: String,
    },
    /// Write a named camera to a table file (.rkyv, .csv or .ecsv, optionally .gz).
    Export {
        name: String,
        path: PathBuf,
        /// Replace the file if it exists.
        #[arg(long)]
        overwrite: bool,
    },
    /// Print a summary of a geometry table file.
    Show { path: PathBuf },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let directory = match &cli.dir {
        Some(dir) => Some(
            DirectoryRegistry::new(dir)
                .with_context(|| format!("failed to scan {}", dir.display()))?,
        ),
        None => None,
    };
    let load = |name: &str| -> anyhow::Result<CameraGeometry> {
        let geom = match &directory {
            Some(registry) => CameraGeometry::from_registry(registry, name),
            None => CameraGeometry::from_name(name),
        };
        geom.with_context(|| format!("failed to load camera '{}'", name))
    };

    match cli.command {
        Commands::List => {
            let names = match &directory {
                Some(registry) => registry.names(),
                None => CameraGeometry::get_known_camera_names(),
            };
            for name in names {
                println!("{}", name);
            }
        }
        Commands::Info { name } => print_summary(&load(&name)?)?,
        Commands::Export {
            name,
            path,
            overwrite,
        } => {
            let geom = load(&name)?;
            geom.to_table()
                .write(&path, overwrite)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {} to {}", geom, path.display());
        }
        Commands::Show { path } => {
            let geom = CameraGeometry::from_table_file(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            print_summary(&geom)?;
        }
    }
    Ok(())
}

fn print_summary(geom: &CameraGeometry) -> anyhow::Result<()> {
    println!("{}", geom);
    println!("  pixels:          {}", geom.len());
    println!("  pixel type:      {}", geom.pix_type());
    println!("  pixel rotation:  {}", geom.pix_rotation());
    println!("  camera rotation: {}", geom.cam_rotation());
    if geom.len() >= 2 {
        println!("  min separation:  {}", geom.min_pixel_separation()?);
    }
    if let Some(area) = geom.pix_area().get(0) {
        println!("  pixel area:      {}", area);
    }
    println!(
        "  median neighbors: {}",
        median_neighbor_count(geom.neighbors())
    );
    println!(
        "  border pixels:   {}",
        geom.border_pixel_mask(1).iter().filter(|&&b| b).count()
    );
    Ok(())
}
