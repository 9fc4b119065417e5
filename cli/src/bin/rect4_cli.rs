use clap::{Parser, Subcommand};
use cli::FootprintJob;
use color_eyre::eyre::Result;
use rect4::{polygon_mask, CanvasPlot, ComputedFootprint, MaskGrid, NdvDef, Pipeline, Rect4Params};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the quadrilateral footprint of one raster
    Find {
        /// Input raster
        input: PathBuf,
        /// No-data term, e.g. "0" or "0 0 0" (repeatable)
        #[arg(long)]
        ndv: Vec<String>,
        /// Valid-range term, e.g. "1..255" (repeatable)
        #[arg(long)]
        valid_range: Vec<String>,
        /// Skip refinement and keep the hull quadrilateral
        #[arg(long)]
        no_refine: bool,
        /// Seed for the refiner
        #[arg(long, default_value = "0")]
        seed: u64,
        /// Parameter file (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the footprint as GeoJSON
        #[arg(long)]
        geojson: Option<PathBuf>,
        /// Write a PNG of the mask with hull and quadrilaterals drawn over it
        #[arg(long)]
        debug_plot: Option<PathBuf>,
        /// Write the footprint rasterized as a mask PNG
        #[arg(long)]
        mask_out: Option<PathBuf>,
    },
    /// Process every scene in a job file
    Process {
        /// Path to the TOML or JSON job file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the JSON schema of the parameter file
    Schema {
        /// Print the job file schema instead
        #[arg(long)]
        job: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Find {
            input,
            ndv,
            valid_range,
            no_refine,
            seed,
            config,
            geojson,
            debug_plot,
            mask_out,
        } => {
            let params = match config {
                Some(path) => Rect4Params::from_file(path)?,
                None => Rect4Params::default(),
            };
            let pipeline = Pipeline::builder()
                .with_params(params)
                .with_refinement(!no_refine)
                .with_seed(*seed)
                .build();
            let ndv = NdvDef::from_specs(ndv, valid_range)?;

            let result = find(input, &pipeline, &ndv, debug_plot.as_deref(), mask_out.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&result.outcome)?);
            if let Some(path) = geojson {
                result.save_geojson(path)?;
                info!("GeoJSON saved to: {:?}", path);
            }
        }
        Commands::Process { config } => {
            process_job(config)?;
        }
        Commands::Schema { job } => {
            let schema = if *job {
                schemars::schema_for!(FootprintJob)
            } else {
                Rect4Params::schema()
            };
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

fn find(
    input: &Path,
    pipeline: &Pipeline,
    ndv: &NdvDef,
    debug_plot: Option<&Path>,
    mask_out: Option<&Path>,
) -> Result<ComputedFootprint> {
    info!("Reading {:?}", input);
    info!("{}", pipeline.info());
    let image = image::open(input)?;
    let mask = ndv.classify_image(&image)?;
    info!("{} of {} pixels are valid", mask.count_set(), mask.width() * mask.height());

    let result = match debug_plot {
        Some(path) => {
            let mut canvas = CanvasPlot::from_mask(&mask);
            let result = pipeline.process_plotted(&mask, &mut canvas)?;
            canvas.save(path)?;
            info!("Debug plot saved to: {:?}", path);
            result
        }
        None => pipeline.process(&mask)?,
    };

    match result.outcome.ring() {
        Some(ring) => {
            for (i, p) in ring.pts.iter().enumerate() {
                info!("Corner {}: ({:.2}, {:.2})", i, p.x, p.y);
            }
            if let Some(path) = mask_out {
                polygon_mask(std::slice::from_ref(ring), result.image_width, result.image_height)
                    .to_luma()
                    .save(path)?;
                info!("Footprint mask saved to: {:?}", path);
            }
        }
        None => warn!("No quadrilateral footprint found for {:?}", input),
    }

    Ok(result)
}

fn process_job(config_path: &Path) -> Result<()> {
    let job = FootprintJob::from_file(config_path)?;
    info!("Job: {} scenes -> {}", job.scenes.len(), job.output_dir);

    // Create output directory if it doesn't exist
    std::fs::create_dir_all(&job.output_dir)?;

    let mut found = 0;
    for scene in &job.scenes {
        let pipeline = job.pipeline_for(scene);
        let ndv = scene.ndv_def()?;
        let output = job.geojson_path(scene);
        info!("Processing scene '{}' -> {:?}", scene.name, output);

        let result = find(Path::new(&scene.input), &pipeline, &ndv, None, None)?;
        if result.outcome.is_quad() {
            found += 1;
        }
        result.save_geojson(&output)?;
    }

    info!("Found {} footprints in {} scenes", found, job.scenes.len());
    Ok(())
}
