use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use reachmap::api::fetch_isochrones;
use reachmap::config::FileConfig;
use reachmap::contour::{ContourExtractor, ContourPolygon, MarchingSquares, evenly_spaced_thresholds};
use reachmap::domain::{BoundaryPolygon, DistanceBands, Facility, minutes_to_seconds};
use reachmap::feed::{load_boundary, load_facilities, load_isochrones};
use reachmap::field::{DistanceField, MIN_BAND_SAMPLES, build_distance_field};
use reachmap::geometry::GridExtent;
use reachmap::merge::{BandMerger, retain_bands, with_quiet_panics};
use reachmap::output::{contour_features, merged_features, write_feature_collection};
use reachmap::render::{BandColorMapper, ColorMapper, RampColorMapper, rasterize, write_png};
use reachmap::render::color::HEATMAP_STOPS;

/// Facility reachability heatmaps, contour bands and merged isochrones
///
/// Examples:
///   # Render the distance heatmap and its contour overlay
///   reachmap heatmap --facilities hospitals.json --boundary region.geojson
///
///   # Straight-line isochrone bands on a 0.01 degree grid
///   reachmap local-isochrones --facilities hospitals.json --boundary region.geojson --step 0.01 -o local.geojson
///
///   # Fetch driving-time isochrones, skipping facilities marked for removal
///   reachmap fetch --facilities hospitals.json --exclude-removed -o raw.geojson
///
///   # Merge the raw feed into one polygon per band
///   reachmap merge --input raw.geojson --bands 15,30,45 -o merged.geojson
#[derive(Parser, Debug)]
#[command(name = "reachmap")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches reachmap.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the distance-to-nearest-facility heatmap as PNG plus contour GeoJSON
    Heatmap {
        /// Facility list (JSON records or GeoJSON points)
        #[arg(long)]
        facilities: Option<PathBuf>,

        /// Region boundary (ring array or GeoJSON polygon)
        #[arg(long)]
        boundary: Option<PathBuf>,

        /// Raster width in pixels
        #[arg(long)]
        width: Option<usize>,

        /// Raster height in pixels
        #[arg(long)]
        height: Option<usize>,

        /// Output PNG path
        #[arg(long, default_value = "heatmap.png")]
        png: PathBuf,

        /// Output contour GeoJSON path
        #[arg(long, default_value = "contours.geojson")]
        contours: PathBuf,
    },

    /// Contour straight-line distance bands into isochrone polygons
    LocalIsochrones {
        #[arg(long)]
        facilities: Option<PathBuf>,

        #[arg(long)]
        boundary: Option<PathBuf>,

        /// Grid step in degrees
        #[arg(long)]
        step: Option<f64>,

        /// Band limits in km, comma separated
        #[arg(long, value_delimiter = ',')]
        bands: Option<Vec<f64>>,

        #[arg(short = 'o', long, default_value = "local_isochrones.geojson")]
        output: PathBuf,
    },

    /// Fetch driving-time isochrones from openrouteservice
    Fetch {
        #[arg(long)]
        facilities: Option<PathBuf>,

        /// Band limits in minutes, comma separated
        #[arg(long, value_delimiter = ',')]
        bands: Option<Vec<f64>>,

        /// Skip facilities flagged willBeRemoved
        #[arg(long)]
        exclude_removed: bool,

        #[arg(short = 'o', long, default_value = "isochrones.geojson")]
        output: PathBuf,
    },

    /// Merge a raw isochrone feed into one polygon per band
    Merge {
        /// Raw isochrone feed (GeoJSON with a numeric `value` in seconds)
        #[arg(short = 'i', long)]
        input: PathBuf,

        /// Band limits in minutes to keep, comma separated
        #[arg(long, value_delimiter = ',')]
        bands: Option<Vec<f64>>,

        #[arg(short = 'o', long, default_value = "merged_isochrones.geojson")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config = match args.config {
        Some(ref config_path) => FileConfig::load_from(config_path)?,
        None => FileConfig::load().unwrap_or_default(),
    };

    let verbose = args.verbose || file_config.verbose;
    let default_filter = if verbose { "reachmap=debug" } else { "reachmap=info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match args.command {
        Command::Heatmap {
            facilities,
            boundary,
            width,
            height,
            png,
            contours,
        } => {
            let width = width.unwrap_or(file_config.width);
            let height = height.unwrap_or(file_config.height);
            let (facilities, boundary) = load_inputs(facilities, boundary, &file_config)?;
            run_heatmap(&file_config, &facilities, &boundary, width, height, &png, &contours)?;
        }
        Command::LocalIsochrones {
            facilities,
            boundary,
            step,
            bands,
            output,
        } => {
            let step = step.unwrap_or(file_config.grid_step_degrees);
            let bands = bands.unwrap_or_else(|| file_config.distance_bands_km.clone());
            let (facilities, boundary) = load_inputs(facilities, boundary, &file_config)?;
            run_local_isochrones(&file_config, &facilities, &boundary, step, &bands, &output)?;
        }
        Command::Fetch {
            facilities,
            bands,
            exclude_removed,
            output,
        } => {
            let path = facilities
                .or_else(|| file_config.facilities.clone())
                .context("Must provide --facilities or set `facilities` in the config file")?;
            let mut facilities = load_facilities(&path)?;
            if exclude_removed || file_config.exclude_removed {
                let before = facilities.len();
                facilities.retain(|f| !f.will_be_removed);
                info!("Excluded {} facilities marked for removal", before - facilities.len());
                if facilities.is_empty() {
                    bail!("No facilities left after excluding removed ones");
                }
            }
            let minutes = bands.unwrap_or_else(|| file_config.travel_bands_minutes.clone());
            run_fetch(&file_config, &facilities, &minutes, &output)?;
        }
        Command::Merge {
            input,
            bands,
            output,
        } => {
            let minutes = bands.unwrap_or_else(|| file_config.travel_bands_minutes.clone());
            run_merge(&file_config, &input, &minutes, &output)?;
        }
    }

    info!("Done in {:.1}s", total_start.elapsed().as_secs_f32());
    Ok(())
}

fn load_inputs(
    facilities: Option<PathBuf>,
    boundary: Option<PathBuf>,
    file_config: &FileConfig,
) -> Result<(Vec<Facility>, BoundaryPolygon)> {
    let facilities_path = facilities
        .or_else(|| file_config.facilities.clone())
        .context("Must provide --facilities or set `facilities` in the config file")?;
    let boundary_path = boundary
        .or_else(|| file_config.boundary.clone())
        .context("Must provide --boundary or set `boundary` in the config file")?;

    let facilities = load_facilities(&facilities_path)?;
    let boundary = load_boundary(&boundary_path)?;
    info!(
        "Loaded {} facilities and a boundary with {} rings",
        facilities.len(),
        boundary.rings.len()
    );
    Ok((facilities, boundary))
}

fn compute_field(
    extent: &GridExtent,
    boundary: &BoundaryPolygon,
    facilities: &[Facility],
) -> Result<DistanceField> {
    let spinner = create_spinner("Computing distance field...");
    let start = Instant::now();
    let field = build_distance_field(extent.width, extent.height, extent, boundary, facilities)?;
    spinner.finish_with_message(format!(
        "Computed {}x{} distance field, {} samples inside boundary [{:.1}s]",
        extent.width,
        extent.height,
        field.grid.valid_count(),
        start.elapsed().as_secs_f32()
    ));
    Ok(field)
}

fn extract_contours(field: &DistanceField, thresholds: &[f64], extent: &GridExtent) -> Vec<ContourPolygon> {
    let spinner = create_spinner("Extracting contours...");
    let start = Instant::now();
    let contours: Vec<ContourPolygon> = MarchingSquares
        .extract(&field.grid, thresholds)
        .iter()
        .map(|contour| contour.to_lon_lat(extent))
        .collect();
    spinner.finish_with_message(format!(
        "Extracted {} contour polygons at {} thresholds [{:.1}s]",
        contours.len(),
        thresholds.len(),
        start.elapsed().as_secs_f32()
    ));
    contours
}

fn heatmap_colors(bounds: &[f64], field: &DistanceField) -> Result<Box<dyn ColorMapper>> {
    if bounds.len() == HEATMAP_STOPS.len() {
        let bands = DistanceBands::from_bounds(bounds)?;
        let colors = HEATMAP_STOPS.iter().map(|(_, color)| *color).collect();
        return Ok(Box::new(BandColorMapper::new(bands, colors)?));
    }

    warn!(
        "{} distance bands configured, heatmap palette has {}; using a linear ramp",
        bounds.len(),
        HEATMAP_STOPS.len()
    );
    let (first, last) = (HEATMAP_STOPS[0], HEATMAP_STOPS[HEATMAP_STOPS.len() - 1]);
    let (min, max) = field.value_range().unwrap_or((0.0, last.0));
    Ok(Box::new(RampColorMapper {
        min,
        max,
        from: first.1,
        to: last.1,
    }))
}

fn run_heatmap(
    file_config: &FileConfig,
    facilities: &[Facility],
    boundary: &BoundaryPolygon,
    width: usize,
    height: usize,
    png_path: &Path,
    contours_path: &Path,
) -> Result<()> {
    let bounds = boundary.bounds().context("Boundary has no vertices")?;
    let extent = GridExtent::from_size(&bounds, width, height)?;
    let field = compute_field(&extent, boundary, facilities)?;

    match (field.min(), field.max()) {
        (Some(min), Some(max)) => info!("Distance range: {:.2} - {:.2} km", min, max),
        _ => warn!("No samples fall inside the boundary; the heatmap will be empty"),
    }

    let mapper = heatmap_colors(&file_config.distance_bands_km, &field)?;
    let image = rasterize(&field.grid, mapper.as_ref());
    write_png(png_path, &image)?;
    info!("Wrote heatmap: {}", png_path.display());

    let thresholds = evenly_spaced_thresholds(file_config.contour_step, file_config.contour_count)?;
    debug!("Contour thresholds: {:?}", thresholds);
    let contours = extract_contours(&field, &thresholds, &extent);
    write_feature_collection(
        contours_path,
        &contour_features(&contours, file_config.simplify_tolerance),
    )?;
    info!("Wrote contours: {}", contours_path.display());
    Ok(())
}

fn run_local_isochrones(
    file_config: &FileConfig,
    facilities: &[Facility],
    boundary: &BoundaryPolygon,
    step: f64,
    bands_km: &[f64],
    output: &Path,
) -> Result<()> {
    let bands = DistanceBands::from_bounds(bands_km)?;
    let bounds = boundary.bounds().context("Boundary has no vertices")?;
    let extent = GridExtent::from_step(&bounds, step)?;
    info!(
        "Grid: {}x{} cells at {} degrees",
        extent.width, extent.height, step
    );

    let field = compute_field(&extent, boundary, facilities)?;
    if let Some(stats) = field.stats() {
        info!(
            "Samples: {} valid, min {:.2} km, max {:.2} km, mean {:.2} km",
            stats.valid, stats.min, stats.max, stats.mean
        );
        debug!("Histogram (5 km bins): {:?}", stats.histogram);
    }
    let (min, max) = field.value_range()?;
    if max < bands_km[0] || min > bands_km[bands_km.len() - 1] {
        warn!(
            "Distance range {:.2} - {:.2} km does not overlap the requested bands",
            min, max
        );
    }

    let mut thresholds = Vec::with_capacity(bands.len());
    for (threshold, window) in field.band_windows(&bands.upper_bounds()) {
        match window.range {
            Some((lo, hi)) => info!(
                "Band {} km: count={}, min={:.2}, max={:.2}",
                threshold, window.count, lo, hi
            ),
            None => info!("Band {} km: count=0", threshold),
        }
        if window.count < MIN_BAND_SAMPLES {
            warn!(
                "Skipping band {} km: too few valid points ({})",
                threshold, window.count
            );
            continue;
        }
        thresholds.push(threshold);
    }

    let contours = extract_contours(&field, &thresholds, &extent);
    if log_threshold_counts(&contours, &thresholds) == 0 {
        warn!("No isochrone polygons produced");
    }
    write_feature_collection(output, &contour_features(&contours, file_config.simplify_tolerance))?;
    info!("Wrote local isochrones: {}", output.display());
    Ok(())
}

/// Log the polygon count per threshold and return the total
fn log_threshold_counts(contours: &[ContourPolygon], thresholds: &[f64]) -> usize {
    for threshold in thresholds {
        let count = contours.iter().filter(|c| c.threshold == *threshold).count();
        debug!("  {} km: {} polygons", threshold, count);
    }
    contours.len()
}

fn run_fetch(
    file_config: &FileConfig,
    facilities: &[Facility],
    minutes: &[f64],
    output: &Path,
) -> Result<()> {
    DistanceBands::from_bounds(minutes)?;
    if minutes.iter().any(|m| !m.is_finite()) {
        bail!("Travel bands must be finite minutes, got {:?}", minutes);
    }
    let range_seconds = minutes_to_seconds(minutes);
    let ors_config = file_config.openroute.clone().unwrap_or_default();
    debug!("Range (seconds): {:?}", range_seconds);

    let spinner = create_spinner("Fetching isochrones from openrouteservice...");
    let start = Instant::now();
    let collection = fetch_isochrones(facilities, &range_seconds, &ors_config)
        .context("Failed to fetch isochrones")?;
    spinner.finish_with_message(format!(
        "Fetched {} isochrone features for {} facilities [{:.1}s]",
        collection.features.len(),
        facilities.len(),
        start.elapsed().as_secs_f32()
    ));

    if collection.features.is_empty() {
        bail!("openrouteservice returned no isochrones");
    }
    write_feature_collection(output, &collection)?;
    info!("Wrote raw isochrones: {}", output.display());
    Ok(())
}

fn run_merge(file_config: &FileConfig, input: &Path, minutes: &[f64], output: &Path) -> Result<()> {
    let isochrones = load_isochrones(input)?;
    let total = isochrones.len();
    let isochrones = retain_bands(isochrones, &minutes_to_seconds(minutes));
    info!(
        "Loaded {} isochrones, {} within the requested bands",
        total,
        isochrones.len()
    );

    let spinner = create_spinner("Merging isochrones per band...");
    let start = Instant::now();
    let merged = with_quiet_panics(|| BandMerger::new().merge(isochrones));
    spinner.finish_with_message(format!(
        "Merged into {} band polygons [{:.1}s]",
        merged.len(),
        start.elapsed().as_secs_f32()
    ));

    for band in &merged {
        info!(
            "  {} min: {} merged, {} skipped, {} polygons",
            band.value / 60.0,
            band.merged,
            band.skipped,
            band.geometry.0.len()
        );
    }

    if merged.is_empty() {
        warn!("No band produced a polygon");
    }
    write_feature_collection(output, &merged_features(&merged, file_config.simplify_tolerance))?;
    info!("Wrote merged isochrones: {}", output.display());
    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
