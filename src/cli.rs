use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use trailnet_core::{BoundingBox, Coordinate};

#[derive(Parser, Debug)]
#[command(author, version, about = "Trail networks from GPS traces", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build (or load from cache) the segment set of an area
    Segments {
        #[command(flatten)]
        area: AreaArgs,
        /// Number of segments to print
        #[arg(long, default_value_t = 10)]
        preview: usize,
    },
    /// Route from a start point to every POI of a category
    Route {
        #[command(flatten)]
        area: AreaArgs,
        /// POI CSV file with a `category,name,lat,lon` header
        #[arg(long)]
        pois: PathBuf,
        #[arg(long)]
        category: String,
        /// Start point as `LAT,LON`
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        start: Coordinate,
        /// Collinearity tolerance in degrees
        #[arg(long)]
        epsilon: Option<f64>,
        /// Maximum POI connect distance in kilometres
        #[arg(long)]
        max_connect: Option<f64>,
        /// Repeat simplification until nothing more is removed
        #[arg(long)]
        fixed_point: bool,
    },
}

#[derive(Args, Debug)]
pub struct AreaArgs {
    /// Trace CSV file, one `lat,lon,time,track,page` point per line
    #[arg(long)]
    pub points: PathBuf,
    /// Bounding box as `MIN_LAT,MIN_LON,MAX_LAT,MAX_LON`
    #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
    pub bbox: BoundingBox,
    /// Directory for cached segment sets
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_numbers<const N: usize>(value: &str) -> Result<[f64; N], String> {
    let numbers = value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| format!("'{}' is not a number: {e}", part.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let count = numbers.len();
    numbers
        .try_into()
        .map_err(|_| format!("expected {N} comma-separated numbers, got {count}"))
}

pub fn parse_coordinate(value: &str) -> Result<Coordinate, String> {
    let [lat, lon] = parse_numbers::<2>(value)?;
    let coordinate = Coordinate::new(lat, lon);
    if !coordinate.is_finite() {
        return Err(format!("{coordinate} is not a valid coordinate"));
    }
    Ok(coordinate)
}

pub fn parse_bbox(value: &str) -> Result<BoundingBox, String> {
    let [min_lat, min_lon, max_lat, max_lon] = parse_numbers::<4>(value)?;
    BoundingBox::new(
        Coordinate::new(min_lat, min_lon),
        Coordinate::new(max_lat, max_lon),
    )
    .map_err(|e| e.to_string())
}
