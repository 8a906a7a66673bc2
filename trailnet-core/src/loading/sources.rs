//! Upstream providers of raw tracks and points of interest
//!
//! The core treats providers as opaque: no paging or retries happen here.
//! A provider failure is an [`Error::ExternalSource`], while a provider
//! with nothing to offer returns an empty vector.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime};
use log::{debug, info};
use serde::Deserialize;

use crate::{BoundingBox, Coordinate, Error, Poi, TimedPoint};

/// Supplies time-ordered GPS fixes for a bounding box
pub trait TraceSource {
    /// # Errors
    ///
    /// Returns [`Error::ExternalSource`] if the provider fails.
    fn fetch_points(&self, bbox: &BoundingBox) -> Result<Vec<TimedPoint>, Error>;
}

/// Supplies named points of interest of a category within a bounding box
pub trait PoiSource {
    /// # Errors
    ///
    /// Returns [`Error::ExternalSource`] if the provider fails.
    fn fetch_pois(&self, category: &str, bbox: &BoundingBox) -> Result<Vec<Poi>, Error>;
}

impl TraceSource for [TimedPoint] {
    fn fetch_points(&self, bbox: &BoundingBox) -> Result<Vec<TimedPoint>, Error> {
        Ok(self
            .iter()
            .filter(|point| bbox.contains(&point.coordinate))
            .copied()
            .collect())
    }
}

impl TraceSource for Vec<TimedPoint> {
    fn fetch_points(&self, bbox: &BoundingBox) -> Result<Vec<TimedPoint>, Error> {
        self.as_slice().fetch_points(bbox)
    }
}

/// Header-less point file, one fix per line: `lat,lon,time,track,page`
#[derive(Debug, Clone)]
pub struct CsvTraceSource {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct TraceRecord {
    lat: f64,
    lon: f64,
    time: String,
    track: u32,
    page: u32,
}

impl CsvTraceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TraceSource for CsvTraceSource {
    fn fetch_points(&self, bbox: &BoundingBox) -> Result<Vec<TimedPoint>, Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| source_error(&self.path, &e))?;

        let mut points = Vec::new();
        let mut outside = 0usize;
        for (line, record) in reader.deserialize::<TraceRecord>().enumerate() {
            let record = record.map_err(|e| source_error(&self.path, &e))?;
            let timestamp = parse_timestamp(&record.time).ok_or_else(|| {
                Error::ExternalSource(format!(
                    "{}:{}: unrecognised timestamp '{}'",
                    self.path.display(),
                    line + 1,
                    record.time
                ))
            })?;

            let coordinate = Coordinate::new(record.lat, record.lon);
            if !bbox.contains(&coordinate) {
                outside += 1;
                continue;
            }
            points.push(TimedPoint::new(coordinate, timestamp, record.track, record.page));
        }

        if outside > 0 {
            debug!("Dropped {outside} points outside {}", bbox.cache_key());
        }
        info!(
            "Loaded {} points from {}",
            points.len(),
            self.path.display()
        );
        Ok(points)
    }
}

/// POI file with header `category,name,lat,lon`
#[derive(Debug, Clone)]
pub struct CsvPoiSource {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct PoiRecord {
    category: String,
    name: String,
    lat: f64,
    lon: f64,
}

impl CsvPoiSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PoiSource for CsvPoiSource {
    fn fetch_pois(&self, category: &str, bbox: &BoundingBox) -> Result<Vec<Poi>, Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| source_error(&self.path, &e))?;

        let mut total = 0usize;
        let mut pois = Vec::new();
        for record in reader.deserialize::<PoiRecord>() {
            let record = record.map_err(|e| source_error(&self.path, &e))?;
            if record.category != category {
                continue;
            }
            total += 1;
            let location = Coordinate::new(record.lat, record.lon);
            if bbox.contains(&location) {
                pois.push(Poi::new(record.name, location));
            }
        }

        info!(
            "Found {} '{category}' POIs, {} inside {}",
            total,
            pois.len(),
            bbox.cache_key()
        );
        Ok(pois)
    }
}

fn source_error(path: &Path, error: &dyn std::fmt::Display) -> Error {
    Error::ExternalSource(format!("{}: {error}", path.display()))
}

/// Accepts RFC 3339 and `YYYY-MM-DD HH:MM:SS[.fff][+HH:MM]` timestamps,
/// converting offsets to UTC
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_utc());
    }
    if let Ok(with_offset) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(with_offset.naive_utc());
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}
