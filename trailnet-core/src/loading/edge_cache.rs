//! On-disk edge cache keyed by exact bounding box
//!
//! One edge per line as four decimal fields `lat1,lon1,lat2,lon2`. When a
//! cache entry exists the clustering and segment extraction stages can be
//! skipped entirely.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;

use log::{debug, info};

use crate::{BoundingBox, Coordinate, Error, Segment};

const SEGMENTS_FILE: &str = "segments.txt";

#[derive(Debug, Clone)]
pub struct EdgeCache {
    root: PathBuf,
}

impl EdgeCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Location of the cached segment file for `bbox`
    pub fn path_for(&self, bbox: &BoundingBox) -> PathBuf {
        self.root.join(bbox.cache_key()).join(SEGMENTS_FILE)
    }

    /// Cached segments for `bbox`, or `None` if nothing was cached yet
    ///
    /// # Errors
    ///
    /// Returns an error if the cache file exists but cannot be read or parsed.
    pub fn load(&self, bbox: &BoundingBox) -> Result<Option<Vec<Segment>>, Error> {
        let path = self.path_for(bbox);
        if !path.exists() {
            debug!("No cached segments at {}", path.display());
            return Ok(None);
        }
        let segments = read_segments(File::open(&path)?)?;
        info!("Loaded {} segments from {}", segments.len(), path.display());
        Ok(Some(segments))
    }

    /// Writes `segments` as the cache entry for `bbox`, replacing any
    /// previous entry
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory or file cannot be written.
    pub fn store(&self, bbox: &BoundingBox, segments: &[Segment]) -> Result<PathBuf, Error> {
        let path = self.path_for(bbox);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        write_segments(File::create(&path)?, segments)?;
        info!("Saved {} segments to {}", segments.len(), path.display());
        Ok(path)
    }
}

/// # Errors
///
/// Returns [`Error::InvalidData`] for a line that is not four finite
/// decimals.
pub fn read_segments<R: Read>(reader: R) -> Result<Vec<Segment>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    reader
        .deserialize::<(f64, f64, f64, f64)>()
        .enumerate()
        .map(|(line, record)| {
            let (lat1, lon1, lat2, lon2) = record
                .map_err(|e| Error::InvalidData(format!("segment line {}: {e}", line + 1)))?;
            let segment = Segment::new(Coordinate::new(lat1, lon1), Coordinate::new(lat2, lon2));
            if !(segment.start.is_finite() && segment.end.is_finite()) {
                return Err(Error::InvalidData(format!(
                    "segment line {}: non-finite coordinate in {} - {}",
                    line + 1,
                    segment.start,
                    segment.end
                )));
            }
            Ok(segment)
        })
        .collect()
}

/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_segments<W: Write>(writer: W, segments: &[Segment]) -> Result<(), Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for segment in segments {
        writer.serialize((
            segment.start.lat,
            segment.start.lon,
            segment.end.lat,
            segment.end.lon,
        ))?;
    }
    writer.flush()?;
    Ok(())
}
