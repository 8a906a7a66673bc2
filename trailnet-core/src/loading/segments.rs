//! Connectivity between clusters derived from temporal continuity of the
//! raw tracks

use hashbrown::HashSet;
use log::{info, trace};

use super::SegmentConfig;
use crate::{Error, Segment, TimedPoint, clustering::Clustering};

/// Derives undirected segments between cluster centroids.
///
/// For every temporally adjacent pair of fixes a segment joins their
/// centroids when the fixes are close in time, their centroids are close in
/// space, they fall in different clusters and they belong to the same
/// recording (same track and batch). Orientation is chosen by peeking at the
/// label of the following fix; it only serves deduplication.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the clustering does not label exactly
/// the given points, refers to a missing centroid, or if a threshold is not
/// positive.
pub fn extract_segments(
    points: &[TimedPoint],
    clustering: &Clustering,
    config: &SegmentConfig,
) -> Result<Vec<Segment>, Error> {
    if clustering.len() != points.len() {
        return Err(Error::InvalidInput(format!(
            "Clustering labels {} points but {} were given",
            clustering.len(),
            points.len()
        )));
    }
    if let Some(&label) = clustering
        .labels
        .iter()
        .find(|&&label| label >= clustering.centroids.len())
    {
        return Err(Error::InvalidInput(format!(
            "Cluster label {label} has no centroid ({} centroids)",
            clustering.centroids.len()
        )));
    }
    if !(config.time_threshold_secs > 0.0 && config.distance_threshold_km > 0.0) {
        return Err(Error::InvalidInput(
            "Segment thresholds must be positive".to_string(),
        ));
    }

    let mut seen: HashSet<Segment> = HashSet::new();
    let mut segments = Vec::new();
    let mut rejected = RejectionCounts::default();

    for i in 1..points.len() {
        let (previous, current) = (&points[i - 1], &points[i]);
        let (previous_label, current_label) = (clustering.label(i - 1), clustering.label(i));
        let from = clustering.centroids[previous_label];
        let to = clustering.centroids[current_label];

        if !previous.same_recording(current) {
            rejected.recording += 1;
            continue;
        }
        if previous_label == current_label {
            rejected.same_cluster += 1;
            continue;
        }
        if current.seconds_between(previous) >= config.time_threshold_secs {
            rejected.time += 1;
            continue;
        }
        if from.distance_to(&to) >= config.distance_threshold_km {
            rejected.distance += 1;
            continue;
        }

        let segment = if i + 1 < points.len() && clustering.label(i + 1) < current_label {
            Segment::new(from, to)
        } else {
            Segment::new(to, from)
        };

        if seen.insert(segment) {
            segments.push(segment);
        }
    }

    trace!("Rejected adjacent pairs: {rejected:?}");
    info!(
        "Extracted {} segments from {} points",
        segments.len(),
        points.len()
    );
    Ok(segments)
}

#[derive(Debug, Default)]
struct RejectionCounts {
    recording: usize,
    same_cluster: usize,
    time: usize,
    distance: usize,
}
