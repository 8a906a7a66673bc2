//! `trailnet` command line
//!
//! Builds trail networks from CSV trace files and routes to POIs on them.
//! Results are printed to stdout as JSON; logs go to stderr and follow
//! `RUST_LOG` (default `info`).

mod cli;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trailnet_core::prelude::*;

use cli::{AreaArgs, Cli, Command};
use settings::{Overrides, load_config};

#[derive(Serialize)]
struct SegmentsReport {
    network: NetworkSummary,
    total_length_km: Kilometers,
    preview: Vec<Segment>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Cli::parse();
    match args.command {
        Command::Segments { area, preview } => {
            let config = load_config(area.config.as_deref())?;
            let report = segments(&area, preview, &config)?;
            print_json(&report)
        }
        Command::Route {
            area,
            pois,
            category,
            start,
            epsilon,
            max_connect,
            fixed_point,
        } => {
            let mut config = load_config(area.config.as_deref())?;
            Overrides {
                epsilon,
                max_connect,
                fixed_point,
            }
            .apply(&mut config);

            let traces = CsvTraceSource::new(&area.points);
            let poi_source = CsvPoiSource::new(pois);
            let cache = area.cache_dir.as_ref().map(EdgeCache::new);
            let request = RouteRequest {
                start,
                bbox: area.bbox,
                category,
            };

            let report = plan_trail_routes(&traces, &poi_source, cache.as_ref(), &request, &config)
                .context("Route planning failed")?;
            info!(
                "{} of {} POIs reachable",
                report.plan.reachable_count(),
                report.plan.results.len()
            );
            print_json(&report)
        }
    }
}

fn segments(area: &AreaArgs, preview: usize, config: &TrailNetworkConfig) -> Result<SegmentsReport> {
    let traces = CsvTraceSource::new(&area.points);
    let cache = area.cache_dir.as_ref().map(EdgeCache::new);

    let (graph, network) = build_trail_network(&traces, cache.as_ref(), &area.bbox, config)
        .with_context(|| format!("Failed to build the trail network of {}", area.bbox.cache_key()))?;

    Ok(SegmentsReport {
        network,
        total_length_km: graph.total_length(),
        preview: graph.preview(preview),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize the report")?;
    println!("{json}");
    Ok(())
}
