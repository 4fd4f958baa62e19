//! Aligns one frame against a reference and dumps the displacement field.
//!
//! Outputs: the warped alternate frame, a JSON report with the per-tile
//! displacement map and stage timings, and optional per-axis flow
//! visualization PNGs (displacement mapped through `(v + 20) / 40`).

use burst_align::config::flow::{load_config, FlowToolConfig};
use burst_align::image::io::{load_image, save_image, write_json_file};
use burst_align::image::Image;
use burst_align::types::AlignmentMap;
use burst_align::warp::warp_image;
use burst_align::FrameAligner;
use serde::Serialize;
use std::env;
use std::path::Path;

#[derive(Serialize)]
struct FlowReport {
    map: AlignmentMap,
    diagnostics: burst_align::diagnostics::AlignmentDiagnostics,
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        return Err(format!("Usage: {} <config.json>", args[0]));
    }
    let config: FlowToolConfig = load_config(Path::new(&args[1]))?;

    let reference = load_image(&config.reference).map_err(|e| e.to_string())?;
    let alternate = load_image(&config.alternate).map_err(|e| e.to_string())?;

    let aligner =
        FrameAligner::new(&reference, config.alignment.clone()).map_err(|e| e.to_string())?;
    let outcome = aligner.align(&alternate).map_err(|e| e.to_string())?;

    let warped = warp_image(&alternate, &outcome.map).map_err(|e| e.to_string())?;
    save_image(&config.output.warped_image, &warped).map_err(|e| e.to_string())?;

    if let Some(path) = &config.output.flow_x_image {
        let vis = visualize_axis(&outcome.map, |a| a.x);
        save_image(path, &vis).map_err(|e| e.to_string())?;
    }
    if let Some(path) = &config.output.flow_y_image {
        let vis = visualize_axis(&outcome.map, |a| a.y);
        save_image(path, &vis).map_err(|e| e.to_string())?;
    }

    let report = FlowReport {
        map: outcome.map,
        diagnostics: outcome.diagnostics,
    };
    write_json_file(&config.output.flow_json, &report).map_err(|e| e.to_string())?;

    println!(
        "mean displacement ({:.3}, {:.3}) in {:.2} ms",
        report.diagnostics.mean_displacement[0],
        report.diagnostics.mean_displacement[1],
        report.diagnostics.total_latency_ms
    );
    Ok(())
}

/// One tile per pixel, displacement normalized from [-20, 20] into [0, 1].
fn visualize_axis(
    map: &AlignmentMap,
    axis: impl Fn(&burst_align::Alignment) -> f32,
) -> Image {
    let mut vis = Image::new(map.w, map.h, 1);
    for (dst, a) in vis.data.iter_mut().zip(&map.data) {
        *dst = (axis(a) + 20.0) / 40.0;
    }
    vis
}
