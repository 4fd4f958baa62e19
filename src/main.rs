use burst_align::config::denoise::{frame_path, load_config};
use burst_align::denoise::{denoise_frame, FrameBuffer};
use burst_align::image::io::{load_image, save_image};
use log::{info, warn};
use std::env;
use std::path::Path;

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
    let config = load_config(Path::new(&args[1]))?;

    let radius = config.denoise.temporal_radius;
    let mut buffer =
        FrameBuffer::new(config.denoise.window()).map_err(|e| e.to_string())?;

    let mut denoised_frames = 0usize;
    for frame_idx in 0..config.num_frames {
        let input = frame_path(&config.input_pattern, frame_idx, config.index_width);
        let frame = match load_image(Path::new(&input)) {
            Ok(frame) => frame,
            Err(err) => {
                warn!("skipping frame {frame_idx}: {err}");
                continue;
            }
        };
        buffer.push(frame);

        // The buffer center trails the newest frame by the temporal radius.
        if buffer.is_full() {
            let fused = denoise_frame(&buffer, &config.denoise).map_err(|e| e.to_string())?;
            let output_idx = frame_idx - radius;
            let output = frame_path(&config.output_pattern, output_idx, config.index_width);
            save_image(Path::new(&output), &fused).map_err(|e| e.to_string())?;
            info!("frame {output_idx}: wrote {output}");
            denoised_frames += 1;
        }
    }

    info!(
        "done: {denoised_frames} of {} frames denoised",
        config.num_frames
    );
    Ok(())
}
