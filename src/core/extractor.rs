use anyhow::{Context, Result};
use std::time::Instant;

use super::driver::{RunSummary, StreamDriver};
use crate::cli::StreamArgs;
use crate::codec::{ImageCodec, OpenCvCodec, PixelGrid};
use crate::config::ExtractConfig;
use crate::error::UnpackError;
use crate::stream::inspect::{self, StreamStats};
use crate::stream::RecordReader;
use crate::utils::{file_utils, logger};

/// Load the colour mask and make sure it fits the configured resolution.
fn load_mask<C: ImageCodec>(
    codec: &C,
    config: &ExtractConfig,
) -> Result<Option<PixelGrid>, UnpackError> {
    let Some(path) = config.mask.as_deref() else {
        return Ok(None);
    };

    let mask = codec.read_mask(path)?;
    let (w, h) = config.layout.color_dimensions();
    if (mask.width, mask.height) != (w, h) {
        return Err(UnpackError::configuration(format!(
            "mask {} is {}x{}, colour images are {}x{}",
            path.display(),
            mask.width,
            mask.height,
            w,
            h
        )));
    }
    Ok(Some(mask))
}

pub fn extract_frames(config: &ExtractConfig) -> Result<RunSummary> {
    let started = Instant::now();
    logger::info(&format!(
        "extract: input={} layout={:?} selection={:?} bound={:?} depth={:?} -> {} color={:?} -> {}",
        config.input.display(),
        config.layout,
        config.selection,
        config.frame_bound,
        config.depth_output,
        config.depth_layout.base_dir().display(),
        config.color_output,
        config.color_layout.base_dir().display()
    ));

    let codec = OpenCvCodec::new();
    let mask = load_mask(&codec, config)?;
    let input = file_utils::open_input(&config.input)?;

    let mut driver = StreamDriver::new(input, config, &codec);
    if let Some(mask) = mask.as_ref() {
        driver = driver.with_mask(mask);
    }
    let summary = driver
        .run()
        .with_context(|| format!("Failed to extract {}", config.input.display()))?;

    logger::info(&format!(
        "extract done in {:.2?}: {} frames read, {} exported, {} images written, {} failed",
        started.elapsed(),
        summary.frames_read,
        summary.frames_exported,
        summary.images_written,
        summary.images_failed
    ));
    Ok(summary)
}

pub fn inspect_stream(args: &StreamArgs) -> Result<StreamStats> {
    let layout = args.layout();
    let input = file_utils::open_input(&args.input)?;
    let mut reader = RecordReader::new(input);
    let stats = inspect::scan(&mut reader, &layout)
        .with_context(|| format!("Failed to scan {}", args.input.display()))?;
    Ok(stats)
}
