//! Frame demuxer.
//!
//! Reads records strictly in order, one frame at a time: four depth blocks, then
//! four color blocks. Whole records are read before anything is written, so a
//! truncated record never produces output. Per-camera encode/write work for an
//! exported frame runs on rayon; the read side stays on the calling thread.

use std::io::Read;
use std::path::PathBuf;

use rayon::prelude::*;
use serde::Serialize;

use super::paths::{resolve, ColorOutput, StreamKind};
use super::selector::should_export;
use crate::codec::{ChannelOrder, ImageCodec, ImageFormat, PixelData, PixelGrid};
use crate::config::ExtractConfig;
use crate::depth::convert;
use crate::error::{BlockKind, UnpackError};
use crate::stream::layout::read_frame;
use crate::stream::{ColorBlock, DepthBlock, FrameRecord, RecordReader};
use crate::utils::file_utils::{ensure_dir, write_bytes};
use crate::utils::logger;

/// Channel order of raw color blocks in the capture.
const STREAM_COLOR_ORDER: ChannelOrder = ChannelOrder::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Streaming,
    EndOfStream,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndReason {
    /// The capture ran out of records.
    EndOfStream,
    /// The configured number of frames was read.
    FrameBound,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageFailure {
    pub frame: u64,
    pub camera: usize,
    pub stream: &'static str,
    pub message: String,
}

#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub frames_read: u64,
    pub frames_exported: u64,
    pub images_written: u64,
    pub images_failed: u64,
    pub end: Option<EndReason>,
    pub failures: Vec<ImageFailure>,
}

/// What the per-camera workers need. Shared across rayon threads.
struct ExportContext<'a, C> {
    config: &'a ExtractConfig,
    codec: &'a C,
    mask: Option<&'a PixelGrid>,
}

// derive would demand `C: Copy`
impl<C> Clone for ExportContext<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for ExportContext<'_, C> {}

pub struct StreamDriver<'a, R, C> {
    reader: RecordReader<R>,
    ctx: ExportContext<'a, C>,
    state: DriverState,
    frame_index: u64,
    summary: RunSummary,
}

impl<'a, R: Read, C: ImageCodec> StreamDriver<'a, R, C> {
    pub fn new(input: R, config: &'a ExtractConfig, codec: &'a C) -> Self {
        Self {
            reader: RecordReader::new(input),
            ctx: ExportContext {
                config,
                codec,
                mask: None,
            },
            state: DriverState::Streaming,
            frame_index: 0,
            summary: RunSummary::default(),
        }
    }

    pub fn with_mask(mut self, mask: &'a PixelGrid) -> Self {
        self.ctx.mask = Some(mask);
        self
    }

    #[cfg(test)]
    pub fn state(&self) -> DriverState {
        self.state
    }

    #[cfg(test)]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    #[cfg(test)]
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    fn finish(&mut self, reason: EndReason) -> DriverState {
        self.state = DriverState::EndOfStream;
        self.summary.end = Some(reason);
        logger::debug(&format!("stream finished at frame {} ({:?})", self.frame_index, reason));
        self.state
    }

    fn fail(&mut self, err: UnpackError) -> UnpackError {
        debug_assert!(err.is_fatal());
        self.state = DriverState::Failed;
        logger::error(&err.to_string());
        err
    }

    /// Process one frame record. Returns the state afterwards.
    pub fn step(&mut self) -> Result<DriverState, UnpackError> {
        if self.state != DriverState::Streaming {
            return Ok(self.state);
        }

        if let Some(bound) = self.ctx.config.frame_bound {
            if self.frame_index >= bound {
                return Ok(self.finish(EndReason::FrameBound));
            }
        }

        let frame = self.frame_index;
        match self.reader.at_end() {
            Ok(true) => return Ok(self.finish(EndReason::EndOfStream)),
            Ok(false) => {}
            Err(e) => return Err(self.fail(e.at(frame, 0, BlockKind::Depth))),
        }

        // the decision only depends on the frame index, so depth and color of every camera share it
        let export = should_export(frame, &self.ctx.config.selection);
        let record = match read_frame(&mut self.reader, &self.ctx.config.layout, frame, export) {
            Ok(record) => record,
            Err(e) => return Err(self.fail(e)),
        };
        self.summary.frames_read += 1;

        if let Some(record) = record {
            self.export_frame(frame, record);
            self.summary.frames_exported += 1;
        }

        self.frame_index += 1;
        Ok(self.state)
    }

    /// Step until the stream ends or a structural error occurs.
    pub fn run(mut self) -> Result<RunSummary, UnpackError> {
        while self.step()? == DriverState::Streaming {}
        Ok(self.summary)
    }

    fn export_frame(&mut self, frame: u64, record: FrameRecord) {
        let ctx = self.ctx;
        let FrameRecord { depth, color } = record;

        let results: Vec<(usize, &'static str, Result<PathBuf, UnpackError>)> = depth
            .into_par_iter()
            .zip(color.into_par_iter())
            .enumerate()
            .flat_map_iter(|(camera, (depth, color))| {
                [
                    (camera, "depth", export_depth(&ctx, frame, camera, &depth)),
                    (camera, "color", export_color(&ctx, frame, camera, color)),
                ]
            })
            .collect();

        for (camera, stream, result) in results {
            match result {
                Ok(path) => {
                    self.summary.images_written += 1;
                    logger::debug(&format!("wrote {}", path.display()));
                }
                Err(err) => {
                    self.summary.images_failed += 1;
                    let message = err.to_string();
                    logger::warn(&format!(
                        "frame {} camera {} {}: {}",
                        frame, camera, stream, message
                    ));
                    self.summary.failures.push(ImageFailure {
                        frame,
                        camera,
                        stream,
                        message,
                    });
                }
            }
        }
    }
}

fn export_depth<C: ImageCodec>(
    ctx: &ExportContext<'_, C>,
    frame: u64,
    camera: usize,
    block: &DepthBlock,
) -> Result<PathBuf, UnpackError> {
    let config = ctx.config;
    let path = resolve(&config.depth_layout, frame, StreamKind::Depth(config.depth_output), camera);

    match config.depth_output.encoding() {
        None => {
            ensure_dir(&config.depth_layout.frame_dir(frame))?;
            write_bytes(&path, block.as_bytes())?;
        }
        Some(encoding) => {
            let values = convert(&block.samples(), encoding)?;
            let grid = PixelGrid::new(
                block.width(),
                block.height(),
                ChannelOrder::Gray,
                PixelData::U16(values),
            )?;
            ensure_dir(&config.depth_layout.frame_dir(frame))?;
            ctx.codec.encode_and_write(&path, &grid, ImageFormat::Png, None)?;
        }
    }
    Ok(path)
}

fn export_color<C: ImageCodec>(
    ctx: &ExportContext<'_, C>,
    frame: u64,
    camera: usize,
    block: ColorBlock,
) -> Result<PathBuf, UnpackError> {
    let config = ctx.config;
    let codec = ctx.codec;

    let grid = match block {
        ColorBlock::Raw(bytes) => {
            let (w, h) = config.layout.color_dimensions();
            let grid = PixelGrid::new(w, h, STREAM_COLOR_ORDER, PixelData::U8(bytes))?;
            codec.recolor(grid, STREAM_COLOR_ORDER, codec.native_order())?
        }
        ColorBlock::Encoded(bytes) => codec.decode(&bytes)?,
    };
    let grid = match ctx.mask {
        Some(mask) => codec.apply_mask(grid, mask)?,
        None => grid,
    };

    let (format, quality) = match config.color_output {
        ColorOutput::Png => (ImageFormat::Png, None),
        ColorOutput::Jpg => (ImageFormat::Jpeg, Some(config.jpeg_quality)),
    };
    let path = resolve(&config.color_layout, frame, StreamKind::Color(config.color_output), camera);
    ensure_dir(&config.color_layout.frame_dir(frame))?;
    codec.encode_and_write(&path, &grid, format, quality)?;
    Ok(path)
}
