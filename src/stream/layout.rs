use std::io::Read;

use serde::Serialize;

use super::reader::RecordReader;
use crate::error::{BlockKind, UnpackError};
use crate::shared::constants::{
    COLOR_CHANNELS, DEPTH_BLOCK_BYTES, DEPTH_HEIGHT, DEPTH_WIDTH, HD_HEIGHT, HD_WIDTH, NUM_CAMS,
    QHD_HEIGHT, QHD_WIDTH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorResolution {
    Hd,
    Qhd,
}

impl ColorResolution {
    pub fn dimensions(self) -> (usize, usize) {
        match self {
            ColorResolution::Hd => (HD_WIDTH, HD_HEIGHT),
            ColorResolution::Qhd => (QHD_WIDTH, QHD_HEIGHT),
        }
    }
}

/// How color blocks are stored. Fixed for the whole stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorEncoding {
    /// Dense W*H*3 byte grid.
    Raw,
    /// u64 little-endian length followed by a JPEG bitstream.
    LengthPrefixed,
}

/// Byte geometry of one frame record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamLayout {
    pub resolution: ColorResolution,
    pub encoding: ColorEncoding,
}

impl StreamLayout {
    pub fn new(resolution: ColorResolution, encoding: ColorEncoding) -> Self {
        Self { resolution, encoding }
    }

    pub fn color_dimensions(&self) -> (usize, usize) {
        self.resolution.dimensions()
    }

    pub fn raw_color_bytes(&self) -> usize {
        let (w, h) = self.color_dimensions();
        w * h * COLOR_CHANNELS
    }

    /// Size of a whole record, if every block has a fixed size.
    pub fn fixed_frame_bytes(&self) -> Option<u64> {
        match self.encoding {
            ColorEncoding::Raw => {
                Some((NUM_CAMS * (DEPTH_BLOCK_BYTES + self.raw_color_bytes())) as u64)
            }
            ColorEncoding::LengthPrefixed => None,
        }
    }
}

/// One camera's depth grid, kept as the exact bytes from the stream.
#[derive(Debug, Clone)]
pub struct DepthBlock {
    bytes: Vec<u8>,
}

impl DepthBlock {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        debug_assert_eq!(bytes.len(), DEPTH_BLOCK_BYTES);
        Self { bytes }
    }

    pub fn width(&self) -> usize {
        DEPTH_WIDTH
    }

    pub fn height(&self) -> usize {
        DEPTH_HEIGHT
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Samples in meters, row-major.
    pub fn samples(&self) -> Vec<f32> {
        self.bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub enum ColorBlock {
    Raw(Vec<u8>),
    Encoded(Vec<u8>),
}

/// All blocks of one time step, in camera order.
#[derive(Debug, Clone)]
pub struct FrameRecord {
    pub depth: Vec<DepthBlock>,
    pub color: Vec<ColorBlock>,
}

/// Read the next record, or consume it without keeping it when `keep` is false.
///
/// Either the whole record is read or an error is returned; there are no partial records.
pub fn read_frame<R: Read>(
    reader: &mut RecordReader<R>,
    layout: &StreamLayout,
    frame: u64,
    keep: bool,
) -> Result<Option<FrameRecord>, UnpackError> {
    let mut depth = Vec::with_capacity(if keep { NUM_CAMS } else { 0 });
    for camera in 0..NUM_CAMS {
        if keep {
            let bytes = reader
                .read_exact(DEPTH_BLOCK_BYTES)
                .map_err(|e| e.at(frame, camera, BlockKind::Depth))?;
            depth.push(DepthBlock::from_bytes(bytes));
        } else {
            reader
                .skip(DEPTH_BLOCK_BYTES as u64)
                .map_err(|e| e.at(frame, camera, BlockKind::Depth))?;
        }
    }

    let mut color = Vec::with_capacity(if keep { NUM_CAMS } else { 0 });
    for camera in 0..NUM_CAMS {
        let len = match layout.encoding {
            ColorEncoding::Raw => layout.raw_color_bytes() as u64,
            ColorEncoding::LengthPrefixed => reader
                .read_u64_le()
                .map_err(|e| e.at(frame, camera, BlockKind::ColorLength))?,
        };

        if keep {
            let len = usize::try_from(len).map_err(|_| UnpackError::TruncatedStream {
                frame,
                camera,
                block: BlockKind::Color,
                offset: reader.offset(),
                wanted: len,
                got: 0,
            })?;
            let bytes = reader
                .read_exact(len)
                .map_err(|e| e.at(frame, camera, BlockKind::Color))?;
            color.push(match layout.encoding {
                ColorEncoding::Raw => ColorBlock::Raw(bytes),
                ColorEncoding::LengthPrefixed => ColorBlock::Encoded(bytes),
            });
        } else {
            reader
                .skip(len)
                .map_err(|e| e.at(frame, camera, BlockKind::Color))?;
        }
    }

    Ok(keep.then_some(FrameRecord { depth, color }))
}
