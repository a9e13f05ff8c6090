//! Boundary to the image library.
//!
//! The driver only deals in [`PixelGrid`]s and paths; pixel decode, channel
//! conversion and file encoding happen behind [`ImageCodec`].

pub mod opencv_codec;

use std::path::Path;

use crate::error::UnpackError;

pub use opencv_codec::OpenCvCodec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
    Gray,
}

impl ChannelOrder {
    pub fn channels(self) -> usize {
        match self {
            ChannelOrder::Rgb | ChannelOrder::Bgr => 3,
            ChannelOrder::Gray => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    U8(Vec<u8>),
    U16(Vec<u16>),
}

impl PixelData {
    pub fn len(&self) -> usize {
        match self {
            PixelData::U8(v) => v.len(),
            PixelData::U16(v) => v.len(),
        }
    }
}

/// Interleaved, row-major image buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    pub width: usize,
    pub height: usize,
    pub order: ChannelOrder,
    pub data: PixelData,
}

impl PixelGrid {
    pub fn new(
        width: usize,
        height: usize,
        order: ChannelOrder,
        data: PixelData,
    ) -> Result<Self, UnpackError> {
        let expected = width * height * order.channels();
        if data.len() != expected {
            return Err(UnpackError::decode(
                data.len(),
                format!("{}x{} {:?} needs {} samples", width, height, order, expected),
            ));
        }
        Ok(Self {
            width,
            height,
            order,
            data,
        })
    }

    pub fn channels(&self) -> usize {
        self.order.channels()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

pub trait ImageCodec: Sync {
    /// Channel order `encode_and_write` expects for color grids.
    fn native_order(&self) -> ChannelOrder;

    /// Decode a compressed color bitstream. The result is in `native_order`.
    fn decode(&self, bytes: &[u8]) -> Result<PixelGrid, UnpackError>;

    /// Reorder channels without resizing.
    fn recolor(
        &self,
        grid: PixelGrid,
        from: ChannelOrder,
        to: ChannelOrder,
    ) -> Result<PixelGrid, UnpackError>;

    fn encode_and_write(
        &self,
        path: &Path,
        grid: &PixelGrid,
        format: ImageFormat,
        quality: Option<u8>,
    ) -> Result<(), UnpackError>;

    /// Load a single-channel 8-bit mask.
    fn read_mask(&self, path: &Path) -> Result<PixelGrid, UnpackError>;

    /// Black out every pixel whose mask value is zero.
    fn apply_mask(&self, mut grid: PixelGrid, mask: &PixelGrid) -> Result<PixelGrid, UnpackError> {
        let same_size = (mask.width, mask.height) == (grid.width, grid.height);
        if mask.order != ChannelOrder::Gray || !same_size {
            return Err(UnpackError::Mask(format!(
                "mask is {}x{} {:?}, image is {}x{}",
                mask.width, mask.height, mask.order, grid.width, grid.height
            )));
        }
        let PixelData::U8(mask_px) = &mask.data else {
            return Err(UnpackError::Mask("mask must be 8-bit".to_string()));
        };

        let channels = grid.channels();
        match &mut grid.data {
            PixelData::U8(px) => {
                for (pixel, &m) in px.chunks_exact_mut(channels).zip(mask_px) {
                    if m == 0 {
                        pixel.fill(0);
                    }
                }
            }
            PixelData::U16(px) => {
                for (pixel, &m) in px.chunks_exact_mut(channels).zip(mask_px) {
                    if m == 0 {
                        pixel.fill(0);
                    }
                }
            }
        }
        Ok(grid)
    }
}
