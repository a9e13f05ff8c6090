use std::path::Path;

use opencv::{
    core::{self, Mat, Scalar, Vector},
    imgcodecs, imgproc,
    prelude::*,
};

use super::{ChannelOrder, ImageCodec, ImageFormat, PixelData, PixelGrid};
use crate::error::UnpackError;

/// `ImageCodec` backed by OpenCV's imgcodecs/imgproc.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenCvCodec;

impl OpenCvCodec {
    pub fn new() -> Self {
        Self
    }
}

fn mat_type(grid: &PixelGrid) -> opencv::Result<i32> {
    match (&grid.data, grid.channels()) {
        (PixelData::U8(_), 1) => Ok(core::CV_8UC1),
        (PixelData::U8(_), 3) => Ok(core::CV_8UC3),
        (PixelData::U16(_), 1) => Ok(core::CV_16UC1),
        (PixelData::U16(_), 3) => Ok(core::CV_16UC3),
        (_, n) => Err(opencv::Error::new(
            core::StsBadArg,
            format!("unsupported channel count {}", n),
        )),
    }
}

fn to_mat(grid: &PixelGrid) -> opencv::Result<Mat> {
    let mut mat = Mat::new_rows_cols_with_default(
        grid.height as i32,
        grid.width as i32,
        mat_type(grid)?,
        Scalar::all(0.0),
    )?;
    match &grid.data {
        PixelData::U8(bytes) => mat.data_bytes_mut()?.copy_from_slice(bytes),
        PixelData::U16(values) => {
            let dst = mat.data_bytes_mut()?;
            for (d, v) in dst.chunks_exact_mut(2).zip(values) {
                d.copy_from_slice(&v.to_ne_bytes());
            }
        }
    }
    Ok(mat)
}

fn color_grid_from_mat(mat: &Mat, order: ChannelOrder) -> opencv::Result<PixelGrid> {
    if mat.typ() != core::CV_8UC3 {
        return Err(opencv::Error::new(
            core::StsUnsupportedFormat,
            format!("expected 8UC3, got type {}", mat.typ()),
        ));
    }
    let owned;
    let mat = if mat.is_continuous() {
        mat
    } else {
        owned = mat.try_clone()?;
        &owned
    };
    Ok(PixelGrid {
        width: mat.cols() as usize,
        height: mat.rows() as usize,
        order,
        data: PixelData::U8(mat.data_bytes()?.to_vec()),
    })
}

fn write_params(format: ImageFormat, quality: Option<u8>) -> Vector<i32> {
    match (format, quality) {
        (ImageFormat::Jpeg, Some(q)) => {
            Vector::from_slice(&[imgcodecs::IMWRITE_JPEG_QUALITY, i32::from(q)])
        }
        _ => Vector::new(),
    }
}

impl ImageCodec for OpenCvCodec {
    fn native_order(&self) -> ChannelOrder {
        ChannelOrder::Bgr
    }

    fn decode(&self, bytes: &[u8]) -> Result<PixelGrid, UnpackError> {
        let buf = Vector::<u8>::from_slice(bytes);
        let mat = imgcodecs::imdecode(&buf, imgcodecs::IMREAD_COLOR)
            .map_err(|e| UnpackError::decode(bytes.len(), e))?;
        if mat.empty() {
            return Err(UnpackError::decode(bytes.len(), "couldn't parse jpeg data"));
        }
        color_grid_from_mat(&mat, ChannelOrder::Bgr)
            .map_err(|e| UnpackError::decode(bytes.len(), e))
    }

    fn recolor(
        &self,
        grid: PixelGrid,
        from: ChannelOrder,
        to: ChannelOrder,
    ) -> Result<PixelGrid, UnpackError> {
        if from == to {
            return Ok(grid);
        }
        let code = match (from, to) {
            (ChannelOrder::Rgb, ChannelOrder::Bgr) => imgproc::COLOR_RGB2BGR,
            (ChannelOrder::Bgr, ChannelOrder::Rgb) => imgproc::COLOR_BGR2RGB,
            _ => {
                return Err(UnpackError::decode(
                    grid.data.len(),
                    format!("no conversion from {:?} to {:?}", from, to),
                ))
            }
        };

        let len = grid.data.len();
        let converted = (|| -> opencv::Result<PixelGrid> {
            let src = to_mat(&grid)?;
            let mut dst = Mat::default();
            imgproc::cvt_color_def(&src, &mut dst, code)?;
            color_grid_from_mat(&dst, to)
        })();
        converted.map_err(|e| UnpackError::decode(len, e))
    }

    fn encode_and_write(
        &self,
        path: &Path,
        grid: &PixelGrid,
        format: ImageFormat,
        quality: Option<u8>,
    ) -> Result<(), UnpackError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| UnpackError::encode_write(path, "path is not valid UTF-8"))?;
        let mat = to_mat(grid).map_err(|e| UnpackError::encode_write(path, e))?;

        let written = imgcodecs::imwrite(path_str, &mat, &write_params(format, quality))
            .map_err(|e| UnpackError::encode_write(path, e))?;
        if !written {
            return Err(UnpackError::encode_write(path, "Couldn't save image"));
        }
        Ok(())
    }

    fn read_mask(&self, path: &Path) -> Result<PixelGrid, UnpackError> {
        let path_str = path.to_str().ok_or_else(|| {
            UnpackError::configuration(format!("mask path {:?} is not UTF-8", path))
        })?;
        let mat = imgcodecs::imread(path_str, imgcodecs::IMREAD_GRAYSCALE)
            .map_err(|e| UnpackError::configuration(format!("mask {}: {}", path.display(), e)))?;
        if mat.empty() {
            return Err(UnpackError::configuration(format!(
                "mask {} could not be read",
                path.display()
            )));
        }
        let data = mat
            .data_bytes()
            .map_err(|e| UnpackError::configuration(format!("mask {}: {}", path.display(), e)))?
            .to_vec();
        PixelGrid::new(
            mat.cols() as usize,
            mat.rows() as usize,
            ChannelOrder::Gray,
            PixelData::U8(data),
        )
    }
}
