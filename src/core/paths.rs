use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::depth::DepthEncoding;

/// How depth blocks are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DepthOutput {
    /// 16-bit PNG, 0..10 m over the full range.
    PngNormalized,
    /// 16-bit PNG in millimeters.
    PngMm,
    /// The block's float32 bytes, untouched.
    Raw,
}

impl DepthOutput {
    pub fn encoding(self) -> Option<DepthEncoding> {
        match self {
            DepthOutput::PngNormalized => Some(DepthEncoding::Normalized16),
            DepthOutput::PngMm => Some(DepthEncoding::Millimeter16),
            DepthOutput::Raw => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorOutput {
    Png,
    Jpg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Depth(DepthOutput),
    Color(ColorOutput),
}

impl StreamKind {
    fn tag(&self) -> Option<&'static str> {
        match self {
            StreamKind::Depth(_) => Some("d"),
            StreamKind::Color(_) => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            StreamKind::Depth(DepthOutput::Raw) => "bin",
            StreamKind::Depth(_) => "png",
            StreamKind::Color(ColorOutput::Png) => "png",
            StreamKind::Color(ColorOutput::Jpg) => "jpg",
        }
    }
}

/// Where one stream's images land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLayout {
    /// Every frame in `base_dir`.
    Flat(PathBuf),
    /// `base_dir/t<frame>/` per frame.
    PerFrame(PathBuf),
}

impl OutputLayout {
    pub fn new(base_dir: impl Into<PathBuf>, per_frame: bool) -> Self {
        let base_dir = base_dir.into();
        if per_frame {
            OutputLayout::PerFrame(base_dir)
        } else {
            OutputLayout::Flat(base_dir)
        }
    }

    pub fn base_dir(&self) -> &Path {
        match self {
            OutputLayout::Flat(dir) | OutputLayout::PerFrame(dir) => dir,
        }
    }

    /// Directory that has to exist before writing anything for `frame_index`.
    pub fn frame_dir(&self, frame_index: u64) -> PathBuf {
        match self {
            OutputLayout::Flat(dir) => dir.clone(),
            OutputLayout::PerFrame(dir) => dir.join(format!("t{}", frame_index)),
        }
    }
}

/// Destination of one image. Pure; never touches the filesystem.
pub fn resolve(
    layout: &OutputLayout,
    frame_index: u64,
    kind: StreamKind,
    camera: usize,
) -> PathBuf {
    let name = match kind.tag() {
        Some(tag) => format!("out_{}_t{}_c{}.{}", tag, frame_index, camera, kind.extension()),
        None => format!("out_t{}_c{}.{}", frame_index, camera, kind.extension()),
    };
    layout.frame_dir(frame_index).join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const DEPTH: StreamKind = StreamKind::Depth(DepthOutput::PngNormalized);
    const COLOR: StreamKind = StreamKind::Color(ColorOutput::Png);

    #[test]
    fn test_flat_names() {
        let layout = OutputLayout::new("out", false);
        assert_eq!(resolve(&layout, 3, DEPTH, 1), PathBuf::from("out/out_d_t3_c1.png"));
        assert_eq!(resolve(&layout, 3, COLOR, 1), PathBuf::from("out/out_t3_c1.png"));
        assert_eq!(
            resolve(&layout, 0, StreamKind::Depth(DepthOutput::Raw), 2),
            PathBuf::from("out/out_d_t0_c2.bin")
        );
        assert_eq!(
            resolve(&layout, 9, StreamKind::Color(ColorOutput::Jpg), 0),
            PathBuf::from("out/out_t9_c0.jpg")
        );
    }

    #[test]
    fn test_per_frame_names() {
        let layout = OutputLayout::new("base", true);
        assert_eq!(resolve(&layout, 12, DEPTH, 3), PathBuf::from("base/t12/out_d_t12_c3.png"));
        assert_eq!(layout.frame_dir(12), PathBuf::from("base/t12"));
        assert_eq!(layout.base_dir(), Path::new("base"));
    }

    #[test]
    fn test_no_collisions_within_a_run() {
        for per_frame in [false, true] {
            let layout = OutputLayout::new("same", per_frame);
            let mut seen = HashSet::new();
            for frame in 0..25 {
                for camera in 0..4 {
                    for kind in [DEPTH, COLOR] {
                        assert!(seen.insert(resolve(&layout, frame, kind, camera)));
                    }
                }
            }
            assert_eq!(seen.len(), 25 * 4 * 2);
        }
    }

    #[test]
    fn test_depth_output_encodings() {
        assert_eq!(DepthOutput::PngNormalized.encoding(), Some(DepthEncoding::Normalized16));
        assert_eq!(DepthOutput::PngMm.encoding(), Some(DepthEncoding::Millimeter16));
        assert_eq!(DepthOutput::Raw.encoding(), None);
    }
}
