use std::path::PathBuf;

use crate::cli::ExtractArgs;
use crate::core::paths::{ColorOutput, DepthOutput, OutputLayout};
use crate::core::selector::SelectionCriteria;
use crate::error::UnpackError;
use crate::stream::StreamLayout;

/// Everything an extraction run needs, validated once up front.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub input: PathBuf,
    pub layout: StreamLayout,
    pub selection: SelectionCriteria,
    /// Stop after this many frames. `None` reads to the end of the stream.
    pub frame_bound: Option<u64>,
    pub depth_output: DepthOutput,
    pub color_output: ColorOutput,
    pub jpeg_quality: u8,
    pub depth_layout: OutputLayout,
    pub color_layout: OutputLayout,
    pub mask: Option<PathBuf>,
}

impl ExtractConfig {
    pub fn from_args(args: &ExtractArgs) -> Result<Self, UnpackError> {
        let range = match args.range.as_deref() {
            None => None,
            Some([start, end]) => {
                if start > end {
                    return Err(UnpackError::configuration(format!(
                        "range start {} is past its end {}",
                        start, end
                    )));
                }
                Some((*start, *end))
            }
            Some(values) => {
                return Err(UnpackError::configuration(format!(
                    "range needs a start and an end, got {} value(s)",
                    values.len()
                )))
            }
        };

        if !(1..=100).contains(&args.jpeg_quality) {
            return Err(UnpackError::configuration(format!(
                "jpeg quality must be within 1..=100, got {}",
                args.jpeg_quality
            )));
        }

        let selection = SelectionCriteria::from_options(args.target, range);
        let frame_bound = [args.frames, selection.frames_needed()]
            .into_iter()
            .flatten()
            .max();

        Ok(Self {
            input: args.stream.input.clone(),
            layout: args.stream.layout(),
            selection,
            frame_bound,
            depth_output: args.depth_format,
            color_output: args.color_format,
            jpeg_quality: args.jpeg_quality,
            depth_layout: OutputLayout::new(&args.depth_dir, args.per_frame),
            color_layout: OutputLayout::new(&args.color_dir, args.per_frame),
            mask: args.mask.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::stream::{ColorEncoding, ColorResolution};
    use clap::Parser;

    fn parse(extra: &[&str]) -> Result<ExtractConfig, UnpackError> {
        let mut argv = vec!["kinect-unpack", "extract", "-i", "capture.bin"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).expect("arguments should parse").command {
            Commands::Extract(args) => ExtractConfig::from_args(&args),
            Commands::Inspect(_) => unreachable!(),
        }
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.selection, SelectionCriteria::ExportAll);
        assert_eq!(config.frame_bound, None);
        assert_eq!(config.layout.resolution, ColorResolution::Hd);
        assert_eq!(config.layout.encoding, ColorEncoding::Raw);
        assert_eq!(config.depth_output, DepthOutput::PngNormalized);
        assert_eq!(config.jpeg_quality, 100);
        assert!(matches!(config.depth_layout, OutputLayout::Flat(_)));
    }

    #[test]
    fn test_bound_is_largest_of_count_target_and_range() {
        assert_eq!(parse(&["-n", "3"]).unwrap().frame_bound, Some(3));
        assert_eq!(parse(&["-n", "3", "-t", "6"]).unwrap().frame_bound, Some(7));
        assert_eq!(parse(&["-n", "30", "-t", "6"]).unwrap().frame_bound, Some(30));
        assert_eq!(parse(&["-r", "2", "9"]).unwrap().frame_bound, Some(9));
    }

    #[test]
    fn test_target_beats_range() {
        let config = parse(&["-t", "4", "-r", "0", "2"]).unwrap();
        assert_eq!(config.selection, SelectionCriteria::ExportOne(4));
    }

    #[test]
    fn test_range_with_one_value_is_rejected() {
        assert!(matches!(parse(&["-r", "5"]), Err(UnpackError::Configuration(_))));
    }

    #[test]
    fn test_backwards_range_is_rejected() {
        assert!(matches!(parse(&["-r", "9", "2"]), Err(UnpackError::Configuration(_))));
        let empty = parse(&["-r", "5", "5"]).unwrap();
        assert_eq!(empty.selection, SelectionCriteria::ExportRange { start: 5, end: 5 });
    }

    #[test]
    fn test_jpeg_quality_bounds() {
        assert!(parse(&["--jpeg-quality", "0"]).is_err());
        assert_eq!(parse(&["--jpeg-quality", "85"]).unwrap().jpeg_quality, 85);
    }

    #[test]
    fn test_stream_and_output_flags() {
        let config = parse(&[
            "--qhd",
            "-j",
            "--per-frame",
            "--depth-dir",
            "d",
            "--color-dir",
            "c",
            "--depth-format",
            "raw",
            "--color-format",
            "jpg",
        ])
        .unwrap();
        assert_eq!(config.layout.resolution, ColorResolution::Qhd);
        assert_eq!(config.layout.encoding, ColorEncoding::LengthPrefixed);
        assert_eq!(config.depth_layout, OutputLayout::PerFrame(PathBuf::from("d")));
        assert_eq!(config.color_layout, OutputLayout::PerFrame(PathBuf::from("c")));
        assert_eq!(config.depth_output, DepthOutput::Raw);
        assert_eq!(config.color_output, ColorOutput::Jpg);
    }
}
