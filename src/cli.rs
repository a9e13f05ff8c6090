use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::paths::{ColorOutput, DepthOutput};
use crate::shared::constants::{
    COLOR_ENV_DIR, DEFAULT_JPEG_QUALITY, DEFAULT_OUTPUT_DIR, DEPTH_ENV_DIR,
};
use crate::stream::{ColorEncoding, ColorResolution, StreamLayout};

#[derive(Parser)]
#[command(author, version, about = "Read kinect streams and output images", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract depth and color images from a capture
    Extract(ExtractArgs),
    /// Count complete frames in a capture without decoding anything
    Inspect(StreamArgs),
}

#[derive(Args, Debug, Clone)]
pub struct StreamArgs {
    /// Capture file path
    #[arg(short, long)]
    pub input: PathBuf,
    /// Colour texture resolution is 2560x1440. If not provided, HD 1280x720 is assumed
    #[arg(long, default_value_t = false)]
    pub qhd: bool,
    /// Colour blocks are length-prefixed jpegs
    #[arg(short = 'j', long = "jpeg-input", default_value_t = false)]
    pub jpeg_input: bool,
}

impl StreamArgs {
    pub fn layout(&self) -> StreamLayout {
        let resolution = if self.qhd { ColorResolution::Qhd } else { ColorResolution::Hd };
        let encoding = if self.jpeg_input {
            ColorEncoding::LengthPrefixed
        } else {
            ColorEncoding::Raw
        };
        StreamLayout::new(resolution, encoding)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub stream: StreamArgs,
    /// Number of time steps to read
    #[arg(short = 'n', long = "frames")]
    pub frames: Option<u64>,
    /// Export only this frame
    #[arg(short, long)]
    pub target: Option<u64>,
    /// Export frames START..END (END exclusive)
    #[arg(short, long, num_args = 1..=2, value_names = ["START", "END"])]
    pub range: Option<Vec<u64>>,
    #[arg(long, env = DEPTH_ENV_DIR, default_value = DEFAULT_OUTPUT_DIR)]
    pub depth_dir: PathBuf,
    #[arg(long, env = COLOR_ENV_DIR, default_value = DEFAULT_OUTPUT_DIR)]
    pub color_dir: PathBuf,
    /// Write each frame into its own t<frame> subdirectory
    #[arg(long, default_value_t = false)]
    pub per_frame: bool,
    #[arg(long, value_enum, default_value_t = DepthOutput::PngNormalized)]
    pub depth_format: DepthOutput,
    #[arg(long, value_enum, default_value_t = ColorOutput::Png)]
    pub color_format: ColorOutput,
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    pub jpeg_quality: u8,
    /// Grayscale mask applied to colour images before writing
    #[arg(short, long)]
    pub mask: Option<PathBuf>,
    /// Print the run summary as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
