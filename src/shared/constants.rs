pub const APP_NAME: &str = "kinect-unpack";

pub const ERROR_LOG_FILE: &str = "error.log";
pub const DEBUG_LOG_FILE: &str = "debug.log";

/// Camera units in the rig. Every frame record carries this many depth and color blocks.
pub const NUM_CAMS: usize = 4;

pub const DEPTH_WIDTH: usize = 640;
pub const DEPTH_HEIGHT: usize = 576;
pub const DEPTH_SAMPLE_BYTES: usize = std::mem::size_of::<f32>();
pub const DEPTH_BLOCK_BYTES: usize = DEPTH_WIDTH * DEPTH_HEIGHT * DEPTH_SAMPLE_BYTES;

pub const HD_WIDTH: usize = 1280;
pub const HD_HEIGHT: usize = 720;
pub const QHD_WIDTH: usize = 2560;
pub const QHD_HEIGHT: usize = 1440;
pub const COLOR_CHANNELS: usize = 3;

/// Far plane of the normalized depth encoding, in meters.
/// The capture tool's comment says 5 m, but 10 m is what it actually divides by.
pub const MAX_DISTANCE_M: f32 = 10.0;

pub const DEFAULT_OUTPUT_DIR: &str = "images/kinect_textures";
pub const DEFAULT_JPEG_QUALITY: u8 = 100;

pub const DEPTH_ENV_DIR: &str = "KINECT_DEPTH_DIR";
pub const COLOR_ENV_DIR: &str = "KINECT_COLOR_DIR";
