//! Error taxonomy for the unpacker.
//!
//! Structural errors on the input stream (`Configuration`, `TruncatedStream`, `Io`)
//! abort the run. Everything tied to a single output image (`Decode`, `EncodeWrite`,
//! `CreateDir`, `Overflow`) is reported for that image and the run carries on.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which half of a frame record a read was working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Depth,
    ColorLength,
    Color,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Depth => write!(f, "depth block"),
            BlockKind::ColorLength => write!(f, "color length prefix"),
            BlockKind::Color => write!(f, "color block"),
        }
    }
}

#[derive(Debug, Error)]
pub enum UnpackError {
    /// Invalid or missing selection arguments. Raised before the input is touched.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Fewer bytes left in the capture than a fixed-size read needs.
    #[error(
        "truncated stream at frame {frame}, camera {camera} ({block}): \
         wanted {wanted} bytes at offset {offset}, got {got}"
    )]
    TruncatedStream {
        frame: u64,
        camera: usize,
        block: BlockKind,
        offset: u64,
        wanted: u64,
        got: u64,
    },

    #[error("i/o error at frame {frame}, camera {camera} ({block}): {source}")]
    Io {
        frame: u64,
        camera: usize,
        block: BlockKind,
        #[source]
        source: std::io::Error,
    },

    /// Malformed compressed color bitstream.
    #[error("could not decode color block ({len} bytes): {reason}")]
    Decode { len: usize, reason: String },

    #[error("could not write {}: {reason}", .path.display())]
    EncodeWrite { path: PathBuf, reason: String },

    #[error("could not create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mask does not fit image: {0}")]
    Mask(String),

    /// Depth sample outside what the 16-bit millimeter encoding can hold.
    #[error("depth sample {index} is {meters} m, beyond the 16-bit millimeter range")]
    Overflow { index: usize, meters: f32 },
}

impl UnpackError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn encode_write(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self::EncodeWrite {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn decode(len: usize, reason: impl fmt::Display) -> Self {
        Self::Decode {
            len,
            reason: reason.to_string(),
        }
    }

    /// Whether this error ends the whole run, as opposed to a single image.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            UnpackError::Configuration(_)
                | UnpackError::TruncatedStream { .. }
                | UnpackError::Io { .. }
        )
    }
}
