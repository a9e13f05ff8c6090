use std::io::Read;

use serde::Serialize;

use super::layout::{read_frame, StreamLayout};
use super::reader::RecordReader;
use crate::error::{BlockKind, UnpackError};

/// What a structural pass over a capture found.
#[derive(Debug, Serialize)]
pub struct StreamStats {
    pub layout: StreamLayout,
    /// Record size, when color blocks are fixed-size.
    pub frame_bytes: Option<u64>,
    pub complete_frames: u64,
    pub bytes_consumed: u64,
    /// Set when the stream ends inside a record.
    pub truncated: Option<TruncatedTail>,
}

#[derive(Debug, Serialize)]
pub struct TruncatedTail {
    pub frame: u64,
    pub detail: String,
}

/// Walk the whole stream without decoding anything.
///
/// A truncated tail is reported in the stats rather than returned as an error;
/// only I/O failures on the input abort the scan.
pub fn scan<R: Read>(
    reader: &mut RecordReader<R>,
    layout: &StreamLayout,
) -> Result<StreamStats, UnpackError> {
    let mut complete_frames = 0u64;
    let mut truncated = None;

    loop {
        let at_end = reader
            .at_end()
            .map_err(|e| e.at(complete_frames, 0, BlockKind::Depth))?;
        if at_end {
            break;
        }

        match read_frame(reader, layout, complete_frames, false) {
            Ok(_) => complete_frames += 1,
            Err(err @ UnpackError::TruncatedStream { .. }) => {
                truncated = Some(TruncatedTail {
                    frame: complete_frames,
                    detail: err.to_string(),
                });
                break;
            }
            Err(err) => return Err(err),
        }
    }

    crate::utils::logger::debug(&format!(
        "scan: {} complete frames, {} bytes, truncated={}",
        complete_frames,
        reader.offset(),
        truncated.is_some()
    ));

    Ok(StreamStats {
        layout: *layout,
        frame_bytes: layout.fixed_frame_bytes(),
        complete_frames,
        bytes_consumed: reader.offset(),
        truncated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::{DEPTH_BLOCK_BYTES, NUM_CAMS};
    use crate::stream::layout::{ColorEncoding, ColorResolution};
    use std::io::Cursor;

    fn jpeg_frame(payload_len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; NUM_CAMS * DEPTH_BLOCK_BYTES];
        for _ in 0..NUM_CAMS {
            bytes.extend_from_slice(&(payload_len as u64).to_le_bytes());
            bytes.extend(std::iter::repeat(0xAB).take(payload_len));
        }
        bytes
    }

    #[test]
    fn test_counts_complete_frames() {
        let layout = StreamLayout::new(ColorResolution::Hd, ColorEncoding::LengthPrefixed);
        let mut bytes = jpeg_frame(16);
        bytes.extend(jpeg_frame(3));
        let total = bytes.len() as u64;

        let mut reader = RecordReader::new(Cursor::new(bytes));
        let stats = scan(&mut reader, &layout).unwrap();
        assert_eq!(stats.complete_frames, 2);
        assert_eq!(stats.bytes_consumed, total);
        assert!(stats.truncated.is_none());
    }

    #[test]
    fn test_reports_truncated_tail() {
        let layout = StreamLayout::new(ColorResolution::Hd, ColorEncoding::LengthPrefixed);
        let mut bytes = jpeg_frame(8);
        bytes.extend_from_slice(&[0u8; 100]);

        let mut reader = RecordReader::new(Cursor::new(bytes));
        let stats = scan(&mut reader, &layout).unwrap();
        assert_eq!(stats.complete_frames, 1);
        let tail = stats.truncated.expect("tail should be truncated");
        assert_eq!(tail.frame, 1);
        assert!(tail.detail.contains("camera 0"));
    }

    #[test]
    fn test_stats_serialize_to_json() {
        let layout = StreamLayout::new(ColorResolution::Qhd, ColorEncoding::Raw);
        let mut reader = RecordReader::new(Cursor::new(Vec::<u8>::new()));
        let stats = scan(&mut reader, &layout).unwrap();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["complete_frames"], 0);
        assert_eq!(json["layout"]["resolution"], "qhd");
        assert_eq!(json["layout"]["encoding"], "raw");
        assert!(json["truncated"].is_null());
        assert_eq!(json["frame_bytes"], 4 * (640 * 576 * 4 + 2560 * 1440 * 3));
    }
}
