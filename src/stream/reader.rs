use std::io::{self, BufRead, BufReader, Read};

use thiserror::Error;

use crate::error::{BlockKind, UnpackError};

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("wanted {wanted} bytes at offset {offset}, got {got}")]
    Truncated { offset: u64, wanted: u64, got: u64 },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ReadError {
    /// Pin a raw read failure to the block the driver was reading.
    pub fn at(self, frame: u64, camera: usize, block: BlockKind) -> UnpackError {
        match self {
            ReadError::Truncated { offset, wanted, got } => UnpackError::TruncatedStream {
                frame,
                camera,
                block,
                offset,
                wanted,
                got,
            },
            ReadError::Io(source) => UnpackError::Io {
                frame,
                camera,
                block,
                source,
            },
        }
    }
}

/// Forward-only reader over a capture stream.
///
/// Tracks the byte offset for error reporting; never seeks or rewinds.
pub struct RecordReader<R> {
    inner: BufReader<R>,
    offset: u64,
}

// Upfront allocation cap for length-prefixed reads; a corrupt prefix should
// fail as truncation, not as an allocation of the claimed size.
const MAX_PREALLOC: usize = 64 * 1024 * 1024;

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            offset: 0,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read exactly `n` bytes, failing with `Truncated` if the stream ends first.
    pub fn read_exact(&mut self, n: usize) -> Result<Vec<u8>, ReadError> {
        let mut buffer = Vec::new();
        self.read_exact_into(&mut buffer, n)?;
        Ok(buffer)
    }

    /// Like `read_exact`, reusing `buffer`. Its previous contents are discarded.
    pub fn read_exact_into(&mut self, buffer: &mut Vec<u8>, n: usize) -> Result<(), ReadError> {
        buffer.clear();
        buffer.reserve(n.min(MAX_PREALLOC));

        let start = self.offset;
        let got = (&mut self.inner).take(n as u64).read_to_end(buffer)?;
        self.offset += got as u64;

        if got < n {
            return Err(ReadError::Truncated {
                offset: start,
                wanted: n as u64,
                got: got as u64,
            });
        }
        Ok(())
    }

    /// Consume `n` bytes without keeping them.
    pub fn skip(&mut self, n: u64) -> Result<(), ReadError> {
        let start = self.offset;
        let got = io::copy(&mut (&mut self.inner).take(n), &mut io::sink())?;
        self.offset += got;

        if got < n {
            return Err(ReadError::Truncated {
                offset: start,
                wanted: n,
                got,
            });
        }
        Ok(())
    }

    pub fn read_u64_le(&mut self) -> Result<u64, ReadError> {
        let mut raw = Vec::with_capacity(8);
        self.read_exact_into(&mut raw, 8)?;
        let mut le = [0u8; 8];
        le.copy_from_slice(&raw);
        Ok(u64::from_le_bytes(le))
    }

    /// True if the next read would hit end-of-stream immediately.
    pub fn at_end(&mut self) -> Result<bool, ReadError> {
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => return Ok(buf.is_empty()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_exact_advances_offset() {
        let mut reader = RecordReader::new(Cursor::new(vec![1u8, 2, 3, 4, 5]));
        assert_eq!(reader.read_exact(2).unwrap(), vec![1, 2]);
        assert_eq!(reader.offset(), 2);
        assert_eq!(reader.read_exact(3).unwrap(), vec![3, 4, 5]);
        assert!(reader.at_end().unwrap());
    }

    #[test]
    fn test_short_read_is_truncation() {
        let mut reader = RecordReader::new(Cursor::new(vec![0u8; 6]));
        reader.read_exact(4).unwrap();
        match reader.read_exact(4) {
            Err(ReadError::Truncated { offset, wanted, got }) => {
                assert_eq!(offset, 4);
                assert_eq!(wanted, 4);
                assert_eq!(got, 2);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn test_at_end_does_not_consume() {
        let mut reader = RecordReader::new(Cursor::new(vec![9u8]));
        assert!(!reader.at_end().unwrap());
        assert!(!reader.at_end().unwrap());
        assert_eq!(reader.read_exact(1).unwrap(), vec![9]);
        assert!(reader.at_end().unwrap());
    }

    #[test]
    fn test_u64_prefix_little_endian() {
        let mut bytes = 300u64.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[7, 7]);
        let mut reader = RecordReader::new(Cursor::new(bytes));
        assert_eq!(reader.read_u64_le().unwrap(), 300);
        assert_eq!(reader.offset(), 8);

        let mut short = RecordReader::new(Cursor::new(vec![1u8, 2, 3]));
        assert!(matches!(
            short.read_u64_le(),
            Err(ReadError::Truncated { wanted: 8, got: 3, .. })
        ));
        assert_eq!(short.offset(), 3);
    }

    #[test]
    fn test_skip_reports_truncation() {
        let mut reader = RecordReader::new(Cursor::new(vec![0u8; 10]));
        reader.skip(4).unwrap();
        assert_eq!(reader.offset(), 4);
        assert!(matches!(
            reader.skip(10),
            Err(ReadError::Truncated { offset: 4, wanted: 10, got: 6 })
        ));
    }

    #[test]
    fn test_location_attached_to_truncation() {
        let err = ReadError::Truncated { offset: 8, wanted: 16, got: 3 }.at(5, 1, BlockKind::Color);
        assert!(matches!(
            err,
            UnpackError::TruncatedStream { frame: 5, camera: 1, block: BlockKind::Color, .. }
        ));
    }
}
