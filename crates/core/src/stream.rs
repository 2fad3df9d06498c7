//! Big-endian byte stream reader shared by the DVI and PK decoders.
//!
//! Both container formats are streams of opcode bytes followed by fixed-width
//! big-endian parameters, located by a mix of forward reads and absolute or
//! end-relative seeks. `ByteReader` wraps any `Read + Seek` source and exposes
//! exactly those operations. Hitting end-of-stream mid-read is a format error
//! (`TruncatedStream`), never a retryable condition.

use crate::error::{DviError, Result};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{Read, Seek, SeekFrom};

/// Width and signedness of one opcode parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntWidth {
    /// Number of bytes, 1 to 4.
    pub bytes: u8,
    /// Two's complement when set.
    pub signed: bool,
}

impl IntWidth {
    pub const fn unsigned(bytes: u8) -> Self {
        Self {
            bytes,
            signed: false,
        }
    }

    pub const fn signed(bytes: u8) -> Self {
        Self {
            bytes,
            signed: true,
        }
    }
}

/// Seekable big-endian reader over a byte source.
pub struct ByteReader<R> {
    inner: R,
}

fn map_eof(e: std::io::Error) -> DviError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        DviError::TruncatedStream
    } else {
        DviError::Io(e)
    }
}

impl<R: Read + Seek> ByteReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Consume the reader and return the underlying source.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Current absolute position.
    pub fn tell(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Seek to an absolute offset.
    pub fn seek_to(&mut self, pos: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    /// Seek relative to the current position (negative moves backward).
    pub fn seek_by(&mut self, delta: i64) -> Result<()> {
        self.inner.seek(SeekFrom::Current(delta))?;
        Ok(())
    }

    /// Seek relative to end-of-stream (`delta` is normally negative).
    pub fn seek_from_end(&mut self, delta: i64) -> Result<()> {
        self.inner.seek(SeekFrom::End(delta))?;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.inner.read_u8().map_err(map_eof)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.inner.read_u16::<BigEndian>().map_err(map_eof)
    }

    pub fn read_u24(&mut self) -> Result<u32> {
        self.inner.read_u24::<BigEndian>().map_err(map_eof)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.inner.read_u32::<BigEndian>().map_err(map_eof)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.inner.read_i8().map_err(map_eof)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.inner.read_i16::<BigEndian>().map_err(map_eof)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.inner.read_i32::<BigEndian>().map_err(map_eof)
    }

    /// Read one big-endian integer of the given width and signedness.
    ///
    /// The result is widened to `i64`, which losslessly holds every
    /// 1–4 byte value of either signedness.
    pub fn read_int(&mut self, width: IntWidth) -> Result<i64> {
        let n = usize::from(width.bytes);
        if width.signed {
            self.inner.read_int::<BigEndian>(n).map_err(map_eof)
        } else {
            self.inner
                .read_uint::<BigEndian>(n)
                .map(|v| v as i64)
                .map_err(map_eof)
        }
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf).map_err(map_eof)?;
        Ok(buf)
    }

    /// Read a string prefixed by a one-byte length.
    ///
    /// Both containers store their comment this way. Non-ASCII bytes are
    /// replaced rather than rejected; the comment is informational only.
    pub fn read_short_string(&mut self) -> Result<String> {
        let len = self.read_u8()?;
        let bytes = self.read_bytes(usize::from(len))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
