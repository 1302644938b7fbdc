//! Codec dispatch: `NONE` (byte-copy) and `LZW` (fixed-width, dictionary
//! resetting) behind a single `CompressionStrategy` selector, plus the
//! identifiers stored on disk.

pub mod lzw;
pub mod none;

use crate::error::{ArchiveError, Result};
use std::io::{Read, Write};

pub const CODEC_NONE: u8 = 0;
pub const CODEC_LZW: u8 = 1;

/// Which codec (and parameter) to use for a new entry. Corresponds 1:1 to
/// the on-disk `(codec_id, codec_param)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionStrategy {
    None,
    Lzw { param: u8 },
}

impl Default for CompressionStrategy {
    fn default() -> Self {
        CompressionStrategy::None
    }
}

impl CompressionStrategy {
    pub fn codec_id(&self) -> u8 {
        match self {
            CompressionStrategy::None => CODEC_NONE,
            CompressionStrategy::Lzw { .. } => CODEC_LZW,
        }
    }

    pub fn codec_param(&self) -> u8 {
        match self {
            CompressionStrategy::None => 0,
            CompressionStrategy::Lzw { param } => *param,
        }
    }

    /// Build a strategy from the on-disk `(codec_id, codec_param)` pair,
    /// rejecting anything unrecognized.
    pub fn from_codec(codec_id: u8, codec_param: u8) -> Result<Self> {
        match codec_id {
            CODEC_NONE => Ok(CompressionStrategy::None),
            CODEC_LZW => {
                lzw::width_for_param(codec_param)?;
                Ok(CompressionStrategy::Lzw { param: codec_param })
            }
            _ => Err(ArchiveError::UnknownCodec {
                codec_id,
                codec_param,
            }),
        }
    }

    /// Run this strategy's compressor over exactly `n` bytes of `input`,
    /// returning the compressed payload.
    pub fn compress(&self, input: &mut impl Read, n: u64) -> Result<Vec<u8>> {
        match self {
            CompressionStrategy::None => {
                let mut c = none::NoneCompressor::new(Vec::new());
                c.compress(input, n)?;
                c.finish()
            }
            CompressionStrategy::Lzw { param } => {
                let mut c = lzw::LzwCompressor::new(Vec::new(), *param)?;
                c.compress(input, n)?;
                c.finish()
            }
        }
    }

    /// Run this strategy's compressor over exactly `n` bytes of `input`,
    /// writing the compressed payload to `sink` and returning the number of
    /// bytes written. Used by the archive facade's temp-sink `addFile` path,
    /// where the candidate compressed size must be known before deciding
    /// whether to keep it or fall back to `NONE`.
    pub fn compress_to<W: Write>(&self, input: &mut impl Read, n: u64, sink: &mut W) -> Result<u64> {
        let mut counting = CountingWriter { inner: sink, count: 0 };
        match self {
            CompressionStrategy::None => {
                let mut c = none::NoneCompressor::new(&mut counting);
                c.compress(input, n)?;
                c.finish()?;
            }
            CompressionStrategy::Lzw { param } => {
                let mut c = lzw::LzwCompressor::new(&mut counting, *param)?;
                c.compress(input, n)?;
                c.finish()?;
            }
        }
        Ok(counting.count)
    }

    /// Decompress exactly `n` stored payload bytes from `input` into `sink`,
    /// dispatching on the stored `(codec_id, codec_param)`.
    pub fn decompress_from(
        codec_id: u8,
        codec_param: u8,
        input: &mut impl Read,
        n: u64,
        sink: &mut impl Write,
    ) -> Result<()> {
        match codec_id {
            CODEC_NONE => {
                let mut d = none::NoneDecompressor::new(Vec::new());
                d.decompress(input, n)?;
                sink.write_all(&d.finish()?)?;
                Ok(())
            }
            CODEC_LZW => {
                let mut d = lzw::LzwDecompressor::new(Vec::new(), codec_param)?;
                d.decompress(input, n)?;
                sink.write_all(&d.finish()?)?;
                Ok(())
            }
            _ => Err(ArchiveError::UnknownCodec {
                codec_id,
                codec_param,
            }),
        }
    }
}

/// Wraps a `Write` sink to count bytes passed through it, without requiring
/// the sink itself to support seeking or position queries.
struct CountingWriter<'a, W: Write> {
    inner: &'a mut W,
    count: u64,
}

impl<'a, W: Write> Write for CountingWriter<'a, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn compress_to_matches_compress() {
        let data = b"abababababababab".to_vec();
        let strategy = CompressionStrategy::Lzw { param: 0 };

        let mut input = Cursor::new(data.clone());
        let via_vec = strategy.compress(&mut input, data.len() as u64).unwrap();

        let mut input = Cursor::new(data.clone());
        let mut sink = Cursor::new(Vec::<u8>::new());
        let written = strategy
            .compress_to(&mut input, data.len() as u64, &mut sink)
            .unwrap();

        assert_eq!(written as usize, via_vec.len());
        assert_eq!(sink.into_inner(), via_vec);
    }

    #[test]
    fn from_codec_roundtrips_ids() {
        let none = CompressionStrategy::from_codec(CODEC_NONE, 0).unwrap();
        assert_eq!(none.codec_id(), CODEC_NONE);

        let lzw = CompressionStrategy::from_codec(CODEC_LZW, 3).unwrap();
        assert_eq!(lzw.codec_id(), CODEC_LZW);
        assert_eq!(lzw.codec_param(), 3);

        assert!(CompressionStrategy::from_codec(99, 0).is_err());
        assert!(CompressionStrategy::from_codec(CODEC_LZW, 200).is_err());
    }
}
