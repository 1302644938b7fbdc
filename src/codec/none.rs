//! Identity codec: byte-copy passthrough, used whenever compression would
//! not shrink the payload.

use crate::error::Result;
use std::io::{Read, Write};

const BUFFER_SIZE: usize = 1024;

fn copy_n(input: &mut impl Read, mut n: u64, sink: &mut impl Write) -> Result<()> {
    let mut buf = [0u8; BUFFER_SIZE];
    while n >= BUFFER_SIZE as u64 {
        input.read_exact(&mut buf)?;
        sink.write_all(&buf)?;
        n -= BUFFER_SIZE as u64;
    }
    let rest = &mut buf[..n as usize];
    input.read_exact(rest)?;
    sink.write_all(rest)?;
    Ok(())
}

/// NONE compressor: copies bytes straight through.
pub struct NoneCompressor<W: Write> {
    sink: W,
}

impl<W: Write> NoneCompressor<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn compress(&mut self, input: &mut impl Read, n: u64) -> Result<()> {
        copy_n(input, n, &mut self.sink)
    }

    /// Flush is a no-op for NONE; returns the wrapped sink.
    pub fn finish(self) -> Result<W> {
        Ok(self.sink)
    }
}

/// NONE decompressor: copies bytes straight through.
pub struct NoneDecompressor<W: Write> {
    sink: W,
}

impl<W: Write> NoneDecompressor<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn decompress(&mut self, input: &mut impl Read, n: u64) -> Result<()> {
        copy_n(input, n, &mut self.sink)
    }

    pub fn finish(self) -> Result<W> {
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn roundtrip_byte_identical() {
        let data = b"The quick brown fox jumps over the lazy dog".to_vec();

        let mut input = Cursor::new(data.clone());
        let mut compressor = NoneCompressor::new(Vec::new());
        compressor.compress(&mut input, data.len() as u64).unwrap();
        let compressed = compressor.finish().unwrap();
        assert_eq!(compressed, data);

        let mut input = Cursor::new(compressed.clone());
        let mut decompressor = NoneDecompressor::new(Vec::new());
        decompressor
            .decompress(&mut input, compressed.len() as u64)
            .unwrap();
        let output = decompressor.finish().unwrap();
        assert_eq!(output, data);
    }

    #[test]
    fn handles_buffers_larger_than_chunk_size() {
        let data: Vec<u8> = (0..10_000).map(|i| (i % 251) as u8).collect();
        let mut input = Cursor::new(data.clone());
        let mut compressor = NoneCompressor::new(Vec::new());
        compressor.compress(&mut input, data.len() as u64).unwrap();
        assert_eq!(compressor.finish().unwrap(), data);
    }

    #[test]
    fn empty_input() {
        let mut input = Cursor::new(Vec::<u8>::new());
        let mut compressor = NoneCompressor::new(Vec::new());
        compressor.compress(&mut input, 0).unwrap();
        assert!(compressor.finish().unwrap().is_empty());
    }
}
