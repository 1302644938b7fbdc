//! CRC32 fed incrementally over the scalar header fields, the entry name,
//! and the stored payload — the reflected CRC-32/ISO-HDLC construction
//! (polynomial `0xEDB88320`), same algorithm the teacher reaches for via
//! `crc32fast` in its own writer/reader paths.

use crc32fast::Hasher;
use std::io::Read;

/// Incremental CRC32 accumulator over the archive's custom field domain.
/// Wraps `crc32fast::Hasher`; the only thing specific to this format is
/// the *order* `feed*` is called in, not the algorithm itself.
pub struct Crc32 {
    inner: Hasher,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    pub fn new() -> Self {
        Self {
            inner: Hasher::new(),
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    /// Feed the raw little-endian byte representation of a fixed-width
    /// integer scalar.
    pub fn feed_u8(&mut self, v: u8) {
        self.feed(&v.to_le_bytes());
    }

    pub fn feed_u16(&mut self, v: u16) {
        self.feed(&v.to_le_bytes());
    }

    pub fn feed_u64(&mut self, v: u64) {
        self.feed(&v.to_le_bytes());
    }

    /// Feed exactly `n` bytes read from `source`, in 1024-byte chunks.
    pub fn feed_stream(&mut self, source: &mut impl Read, mut n: u64) -> std::io::Result<()> {
        const BUFFER_SIZE: usize = 1024;
        let mut buf = [0u8; BUFFER_SIZE];
        while n >= BUFFER_SIZE as u64 {
            source.read_exact(&mut buf)?;
            self.feed(&buf);
            n -= BUFFER_SIZE as u64;
        }
        let rest = &mut buf[..n as usize];
        source.read_exact(rest)?;
        self.feed(rest);
        Ok(())
    }

    pub fn finalize(self) -> u32 {
        self.inner.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        let mut crc = Crc32::new();
        crc.feed(b"123456789");
        assert_eq!(crc.finalize(), 0xCBF4_3926);
    }

    #[test]
    fn empty_input_is_zero() {
        let crc = Crc32::new();
        assert_eq!(crc.finalize(), 0);
    }

    #[test]
    fn feed_is_associative_across_calls() {
        let mut whole = Crc32::new();
        whole.feed(b"hello world");

        let mut split = Crc32::new();
        split.feed(b"hello ");
        split.feed(b"world");

        assert_eq!(whole.finalize(), split.finalize());
    }

    #[test]
    fn feed_stream_matches_feed() {
        let data = vec![7u8; 5000];
        let mut direct = Crc32::new();
        direct.feed(&data);

        let mut streamed = Crc32::new();
        let mut cursor = std::io::Cursor::new(&data);
        streamed.feed_stream(&mut cursor, data.len() as u64).unwrap();

        assert_eq!(direct.finalize(), streamed.finalize());
    }

    #[test]
    fn scalar_feed_matches_byte_feed() {
        let mut a = Crc32::new();
        a.feed_u64(0x0102_0304_0506_0708);

        let mut b = Crc32::new();
        b.feed(&0x0102_0304_0506_0708u64.to_le_bytes());

        assert_eq!(a.finalize(), b.finalize());
    }
}
