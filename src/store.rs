//! Random-access byte container over any seekable stream. Every call saves
//! and restores the underlying stream position, so nested callers never
//! observe a moved cursor (§5 position discipline).

use crate::error::Result;
use std::io::{Read, Seek, SeekFrom, Write};

pub struct ArchiveStore<S> {
    inner: S,
}

impl<S: Read + Write + Seek> ArchiveStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Read exactly `n` bytes starting at absolute `offset`.
    pub fn read_at(&mut self, offset: u64, n: u64) -> Result<Vec<u8>> {
        let saved = self.inner.stream_position()?;
        self.inner.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; n as usize];
        self.inner.read_exact(&mut buf)?;
        self.inner.seek(SeekFrom::Start(saved))?;
        Ok(buf)
    }

    /// Write `bytes` starting at absolute `offset`.
    pub fn write_at(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        let saved = self.inner.stream_position()?;
        self.inner.seek(SeekFrom::Start(offset))?;
        self.inner.write_all(bytes)?;
        self.inner.seek(SeekFrom::Start(saved))?;
        Ok(())
    }

    /// Copy exactly `n` bytes from `source` into the store starting at
    /// absolute `offset`, without materializing them in memory first.
    pub fn write_stream_at(
        &mut self,
        offset: u64,
        source: &mut impl Read,
        mut n: u64,
    ) -> Result<()> {
        let saved = self.inner.stream_position()?;
        self.inner.seek(SeekFrom::Start(offset))?;
        const BUFFER_SIZE: usize = 1024;
        let mut buf = [0u8; BUFFER_SIZE];
        while n >= BUFFER_SIZE as u64 {
            source.read_exact(&mut buf)?;
            self.inner.write_all(&buf)?;
            n -= BUFFER_SIZE as u64;
        }
        let rest = &mut buf[..n as usize];
        source.read_exact(rest)?;
        self.inner.write_all(rest)?;
        self.inner.seek(SeekFrom::Start(saved))?;
        Ok(())
    }

    /// Absolute offset one past the last byte of the container.
    pub fn end_offset(&mut self) -> Result<u64> {
        let saved = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(saved))?;
        Ok(end)
    }
}
