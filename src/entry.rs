//! Entry headers and the linked-list bookkeeping that threads them
//! through the archive.

use crate::crc32::Crc32;
use crate::error::{ArchiveError, Result};
use crate::store::ArchiveStore;
use std::io::{Read, Seek, Write};

pub const ENTRY_HEADER_SIZE: u64 = 29;

/// The pseudo-offset of `first_entry_offset` within the archive prefix.
/// Used as the "before-begin" sentinel so `unlink_after` can treat the
/// archive header slot uniformly as "the previous entry's next pointer".
pub const BEFORE_BEGIN: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
}

impl EntryKind {
    fn to_byte(self) -> u8 {
        match self {
            EntryKind::File => 0,
            EntryKind::Folder => 1,
        }
    }

    fn from_byte(b: u8) -> Result<Self> {
        match b {
            0 => Ok(EntryKind::File),
            1 => Ok(EntryKind::Folder),
            _ => Err(ArchiveError::Corrupted(format!(
                "invalid entry_kind byte {b}"
            ))),
        }
    }
}

/// In-memory view of one 29-byte on-disk entry header.
#[derive(Debug, Clone)]
pub struct EntryHeader {
    pub cur_file_pos: u64,
    pub payload_size: u64,
    pub next_entry_offset: u64,
    pub checksum: u32,
    pub name_size: u16,
    pub entry_kind: EntryKind,
    pub codec_id: u8,
    pub codec_param: u8,
}

impl EntryHeader {
    pub fn occupied_end(&self) -> u64 {
        self.cur_file_pos + ENTRY_HEADER_SIZE + self.name_size as u64 + self.payload_size
    }

    pub fn occupied_range(&self) -> (u64, u64) {
        (self.cur_file_pos, self.occupied_end())
    }

    fn encode(&self) -> [u8; ENTRY_HEADER_SIZE as usize] {
        let mut buf = [0u8; ENTRY_HEADER_SIZE as usize];
        buf[0..8].copy_from_slice(&self.payload_size.to_le_bytes());
        buf[8..16].copy_from_slice(&self.next_entry_offset.to_le_bytes());
        buf[16..20].copy_from_slice(&self.checksum.to_le_bytes());
        buf[20..22].copy_from_slice(&self.name_size.to_le_bytes());
        buf[22] = self.entry_kind.to_byte();
        buf[23] = self.codec_id;
        buf[24] = self.codec_param;
        // buf[25..29] is the reserved padding, always 0.
        buf
    }

    fn decode(cur_file_pos: u64, buf: &[u8; ENTRY_HEADER_SIZE as usize]) -> Result<Self> {
        let payload_size = u64::from_le_bytes(buf[0..8].try_into().unwrap());
        let next_entry_offset = u64::from_le_bytes(buf[8..16].try_into().unwrap());
        let checksum = u32::from_le_bytes(buf[16..20].try_into().unwrap());
        let name_size = u16::from_le_bytes(buf[20..22].try_into().unwrap());
        let entry_kind = EntryKind::from_byte(buf[22])?;
        let codec_id = buf[23];
        let codec_param = buf[24];

        Ok(Self {
            cur_file_pos,
            payload_size,
            next_entry_offset,
            checksum,
            name_size,
            entry_kind,
            codec_id,
            codec_param,
        })
    }

    /// CRC32 over the canonical field order: scalar header fields, then
    /// the name bytes, then the stored payload bytes. Excludes
    /// `next_entry_offset` and `checksum` (position-dependent /
    /// self-referential), and the reserved padding.
    pub fn compute_checksum(&self, name: &[u8], payload: &[u8]) -> u32 {
        let mut crc = Crc32::new();
        crc.feed_u64(self.payload_size);
        crc.feed_u16(self.name_size);
        crc.feed_u8(self.entry_kind.to_byte());
        crc.feed_u8(self.codec_id);
        crc.feed_u8(self.codec_param);
        crc.feed(name);
        crc.feed(payload);
        crc.finalize()
    }

    /// Same CRC domain as [`EntryHeader::compute_checksum`], but reads the
    /// payload from a stream instead of requiring it already in memory.
    pub fn compute_checksum_streaming(
        &self,
        name: &[u8],
        payload_source: &mut impl Read,
        payload_len: u64,
    ) -> Result<u32> {
        let mut crc = Crc32::new();
        crc.feed_u64(self.payload_size);
        crc.feed_u16(self.name_size);
        crc.feed_u8(self.entry_kind.to_byte());
        crc.feed_u8(self.codec_id);
        crc.feed_u8(self.codec_param);
        crc.feed(name);
        crc.feed_stream(payload_source, payload_len)?;
        Ok(crc.finalize())
    }
}

/// Owns the archive header and the linked list of entry headers.
pub struct EntryManager<S: Read + Write + Seek> {
    store: ArchiveStore<S>,
    pub header_version: u16,
    pub first_entry_offset: u64,
    last_entry_offset: Option<u64>,
}

const MAGIC: &[u8; 8] = b"PacoZIPP";
const PREFIX_SIZE: u64 = 20;

impl<S: Read + Write + Seek> EntryManager<S> {
    /// Write a fresh 20-byte prefix (`first_entry_offset = 0`) to an empty
    /// container.
    pub fn create(inner: S) -> Result<Self> {
        let mut store = ArchiveStore::new(inner);
        let mut prefix = [0u8; PREFIX_SIZE as usize];
        prefix[0..8].copy_from_slice(MAGIC);
        // header_version = 0, _reserved = 0, first_entry_offset = 0: all zero.
        store.write_at(0, &prefix)?;
        Ok(Self {
            store,
            header_version: 0,
            first_entry_offset: 0,
            last_entry_offset: None,
        })
    }

    /// Validate magic and version, then load the header.
    pub fn open(inner: S) -> Result<Self> {
        let mut store = ArchiveStore::new(inner);
        let prefix = store.read_at(0, PREFIX_SIZE)?;
        if &prefix[0..8] != MAGIC {
            return Err(ArchiveError::BadMagic);
        }
        let header_version = u16::from_le_bytes(prefix[8..10].try_into().unwrap());
        if header_version != 0 {
            return Err(ArchiveError::UnknownVersion(header_version));
        }
        let first_entry_offset = u64::from_le_bytes(prefix[12..20].try_into().unwrap());
        Ok(Self {
            store,
            header_version,
            first_entry_offset,
            last_entry_offset: None,
        })
    }

    pub fn store(&mut self) -> &mut ArchiveStore<S> {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store.into_inner()
    }

    fn write_archive_header(&mut self) -> Result<()> {
        let mut buf = [0u8; PREFIX_SIZE as usize];
        buf[0..8].copy_from_slice(MAGIC);
        buf[8..10].copy_from_slice(&self.header_version.to_le_bytes());
        buf[12..20].copy_from_slice(&self.first_entry_offset.to_le_bytes());
        self.store.write_at(0, &buf)
    }

    pub fn read_entry_header(&mut self, offset: u64) -> Result<EntryHeader> {
        let buf = self.store.read_at(offset, ENTRY_HEADER_SIZE)?;
        let arr: [u8; ENTRY_HEADER_SIZE as usize] = buf.try_into().unwrap();
        EntryHeader::decode(offset, &arr)
    }

    pub fn write_entry_header(&mut self, header: &EntryHeader) -> Result<()> {
        self.store.write_at(header.cur_file_pos, &header.encode())
    }

    pub fn read_name(&mut self, header: &EntryHeader) -> Result<String> {
        let bytes = self
            .store
            .read_at(header.cur_file_pos + ENTRY_HEADER_SIZE, header.name_size as u64)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn last_entry_pos(&mut self) -> Result<Option<u64>> {
        if self.first_entry_offset == 0 {
            return Ok(None);
        }
        if let Some(pos) = self.last_entry_offset {
            return Ok(Some(pos));
        }
        let mut pos = self.first_entry_offset;
        loop {
            let header = self.read_entry_header(pos)?;
            if header.next_entry_offset == 0 {
                break;
            }
            pos = header.next_entry_offset;
        }
        self.last_entry_offset = Some(pos);
        Ok(Some(pos))
    }

    /// Link a freshly-written entry at `new_offset` onto the tail of the
    /// list (or make it the head, if the archive was empty).
    pub fn append_link(&mut self, new_offset: u64) -> Result<()> {
        match self.last_entry_pos()? {
            None => {
                self.first_entry_offset = new_offset;
                self.write_archive_header()?;
            }
            Some(tail_pos) => {
                let mut tail = self.read_entry_header(tail_pos)?;
                tail.next_entry_offset = new_offset;
                self.write_entry_header(&tail)?;
            }
        }
        self.last_entry_offset = Some(new_offset);
        Ok(())
    }

    /// Splice out the entry following `prev_offset` (which may be
    /// `BEFORE_BEGIN` to remove the head of the list).
    pub fn unlink_after(&mut self, prev_offset: u64) -> Result<()> {
        if prev_offset == BEFORE_BEGIN {
            let cur = self.read_entry_header(self.first_entry_offset)?;
            self.first_entry_offset = cur.next_entry_offset;
            self.write_archive_header()?;
            if self.first_entry_offset == 0 {
                self.last_entry_offset = None;
            }
            return Ok(());
        }

        let mut prev = self.read_entry_header(prev_offset)?;
        let cur = self.read_entry_header(prev.next_entry_offset)?;
        prev.next_entry_offset = cur.next_entry_offset;
        self.write_entry_header(&prev)?;

        if self.last_entry_offset == Some(cur.cur_file_pos) || cur.next_entry_offset == 0 {
            self.last_entry_offset = Some(prev_offset);
        }
        Ok(())
    }

    /// All entries, in list order, as `(prev_offset, header)` pairs where
    /// `prev_offset` is `BEFORE_BEGIN` for the first entry. Lets callers
    /// find-then-unlink without a second traversal.
    pub fn iterate_with_prev(&mut self) -> Result<Vec<(u64, EntryHeader)>> {
        let mut result = Vec::new();
        let mut prev = BEFORE_BEGIN;
        let mut pos = self.first_entry_offset;
        while pos != 0 {
            let header = self.read_entry_header(pos)?;
            let next = header.next_entry_offset;
            result.push((prev, header));
            prev = pos;
            pos = next;
        }
        Ok(result)
    }

    pub fn iterate(&mut self) -> Result<Vec<EntryHeader>> {
        Ok(self
            .iterate_with_prev()?
            .into_iter()
            .map(|(_, h)| h)
            .collect())
    }

    pub fn occupied_ranges(&mut self) -> Result<Vec<(u64, u64)>> {
        Ok(self
            .iterate()?
            .iter()
            .map(EntryHeader::occupied_range)
            .collect())
    }
}
