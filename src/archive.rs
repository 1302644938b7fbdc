//! The archive facade: the public surface that ties the entry manager, the
//! allocator, and the codecs together into `open`/`create`/`addFile`/
//! `readFile`/`deleteFile`/`verify`.

use crate::allocator;
use crate::codec::CompressionStrategy;
use crate::entry::{EntryHeader, EntryKind, EntryManager, ENTRY_HEADER_SIZE};
use crate::error::{ArchiveError, Result};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use tracing::{debug, warn};

const MAX_NAME_LEN: usize = 65534;

/// A snapshot of one entry's metadata, as returned by [`Archive::iterate`]
/// and [`Archive::find`]. Detached from the archive: mutating the archive
/// after taking a snapshot does not change it, and the snapshot cannot be
/// used to mutate the archive back (use the name with the owning `Archive`
/// for that).
#[derive(Debug, Clone)]
pub struct EntryInfo {
    pub name: String,
    pub kind: EntryKind,
    pub payload_size: u64,
    pub codec_id: u8,
    pub codec_param: u8,
}

impl EntryInfo {
    fn from_header(name: String, header: &EntryHeader) -> Self {
        Self {
            name,
            kind: header.entry_kind,
            payload_size: header.payload_size,
            codec_id: header.codec_id,
            codec_param: header.codec_param,
        }
    }
}

/// A single-file archive container: named entries threaded through a
/// linked list, each individually compressed and CRC-checked.
pub struct Archive<S: Read + Write + Seek> {
    mgr: EntryManager<S>,
    default_strategy: CompressionStrategy,
}

impl<S: Read + Write + Seek> Archive<S> {
    /// Initialize a brand-new, empty archive over `container`.
    pub fn create(container: S) -> Result<Self> {
        let mgr = EntryManager::create(container)?;
        Ok(Self {
            mgr,
            default_strategy: CompressionStrategy::default(),
        })
    }

    /// Open an existing archive, validating its magic and header version.
    pub fn open(container: S) -> Result<Self> {
        let mgr = EntryManager::open(container)?;
        debug!(first_entry_offset = mgr.first_entry_offset, "opened archive");
        Ok(Self {
            mgr,
            default_strategy: CompressionStrategy::default(),
        })
    }

    pub fn into_inner(self) -> S {
        self.mgr.into_inner()
    }

    /// Current size of the underlying container, in bytes.
    pub fn len(&mut self) -> Result<u64> {
        self.mgr.store().end_offset()
    }

    pub fn set_default_strategy(&mut self, strategy: CompressionStrategy) {
        self.default_strategy = strategy;
    }

    pub fn default_strategy(&self) -> CompressionStrategy {
        self.default_strategy
    }

    /// Every live entry, in on-disk list order, as of this call. Reflects
    /// the archive's state at the time of traversal; entries added or
    /// removed afterward are not retroactively visible.
    pub fn iterate(&mut self) -> Result<Vec<EntryInfo>> {
        let headers = self.mgr.iterate()?;
        let mut infos = Vec::with_capacity(headers.len());
        for header in &headers {
            let name = self.mgr.read_name(header)?;
            infos.push(EntryInfo::from_header(name, header));
        }
        Ok(infos)
    }

    /// Look up an entry by exact name.
    pub fn find(&mut self, name: &str) -> Result<Option<EntryInfo>> {
        for info in self.iterate()? {
            if info.name == name {
                return Ok(Some(info));
            }
        }
        Ok(None)
    }

    pub fn get_file_type(&mut self, name: &str) -> Result<EntryKind> {
        self.find(name)?
            .map(|info| info.kind)
            .ok_or_else(|| ArchiveError::NotFound(name.to_string()))
    }

    fn validate_new_name(&mut self, name: &str) -> Result<()> {
        if name.len() > MAX_NAME_LEN {
            return Err(ArchiveError::NameTooLong(name.len()));
        }
        if self.find(name)?.is_some() {
            return Err(ArchiveError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    fn stream_len(input: &mut (impl Read + Seek)) -> Result<u64> {
        let len = input.seek(SeekFrom::End(0))?;
        input.seek(SeekFrom::Start(0))?;
        Ok(len)
    }

    /// Shared tail of every "add an entry" operation: allocate space,
    /// compute the CRC, and link the new header onto the list.
    /// `payload_source` must be positioned at the start of its `payload_len`
    /// bytes and support seeking back to that position.
    fn write_new_entry(
        &mut self,
        name: &str,
        kind: EntryKind,
        codec_id: u8,
        codec_param: u8,
        payload_len: u64,
        payload_source: &mut (impl Read + Seek),
    ) -> Result<()> {
        let name_bytes = name.as_bytes();
        let entry_size = ENTRY_HEADER_SIZE + name_bytes.len() as u64 + payload_len;

        let occupied = self.mgr.occupied_ranges()?;
        let end = self.mgr.store().end_offset()?;
        let offset = allocator::place(entry_size, &occupied, end)?;

        let mut header = EntryHeader {
            cur_file_pos: offset,
            payload_size: payload_len,
            next_entry_offset: 0,
            checksum: 0,
            name_size: name_bytes.len() as u16,
            entry_kind: kind,
            codec_id,
            codec_param,
        };

        header.checksum =
            header.compute_checksum_streaming(name_bytes, payload_source, payload_len)?;
        payload_source.seek(SeekFrom::Start(0))?;

        self.mgr.write_entry_header(&header)?;
        self.mgr
            .store()
            .write_at(offset + ENTRY_HEADER_SIZE, name_bytes)?;
        self.mgr.store().write_stream_at(
            offset + ENTRY_HEADER_SIZE + name_bytes.len() as u64,
            payload_source,
            payload_len,
        )?;
        self.mgr.append_link(offset)?;

        debug!(name, offset, payload_len, codec_id, "wrote entry");
        Ok(())
    }

    /// Store `input` under `name`, compressed with `strategy`, using
    /// `temp_sink` as scratch space for the candidate compressed bytes. If
    /// compression does not shrink the payload, the original bytes are
    /// stored instead with codec `NONE`.
    ///
    /// `temp_sink` is the caller-provided, composable form: pass a
    /// `Cursor::new(Vec::new())` for an in-memory scratch buffer, or a real
    /// temporary file for large inputs. See [`Archive::add_file`] for a
    /// convenience that manages the temp file for you.
    pub fn add_file_with_sink<R: Read + Seek, T: Read + Write + Seek>(
        &mut self,
        name: &str,
        input: &mut R,
        strategy: CompressionStrategy,
        temp_sink: &mut T,
    ) -> Result<()> {
        self.validate_new_name(name)?;
        let input_size = Self::stream_len(input)?;

        let compressed_size = strategy.compress_to(input, input_size, temp_sink)?;
        input.seek(SeekFrom::Start(0))?;

        if compressed_size < input_size {
            temp_sink.seek(SeekFrom::Start(0))?;
            self.write_new_entry(
                name,
                EntryKind::File,
                strategy.codec_id(),
                strategy.codec_param(),
                compressed_size,
                temp_sink,
            )
        } else {
            if input_size > 0 {
                warn!(name, input_size, compressed_size, "compression did not shrink payload, storing raw");
            }
            self.write_new_entry(name, EntryKind::File, 0, 0, input_size, input)
        }
    }

    /// Convenience over [`Archive::add_file_with_sink`] that allocates its
    /// own scoped temporary file via `tempfile`, deleted automatically when
    /// this call returns (even on error).
    pub fn add_file<R: Read + Seek>(
        &mut self,
        name: &str,
        input: &mut R,
        strategy: CompressionStrategy,
    ) -> Result<()> {
        let mut temp = tempfile::tempfile()?;
        self.add_file_with_sink(name, input, strategy, &mut temp)
    }

    /// Like [`Archive::add_file`], using this archive's default strategy.
    pub fn add_file_default<R: Read + Seek>(&mut self, name: &str, input: &mut R) -> Result<()> {
        let strategy = self.default_strategy;
        self.add_file(name, input, strategy)
    }

    /// Store an empty folder marker under `name`.
    pub fn add_folder(&mut self, name: &str) -> Result<()> {
        self.validate_new_name(name)?;
        let mut empty = Cursor::new(Vec::<u8>::new());
        self.write_new_entry(name, EntryKind::Folder, 0, 0, 0, &mut empty)
    }

    /// Decompress the file entry named `name` into `output`.
    pub fn read_file(&mut self, name: &str, output: &mut impl Write) -> Result<()> {
        let (_, header) = self
            .locate(name)?
            .ok_or_else(|| ArchiveError::NotFound(name.to_string()))?;
        if header.entry_kind != EntryKind::File {
            return Err(ArchiveError::WrongKind(name.to_string()));
        }
        let payload_offset =
            header.cur_file_pos + ENTRY_HEADER_SIZE + header.name_size as u64;
        let payload = self
            .mgr
            .store()
            .read_at(payload_offset, header.payload_size)?;
        let mut cursor = Cursor::new(payload);
        CompressionStrategy::decompress_from(
            header.codec_id,
            header.codec_param,
            &mut cursor,
            header.payload_size,
            output,
        )
    }

    /// Remove the entry named `name`, opening a hole the allocator can
    /// later reuse.
    pub fn delete_file(&mut self, name: &str) -> Result<()> {
        let (prev_offset, _) = self
            .locate(name)?
            .ok_or_else(|| ArchiveError::NotFound(name.to_string()))?;
        self.mgr.unlink_after(prev_offset)?;
        debug!(name, "deleted entry");
        Ok(())
    }

    /// Find an entry by name along with the offset of its predecessor in
    /// the list (`BEFORE_BEGIN` if it's the head), for use by operations
    /// that need to splice the list.
    fn locate(&mut self, name: &str) -> Result<Option<(u64, EntryHeader)>> {
        for (prev, header) in self.mgr.iterate_with_prev()? {
            if self.mgr.read_name(&header)? == name {
                return Ok(Some((prev, header)));
            }
        }
        Ok(None)
    }

    fn entry_checksum_ok(&mut self, header: &EntryHeader, name: &str) -> Result<bool> {
        let name_bytes = name.as_bytes();
        let payload_offset = header.cur_file_pos + ENTRY_HEADER_SIZE + header.name_size as u64;
        let payload = self.mgr.store().read_at(payload_offset, header.payload_size)?;
        Ok(header.compute_checksum(name_bytes, &payload) == header.checksum)
    }

    /// Recompute a single entry's CRC against its stored payload. Does not
    /// check for overlap with other entries; see [`Archive::verify`] for
    /// the whole-archive check.
    pub fn verify_entry(&mut self, name: &str) -> Result<bool> {
        let (_, header) = self
            .locate(name)?
            .ok_or_else(|| ArchiveError::NotFound(name.to_string()))?;
        self.entry_checksum_ok(&header, name)
    }

    /// Recompute every entry's CRC and confirm no two entries' byte ranges
    /// overlap. Never raises for structural problems it detects; returns
    /// `Ok(false)` instead. Genuine I/O failures still propagate as `Err`.
    pub fn verify(&mut self) -> Result<bool> {
        let headers = self.mgr.iterate()?;

        let mut ranges: Vec<(u64, u64)> = headers.iter().map(EntryHeader::occupied_range).collect();
        ranges.sort_unstable();
        if allocator::check_no_overlaps(&ranges).is_err() {
            return Ok(false);
        }

        for header in &headers {
            let name = self.mgr.read_name(header)?;
            if !self.entry_checksum_ok(header, &name)? {
                warn!(name, "checksum mismatch");
                return Ok(false);
            }
        }
        Ok(true)
    }
}
