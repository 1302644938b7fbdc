//! # pacozip: a mutable, single-file archive container
//!
//! `pacozip` packs named files and folders into one container, each entry
//! individually compressed (`NONE` or a fixed-width `LZW`) and guarded by a
//! CRC32. Entries can be added, read, and deleted incrementally without
//! rewriting the whole container: deletions open holes that a smallest-fit
//! allocator reuses for later entries.
//!
//! ## Quick start
//!
//! ```no_run
//! use pacozip::{Archive, CompressionStrategy};
//! use std::io::Cursor;
//!
//! let mut archive = Archive::create(Cursor::new(Vec::new()))?;
//!
//! let mut input = Cursor::new(b"hello, archive".to_vec());
//! archive.add_file("greeting.txt", &mut input, CompressionStrategy::Lzw { param: 0 })?;
//!
//! let mut out = Vec::new();
//! archive.read_file("greeting.txt", &mut out)?;
//! assert_eq!(out, b"hello, archive");
//!
//! archive.verify()?;
//! # Ok::<(), pacozip::ArchiveError>(())
//! ```

pub mod allocator;
pub mod archive;
pub mod codec;
pub mod crc32;
pub mod entry;
pub mod error;
pub mod store;

pub use archive::{Archive, EntryInfo};
pub use codec::CompressionStrategy;
pub use entry::EntryKind;
pub use error::{ArchiveError, Result};
