//! Error types for pacozip

use std::io;

/// Result type for pacozip operations
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Error types that can occur during archive operations
#[derive(Debug)]
pub enum ArchiveError {
    /// Container does not start with the `PacoZIPP` magic
    BadMagic,
    /// `header_version` field is not the one value (0) this crate understands
    UnknownVersion(u16),
    /// `codec_id` is unrecognized, or `codec_param` is out of range for it
    UnknownCodec { codec_id: u8, codec_param: u8 },
    /// CRC mismatch, overlapping entry ranges, truncated codec input, or
    /// nonzero residual bits at codec `finish()`
    Corrupted(String),
    /// An entry with this name already exists
    DuplicateName(String),
    /// `len(name) > 65534`
    NameTooLong(usize),
    /// No entry with this name exists
    NotFound(String),
    /// Operation expected a file but found a folder, or vice versa
    WrongKind(String),
    /// Underlying container read/write failure
    Io(io::Error),
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveError::BadMagic => write!(f, "not a pacozip archive: bad magic"),
            ArchiveError::UnknownVersion(v) => write!(f, "unsupported header version: {v}"),
            ArchiveError::UnknownCodec {
                codec_id,
                codec_param,
            } => write!(
                f,
                "unknown codec id={codec_id} param={codec_param}"
            ),
            ArchiveError::Corrupted(msg) => write!(f, "archive is corrupted: {msg}"),
            ArchiveError::DuplicateName(name) => write!(f, "entry already exists: {name}"),
            ArchiveError::NameTooLong(len) => {
                write!(f, "name too long: {len} bytes (max 65534)")
            }
            ArchiveError::NotFound(name) => write!(f, "entry not found: {name}"),
            ArchiveError::WrongKind(name) => write!(f, "wrong entry kind: {name}"),
            ArchiveError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for ArchiveError {}

impl From<io::Error> for ArchiveError {
    fn from(err: io::Error) -> Self {
        ArchiveError::Io(err)
    }
}
