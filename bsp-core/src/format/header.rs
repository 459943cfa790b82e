//! Binary container layout records
//!
//! A container file is a fixed header, a run of 8-byte aligned payloads and
//! an entry index describing every group, dataset and attribute by its full
//! `/`-separated path. All integers are little-endian.
//!
//! ```text
//! [ContainerHeader 32B][payload][pad]...[payload][pad][EntryRecord]...[EntryRecord]
//! ```

use super::constants::container::{ENTRY_PREFIX_SIZE, HEADER_SIZE, MAGIC, VERSION};
use super::constants::ALIGNMENT_BOUNDARY;
use crate::types::Kind;
use crate::validation::{calculate_padding, read_u32_le, read_u64_le, validate_magic_bytes};
use crate::{BspError, Result};

/// Fixed header at the start of every container file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Magic bytes: "BSPF"
    pub magic: [u8; 4],
    /// Container layout version
    pub version: u8,
    /// Number of records in the entry index
    pub entry_count: u64,
    /// Offset of the entry index from file start
    pub index_offset: u64,
    /// Size of the entry index in bytes
    pub index_size: u64,
}

impl ContainerHeader {
    pub const SIZE: usize = HEADER_SIZE;

    pub const fn new() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            entry_count: 0,
            index_offset: 0,
            index_size: 0,
        }
    }

    /// Parse header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(BspError::Storage(format!(
                "container is {} bytes, smaller than its {} byte header",
                bytes.len(),
                Self::SIZE
            )));
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        validate_magic_bytes(&magic, &MAGIC)?;

        let version = bytes[4];
        if version > VERSION {
            return Err(BspError::Storage(format!(
                "container layout version {version} is newer than supported {VERSION}"
            )));
        }

        Ok(Self {
            magic,
            version,
            entry_count: read_u64_le(bytes, 8)?,
            index_offset: read_u64_le(bytes, 16)?,
            index_size: read_u64_le(bytes, 24)?,
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        // bytes 5..8 reserved
        bytes[8..16].copy_from_slice(&self.entry_count.to_le_bytes());
        bytes[16..24].copy_from_slice(&self.index_offset.to_le_bytes());
        bytes[24..32].copy_from_slice(&self.index_size.to_le_bytes());
        bytes
    }
}

impl Default for ContainerHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// What an index record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EntryType {
    Group = 0,
    Dataset = 1,
    Attribute = 2,
}

impl EntryType {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(EntryType::Group),
            1 => Some(EntryType::Dataset),
            2 => Some(EntryType::Attribute),
            _ => None,
        }
    }

    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

/// One record of the entry index
///
/// Layout: type u8, kind u8, 2 reserved bytes, path length u32, element
/// count u64, payload offset u64, payload size u64, then the UTF-8 path
/// padded to the alignment boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub entry_type: EntryType,
    /// Element kind; only meaningful for datasets
    pub kind: Option<Kind>,
    /// Full path from the root, e.g. `matrix/values`
    pub path: String,
    /// Element count for datasets, byte count for attributes
    pub len: u64,
    pub offset: u64,
    pub byte_size: u64,
}

impl EntryRecord {
    pub fn group(path: impl Into<String>) -> Self {
        Self {
            entry_type: EntryType::Group,
            kind: None,
            path: path.into(),
            len: 0,
            offset: 0,
            byte_size: 0,
        }
    }

    pub fn dataset(path: impl Into<String>, kind: Kind, len: u64, offset: u64) -> Self {
        Self {
            entry_type: EntryType::Dataset,
            kind: Some(kind),
            path: path.into(),
            len,
            offset,
            byte_size: len * kind.size_bytes() as u64,
        }
    }

    pub fn attribute(path: impl Into<String>, offset: u64, byte_size: u64) -> Self {
        Self {
            entry_type: EntryType::Attribute,
            kind: None,
            path: path.into(),
            len: byte_size,
            offset,
            byte_size,
        }
    }

    /// Encoded size including path padding
    pub fn encoded_len(&self) -> usize {
        let raw = ENTRY_PREFIX_SIZE + self.path.len();
        raw + calculate_padding(raw, ALIGNMENT_BOUNDARY)
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        let start = out.len();
        out.push(self.entry_type.to_u8());
        out.push(self.kind.map_or(u8::MAX, Kind::to_u8));
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&(self.path.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.len.to_le_bytes());
        out.extend_from_slice(&self.offset.to_le_bytes());
        out.extend_from_slice(&self.byte_size.to_le_bytes());
        out.extend_from_slice(self.path.as_bytes());
        out.resize(start + self.encoded_len(), 0);
    }

    /// Decode one record, returning it and the bytes consumed
    pub fn read_from(bytes: &[u8]) -> Result<(Self, usize)> {
        if bytes.len() < ENTRY_PREFIX_SIZE {
            return Err(BspError::Storage("truncated entry record".into()));
        }
        let entry_type = EntryType::from_u8(bytes[0])
            .ok_or_else(|| BspError::Storage(format!("unknown entry type {}", bytes[0])))?;
        let kind = match entry_type {
            EntryType::Dataset => Some(
                Kind::from_u8(bytes[1])
                    .ok_or_else(|| BspError::Storage(format!("unknown kind tag {}", bytes[1])))?,
            ),
            _ => None,
        };
        let path_len = read_u32_le(bytes, 4)? as usize;
        let len = read_u64_le(bytes, 8)?;
        let offset = read_u64_le(bytes, 16)?;
        let byte_size = read_u64_le(bytes, 24)?;

        let path_bytes = bytes
            .get(ENTRY_PREFIX_SIZE..ENTRY_PREFIX_SIZE + path_len)
            .ok_or_else(|| BspError::Storage("truncated entry path".into()))?;
        let path = core::str::from_utf8(path_bytes)
            .map_err(|e| BspError::Storage(format!("entry path is not UTF-8: {e}")))?
            .to_string();

        let record = Self {
            entry_type,
            kind,
            path,
            len,
            offset,
            byte_size,
        };
        let consumed = record.encoded_len();
        if consumed > bytes.len() {
            return Err(BspError::Storage("truncated entry padding".into()));
        }
        Ok((record, consumed))
    }
}
