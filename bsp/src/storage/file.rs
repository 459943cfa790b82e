//! Single-file container persistence
//!
//! A [`Group`] tree is flattened into one file: a fixed header, every
//! dataset and attribute payload at an 8-byte aligned offset, then an index
//! of [`EntryRecord`]s keyed by full path. Reading maps the file and decodes
//! a dataset only when it is asked for.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use bsp_core::format::{ContainerHeader, EntryRecord, EntryType};
use bsp_core::validation::{align_to_boundary, split_path, validate_region};
use bsp_core::{ArrayData, BspError, Kind, Result, StorageSink, StorageSource};
use tracing::{debug, trace};

#[cfg(feature = "mmap")]
use memmap2::{Mmap, MmapOptions};
use tempfile::NamedTempFile;

use super::Group;

const ALIGNMENT: usize = 8;

enum Backing {
    #[cfg(feature = "mmap")]
    Mapped(Mmap),
    #[allow(dead_code)]
    Owned(Vec<u8>),
}

impl Backing {
    fn bytes(&self) -> &[u8] {
        match self {
            #[cfg(feature = "mmap")]
            Backing::Mapped(map) => &map[..],
            Backing::Owned(bytes) => bytes.as_slice(),
        }
    }
}

/// Read handle on a container file
pub struct BspFile {
    path: PathBuf,
    backing: Backing,
    header: ContainerHeader,
    entries: BTreeMap<String, EntryRecord>,
}

impl std::fmt::Debug for BspFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BspFile")
            .field("path", &self.path)
            .field("header", &self.header)
            .field("entries", &self.entries.len())
            .finish()
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Split a full path into its parent group path and final name
fn split_parent(path: &str) -> (&str, &str) {
    path.rsplit_once('/').unwrap_or(("", path))
}

impl BspFile {
    /// Open an existing container and read its entry index
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let size = file.metadata()?.len();
        if size < ContainerHeader::SIZE as u64 {
            return Err(BspError::Storage(format!(
                "{} is {size} bytes, too small to be a container",
                path.display()
            )));
        }

        #[cfg(feature = "mmap")]
        // SAFETY: the map is read-only and callers own the file for the
        // lifetime of the handle
        let backing = Backing::Mapped(unsafe { MmapOptions::new().map(&file)? });
        #[cfg(not(feature = "mmap"))]
        let backing = {
            drop(file);
            Backing::Owned(std::fs::read(&path)?)
        };

        let bytes = backing.bytes();
        let header = ContainerHeader::from_bytes(bytes)?;
        let index = validate_region(header.index_offset, header.index_size, bytes.len())?;
        let mut cursor = &bytes[index];
        let mut entries = BTreeMap::new();
        for _ in 0..header.entry_count {
            let (record, consumed) = EntryRecord::read_from(cursor)?;
            cursor = &cursor[consumed..];
            entries.insert(record.path.clone(), record);
        }

        debug!(path = %path.display(), entries = entries.len(), "opened container");
        Ok(Self {
            path,
            backing,
            header,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    /// Scoped view of the group at `path`; `""` is the root
    pub fn group(&self, path: &str) -> Result<GroupView<'_>> {
        let prefix = split_path(path)?.join("/");
        if !prefix.is_empty() {
            match self.entries.get(&prefix) {
                Some(record) if record.entry_type == EntryType::Group => {}
                _ => {
                    return Err(BspError::Storage(format!(
                        "no group `{prefix}` in {}",
                        self.path.display()
                    )))
                }
            }
        }
        Ok(GroupView { file: self, prefix })
    }

    pub fn root(&self) -> GroupView<'_> {
        GroupView {
            file: self,
            prefix: String::new(),
        }
    }

    /// Decode the whole container into memory
    pub fn load(&self) -> Result<Group> {
        let mut root = Group::new();
        for (path, record) in &self.entries {
            match record.entry_type {
                EntryType::Group => {
                    root.require_group(path)?;
                }
                EntryType::Dataset => {
                    let (parent, name) = split_parent(path);
                    let data = self.decode_dataset(record)?;
                    root.require_group(parent)?.write_dataset(name, data)?;
                }
                EntryType::Attribute => {
                    let (parent, name) = split_parent(path);
                    let value = self.decode_attribute(record)?;
                    root.require_group(parent)?.set_attribute(name, &value)?;
                }
            }
        }
        Ok(root)
    }

    /// Persist `root` to `path`, replacing any existing file
    ///
    /// The container is written to a temporary file in the target's
    /// directory and persisted over `path`, so a failed save leaves neither
    /// a partial target nor a stray temporary file behind.
    pub fn save<P: AsRef<Path>>(path: P, root: &Group) -> Result<()> {
        let path = path.as_ref();
        let buffer = encode(root)?;

        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(&buffer)?;
        tmp.as_file().sync_all()?;
        trace!(tmp = %tmp.path().display(), "wrote temporary container");
        tmp.persist(path).map_err(|e| e.error)?;

        debug!(path = %path.display(), bytes = buffer.len(), "saved container");
        Ok(())
    }

    /// Load an existing container for modification, or start an empty tree
    pub fn open_for_update<P: AsRef<Path>>(path: P) -> Result<Group> {
        let path = path.as_ref();
        if path.exists() {
            BspFile::open(path)?.load()
        } else {
            Ok(Group::new())
        }
    }

    /// Apply `f` to the container's tree and save it if `f` succeeds
    pub fn update<P, F, R>(path: P, f: F) -> Result<R>
    where
        P: AsRef<Path>,
        F: FnOnce(&mut Group) -> Result<R>,
    {
        let path = path.as_ref();
        let mut root = Self::open_for_update(path)?;
        let result = f(&mut root)?;
        Self::save(path, &root)?;
        Ok(result)
    }

    fn payload(&self, record: &EntryRecord) -> Result<&[u8]> {
        let bytes = self.backing.bytes();
        let range = validate_region(record.offset, record.byte_size, bytes.len())?;
        Ok(&bytes[range])
    }

    fn decode_dataset(&self, record: &EntryRecord) -> Result<ArrayData> {
        let kind = record
            .kind
            .ok_or_else(|| BspError::Storage(format!("dataset `{}` has no kind", record.path)))?;
        trace!(path = %record.path, %kind, len = record.len, "decoding dataset");
        let data = ArrayData::from_le_bytes(kind, self.payload(record)?)?;
        if data.len() as u64 != record.len {
            return Err(BspError::Storage(format!(
                "dataset `{}` holds {} elements but its index says {}",
                record.path,
                data.len(),
                record.len
            )));
        }
        Ok(data)
    }

    fn decode_attribute(&self, record: &EntryRecord) -> Result<String> {
        let bytes = self.payload(record)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| BspError::Storage(format!("attribute `{}` is not UTF-8: {e}", record.path)))
    }

    fn record(&self, path: &str, entry_type: EntryType) -> Result<&EntryRecord> {
        match self.entries.get(path) {
            Some(record) if record.entry_type == entry_type => Ok(record),
            _ => Err(BspError::Storage(format!(
                "no {} `{path}` in {}",
                match entry_type {
                    EntryType::Group => "group",
                    EntryType::Dataset => "dataset",
                    EntryType::Attribute => "attribute",
                },
                self.path.display()
            ))),
        }
    }
}

/// Lazily decoding view of one group inside a [`BspFile`]
#[derive(Debug)]
pub struct GroupView<'a> {
    file: &'a BspFile,
    prefix: String,
}

impl GroupView<'_> {
    /// Path of this group from the root, empty for the root itself
    pub fn path(&self) -> &str {
        &self.prefix
    }

    /// Names of the direct sub-groups, sorted
    pub fn group_names(&self) -> Vec<String> {
        self.children(EntryType::Group)
    }

    fn children(&self, entry_type: EntryType) -> Vec<String> {
        self.file
            .entries
            .values()
            .filter(|record| record.entry_type == entry_type)
            .filter_map(|record| {
                let (parent, name) = split_parent(&record.path);
                (parent == self.prefix).then(|| name.to_string())
            })
            .collect()
    }

    fn dataset(&self, name: &str) -> Result<&EntryRecord> {
        self.file.record(&join(&self.prefix, name), EntryType::Dataset)
    }
}

impl StorageSource for GroupView<'_> {
    fn read_dataset(&self, name: &str) -> Result<ArrayData> {
        self.file.decode_dataset(self.dataset(name)?)
    }

    fn dataset_kind(&self, name: &str) -> Result<Kind> {
        let record = self.dataset(name)?;
        record
            .kind
            .ok_or_else(|| BspError::Storage(format!("dataset `{}` has no kind", record.path)))
    }

    fn dataset_len(&self, name: &str) -> Result<usize> {
        let record = self.dataset(name)?;
        usize::try_from(record.len).map_err(|_| BspError::IndexOverflow {
            value: record.len,
            label: "usize",
        })
    }

    fn has_dataset(&self, name: &str) -> bool {
        self.dataset(name).is_ok()
    }

    fn attribute(&self, name: &str) -> Result<String> {
        let record = self
            .file
            .record(&join(&self.prefix, name), EntryType::Attribute)?;
        self.file.decode_attribute(record)
    }

    fn dataset_names(&self) -> Vec<String> {
        self.children(EntryType::Dataset)
    }
}

fn pad(buffer: &mut Vec<u8>) {
    buffer.resize(align_to_boundary(buffer.len(), ALIGNMENT), 0);
}

fn flatten(group: &Group, prefix: &str, buffer: &mut Vec<u8>, records: &mut Vec<EntryRecord>) {
    for (name, data) in group.datasets() {
        pad(buffer);
        let offset = buffer.len() as u64;
        data.write_le(buffer);
        records.push(EntryRecord::dataset(
            join(prefix, name),
            data.kind(),
            data.len() as u64,
            offset,
        ));
    }
    for (name, value) in group.attributes() {
        pad(buffer);
        let offset = buffer.len() as u64;
        buffer.extend_from_slice(value.as_bytes());
        records.push(EntryRecord::attribute(
            join(prefix, name),
            offset,
            value.len() as u64,
        ));
    }
    for (name, child) in group.groups() {
        let path = join(prefix, name);
        records.push(EntryRecord::group(path.clone()));
        flatten(child, &path, buffer, records);
    }
}

fn encode(root: &Group) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; ContainerHeader::SIZE];
    let mut records = Vec::new();
    flatten(root, "", &mut buffer, &mut records);

    pad(&mut buffer);
    let index_offset = buffer.len();
    for record in &records {
        record.write_to(&mut buffer);
    }

    let header = ContainerHeader {
        entry_count: records.len() as u64,
        index_offset: index_offset as u64,
        index_size: (buffer.len() - index_offset) as u64,
        ..ContainerHeader::new()
    };
    buffer[..ContainerHeader::SIZE].copy_from_slice(&header.to_bytes());
    trace!(entries = records.len(), bytes = buffer.len(), "encoded container");
    Ok(buffer)
}
