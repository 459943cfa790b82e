//! In-memory hierarchical container
//!
//! A [`Group`] holds named datasets, string attributes and sub-groups. It is
//! the unit the codec writes into and the tree [`BspFile`](super::BspFile)
//! persists.

use std::collections::BTreeMap;

use bsp_core::validation::{split_path, validate_name};
use bsp_core::{ArrayData, BspError, Kind, Result, StorageSink, StorageSource};
use tracing::trace;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    datasets: BTreeMap<String, ArrayData>,
    attributes: BTreeMap<String, String>,
    groups: BTreeMap<String, Group>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new group at `path`, creating missing intermediate groups
    ///
    /// Fails if the final component already exists.
    pub fn create_group(&mut self, path: &str) -> Result<&mut Group> {
        let parts = split_path(path)?;
        let Some((last, parents)) = parts.split_last() else {
            return Err(BspError::Storage("cannot create the root group".into()));
        };
        let mut current = self;
        for part in parents {
            current = current.child_or_insert(part)?;
        }
        if current.groups.contains_key(*last) || current.datasets.contains_key(*last) {
            return Err(BspError::Storage(format!("`{path}` already exists")));
        }
        trace!(path, "creating group");
        Ok(current.groups.entry(last.to_string()).or_default())
    }

    /// Open the group at `path`, creating it and its parents if missing
    pub fn require_group(&mut self, path: &str) -> Result<&mut Group> {
        let mut current = self;
        for part in split_path(path)? {
            current = current.child_or_insert(part)?;
        }
        Ok(current)
    }

    /// Open an existing group; `""` is this group
    pub fn open_group(&self, path: &str) -> Result<&Group> {
        let mut current = self;
        for part in split_path(path)? {
            current = current
                .groups
                .get(part)
                .ok_or_else(|| BspError::Storage(format!("no group `{path}`")))?;
        }
        Ok(current)
    }

    pub fn has_group(&self, path: &str) -> bool {
        self.open_group(path).is_ok()
    }

    /// Names of the direct sub-groups, sorted
    pub fn group_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    pub fn datasets(&self) -> impl Iterator<Item = (&str, &ArrayData)> {
        self.datasets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &Group)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn child_or_insert(&mut self, name: &str) -> Result<&mut Group> {
        if self.datasets.contains_key(name) {
            return Err(BspError::Storage(format!("`{name}` is a dataset, not a group")));
        }
        Ok(self.groups.entry(name.to_string()).or_default())
    }

    fn dataset(&self, name: &str) -> Result<&ArrayData> {
        self.datasets
            .get(name)
            .ok_or_else(|| BspError::Storage(format!("no dataset `{name}`")))
    }
}

impl StorageSource for Group {
    fn read_dataset(&self, name: &str) -> Result<ArrayData> {
        self.dataset(name).cloned()
    }

    fn dataset_kind(&self, name: &str) -> Result<Kind> {
        self.dataset(name).map(ArrayData::kind)
    }

    fn dataset_len(&self, name: &str) -> Result<usize> {
        self.dataset(name).map(ArrayData::len)
    }

    fn has_dataset(&self, name: &str) -> bool {
        self.datasets.contains_key(name)
    }

    fn attribute(&self, name: &str) -> Result<String> {
        self.attributes
            .get(name)
            .cloned()
            .ok_or_else(|| BspError::Storage(format!("no attribute `{name}`")))
    }

    fn dataset_names(&self) -> Vec<String> {
        self.datasets.keys().cloned().collect()
    }
}

impl StorageSink for Group {
    fn write_dataset(&mut self, name: &str, data: ArrayData) -> Result<()> {
        validate_name(name)?;
        if self.groups.contains_key(name) {
            return Err(BspError::Storage(format!("`{name}` is a group, not a dataset")));
        }
        trace!(name, kind = %data.kind(), len = data.len(), "writing dataset");
        self.datasets.insert(name.to_string(), data);
        Ok(())
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        validate_name(name)?;
        self.attributes.insert(name.to_string(), value.to_string());
        Ok(())
    }
}
