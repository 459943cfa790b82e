//! Configuration for the codec and the Matrix Market reader

/// Options controlling how matrices are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Group path to write into; `None` writes at the container root
    pub group: Option<String>,
    /// Indent metadata JSON by two spaces instead of writing it compact
    pub pretty_metadata: bool,
    /// Sort unsorted COO input before writing instead of rejecting it
    pub canonicalize_coo: bool,
}

impl CodecConfig {
    /// Write into the named group of the container
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Choose between indented and compact metadata
    pub fn with_pretty_metadata(mut self, pretty: bool) -> Self {
        self.pretty_metadata = pretty;
        self
    }

    /// Choose whether unsorted COO input is sorted or rejected
    pub fn with_canonicalize_coo(mut self, canonicalize: bool) -> Self {
        self.canonicalize_coo = canonicalize;
        self
    }

    /// Group path, empty for the root
    pub fn group_path(&self) -> &str {
        self.group.as_deref().unwrap_or("")
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            group: None,
            pretty_metadata: true,
            canonicalize_coo: true,
        }
    }
}

/// Options for reading Matrix Market text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixMarketOptions {
    /// Indices in the file start at 1 (the format's convention)
    pub one_indexed: bool,
}

impl MatrixMarketOptions {
    /// Treat indices in the file as 0-based or 1-based
    pub fn with_one_indexed(mut self, one_indexed: bool) -> Self {
        self.one_indexed = one_indexed;
        self
    }
}

impl Default for MatrixMarketOptions {
    fn default() -> Self {
        Self { one_indexed: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::default();
        assert!(config.pretty_metadata);
        assert!(config.canonicalize_coo);
        assert_eq!(config.group_path(), "");
        assert!(MatrixMarketOptions::default().one_indexed);
    }

    #[test]
    fn test_builders() {
        let config = CodecConfig::default()
            .with_group("outer/inner")
            .with_pretty_metadata(false)
            .with_canonicalize_coo(false);
        assert_eq!(config.group_path(), "outer/inner");
        assert!(!config.pretty_metadata);
        assert!(!config.canonicalize_coo);
        assert!(!MatrixMarketOptions::default().with_one_indexed(false).one_indexed);
    }
}
