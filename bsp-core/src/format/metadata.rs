//! The Binsparse metadata descriptor
//!
//! A descriptor lives under the reserved top-level `binsparse` key of a JSON
//! document. Every other top-level key is caller-owned and is carried through
//! parse and serialize untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::constants::{fields, BINSPARSE_KEY, MIN_VERSION, VERSION};
use super::names::{FormatName, Structure};
use crate::types::{Kind, TypeLabel};
use crate::validation::parse_version;
use crate::{BspError, Result};

/// Wire shape of the descriptor; every field optional so that a missing one
/// can be reported by name instead of as a generic serde error
#[derive(Debug, Default, Serialize, Deserialize)]
struct Descriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shape: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    number_of_stored_values: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_types: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    structure: Option<String>,
}

/// Parsed, validated format descriptor plus the caller's extra keys
#[derive(Debug, Clone, PartialEq)]
pub struct FormatMetadata {
    pub version: String,
    pub format: FormatName,
    pub shape: Vec<u64>,
    pub number_of_stored_values: u64,
    pub data_types: BTreeMap<String, TypeLabel>,
    pub structure: Structure,
    pub user_keys: Map<String, Value>,
}

fn missing(field: &str) -> BspError {
    BspError::Parse(format!("metadata is missing required field `{field}`"))
}

impl FormatMetadata {
    /// Descriptor for the current version with no data types yet
    pub fn new(format: FormatName, shape: Vec<u64>, number_of_stored_values: u64) -> Self {
        Self {
            version: VERSION.to_string(),
            format,
            shape,
            number_of_stored_values,
            data_types: BTreeMap::new(),
            structure: Structure::General,
            user_keys: Map::new(),
        }
    }

    pub fn with_data_type(mut self, field: &str, label: TypeLabel) -> Self {
        self.data_types.insert(field.to_string(), label);
        self
    }

    pub fn with_structure(mut self, structure: Structure) -> Self {
        self.structure = structure;
        self
    }

    /// Attach caller-owned keys, rejecting the reserved one
    pub fn with_user_keys(mut self, user_keys: Map<String, Value>) -> Result<Self> {
        if user_keys.contains_key(BINSPARSE_KEY) {
            return Err(BspError::ReservedKey(BINSPARSE_KEY.to_string()));
        }
        self.user_keys = user_keys;
        Ok(self)
    }

    /// Type label recorded for `field`
    pub fn data_type(&self, field: &str) -> Result<TypeLabel> {
        self.data_types
            .get(field)
            .copied()
            .ok_or_else(|| missing(&format!("data_types.{field}")))
    }

    pub fn value_type(&self) -> Result<TypeLabel> {
        self.data_type(fields::VALUES)
    }

    pub fn is_iso(&self) -> bool {
        self.data_types
            .get(fields::VALUES)
            .is_some_and(|label| label.iso)
    }

    /// Row count (length for vectors)
    pub fn nrows(&self) -> u64 {
        self.shape.first().copied().unwrap_or(0)
    }

    /// Column count (1 for vectors)
    pub fn ncols(&self) -> u64 {
        self.shape.get(1).copied().unwrap_or(1)
    }

    /// Kinds of the stored fields in dispatch order (indices first, values last)
    pub fn dispatch_kinds(&self) -> Result<Vec<Kind>> {
        self.format
            .fields()
            .iter()
            .map(|field| self.data_type(field).map(|label| label.kind))
            .collect()
    }

    /// Labels of the stored fields in dispatch order
    pub fn dispatch_labels(&self) -> Result<Vec<String>> {
        self.format
            .fields()
            .iter()
            .map(|field| self.data_type(field).map(|label| label.to_string()))
            .collect()
    }

    /// Serialize to a JSON document, `pretty` selecting two-space indentation
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let document = self.to_value()?;
        let text = if pretty {
            serde_json::to_string_pretty(&document)
        } else {
            serde_json::to_string(&document)
        };
        text.map_err(|e| BspError::Parse(e.to_string()))
    }

    /// Build the JSON value: user keys alongside the reserved descriptor
    pub fn to_value(&self) -> Result<Value> {
        if self.user_keys.contains_key(BINSPARSE_KEY) {
            return Err(BspError::ReservedKey(BINSPARSE_KEY.to_string()));
        }
        let descriptor = Descriptor {
            version: Some(self.version.clone()),
            format: Some(self.format.as_str().to_string()),
            shape: Some(self.shape.clone()),
            number_of_stored_values: Some(self.number_of_stored_values),
            data_types: Some(
                self.data_types
                    .iter()
                    .map(|(field, label)| (field.clone(), label.to_string()))
                    .collect(),
            ),
            structure: self.structure.name().map(str::to_string),
        };
        let mut document = self.user_keys.clone();
        let descriptor =
            serde_json::to_value(descriptor).map_err(|e| BspError::Parse(e.to_string()))?;
        document.insert(BINSPARSE_KEY.to_string(), descriptor);
        Ok(Value::Object(document))
    }

    /// Parse and validate a JSON metadata document
    pub fn parse(text: &str) -> Result<Self> {
        let document: Value =
            serde_json::from_str(text).map_err(|e| BspError::Parse(e.to_string()))?;
        Self::from_value(document)
    }

    pub fn from_value(document: Value) -> Result<Self> {
        let Value::Object(mut user_keys) = document else {
            return Err(BspError::Parse("metadata document is not a JSON object".into()));
        };
        let raw = user_keys
            .remove(BINSPARSE_KEY)
            .ok_or_else(|| missing(BINSPARSE_KEY))?;
        let descriptor: Descriptor =
            serde_json::from_value(raw).map_err(|e| BspError::Parse(e.to_string()))?;

        let version = descriptor.version.ok_or_else(|| missing("version"))?;
        let parsed = parse_version(&version)?;
        if parsed < MIN_VERSION {
            return Err(BspError::Parse(format!(
                "version {version} is older than the minimum supported {}.{}",
                MIN_VERSION.0, MIN_VERSION.1
            )));
        }

        let format = FormatName::from_name(&descriptor.format.ok_or_else(|| missing("format"))?)?;

        let shape = descriptor.shape.ok_or_else(|| missing("shape"))?;
        if shape.len() != format.rank() {
            return Err(BspError::Parse(format!(
                "{format} expects a shape of rank {}, got {}",
                format.rank(),
                shape.len()
            )));
        }

        let number_of_stored_values = descriptor
            .number_of_stored_values
            .ok_or_else(|| missing("number_of_stored_values"))?;

        let raw_types = descriptor.data_types.ok_or_else(|| missing("data_types"))?;
        let mut data_types = BTreeMap::new();
        for (field, label) in &raw_types {
            data_types.insert(field.clone(), TypeLabel::parse(label)?);
        }
        for field in format.fields() {
            let Some(label) = data_types.get(*field) else {
                return Err(missing(&format!("data_types.{field}")));
            };
            if *field != fields::VALUES {
                if label.iso {
                    return Err(BspError::Parse(format!("index field `{field}` cannot be iso")));
                }
                if !label.kind.is_integer() {
                    return Err(BspError::UnsupportedType(format!(
                        "{} cannot be used for `{field}`",
                        label.kind
                    )));
                }
            }
        }

        let structure = match descriptor.structure {
            Some(name) => Structure::from_name(&name)?,
            None => Structure::General,
        };

        Ok(Self {
            version,
            format,
            shape,
            number_of_stored_values,
            data_types,
            structure,
            user_keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn csr_metadata() -> FormatMetadata {
        FormatMetadata::new(FormatName::Csr, vec![3, 4], 5)
            .with_data_type(fields::POINTERS_TO_1, TypeLabel::new(Kind::Uint64))
            .with_data_type(fields::INDICES_1, TypeLabel::new(Kind::Uint32))
            .with_data_type(fields::VALUES, TypeLabel::new(Kind::Float64))
    }

    #[test]
    fn test_serialize_layout() {
        let mut keys = Map::new();
        keys.insert("comment".into(), json!("from a test"));
        let meta = csr_metadata()
            .with_structure(Structure::Symmetric)
            .with_user_keys(keys)
            .unwrap();
        let value: Value = serde_json::from_str(&meta.to_json(true).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "binsparse": {
                    "version": "0.1",
                    "format": "CSR",
                    "shape": [3, 4],
                    "number_of_stored_values": 5,
                    "data_types": {
                        "pointers_to_1": "uint64",
                        "indices_1": "uint32",
                        "values": "float64"
                    },
                    "structure": "symmetric_lower"
                },
                "comment": "from a test"
            })
        );
    }

    #[test]
    fn test_general_structure_omitted() {
        let text = csr_metadata().to_json(false).unwrap();
        assert!(!text.contains("structure"));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn test_pretty_uses_two_spaces() {
        let text = csr_metadata().to_json(true).unwrap();
        assert!(text.contains("\n  \"binsparse\""));
    }

    #[test]
    fn test_parse_round_trip() {
        let mut keys = Map::new();
        keys.insert("nested".into(), json!({"a": [1, 2, {"b": null}]}));
        let meta = csr_metadata().with_user_keys(keys).unwrap();
        let parsed = FormatMetadata::parse(&meta.to_json(true).unwrap()).unwrap();
        assert_eq!(parsed, meta);
    }

    #[test]
    fn test_reserved_key_rejected() {
        let mut keys = Map::new();
        keys.insert(BINSPARSE_KEY.into(), json!(1));
        assert!(matches!(
            csr_metadata().with_user_keys(keys.clone()),
            Err(BspError::ReservedKey(_))
        ));

        let mut meta = csr_metadata();
        meta.user_keys = keys;
        assert!(matches!(meta.to_json(true), Err(BspError::ReservedKey(_))));
    }

    #[test]
    fn test_parse_missing_shape() {
        let text = r#"{"binsparse": {"version": "0.1", "format": "DVEC",
            "number_of_stored_values": 3, "data_types": {"values": "int32"}}}"#;
        let err = FormatMetadata::parse(text).unwrap_err();
        assert!(matches!(err, BspError::Parse(ref m) if m.contains("shape")));
    }

    #[test]
    fn test_parse_rejections() {
        assert!(matches!(FormatMetadata::parse("not json"), Err(BspError::Parse(_))));
        assert!(matches!(FormatMetadata::parse("[1]"), Err(BspError::Parse(_))));
        assert!(matches!(FormatMetadata::parse("{}"), Err(BspError::Parse(_))));

        let old = r#"{"binsparse": {"version": "0.0", "format": "DVEC", "shape": [1],
            "number_of_stored_values": 1, "data_types": {"values": "int32"}}}"#;
        assert!(matches!(FormatMetadata::parse(old), Err(BspError::Parse(_))));

        let no_version = r#"{"binsparse": {"format": "DVEC", "shape": [1],
            "number_of_stored_values": 1, "data_types": {"values": "int32"}}}"#;
        assert!(matches!(
            FormatMetadata::parse(no_version),
            Err(BspError::Parse(ref m)) if m.contains("version")
        ));

        let bad_format = r#"{"binsparse": {"version": "0.1", "format": "ELL", "shape": [1, 1],
            "number_of_stored_values": 1, "data_types": {"values": "int32"}}}"#;
        assert!(matches!(FormatMetadata::parse(bad_format), Err(BspError::Parse(_))));

        let missing_index = r#"{"binsparse": {"version": "0.1", "format": "COO", "shape": [2, 2],
            "number_of_stored_values": 1,
            "data_types": {"indices_0": "uint8", "values": "int32"}}}"#;
        assert!(matches!(
            FormatMetadata::parse(missing_index),
            Err(BspError::Parse(ref m)) if m.contains("indices_1")
        ));

        let float_index = r#"{"binsparse": {"version": "0.1", "format": "CSR", "shape": [2, 2],
            "number_of_stored_values": 1,
            "data_types": {"pointers_to_1": "float32", "indices_1": "uint8", "values": "int32"}}}"#;
        assert!(matches!(
            FormatMetadata::parse(float_index),
            Err(BspError::UnsupportedType(_))
        ));

        let bad_structure = r#"{"binsparse": {"version": "0.1", "format": "DVEC", "shape": [1],
            "number_of_stored_values": 1, "data_types": {"values": "int32"},
            "structure": "banded"}}"#;
        assert!(matches!(
            FormatMetadata::parse(bad_structure),
            Err(BspError::UnsupportedStructure(_))
        ));
    }

    #[test]
    fn test_parse_legacy_alias_and_iso() {
        let text = r#"{"binsparse": {"version": "0.1", "format": "DMAT", "shape": [2, 2],
            "number_of_stored_values": 4, "data_types": {"values": "iso[float32]"}}}"#;
        let meta = FormatMetadata::parse(text).unwrap();
        assert_eq!(meta.format, FormatName::DenseRowMajor);
        assert!(meta.is_iso());
        assert_eq!(meta.dispatch_labels().unwrap(), vec!["iso[float32]".to_string()]);
        assert_eq!(meta.dispatch_kinds().unwrap(), vec![Kind::Float32]);
    }

    #[test]
    fn test_parse_signed_index_types() {
        let text = r#"{"binsparse": {"version": "0.1", "format": "COO", "shape": [2, 2],
            "number_of_stored_values": 1,
            "data_types": {"indices_0": "int64", "indices_1": "int64", "values": "float64"}}}"#;
        let meta = FormatMetadata::parse(text).unwrap();
        assert_eq!(
            meta.dispatch_kinds().unwrap(),
            vec![Kind::Int64, Kind::Int64, Kind::Float64]
        );

        let bool_index = text.replace(r#""indices_1": "int64""#, r#""indices_1": "bint8""#);
        assert!(matches!(
            FormatMetadata::parse(&bool_index),
            Err(BspError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_parse_column_major_coo() {
        let text = r#"{"binsparse": {"version": "0.1", "format": "COOC", "shape": [3, 2],
            "number_of_stored_values": 2,
            "data_types": {"indices_0": "uint8", "indices_1": "uint8", "values": "int32"}}}"#;
        let meta = FormatMetadata::parse(text).unwrap();
        assert_eq!(meta.format, FormatName::CooColMajor);
        assert!(meta.to_json(false).unwrap().contains(r#""format":"COOC""#));
    }

    #[test]
    fn test_vector_dimensions() {
        let meta = FormatMetadata::new(FormatName::DenseVector, vec![7], 7);
        assert_eq!((meta.nrows(), meta.ncols()), (7, 1));
    }
}
