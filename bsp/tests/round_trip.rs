//! Write-then-read through the file container for every representation

use bsp::{
    dispatch_kinds, inspect, inspect_path, read_from_path, read_matrix, summarize, write_matrix,
    write_to_path, BspError, BspFile, CodecConfig, CooMatrix, CscMatrix, CsrMatrix, DenseMatrix,
    DenseVector, Element, FormatMetadata, FormatName, Group, Index, Kind, KindVisitor, Matrix,
    Order, StorageSink, StorageSource, StoredMatrix, Structure, TypeLabel,
};
use proptest::prelude::*;
use serde_json::{json, Map};
use tempfile::tempdir;

fn round_trip<M>(matrix: &M) -> M
where
    M: StoredMatrix,
{
    let dir = tempdir().unwrap();
    let path = dir.path().join("matrix.bsp");
    write_to_path(&path, matrix, Map::new(), &CodecConfig::default()).unwrap();
    read_from_path(&path, None).unwrap()
}

fn coo_sample<T: Element, I: Index>(values: [T; 3]) -> CooMatrix<T, I> {
    let idx = |v: usize| I::from_usize(v).unwrap();
    CooMatrix::new(
        4,
        5,
        vec![idx(0), idx(1), idx(3)],
        vec![idx(4), idx(0), idx(2)],
        values.to_vec(),
    )
    .unwrap()
}

#[test]
fn test_coo_round_trip_across_kinds() {
    fn check<T: Element, I: Index>(values: [T; 3]) {
        let matrix = coo_sample::<T, I>(values);
        assert_eq!(round_trip(&matrix), matrix);
    }

    check::<f32, u8>([1.5, -2.0, 3.25]);
    check::<f64, u16>([1e300, 0.0, -1e-300]);
    check::<i8, u32>([-128, 0, 127]);
    check::<i16, u64>([-1, 2, -3]);
    check::<i32, u8>([i32::MIN, 0, i32::MAX]);
    check::<i64, u16>([i64::MIN, 1, i64::MAX]);
    check::<u8, u32>([0, 1, 255]);
    check::<u16, u64>([1, 2, u16::MAX]);
    check::<u32, u8>([7, 8, 9]);
    check::<u64, u16>([u64::MAX, 0, 1]);
    check::<bool, u32>([true, false, true]);
}

#[test]
fn test_compressed_round_trip() {
    // [[0, 1, 2], [0, 0, 0], [3, 0, 0]]
    let csr = CsrMatrix::new(3, 3, vec![0u32, 2, 2, 3], vec![1u32, 2, 0], vec![1i64, 2, 3]).unwrap();
    assert_eq!(round_trip(&csr), csr);

    let csc = CscMatrix::new(3, 3, vec![0u16, 1, 2, 3], vec![2u16, 0, 0], vec![3.0f64, 1.0, 2.0])
        .unwrap();
    let back = round_trip(&csc);
    assert_eq!(back, csc);
    assert_eq!(back.get(0, 2), Some(2.0));

    let empty = CsrMatrix::<f32, u8>::new(2, 2, vec![0, 0, 0], vec![], vec![]).unwrap();
    assert_eq!(round_trip(&empty), empty);
}

#[test]
fn test_dense_round_trip() {
    let row = DenseMatrix::new(2, 3, Order::RowMajor, vec![1u16, 2, 3, 4, 5, 6]).unwrap();
    let back = round_trip(&row);
    assert_eq!(back, row);
    assert_eq!(back.format(), FormatName::DenseRowMajor);

    let col = DenseMatrix::new(2, 3, Order::ColumnMajor, vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0])
        .unwrap();
    let back = round_trip(&col);
    assert_eq!(back.order(), Order::ColumnMajor);
    assert_eq!(back.get(1, 0), Some(2.0));

    let vector = DenseVector::new(vec![-1i32, 0, 1]);
    assert_eq!(round_trip(&vector), vector);
}

#[test]
fn test_iso_dense_matrix() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("iso.bsp");
    let matrix = DenseMatrix::new_iso(2, 2, Order::RowMajor, 1.0f32).unwrap();
    write_to_path(&path, &matrix, Map::new(), &CodecConfig::default()).unwrap();

    let metadata = inspect_path(&path, None).unwrap();
    assert_eq!(metadata.data_type("values").unwrap().to_string(), "iso[float32]");
    assert_eq!(metadata.number_of_stored_values, 4);

    let file = BspFile::open(&path).unwrap();
    assert_eq!(file.root().dataset_len("values").unwrap(), 1);

    let back: DenseMatrix<f32> = read_from_path(&path, None).unwrap();
    assert!(back.is_iso());
    assert_eq!(back.logical_values(), vec![1.0; 4]);
}

#[test]
fn test_iso_sparse_and_structure() {
    let coo = CooMatrix::new_iso(3, 3, vec![0u8, 2], vec![0u8, 1], true)
        .unwrap()
        .with_structure(Structure::Symmetric)
        .unwrap();
    let back = round_trip(&coo);
    assert_eq!(back, coo);
    assert_eq!(back.structure(), Structure::Symmetric);
    assert!(back.is_iso());

    let csr = CsrMatrix::new_iso(2, 2, vec![0u32, 1, 1], vec![1u32], -4i8)
        .unwrap()
        .with_structure(Structure::SkewSymmetric)
        .unwrap();
    assert_eq!(round_trip(&csr), csr);
}

#[test]
fn test_user_keys_preserved() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("keys.bsp");
    let mut keys = Map::new();
    keys.insert("comment".into(), json!("% from a test\n"));
    keys.insert("nested".into(), json!({"a": [1, 2, {"b": null}]}));
    write_to_path(&path, &coo_sample::<f32, u32>([1.0, 2.0, 3.0]), keys.clone(), &CodecConfig::default())
        .unwrap();

    let metadata = inspect_path(&path, None).unwrap();
    assert_eq!(metadata.user_keys, keys);
}

#[test]
fn test_index_widening_on_read() {
    let matrix = coo_sample::<i32, u8>([1, 2, 3]);
    let dir = tempdir().unwrap();
    let path = dir.path().join("narrow.bsp");
    write_to_path(&path, &matrix, Map::new(), &CodecConfig::default()).unwrap();

    let wide: CooMatrix<i32, u64> = read_from_path(&path, None).unwrap();
    assert_eq!(wide.rows(), &[0, 1, 3]);
    assert_eq!(wide.get(3, 2), Some(3));

    let err = read_from_path::<CooMatrix<i64, u64>, _>(&path, None).unwrap_err();
    assert!(matches!(err, BspError::TypeMismatch { ref field, .. } if field == "values"));
}

#[test]
fn test_signed_index_round_trip() {
    let matrix = coo_sample::<f64, i64>([1.0, -2.0, 3.0]);
    let dir = tempdir().unwrap();
    let path = dir.path().join("signed.bsp");
    write_to_path(&path, &matrix, Map::new(), &CodecConfig::default()).unwrap();

    let metadata = inspect_path(&path, None).unwrap();
    assert_eq!(metadata.data_type("indices_0").unwrap().to_string(), "int64");
    assert_eq!(metadata.data_type("indices_1").unwrap().to_string(), "int64");
    assert_eq!(read_from_path::<CooMatrix<f64, i64>, _>(&path, None).unwrap(), matrix);

    // non-negative int64 positions widen into uint64
    let unsigned: CooMatrix<f64, u64> = read_from_path(&path, None).unwrap();
    assert_eq!(unsigned.rows(), &[0, 1, 3]);
    assert_eq!(unsigned.get(1, 0), Some(-2.0));

    let csr = CsrMatrix::new(2, 3, vec![0i32, 1, 2], vec![2i32, 0], vec![5u8, 6]).unwrap();
    assert_eq!(round_trip(&csr), csr);
}

#[test]
fn test_negative_stored_index_rejected() {
    let mut group = Group::new();
    group.write_array("indices_0", vec![0i32, -1]).unwrap();
    group.write_array("indices_1", vec![0i32, 1]).unwrap();
    group.write_array("values", vec![1.0f32, 2.0]).unwrap();
    let metadata = FormatMetadata::new(FormatName::Coo, vec![2, 2], 2)
        .with_data_type("indices_0", TypeLabel::new(Kind::Int32))
        .with_data_type("indices_1", TypeLabel::new(Kind::Int32))
        .with_data_type("values", TypeLabel::new(Kind::Float32));
    group.set_attribute("binsparse", &metadata.to_json(false).unwrap()).unwrap();

    let err = read_matrix::<CooMatrix<f32, u64>, _>(&group).unwrap_err();
    assert!(matches!(err, BspError::InvalidMatrix(ref m) if m.contains("indices_0[1] = -1 is negative")));
    let err = read_matrix::<CooMatrix<f32, i32>, _>(&group).unwrap_err();
    assert!(matches!(err, BspError::InvalidMatrix(ref m) if m.contains("indices_0[1] = -1")));
}

#[test]
fn test_column_major_coo_read() {
    // [[0, 0, 0, 0, 1], [2, 0, 0, 0, 0], [0, 0, 0, 0, 0], [0, 0, 3, 0, 0]] sorted by column
    let mut group = Group::new();
    group.write_array("indices_0", vec![1u32, 3, 0]).unwrap();
    group.write_array("indices_1", vec![0u32, 2, 4]).unwrap();
    group.write_array("values", vec![2.0f32, 3.0, 1.0]).unwrap();
    let metadata = FormatMetadata::new(FormatName::CooColMajor, vec![4, 5], 3)
        .with_data_type("indices_0", TypeLabel::new(Kind::Uint32))
        .with_data_type("indices_1", TypeLabel::new(Kind::Uint32))
        .with_data_type("values", TypeLabel::new(Kind::Float32));
    group.set_attribute("binsparse", &metadata.to_json(true).unwrap()).unwrap();

    assert_eq!(inspect(&group).unwrap().format, FormatName::CooColMajor);
    let m: CooMatrix<f32, u64> = read_matrix(&group).unwrap();
    assert_eq!(m.rows(), &[1, 3, 0]);
    assert_eq!(m.cols(), &[0, 2, 4]);
    assert_eq!(m.get(0, 4), Some(1.0));
    assert_eq!(m.get(3, 2), Some(3.0));

    let summary = summarize(&group, 2).unwrap();
    assert_eq!(summary.metadata.format, FormatName::CooColMajor);
    assert_eq!(summary.preview.len(), 2);
    assert_eq!((summary.preview[0].row, summary.preview[0].col), (1, 0));

    let err = read_matrix::<CsrMatrix<f32, u32>, _>(&group).unwrap_err();
    assert!(matches!(err, BspError::FormatMismatch { ref found, .. } if found == "COOC"));
}

#[test]
fn test_narrowing_rejected() {
    let matrix = coo_sample::<f32, u64>([1.0, 2.0, 3.0]);
    let mut group = Group::new();
    write_matrix(&mut group, &matrix, Map::new(), &CodecConfig::default()).unwrap();
    let err = read_matrix::<CooMatrix<f32, u16>, _>(&group).unwrap_err();
    assert!(matches!(err, BspError::TypeMismatch { ref field, .. } if field == "indices_0"));
}

#[test]
fn test_format_mismatch() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("csr.bsp");
    let csr = CsrMatrix::new(1, 1, vec![0u8, 1], vec![0u8], vec![1.0f64]).unwrap();
    write_to_path(&path, &csr, Map::new(), &CodecConfig::default()).unwrap();

    let err = read_from_path::<CscMatrix<f64, u8>, _>(&path, None).unwrap_err();
    assert!(matches!(err, BspError::FormatMismatch { .. }));
    let err = read_from_path::<DenseMatrix<f64>, _>(&path, None).unwrap_err();
    assert!(matches!(err, BspError::FormatMismatch { ref expected, .. } if expected.contains("DMATR")));
}

#[test]
fn test_groups_in_one_container() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("multi.bsp");
    let first = coo_sample::<f32, u32>([1.0, 2.0, 3.0]);
    let second = DenseVector::new(vec![9u8, 8, 7]);

    write_to_path(&path, &first, Map::new(), &CodecConfig::default().with_group("a")).unwrap();
    write_to_path(&path, &second, Map::new(), &CodecConfig::default().with_group("b/c")).unwrap();

    assert_eq!(read_from_path::<CooMatrix<f32, u32>, _>(&path, Some("a")).unwrap(), first);
    assert_eq!(read_from_path::<DenseVector<u8>, _>(&path, Some("b/c")).unwrap(), second);
    assert!(matches!(inspect_path(&path, None), Err(BspError::Storage(_))));

    let err = write_to_path(&path, &second, Map::new(), &CodecConfig::default().with_group("a"))
        .unwrap_err();
    assert!(matches!(err, BspError::Storage(_)));
    assert_eq!(read_from_path::<CooMatrix<f32, u32>, _>(&path, Some("a")).unwrap(), first);
}

#[test]
fn test_root_write_truncates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("replace.bsp");
    write_to_path(&path, &coo_sample::<f32, u32>([1.0, 2.0, 3.0]), Map::new(), &CodecConfig::default().with_group("old"))
        .unwrap();
    write_to_path(&path, &DenseVector::new(vec![1u8]), Map::new(), &CodecConfig::default()).unwrap();

    let file = BspFile::open(&path).unwrap();
    assert!(file.root().group_names().is_empty());
}

#[test]
fn test_failed_write_leaves_no_target() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dupes.bsp");
    let dupes = CooMatrix::new(2, 2, vec![0u8, 0], vec![1u8, 1], vec![1.0f32, 2.0]).unwrap();

    let err = write_to_path(&path, &dupes, Map::new(), &CodecConfig::default()).unwrap_err();
    assert!(matches!(err, BspError::InvalidMatrix(ref m) if m.contains("duplicate coordinate")));
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_corrupt_arrays_rejected_on_read() {
    let mut group = Group::new();
    let matrix = coo_sample::<f32, u32>([1.0, 2.0, 3.0]);
    write_matrix(&mut group, &matrix, Map::new(), &CodecConfig::default()).unwrap();

    // an index past the declared shape
    group.write_array("indices_0", vec![0u32, 1, 9]).unwrap();
    let err = read_matrix::<CooMatrix<f32, u32>, _>(&group).unwrap_err();
    assert!(matches!(err, BspError::InvalidMatrix(ref m) if m.contains("indices_0[2]")));

    // fewer entries than number_of_stored_values
    group.write_array("indices_0", vec![0u32, 1]).unwrap();
    group.write_array("indices_1", vec![4u32, 0]).unwrap();
    group.write_array("values", vec![1.0f32, 2.0]).unwrap();
    let err = read_matrix::<CooMatrix<f32, u32>, _>(&group).unwrap_err();
    assert!(matches!(err, BspError::InvalidMatrix(ref m) if m.contains("number_of_stored_values")));

    // dataset kind disagrees with metadata
    group.write_array("values", vec![1i32, 2, 3]).unwrap();
    assert!(matches!(
        read_matrix::<CooMatrix<f32, u32>, _>(&group),
        Err(BspError::Storage(_))
    ));
}

const INDEX_KINDS: [Kind; 8] = [
    Kind::Uint8,
    Kind::Uint16,
    Kind::Uint32,
    Kind::Uint64,
    Kind::Int8,
    Kind::Int16,
    Kind::Int32,
    Kind::Int64,
];

/// Builds a COO matrix for whatever kinds it is dispatched on and sends it
/// through a container file and back
struct CooThroughFile {
    n: usize,
    coords: Vec<(usize, usize)>,
}

impl KindVisitor for CooThroughFile {
    type Output = ();

    fn visit_indexed<I: Index, T: Element>(self) -> bsp::Result<()> {
        let idx = |v: usize| I::from_usize(v).unwrap();
        let rows = self.coords.iter().map(|&(r, _)| idx(r)).collect();
        let cols = self.coords.iter().map(|&(_, c)| idx(c)).collect();
        let values = self
            .coords
            .iter()
            .map(|&(r, c)| T::parse_text(&((r * 7 + c) % 101).to_string()).unwrap())
            .collect();
        let matrix: CooMatrix<T, I> = CooMatrix::new(self.n, self.n, rows, cols, values)?;

        let dir = tempdir()?;
        let path = dir.path().join("any.bsp");
        write_to_path(&path, &matrix, Map::new(), &CodecConfig::default())?;

        let metadata = inspect_path(&path, None)?;
        assert_eq!(metadata.data_type("indices_0")?.kind, I::KIND);
        assert_eq!(metadata.value_type()?.kind, T::KIND);
        assert_eq!(read_from_path::<CooMatrix<T, I>, _>(&path, None)?, matrix);

        let wide: CooMatrix<T, u64> = read_from_path(&path, None)?;
        let rows: Vec<u64> = matrix.rows().iter().map(|r| r.to_u64().unwrap()).collect();
        assert_eq!(wide.rows(), rows.as_slice());
        assert_eq!(wide.values(), matrix.values());
        Ok(())
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_coo_round_trip_any_kinds(
        index in prop::sample::select(INDEX_KINDS.to_vec()),
        value in prop::sample::select(Kind::ALL.to_vec()),
        (n, coords) in (1usize..100).prop_flat_map(|n| {
            (Just(n), prop::collection::btree_set((0..n, 0..n), 0..30))
        }),
    ) {
        let visitor = CooThroughFile { n, coords: coords.into_iter().collect() };
        prop_assert!(dispatch_kinds(&[index, value], visitor).is_ok());
    }
}
