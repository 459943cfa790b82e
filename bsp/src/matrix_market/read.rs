//! Matrix Market ingestion
//!
//! Coordinate files are read into a list of entries that is mirrored for
//! `symmetric` files and sorted by `(row, col)`, then assembled into COO or
//! CSR. Duplicate coordinates are kept; the sort is stable so they stay in
//! file order.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bsp_core::{BspError, CooMatrix, CsrMatrix, DenseVector, Element, Index, Result};
use tracing::{debug, warn};

use super::header::{parse_size_line, Banner, Field, Layout, Symmetry};
use crate::config::MatrixMarketOptions;

/// Everything in a file before the first entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixMarketInfo {
    pub banner: Banner,
    pub nrows: usize,
    pub ncols: usize,
    /// Declared entry count; `nrows * ncols` for array files
    pub nnz: usize,
    /// Consecutive `%` lines after the banner, each followed by `\n`
    pub comment: String,
}

/// One coordinate entry, 0-based
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry<T> {
    pub row: usize,
    pub col: usize,
    pub value: T,
}

/// Line source that remembers the current line number for error messages
struct LineReader<R> {
    lines: std::io::Lines<R>,
    number: usize,
}

impl<R: BufRead> LineReader<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            number: 0,
        }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.next() {
            Some(line) => {
                self.number += 1;
                Ok(Some(line?))
            }
            None => Ok(None),
        }
    }

    fn error(&self, message: impl std::fmt::Display) -> BspError {
        BspError::Parse(format!("line {}: {message}", self.number))
    }
}

fn read_header<R: BufRead>(lines: &mut LineReader<R>) -> Result<MatrixMarketInfo> {
    let first = lines
        .next_line()?
        .ok_or_else(|| BspError::MalformedHeader("input is empty".into()))?;
    let banner = Banner::parse(&first)?;

    let mut comment = String::new();
    let size_line = loop {
        let line = lines
            .next_line()?
            .ok_or_else(|| BspError::MalformedHeader("missing size line".into()))?;
        if line.starts_with('%') {
            comment.push_str(&line);
            comment.push('\n');
        } else if !line.trim().is_empty() {
            break line;
        }
    };
    let (nrows, ncols, nnz) = parse_size_line(&size_line, banner.layout)?;

    debug!(%banner, nrows, ncols, nnz, "read Matrix Market header");
    Ok(MatrixMarketInfo {
        banner,
        nrows,
        ncols,
        nnz,
        comment,
    })
}

/// Read the banner, comment block and size line without reading entries
pub fn read_info<R: BufRead>(reader: R) -> Result<MatrixMarketInfo> {
    read_header(&mut LineReader::new(reader))
}

fn parse_index<R: BufRead>(
    lines: &LineReader<R>,
    token: Option<&str>,
    options: &MatrixMarketOptions,
) -> Result<usize> {
    let token = token.ok_or_else(|| lines.error("expected a row and a column index"))?;
    let index: usize = token
        .parse()
        .map_err(|_| lines.error(format!("`{token}` is not an index")))?;
    if !options.one_indexed {
        return Ok(index);
    }
    index
        .checked_sub(1)
        .ok_or_else(|| lines.error("index 0 in a 1-indexed file"))
}

/// Read a coordinate file into sorted 0-based entries
///
/// Only `general` and `symmetric` files are accepted; every off-diagonal
/// entry of a symmetric file is also emitted mirrored.
pub fn read_entries<T: Element, R: BufRead>(
    reader: R,
    options: &MatrixMarketOptions,
) -> Result<(MatrixMarketInfo, Vec<Entry<T>>)> {
    let mut lines = LineReader::new(reader);
    let info = read_header(&mut lines)?;
    let banner = info.banner;

    if banner.layout != Layout::Coordinate {
        return Err(BspError::UnsupportedMatrixMarketFormat(format!(
            "{} layout has no coordinates",
            banner.layout
        )));
    }
    let symmetric = match banner.symmetry {
        Symmetry::General => false,
        Symmetry::Symmetric => true,
        other => return Err(BspError::UnsupportedStructure(other.to_string())),
    };
    banner.field.value_kind()?;
    let pattern = banner.field == Field::Pattern;

    let declared = info.nnz;
    let mut entries = Vec::with_capacity(declared.min(1 << 20));
    let mut found = 0usize;
    while let Some(line) = lines.next_line()? {
        let line = line.trim();
        if line.is_empty() {
            warn!(line = lines.number, "skipping blank line in entry stream");
            continue;
        }
        found += 1;
        if found > declared {
            return Err(BspError::TooManyEntries {
                declared: declared as u64,
            });
        }

        let mut tokens = line.split_whitespace();
        let row = parse_index(&lines, tokens.next(), options)?;
        let col = parse_index(&lines, tokens.next(), options)?;
        if row >= info.nrows || col >= info.ncols {
            return Err(BspError::OutOfBounds {
                row: row as u64,
                col: col as u64,
                nrows: info.nrows as u64,
                ncols: info.ncols as u64,
            });
        }
        let value = if pattern {
            T::one()
        } else {
            let token = tokens
                .next()
                .ok_or_else(|| lines.error("missing value"))?;
            T::parse_text(token)
                .ok_or_else(|| lines.error(format!("`{token}` is not a {}", T::KIND)))?
        };

        entries.push(Entry { row, col, value });
        if symmetric && row != col {
            entries.push(Entry {
                row: col,
                col: row,
                value,
            });
        }
    }
    if found < declared {
        return Err(BspError::TooFewEntries {
            declared: declared as u64,
            found: found as u64,
        });
    }

    entries.sort_by_key(|e| (e.row, e.col));
    debug!(declared, stored = entries.len(), symmetric, "read Matrix Market entries");
    Ok((info, entries))
}

/// Read the values of a single-column `array` file
pub fn read_array<T: Element, R: BufRead>(reader: R) -> Result<(MatrixMarketInfo, Vec<T>)> {
    let mut lines = LineReader::new(reader);
    let info = read_header(&mut lines)?;
    let banner = info.banner;

    if banner.layout != Layout::Array
        || info.ncols != 1
        || banner.symmetry != Symmetry::General
        || banner.field == Field::Pattern
    {
        return Err(BspError::UnsupportedMatrixMarketFormat(format!(
            "only single-column general arrays are read as vectors, found {} {}x{}",
            banner, info.nrows, info.ncols
        )));
    }
    banner.field.value_kind()?;

    let declared = info.nnz;
    let mut values = Vec::with_capacity(declared.min(1 << 20));
    while let Some(line) = lines.next_line()? {
        for token in line.split_whitespace() {
            if values.len() == declared {
                return Err(BspError::TooManyEntries {
                    declared: declared as u64,
                });
            }
            let value = T::parse_text(token)
                .ok_or_else(|| lines.error(format!("`{token}` is not a {}", T::KIND)))?;
            values.push(value);
        }
    }
    if values.len() < declared {
        return Err(BspError::TooFewEntries {
            declared: declared as u64,
            found: values.len() as u64,
        });
    }
    Ok((info, values))
}

fn to_index<I: Index>(value: usize) -> Result<I> {
    I::from_usize(value).ok_or(BspError::IndexOverflow {
        value: value as u64,
        label: I::KIND.label(),
    })
}

/// Split entries into parallel COO arrays, sorting them first
pub fn assemble_coo<T: Element, I: Index>(
    nrows: usize,
    ncols: usize,
    mut entries: Vec<Entry<T>>,
) -> Result<CooMatrix<T, I>> {
    entries.sort_by_key(|e| (e.row, e.col));
    let mut rows = Vec::with_capacity(entries.len());
    let mut cols = Vec::with_capacity(entries.len());
    let mut values = Vec::with_capacity(entries.len());
    for entry in entries {
        rows.push(to_index(entry.row)?);
        cols.push(to_index(entry.col)?);
        values.push(entry.value);
    }
    CooMatrix::new(nrows, ncols, rows, cols, values)
}

/// Build CSR from entries with one left-to-right scan over sorted rows
pub fn assemble_csr<T: Element, I: Index>(
    nrows: usize,
    ncols: usize,
    mut entries: Vec<Entry<T>>,
) -> Result<CsrMatrix<T, I>> {
    entries.sort_by_key(|e| (e.row, e.col));
    let nnz = entries.len();
    let mut pointers = Vec::with_capacity(nrows + 1);
    let mut cols = Vec::with_capacity(nnz);
    let mut values = Vec::with_capacity(nnz);

    pointers.push(to_index(0)?);
    let mut row = 0;
    for (k, entry) in entries.into_iter().enumerate() {
        while row < entry.row {
            pointers.push(to_index(k)?);
            row += 1;
        }
        cols.push(to_index(entry.col)?);
        values.push(entry.value);
    }
    while row < nrows {
        pointers.push(to_index(nnz)?);
        row += 1;
    }
    CsrMatrix::new(nrows, ncols, pointers, cols, values)
}

/// Read a coordinate file as sorted COO
pub fn read_coo<T: Element, I: Index, R: BufRead>(
    reader: R,
    options: &MatrixMarketOptions,
) -> Result<CooMatrix<T, I>> {
    let (info, entries) = read_entries(reader, options)?;
    assemble_coo(info.nrows, info.ncols, entries)
}

/// Read a coordinate file as CSR
pub fn read_csr<T: Element, I: Index, R: BufRead>(
    reader: R,
    options: &MatrixMarketOptions,
) -> Result<CsrMatrix<T, I>> {
    let (info, entries) = read_entries(reader, options)?;
    assemble_csr(info.nrows, info.ncols, entries)
}

/// Read a single-column array file as a dense vector
pub fn read_dense_vector<T: Element, R: BufRead>(reader: R) -> Result<DenseVector<T>> {
    let (_, values) = read_array(reader)?;
    Ok(DenseVector::new(values))
}

fn open(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

pub fn read_info_path<P: AsRef<Path>>(path: P) -> Result<MatrixMarketInfo> {
    read_info(open(path.as_ref())?)
}

pub fn read_coo_path<T: Element, I: Index, P: AsRef<Path>>(
    path: P,
    options: &MatrixMarketOptions,
) -> Result<CooMatrix<T, I>> {
    read_coo(open(path.as_ref())?, options)
}

pub fn read_csr_path<T: Element, I: Index, P: AsRef<Path>>(
    path: P,
    options: &MatrixMarketOptions,
) -> Result<CsrMatrix<T, I>> {
    read_csr(open(path.as_ref())?, options)
}

pub fn read_dense_vector_path<T: Element, P: AsRef<Path>>(path: P) -> Result<DenseVector<T>> {
    read_dense_vector(open(path.as_ref())?)
}
