//! Matrix Market text ingestion

mod header;
mod read;

pub use header::{parse_size_line, Banner, Field, Layout, Symmetry};
pub use read::{
    assemble_coo, assemble_csr, read_array, read_coo, read_coo_path, read_csr, read_csr_path,
    read_dense_vector, read_dense_vector_path, read_entries, read_info, read_info_path, Entry,
    MatrixMarketInfo,
};
