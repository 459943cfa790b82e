use std::path::PathBuf;

use bsp::matrix_market::read_info_path;
use bsp::{convert_matrix_market, CodecConfig, ConvertOptions, MatrixMarketOptions, TargetFormat};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "Convert a Matrix Market file into a Binsparse container")]
struct Cli {
    /// Matrix Market input file
    input: PathBuf,

    /// Binsparse container to write
    output: PathBuf,

    /// Sparse format for coordinate files (COO or CSR)
    #[arg(default_value = "COO")]
    format: TargetFormat,

    /// Write into this group of an existing container instead of replacing it
    group: Option<String>,

    /// Indices in the input start at 0 instead of 1
    #[arg(long)]
    zero_indexed: bool,

    /// Write compact metadata JSON
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    let info = read_info_path(&cli.input)?;
    println!(
        "Matrix is {} x {} with {} values.",
        info.nrows, info.ncols, info.nnz
    );
    println!("Type: {}", info.banner.field);
    println!("Structure: {}", info.banner.symmetry);
    println!("Comment:");
    print!("{}", info.comment);

    let mut codec = CodecConfig::default().with_pretty_metadata(!cli.compact);
    if let Some(group) = &cli.group {
        codec = codec.with_group(group.clone());
    }
    let options = ConvertOptions::default()
        .with_target(cli.format)
        .with_codec(codec)
        .with_matrix_market(MatrixMarketOptions::default().with_one_indexed(!cli.zero_indexed));

    let metadata = convert_matrix_market(&cli.input, &cli.output, &options)?;
    println!(
        "Wrote binsparse file {} using {} format.",
        cli.output.display(),
        metadata.format
    );
    Ok(())
}
