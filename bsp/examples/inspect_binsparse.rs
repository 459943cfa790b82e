use std::path::PathBuf;

use bsp::{fields, summarize_path, FormatName};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "Print the metadata of a Binsparse container and preview its entries")]
struct Cli {
    /// Binsparse container to inspect
    input: PathBuf,

    /// Group holding the matrix, if not the root
    group: Option<String>,

    /// Number of stored entries to print
    #[arg(long, default_value_t = 10)]
    preview: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let summary = summarize_path(&cli.input, cli.group.as_deref(), cli.preview)?;
    let metadata = &summary.metadata;

    println!("Inspecting Binsparse v{} file...", metadata.version);
    println!(
        "{} format matrix of dimension {:?} with {} stored values",
        metadata.format, metadata.shape, metadata.number_of_stored_values
    );

    let index_fields = match metadata.format {
        FormatName::Coo | FormatName::CooColMajor => Some((fields::INDICES_0, fields::INDICES_1)),
        FormatName::Csr | FormatName::Csc => Some((fields::POINTERS_TO_1, fields::INDICES_1)),
        _ => None,
    };
    if let Some((first, second)) = index_fields {
        println!(
            "Stored using index types: {} {}",
            metadata.data_type(first)?,
            metadata.data_type(second)?
        );
    }
    println!("Value type: {}", metadata.value_type()?);
    if !metadata.structure.is_general() {
        println!("Structure: {:?}", metadata.structure);
    }

    if !metadata.user_keys.is_empty() {
        println!("User-provided keys:");
        println!("{}", serde_json::to_string_pretty(&metadata.user_keys)?);
    }

    if !summary.preview.is_empty() {
        println!("First {} stored entries:", summary.preview.len());
        for entry in &summary.preview {
            println!("  ({}, {}) = {}", entry.row, entry.col, entry.value);
        }
    }
    Ok(())
}
