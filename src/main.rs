//! modelbytes - inspect how a model file would be loaded
//!
//! Opens a file through the allocation factory and prints which backing store
//! was used, the region size and a short hex preview.

use anyhow::Result;
use clap::{value_parser, Arg, Command};
use modelbytes::{Allocation, AllocationConfig, AllocationFactory, StderrReporter, Strategy};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging for development
    env_logger::init();

    let matches = Command::new("modelbytes")
        .version(modelbytes::VERSION)
        .about("Load a model file as a read-only byte region")
        .long_about(
            "modelbytes opens a file the way a model interpreter would, either by \
             memory mapping it or by copying it into memory, and reports the result.",
        )
        .arg(
            Arg::new("file")
                .help("Path to the model file")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("strategy")
                .long("strategy")
                .short('s')
                .help("Backing store: auto, mapped or copied")
                .value_parser(value_parser!(Strategy)),
        )
        .arg(
            Arg::new("threshold")
                .long("threshold")
                .help("Smallest file size, in bytes, that auto mode maps")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("preview")
                .long("preview")
                .short('n')
                .help("Number of leading bytes to print")
                .default_value("32")
                .value_parser(value_parser!(usize)),
        )
        .get_matches();

    let file_path = matches
        .get_one::<PathBuf>("file")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("file argument is required"))?;

    let mut config = load_config()?;
    if let Some(strategy) = matches.get_one::<Strategy>("strategy") {
        config = config.with_strategy(*strategy);
    }
    if let Some(threshold) = matches.get_one::<u64>("threshold") {
        config = config.with_mmap_threshold(*threshold);
    }
    let preview = matches.get_one::<usize>("preview").copied().unwrap_or(32);

    let allocation =
        AllocationFactory::create_async(file_path.clone(), Arc::new(StderrReporter), config)
            .await?;

    print_summary(&file_path, &*allocation, preview);
    Ok(())
}

#[cfg(feature = "config")]
fn load_config() -> Result<AllocationConfig> {
    Ok(AllocationConfig::discover()?)
}

#[cfg(not(feature = "config"))]
fn load_config() -> Result<AllocationConfig> {
    Ok(AllocationConfig::default())
}

fn print_summary(path: &std::path::Path, allocation: &dyn Allocation, preview: usize) {
    println!("file:  {}", path.display());
    println!("kind:  {}", allocation.kind());
    println!("bytes: {}", allocation.bytes());
    println!("valid: {}", allocation.valid());

    if let Some(bytes) = allocation.as_slice() {
        let shown = &bytes[..preview.min(bytes.len())];
        if !shown.is_empty() {
            println!("head:  {}", hex_line(shown));
        }
    }
}

fn hex_line(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
