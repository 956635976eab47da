use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use memmap2::MmapMut;

use xv6fs::fs::BSIZE;

/// Create an empty xv6-riscv file system image.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct NewfsArgs {
    /// image file to create (overwritten if it exists)
    imgfile: PathBuf,
    /// total number of blocks
    size: u32,
    /// number of inodes
    ninodes: u32,
    /// number of log blocks
    nlog: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::builder().format_timestamp_nanos().init();
    let args = NewfsArgs::parse();

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&args.imgfile)
        .with_context(|| format!("cannot create {}", args.imgfile.display()))?;
    file.set_len(args.size as u64 * BSIZE as u64)
        .with_context(|| format!("cannot size {}", args.imgfile.display()))?;

    let mut img = unsafe { MmapMut::map_mut(&file) }
        .with_context(|| format!("cannot map {}", args.imgfile.display()))?;

    xv6fs::mkfs::setupfs(
        &mut img,
        args.size,
        args.ninodes,
        args.nlog,
        &mut io::stdout().lock(),
    )?;

    img.flush().context("cannot flush the image")?;
    Ok(())
}
