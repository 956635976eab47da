use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use memmap2::MmapMut;

use xv6fs::FsImage;

/// Operate on an xv6-riscv file system image.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct OpfsArgs {
    /// image file to operate on
    imgfile: PathBuf,
    #[command(subcommand)]
    command: OpfsCommand,
}

#[derive(Subcommand, Debug)]
enum OpfsCommand {
    /// print the file system layout and usage summary
    Diskinfo,
    /// print inode metadata and data block numbers
    Info { path: String },
    /// list a directory (or one file) as `name type inum size`
    Ls { path: String },
    /// write a file's contents to stdout
    Get { path: String },
    /// store stdin as a regular file, replacing its contents
    Put { path: String },
    /// remove a file (not a directory)
    Rm { path: String },
    /// copy a regular file
    Cp { spath: String, dpath: String },
    /// move or rename a file or directory
    Mv { spath: String, dpath: String },
    /// hard-link a regular file
    Ln { spath: String, dpath: String },
    /// create an empty directory
    Mkdir { path: String },
    /// remove an empty directory
    Rmdir { path: String },
}

fn main() -> anyhow::Result<()> {
    env_logger::builder().format_timestamp_nanos().init();
    let args = OpfsArgs::parse();

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&args.imgfile)
        .with_context(|| format!("cannot open {}", args.imgfile.display()))?;
    let mut img = unsafe { MmapMut::map_mut(&file) }
        .with_context(|| format!("cannot map {}", args.imgfile.display()))?;

    let mut fs = FsImage::open(&mut img)?;
    let stdout = io::stdout();
    match &args.command {
        OpfsCommand::Diskinfo => fs.diskinfo(&mut stdout.lock())?,
        OpfsCommand::Info { path } => fs.info(path, &mut stdout.lock())?,
        OpfsCommand::Ls { path } => fs.ls(path, &mut stdout.lock())?,
        OpfsCommand::Get { path } => fs.get(path, &mut stdout.lock())?,
        OpfsCommand::Put { path } => fs.put(path, &mut io::stdin().lock())?,
        OpfsCommand::Rm { path } => fs.rm(path)?,
        OpfsCommand::Cp { spath, dpath } => fs.cp(spath, dpath)?,
        OpfsCommand::Mv { spath, dpath } => fs.mv(spath, dpath)?,
        OpfsCommand::Ln { spath, dpath } => fs.ln(spath, dpath)?,
        OpfsCommand::Mkdir { path } => fs.mkdir(path)?,
        OpfsCommand::Rmdir { path } => fs.rmdir(path)?,
    }

    img.flush().context("cannot flush the image")?;
    Ok(())
}
