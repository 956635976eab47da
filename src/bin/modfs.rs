use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use memmap2::MmapMut;

use xv6fs::fs::SbField;
use xv6fs::FsImage;

/// Edit raw fields of an xv6-riscv file system image.
///
/// No consistency checking whatsoever: this is the tool that builds
/// corrupted images on purpose, and the one that repairs them. With no
/// value argument a command prints the current value; with one it stores
/// it.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct ModfsArgs {
    /// image file to edit
    imgfile: PathBuf,
    #[command(subcommand)]
    command: ModfsCommand,
}

#[derive(Subcommand, Debug)]
enum ModfsCommand {
    #[command(name = "superblock.size")]
    SuperblockSize { val: Option<u32> },
    #[command(name = "superblock.nblocks")]
    SuperblockNblocks { val: Option<u32> },
    #[command(name = "superblock.ninodes")]
    SuperblockNinodes { val: Option<u32> },
    #[command(name = "superblock.nlog")]
    SuperblockNlog { val: Option<u32> },
    #[command(name = "superblock.logstart")]
    SuperblockLogstart { val: Option<u32> },
    #[command(name = "superblock.inodestart")]
    SuperblockInodestart { val: Option<u32> },
    #[command(name = "superblock.bmapstart")]
    SuperblockBmapstart { val: Option<u32> },
    /// one free-bitmap bit, by block number (val 0 or 1)
    Bitmap { bnum: u32, val: Option<u8> },
    #[command(name = "inode.type")]
    InodeType { inum: u32, val: Option<u16> },
    #[command(name = "inode.nlink")]
    InodeNlink { inum: u32, val: Option<u16> },
    #[command(name = "inode.size")]
    InodeSize { inum: u32, val: Option<u32> },
    #[command(name = "inode.indirect")]
    InodeIndirect { inum: u32, val: Option<u32> },
    #[command(name = "inode.addrs")]
    InodeAddrs {
        inum: u32,
        n: usize,
        val: Option<u32>,
    },
    /// a directory entry's inode number; `delete` zeroes the whole entry
    Dirent {
        path: String,
        name: String,
        val: Option<String>,
    },
}

fn sb_command(fs: &mut FsImage, field: SbField, val: Option<u32>) {
    match val {
        None => println!("{}", fs.sb_get(field)),
        Some(v) => fs.sb_set(field, v),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder().format_timestamp_nanos().init();
    let args = ModfsArgs::parse();

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&args.imgfile)
        .with_context(|| format!("cannot open {}", args.imgfile.display()))?;
    let mut img = unsafe { MmapMut::map_mut(&file) }
        .with_context(|| format!("cannot map {}", args.imgfile.display()))?;

    let mut fs = FsImage::open(&mut img)?;
    match args.command {
        ModfsCommand::SuperblockSize { val } => sb_command(&mut fs, SbField::Size, val),
        ModfsCommand::SuperblockNblocks { val } => sb_command(&mut fs, SbField::Nblocks, val),
        ModfsCommand::SuperblockNinodes { val } => sb_command(&mut fs, SbField::Ninodes, val),
        ModfsCommand::SuperblockNlog { val } => sb_command(&mut fs, SbField::Nlog, val),
        ModfsCommand::SuperblockLogstart { val } => sb_command(&mut fs, SbField::Logstart, val),
        ModfsCommand::SuperblockInodestart { val } => {
            sb_command(&mut fs, SbField::Inodestart, val)
        }
        ModfsCommand::SuperblockBmapstart { val } => sb_command(&mut fs, SbField::Bmapstart, val),
        ModfsCommand::Bitmap { bnum, val } => match val {
            None => println!("{}", fs.raw_bitmap_get(bnum)? as u8),
            Some(0) => fs.raw_bitmap_set(bnum, false)?,
            Some(1) => fs.raw_bitmap_set(bnum, true)?,
            Some(_) => bail!("bitmap: val must be 0 or 1"),
        },
        ModfsCommand::InodeType { inum, val } => match val {
            None => println!("{}", fs.raw_inode_type(inum)?),
            Some(v) => fs.raw_inode_set_type(inum, v)?,
        },
        ModfsCommand::InodeNlink { inum, val } => match val {
            None => println!("{}", fs.raw_inode_nlink(inum)?),
            Some(v) => fs.raw_inode_set_nlink(inum, v)?,
        },
        ModfsCommand::InodeSize { inum, val } => match val {
            None => println!("{}", fs.raw_inode_size(inum)?),
            Some(v) => fs.raw_inode_set_size(inum, v)?,
        },
        ModfsCommand::InodeIndirect { inum, val } => match val {
            None => println!("{}", fs.raw_inode_indirect(inum)?),
            Some(v) => fs.raw_inode_set_indirect(inum, v)?,
        },
        ModfsCommand::InodeAddrs { inum, n, val } => match val {
            None => println!("{}", fs.raw_inode_addr(inum, n)?),
            Some(v) => fs.raw_inode_set_addr(inum, n, v)?,
        },
        ModfsCommand::Dirent { path, name, val } => match val.as_deref() {
            None => println!("{}", fs.raw_dirent_get(&path, &name)?),
            Some("delete") => fs.raw_dirent_delete(&path, &name)?,
            Some(v) => {
                let inum: u16 = v
                    .parse()
                    .with_context(|| format!("dirent: {v}: not an inode number"))?;
                fs.raw_dirent_set(&path, &name, inum)?;
            }
        },
    }

    img.flush().context("cannot flush the image")?;
    Ok(())
}
