//! Building a fresh, empty file system inside a zeroed image.

use std::io::Write;

use anyhow::{anyhow, ensure};
use byte_unit::Byte;

use crate::fs::{FileKind, FsImage, Superblock, BSIZE, ROOT_INUM};

/// Initialize `img` as an empty file system of `size` blocks with
/// `ninodes` inodes and `nlog` log blocks, and report the resulting
/// region sizes on `out`.
///
/// The image ends up with the superblock in block 1, every block of the
/// reserved prefix marked used in the bitmap, and the root directory in
/// inode 1 holding its `.` and `..` entries.
pub fn setupfs(
    img: &mut [u8],
    size: u32,
    ninodes: u32,
    nlog: u32,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    ensure!(
        img.len() as u64 == size as u64 * BSIZE as u64,
        "image is {} bytes, expected {} for {} blocks",
        img.len(),
        size as u64 * BSIZE as u64,
        size
    );

    let sb = Superblock::new(size, ninodes, nlog);
    let reserved = sb.first_data_block();
    if sb.nblocks == 0 {
        // the reserved prefix alone needs reserved+1 blocks to leave any
        // room for data
        let need = Byte::from_bytes((reserved as u128 + 1) * BSIZE as u128);
        return Err(anyhow!(
            "{} blocks is too small: {} inodes and {} log blocks need at least {} ({} blocks)",
            size,
            ninodes,
            nlog,
            need.get_appropriate_unit(true),
            reserved + 1
        ));
    }

    img.fill(0);
    let mut fs = FsImage::open(img)?;
    fs.write_superblock(&sb);

    // the boot, super, log, inode and bitmap blocks are never data
    for b in 0..reserved {
        fs.set_bitmap_bit(b, true);
    }

    let root = fs.ialloc(FileKind::Directory)?;
    assert_eq!(root, ROOT_INUM, "first allocation must yield the root inode");
    fs.daddent(root, b".", root)?;
    fs.daddent(root, b"..", root)?;

    writeln!(out, "# of blocks: {size}")?;
    writeln!(out, "# of inodes: {ninodes}")?;
    writeln!(out, "# of log blocks: {nlog}")?;
    writeln!(out, "# of inode blocks: {}", sb.ninode_blocks())?;
    writeln!(out, "# of bitmap blocks: {}", sb.nbitmap_blocks())?;
    writeln!(out, "# of data blocks: {}", sb.nblocks)?;
    Ok(())
}
