//! The inode table: allocation, freeing and field access.
//!
//! An inode is referred to by number everywhere; the byte offset of its
//! 64-byte record is recomputed on each access, so holding an inode
//! number stays valid across any other mutation of the image.
//!
//! Record layout: `type`, `major`, `minor`, `nlink` as little-endian u16,
//! then `size` as u32, then the 13 `addrs` cells as u32.

use log::warn;

use crate::error::FsError;

use super::{FileKind, FsImage, DINODE_SIZE, IPB, NDIRECT};

/// Inode number. Inode 0 is never used; 1 is the root directory.
pub type Inum = u32;

const OFF_TYPE: usize = 0;
const OFF_NLINK: usize = 6;
const OFF_SIZE: usize = 8;
const OFF_ADDRS: usize = 12;

impl FsImage<'_> {
    /// Validate an inode number, yielding it back for chaining.
    pub fn iget(&self, inum: Inum) -> Result<Inum, FsError> {
        if inum > 0 && inum < self.superblock().ninodes {
            Ok(inum)
        } else {
            Err(FsError::InvalidInum(inum))
        }
    }

    /// Take the lowest-numbered free inode record and give it `kind`.
    pub fn ialloc(&mut self, kind: FileKind) -> Result<Inum, FsError> {
        let ninodes = self.superblock().ninodes;
        for inum in 1..ninodes {
            if self.itype(inum) == 0 {
                let off = self.inode_off(inum);
                self.bytes_mut()[off..off + DINODE_SIZE].fill(0);
                self.set_itype(inum, kind.as_raw());
                return Ok(inum);
            }
        }
        Err(FsError::NoFreeInodes)
    }

    /// Mark the record free. Freeing a free inode or one that still has
    /// links is suspicious but allowed.
    pub fn ifree(&mut self, inum: Inum) -> Result<(), FsError> {
        let inum = self.iget(inum)?;
        if self.itype(inum) == 0 {
            warn!("ifree: inode #{inum} is already freed");
        }
        if self.nlink(inum) > 0 {
            warn!("ifree: nlink of inode #{inum} is not zero");
        }
        self.set_itype(inum, 0);
        Ok(())
    }

    fn inode_off(&self, inum: Inum) -> usize {
        let sb = self.superblock();
        sb.inode_block_of(inum) as usize * super::BSIZE
            + (inum % IPB) as usize * DINODE_SIZE
    }

    fn field16(&self, inum: Inum, off: usize) -> u16 {
        let base = self.inode_off(inum) + off;
        let mut w = [0u8; 2];
        w.copy_from_slice(&self.bytes()[base..base + 2]);
        u16::from_le_bytes(w)
    }

    fn set_field16(&mut self, inum: Inum, off: usize, val: u16) {
        let base = self.inode_off(inum) + off;
        self.bytes_mut()[base..base + 2].copy_from_slice(&val.to_le_bytes());
    }

    fn field32(&self, inum: Inum, off: usize) -> u32 {
        let base = self.inode_off(inum) + off;
        let mut w = [0u8; 4];
        w.copy_from_slice(&self.bytes()[base..base + 4]);
        u32::from_le_bytes(w)
    }

    fn set_field32(&mut self, inum: Inum, off: usize, val: u32) {
        let base = self.inode_off(inum) + off;
        self.bytes_mut()[base..base + 4].copy_from_slice(&val.to_le_bytes());
    }

    pub(crate) fn itype(&self, inum: Inum) -> u16 {
        self.field16(inum, OFF_TYPE)
    }

    pub(crate) fn set_itype(&mut self, inum: Inum, val: u16) {
        self.set_field16(inum, OFF_TYPE, val);
    }

    pub(crate) fn nlink(&self, inum: Inum) -> u16 {
        self.field16(inum, OFF_NLINK)
    }

    pub(crate) fn set_nlink(&mut self, inum: Inum, val: u16) {
        self.set_field16(inum, OFF_NLINK, val);
    }

    pub(crate) fn isize(&self, inum: Inum) -> u32 {
        self.field32(inum, OFF_SIZE)
    }

    pub(crate) fn set_isize(&mut self, inum: Inum, val: u32) {
        self.set_field32(inum, OFF_SIZE, val);
    }

    /// Address cell `k`: direct slots for `k < NDIRECT`, the indirect
    /// pointer at `k == NDIRECT`.
    pub(crate) fn addr(&self, inum: Inum, k: usize) -> u32 {
        debug_assert!(k <= NDIRECT);
        self.field32(inum, OFF_ADDRS + 4 * k)
    }

    pub(crate) fn set_addr(&mut self, inum: Inum, k: usize, val: u32) {
        debug_assert!(k <= NDIRECT);
        self.set_field32(inum, OFF_ADDRS + 4 * k, val);
    }

    pub(crate) fn is_dir(&self, inum: Inum) -> bool {
        self.itype(inum) == FileKind::Directory.as_raw()
    }

    pub(crate) fn is_file(&self, inum: Inum) -> bool {
        self.itype(inum) == FileKind::RegularFile.as_raw()
    }

    pub(crate) fn is_dev(&self, inum: Inum) -> bool {
        self.itype(inum) == FileKind::Device.as_raw()
    }
}
