//! Raw field access for `modfs`: read or overwrite individual on-disk
//! fields with no invariant checking. This is how test harnesses build
//! deliberately corrupted images, and how an operator repairs one.

use crate::error::FsError;

use super::{DirEnt, FsImage, Inum, NDIRECT, NINDIRECT};

/// A superblock field addressed by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SbField {
    Size,
    Nblocks,
    Ninodes,
    Nlog,
    Logstart,
    Inodestart,
    Bmapstart,
}

impl FsImage<'_> {
    pub fn sb_get(&self, field: SbField) -> u32 {
        let sb = self.superblock();
        match field {
            SbField::Size => sb.size,
            SbField::Nblocks => sb.nblocks,
            SbField::Ninodes => sb.ninodes,
            SbField::Nlog => sb.nlog,
            SbField::Logstart => sb.logstart,
            SbField::Inodestart => sb.inodestart,
            SbField::Bmapstart => sb.bmapstart,
        }
    }

    pub fn sb_set(&mut self, field: SbField, val: u32) {
        let mut sb = self.superblock();
        match field {
            SbField::Size => sb.size = val,
            SbField::Nblocks => sb.nblocks = val,
            SbField::Ninodes => sb.ninodes = val,
            SbField::Nlog => sb.nlog = val,
            SbField::Logstart => sb.logstart = val,
            SbField::Inodestart => sb.inodestart = val,
            SbField::Bmapstart => sb.bmapstart = val,
        }
        self.write_superblock(&sb);
    }

    /// Read one bitmap bit. Any block of the image is addressable, not
    /// just the data region.
    pub fn raw_bitmap_get(&self, bnum: u32) -> Result<bool, FsError> {
        if bnum >= self.superblock().size {
            return Err(FsError::InvalidBlock(bnum));
        }
        Ok(self.bitmap_bit(bnum))
    }

    pub fn raw_bitmap_set(&mut self, bnum: u32, val: bool) -> Result<(), FsError> {
        if bnum >= self.superblock().size {
            return Err(FsError::InvalidBlock(bnum));
        }
        self.set_bitmap_bit(bnum, val);
        Ok(())
    }

    pub fn raw_inode_type(&self, inum: Inum) -> Result<u16, FsError> {
        Ok(self.itype(self.iget(inum)?))
    }

    pub fn raw_inode_set_type(&mut self, inum: Inum, val: u16) -> Result<(), FsError> {
        let inum = self.iget(inum)?;
        self.set_itype(inum, val);
        Ok(())
    }

    pub fn raw_inode_nlink(&self, inum: Inum) -> Result<u16, FsError> {
        Ok(self.nlink(self.iget(inum)?))
    }

    pub fn raw_inode_set_nlink(&mut self, inum: Inum, val: u16) -> Result<(), FsError> {
        let inum = self.iget(inum)?;
        self.set_nlink(inum, val);
        Ok(())
    }

    pub fn raw_inode_size(&self, inum: Inum) -> Result<u32, FsError> {
        Ok(self.isize(self.iget(inum)?))
    }

    pub fn raw_inode_set_size(&mut self, inum: Inum, val: u32) -> Result<(), FsError> {
        let inum = self.iget(inum)?;
        self.set_isize(inum, val);
        Ok(())
    }

    pub fn raw_inode_indirect(&self, inum: Inum) -> Result<u32, FsError> {
        Ok(self.addr(self.iget(inum)?, NDIRECT))
    }

    pub fn raw_inode_set_indirect(&mut self, inum: Inum, val: u32) -> Result<(), FsError> {
        let inum = self.iget(inum)?;
        self.set_addr(inum, NDIRECT, val);
        Ok(())
    }

    /// Address slot `n` of an inode: direct for `n < NDIRECT`, otherwise
    /// resolved through the (validated) indirect block.
    pub fn raw_inode_addr(&self, inum: Inum, n: usize) -> Result<u32, FsError> {
        let inum = self.iget(inum)?;
        if n < NDIRECT {
            Ok(self.addr(inum, n))
        } else if n < NDIRECT + NINDIRECT {
            let iaddr = self.indirect_block_of(inum)?;
            Ok(self.read_u32(iaddr, n - NDIRECT))
        } else {
            Err(FsError::BlockOutOfRange(n))
        }
    }

    pub fn raw_inode_set_addr(&mut self, inum: Inum, n: usize, val: u32) -> Result<(), FsError> {
        let inum = self.iget(inum)?;
        if n < NDIRECT {
            self.set_addr(inum, n, val);
            Ok(())
        } else if n < NDIRECT + NINDIRECT {
            let iaddr = self.indirect_block_of(inum)?;
            self.write_u32(iaddr, n - NDIRECT, val);
            Ok(())
        } else {
            Err(FsError::BlockOutOfRange(n))
        }
    }

    fn indirect_block_of(&self, inum: Inum) -> Result<u32, FsError> {
        let iaddr = self.addr(inum, NDIRECT);
        if !self.valid_data_block(iaddr) {
            return Err(FsError::InvalidBlock(iaddr));
        }
        Ok(iaddr)
    }

    /// Inode number stored in the entry `name` of the directory at `path`.
    pub fn raw_dirent_get(&mut self, path: &str, name: &str) -> Result<u16, FsError> {
        let (dp, off) = self.find_dirent(path, name)?;
        Ok(self.read_dirent(dp, off)?.inum)
    }

    /// Overwrite the entry's inode number, leaving the name in place.
    pub fn raw_dirent_set(&mut self, path: &str, name: &str, val: u16) -> Result<(), FsError> {
        let (dp, off) = self.find_dirent(path, name)?;
        let mut de = self.read_dirent(dp, off)?;
        de.inum = val;
        self.write_dirent(dp, off, &de)
    }

    /// Zero the entry outright, name included.
    pub fn raw_dirent_delete(&mut self, path: &str, name: &str) -> Result<(), FsError> {
        let (dp, off) = self.find_dirent(path, name)?;
        self.write_dirent(dp, off, &DirEnt::default())
    }

    fn find_dirent(&mut self, path: &str, name: &str) -> Result<(Inum, u32), FsError> {
        let root = self.root();
        let dp = self.ilookup(root, path)?;
        if !self.is_dir(dp) {
            return Err(FsError::NotDir(path.to_string()));
        }
        let (_, off) = self
            .dlookup(dp, name.as_bytes())?
            .ok_or_else(|| FsError::NotFound(name.to_string()))?;
        Ok((dp, off))
    }
}
