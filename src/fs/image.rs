//! The image handle: a borrow of the mapped bytes plus nothing else.

use crate::error::FsError;

use super::{Superblock, BSIZE, ROOT_INUM};

/// A mounted-for-editing view of one file system image.
///
/// The front-end maps the image file and hands the byte view in; every
/// operation mutates those bytes in place. Dropping the handle releases
/// nothing; flushing and unmapping stay with the owner of the mapping.
pub struct FsImage<'m> {
    img: &'m mut [u8],
}

impl<'m> FsImage<'m> {
    /// Wrap an image byte view.
    ///
    /// The only requirement is room for the boot block and the
    /// superblock; nothing else is checked, so that damaged images remain
    /// editable.
    pub fn open(img: &'m mut [u8]) -> Result<FsImage<'m>, FsError> {
        if img.len() < 2 * BSIZE {
            return Err(FsError::ImageTooSmall(img.len()));
        }
        if img.len() % BSIZE != 0 {
            log::debug!("image length {} is not block aligned", img.len());
        }
        Ok(FsImage { img })
    }

    /// The root directory inode.
    pub fn root(&self) -> u32 {
        ROOT_INUM
    }

    pub fn superblock(&self) -> Superblock {
        Superblock::decode(self.block(1))
    }

    pub fn write_superblock(&mut self, sb: &Superblock) {
        sb.encode(self.block_mut(1));
    }

    /// Borrow block `b`. Panics when a corrupted superblock points the
    /// caller beyond the mapped bytes.
    pub(crate) fn block(&self, b: u32) -> &[u8] {
        &self.img[b as usize * BSIZE..(b as usize + 1) * BSIZE]
    }

    pub(crate) fn block_mut(&mut self, b: u32) -> &mut [u8] {
        &mut self.img[b as usize * BSIZE..(b as usize + 1) * BSIZE]
    }

    /// Read the `idx`-th u32 cell of block `b` (indirect blocks, mostly).
    pub(crate) fn read_u32(&self, b: u32, idx: usize) -> u32 {
        let block = self.block(b);
        let mut w = [0u8; 4];
        w.copy_from_slice(&block[idx * 4..idx * 4 + 4]);
        u32::from_le_bytes(w)
    }

    pub(crate) fn write_u32(&mut self, b: u32, idx: usize, val: u32) {
        self.block_mut(b)[idx * 4..idx * 4 + 4].copy_from_slice(&val.to_le_bytes());
    }

    /// Like [`Superblock::is_valid_data_block`], additionally requiring
    /// that the block actually fits in the mapped bytes.
    pub(crate) fn valid_data_block(&self, b: u32) -> bool {
        self.superblock().is_valid_data_block(b)
            && (b as usize + 1) * BSIZE <= self.img.len()
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        self.img
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        self.img
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_tiny_images() {
        let mut img = vec![0u8; BSIZE];
        assert!(matches!(
            FsImage::open(&mut img),
            Err(FsError::ImageTooSmall(_))
        ));
    }

    #[test]
    fn test_superblock_roundtrip() {
        let mut img = vec![0u8; 4 * BSIZE];
        let mut fs = FsImage::open(&mut img).unwrap();
        let sb = Superblock::new(1024, 200, 30);
        fs.write_superblock(&sb);
        assert_eq!(fs.superblock(), sb);
    }

    #[test]
    fn test_u32_cells() {
        let mut img = vec![0u8; 4 * BSIZE];
        let mut fs = FsImage::open(&mut img).unwrap();
        fs.write_u32(3, 127, 0xdead_beef);
        assert_eq!(fs.read_u32(3, 127), 0xdead_beef);
        assert_eq!(fs.read_u32(3, 126), 0);
    }
}
