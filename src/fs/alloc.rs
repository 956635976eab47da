//! The free-block bitmap: one bit per block across the whole image,
//! set means allocated. Blocks below the data region are pre-marked at
//! image creation and never come back.

use bitvec::prelude::*;
use log::{error, warn};

use crate::error::FsError;

use super::FsImage;

impl FsImage<'_> {
    /// Allocate one data block: take the first clear bit, zero the block,
    /// return its number.
    ///
    /// Running out of blocks is fatal, and so is a first clear bit that
    /// does not name a data block; both leave whatever structural edit
    /// was in progress half-done.
    pub fn balloc(&mut self) -> Result<u32, FsError> {
        let sb = self.superblock();
        let range = sb.bitmap_byte_range();
        let bits = self.bytes()[range.clone()].view_bits::<Lsb0>();
        let nbits = (sb.size as usize).min(bits.len());
        let b = bits[..nbits].first_zero().ok_or(FsError::NoFreeBlocks)? as u32;
        if !self.valid_data_block(b) {
            error!("balloc: {b}: invalid data block number");
            return Err(FsError::CorruptBitmap(b));
        }
        self.bytes_mut()[range].view_bits_mut::<Lsb0>().set(b as usize, true);
        self.block_mut(b).fill(0);
        Ok(b)
    }

    /// Clear the bitmap bit of data block `b`.
    pub fn bfree(&mut self, b: u32) -> Result<(), FsError> {
        let sb = self.superblock();
        if !sb.is_valid_data_block(b) {
            error!("bfree: {b}: invalid data block number");
            return Err(FsError::InvalidBlock(b));
        }
        let range = sb.bitmap_byte_range();
        let bits = self.bytes_mut()[range].view_bits_mut::<Lsb0>();
        if !bits[b as usize] {
            warn!("bfree: {b}: already freed block");
        }
        bits.set(b as usize, false);
        Ok(())
    }

    /// Popcount of the bitmap, i.e. how many blocks are in use.
    pub fn used_blocks(&self) -> u32 {
        let sb = self.superblock();
        let bits = self.bytes()[sb.bitmap_byte_range()].view_bits::<Lsb0>();
        let nbits = (sb.size as usize).min(bits.len());
        bits[..nbits].count_ones() as u32
    }

    /// One raw bitmap bit, by block number.
    pub(crate) fn bitmap_bit(&self, b: u32) -> bool {
        let range = self.superblock().bitmap_byte_range();
        self.bytes()[range].view_bits::<Lsb0>()[b as usize]
    }

    pub(crate) fn set_bitmap_bit(&mut self, b: u32, val: bool) {
        let range = self.superblock().bitmap_byte_range();
        self.bytes_mut()[range].view_bits_mut::<Lsb0>().set(b as usize, val);
    }
}
