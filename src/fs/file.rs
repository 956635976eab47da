//! File-body access: logical-to-physical block mapping and the byte-range
//! read, write and truncate primitives built on it.

use log::{debug, error};

use crate::error::FsError;

use super::{FsImage, Inum, BSIZE, MAXFILESIZE, NDIRECT, NINDIRECT};

impl FsImage<'_> {
    /// Physical block backing logical block `n` of the file, allocating
    /// on demand in both the direct and the indirect range.
    ///
    /// Any call may therefore mutate the bitmap and the inode, including
    /// calls made on behalf of a read; `iread` clips to the file size
    /// first so reads never allocate in practice.
    pub fn bmap(&mut self, ip: Inum, n: usize) -> Result<u32, FsError> {
        if n < NDIRECT {
            let mut addr = self.addr(ip, n);
            if addr == 0 {
                addr = self.balloc()?;
                self.set_addr(ip, n, addr);
            }
            return Ok(addr);
        }
        let k = n - NDIRECT;
        if k >= NINDIRECT {
            return Err(FsError::BlockOutOfRange(n));
        }
        let mut iaddr = self.addr(ip, NDIRECT);
        if iaddr == 0 {
            iaddr = self.balloc()?;
            self.set_addr(ip, NDIRECT, iaddr);
        }
        let mut addr = self.read_u32(iaddr, k);
        if addr == 0 {
            addr = self.balloc()?;
            self.write_u32(iaddr, k, addr);
        }
        Ok(addr)
    }

    /// Read up to `buf.len()` bytes at `off`, clipped to the file size.
    /// Returns how many bytes landed in `buf`.
    pub fn iread(&mut self, ip: Inum, buf: &mut [u8], off: u32) -> Result<usize, FsError> {
        if self.is_dev(ip) {
            return Err(FsError::DeviceIo);
        }
        let size = self.isize(ip);
        if off > size || off as u64 + buf.len() as u64 > u32::MAX as u64 {
            return Err(FsError::BadOffset);
        }
        let n = buf.len().min((size - off) as usize);
        let mut t = 0;
        let mut off = off as usize;
        while t < n {
            let b = self.bmap(ip, off / BSIZE)?;
            if !self.valid_data_block(b) {
                error!("iread: {b}: invalid data block");
                break;
            }
            let m = (n - t).min(BSIZE - off % BSIZE);
            buf[t..t + m].copy_from_slice(&self.block(b)[off % BSIZE..off % BSIZE + m]);
            t += m;
            off += m;
        }
        Ok(t)
    }

    /// Write `buf` at `off`, growing the file as needed up to the
    /// direct-plus-indirect maximum. Returns how many bytes were stored.
    pub fn iwrite(&mut self, ip: Inum, buf: &[u8], off: u32) -> Result<usize, FsError> {
        if self.is_dev(ip) {
            return Err(FsError::DeviceIo);
        }
        let size = self.isize(ip);
        if off > size {
            return Err(FsError::BadOffset);
        }
        if off as u64 + buf.len() as u64 > MAXFILESIZE as u64 {
            return Err(FsError::FileTooLarge);
        }
        let n = buf.len();
        let mut t = 0;
        let mut off = off as usize;
        while t < n {
            let b = self.bmap(ip, off / BSIZE)?;
            if !self.valid_data_block(b) {
                error!("iwrite: {b}: invalid data block");
                break;
            }
            let m = (n - t).min(BSIZE - off % BSIZE);
            self.block_mut(b)[off % BSIZE..off % BSIZE + m].copy_from_slice(&buf[t..t + m]);
            t += m;
            off += m;
        }
        if t > 0 && off as u32 > size {
            self.set_isize(ip, off as u32);
        }
        Ok(t)
    }

    /// Resize the file to `new_size`, freeing blocks on shrink and
    /// zero-filling on growth.
    pub fn itruncate(&mut self, ip: Inum, new_size: u32) -> Result<(), FsError> {
        if self.is_dev(ip) {
            return Err(FsError::DeviceIo);
        }
        if new_size > MAXFILESIZE {
            return Err(FsError::FileTooLarge);
        }
        let size = self.isize(ip);
        if new_size < size {
            let n = size.div_ceil(BSIZE as u32) as usize; // blocks in use
            let k = new_size.div_ceil(BSIZE as u32) as usize; // blocks to keep
            for i in k.min(NDIRECT)..n.min(NDIRECT) {
                let addr = self.addr(ip, i);
                self.bfree(addr).ok();
                self.set_addr(ip, i, 0);
            }
            if n > NDIRECT {
                let iaddr = self.addr(ip, NDIRECT);
                if iaddr == 0 {
                    debug!("itruncate: inode #{ip} has no indirect block");
                } else {
                    let ni = n - NDIRECT;
                    let ki = k.saturating_sub(NDIRECT);
                    for i in ki..ni {
                        let addr = self.read_u32(iaddr, i);
                        self.bfree(addr).ok();
                        self.write_u32(iaddr, i, 0);
                    }
                    if ki == 0 {
                        self.bfree(iaddr).ok();
                        self.set_addr(ip, NDIRECT, 0);
                    }
                }
            }
        } else {
            let n = (new_size - size) as usize; // bytes to fill
            let mut t = 0;
            let mut off = size as usize;
            while t < n {
                let b = self.bmap(ip, off / BSIZE)?;
                if !self.valid_data_block(b) {
                    error!("itruncate: {b}: invalid data block");
                    break;
                }
                let m = (n - t).min(BSIZE - off % BSIZE);
                self.block_mut(b)[off % BSIZE..off % BSIZE + m].fill(0);
                t += m;
                off += m;
            }
        }
        self.set_isize(ip, new_size);
        Ok(())
    }
}
