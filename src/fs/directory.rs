//! Directory bodies: flat sequences of 16-byte entries.

use crate::error::FsError;

use super::{FsImage, Inum, DIRENT_SIZE, DIRSIZ};

/// One directory entry: an inode number and a NUL-padded name.
///
/// A name that uses all 14 bytes carries no terminating NUL. An entry
/// with `inum == 0` is a free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEnt {
    pub inum: u16,
    pub name: [u8; DIRSIZ],
}

impl Default for DirEnt {
    fn default() -> Self {
        DirEnt {
            inum: 0,
            name: [0; DIRSIZ],
        }
    }
}

impl DirEnt {
    /// Build an entry, truncating `name` to 14 bytes and NUL-padding.
    pub fn new(inum: Inum, name: &[u8]) -> Self {
        let mut de = DirEnt {
            inum: inum as u16,
            name: [0; DIRSIZ],
        };
        let len = name.len().min(DIRSIZ);
        de.name[..len].copy_from_slice(&name[..len]);
        de
    }

    pub fn decode(buf: &[u8; DIRENT_SIZE]) -> Self {
        let mut name = [0u8; DIRSIZ];
        name.copy_from_slice(&buf[2..]);
        DirEnt {
            inum: u16::from_le_bytes([buf[0], buf[1]]),
            name,
        }
    }

    pub fn encode(&self) -> [u8; DIRENT_SIZE] {
        let mut buf = [0u8; DIRENT_SIZE];
        buf[..2].copy_from_slice(&self.inum.to_le_bytes());
        buf[2..].copy_from_slice(&self.name);
        buf
    }

    /// The 14-byte name rule: compare until a NUL or the 14th byte,
    /// whichever comes first.
    pub fn name_matches(&self, name: &[u8]) -> bool {
        let n = name.len().min(DIRSIZ);
        if self.name[..n] != name[..n] {
            return false;
        }
        n == DIRSIZ || self.name[n] == 0
    }

    /// The stored name as printable text.
    pub fn name_lossy(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(DIRSIZ);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }
}

impl FsImage<'_> {
    pub(crate) fn read_dirent(&mut self, dp: Inum, off: u32) -> Result<DirEnt, FsError> {
        let mut buf = [0u8; DIRENT_SIZE];
        if self.iread(dp, &mut buf, off)? != DIRENT_SIZE {
            return Err(FsError::Read(format!("inode #{dp}")));
        }
        Ok(DirEnt::decode(&buf))
    }

    pub(crate) fn write_dirent(&mut self, dp: Inum, off: u32, de: &DirEnt) -> Result<(), FsError> {
        if self.iwrite(dp, &de.encode(), off)? != DIRENT_SIZE {
            return Err(FsError::Write(format!("inode #{dp}")));
        }
        Ok(())
    }

    /// Find `name` in directory `dp`. Free slots are skipped. Returns the
    /// entry's inode number and its byte offset inside the directory.
    pub fn dlookup(&mut self, dp: Inum, name: &[u8]) -> Result<Option<(Inum, u32)>, FsError> {
        if !self.is_dir(dp) {
            return Err(FsError::NotDir(format!("inode #{dp}")));
        }
        let size = self.isize(dp);
        let mut off = 0;
        while off < size {
            let de = self.read_dirent(dp, off)?;
            if de.inum != 0 && de.name_matches(name) {
                let ip = self.iget(de.inum as Inum)?;
                return Ok(Some((ip, off)));
            }
            off += DIRENT_SIZE as u32;
        }
        Ok(None)
    }

    /// Insert an entry for `ip` under `name`, reusing the first free slot
    /// or appending at the end. Bumps the target's link count unless the
    /// entry is the directory's own `"."`.
    pub fn daddent(&mut self, dp: Inum, name: &[u8], ip: Inum) -> Result<(), FsError> {
        let size = self.isize(dp);
        let mut off = 0;
        while off < size {
            let de = self.read_dirent(dp, off)?;
            if de.inum == 0 {
                break;
            }
            if de.name_matches(name) {
                return Err(FsError::Exists(String::from_utf8_lossy(name).into_owned()));
            }
            off += DIRENT_SIZE as u32;
        }
        self.write_dirent(dp, off, &DirEnt::new(ip, name))?;
        if name != b"." {
            let nlink = self.nlink(ip);
            self.set_nlink(ip, nlink.wrapping_add(1));
        }
        Ok(())
    }

    /// True when the only live entries are `.` and `..`.
    pub fn demptydir(&mut self, dp: Inum) -> Result<bool, FsError> {
        let size = self.isize(dp);
        let mut nent = 0;
        let mut off = 0;
        while off < size {
            if self.read_dirent(dp, off)?.inum != 0 {
                nent += 1;
            }
            off += DIRENT_SIZE as u32;
        }
        Ok(nent == 2)
    }

    /// Repoint `cip`'s `..` entry at `pip`, after a directory move.
    pub fn dmkparlink(&mut self, pip: Inum, cip: Inum) -> Result<(), FsError> {
        if !self.is_dir(pip) {
            return Err(FsError::NotDir(format!("inode #{pip}")));
        }
        if !self.is_dir(cip) {
            return Err(FsError::NotDir(format!("inode #{cip}")));
        }
        let (_, off) = self
            .dlookup(cip, b"..")?
            .ok_or_else(|| FsError::NotFound("..".to_string()))?;
        self.write_dirent(cip, off, &DirEnt::new(pip, b".."))?;
        let nlink = self.nlink(pip);
        self.set_nlink(pip, nlink.wrapping_add(1));
        Ok(())
    }
}
