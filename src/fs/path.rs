//! Path resolution over slash-separated ASCII paths.

use crate::error::FsError;

use super::{DirEnt, FileKind, FsImage, Inum, DIRSIZ};

fn lossy(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

/// Split off the leading component of `path`.
///
/// Leading separators are skipped, the component is truncated to 14
/// bytes, and the unconsumed remainder (which may begin with further
/// separators) is returned alongside it. An empty component means the
/// path was empty or separators only.
pub fn skipelem(path: &[u8]) -> (&[u8], &[u8]) {
    let mut i = 0;
    while i < path.len() && path[i] == b'/' {
        i += 1;
    }
    let start = i;
    while i < path.len() && path[i] != b'/' {
        i += 1;
    }
    let len = (i - start).min(DIRSIZ);
    (&path[start..start + len], &path[i..])
}

/// Split `path` into its directory prefix and its final component.
///
/// The prefix keeps the separators in front of the final component, so
/// it resolves to the same directory the full path walks through. A path
/// that ends in separators yields an empty basename.
pub fn splitpath(path: &str) -> (&str, &str) {
    let bytes = path.as_bytes();
    let mut i = 0;
    let mut start = 0;
    while i < bytes.len() {
        while i < bytes.len() && bytes[i] == b'/' {
            i += 1;
        }
        start = i;
        while i < bytes.len() && bytes[i] != b'/' {
            i += 1;
        }
    }
    (&path[..start], &path[start..])
}

impl FsImage<'_> {
    /// Walk `path` from directory `rp` down to an inode.
    ///
    /// An empty path (or separators only) names `rp` itself. Every
    /// component but the last must be a directory.
    pub fn ilookup(&mut self, rp: Inum, path: &str) -> Result<Inum, FsError> {
        let mut rp = rp;
        let mut path = path.as_bytes();
        loop {
            if !self.is_dir(rp) {
                return Err(FsError::NotDir(format!("inode #{rp}")));
            }
            let (name, rest) = skipelem(path);
            if name.is_empty() {
                return Ok(rp);
            }
            let (ip, _) = self
                .dlookup(rp, name)?
                .ok_or_else(|| FsError::NotFound(lossy(name)))?;
            if rest.is_empty() {
                return Ok(ip);
            }
            rp = ip;
            path = rest;
        }
    }

    /// Create the file or directory named by `path` under `rp`.
    ///
    /// Intermediate components must already exist; the final one must
    /// not. A new directory is seeded with its `.` and `..` entries.
    pub fn icreat(&mut self, rp: Inum, path: &str, kind: FileKind) -> Result<Inum, FsError> {
        let mut rp = rp;
        let mut path = path.as_bytes();
        loop {
            if !self.is_dir(rp) {
                return Err(FsError::NotDir(format!("inode #{rp}")));
            }
            let (name, rest) = skipelem(path);
            if name.is_empty() {
                return Err(FsError::EmptyName);
            }
            let found = self.dlookup(rp, name)?;
            if rest.is_empty() {
                if found.is_some() {
                    return Err(FsError::Exists(lossy(name)));
                }
                let ip = self.ialloc(kind)?;
                self.daddent(rp, name, ip)?;
                if kind == FileKind::Directory {
                    self.daddent(ip, b".", ip)?;
                    self.daddent(ip, b"..", rp)?;
                }
                return Ok(ip);
            }
            match found {
                Some((ip, _)) if self.is_dir(ip) => {
                    rp = ip;
                    path = rest;
                }
                _ => return Err(FsError::NotFound(lossy(name))),
            }
        }
    }

    /// Remove the directory entry named by `path` and drop the target's
    /// link count, freeing the inode and its blocks at zero.
    pub fn iunlink(&mut self, rp: Inum, path: &str) -> Result<(), FsError> {
        let mut rp = rp;
        let mut path = path.as_bytes();
        loop {
            if !self.is_dir(rp) {
                return Err(FsError::NotDir(format!("inode #{rp}")));
            }
            let (name, rest) = skipelem(path);
            if name.is_empty() {
                return Err(FsError::EmptyName);
            }
            let Some((ip, off)) = self.dlookup(rp, name)? else {
                return Err(FsError::NotFound(lossy(name)));
            };
            if rest.is_empty() {
                if name == b"." || name == b".." {
                    return Err(FsError::UnlinkDots);
                }
                // scrub the whole entry so the stale name is gone too
                self.write_dirent(rp, off, &DirEnt::default())?;
                if self.is_dir(ip) {
                    if let Some((parent, _)) = self.dlookup(ip, b"..")? {
                        if parent == rp {
                            let n = self.nlink(rp);
                            self.set_nlink(rp, n.wrapping_sub(1));
                        }
                    }
                }
                let n = self.nlink(ip).wrapping_sub(1);
                self.set_nlink(ip, n);
                if n == 0 {
                    if !self.is_dev(ip) {
                        self.itruncate(ip, 0)?;
                    }
                    self.ifree(ip)?;
                }
                return Ok(());
            }
            if !self.is_dir(ip) {
                return Err(FsError::NotDir(lossy(name)));
            }
            rp = ip;
            path = rest;
        }
    }
}
