//! The user-facing operations: everything `opfs` can do to an image.
//!
//! These compose the allocator, inode I/O and path layers and keep the
//! file system invariants intact. Streaming commands copy in
//! [`BUFSIZE`](super::BUFSIZE) chunks and take their peer stream as an
//! argument, so the library never touches process stdio itself.

use std::io::{Read, Write};

use crate::error::FsError;

use super::{
    splitpath, typename, FileKind, FsImage, DIRENT_SIZE, MAXFILESIZE, NDIRECT, NINDIRECT,
};
use super::{BSIZE, BUFSIZE};

impl FsImage<'_> {
    /// Print the image geometry and usage summary.
    pub fn diskinfo(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        let sb = self.superblock();
        let ni = sb.ninode_blocks();
        let nm = sb.nbitmap_blocks();
        let end = |start: u32, n: u32| start as i64 + n as i64 - 1;

        writeln!(out, "magic: {:#010x}", sb.magic)?;
        writeln!(
            out,
            "total blocks: {} ({} bytes)",
            sb.size,
            sb.size as u64 * BSIZE as u64
        )?;
        writeln!(
            out,
            "log blocks: #{}-#{} ({} blocks)",
            sb.logstart,
            end(sb.logstart, sb.nlog),
            sb.nlog
        )?;
        writeln!(
            out,
            "inode blocks: #{}-#{} ({} blocks, {} inodes)",
            sb.inodestart,
            end(sb.inodestart, ni),
            ni,
            sb.ninodes
        )?;
        writeln!(
            out,
            "bitmap blocks: #{}-#{} ({} blocks)",
            sb.bmapstart,
            end(sb.bmapstart, nm),
            nm
        )?;
        writeln!(
            out,
            "data blocks: #{}-#{} ({} blocks)",
            sb.first_data_block(),
            end(sb.first_data_block(), sb.nblocks),
            sb.nblocks
        )?;
        writeln!(out, "maximum file size (bytes): {MAXFILESIZE}")?;
        writeln!(out, "# of used blocks: {}", self.used_blocks())?;

        let (mut n_dirs, mut n_files, mut n_devs) = (0, 0, 0);
        for inum in 1..sb.ninodes {
            match FileKind::from_raw(self.itype(inum)) {
                Some(FileKind::Directory) => n_dirs += 1,
                Some(FileKind::RegularFile) => n_files += 1,
                Some(FileKind::Device) => n_devs += 1,
                _ => {}
            }
        }
        writeln!(
            out,
            "# of used inodes: {} (dirs: {n_dirs}, files: {n_files}, devs: {n_devs})",
            n_dirs + n_files + n_devs
        )?;
        Ok(())
    }

    /// Print one inode's metadata and its data block numbers.
    pub fn info(&mut self, path: &str, out: &mut impl Write) -> anyhow::Result<()> {
        let root = self.root();
        let ip = self.ilookup(root, path)?;
        let raw = self.itype(ip);
        writeln!(out, "inode: {ip}")?;
        writeln!(out, "type: {raw} ({})", typename(raw))?;
        writeln!(out, "nlink: {}", self.nlink(ip))?;
        writeln!(out, "size: {}", self.isize(ip))?;
        if self.isize(ip) > 0 {
            write!(out, "data blocks:")?;
            let mut count = 0;
            for i in 0..NDIRECT {
                let addr = self.addr(ip, i);
                if addr == 0 {
                    break;
                }
                write!(out, " {addr}")?;
                count += 1;
            }
            let iaddr = self.addr(ip, NDIRECT);
            if iaddr != 0 {
                write!(out, " {iaddr}")?;
                count += 1;
                for k in 0..NINDIRECT {
                    let addr = self.read_u32(iaddr, k);
                    if addr == 0 {
                        break;
                    }
                    write!(out, " {addr}")?;
                    count += 1;
                }
            }
            writeln!(out)?;
            writeln!(out, "# of data blocks: {count}")?;
        }
        Ok(())
    }

    /// One line per live entry of a directory, or one line for a file:
    /// `name type inum size`.
    pub fn ls(&mut self, path: &str, out: &mut impl Write) -> anyhow::Result<()> {
        let root = self.root();
        let ip = self.ilookup(root, path)?;
        if self.is_dir(ip) {
            let size = self.isize(ip);
            let mut off = 0;
            while off < size {
                let de = self.read_dirent(ip, off)?;
                off += DIRENT_SIZE as u32;
                if de.inum == 0 {
                    continue;
                }
                let p = self.iget(de.inum as u32)?;
                writeln!(
                    out,
                    "{} {} {} {}",
                    de.name_lossy(),
                    self.itype(p),
                    de.inum,
                    self.isize(p)
                )?;
            }
        } else {
            writeln!(out, "{} {} {} {}", path, self.itype(ip), ip, self.isize(ip))?;
        }
        Ok(())
    }

    /// Stream a file's bytes out of the image.
    pub fn get(&mut self, path: &str, out: &mut impl Write) -> anyhow::Result<()> {
        let root = self.root();
        let ip = self.ilookup(root, path)?;
        let size = self.isize(ip);
        let mut buf = [0u8; BUFSIZE];
        let mut off = 0u32;
        while off < size {
            let n = self.iread(ip, &mut buf, off)?;
            if n == 0 {
                return Err(FsError::Read(path.to_string()).into());
            }
            out.write_all(&buf[..n])?;
            off += n as u32;
        }
        Ok(())
    }

    /// Stream bytes into a regular file at `path`, creating it if needed
    /// and truncating it otherwise. Stops at the first short read.
    pub fn put(&mut self, path: &str, input: &mut impl Read) -> anyhow::Result<()> {
        let root = self.root();
        let ip = match self.ilookup(root, path) {
            Ok(ip) => {
                if !self.is_file(ip) {
                    return Err(FsError::NotRegular(path.to_string()).into());
                }
                self.itruncate(ip, 0)?;
                ip
            }
            Err(_) => self.icreat(root, path, FileKind::RegularFile)?,
        };
        let mut buf = [0u8; BUFSIZE];
        let mut off = 0u32;
        loop {
            let n = input.read(&mut buf)?;
            if n == 0 {
                break;
            }
            if self.iwrite(ip, &buf[..n], off)? != n {
                return Err(FsError::Write(path.to_string()).into());
            }
            off += n as u32;
            if n < BUFSIZE {
                break;
            }
        }
        Ok(())
    }

    /// Unlink a non-directory.
    pub fn rm(&mut self, path: &str) -> anyhow::Result<()> {
        let root = self.root();
        let ip = self.ilookup(root, path)?;
        if self.is_dir(ip) {
            return Err(FsError::IsDir(path.to_string()).into());
        }
        self.iunlink(root, path)?;
        Ok(())
    }

    /// Copy a regular file's contents to a new or truncated destination.
    pub fn cp(&mut self, spath: &str, dpath: &str) -> anyhow::Result<()> {
        let root = self.root();
        let sip = self.ilookup(root, spath)?;
        if !self.is_file(sip) {
            return Err(FsError::NotRegular(spath.to_string()).into());
        }

        let dip = match self.ilookup(root, dpath) {
            Err(_) => {
                let (ddir, dname) = splitpath(dpath);
                if dname.is_empty() {
                    return Err(FsError::NotFound(dpath.to_string()).into());
                }
                let ddip = self
                    .ilookup(root, ddir)
                    .map_err(|_| FsError::NotFound(ddir.to_string()))?;
                if !self.is_dir(ddip) {
                    return Err(FsError::NotDir(ddir.to_string()).into());
                }
                self.icreat(ddip, dname, FileKind::RegularFile)?
            }
            Ok(dip) => {
                if self.is_dir(dip) {
                    let (_, sname) = splitpath(spath);
                    self.icreat(dip, sname, FileKind::RegularFile)?
                } else if self.is_file(dip) {
                    self.itruncate(dip, 0)?;
                    dip
                } else {
                    return Err(FsError::Device(dpath.to_string()).into());
                }
            }
        };

        let size = self.isize(sip);
        let mut buf = [0u8; BUFSIZE];
        let mut off = 0u32;
        while off < size {
            let n = self.iread(sip, &mut buf, off)?;
            if n == 0 {
                return Err(FsError::Read(spath.to_string()).into());
            }
            if self.iwrite(dip, &buf[..n], off)? != n {
                return Err(FsError::Write(dpath.to_string()).into());
            }
            off += n as u32;
        }
        Ok(())
    }

    /// Move `spath` to `dpath`, replacing a same-typed destination
    /// (directories only when empty) and fixing a moved directory's `..`.
    pub fn mv(&mut self, spath: &str, dpath: &str) -> anyhow::Result<()> {
        let root = self.root();
        let sip = self.ilookup(root, spath)?;
        if sip == root {
            return Err(FsError::RootMove.into());
        }

        let (ddir, dname) = splitpath(dpath);
        match self.ilookup(root, dpath) {
            Ok(dip) if self.is_dir(dip) => {
                let (_, sname) = splitpath(spath);
                match self.dlookup(dip, sname.as_bytes())? {
                    Some((ip, _)) if self.is_dir(ip) => {
                        // replace an empty directory
                        if !self.is_dir(sip) {
                            return Err(FsError::NotDir(spath.to_string()).into());
                        }
                        if !self.demptydir(ip)? {
                            return Err(FsError::DirNotEmpty(format!("{dpath}/{sname}")).into());
                        }
                        self.iunlink(dip, sname)?;
                        self.daddent(dip, sname.as_bytes(), sip)?;
                        self.iunlink(root, spath)?;
                        self.dmkparlink(dip, sip)?;
                    }
                    Some((ip, _)) if self.is_file(ip) => {
                        // replace an existing file
                        if !self.is_file(sip) {
                            return Err(FsError::NotRegular(spath.to_string()).into());
                        }
                        self.iunlink(dip, sname)?;
                        self.daddent(dip, sname.as_bytes(), sip)?;
                        self.iunlink(root, spath)?;
                    }
                    Some(_) => return Err(FsError::Device(dpath.to_string()).into()),
                    None => {
                        self.daddent(dip, sname.as_bytes(), sip)?;
                        self.iunlink(root, spath)?;
                        if self.is_dir(sip) {
                            self.dmkparlink(dip, sip)?;
                        }
                    }
                }
            }
            Ok(dip) if self.is_file(dip) => {
                if !self.is_file(sip) {
                    return Err(FsError::NotRegular(spath.to_string()).into());
                }
                self.iunlink(root, dpath)?;
                let ip = self.ilookup(root, ddir)?;
                if !self.is_dir(ip) {
                    return Err(FsError::NotDir(ddir.to_string()).into());
                }
                self.daddent(ip, dname.as_bytes(), sip)?;
                self.iunlink(root, spath)?;
            }
            Ok(_) => return Err(FsError::Device(dpath.to_string()).into()),
            Err(_) => {
                if dname.is_empty() {
                    return Err(FsError::NotFound(dpath.to_string()).into());
                }
                let ip = self
                    .ilookup(root, ddir)
                    .map_err(|_| FsError::NotFound(ddir.to_string()))?;
                if !self.is_dir(ip) {
                    return Err(FsError::NotDir(ddir.to_string()).into());
                }
                self.daddent(ip, dname.as_bytes(), sip)?;
                self.iunlink(root, spath)?;
                if self.is_dir(sip) {
                    self.dmkparlink(ip, sip)?;
                }
            }
        }
        Ok(())
    }

    /// Hard-link a regular file under a new name.
    pub fn ln(&mut self, spath: &str, dpath: &str) -> anyhow::Result<()> {
        let root = self.root();
        let sip = self.ilookup(root, spath)?;
        if !self.is_file(sip) {
            return Err(FsError::NotRegular(spath.to_string()).into());
        }

        let (ddir, dname) = splitpath(dpath);
        let mut dip = self
            .ilookup(root, ddir)
            .map_err(|_| FsError::NotFound(ddir.to_string()))?;
        if !self.is_dir(dip) {
            return Err(FsError::NotDir(ddir.to_string()).into());
        }
        let mut name = dname;
        if dname.is_empty() {
            name = splitpath(spath).1;
            if self.dlookup(dip, name.as_bytes())?.is_some() {
                return Err(FsError::Exists(format!("{ddir}{name}")).into());
            }
        } else if let Some((ip, _)) = self.dlookup(dip, dname.as_bytes())? {
            if !self.is_dir(ip) {
                return Err(FsError::Exists(format!("{ddir}{dname}")).into());
            }
            // destination is a directory: link the source's basename inside
            name = splitpath(spath).1;
            dip = ip;
        }
        self.daddent(dip, name.as_bytes(), sip)?;
        Ok(())
    }

    /// Create a directory; the path must not already exist.
    pub fn mkdir(&mut self, path: &str) -> anyhow::Result<()> {
        let root = self.root();
        if self.ilookup(root, path).is_ok() {
            return Err(FsError::Exists(path.to_string()).into());
        }
        self.icreat(root, path, FileKind::Directory)?;
        Ok(())
    }

    /// Remove an empty directory.
    pub fn rmdir(&mut self, path: &str) -> anyhow::Result<()> {
        let root = self.root();
        let ip = self.ilookup(root, path)?;
        if !self.is_dir(ip) {
            return Err(FsError::NotDir(path.to_string()).into());
        }
        if !self.demptydir(ip)? {
            return Err(FsError::DirNotEmpty(path.to_string()).into());
        }
        self.iunlink(root, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{Inum, ROOT_INUM};
    use crate::mkfs::tests::fresh_image;
    use std::collections::BTreeSet;

    fn ls_names(fs: &mut FsImage, path: &str) -> Vec<String> {
        let mut out = Vec::new();
        fs.ls(path, &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| l.split(' ').next().unwrap().to_string())
            .collect()
    }

    fn get_bytes(fs: &mut FsImage, path: &str) -> Vec<u8> {
        let mut out = Vec::new();
        fs.get(path, &mut out).unwrap();
        out
    }

    /// Blocks referenced by live inodes, indirect blocks included.
    fn referenced_blocks(fs: &mut FsImage) -> BTreeSet<u32> {
        let sb = fs.superblock();
        let mut blocks = BTreeSet::new();
        for inum in 1..sb.ninodes {
            if fs.itype(inum) == 0 {
                continue;
            }
            for i in 0..NDIRECT {
                let addr = fs.addr(inum, i);
                if addr != 0 {
                    blocks.insert(addr);
                }
            }
            let iaddr = fs.addr(inum, NDIRECT);
            if iaddr != 0 {
                blocks.insert(iaddr);
                for k in 0..NINDIRECT {
                    let addr = fs.read_u32(iaddr, k);
                    if addr != 0 {
                        blocks.insert(addr);
                    }
                }
            }
        }
        blocks
    }

    /// The two structural invariants every reachable image must satisfy:
    /// the bitmap mirrors the set of referenced blocks, and every link
    /// count equals the number of entries pointing at the inode (its own
    /// "." excepted).
    fn assert_consistent(fs: &mut FsImage) {
        let sb = fs.superblock();
        let refs = referenced_blocks(fs);
        assert_eq!(
            fs.used_blocks(),
            sb.first_data_block() + refs.len() as u32,
            "bitmap popcount must match reserved prefix + referenced blocks"
        );
        for &b in &refs {
            assert!(fs.bitmap_bit(b), "referenced block {b} must be marked used");
        }

        let mut counted = vec![0u16; sb.ninodes as usize];
        for dp in 1..sb.ninodes {
            if !fs.is_dir(dp) {
                continue;
            }
            let size = fs.isize(dp);
            let mut off = 0;
            while off < size {
                let de = fs.read_dirent(dp, off).unwrap();
                off += DIRENT_SIZE as u32;
                if de.inum == 0 || (de.name_matches(b".") && de.inum as Inum == dp) {
                    continue;
                }
                counted[de.inum as usize] += 1;
            }
        }
        for inum in 1..sb.ninodes {
            if fs.itype(inum) != 0 {
                assert_eq!(
                    fs.nlink(inum),
                    counted[inum as usize],
                    "nlink of inode #{inum}"
                );
            }
        }
    }

    #[test]
    fn test_diskinfo_reports_the_newfs_parameters() {
        let mut img = fresh_image(1024, 200, 30);
        let mut fs = FsImage::open(&mut img).unwrap();
        let mut out = Vec::new();
        fs.diskinfo(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("magic: 0x10203040"));
        assert!(text.contains("total blocks: 1024 (524288 bytes)"));
        assert!(text.contains("log blocks: #2-#31 (30 blocks)"));
        assert!(text.contains("inode blocks: #32-#57 (26 blocks, 200 inodes)"));
        assert!(text.contains("bitmap blocks: #58-#58 (1 blocks)"));
        assert!(text.contains("data blocks: #59-#1023 (965 blocks)"));
        assert!(text.contains(&format!("maximum file size (bytes): {MAXFILESIZE}")));
        // reserved prefix + the root directory's block; root is the only inode
        assert!(text.contains("# of used blocks: 60"));
        assert!(text.contains("# of used inodes: 1 (dirs: 1, files: 0, devs: 0)"));
    }

    #[test]
    fn test_put_get_roundtrip() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        let data: Vec<u8> = (0..4321u32).map(|i| (i * 7 % 256) as u8).collect();
        fs.put("/x", &mut &data[..]).unwrap();
        assert_eq!(get_bytes(&mut fs, "/x"), data);
        // a second put truncates and replaces
        fs.put("/x", &mut &b"short"[..]).unwrap();
        assert_eq!(get_bytes(&mut fs, "/x"), b"short");
        assert_consistent(&mut fs);
    }

    #[test]
    fn test_put_refuses_directories() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        fs.mkdir("/d").unwrap();
        assert!(fs.put("/d", &mut &b"x"[..]).is_err());
    }

    #[test]
    fn test_put_at_the_size_limit() {
        let mut img = fresh_image(1024, 16, 2);
        let mut fs = FsImage::open(&mut img).unwrap();
        let exact = vec![0x5au8; MAXFILESIZE as usize];
        fs.put("/big", &mut &exact[..]).unwrap();
        let big = fs.ilookup(ROOT_INUM, "/big").unwrap();
        assert_eq!(fs.isize(big), MAXFILESIZE);

        let over = vec![0x5au8; MAXFILESIZE as usize + 1];
        assert!(fs.put("/big", &mut &over[..]).is_err());
    }

    #[test]
    fn test_ls_directory_and_file() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        fs.mkdir("/d").unwrap();
        fs.put("/d/f", &mut &b"abc"[..]).unwrap();
        assert_eq!(ls_names(&mut fs, "/d"), vec![".", "..", "f"]);
        let mut out = Vec::new();
        fs.ls("/d/f", &mut out).unwrap();
        let line = String::from_utf8(out).unwrap();
        let f = fs.ilookup(ROOT_INUM, "/d/f").unwrap();
        assert_eq!(line, format!("/d/f 2 {f} 3\n"));
    }

    #[test]
    fn test_rm_refuses_directories_and_frees_files() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        fs.mkdir("/d").unwrap();
        assert!(fs.rm("/d").is_err());
        fs.put("/f", &mut &b"data"[..]).unwrap();
        fs.rm("/f").unwrap();
        assert!(fs.ilookup(ROOT_INUM, "/f").is_err());
        assert!(!ls_names(&mut fs, "/").contains(&"f".to_string()));
        assert_consistent(&mut fs);
    }

    #[test]
    fn test_cp_then_rm_keeps_the_copy() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        fs.put("/x", &mut &b"hello"[..]).unwrap();
        fs.cp("/x", "/y").unwrap();
        fs.rm("/x").unwrap();
        assert_eq!(get_bytes(&mut fs, "/y"), b"hello");
        let y = fs.ilookup(ROOT_INUM, "/y").unwrap();
        assert_eq!(fs.nlink(y), 1);
        assert_consistent(&mut fs);
    }

    #[test]
    fn test_cp_into_directory_and_trailing_slash() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        fs.mkdir("/d").unwrap();
        fs.put("/x", &mut &b"payload"[..]).unwrap();
        fs.cp("/x", "/d").unwrap();
        assert_eq!(get_bytes(&mut fs, "/d/x"), b"payload");
        // a trailing slash names the directory too
        fs.mkdir("/e").unwrap();
        fs.cp("/x", "/e/").unwrap();
        assert_eq!(get_bytes(&mut fs, "/e/x"), b"payload");
        assert_consistent(&mut fs);
    }

    #[test]
    fn test_cp_overwrites_existing_file() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        fs.put("/x", &mut &b"new"[..]).unwrap();
        fs.put("/y", &mut &b"old contents, longer"[..]).unwrap();
        fs.cp("/x", "/y").unwrap();
        assert_eq!(get_bytes(&mut fs, "/y"), b"new");
        assert_consistent(&mut fs);
    }

    #[test]
    fn test_cp_rejects_directories_and_missing_parents() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        fs.mkdir("/d").unwrap();
        fs.put("/x", &mut &b"z"[..]).unwrap();
        assert!(fs.cp("/d", "/y").is_err());
        assert!(fs.cp("/x", "/nodir/y").is_err());
    }

    #[test]
    fn test_ln_then_rm_keeps_contents() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        fs.put("/a", &mut &b"linked bytes"[..]).unwrap();
        fs.ln("/a", "/b").unwrap();
        let b = fs.ilookup(ROOT_INUM, "/b").unwrap();
        assert_eq!(fs.nlink(b), 2);
        fs.rm("/a").unwrap();
        assert_eq!(get_bytes(&mut fs, "/b"), b"linked bytes");
        assert_eq!(fs.nlink(b), 1);
        assert_consistent(&mut fs);
    }

    #[test]
    fn test_ln_into_directory_and_collisions() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        fs.mkdir("/d").unwrap();
        fs.put("/a", &mut &b"x"[..]).unwrap();
        fs.ln("/a", "/d").unwrap();
        let a = fs.ilookup(ROOT_INUM, "/a").unwrap();
        assert_eq!(fs.ilookup(ROOT_INUM, "/d/a").unwrap(), a);
        // a second link under the same name collides
        assert!(fs.ln("/a", "/d/a").is_err());
        // directories cannot be hard-linked
        assert!(fs.ln("/d", "/e").is_err());
        assert_consistent(&mut fs);
    }

    #[test]
    fn test_mkdir_link_accounting() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        let before = fs.nlink(ROOT_INUM);
        fs.mkdir("/d").unwrap();
        // each subdirectory adds two links: its entry in the parent (on
        // the child) and its ".." (on the parent)
        let d = fs.ilookup(ROOT_INUM, "/d").unwrap();
        assert_eq!(fs.nlink(d), 1);
        assert_eq!(fs.nlink(ROOT_INUM), before + 1);
        fs.mkdir("/e").unwrap();
        assert_eq!(fs.nlink(ROOT_INUM), before + 2);
        fs.mkdir("/d/sub").unwrap();
        assert_eq!(fs.nlink(d), 2);
        assert!(fs.mkdir("/d").is_err());
        assert_consistent(&mut fs);
    }

    #[test]
    fn test_mv_renames_and_fixes_dotdot() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        fs.mkdir("/d").unwrap();
        fs.mkdir("/d/e").unwrap();
        fs.mv("/d", "/f").unwrap();
        let names = ls_names(&mut fs, "/");
        assert!(names.contains(&"f".to_string()));
        assert!(!names.contains(&"d".to_string()));
        assert_eq!(ls_names(&mut fs, "/f"), vec![".", "..", "e"]);
        assert_eq!(fs.ilookup(ROOT_INUM, "/f/..").unwrap(), ROOT_INUM);
        assert_consistent(&mut fs);
    }

    #[test]
    fn test_mv_directory_under_new_parent() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        fs.mkdir("/a").unwrap();
        fs.mkdir("/b").unwrap();
        let a = fs.ilookup(ROOT_INUM, "/a").unwrap();
        let b = fs.ilookup(ROOT_INUM, "/b").unwrap();
        let root_links = fs.nlink(ROOT_INUM);
        let b_links = fs.nlink(b);
        fs.mv("/a", "/b").unwrap();
        assert_eq!(fs.ilookup(ROOT_INUM, "/b/a").unwrap(), a);
        assert_eq!(fs.ilookup(ROOT_INUM, "/b/a/..").unwrap(), b);
        // the moved directory's ".." migrated from root to the new parent
        assert_eq!(fs.nlink(ROOT_INUM), root_links - 1);
        assert_eq!(fs.nlink(b), b_links + 1);
        assert_consistent(&mut fs);
    }

    #[test]
    fn test_mv_replaces_file_and_empty_directory() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        fs.put("/x", &mut &b"mine"[..]).unwrap();
        fs.put("/y", &mut &b"doomed"[..]).unwrap();
        let y = fs.ilookup(ROOT_INUM, "/y").unwrap();
        fs.mv("/x", "/y").unwrap();
        assert_eq!(fs.itype(y), 0);
        assert_eq!(get_bytes(&mut fs, "/y"), b"mine");
        assert!(fs.ilookup(ROOT_INUM, "/x").is_err());

        fs.mkdir("/d").unwrap();
        fs.mkdir("/t").unwrap();
        fs.mkdir("/t/d").unwrap();
        fs.mv("/d", "/t").unwrap();
        assert_eq!(fs.ilookup(ROOT_INUM, "/t/d/..").unwrap(), fs.ilookup(ROOT_INUM, "/t").unwrap());
        assert_consistent(&mut fs);
    }

    #[test]
    fn test_mv_rejects_nonempty_destination_directory() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        fs.mkdir("/src").unwrap();
        fs.put("/src/f", &mut &b"1"[..]).unwrap();
        fs.mkdir("/dst").unwrap();
        fs.mkdir("/dst/src").unwrap();
        fs.put("/dst/src/g", &mut &b"2"[..]).unwrap();

        assert!(fs.mv("/src", "/dst").is_err());
        // nothing moved
        assert_eq!(get_bytes(&mut fs, "/src/f"), b"1");
        assert_eq!(get_bytes(&mut fs, "/dst/src/g"), b"2");
        assert_consistent(&mut fs);
    }

    #[test]
    fn test_mv_rejects_the_root() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        fs.mkdir("/d").unwrap();
        assert!(fs.mv("/", "/d").is_err());
    }

    #[test]
    fn test_rmdir_only_takes_empty_directories() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        fs.mkdir("/d").unwrap();
        fs.put("/d/f", &mut &b"keep"[..]).unwrap();
        assert!(fs.rmdir("/d").is_err());
        assert_eq!(get_bytes(&mut fs, "/d/f"), b"keep");
        fs.rm("/d/f").unwrap();
        fs.rmdir("/d").unwrap();
        assert!(fs.ilookup(ROOT_INUM, "/d").is_err());
        assert_consistent(&mut fs);
    }

    #[test]
    fn test_inode_numbers_are_reused_lowest_first() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        fs.put("/a", &mut &b"1"[..]).unwrap();
        let a = fs.ilookup(ROOT_INUM, "/a").unwrap();
        fs.rm("/a").unwrap();
        fs.put("/b", &mut &b"2"[..]).unwrap();
        assert_eq!(fs.ilookup(ROOT_INUM, "/b").unwrap(), a);
    }

    #[test]
    fn test_info_lists_blocks_in_layout_order() {
        let mut img = fresh_image(1024, 64, 4);
        let mut fs = FsImage::open(&mut img).unwrap();
        let data = vec![1u8; (NDIRECT + 2) * BSIZE];
        fs.put("/big", &mut &data[..]).unwrap();
        let ip = fs.ilookup(ROOT_INUM, "/big").unwrap();
        let mut out = Vec::new();
        fs.info("/big", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&format!("inode: {ip}")));
        assert!(text.contains("type: 2 (file)"));
        assert!(text.contains("nlink: 1"));
        assert!(text.contains(&format!("size: {}", data.len())));
        // 12 direct blocks + the indirect pointer block + 2 indirect blocks
        assert!(text.contains(&format!("# of data blocks: {}", NDIRECT + 3)));
        let iaddr = fs.addr(ip, NDIRECT);
        assert!(text.contains(&format!(" {iaddr} ")));
    }
}
