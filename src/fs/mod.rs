//! The image-resident file system: layout arithmetic, allocators, inode
//! I/O, directories, path resolution and the user-facing operations.
//!
//! Everything here works directly on a mutable byte view of a mapped
//! image. There is no cache between the operations and the image bytes.

mod alloc;
mod directory;
mod file;
mod filekind;
mod image;
mod inode;
mod ops;
mod path;
mod raw;
mod superblock;

pub use directory::DirEnt;
pub use filekind::{typename, FileKind};
pub use image::FsImage;
pub use inode::Inum;
pub use path::{skipelem, splitpath};
pub use raw::SbField;
pub use superblock::Superblock;

/// Identifies an xv6-riscv file system image.
pub const FS_MAGIC: u32 = 0x10203040;
/// Fixed block size in bytes.
pub const BSIZE: usize = 512;
/// On-disk inode record size in bytes.
pub const DINODE_SIZE: usize = 64;
/// Inodes per inode block.
pub const IPB: u32 = (BSIZE / DINODE_SIZE) as u32;
/// Bitmap bits per bitmap block.
pub const BPB: u32 = (BSIZE * 8) as u32;
/// Direct block slots per inode.
pub const NDIRECT: usize = 12;
/// Block numbers held by one indirect block.
pub const NINDIRECT: usize = BSIZE / core::mem::size_of::<u32>();
/// Maximum file length in blocks.
pub const MAXFILE: usize = NDIRECT + NINDIRECT;
/// Maximum file length in bytes.
pub const MAXFILESIZE: u32 = (MAXFILE * BSIZE) as u32;
/// Directory entry name length.
pub const DIRSIZ: usize = 14;
/// On-disk directory entry size in bytes.
pub const DIRENT_SIZE: usize = 16;
/// The root directory always lives in inode 1.
pub const ROOT_INUM: u32 = 1;
/// Chunk size for streaming file contents in and out of an image.
pub const BUFSIZE: usize = 1024;
