//! Offline tools for xv6-riscv file system images.
//!
//! An image is one host file whose bytes are the exact on-disk layout of
//! an xv6 file system: boot block, superblock, log, inode table, free
//! bitmap, data blocks. This crate edits such images in place through a
//! memory-mapped byte view: there is no kernel, no cache and no journal
//! replay, just the layout arithmetic and the consistency rules.
//!
//! Three binaries ship with the library: `newfs` creates an empty image,
//! `opfs` runs the consistency-preserving operations (`ls`, `get`, `put`,
//! `cp`, `mv`, `ln`, `rm`, `mkdir`, `rmdir`, `info`, `diskinfo`), and
//! `modfs` edits raw fields with no checks at all.

pub mod error;
pub mod fs;
pub mod mkfs;

pub use error::FsError;
pub use fs::{FileKind, FsImage, Superblock};
