use thiserror::Error;

/// Every failure the image-resident core can report.
///
/// Consistency warnings (freeing an already-free block, freeing an inode
/// that still has links) are not errors: they go to the log and the
/// operation proceeds.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("{0}: invalid inode number")]
    InvalidInum(u32),
    #[error("{0}: invalid data block number")]
    InvalidBlock(u32),
    /// The first clear bitmap bit does not name a data block. The image
    /// is structurally damaged and the allocation cannot proceed.
    #[error("{0}: free bitmap bit is not a data block")]
    CorruptBitmap(u32),
    #[error("no free blocks")]
    NoFreeBlocks,
    #[error("cannot allocate an inode")]
    NoFreeInodes,
    #[error("{0}: no such file or directory")]
    NotFound(String),
    #[error("{0}: not a directory")]
    NotDir(String),
    #[error("{0}: is a directory")]
    IsDir(String),
    #[error("{0}: directory or device")]
    NotRegular(String),
    #[error("{0}: device file")]
    Device(String),
    #[error("{0}: file exists")]
    Exists(String),
    #[error("empty file name")]
    EmptyName,
    #[error("cannot unlink \".\" or \"..\"")]
    UnlinkDots,
    #[error("{0}: directory not empty")]
    DirNotEmpty(String),
    #[error("device files have no data blocks")]
    DeviceIo,
    #[error("offset out of range")]
    BadOffset,
    #[error("file too large")]
    FileTooLarge,
    #[error("{0}: file block index out of range")]
    BlockOutOfRange(usize),
    #[error("{0}: read error")]
    Read(String),
    #[error("{0}: write error")]
    Write(String),
    #[error("cannot move the root directory")]
    RootMove,
    #[error("image too small ({0} bytes)")]
    ImageTooSmall(usize),
}

impl FsError {
    /// Resource exhaustion and a corrupt bitmap leave a structural edit
    /// half-finished with no journal to roll it back; callers should stop
    /// touching the image and unmap.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FsError::NoFreeBlocks | FsError::NoFreeInodes | FsError::CorruptBitmap(_)
        )
    }
}
