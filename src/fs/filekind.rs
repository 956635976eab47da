/// What an inode holds. The numeric values are the on-disk `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FileKind {
    Free = 0,
    Directory = 1,
    RegularFile = 2,
    Device = 3,
}

impl FileKind {
    pub fn from_raw(raw: u16) -> Option<FileKind> {
        match raw {
            0 => Some(FileKind::Free),
            1 => Some(FileKind::Directory),
            2 => Some(FileKind::RegularFile),
            3 => Some(FileKind::Device),
            _ => None,
        }
    }

    pub const fn as_raw(self) -> u16 {
        self as u16
    }
}

/// Human-readable name of a raw inode type, for listings.
pub fn typename(raw: u16) -> &'static str {
    match raw {
        1 => "directory",
        2 => "file",
        3 => "device",
        _ => "unknown",
    }
}
