use thiserror::Error;

use crate::disk::DiskError;

/// 错误的大类，方便调用者区分失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    InvalidArgument,
    InvalidState,
    Exhausted,
}

/// 文件系统错误类型
#[derive(Debug, Error)]
pub enum FileSystemError {
    #[error("Disk I/O error: {0}")]
    Disk(#[from] DiskError),

    #[error("Inode {inode} is out of range (inode table holds {count})")]
    InodeOutOfRange { inode: u32, count: u32 },

    #[error("Block {block} is out of range (volume has {blocks} blocks)")]
    BlockOutOfRange { block: u32, blocks: u32 },

    #[error("Block {0} belongs to the superblock or inode table")]
    ReservedBlock(u32),

    #[error("Invalid magic number {found:#010x}, expected {expected:#010x}")]
    BadMagic { found: u32, expected: u32 },

    #[error("File system corrupted: {0}")]
    Corrupted(String),

    #[error("Failed to decode on-disk record: {0}")]
    Codec(#[from] bincode::Error),

    #[error("Disk is already mounted")]
    AlreadyMounted,

    #[error("Inode {0} is not valid")]
    InodeNotValid(u32),

    #[error("Offset {offset} is at or beyond end of file (size {size})")]
    OffsetBeyondEnd { offset: usize, size: usize },

    #[error("Block {0} is not allocated")]
    BlockNotAllocated(u32),

    #[error("No free inode available")]
    InodeFull,

    #[error("Disk space is full")]
    DiskFull,
}

impl FileSystemError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Disk(_) => ErrorKind::Io,
            Self::InodeOutOfRange { .. } | Self::BlockOutOfRange { .. } | Self::ReservedBlock(_) => {
                ErrorKind::InvalidArgument
            }
            Self::BadMagic { .. }
            | Self::Corrupted(_)
            | Self::Codec(_)
            | Self::AlreadyMounted
            | Self::InodeNotValid(_)
            | Self::OffsetBeyondEnd { .. }
            | Self::BlockNotAllocated(_) => ErrorKind::InvalidState,
            Self::InodeFull | Self::DiskFull => ErrorKind::Exhausted,
        }
    }
}

/// 文件系统统一结果类型
pub type Result<T> = std::result::Result<T, FileSystemError>;
