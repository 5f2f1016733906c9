use std::path::PathBuf;

use thiserror::Error;

/// 块设备层错误
#[derive(Debug, Error)]
pub enum DiskError {
    #[error("failed to open disk image {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("block {block} is out of range (disk has {blocks} blocks)")]
    OutOfRange { block: u32, blocks: u32 },

    #[error("disk I/O error on block {block}: {source}")]
    Io {
        block: u32,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DiskError>;
