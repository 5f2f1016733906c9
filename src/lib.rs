//! SimpleFS：一个基于 inode 的极简文件系统，运行在用普通文件模拟的块设备之上。
//!
//! 磁盘布局：
//! - 块 0：超级块
//! - 块 1 ..= inode_blocks：inode 表
//! - 其余：数据块
//!
//! 空闲块位图不落盘，每次挂载时根据 inode 表重建。

pub mod disk;
pub mod fs;

pub use disk::{Block, BlockDevice, DiskError, DiskStats, FileDisk, BLOCK_SIZE};
pub use fs::{
    config::{INODES_PER_BLOCK, MAGIC_NUMBER, MAX_FILE_SIZE, POINTERS_PER_INODE},
    debug::DebugReport,
    error::{ErrorKind, FileSystemError, Result},
    inode_table::Inode,
    super_block::SuperBlock,
    FileSystem,
};
