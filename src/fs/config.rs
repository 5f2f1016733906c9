use crate::disk::BLOCK_SIZE;

/// 魔数，用于识别由本文件系统格式化过的磁盘
pub const MAGIC_NUMBER: u32 = 0xf0f0_3410;

pub const SUPER_BLOCK_BLOCK_ID: u32 = 0;
pub const INODE_TABLE_START_BLOCK_ID: u32 = 1;

// 每个 inode 的直接块指针数
pub const POINTERS_PER_INODE: usize = 5;

// 磁盘上的 inode 记录：valid, size, direct[5], indirect，共 8 个 u32
pub const INODE_SIZE: usize = 4 * (3 + POINTERS_PER_INODE);

// 4KB / 32B = 128
pub const INODES_PER_BLOCK: u32 = (BLOCK_SIZE / INODE_SIZE) as u32;

// 格式化时 inode 表占总块数的 1/10
pub const INODE_BLOCKS_DIVISOR: u32 = 10;

// 仅靠直接块能寻址的最大文件大小
pub const MAX_FILE_SIZE: usize = POINTERS_PER_INODE * BLOCK_SIZE;
