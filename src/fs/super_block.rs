use serde::{Deserialize, Serialize};

use crate::{
    disk::{Block, BLOCK_SIZE},
    fs::{
        config::{INODES_PER_BLOCK, INODE_BLOCKS_DIVISOR, INODE_TABLE_START_BLOCK_ID, MAGIC_NUMBER},
        error::{FileSystemError, Result},
    },
};

/// 超级块在块 0 中占用的字节数（4 个 u32）
pub const SUPER_BLOCK_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperBlock {
    pub magic_number: u32, // 魔数，用于识别文件系统
    pub total_blocks: u32, // 文件系统总块数
    pub inode_blocks: u32, // inode 表占用的块数
    pub inode_count: u32,  // 总 inode 数
}

impl SuperBlock {
    /// 按 10% 的比例为 inode 表预留块
    pub fn new(total_blocks: u32) -> Self {
        let inode_blocks = total_blocks / INODE_BLOCKS_DIVISOR;
        Self {
            magic_number: MAGIC_NUMBER,
            total_blocks,
            inode_blocks,
            inode_count: inode_blocks * INODES_PER_BLOCK,
        }
    }

    /// 数据区的起始块号（超级块 + inode 表之后）
    pub fn data_start(&self) -> u32 {
        INODE_TABLE_START_BLOCK_ID + self.inode_blocks
    }

    pub fn data_blocks(&self) -> u32 {
        self.total_blocks.saturating_sub(self.data_start())
    }

    /// 编码成一个完整的块，超级块之外的字节全部为 0
    pub fn encode(&self) -> Result<Block> {
        let mut block: Block = [0; BLOCK_SIZE];
        bincode::serialize_into(&mut block[..SUPER_BLOCK_SIZE], self)?;
        Ok(block)
    }

    /// 只负责解码，不做任何校验
    pub fn decode(block: &Block) -> Result<Self> {
        Ok(bincode::deserialize(&block[..SUPER_BLOCK_SIZE])?)
    }

    /// 检查魔数以及各字段之间的一致性
    pub fn validate(&self, device_blocks: u32) -> Result<()> {
        if self.magic_number != MAGIC_NUMBER {
            return Err(FileSystemError::BadMagic {
                found: self.magic_number,
                expected: MAGIC_NUMBER,
            });
        }

        if self.inode_blocks.checked_mul(INODES_PER_BLOCK) != Some(self.inode_count) {
            return Err(FileSystemError::Corrupted(format!(
                "{} inodes do not fit {} inode blocks",
                self.inode_count, self.inode_blocks
            )));
        }

        if self.total_blocks != device_blocks {
            return Err(FileSystemError::Corrupted(format!(
                "superblock describes {} blocks but disk has {}",
                self.total_blocks, device_blocks
            )));
        }

        if self.inode_blocks >= self.total_blocks {
            return Err(FileSystemError::Corrupted(format!(
                "inode table ({} blocks) does not fit in {} blocks",
                self.inode_blocks, self.total_blocks
            )));
        }

        Ok(())
    }
}
