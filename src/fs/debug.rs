use std::fmt;

use crate::{
    disk::{Block, BlockDevice, BLOCK_SIZE},
    fs::{
        config::{INODES_PER_BLOCK, INODE_TABLE_START_BLOCK_ID, MAGIC_NUMBER, SUPER_BLOCK_BLOCK_ID},
        error::{FileSystemError, Result},
        inode_table::{load_inode_block, Inode},
        super_block::SuperBlock,
        FileSystem,
    },
};

/// 超级块与所有有效 inode 的快照
#[derive(Debug, Clone)]
pub struct DebugReport {
    pub super_block: SuperBlock,
    pub inodes: Vec<(u32, Inode)>,
}

impl<D: BlockDevice> FileSystem<D> {
    /// 直接从磁盘读取超级块和 inode 表，不需要挂载
    pub fn debug(disk: &D) -> Result<DebugReport> {
        let mut block: Block = [0; BLOCK_SIZE];
        disk.read_block(SUPER_BLOCK_BLOCK_ID, &mut block)?;
        let super_block = SuperBlock::decode(&block)?;

        if super_block.magic_number != MAGIC_NUMBER {
            return Err(FileSystemError::BadMagic {
                found: super_block.magic_number,
                expected: MAGIC_NUMBER,
            });
        }

        let mut inodes = Vec::new();
        for table_index in 0..super_block.inode_blocks {
            let table = load_inode_block(disk, INODE_TABLE_START_BLOCK_ID + table_index)?;
            inodes.extend(
                table
                    .inodes
                    .into_iter()
                    .enumerate()
                    .filter(|(_, inode)| inode.valid)
                    .map(|(slot, inode)| (table_index * INODES_PER_BLOCK + slot as u32, inode)),
            );
        }

        Ok(DebugReport {
            super_block,
            inodes,
        })
    }

    /// 已挂载文件系统的调试信息
    pub fn report(&self) -> Result<DebugReport> {
        Self::debug(self.disk.as_ref())
    }
}

impl fmt::Display for DebugReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sb = &self.super_block;
        writeln!(f, "SuperBlock:")?;
        writeln!(f, "    magic number is valid")?;
        writeln!(f, "    {} blocks", sb.total_blocks)?;
        writeln!(f, "    {} inode blocks", sb.inode_blocks)?;
        writeln!(f, "    {} inodes", sb.inode_count)?;

        for (number, inode) in &self.inodes {
            writeln!(f, "Inode {number}:")?;
            writeln!(f, "    size: {} bytes", inode.size)?;
            write!(f, "    direct blocks:")?;
            for block_id in inode.direct {
                write!(f, " {block_id}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
