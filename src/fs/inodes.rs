use log::{debug, warn};

use crate::{
    disk::BlockDevice,
    fs::{
        config::{INODES_PER_BLOCK, INODE_TABLE_START_BLOCK_ID},
        error::{FileSystemError, Result},
        inode_table::{inode_position, load_inode_block, store_inode_block, Inode, InodeBlock},
        FileSystem,
    },
};

/// 读入内存的 inode 所在块，写回时整块写回
pub(crate) struct InodeSlot {
    pub number: u32,
    block_id: u32,
    slot: usize,
    table: InodeBlock,
}

impl InodeSlot {
    pub fn inode(&self) -> &Inode {
        &self.table.inodes[self.slot]
    }

    pub fn inode_mut(&mut self) -> &mut Inode {
        &mut self.table.inodes[self.slot]
    }
}

impl<D: BlockDevice> FileSystem<D> {
    fn check_inode_number(&self, number: u32) -> Result<()> {
        if number >= self.super_block.inode_count {
            return Err(FileSystemError::InodeOutOfRange {
                inode: number,
                count: self.super_block.inode_count,
            });
        }
        Ok(())
    }

    pub(crate) fn load_slot(&self, number: u32) -> Result<InodeSlot> {
        self.check_inode_number(number)?;
        let (block_id, slot) = inode_position(number);
        let table = load_inode_block(self.disk.as_ref(), block_id)?;
        Ok(InodeSlot {
            number,
            block_id,
            slot,
            table,
        })
    }

    /// 读取 inode，无效的 inode 视为错误
    pub(crate) fn load_valid(&self, number: u32) -> Result<InodeSlot> {
        let slot = self.load_slot(number)?;
        if !slot.inode().valid {
            debug!("Inode {number} is not valid");
            return Err(FileSystemError::InodeNotValid(number));
        }
        Ok(slot)
    }

    pub(crate) fn store_slot(&self, slot: &InodeSlot) -> Result<()> {
        store_inode_block(self.disk.as_ref(), slot.block_id, &slot.table)
    }

    /// 分配一个 inode：线性扫描 inode 表，占用第一个无效的槽位
    pub fn create(&mut self) -> Result<u32> {
        for table_index in 0..self.super_block.inode_blocks {
            let block_id = INODE_TABLE_START_BLOCK_ID + table_index;
            let mut table = load_inode_block(self.disk.as_ref(), block_id)?;

            if let Some(slot) = table.inodes.iter().position(|inode| !inode.valid) {
                table.inodes[slot] = Inode::fresh();
                store_inode_block(self.disk.as_ref(), block_id, &table)?;

                let number = table_index * INODES_PER_BLOCK + slot as u32;
                debug!("Created inode {number}");
                return Ok(number);
            }
        }

        warn!("No free inode in a table of {}", self.super_block.inode_count);
        Err(FileSystemError::InodeFull)
    }

    /// 删除 inode，并把它占用的数据块全部归还给位图
    pub fn remove(&mut self, number: u32) -> Result<()> {
        let mut slot = self.load_valid(number)?;
        let released: Vec<u32> = slot.inode().blocks().collect();

        // inode 落盘成功之后才释放位图中的块
        *slot.inode_mut() = Inode::empty();
        self.store_slot(&slot)?;

        for block_id in &released {
            if let Err(e) = self.bitmap.free(*block_id) {
                warn!("Inode {number}: could not release block {block_id}: {e}");
            }
        }

        debug!("Removed inode {number}, released {} blocks", released.len());
        Ok(())
    }

    /// 返回文件大小（字节）
    pub fn stat(&self, number: u32) -> Result<usize> {
        Ok(self.load_valid(number)?.inode().size as usize)
    }

    /// 返回有效 inode 的完整记录
    pub fn inode(&self, number: u32) -> Result<Inode> {
        Ok(*self.load_valid(number)?.inode())
    }
}
