use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::{
    disk::{Block, BlockDevice, BLOCK_SIZE},
    fs::{
        block_bitmap::FreeBlockBitmap,
        config::{INODES_PER_BLOCK, INODE_TABLE_START_BLOCK_ID, MAX_FILE_SIZE, SUPER_BLOCK_BLOCK_ID},
        error::{FileSystemError, Result},
        inode_table::load_inode_block,
        super_block::SuperBlock,
    },
};

pub mod block_bitmap;
pub mod config;
pub mod data_area;
pub mod debug;
pub mod error;
pub mod inode_table;
pub mod inodes;
pub mod super_block;

/// 一个已挂载的文件系统。
///
/// 由 [`FileSystem::mount`] 创建，由 [`FileSystem::unmount`]（或 drop）销毁。
/// 修改类操作（create / remove / write）需要 `&mut self`，
/// 查询类操作（stat / read）只需要 `&self`。
#[derive(Debug)]
pub struct FileSystem<D: BlockDevice> {
    disk: Arc<D>,               // 底层磁盘抽象层
    super_block: SuperBlock,    // 挂载时缓存的超级块
    bitmap: FreeBlockBitmap,    // 数据块分配信息，只在内存中
}

impl<D: BlockDevice> FileSystem<D> {
    /// 格式化磁盘：写入新的超级块，其余所有块清零
    pub fn format(disk: &D) -> Result<()> {
        Self::format_with_progress(disk, |_, _| {})
    }

    /// 同 [`FileSystem::format`]，每写完一个块调用一次 `progress(已写块数, 总块数)`
    pub fn format_with_progress(disk: &D, mut progress: impl FnMut(u32, u32)) -> Result<()> {
        // 格式化期间占用挂载标志，防止同时被挂载
        if !disk.try_mark_mounted() {
            error!("Refusing to format a mounted disk");
            return Err(FileSystemError::AlreadyMounted);
        }
        let result = Self::write_fresh_volume(disk, &mut progress);
        disk.mark_unmounted();
        result
    }

    fn write_fresh_volume(disk: &D, progress: &mut impl FnMut(u32, u32)) -> Result<()> {
        let total_blocks = disk.block_count();
        let super_block = SuperBlock::new(total_blocks);

        disk.write_block(SUPER_BLOCK_BLOCK_ID, &super_block.encode()?)
            .inspect_err(|e| error!("Failed to write SuperBlock: {e}"))?;
        progress(1, total_blocks);

        let zero: Block = [0; BLOCK_SIZE];
        for block_id in 1..total_blocks {
            disk.write_block(block_id, &zero)
                .inspect_err(|e| error!("Failed to clear block {block_id}: {e}"))?;
            progress(block_id + 1, total_blocks);
        }

        info!(
            "Formatted disk: {} blocks, {} inode blocks, {} inodes",
            super_block.total_blocks, super_block.inode_blocks, super_block.inode_count
        );
        Ok(())
    }

    /// 挂载：校验超级块，并根据 inode 表重建空闲块位图
    pub fn mount(disk: Arc<D>) -> Result<Self> {
        if !disk.try_mark_mounted() {
            error!("Disk already mounted");
            return Err(FileSystemError::AlreadyMounted);
        }

        match Self::load(disk.as_ref()) {
            Ok((super_block, bitmap)) => {
                info!(
                    "Mounted file system: {} blocks ({} data), {} inodes, {} free blocks",
                    bitmap.total_blocks(),
                    super_block.data_blocks(),
                    super_block.inode_count,
                    bitmap.free_count()
                );
                Ok(Self {
                    disk,
                    super_block,
                    bitmap,
                })
            }
            Err(e) => {
                disk.mark_unmounted();
                error!("Mount failed: {e}");
                Err(e)
            }
        }
    }

    fn load(disk: &D) -> Result<(SuperBlock, FreeBlockBitmap)> {
        let mut block: Block = [0; BLOCK_SIZE];
        disk.read_block(SUPER_BLOCK_BLOCK_ID, &mut block)?;

        let super_block = SuperBlock::decode(&block)?;
        super_block.validate(disk.block_count())?;

        let bitmap = Self::build_bitmap(disk, &super_block)?;
        Ok((super_block, bitmap))
    }

    /// 只根据有效 inode 的直接块指针判断数据块是否被占用，不看块内容
    fn build_bitmap(disk: &D, super_block: &SuperBlock) -> Result<FreeBlockBitmap> {
        let mut bitmap = FreeBlockBitmap::new(super_block.total_blocks, super_block.data_start());

        for table_index in 0..super_block.inode_blocks {
            let table = load_inode_block(disk, INODE_TABLE_START_BLOCK_ID + table_index)?;

            for (slot, inode) in table.inodes.iter().enumerate().filter(|(_, i)| i.valid) {
                let number = table_index * INODES_PER_BLOCK + slot as u32;
                if inode.size as usize > MAX_FILE_SIZE {
                    warn!("Inode {number} claims {} bytes, more than direct blocks can hold", inode.size);
                }

                for block_id in inode.blocks() {
                    match bitmap.mark_used(block_id) {
                        Ok(true) => {}
                        Ok(false) => warn!("Block {block_id} of inode {number} is shared with another inode"),
                        Err(e) => warn!("Ignoring pointer {block_id} of inode {number}: {e}"),
                    }
                }
            }
        }

        debug!(
            "Rebuilt block bitmap: {} allocated, {} free",
            bitmap.allocated_count(),
            bitmap.free_count()
        );
        Ok(bitmap)
    }

    /// 卸载并交还磁盘。内存中的位图随之丢弃，不做额外的写回。
    pub fn unmount(self) -> Arc<D> {
        Arc::clone(&self.disk)
    }

    pub fn disk(&self) -> &Arc<D> {
        &self.disk
    }

    pub fn super_block(&self) -> &SuperBlock {
        &self.super_block
    }

    pub fn bitmap(&self) -> &FreeBlockBitmap {
        &self.bitmap
    }

    pub fn free_blocks(&self) -> u32 {
        self.bitmap.free_count()
    }

    pub fn allocated_blocks(&self) -> u32 {
        self.bitmap.allocated_count()
    }
}

impl<D: BlockDevice> Drop for FileSystem<D> {
    fn drop(&mut self) {
        self.disk.mark_unmounted();
        info!("Unmounted file system");
    }
}
