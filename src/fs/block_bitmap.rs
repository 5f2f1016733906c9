use crate::fs::error::{FileSystemError, Result};

/// 空闲块位图：每个 bit 对应一个块，1 = 已分配。
/// 只存在于内存中，每次挂载时重新构建。
#[derive(Debug, Clone)]
pub struct FreeBlockBitmap {
    bits: Vec<u8>,
    total_blocks: u32,
    free_blocks: u32,
    data_start: u32, // 此前的块（超级块 + inode 表）永远处于已分配状态
}

impl FreeBlockBitmap {
    /// 元数据块标记为已分配，数据块全部空闲
    pub fn new(total_blocks: u32, data_start: u32) -> Self {
        let byte_len = ((total_blocks as usize) + 7) / 8;
        let data_start = data_start.min(total_blocks);

        let mut bitmap = Self {
            bits: vec![0; byte_len],
            total_blocks,
            free_blocks: total_blocks,
            data_start,
        };
        for block in 0..data_start {
            bitmap.set(block);
        }
        bitmap
    }

    fn position(block: u32) -> (usize, u8) {
        ((block / 8) as usize, (block % 8) as u8)
    }

    fn set(&mut self, block: u32) {
        let (byte_index, bit_index) = Self::position(block);
        self.bits[byte_index] |= 1 << bit_index;
        self.free_blocks -= 1;
    }

    fn check_data_block(&self, block: u32) -> Result<()> {
        if block >= self.total_blocks {
            return Err(FileSystemError::BlockOutOfRange {
                block,
                blocks: self.total_blocks,
            });
        }
        if block < self.data_start {
            return Err(FileSystemError::ReservedBlock(block));
        }
        Ok(())
    }

    pub fn is_used(&self, block: u32) -> bool {
        if block >= self.total_blocks {
            return false;
        }
        let (byte_index, bit_index) = Self::position(block);
        self.bits[byte_index] & (1 << bit_index) != 0
    }

    /// 挂载时登记一个已被 inode 引用的数据块。
    /// 返回 false 表示该块已经被标记过（例如两个 inode 指向同一块）。
    pub fn mark_used(&mut self, block: u32) -> Result<bool> {
        self.check_data_block(block)?;
        if self.is_used(block) {
            return Ok(false);
        }
        self.set(block);
        Ok(true)
    }

    /// 首次适配：返回编号最小的空闲块
    pub fn alloc(&mut self) -> Result<u32> {
        if self.free_blocks == 0 {
            return Err(FileSystemError::DiskFull);
        }

        // 元数据块对应的 bit 全部已置位，可以直接从数据区所在的字节开始找
        let first_byte = (self.data_start / 8) as usize;
        let hit = self
            .bits
            .iter()
            .enumerate()
            .skip(first_byte)
            .find(|&(_, &byte)| byte != 0xFF)
            .and_then(|(byte_index, &byte)| {
                (0..8u32)
                    .find(|&bit| byte & (1u8 << bit) == 0)
                    .map(|bit| byte_index as u32 * 8 + bit)
            });

        // 最后一个字节里超出 total_blocks 的填充位不算空闲块
        match hit {
            Some(block) if block < self.total_blocks => {
                self.set(block);
                Ok(block)
            }
            _ => Err(FileSystemError::DiskFull),
        }
    }

    /// 释放一个数据块。重复释放与释放元数据块都会被拒绝。
    pub fn free(&mut self, block: u32) -> Result<()> {
        self.check_data_block(block)?;
        if !self.is_used(block) {
            return Err(FileSystemError::BlockNotAllocated(block));
        }

        let (byte_index, bit_index) = Self::position(block);
        self.bits[byte_index] &= !(1 << bit_index);
        self.free_blocks += 1;
        Ok(())
    }

    pub fn total_blocks(&self) -> u32 {
        self.total_blocks
    }

    pub fn free_count(&self) -> u32 {
        self.free_blocks
    }

    pub fn allocated_count(&self) -> u32 {
        self.total_blocks - self.free_blocks
    }
}

impl PartialEq for FreeBlockBitmap {
    fn eq(&self, other: &Self) -> bool {
        self.total_blocks == other.total_blocks
            && self.data_start == other.data_start
            && self.bits == other.bits
    }
}

impl Eq for FreeBlockBitmap {}
