use serde::{Deserialize, Serialize};

use crate::{
    disk::{Block, BlockDevice, BLOCK_SIZE},
    fs::{
        config::{INODES_PER_BLOCK, INODE_SIZE, INODE_TABLE_START_BLOCK_ID, POINTERS_PER_INODE},
        error::Result,
    },
};

/// 内存中的 inode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inode {
    pub valid: bool,
    pub size: u32,                        // 文件大小（字节）
    pub direct: [u32; POINTERS_PER_INODE], // 直接块指针，0 表示未分配
    pub indirect: u32,                    // 预留的一级间接块，目前不使用
}

impl Inode {
    /// 新建文件：大小一律从 0 开始，没有任何数据块
    pub fn fresh() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// 已分配的直接块
    pub fn blocks(&self) -> impl Iterator<Item = u32> + '_ {
        self.direct.iter().copied().filter(|&b| b != 0)
    }

    pub fn block_count(&self) -> usize {
        self.blocks().count()
    }
}

// 磁盘上的 inode 记录，valid 用一个完整的 u32 保存，保证每条记录 32 字节
#[derive(Serialize, Deserialize)]
struct RawInode {
    valid: u32,
    size: u32,
    direct: [u32; POINTERS_PER_INODE],
    indirect: u32,
}

impl From<&Inode> for RawInode {
    fn from(inode: &Inode) -> Self {
        Self {
            valid: inode.valid as u32,
            size: inode.size,
            direct: inode.direct,
            indirect: inode.indirect,
        }
    }
}

impl From<RawInode> for Inode {
    fn from(raw: RawInode) -> Self {
        Self {
            valid: raw.valid != 0,
            size: raw.size,
            direct: raw.direct,
            indirect: raw.indirect,
        }
    }
}

/// 一个 inode 表块：INODES_PER_BLOCK 条紧密排列的记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InodeBlock {
    pub inodes: Vec<Inode>,
}

impl InodeBlock {
    pub fn decode(block: &Block) -> Result<Self> {
        let inodes = block
            .chunks_exact(INODE_SIZE)
            .map(|slot| bincode::deserialize::<RawInode>(slot).map(Inode::from))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { inodes })
    }

    pub fn encode(&self) -> Result<Block> {
        let mut block: Block = [0; BLOCK_SIZE];
        for (slot, inode) in block.chunks_exact_mut(INODE_SIZE).zip(&self.inodes) {
            bincode::serialize_into(slot, &RawInode::from(inode))?;
        }
        Ok(block)
    }
}

/// inode 编号 -> (所在块号, 块内槽位)
pub fn inode_position(inode_number: u32) -> (u32, usize) {
    (
        INODE_TABLE_START_BLOCK_ID + inode_number / INODES_PER_BLOCK,
        (inode_number % INODES_PER_BLOCK) as usize,
    )
}

pub fn load_inode_block(disk: &impl BlockDevice, block_id: u32) -> Result<InodeBlock> {
    let mut block: Block = [0; BLOCK_SIZE];
    disk.read_block(block_id, &mut block)?;
    InodeBlock::decode(&block)
}

pub fn store_inode_block(disk: &impl BlockDevice, block_id: u32, table: &InodeBlock) -> Result<()> {
    disk.write_block(block_id, &table.encode()?)?;
    Ok(())
}
