//! 测试公用：内存盘，可注入读写失败
#![allow(dead_code)]

use std::{
    collections::HashSet,
    io,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use simple_fs::{Block, BlockDevice, DiskError, DiskStats, FileSystem, BLOCK_SIZE};

#[derive(Debug)]
pub struct MemDisk {
    data: Mutex<Vec<u8>>,
    blocks: u32,
    mounted: AtomicBool,
    reads: AtomicU64,
    writes: AtomicU64,
    failing_reads: Mutex<HashSet<u32>>,
    failing_writes: Mutex<HashSet<u32>>,
    writes_left: Mutex<Option<u64>>, // 还允许成功写入多少次，None 表示不限
}

impl MemDisk {
    pub fn new(blocks: u32) -> Self {
        Self {
            data: Mutex::new(vec![0; blocks as usize * BLOCK_SIZE]),
            blocks,
            mounted: AtomicBool::new(false),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            failing_reads: Mutex::new(HashSet::new()),
            failing_writes: Mutex::new(HashSet::new()),
            writes_left: Mutex::new(None),
        }
    }

    /// 对指定块的读取全部失败
    pub fn fail_reads_of(&self, block_id: u32) {
        self.failing_reads.lock().unwrap().insert(block_id);
    }

    /// 对指定块的写入全部失败
    pub fn fail_writes_of(&self, block_id: u32) {
        self.failing_writes.lock().unwrap().insert(block_id);
    }

    /// 再成功写入 `count` 次之后，所有写入都失败
    pub fn fail_writes_after(&self, count: u64) {
        *self.writes_left.lock().unwrap() = Some(count);
    }

    pub fn heal(&self) {
        self.failing_reads.lock().unwrap().clear();
        self.failing_writes.lock().unwrap().clear();
        *self.writes_left.lock().unwrap() = None;
    }

    /// 绕过计数器直接查看块内容
    pub fn raw_block(&self, block_id: u32) -> Block {
        let data = self.data.lock().unwrap();
        let start = block_id as usize * BLOCK_SIZE;
        let mut block: Block = [0; BLOCK_SIZE];
        block.copy_from_slice(&data[start..start + BLOCK_SIZE]);
        block
    }

    /// 绕过计数器直接改写块内容
    pub fn poke_block(&self, block_id: u32, block: &Block) {
        let mut data = self.data.lock().unwrap();
        let start = block_id as usize * BLOCK_SIZE;
        data[start..start + BLOCK_SIZE].copy_from_slice(block);
    }

    fn injected(block: u32) -> DiskError {
        DiskError::Io {
            block,
            source: io::Error::new(io::ErrorKind::Other, "injected failure"),
        }
    }

    fn check_range(&self, block_id: u32) -> Result<(), DiskError> {
        if block_id >= self.blocks {
            return Err(DiskError::OutOfRange {
                block: block_id,
                blocks: self.blocks,
            });
        }
        Ok(())
    }
}

impl BlockDevice for MemDisk {
    fn block_count(&self) -> u32 {
        self.blocks
    }

    fn read_block(&self, block_id: u32, buf: &mut Block) -> Result<(), DiskError> {
        self.check_range(block_id)?;
        if self.failing_reads.lock().unwrap().contains(&block_id) {
            return Err(Self::injected(block_id));
        }

        let data = self.data.lock().unwrap();
        let start = block_id as usize * BLOCK_SIZE;
        buf.copy_from_slice(&data[start..start + BLOCK_SIZE]);
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn write_block(&self, block_id: u32, buf: &Block) -> Result<(), DiskError> {
        self.check_range(block_id)?;
        if self.failing_writes.lock().unwrap().contains(&block_id) {
            return Err(Self::injected(block_id));
        }
        {
            let mut left = self.writes_left.lock().unwrap();
            match left.as_mut() {
                Some(0) => return Err(Self::injected(block_id)),
                Some(n) => *n -= 1,
                None => {}
            }
        }

        let mut data = self.data.lock().unwrap();
        let start = block_id as usize * BLOCK_SIZE;
        data[start..start + BLOCK_SIZE].copy_from_slice(buf);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn mount_flag(&self) -> &AtomicBool {
        &self.mounted
    }

    fn stats(&self) -> DiskStats {
        DiskStats {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }
}

/// 格式化并挂载一块新的内存盘，同时返回磁盘句柄用于注入故障
pub fn fresh_fs(blocks: u32) -> (Arc<MemDisk>, FileSystem<MemDisk>) {
    let disk = Arc::new(MemDisk::new(blocks));
    FileSystem::format(disk.as_ref()).unwrap();
    let fs = FileSystem::mount(Arc::clone(&disk)).unwrap();
    (disk, fs)
}

/// 确定性的伪随机字节
pub fn pattern(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (state >> 16) as u8
        })
        .collect()
}
