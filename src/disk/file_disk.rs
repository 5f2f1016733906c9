use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Mutex,
    },
};

use log::{debug, info};

use crate::disk::{
    block_device::BlockDevice,
    error::{DiskError, Result},
    types::{Block, DiskStats, BLOCK_SIZE},
};

/// 用一个普通文件模拟的块设备
#[derive(Debug)]
pub struct FileDisk {
    file: Mutex<File>,
    path: PathBuf,
    blocks: u32,
    reads: AtomicU64,
    writes: AtomicU64,
    mounted: AtomicBool,
}

impl FileDisk {
    /// 打开（不存在则创建）磁盘镜像，并把文件截断/扩展到 `blocks * BLOCK_SIZE` 字节
    pub fn open(path: impl AsRef<Path>, blocks: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| DiskError::Open {
            path: path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(open_err)?;

        file.set_len(blocks as u64 * BLOCK_SIZE as u64)
            .map_err(open_err)?;

        info!("Opened disk {} with {} blocks", path.display(), blocks);

        Ok(Self {
            file: Mutex::new(file),
            path,
            blocks,
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            mounted: AtomicBool::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_range(&self, block_id: u32) -> Result<()> {
        if block_id >= self.blocks {
            return Err(DiskError::OutOfRange {
                block: block_id,
                blocks: self.blocks,
            });
        }
        Ok(())
    }

    fn seek_to(file: &mut File, block_id: u32) -> std::io::Result<()> {
        file.seek(SeekFrom::Start(block_id as u64 * BLOCK_SIZE as u64))?;
        Ok(())
    }
}

impl BlockDevice for FileDisk {
    fn block_count(&self) -> u32 {
        self.blocks
    }

    fn read_block(&self, block_id: u32, buf: &mut Block) -> Result<()> {
        self.check_range(block_id)?;

        // 锁中毒只意味着另一个线程在持锁时 panic，文件本身仍可用
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        Self::seek_to(&mut file, block_id)
            .and_then(|_| file.read_exact(buf))
            .map_err(|source| DiskError::Io {
                block: block_id,
                source,
            })?;

        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn write_block(&self, block_id: u32, buf: &Block) -> Result<()> {
        self.check_range(block_id)?;

        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        Self::seek_to(&mut file, block_id)
            .and_then(|_| file.write_all(buf))
            .map_err(|source| DiskError::Io {
                block: block_id,
                source,
            })?;

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

impl Drop for FileDisk {
    fn drop(&mut self) {
        let stats = self.stats();
        debug!("Closing disk {}", self.path.display());
        info!(
            "Disk closed: {} reads, {} writes",
            stats.reads, stats.writes
        );
    }
}
