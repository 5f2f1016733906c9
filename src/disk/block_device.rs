use std::sync::atomic::{AtomicBool, Ordering};

use crate::disk::{
    error::Result,
    types::{Block, DiskStats},
};

/// 以整块为单位读写的存储设备。
///
/// 实现者必须保证：要么完整传输一个块，要么返回错误；
/// 并且对 `block_id >= block_count()` 做越界检查。
pub trait BlockDevice: Send + Sync {
    fn block_count(&self) -> u32;
    fn read_block(&self, block_id: u32, buf: &mut Block) -> Result<()>;
    fn write_block(&self, block_id: u32, buf: &Block) -> Result<()>;

    /// 挂载标志，同一时刻只允许一个 FileSystem 绑定到设备上
    fn mount_flag(&self) -> &AtomicBool;

    fn stats(&self) -> DiskStats {
        DiskStats::default()
    }

    fn is_mounted(&self) -> bool {
        self.mount_flag().load(Ordering::Acquire)
    }

    /// 尝试占用挂载标志，已被占用时返回 false
    fn try_mark_mounted(&self) -> bool {
        self.mount_flag()
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn mark_unmounted(&self) {
        self.mount_flag().store(false, Ordering::Release);
    }
}
