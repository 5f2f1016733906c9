use log::{debug, error, warn};

use crate::{
    disk::{Block, BlockDevice, BLOCK_SIZE},
    fs::{
        config::POINTERS_PER_INODE,
        error::{FileSystemError, Result},
        FileSystem,
    },
};

impl<D: BlockDevice> FileSystem<D> {
    /// 从 `offset` 开始读取至多 `buf.len()` 字节。
    ///
    /// 返回实际读取的字节数：可能因为文件结尾或直接块容量而少于 `buf.len()`，
    /// 这不算错误。`offset >= size` 时返回 [`FileSystemError::OffsetBeyondEnd`]。
    /// 稀疏写入留下的空洞读出来是 0。
    pub fn read(&self, number: u32, buf: &mut [u8], offset: usize) -> Result<usize> {
        let slot = self.load_valid(number)?;
        let inode = *slot.inode();
        let size = inode.size as usize;

        if offset >= size {
            return Err(FileSystemError::OffsetBeyondEnd { offset, size });
        }

        let length = buf.len().min(size - offset);
        let mut bytes_read = 0;
        let mut block_index = offset / BLOCK_SIZE;
        let mut internal_offset = offset % BLOCK_SIZE;
        let mut block: Block = [0; BLOCK_SIZE];

        while bytes_read < length && block_index < POINTERS_PER_INODE {
            let copy_size = (BLOCK_SIZE - internal_offset).min(length - bytes_read);
            let dest = &mut buf[bytes_read..bytes_read + copy_size];

            match inode.direct[block_index] {
                0 => dest.fill(0),
                block_id => {
                    if let Err(e) = self.disk.read_block(block_id, &mut block) {
                        if bytes_read == 0 {
                            return Err(e.into());
                        }
                        warn!("Read of inode {number} stopped after {bytes_read} bytes: {e}");
                        break;
                    }
                    dest.copy_from_slice(&block[internal_offset..internal_offset + copy_size]);
                }
            }

            bytes_read += copy_size;
            block_index += 1;
            internal_offset = 0;
        }

        debug!("Read {bytes_read} bytes from inode {} at offset {offset}", slot.number);
        Ok(bytes_read)
    }

    /// 把 `data` 写到 `offset` 处，必要时分配新的数据块。
    ///
    /// 磁盘满、直接块用完或 I/O 失败都会提前结束并返回已写入的字节数，
    /// 已经写下去的块不会回滚。一个字节都没写成时返回导致失败的错误。
    pub fn write(&mut self, number: u32, data: &[u8], offset: usize) -> Result<usize> {
        let mut slot = self.load_valid(number)?;
        let mut inode = *slot.inode();

        let mut bytes_written = 0;
        let mut block_index = offset / BLOCK_SIZE;
        let mut internal_offset = offset % BLOCK_SIZE;
        let mut block: Block = [0; BLOCK_SIZE];
        let mut failure = None;
        let mut allocated = Vec::new();

        while bytes_written < data.len() && block_index < POINTERS_PER_INODE {
            let copy_size = (BLOCK_SIZE - internal_offset).min(data.len() - bytes_written);

            let (block_id, fresh) = match inode.direct[block_index] {
                0 => match self.bitmap.alloc() {
                    Ok(block_id) => {
                        // 新块不读旧内容，从全 0 开始
                        block.fill(0);
                        (block_id, true)
                    }
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                },
                block_id => {
                    if let Err(e) = self.disk.read_block(block_id, &mut block) {
                        failure = Some(e.into());
                        break;
                    }
                    (block_id, false)
                }
            };

            block[internal_offset..internal_offset + copy_size]
                .copy_from_slice(&data[bytes_written..bytes_written + copy_size]);

            if let Err(e) = self.disk.write_block(block_id, &block) {
                if fresh {
                    let _ = self.bitmap.free(block_id);
                }
                failure = Some(e.into());
                break;
            }

            if fresh {
                inode.direct[block_index] = block_id;
                allocated.push(block_id);
            }
            bytes_written += copy_size;
            block_index += 1;
            internal_offset = 0;
        }

        if bytes_written > 0 {
            inode.size = inode.size.max((offset + bytes_written) as u32);
        }

        if inode != *slot.inode() {
            *slot.inode_mut() = inode;
            if let Err(e) = self.store_slot(&slot) {
                // inode 没有落盘，本次新分配的块不被任何 inode 引用
                for block_id in allocated {
                    let _ = self.bitmap.free(block_id);
                }
                error!("Write to inode {number} lost its inode update: {e}");
                return Err(e);
            }
        }

        match failure {
            Some(e) if bytes_written == 0 => Err(e),
            Some(e) => {
                warn!("Write to inode {number} stopped after {bytes_written} bytes: {e}");
                Ok(bytes_written)
            }
            None => {
                if bytes_written < data.len() {
                    warn!(
                        "Write to inode {number} truncated to {bytes_written} of {} bytes: direct blocks exhausted",
                        data.len()
                    );
                }
                debug!("Wrote {bytes_written} bytes to inode {number} at offset {offset}");
                Ok(bytes_written)
            }
        }
    }
}
