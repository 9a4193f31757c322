use crate::config::SECTOR_SIZE;
use crate::error::IOError;
use alloc::vec;
use alloc::vec::Vec;
use core::any::Any;
use spin::Mutex;

/// 文件系统对底层块设备的全部要求, 一个 block 就是一个扇区
pub trait BlockDevice: Send + Sync + Any {
    // buf 长度必须等于扇区大小, 否则返回 BadBufferSize
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), IOError>;
    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), IOError>;
    fn total_blocks(&self) -> usize;
}

/// 内存模拟的块设备
pub struct MemoryBlockDevice {
    data: Mutex<Vec<u8>>,
    total_blocks: usize,
}

impl MemoryBlockDevice {
    pub fn new(total_blocks: usize) -> Self {
        Self {
            data: Mutex::new(vec![0; total_blocks * SECTOR_SIZE]),
            total_blocks,
        }
    }
    fn range(&self, block_id: usize, len: usize) -> Result<core::ops::Range<usize>, IOError> {
        if block_id >= self.total_blocks {
            return Err(IOError::OutOfRange(block_id));
        }
        if len != SECTOR_SIZE {
            return Err(IOError::BadBufferSize(len));
        }
        let start = block_id * SECTOR_SIZE;
        Ok(start..start + SECTOR_SIZE)
    }
}

impl BlockDevice for MemoryBlockDevice {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), IOError> {
        let range = self.range(block_id, buf.len())?;
        buf.copy_from_slice(&self.data.lock()[range]);
        Ok(())
    }
    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), IOError> {
        let range = self.range(block_id, buf.len())?;
        self.data.lock()[range].copy_from_slice(buf);
        Ok(())
    }
    fn total_blocks(&self) -> usize {
        self.total_blocks
    }
}
