/// 簇读写层, 扇区的进一步抽象, 上层只按簇号访问设备
use super::BlockDevice;
use crate::config::{CLUSTER_SIZE, SECTORS_PER_CLUSTER, SECTOR_SIZE};
use crate::error::FSError;
use alloc::sync::Arc;

pub type ClusterBuf = [u8; CLUSTER_SIZE];

#[derive(Clone)]
pub struct ClusterDevice {
    block_dev: Arc<dyn BlockDevice>, // Arc + dyn 实现 BlockDevice Trait 的动态分发
}

impl ClusterDevice {
    pub fn new(block_dev: Arc<dyn BlockDevice>) -> Self {
        Self { block_dev }
    }
    pub fn total_blocks(&self) -> usize {
        self.block_dev.total_blocks()
    }
    /// 依次读簇内每个扇区, 任一扇区失败则整个簇读取失败
    pub fn read_cluster(&self, cluster_id: usize, buf: &mut ClusterBuf) -> Result<(), FSError> {
        let block_id = cluster_id * SECTORS_PER_CLUSTER;
        for (i, id) in (block_id..(block_id + SECTORS_PER_CLUSTER)).enumerate() {
            self.block_dev
                .read_block(id, &mut buf[(i * SECTOR_SIZE)..((i + 1) * SECTOR_SIZE)])?;
        }
        Ok(())
    }
    /// 失败时已写入的扇区不回滚, 该簇内容视为不确定
    pub fn write_cluster(&self, cluster_id: usize, buf: &ClusterBuf) -> Result<(), FSError> {
        let block_id = cluster_id * SECTORS_PER_CLUSTER;
        for (i, id) in (block_id..(block_id + SECTORS_PER_CLUSTER)).enumerate() {
            self.block_dev
                .write_block(id, &buf[(i * SECTOR_SIZE)..((i + 1) * SECTOR_SIZE)])?;
        }
        Ok(())
    }
}
