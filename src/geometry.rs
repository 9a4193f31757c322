// 磁盘布局: [FAT 区][目录簇][数据区], 全部以簇为单位, 挂载时由设备扇区数推出
use crate::config::{CLUSTER_SIZE, SECTORS_PER_CLUSTER};
use crate::error::FSError;
use crate::fat::{BYTES_PER_ENTRY, MAX_CLUSTERS};
use log::{error, warn};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Geometry {
    total_clusters: usize,
    fat_clusters: usize,
}

impl Geometry {
    /// 根据设备的扇区总数计算布局, FAT 区的大小随簇总数变化
    pub fn new(total_blocks: usize) -> Result<Self, FSError> {
        let mut total_clusters = total_blocks / SECTORS_PER_CLUSTER;
        if total_clusters > MAX_CLUSTERS {
            warn!(
                "device has {} clusters but FAT16 entries address only {}, the rest is unused",
                total_clusters, MAX_CLUSTERS
            );
            total_clusters = MAX_CLUSTERS;
        }
        let fat_bytes = total_clusters * BYTES_PER_ENTRY;
        let geometry = Self {
            total_clusters,
            fat_clusters: (fat_bytes + CLUSTER_SIZE - 1) / CLUSTER_SIZE,
        };
        geometry.validate()?;
        Ok(geometry)
    }
    fn validate_total_clusters(&self) -> Result<(), FSError> {
        if self.first_data_cluster() >= self.total_clusters {
            error!(
                "device too small: {} clusters, but reserved region alone needs {}",
                self.total_clusters,
                self.first_data_cluster()
            );
            return Err(FSError::DeviceTooSmall);
        }
        Ok(())
    }
    fn validate_fat_clusters(&self) -> Result<(), FSError> {
        let addressable = self.fat_clusters * CLUSTER_SIZE / BYTES_PER_ENTRY;
        if addressable < self.total_clusters {
            error!(
                "FAT is too small (addresses {} clusters) compared to the total number of clusters ({})",
                addressable, self.total_clusters
            );
            return Err(FSError::DeviceTooSmall);
        }
        Ok(())
    }
    pub(crate) fn validate(&self) -> Result<(), FSError> {
        self.validate_fat_clusters()?;
        self.validate_total_clusters()?;
        Ok(())
    }
    pub fn total_clusters(&self) -> usize {
        self.total_clusters
    }
    pub fn fat_clusters(&self) -> usize {
        self.fat_clusters
    }
    pub fn dir_cluster(&self) -> usize {
        self.fat_clusters
    }
    pub fn first_data_cluster(&self) -> usize {
        self.fat_clusters + 1
    }
    pub fn data_clusters(&self) -> usize {
        self.total_clusters - self.first_data_cluster()
    }
    pub fn is_data_cluster(&self, cluster_id: usize) -> bool {
        cluster_id >= self.first_data_cluster() && cluster_id < self.total_clusters
    }
}
