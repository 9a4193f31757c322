// FAT 表结构体
use super::{ClusterDevice, Geometry};
use crate::cluster_io::ClusterBuf;
use crate::config::CLUSTER_SIZE;
use crate::error::FSError;
use alloc::vec;
use alloc::vec::Vec;
use log::{debug, error};

pub(crate) const BYTES_PER_ENTRY: usize = 2;
const FREE_CLUSTER: u16 = 0x0000;
const RESERVED_FAT: u16 = 0xFFFD;
const RESERVED_DIR: u16 = 0xFFFE;
const FINAL_CLUSTER: u16 = 0xFFFF;

/// 16 位表项能表示的簇数, 标记值本身不会成为合法簇号
pub const MAX_CLUSTERS: usize = RESERVED_FAT as usize;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FATEntry {
    ReservedFat,
    ReservedDir,
    Free,
    End,
    Next(u16),
}

impl From<u16> for FATEntry {
    fn from(raw: u16) -> Self {
        match raw {
            FREE_CLUSTER => FATEntry::Free,
            RESERVED_FAT => FATEntry::ReservedFat,
            RESERVED_DIR => FATEntry::ReservedDir,
            FINAL_CLUSTER => FATEntry::End,
            n => FATEntry::Next(n),
        }
    }
}

impl From<FATEntry> for u16 {
    fn from(entry: FATEntry) -> Self {
        match entry {
            FATEntry::Free => FREE_CLUSTER,
            FATEntry::ReservedFat => RESERVED_FAT,
            FATEntry::ReservedDir => RESERVED_DIR,
            FATEntry::End => FINAL_CLUSTER,
            FATEntry::Next(n) => n,
        }
    }
}

/// 管理内存中的 FAT 表, 并负责把它整体写回保留区
pub struct FATManager {
    entries: Vec<u16>,
    geometry: Geometry,
    device: ClusterDevice,
}

impl FATManager {
    pub(crate) fn new(geometry: Geometry, device: ClusterDevice) -> Self {
        Self {
            entries: vec![FREE_CLUSTER; geometry.total_clusters()],
            geometry,
            device,
        }
    }
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }
    /// 从 FAT 区读入整张表
    pub(crate) fn load(&mut self) -> Result<(), FSError> {
        let mut buf: ClusterBuf = [0; CLUSTER_SIZE];
        let per_cluster = CLUSTER_SIZE / BYTES_PER_ENTRY;
        for cluster_id in 0..self.geometry.fat_clusters() {
            self.device.read_cluster(cluster_id, &mut buf)?;
            let base = cluster_id * per_cluster;
            for (i, raw) in buf.chunks_exact(BYTES_PER_ENTRY).enumerate() {
                if let Some(entry) = self.entries.get_mut(base + i) {
                    *entry = u16::from_le_bytes([raw[0], raw[1]]);
                }
            }
        }
        Ok(())
    }
    /// 整张表写回 FAT 区, 表尾不足一簇的部分补 0
    pub(crate) fn sync(&self) -> Result<(), FSError> {
        let per_cluster = CLUSTER_SIZE / BYTES_PER_ENTRY;
        for cluster_id in 0..self.geometry.fat_clusters() {
            let mut buf: ClusterBuf = [0; CLUSTER_SIZE];
            let start = cluster_id * per_cluster;
            let end = (start + per_cluster).min(self.entries.len());
            for (i, entry) in self.entries[start..end].iter().enumerate() {
                buf[i * BYTES_PER_ENTRY..(i + 1) * BYTES_PER_ENTRY]
                    .copy_from_slice(&entry.to_le_bytes());
            }
            self.device.write_cluster(cluster_id, &buf)?;
        }
        Ok(())
    }
    pub fn entry(&self, cluster_id: usize) -> FATEntry {
        assert!(
            cluster_id < self.entries.len(),
            "Invalid Cluster ID {} in FAT",
            cluster_id
        );
        FATEntry::from(self.entries[cluster_id])
    }
    pub(crate) fn set_entry(&mut self, cluster_id: usize, entry: FATEntry) {
        assert!(
            cluster_id < self.entries.len(),
            "Invalid Cluster ID {} in FAT",
            cluster_id
        );
        self.entries[cluster_id] = entry.into();
    }
    pub(crate) fn set_next_cluster(&mut self, cluster_id: usize, next_cluster: usize) {
        // 数据区簇号一定小于 MAX_CLUSTERS, 不会截断
        self.set_entry(cluster_id, FATEntry::Next(next_cluster as u16));
    }
    pub(crate) fn set_end(&mut self, cluster_id: usize) {
        self.set_entry(cluster_id, FATEntry::End);
    }
    /// 链尾返回 None, 指向数据区之外或者非链表项的都视为损坏
    pub fn next_cluster(&self, cluster_id: usize) -> Result<Option<usize>, FSError> {
        match self.entry(cluster_id) {
            FATEntry::End => Ok(None),
            FATEntry::Next(n) if self.geometry.is_data_cluster(n as usize) => Ok(Some(n as usize)),
            other => {
                error!("cluster {} has bad link {:?}", cluster_id, other);
                Err(FSError::CorruptChain(cluster_id))
            }
        }
    }
    /// 返回整条簇链, 步数超过数据区簇数就认为有环
    pub fn chain(&self, start_cluster: usize) -> Result<Vec<usize>, FSError> {
        if !self.geometry.is_data_cluster(start_cluster) {
            error!("chain starts outside data region at {}", start_cluster);
            return Err(FSError::CorruptChain(start_cluster));
        }
        let max_steps = self.geometry.data_clusters();
        let mut clusters: Vec<usize> = Vec::new();
        let mut curr_cluster = start_cluster;
        loop {
            clusters.push(curr_cluster);
            if clusters.len() > max_steps {
                error!("cycle detected in chain starting at {}", start_cluster);
                return Err(FSError::CorruptChain(curr_cluster));
            }
            match self.next_cluster(curr_cluster)? {
                Some(next_cluster) => curr_cluster = next_cluster,
                None => return Ok(clusters),
            }
        }
    }
    pub fn count_clusters(&self, start_cluster: usize) -> Result<usize, FSError> {
        Ok(self.chain(start_cluster)?.len())
    }
    /// 在数据区线性搜索第一个空闲簇
    pub fn search_free_cluster(&self) -> Option<usize> {
        (self.geometry.first_data_cluster()..self.geometry.total_clusters())
            .find(|&cluster_id| self.entry(cluster_id) == FATEntry::Free)
    }
    /// 只是返回可以使用的簇 ID, 表项由调用者决定是 End 还是 Next
    pub(crate) fn alloc_cluster(&self) -> Result<usize, FSError> {
        let cluster_id = self.search_free_cluster().ok_or(FSError::NoSpace)?;
        debug!("alloc cluster {}", cluster_id);
        Ok(cluster_id)
    }
    /// 归还整条簇链, 先完整遍历一遍, 链损坏时不改动任何表项
    pub(crate) fn free_chain(&mut self, start_cluster: usize) -> Result<usize, FSError> {
        let clusters = self.chain(start_cluster)?;
        for &cluster_id in clusters.iter() {
            self.set_entry(cluster_id, FATEntry::Free);
        }
        debug!("free {} clusters from {}", clusters.len(), start_cluster);
        Ok(clusters.len())
    }
    pub fn count_free_clusters(&self) -> usize {
        (self.geometry.first_data_cluster()..self.geometry.total_clusters())
            .filter(|&cluster_id| self.entry(cluster_id) == FATEntry::Free)
            .count()
    }
    pub fn free_space_bytes(&self) -> usize {
        self.count_free_clusters() * CLUSTER_SIZE
    }
    /// 保留区的标记就是格式签名
    pub fn is_formatted(&self) -> bool {
        (0..self.geometry.fat_clusters()).all(|id| self.entry(id) == FATEntry::ReservedFat)
            && self.entry(self.geometry.dir_cluster()) == FATEntry::ReservedDir
    }
    pub(crate) fn format(&mut self) {
        for cluster_id in 0..self.entries.len() {
            let entry = if cluster_id < self.geometry.fat_clusters() {
                FATEntry::ReservedFat
            } else if cluster_id == self.geometry.dir_cluster() {
                FATEntry::ReservedDir
            } else {
                FATEntry::Free
            };
            self.set_entry(cluster_id, entry);
        }
    }
}
