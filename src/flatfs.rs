// 文件系统全局管理: 挂载, 格式化, 以及目录层面的创建和删除
use super::{BlockDevice, ClusterDevice, DirectoryManager, FATManager, Geometry, OpenFileTable};
use crate::dir_entry::{check_name, DirectoryEntry};
use crate::error::FSError;
use alloc::string::String;
use alloc::sync::Arc;
use log::{debug, info};

/// 目录列表中的一项
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStat {
    pub name: String,
    pub size: usize,
}

impl From<&DirectoryEntry> for FileStat {
    fn from(entry: &DirectoryEntry) -> Self {
        Self {
            name: entry.name(),
            size: entry.size(),
        }
    }
}

/// FAT 表, 目录表和打开文件表都归这个实例所有.
/// 每个修改元数据的操作返回前都会把目录和 FAT 写回设备.
pub struct FlatFileSystem {
    pub(crate) device: ClusterDevice,
    pub(crate) geometry: Geometry,
    pub(crate) fat: FATManager,
    pub(crate) dir: DirectoryManager,
    pub(crate) open_files: OpenFileTable,
}

impl FlatFileSystem {
    /// 从设备读入 FAT 和目录, 没有找到格式签名就格式化
    pub fn mount(block_device: Arc<dyn BlockDevice>) -> Result<Self, FSError> {
        let device = ClusterDevice::new(block_device);
        let geometry = Geometry::new(device.total_blocks())?;
        let mut fat = FATManager::new(geometry, device.clone());
        fat.load()?;
        let mut dir = DirectoryManager::new(geometry.dir_cluster(), device.clone());
        dir.load()?;
        let mut fs = Self {
            device,
            geometry,
            fat,
            dir,
            open_files: OpenFileTable::new(),
        };
        if !fs.fat.is_formatted() {
            info!("no file system signature found, formatting");
            fs.format()?;
        }
        info!(
            "mounted: {} clusters, {} files, {} bytes free",
            geometry.total_clusters(),
            fs.dir.used_count(),
            fs.free_space_bytes()
        );
        Ok(fs)
    }
    /// 清空所有文件, 已打开的句柄全部失效
    pub fn format(&mut self) -> Result<(), FSError> {
        self.fat.format();
        self.dir.clear();
        self.open_files.clear();
        self.sync()?;
        info!(
            "formatted: FAT {} clusters, data region {} clusters",
            self.geometry.fat_clusters(),
            self.geometry.data_clusters()
        );
        Ok(())
    }
    pub fn is_formatted(&self) -> bool {
        self.fat.is_formatted()
    }
    /// 先写目录再写 FAT
    pub(crate) fn sync(&self) -> Result<(), FSError> {
        self.dir.sync()?;
        self.fat.sync()
    }
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }
    pub fn fat(&self) -> &FATManager {
        &self.fat
    }
    pub fn directory(&self) -> &DirectoryManager {
        &self.dir
    }
    pub fn free_space_bytes(&self) -> usize {
        self.fat.free_space_bytes()
    }
    pub fn open_file_count(&self) -> usize {
        self.open_files.len()
    }
    pub fn list(&self) -> impl Iterator<Item = FileStat> + '_ {
        self.dir.iter().map(|(_, entry)| FileStat::from(entry))
    }
    pub fn stat(&self, name: &str) -> Result<FileStat, FSError> {
        let slot = self.dir.find(name).ok_or(FSError::FileNotFound)?;
        Ok(FileStat::from(self.dir.entry(slot)))
    }
    pub fn create(&mut self, name: &str) -> Result<(), FSError> {
        self.create_entry(name).map(|_| ())
    }
    /// 新建长度为 0 的文件并分配一个簇, 返回目录槽位
    pub(crate) fn create_entry(&mut self, name: &str) -> Result<usize, FSError> {
        check_name(name)?;
        if self.dir.find(name).is_some() {
            return Err(FSError::DuplicateName);
        }
        let slot = self.dir.find_free().ok_or(FSError::DirectoryFull)?;
        let cluster_id = self.fat.alloc_cluster()?;
        self.fat.set_end(cluster_id);
        *self.dir.entry_mut(slot) = DirectoryEntry::new(name, cluster_id);
        self.sync()?;
        debug!("create {} at slot {}, cluster {}", name, slot, cluster_id);
        Ok(slot)
    }
    /// 删除文件并归还整条簇链, 打开中的文件不能删除
    pub fn remove(&mut self, name: &str) -> Result<(), FSError> {
        let slot = self.dir.find(name).ok_or(FSError::FileNotFound)?;
        if self.open_files.is_open(slot) {
            return Err(FSError::AlreadyOpen);
        }
        let freed = self.fat.free_chain(self.dir.entry(slot).first_cluster())?;
        self.dir.entry_mut(slot).delete();
        self.sync()?;
        debug!("remove {}, {} clusters freed", name, freed);
        Ok(())
    }
}
