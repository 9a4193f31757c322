use super::ClusterDevice;
use crate::cluster_io::ClusterBuf;
use crate::config::{CLUSTER_SIZE, DIR_ENTRIES, MAX_NAME_LEN};
use crate::error::FSError;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use bitflags::bitflags;

pub(crate) const DIRENT_SZ: usize = 32; // 目录项字节数

// 目录表正好占满一个簇
const _: () = assert!(DIRENT_SZ * DIR_ENTRIES == CLUSTER_SIZE);

bitflags! {
    /// 目录项第 0 字节, 目前只用到最低位
    #[derive(Default)]
    #[repr(transparent)]
    pub struct EntryFlags: u8 {
        const USED = 0x01;
    }
}

/// 磁盘上的目录项, 32 字节
#[repr(C, packed)]
#[derive(Copy, Clone, Default)]
pub struct DirectoryEntry {
    flags: EntryFlags,
    name: [u8; MAX_NAME_LEN], // 不足部分用 0 填充
    _reserved: u8,
    first_cluster: u16,
    size: u32,
}

const _: () = assert!(core::mem::size_of::<DirectoryEntry>() == DIRENT_SZ);

impl DirectoryEntry {
    pub(crate) fn new(name: &str, first_cluster: usize) -> Self {
        let mut entry = Self {
            flags: EntryFlags::USED,
            first_cluster: first_cluster as u16,
            ..Self::default()
        };
        entry.name[..name.len()].copy_from_slice(name.as_bytes());
        entry
    }
    pub fn is_used(&self) -> bool {
        self.flags.contains(EntryFlags::USED)
    }
    pub fn name_bytes(&self) -> &[u8] {
        let len = self
            .name
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(MAX_NAME_LEN);
        &self.name[..len]
    }
    pub fn name(&self) -> String {
        String::from_utf8_lossy(self.name_bytes()).into_owned()
    }
    pub fn first_cluster(&self) -> usize {
        self.first_cluster as usize
    }
    pub fn size(&self) -> usize {
        self.size as usize
    }
    pub fn set_size(&mut self, size: usize) {
        self.size = size as u32;
    }
    pub fn delete(&mut self) {
        self.flags.remove(EntryFlags::USED);
    }
    pub fn as_bytes(&self) -> &[u8] {
        unsafe { core::slice::from_raw_parts(self as *const _ as *const u8, DIRENT_SZ) }
    }
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        unsafe { core::slice::from_raw_parts_mut(self as *mut _ as *mut u8, DIRENT_SZ) }
    }
}

/// 检查文件名: 1..=24 字节, 不含 0 字节
pub fn check_name(name: &str) -> Result<(), FSError> {
    if name.len() > MAX_NAME_LEN {
        return Err(FSError::NameTooLong);
    }
    if name.is_empty() || name.as_bytes().contains(&0) {
        return Err(FSError::InvalidName);
    }
    Ok(())
}

/// 扁平目录表, 常驻内存并整体写回目录簇
pub struct DirectoryManager {
    entries: Vec<DirectoryEntry>,
    cluster_id: usize,
    device: ClusterDevice,
}

impl DirectoryManager {
    pub(crate) fn new(cluster_id: usize, device: ClusterDevice) -> Self {
        Self {
            entries: vec![DirectoryEntry::default(); DIR_ENTRIES],
            cluster_id,
            device,
        }
    }
    pub(crate) fn load(&mut self) -> Result<(), FSError> {
        let mut buf: ClusterBuf = [0; CLUSTER_SIZE];
        self.device.read_cluster(self.cluster_id, &mut buf)?;
        for (entry, raw) in self.entries.iter_mut().zip(buf.chunks_exact(DIRENT_SZ)) {
            entry.as_bytes_mut().copy_from_slice(raw);
        }
        Ok(())
    }
    pub(crate) fn sync(&self) -> Result<(), FSError> {
        let mut buf: ClusterBuf = [0; CLUSTER_SIZE];
        for (entry, raw) in self.entries.iter().zip(buf.chunks_exact_mut(DIRENT_SZ)) {
            raw.copy_from_slice(entry.as_bytes());
        }
        self.device.write_cluster(self.cluster_id, &buf)
    }
    pub(crate) fn clear(&mut self) {
        self.entries.fill(DirectoryEntry::default());
    }
    pub fn find(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.is_used() && e.name_bytes() == name.as_bytes())
    }
    pub fn find_free(&self) -> Option<usize> {
        self.entries.iter().position(|e| !e.is_used())
    }
    pub fn entry(&self, slot: usize) -> &DirectoryEntry {
        &self.entries[slot]
    }
    pub(crate) fn entry_mut(&mut self, slot: usize) -> &mut DirectoryEntry {
        &mut self.entries[slot]
    }
    /// 按槽位顺序遍历已使用的目录项, 每次调用都从头开始
    pub fn iter(&self) -> impl Iterator<Item = (usize, &DirectoryEntry)> + '_ {
        self.entries.iter().enumerate().filter(|(_, e)| e.is_used())
    }
    pub fn used_count(&self) -> usize {
        self.iter().count()
    }
}
