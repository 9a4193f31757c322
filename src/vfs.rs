// 文件读写: open/close/read/write, 负责跨簇以及按需分配
use super::{FATEntry, FileHandle, FlatFileSystem, OpenFile, OpenMode};
use crate::cluster_io::ClusterBuf;
use crate::config::CLUSTER_SIZE;
use crate::error::FSError;
use log::{debug, error, warn};

impl FlatFileSystem {
    /// 读模式要求文件存在; 写模式总是截断, 已有的同名文件先被删除再重建
    pub fn open(&mut self, name: &str, mode: OpenMode) -> Result<FileHandle, FSError> {
        let slot = match mode {
            OpenMode::Read => self.dir.find(name).ok_or(FSError::FileNotFound)?,
            OpenMode::Write => {
                if self.open_files.is_full() {
                    return Err(FSError::TooManyOpenFiles);
                }
                if self.dir.find(name).is_some() {
                    self.remove(name)?;
                }
                self.create_entry(name)?
            }
        };
        let first_cluster = self.dir.entry(slot).first_cluster();
        if !self.geometry.is_data_cluster(first_cluster) {
            error!("{} starts outside data region at {}", name, first_cluster);
            return Err(FSError::CorruptChain(first_cluster));
        }
        let file = OpenFile {
            slot,
            mode,
            current_cluster: first_cluster,
            offset: 0,
        };
        let handle = self.open_files.insert(file)?;
        debug!("open {} ({:?}) as {:?}", name, mode, handle);
        Ok(handle)
    }

    /// 写句柄关闭时把当前簇标记为链尾
    pub fn close(&mut self, handle: FileHandle) -> Result<(), FSError> {
        let file = self.open_files.remove(handle)?;
        if file.mode == OpenMode::Write && self.fat.entry(file.current_cluster) != FATEntry::End {
            self.fat.set_end(file.current_cluster);
            self.fat.sync()?;
        }
        debug!("close {:?}", handle);
        Ok(())
    }

    /// 返回实际写入的字节数. 中途没有空闲簇时只保留已写入的部分,
    /// 同样写回元数据并返回较小的字节数.
    pub fn write(&mut self, handle: FileHandle, data: &[u8]) -> Result<usize, FSError> {
        let mut file = *self.open_files.get(handle)?;
        if file.mode != OpenMode::Write {
            return Err(FSError::WrongMode);
        }
        let mut buf: ClusterBuf = [0; CLUSTER_SIZE];
        let mut written = 0usize;
        let mut result: Result<(), FSError> = Ok(());
        while written < data.len() {
            let offset_in_cluster = file.offset % CLUSTER_SIZE;
            // 当前簇已写满, 需要新簇
            let grow = offset_in_cluster == 0 && file.offset != 0;
            let target = if grow {
                match self.fat.alloc_cluster() {
                    Ok(id) => id,
                    Err(FSError::NoSpace) => {
                        warn!(
                            "no space left, wrote {} of {} bytes",
                            written,
                            data.len()
                        );
                        break;
                    }
                    Err(e) => {
                        result = Err(e);
                        break;
                    }
                }
            } else {
                file.current_cluster
            };
            let len = (CLUSTER_SIZE - offset_in_cluster).min(data.len() - written);
            if offset_in_cluster != 0 {
                if let Err(e) = self.device.read_cluster(target, &mut buf) {
                    result = Err(e);
                    break;
                }
            } else {
                buf.fill(0);
            }
            buf[offset_in_cluster..offset_in_cluster + len]
                .copy_from_slice(&data[written..written + len]);
            if let Err(e) = self.device.write_cluster(target, &buf) {
                result = Err(e);
                break;
            }
            // 数据落盘后才把新簇挂到链上
            if grow {
                self.fat.set_end(target);
                self.fat.set_next_cluster(file.current_cluster, target);
                file.current_cluster = target;
            }
            written += len;
            file.offset += len;
        }
        *self.open_files.get_mut(handle)? = file;
        let entry = self.dir.entry_mut(file.slot);
        entry.set_size(entry.size() + written);
        if let Err(e) = result {
            // 已写入的前缀尽量落盘, 返回的仍是设备错误
            if written > 0 && self.sync().is_err() {
                warn!("metadata flush after failed write also failed");
            }
            return Err(e);
        }
        if written > 0 {
            self.sync()?;
        }
        Ok(written)
    }

    /// 最多读 buf.len() 字节, 不会越过文件记录的大小, 到达文件末尾时返回 0
    pub fn read(&mut self, handle: FileHandle, buf: &mut [u8]) -> Result<usize, FSError> {
        let mut file = *self.open_files.get(handle)?;
        if file.mode != OpenMode::Read {
            return Err(FSError::WrongMode);
        }
        let size = self.dir.entry(file.slot).size();
        let to_read = buf.len().min(size.saturating_sub(file.offset));
        let mut cluster: ClusterBuf = [0; CLUSTER_SIZE];
        let mut read_size = 0usize;
        while read_size < to_read {
            let offset_in_cluster = file.offset % CLUSTER_SIZE;
            if offset_in_cluster == 0 && file.offset != 0 {
                file.current_cluster = self
                    .fat
                    .next_cluster(file.current_cluster)?
                    .ok_or(FSError::CorruptChain(file.current_cluster))?;
            }
            let len = (CLUSTER_SIZE - offset_in_cluster).min(to_read - read_size);
            self.device.read_cluster(file.current_cluster, &mut cluster)?;
            buf[read_size..read_size + len]
                .copy_from_slice(&cluster[offset_in_cluster..offset_in_cluster + len]);
            read_size += len;
            file.offset += len;
        }
        *self.open_files.get_mut(handle)? = file;
        Ok(read_size)
    }

    /// 句柄当前的文件偏移
    pub fn tell(&self, handle: FileHandle) -> Result<usize, FSError> {
        Ok(self.open_files.get(handle)?.offset)
    }
}
