// 打开文件表, 与目录槽位解耦, 句柄是表中的下标加代数
use crate::config::MAX_OPEN_FILES;
use crate::error::FSError;
use alloc::vec::Vec;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum OpenMode {
    Read,
    Write,
}

/// 打开文件的句柄.
/// 表项被释放时代数加一, 旧句柄即使下标被复用也不再有效.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct FileHandle {
    index: usize,
    generation: u32,
}

impl FileHandle {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// 每个句柄的读写游标.
/// offset 为簇大小的非零整数倍时, current_cluster 仍停在上一个簇,
/// 下一次读写才会前进 (写时才分配), 这样刚好写满一簇不会多占一个簇.
#[derive(Copy, Clone, Debug)]
pub struct OpenFile {
    pub slot: usize,
    pub mode: OpenMode,
    pub current_cluster: usize,
    pub offset: usize,
}

struct HandleSlot {
    generation: u32,
    file: Option<OpenFile>,
}

pub struct OpenFileTable {
    slots: Vec<HandleSlot>,
}

impl OpenFileTable {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }
    fn files(&self) -> impl Iterator<Item = &OpenFile> + '_ {
        self.slots.iter().filter_map(|s| s.file.as_ref())
    }
    pub fn is_open(&self, slot: usize) -> bool {
        self.files().any(|f| f.slot == slot)
    }
    pub fn insert(&mut self, file: OpenFile) -> Result<FileHandle, FSError> {
        if self.is_open(file.slot) {
            return Err(FSError::AlreadyOpen);
        }
        if let Some(index) = self.slots.iter().position(|s| s.file.is_none()) {
            let slot = &mut self.slots[index];
            slot.file = Some(file);
            return Ok(FileHandle {
                index,
                generation: slot.generation,
            });
        }
        if self.slots.len() >= MAX_OPEN_FILES {
            return Err(FSError::TooManyOpenFiles);
        }
        self.slots.push(HandleSlot {
            generation: 0,
            file: Some(file),
        });
        Ok(FileHandle {
            index: self.slots.len() - 1,
            generation: 0,
        })
    }
    fn slot_mut(&mut self, handle: FileHandle) -> Option<&mut HandleSlot> {
        self.slots
            .get_mut(handle.index)
            .filter(|s| s.generation == handle.generation && s.file.is_some())
    }
    pub fn get(&self, handle: FileHandle) -> Result<&OpenFile, FSError> {
        self.slots
            .get(handle.index)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.file.as_ref())
            .ok_or(FSError::InvalidHandle)
    }
    pub fn get_mut(&mut self, handle: FileHandle) -> Result<&mut OpenFile, FSError> {
        self.slot_mut(handle)
            .and_then(|s| s.file.as_mut())
            .ok_or(FSError::InvalidHandle)
    }
    pub fn remove(&mut self, handle: FileHandle) -> Result<OpenFile, FSError> {
        let slot = self.slot_mut(handle).ok_or(FSError::InvalidHandle)?;
        slot.generation = slot.generation.wrapping_add(1);
        slot.file.take().ok_or(FSError::InvalidHandle)
    }
    /// 关闭全部句柄, 之前发出的句柄全部失效
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            if slot.file.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
    }
    pub fn is_full(&self) -> bool {
        self.len() >= MAX_OPEN_FILES
    }
    pub fn len(&self) -> usize {
        self.files().count()
    }
}

impl Default for OpenFileTable {
    fn default() -> Self {
        Self::new()
    }
}
