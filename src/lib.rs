#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod block_device;
mod cluster_io;
mod config;
mod dir_entry;
mod error;
mod fat;
mod file;
mod flatfs;
mod geometry;
mod vfs;

use cluster_io::ClusterDevice;
use file::{OpenFile, OpenFileTable};

pub use block_device::{BlockDevice, MemoryBlockDevice};
pub use config::{
    CLUSTER_SIZE, DIR_ENTRIES, MAX_NAME_LEN, MAX_OPEN_FILES, SECTORS_PER_CLUSTER, SECTOR_SIZE,
};
pub use dir_entry::{DirectoryEntry, DirectoryManager};
pub use error::{FSError, IOError};
pub use fat::{FATEntry, FATManager, MAX_CLUSTERS};
pub use file::{FileHandle, OpenMode};
pub use flatfs::{FileStat, FlatFileSystem};
pub use geometry::Geometry;
