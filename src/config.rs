/// 可以自行调整的变量

pub const SECTOR_SIZE: usize = 512; // 块设备扇区大小
pub const SECTORS_PER_CLUSTER: usize = 8;
pub const CLUSTER_SIZE: usize = SECTOR_SIZE * SECTORS_PER_CLUSTER; // 4096 Byte

pub const DIR_ENTRIES: usize = 128; // 目录表容量, 正好占满一个簇
pub const MAX_NAME_LEN: usize = 24;
pub const MAX_OPEN_FILES: usize = 32; // 打开文件表长度, 小于目录容量
