use core::fmt;

/// 块设备层的错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IOError {
    /// 扇区号超出设备范围
    OutOfRange(usize),
    /// 缓冲区长度不等于扇区大小
    BadBufferSize(usize),
    DeviceFault,
}

impl fmt::Display for IOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IOError::OutOfRange(id) => write!(f, "sector {} out of device range", id),
            IOError::BadBufferSize(len) => write!(f, "buffer of {} bytes is not one sector", len),
            IOError::DeviceFault => write!(f, "device fault"),
        }
    }
}

/// 文件系统各层统一返回的错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FSError {
    NameTooLong,
    InvalidName,
    DuplicateName,
    DirectoryFull,
    NoSpace,
    FileNotFound,
    InvalidHandle,
    WrongMode,
    AlreadyOpen,
    TooManyOpenFiles,
    CorruptChain(usize),
    DeviceTooSmall,
    IOError(IOError),
}

impl From<IOError> for FSError {
    fn from(e: IOError) -> Self {
        FSError::IOError(e)
    }
}

impl fmt::Display for FSError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FSError::NameTooLong => write!(f, "file name too long"),
            FSError::InvalidName => write!(f, "invalid file name"),
            FSError::DuplicateName => write!(f, "file already exists"),
            FSError::DirectoryFull => write!(f, "directory is full"),
            FSError::NoSpace => write!(f, "no free cluster left"),
            FSError::FileNotFound => write!(f, "file not found"),
            FSError::InvalidHandle => write!(f, "invalid file handle"),
            FSError::WrongMode => write!(f, "file not opened in this mode"),
            FSError::AlreadyOpen => write!(f, "file is already open"),
            FSError::TooManyOpenFiles => write!(f, "open file table is full"),
            FSError::CorruptChain(id) => write!(f, "corrupt cluster chain at cluster {}", id),
            FSError::DeviceTooSmall => write!(f, "device too small to hold the file system"),
            FSError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for IOError {}

#[cfg(feature = "std")]
impl std::error::Error for FSError {}
