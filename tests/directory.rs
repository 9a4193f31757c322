use flatfs::{FSError, FileStat, FlatFileSystem, MemoryBlockDevice, DIR_ENTRIES};
use std::sync::Arc;

fn new_fs(blocks: usize) -> FlatFileSystem {
    FlatFileSystem::mount(Arc::new(MemoryBlockDevice::new(blocks))).unwrap()
}

fn names(fs: &FlatFileSystem) -> Vec<String> {
    fs.list().map(|stat| stat.name).collect()
}

#[test]
fn create_and_list() {
    let mut fs = new_fs(8192);
    fs.create("hello.txt").unwrap();
    fs.create("world").unwrap();
    let listing: Vec<FileStat> = fs.list().collect();
    assert_eq!(
        listing,
        vec![
            FileStat {
                name: "hello.txt".to_string(),
                size: 0
            },
            FileStat {
                name: "world".to_string(),
                size: 0
            },
        ]
    );
    // 可以重复遍历
    assert_eq!(fs.list().count(), 2);
    assert_eq!(fs.stat("world").unwrap().size, 0);
}

#[test]
fn duplicate_name_rejected() {
    let mut fs = new_fs(8192);
    fs.create("a").unwrap();
    let free = fs.free_space_bytes();
    assert_eq!(fs.create("a"), Err(FSError::DuplicateName));
    assert_eq!(fs.free_space_bytes(), free);
    assert_eq!(fs.list().count(), 1);
}

#[test]
fn name_length_bounds() {
    let mut fs = new_fs(8192);
    let longest = "x".repeat(24);
    fs.create(&longest).unwrap();
    assert_eq!(fs.stat(&longest).unwrap().name, longest);
    assert_eq!(fs.create(&"y".repeat(25)), Err(FSError::NameTooLong));
    assert_eq!(fs.create(""), Err(FSError::InvalidName));
    assert_eq!(fs.create("a\0b"), Err(FSError::InvalidName));
}

#[test]
fn directory_capacity() {
    let mut fs = new_fs(8192);
    for i in 0..DIR_ENTRIES {
        fs.create(&format!("file{}", i)).unwrap();
    }
    assert_eq!(fs.create("one_more"), Err(FSError::DirectoryFull));
    fs.remove("file7").unwrap();
    fs.create("one_more").unwrap();
}

#[test]
fn remove_missing_file() {
    let mut fs = new_fs(8192);
    assert_eq!(fs.remove("ghost"), Err(FSError::FileNotFound));
    assert_eq!(fs.stat("ghost"), Err(FSError::FileNotFound));
}

#[test]
fn list_keeps_slot_order() {
    let mut fs = new_fs(8192);
    fs.create("a").unwrap();
    fs.create("b").unwrap();
    fs.create("c").unwrap();
    fs.remove("b").unwrap();
    fs.create("d").unwrap();
    assert_eq!(names(&fs), vec!["a", "d", "c"]);
}

#[test]
fn create_without_space() {
    // 8 个簇: FAT 1 个, 目录 1 个, 数据 6 个
    let mut fs = new_fs(64);
    for i in 0..6 {
        fs.create(&format!("f{}", i)).unwrap();
    }
    assert_eq!(fs.free_space_bytes(), 0);
    assert_eq!(fs.create("f6"), Err(FSError::NoSpace));
    assert_eq!(fs.list().count(), 6);
    assert_eq!(fs.stat("f6"), Err(FSError::FileNotFound));
}

#[test]
fn directory_survives_remount() {
    let device = Arc::new(MemoryBlockDevice::new(8192));
    let mut fs = FlatFileSystem::mount(device.clone()).unwrap();
    fs.create("kept").unwrap();
    fs.create("gone").unwrap();
    fs.remove("gone").unwrap();
    drop(fs);
    let fs = FlatFileSystem::mount(device).unwrap();
    assert_eq!(names(&fs), vec!["kept"]);
}
