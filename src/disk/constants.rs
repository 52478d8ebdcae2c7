/// Filesystems backed by a network share
pub const NETWORK_FS_TYPES: &[&str] = &["nfs", "nfs4", "smbfs", "cifs", "afpfs", "webdav"];

/// Filesystems backed by memory
pub const RAM_FS_TYPES: &[&str] = &["tmpfs", "ramfs", "devtmpfs"];

/// Block device prefixes that never represent physical storage
pub const IGNORED_BLOCK_DEVICES: &[&str] = &["loop", "ram", "zram", "fd"];

/// Size of a `/proc/diskstats` sector in bytes
pub const SECTOR_SIZE: u64 = 512;

pub const PROC_DISKSTATS_PATH: &str = "/proc/diskstats";
pub const SYS_BLOCK_PATH: &str = "/sys/block";
