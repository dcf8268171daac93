// Filesystem descriptor and usage models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Opaque handle for one mounted filesystem, as returned by enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemDescriptor {
    pub dev_name: String,
    pub dir_name: String,
    pub sys_type_name: String,
}

/// Capacity in bytes, inode counts in `files`/`free_files`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSystemStat {
    #[serde(rename = "device_name")]
    pub dev_name: String,
    pub total: u64,
    pub used: u64,
    #[serde(rename = "used_p")]
    pub used_percent: f64,
    pub free: u64,
    pub avail: u64,
    pub files: u64,
    pub free_files: u64,
    #[serde(rename = "mount_point")]
    pub mount: String,
    #[serde(skip)]
    pub(crate) sampled_at: Option<Instant>,
}

impl FileSystemStat {
    pub fn sampled_at(&self) -> Option<Instant> {
        self.sampled_at
    }
}

impl fmt::Display for FileSystemStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "device name: {}, total: {}, used {}, used pct {:.2}, free: {}, avail: {}, files: {}, free files: {}, mount: {}",
            self.dev_name,
            self.total,
            self.used,
            self.used_percent,
            self.free,
            self.avail,
            self.files,
            self.free_files,
            self.mount
        )
    }
}
