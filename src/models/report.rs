// One collection cycle's output

use serde::{Deserialize, Serialize};

use super::{CpuTimes, FileSystemStat, MemStat, Process, SystemLoad};

/// Everything gathered in one tick. Metrics that failed (or are disabled) are absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<SystemLoad>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<CpuTimes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpus: Option<Vec<CpuTimes>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem: Option<MemStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap: Option<MemStat>,
    #[serde(default)]
    pub processes: Vec<Process>,
    #[serde(default)]
    pub filesystems: Vec<FileSystemStat>,
}
