// OS-metrics provider capability and the raw counters it reports

mod host;
pub mod procfs;

pub use host::HostProvider;

use crate::error::ProviderError;
use crate::models::FileSystemDescriptor;

/// Clock ticks per second of procfs CPU counters when the OS cannot be asked (`USER_HZ`).
pub const USER_HZ: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

/// Raw CPU counters in clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuTicks {
    pub user: u64,
    pub nice: u64,
    pub sys: u64,
    pub idle: u64,
    pub wait: u64,
    pub irq: u64,
    pub soft_irq: u64,
    pub stolen: u64,
}

/// Memory in bytes. `actual_*` are adjusted for reclaimable cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawMem {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub actual_used: u64,
    pub actual_free: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSwap {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawProcState {
    pub name: String,
    /// Single-character state code as printed by the kernel (`R`, `S`, ...).
    pub state: u8,
    pub ppid: u32,
}

/// Process memory in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawProcMem {
    pub size: u64,
    pub resident: u64,
    pub share: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawProcTime {
    /// Clock ticks.
    pub user: u64,
    pub sys: u64,
    pub total: u64,
    /// Milliseconds since the Unix epoch; 0 when unknown.
    pub start_time_ms: u64,
}

/// Filesystem capacity in bytes plus inode counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawFsUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub avail: u64,
    pub files: u64,
    pub free_files: u64,
}

/// Source of raw host and process counters.
///
/// One method per metric family; every call is a fresh, blocking query.
/// Implementations must be shareable across threads.
pub trait SystemMetricsProvider: Send + Sync {
    fn load_average(&self) -> Result<LoadAverage, ProviderError>;

    /// Aggregate counters across all cores.
    fn cpu(&self) -> Result<CpuTicks, ProviderError>;

    /// One entry per core, in the order the OS reports them.
    fn cpu_list(&self) -> Result<Vec<CpuTicks>, ProviderError>;

    fn mem(&self) -> Result<RawMem, ProviderError>;

    fn swap(&self) -> Result<RawSwap, ProviderError>;

    fn pids(&self) -> Result<Vec<u32>, ProviderError>;

    fn proc_state(&self, pid: u32) -> Result<RawProcState, ProviderError>;

    fn proc_mem(&self, pid: u32) -> Result<RawProcMem, ProviderError>;

    fn proc_time(&self, pid: u32) -> Result<RawProcTime, ProviderError>;

    fn file_systems(&self) -> Result<Vec<FileSystemDescriptor>, ProviderError>;

    fn file_system_usage(&self, dir_name: &str) -> Result<RawFsUsage, ProviderError>;

    /// Raw text of the per-process TCP connection table.
    fn tcp_table(&self, pid: u32) -> std::io::Result<String>;

    /// Rate of the tick counters returned by `cpu` and `proc_time`.
    fn ticks_per_second(&self) -> u64 {
        USER_HZ
    }
}
