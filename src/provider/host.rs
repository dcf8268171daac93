// Host provider: sysinfo for load/memory/swap/mounts, procfs for ticks and processes

use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use sysinfo::{Disks, System};
use tracing::instrument;

use super::procfs::{self, StatFile};
use super::{
    CpuTicks, LoadAverage, RawFsUsage, RawMem, RawProcMem, RawProcState, RawProcTime, RawSwap,
    SystemMetricsProvider, USER_HZ,
};
use crate::error::ProviderError;
use crate::models::FileSystemDescriptor;

/// Default provider for the running host.
///
/// Process, CPU tick and TCP table reads go through `proc_root` so the provider
/// can inspect a host procfs mounted elsewhere (e.g. `/hostfs/proc` in a container).
/// Load, memory, swap and mounts come from sysinfo, which always reads the
/// procfs of the namespace this process runs in.
pub struct HostProvider {
    proc_root: PathBuf,
    ticks_per_second: u64,
    /// `btime` from `<proc_root>/stat`; fixed for the boot session.
    boot_time: OnceLock<u64>,
    sys: Mutex<System>,
    disks: Mutex<Disks>,
}

impl Default for HostProvider {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl HostProvider {
    pub fn new(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            ticks_per_second: clock_ticks(),
            boot_time: OnceLock::new(),
            sys: Mutex::new(System::new()),
            disks: Mutex::new(Disks::new_with_refreshed_list()),
        }
    }

    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }

    fn read_stat(&self) -> Result<StatFile, ProviderError> {
        let path = self.proc_root.join("stat");
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ProviderError::Unavailable(format!("read {}: {}", path.display(), e))
        })?;
        procfs::parse_stat(&content)
    }

    fn read_pid_file(&self, pid: u32, name: &str) -> Result<String, ProviderError> {
        let path = self.proc_root.join(pid.to_string()).join(name);
        std::fs::read_to_string(path).map_err(|e| ProviderError::from_process_io(pid, e))
    }

    /// Cached once read; a failed read is retried on the next call.
    fn boot_time(&self) -> Option<u64> {
        if let Some(btime) = self.boot_time.get() {
            return Some(*btime);
        }
        let btime = self.read_stat().ok()?.boot_time?;
        Some(*self.boot_time.get_or_init(|| btime))
    }

    fn with_sys<T>(&self, f: impl FnOnce(&mut System) -> T) -> Result<T, ProviderError> {
        let mut sys = self
            .sys
            .lock()
            .map_err(|e| ProviderError::Unavailable(format!("sysinfo lock poisoned: {}", e)))?;
        Ok(f(&mut *sys))
    }
}

impl SystemMetricsProvider for HostProvider {
    #[instrument(skip(self), fields(repo = "host", operation = "load_average"))]
    fn load_average(&self) -> Result<LoadAverage, ProviderError> {
        let avg = System::load_average();
        Ok(LoadAverage {
            one: avg.one,
            five: avg.five,
            fifteen: avg.fifteen,
        })
    }

    #[instrument(skip(self), fields(repo = "host", operation = "cpu"))]
    fn cpu(&self) -> Result<CpuTicks, ProviderError> {
        Ok(self.read_stat()?.total)
    }

    #[instrument(skip(self), fields(repo = "host", operation = "cpu_list"))]
    fn cpu_list(&self) -> Result<Vec<CpuTicks>, ProviderError> {
        Ok(self.read_stat()?.cores)
    }

    #[instrument(skip(self), fields(repo = "host", operation = "mem"))]
    fn mem(&self) -> Result<RawMem, ProviderError> {
        self.with_sys(|sys| {
            sys.refresh_memory();
            let total = sys.total_memory();
            let free = sys.free_memory();
            let available = sys.available_memory();
            RawMem {
                total,
                used: total.saturating_sub(free),
                free,
                actual_used: total.saturating_sub(available),
                actual_free: available,
            }
        })
    }

    #[instrument(skip(self), fields(repo = "host", operation = "swap"))]
    fn swap(&self) -> Result<RawSwap, ProviderError> {
        self.with_sys(|sys| {
            sys.refresh_memory();
            RawSwap {
                total: sys.total_swap(),
                used: sys.used_swap(),
                free: sys.free_swap(),
            }
        })
    }

    #[instrument(skip(self), fields(repo = "host", operation = "pids"))]
    fn pids(&self) -> Result<Vec<u32>, ProviderError> {
        let entries = std::fs::read_dir(&self.proc_root).map_err(|e| {
            ProviderError::Unavailable(format!("read {}: {}", self.proc_root.display(), e))
        })?;
        let mut pids: Vec<u32> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
            .collect();
        pids.sort_unstable();
        Ok(pids)
    }

    fn proc_state(&self, pid: u32) -> Result<RawProcState, ProviderError> {
        let stat = procfs::parse_pid_stat(&self.read_pid_file(pid, "stat")?)?;
        Ok(RawProcState {
            name: stat.name,
            state: stat.state,
            ppid: stat.ppid,
        })
    }

    fn proc_mem(&self, pid: u32) -> Result<RawProcMem, ProviderError> {
        let status = procfs::parse_pid_status(&self.read_pid_file(pid, "status")?);
        Ok(RawProcMem {
            size: status.vm_size_kb * 1024,
            resident: status.vm_rss_kb * 1024,
            share: (status.rss_file_kb + status.rss_shmem_kb) * 1024,
        })
    }

    fn proc_time(&self, pid: u32) -> Result<RawProcTime, ProviderError> {
        let stat = procfs::parse_pid_stat(&self.read_pid_file(pid, "stat")?)?;
        // start time stays unknown (0) when btime is unreadable
        let start_time_ms = self
            .boot_time()
            .map(|btime| btime * 1000 + stat.starttime * 1000 / self.ticks_per_second)
            .unwrap_or(0);
        Ok(RawProcTime {
            user: stat.utime,
            sys: stat.stime,
            total: stat.utime + stat.stime,
            start_time_ms,
        })
    }

    #[instrument(skip(self), fields(repo = "host", operation = "file_systems"))]
    fn file_systems(&self) -> Result<Vec<FileSystemDescriptor>, ProviderError> {
        let mut disks = self.disks.lock().map_err(|e| {
            ProviderError::Unavailable(format!("sysinfo disks lock poisoned: {}", e))
        })?;
        disks.refresh(true);
        Ok(disks
            .list()
            .iter()
            .map(|d| FileSystemDescriptor {
                dev_name: d.name().to_string_lossy().into_owned(),
                dir_name: d.mount_point().to_string_lossy().into_owned(),
                sys_type_name: d.file_system().to_string_lossy().into_owned(),
            })
            .collect())
    }

    #[cfg(unix)]
    #[instrument(skip(self), fields(repo = "host", operation = "file_system_usage"))]
    fn file_system_usage(&self, dir_name: &str) -> Result<RawFsUsage, ProviderError> {
        let stat =
            nix::sys::statvfs::statvfs(dir_name).map_err(|e| ProviderError::PathUnavailable {
                path: dir_name.to_string(),
                source: std::io::Error::from(e),
            })?;
        let frsize = stat.fragment_size() as u64;
        let total = stat.blocks() as u64 * frsize;
        let free = stat.blocks_free() as u64 * frsize;
        Ok(RawFsUsage {
            total,
            used: total.saturating_sub(free),
            free,
            avail: stat.blocks_available() as u64 * frsize,
            files: stat.files() as u64,
            free_files: stat.files_free() as u64,
        })
    }

    #[cfg(not(unix))]
    fn file_system_usage(&self, dir_name: &str) -> Result<RawFsUsage, ProviderError> {
        Err(ProviderError::PathUnavailable {
            path: dir_name.to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "statvfs is not available on this platform",
            ),
        })
    }

    fn tcp_table(&self, pid: u32) -> std::io::Result<String> {
        std::fs::read_to_string(self.proc_root.join(pid.to_string()).join("net").join("tcp"))
    }

    fn ticks_per_second(&self) -> u64 {
        self.ticks_per_second
    }
}

#[cfg(unix)]
fn clock_ticks() -> u64 {
    use nix::unistd::{SysconfVar, sysconf};
    match sysconf(SysconfVar::CLK_TCK) {
        Ok(Some(hz)) if hz > 0 => hz as u64,
        other => {
            tracing::debug!(result = ?other, "CLK_TCK unavailable, assuming {}", USER_HZ);
            USER_HZ
        }
    }
}

#[cfg(not(unix))]
fn clock_ticks() -> u64 {
    USER_HZ
}
