// Raw metrics accessor: one query per metric family, mapped onto output records

use std::time::Instant;

use chrono::Local;
use tracing::{debug, instrument};

use crate::connections::parse_tcp_table;
use crate::error::{MetricsError, ProcessQuery, ProviderError, Result};
use crate::models::*;
use crate::normalize::{decode_state, format_start_time, percent};
use crate::provider::{CpuTicks, SystemMetricsProvider};

/// Reads metrics from a provider. Holds no state; every call re-queries.
pub struct MetricsReader<P> {
    provider: P,
}

impl<P: SystemMetricsProvider> MetricsReader<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[instrument(skip(self), fields(repo = "metrics", operation = "get_system_load"))]
    pub fn get_system_load(&self) -> Result<SystemLoad> {
        let avg = self.provider.load_average()?;
        Ok(SystemLoad {
            load1: avg.one,
            load5: avg.five,
            load15: avg.fifteen,
        })
    }

    /// Aggregate across all cores. Percentages are pending; see `SampleStore::apply_cpu`.
    #[instrument(skip(self), fields(repo = "metrics", operation = "get_cpu_times"))]
    pub fn get_cpu_times(&self) -> Result<CpuTimes> {
        Ok(cpu_times(&self.provider.cpu()?))
    }

    #[instrument(skip(self), fields(repo = "metrics", operation = "get_cpu_times_list"))]
    pub fn get_cpu_times_list(&self) -> Result<Vec<CpuTimes>> {
        Ok(self.provider.cpu_list()?.iter().map(cpu_times).collect())
    }

    #[instrument(skip(self), fields(repo = "metrics", operation = "get_memory"))]
    pub fn get_memory(&self) -> Result<MemStat> {
        let mem = self.provider.mem()?;
        Ok(MemStat {
            total: mem.total,
            used: mem.used,
            free: mem.free,
            used_percent: percent(mem.used, mem.total),
            actual_used: mem.actual_used,
            actual_free: mem.actual_free,
            actual_used_percent: percent(mem.actual_used, mem.total),
        })
    }

    #[instrument(skip(self), fields(repo = "metrics", operation = "get_swap"))]
    pub fn get_swap(&self) -> Result<MemStat> {
        let swap = self.provider.swap()?;
        Ok(MemStat {
            total: swap.total,
            used: swap.used,
            free: swap.free,
            used_percent: percent(swap.used, swap.total),
            ..MemStat::default()
        })
    }

    #[instrument(skip(self), fields(repo = "metrics", operation = "list_process_ids"))]
    pub fn list_process_ids(&self) -> Result<Vec<u32>> {
        Ok(self.provider.pids()?)
    }

    /// Query state, memory and CPU time of one process.
    ///
    /// The first failing sub-query aborts the lookup with an error naming it.
    /// Connections are left empty and `rss_p`/`user_p` pending.
    #[instrument(skip(self), fields(repo = "metrics", operation = "get_process"))]
    pub fn get_process(&self, pid: u32) -> Result<Process> {
        let wrap = |query: ProcessQuery| {
            move |source: ProviderError| MetricsError::Process { pid, query, source }
        };
        let state = self
            .provider
            .proc_state(pid)
            .map_err(wrap(ProcessQuery::State))?;
        let mem = self
            .provider
            .proc_mem(pid)
            .map_err(wrap(ProcessQuery::Mem))?;
        let cpu = self
            .provider
            .proc_time(pid)
            .map_err(wrap(ProcessQuery::Cpu))?;

        let process = Process::new(
            pid,
            state.ppid,
            state.name,
            decode_state(state.state),
            ProcMemStat {
                size: mem.size,
                rss: mem.resident,
                rss_percent: Percent::Pending,
                share: mem.share,
            },
            ProcCpuTime {
                user: cpu.user,
                user_percent: Percent::Pending,
                system: cpu.sys,
                total: cpu.total,
                start: format_start_time(cpu.start_time_ms, Local::now()),
            },
        );
        Ok(process.with_sampled_at(Instant::now()))
    }

    /// TCP connections of one process. Never fails: an unreadable table yields none.
    pub fn get_process_connections(&self, pid: u32) -> Vec<ProcConnection> {
        match self.provider.tcp_table(pid) {
            Ok(content) => parse_tcp_table(&content),
            Err(e) => {
                debug!(pid, error = %e, operation = "get_process_connections", "tcp table unreadable");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self), fields(repo = "metrics", operation = "list_file_systems"))]
    pub fn list_file_systems(&self) -> Result<Vec<FileSystemDescriptor>> {
        Ok(self.provider.file_systems()?)
    }

    #[instrument(skip(self, fs), fields(repo = "metrics", operation = "get_file_system_stat", mount = %fs.dir_name))]
    pub fn get_file_system_stat(&self, fs: &FileSystemDescriptor) -> Result<FileSystemStat> {
        let usage = self.provider.file_system_usage(&fs.dir_name)?;
        Ok(FileSystemStat {
            dev_name: fs.dev_name.clone(),
            total: usage.total,
            used: usage.used,
            used_percent: percent(usage.used, usage.total),
            free: usage.free,
            avail: usage.avail,
            files: usage.files,
            free_files: usage.free_files,
            mount: fs.dir_name.clone(),
            sampled_at: Some(Instant::now()),
        })
    }
}

fn cpu_times(t: &CpuTicks) -> CpuTimes {
    CpuTimes {
        user: t.user,
        user_percent: Percent::Pending,
        nice: t.nice,
        system: t.sys,
        system_percent: Percent::Pending,
        idle: t.idle,
        iowait: t.wait,
        irq: t.irq,
        softirq: t.soft_irq,
        steal: t.stolen,
    }
}
