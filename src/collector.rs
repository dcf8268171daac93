// One collection cycle: query every enabled metric family, derive percentages,
// and assemble a Report. A failed metric is logged and left out; it never
// aborts the rest of the cycle.

use regex::Regex;
use tracing::{debug, warn};

use crate::config::CollectionConfig;
use crate::error::{ErrorKind, Result};
use crate::metrics::MetricsReader;
use crate::models::{FileSystemStat, Percent, ProcConnections, Process, Report};
use crate::normalize::{SampleStore, percent};
use crate::provider::SystemMetricsProvider;

pub struct Collector<P> {
    reader: MetricsReader<P>,
    samples: SampleStore,
    config: CollectionConfig,
    procs: Vec<Regex>,
}

fn ok_or_warn<T>(operation: &'static str, result: Result<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(error = %e, operation, "metric collection failed");
            None
        }
    }
}

impl<P: SystemMetricsProvider> Collector<P> {
    pub fn new(reader: MetricsReader<P>, config: CollectionConfig) -> anyhow::Result<Self> {
        let procs = config.proc_patterns()?;
        Ok(Self {
            reader,
            samples: SampleStore::new(),
            config,
            procs,
        })
    }

    pub fn reader(&self) -> &MetricsReader<P> {
        &self.reader
    }

    pub fn samples(&self) -> &SampleStore {
        &self.samples
    }

    /// Run one cycle. CPU percentages are pending on the first call and are
    /// derived from the previous call's samples afterwards.
    pub fn collect(&self) -> Report {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_else(|e| {
                warn!(error = %e, operation = "get_timestamp", "system time error");
                0
            });
        let mut report = Report {
            timestamp,
            ..Report::default()
        };

        // memory is also needed for process rss_p
        let mem = if self.config.system || self.config.process {
            ok_or_warn("get_memory", self.reader.get_memory())
        } else {
            None
        };

        if self.config.system {
            report.load = ok_or_warn("get_system_load", self.reader.get_system_load());
            report.cpu = ok_or_warn("get_cpu_times", self.reader.get_cpu_times()).map(|mut cpu| {
                self.samples.apply_cpu(&mut cpu);
                cpu
            });
            if self.config.cpu_per_core {
                report.cpus = ok_or_warn("get_cpu_times_list", self.reader.get_cpu_times_list())
                    .map(|mut cpus| {
                        self.samples.apply_cpu_list(&mut cpus);
                        cpus
                    });
            }
            report.mem = mem;
            report.swap = ok_or_warn("get_swap", self.reader.get_swap());
        }

        if self.config.process {
            report.processes = self.collect_processes(mem.map(|m| m.total));
        }
        if self.config.filesystem {
            report.filesystems = self.collect_filesystems();
        }

        debug!(
            operation = "collect",
            processes = report.processes.len(),
            filesystems = report.filesystems.len(),
            "collection cycle done"
        );
        report
    }

    fn matches(&self, name: &str) -> bool {
        self.procs.iter().any(|re| re.is_match(name))
    }

    fn collect_processes(&self, mem_total: Option<u64>) -> Vec<Process> {
        let Some(pids) = ok_or_warn("list_process_ids", self.reader.list_process_ids()) else {
            return Vec::new();
        };
        let ticks_per_second = self.reader.provider().ticks_per_second();

        let mut processes = Vec::new();
        for &pid in &pids {
            let mut process = match self.reader.get_process(pid) {
                Ok(p) => p,
                Err(e) => {
                    // processes exit between enumeration and lookup all the time
                    if matches!(
                        e.kind(),
                        ErrorKind::NoSuchProcess | ErrorKind::PermissionDenied
                    ) {
                        debug!(pid, error = %e, operation = "get_process", "process skipped");
                    } else {
                        warn!(pid, error = %e, operation = "get_process", "process stats failed");
                    }
                    continue;
                }
            };
            if !self.matches(&process.name) {
                continue;
            }
            if let Some(total) = mem_total {
                process.mem.rss_percent = Percent::Ready(percent(process.mem.rss, total));
            }
            if self.config.connections {
                process.connections = ProcConnections {
                    connections: self.reader.get_process_connections(pid),
                };
            }
            self.samples.apply_process(&mut process, ticks_per_second);
            processes.push(process);
        }
        self.samples.retain_pids(&pids);
        processes
    }

    fn collect_filesystems(&self) -> Vec<FileSystemStat> {
        let Some(list) = ok_or_warn("list_file_systems", self.reader.list_file_systems()) else {
            return Vec::new();
        };
        list.iter()
            .filter_map(|fs| match self.reader.get_file_system_stat(fs) {
                Ok(stat) => Some(stat),
                Err(e) => {
                    warn!(
                        error = %e,
                        operation = "get_file_system_stat",
                        mount = %fs.dir_name,
                        "filesystem stats failed"
                    );
                    None
                }
            })
            .collect()
    }
}
