// Shared test helpers: an in-memory provider with injectable failures

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use sysmetrics::ProviderError;
use sysmetrics::models::FileSystemDescriptor;
use sysmetrics::provider::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Failure {
    Load,
    Cpu,
    CpuList,
    Mem,
    Swap,
    Pids,
    ProcState(u32),
    ProcMem(u32),
    ProcTime(u32),
    FileSystems,
    FsUsage(String),
}

#[derive(Debug, Clone)]
pub struct FakeProc {
    pub state: RawProcState,
    pub mem: RawProcMem,
    pub time: RawProcTime,
}

pub fn fake_proc(name: &str, state: u8, ppid: u32, rss: u64, ticks: u64) -> FakeProc {
    FakeProc {
        state: RawProcState {
            name: name.into(),
            state,
            ppid,
        },
        mem: RawProcMem {
            size: rss * 4,
            resident: rss,
            share: rss / 2,
        },
        time: RawProcTime {
            user: ticks - ticks / 4,
            sys: ticks / 4,
            total: ticks,
            start_time_ms: 0,
        },
    }
}

#[derive(Default)]
pub struct FakeProvider {
    pub load: LoadAverage,
    pub cpu: Mutex<CpuTicks>,
    pub cores: Mutex<Vec<CpuTicks>>,
    pub mem: RawMem,
    pub swap: RawSwap,
    pub procs: Mutex<BTreeMap<u32, FakeProc>>,
    pub filesystems: Vec<(FileSystemDescriptor, RawFsUsage)>,
    pub tcp_tables: HashMap<u32, String>,
    pub failures: Mutex<HashSet<Failure>>,
}

impl FakeProvider {
    pub fn fail(&self, f: Failure) {
        self.failures.lock().unwrap().insert(f);
    }

    pub fn recover(&self, f: &Failure) {
        self.failures.lock().unwrap().remove(f);
    }

    fn check(&self, f: Failure, err: impl FnOnce() -> ProviderError) -> Result<(), ProviderError> {
        if self.failures.lock().unwrap().contains(&f) {
            Err(err())
        } else {
            Ok(())
        }
    }

    fn proc(&self, pid: u32) -> Result<FakeProc, ProviderError> {
        self.procs
            .lock()
            .unwrap()
            .get(&pid)
            .cloned()
            .ok_or(ProviderError::NoSuchProcess { pid })
    }

    pub fn set_cpu(&self, cpu: CpuTicks) {
        *self.cpu.lock().unwrap() = cpu;
    }

    pub fn set_proc_ticks(&self, pid: u32, ticks: u64) {
        if let Some(p) = self.procs.lock().unwrap().get_mut(&pid) {
            p.time.total = ticks;
            p.time.user = ticks;
            p.time.sys = 0;
        }
    }

    pub fn remove_proc(&self, pid: u32) {
        self.procs.lock().unwrap().remove(&pid);
    }
}

fn unavailable(what: &str) -> impl FnOnce() -> ProviderError + '_ {
    move || ProviderError::Unavailable(format!("{} failed", what))
}

impl SystemMetricsProvider for FakeProvider {
    fn load_average(&self) -> Result<LoadAverage, ProviderError> {
        self.check(Failure::Load, unavailable("load"))?;
        Ok(self.load)
    }

    fn cpu(&self) -> Result<CpuTicks, ProviderError> {
        self.check(Failure::Cpu, unavailable("cpu"))?;
        Ok(*self.cpu.lock().unwrap())
    }

    fn cpu_list(&self) -> Result<Vec<CpuTicks>, ProviderError> {
        self.check(Failure::CpuList, unavailable("cpu list"))?;
        Ok(self.cores.lock().unwrap().clone())
    }

    fn mem(&self) -> Result<RawMem, ProviderError> {
        self.check(Failure::Mem, unavailable("mem"))?;
        Ok(self.mem)
    }

    fn swap(&self) -> Result<RawSwap, ProviderError> {
        self.check(Failure::Swap, unavailable("swap"))?;
        Ok(self.swap)
    }

    fn pids(&self) -> Result<Vec<u32>, ProviderError> {
        self.check(Failure::Pids, unavailable("pids"))?;
        Ok(self.procs.lock().unwrap().keys().copied().collect())
    }

    fn proc_state(&self, pid: u32) -> Result<RawProcState, ProviderError> {
        self.check(Failure::ProcState(pid), || {
            ProviderError::PermissionDenied { pid }
        })?;
        Ok(self.proc(pid)?.state)
    }

    fn proc_mem(&self, pid: u32) -> Result<RawProcMem, ProviderError> {
        self.check(Failure::ProcMem(pid), || ProviderError::NoSuchProcess { pid })?;
        Ok(self.proc(pid)?.mem)
    }

    fn proc_time(&self, pid: u32) -> Result<RawProcTime, ProviderError> {
        self.check(Failure::ProcTime(pid), unavailable("cpu time"))?;
        Ok(self.proc(pid)?.time)
    }

    fn file_systems(&self) -> Result<Vec<FileSystemDescriptor>, ProviderError> {
        self.check(Failure::FileSystems, unavailable("file systems"))?;
        Ok(self.filesystems.iter().map(|(d, _)| d.clone()).collect())
    }

    fn file_system_usage(&self, dir_name: &str) -> Result<RawFsUsage, ProviderError> {
        let path_unavailable = || ProviderError::PathUnavailable {
            path: dir_name.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not mounted"),
        };
        self.check(Failure::FsUsage(dir_name.to_string()), path_unavailable)?;
        self.filesystems
            .iter()
            .find(|(d, _)| d.dir_name == dir_name)
            .map(|(_, u)| *u)
            .ok_or_else(path_unavailable)
    }

    fn tcp_table(&self, pid: u32) -> std::io::Result<String> {
        self.tcp_tables.get(&pid).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no tcp table")
        })
    }
}

pub fn descriptor(dev: &str, dir: &str) -> FileSystemDescriptor {
    FileSystemDescriptor {
        dev_name: dev.into(),
        dir_name: dir.into(),
        sys_type_name: "ext4".into(),
    }
}

pub const TCP_TABLE: &str = "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 0100007F:1F90 00000000:0000 0A 00000000:00000000 00:00000000 00000000  1000        0 23456 1 0000000000000000 100 0 0 10 0
   1: 0F02000A:0016 0202000A:D3C8 01 00000000:00000000 02:0000089F 00000000     0        0 34567 4 0000000000000000 20 4 31 10 -1
";

/// A host with 8 GiB RAM, two processes, two mounts and one TCP table.
pub fn sample_provider() -> FakeProvider {
    let mut procs = BTreeMap::new();
    procs.insert(1, fake_proc("init", b'S', 0, 4 * 1024 * 1024, 400));
    procs.insert(42, fake_proc("nginx", b'R', 1, 512 * 1024 * 1024, 1_000));
    let mut tcp_tables = HashMap::new();
    tcp_tables.insert(42, TCP_TABLE.to_string());
    FakeProvider {
        load: LoadAverage {
            one: 0.5,
            five: 0.25,
            fifteen: 0.125,
        },
        cpu: Mutex::new(CpuTicks {
            user: 1000,
            nice: 10,
            sys: 500,
            idle: 8000,
            wait: 100,
            irq: 5,
            soft_irq: 15,
            stolen: 0,
        }),
        cores: Mutex::new(vec![
            CpuTicks {
                user: 600,
                idle: 4000,
                ..CpuTicks::default()
            },
            CpuTicks {
                user: 400,
                idle: 4000,
                ..CpuTicks::default()
            },
        ]),
        mem: RawMem {
            total: 8 * 1024 * 1024 * 1024,
            used: 6 * 1024 * 1024 * 1024,
            free: 2 * 1024 * 1024 * 1024,
            actual_used: 3 * 1024 * 1024 * 1024,
            actual_free: 5 * 1024 * 1024 * 1024,
        },
        swap: RawSwap {
            total: 1024,
            used: 256,
            free: 768,
        },
        procs: Mutex::new(procs),
        filesystems: vec![
            (
                descriptor("/dev/sda1", "/"),
                RawFsUsage {
                    total: 1000,
                    used: 400,
                    free: 600,
                    avail: 550,
                    files: 100,
                    free_files: 60,
                },
            ),
            (
                descriptor("tmpfs", "/run/empty"),
                RawFsUsage::default(),
            ),
        ],
        tcp_tables,
        failures: Mutex::new(HashSet::new()),
    }
}
