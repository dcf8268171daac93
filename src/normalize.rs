// Derived values: percentages, process state decoding, start time formatting,
// and the previous-sample store that rate-based percentages are computed against.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use chrono::{DateTime, Local, TimeZone};

use crate::models::{CpuTimes, Percent, ProcState, Process};

/// `used / total * 100`, or 0 when `total` is 0.
pub fn percent(used: u64, total: u64) -> f64 {
    if total > 0 {
        (used as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Map a kernel state code to a `ProcState`. 'D' (uninterruptible wait) reads as idle.
pub fn decode_state(code: u8) -> ProcState {
    match code {
        b'S' => ProcState::Sleeping,
        b'R' => ProcState::Running,
        b'D' => ProcState::Idle,
        b'T' => ProcState::Stopped,
        b'Z' => ProcState::Zombie,
        _ => ProcState::Unknown,
    }
}

/// User and system share of the ticks elapsed between two CPU samples.
///
/// The elapsed time is the growth of the sum of all counters, which already
/// scales with the number of cores the sample covers. Both values are pending
/// without a previous sample or when no ticks elapsed.
pub fn cpu_percentages(prev: Option<&CpuTimes>, cur: &CpuTimes) -> (Percent, Percent) {
    let Some(prev) = prev else {
        return (Percent::Pending, Percent::Pending);
    };
    let elapsed = cur.total().saturating_sub(prev.total());
    if elapsed == 0 {
        return (Percent::Pending, Percent::Pending);
    }
    let share = |now: u64, before: u64| {
        let delta = now.saturating_sub(before) as f64;
        Percent::Ready((delta / elapsed as f64 * 100.0).clamp(0.0, 100.0))
    };
    (share(cur.user, prev.user), share(cur.system, prev.system))
}

/// Busy ticks of one process at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcCpuSample {
    pub total_ticks: u64,
    pub at: Instant,
}

impl ProcCpuSample {
    pub fn of(process: &Process) -> Option<Self> {
        Some(Self {
            total_ticks: process.cpu.total,
            at: process.sampled_at()?,
        })
    }
}

/// `(Δticks / ticks_per_second) / Δwall_secs * 100`, clamped to [0, 100].
///
/// Pending without a previous sample, when no wall time elapsed, or when the
/// counter went backwards (the pid was reused by a new process).
pub fn proc_cpu_percent(
    prev: Option<&ProcCpuSample>,
    cur: &ProcCpuSample,
    ticks_per_second: u64,
) -> Percent {
    let Some(prev) = prev else {
        return Percent::Pending;
    };
    let wall = cur.at.saturating_duration_since(prev.at).as_secs_f64();
    if wall <= 0.0 || ticks_per_second == 0 || cur.total_ticks < prev.total_ticks {
        return Percent::Pending;
    }
    let busy_secs = (cur.total_ticks - prev.total_ticks) as f64 / ticks_per_second as f64;
    Percent::Ready((busy_secs / wall * 100.0).clamp(0.0, 100.0))
}

/// Format a process start time: "HH:MM" when it started today, "MonDD" otherwise,
/// "0" when unknown.
pub fn format_start_time(start_time_ms: u64, now: DateTime<Local>) -> String {
    if start_time_ms == 0 {
        return "0".into();
    }
    let Some(start) = Local.timestamp_millis_opt(start_time_ms as i64).single() else {
        return "0".into();
    };
    if start.date_naive() == now.date_naive() {
        start.format("%H:%M").to_string()
    } else {
        start.format("%b%d").to_string()
    }
}

#[derive(Debug, Default)]
struct Samples {
    cpu: Option<CpuTimes>,
    cores: Vec<CpuTimes>,
    procs: HashMap<u32, ProcCpuSample>,
}

/// Previous samples for rate-based percentages, owned by the caller.
///
/// Holds the last aggregate CPU sample, the last per-core samples and the last
/// CPU sample of every pid seen. Safe to share between threads; every update
/// takes a single lock. Dead pids are dropped by `retain_pids`.
#[derive(Debug, Default)]
pub struct SampleStore {
    inner: Mutex<Samples>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Samples> {
        // samples are only ever replaced whole, so a poisoned store is still consistent
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fill `user_p`/`system_p` from the previous aggregate sample, then remember `cur`.
    pub fn apply_cpu(&self, cur: &mut CpuTimes) {
        let mut s = self.lock();
        let (user, system) = cpu_percentages(s.cpu.as_ref(), cur);
        cur.user_percent = user;
        cur.system_percent = system;
        s.cpu = Some(*cur);
    }

    /// Per-core variant of `apply_cpu`; cores are matched by position.
    pub fn apply_cpu_list(&self, cur: &mut [CpuTimes]) {
        let mut s = self.lock();
        for (i, core) in cur.iter_mut().enumerate() {
            let (user, system) = cpu_percentages(s.cores.get(i), core);
            core.user_percent = user;
            core.system_percent = system;
        }
        s.cores = cur.to_vec();
    }

    /// Fill the process `user_p` from its previous sample, then remember this one.
    pub fn apply_process(&self, process: &mut Process, ticks_per_second: u64) {
        let Some(sample) = ProcCpuSample::of(process) else {
            return;
        };
        let mut s = self.lock();
        process.cpu.user_percent =
            proc_cpu_percent(s.procs.get(&process.pid), &sample, ticks_per_second);
        s.procs.insert(process.pid, sample);
    }

    /// Forget every pid not in `live`.
    pub fn retain_pids(&self, live: &[u32]) {
        let live: std::collections::HashSet<u32> = live.iter().copied().collect();
        self.lock().procs.retain(|pid, _| live.contains(pid));
    }

    pub fn tracked_pids(&self) -> usize {
        self.lock().procs.len()
    }
}
