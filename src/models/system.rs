// Load average, CPU tick counters and memory/swap models

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Percent;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemLoad {
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
}

/// Tick counters accumulated since boot, for all CPUs or for one core.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CpuTimes {
    pub user: u64,
    #[serde(rename = "user_p")]
    pub user_percent: Percent,
    pub nice: u64,
    pub system: u64,
    #[serde(rename = "system_p")]
    pub system_percent: Percent,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTimes {
    /// Sum of every counter; the elapsed-ticks denominator for percentages.
    pub fn total(&self) -> u64 {
        self.user
            .saturating_add(self.nice)
            .saturating_add(self.system)
            .saturating_add(self.idle)
            .saturating_add(self.iowait)
            .saturating_add(self.irq)
            .saturating_add(self.softirq)
            .saturating_add(self.steal)
    }
}

/// Memory or swap usage in bytes. Swap leaves the `actual_*` fields at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MemStat {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    #[serde(rename = "used_p")]
    pub used_percent: f64,
    pub actual_used: u64,
    pub actual_free: u64,
    #[serde(rename = "actual_used_p")]
    pub actual_used_percent: f64,
}

impl fmt::Display for SystemLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {:.2} {:.2}", self.load1, self.load5, self.load15)
    }
}

impl fmt::Display for CpuTimes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} user, {} system, {} nice, {} idle, {} iowait, {} irq, {} softirq, {} steal",
            self.user,
            self.system,
            self.nice,
            self.idle,
            self.iowait,
            self.irq,
            self.softirq,
            self.steal
        )
    }
}

impl fmt::Display for MemStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} total, {} used, {} actual used, {} free, {} actual free",
            self.total, self.used, self.actual_used, self.free, self.actual_free
        )
    }
}
