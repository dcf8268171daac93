// Per-process models: state, memory, CPU time and TCP connections

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use super::Percent;

/// Decoded process lifecycle state; serializes to lowercase JSON (e.g. "running").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcState {
    Sleeping,
    Running,
    Idle,
    Stopped,
    Zombie,
    #[serde(other)]
    Unknown,
}

impl ProcState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcState::Sleeping => "sleeping",
            ProcState::Running => "running",
            ProcState::Idle => "idle",
            ProcState::Stopped => "stopped",
            ProcState::Zombie => "zombie",
            ProcState::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcMemStat {
    pub size: u64,
    pub rss: u64,
    #[serde(rename = "rss_p")]
    pub rss_percent: Percent,
    pub share: u64,
}

/// CPU time in clock ticks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcCpuTime {
    pub user: u64,
    #[serde(rename = "user_p")]
    pub user_percent: Percent,
    pub system: u64,
    pub total: u64,
    #[serde(rename = "start_time")]
    pub start: String,
}

/// One TCP table row. Addresses and ports are kept exactly as the kernel prints them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcConnection {
    #[serde(rename = "localip")]
    pub local_ip: String,
    #[serde(rename = "localport")]
    pub local_port: String,
    #[serde(rename = "remoteip")]
    pub remote_ip: String,
    #[serde(rename = "remoteport")]
    pub remote_port: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcConnections {
    pub connections: Vec<ProcConnection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    pub pid: u32,
    pub ppid: u32,
    pub name: String,
    pub state: ProcState,
    pub mem: ProcMemStat,
    pub cpu: ProcCpuTime,
    pub connections: ProcConnections,
    #[serde(skip)]
    sampled_at: Option<Instant>,
}

impl Process {
    pub fn new(
        pid: u32,
        ppid: u32,
        name: String,
        state: ProcState,
        mem: ProcMemStat,
        cpu: ProcCpuTime,
    ) -> Self {
        Self {
            pid,
            ppid,
            name,
            state,
            mem,
            cpu,
            connections: ProcConnections::default(),
            sampled_at: None,
        }
    }

    /// When the provider was queried for this record. `None` for deserialized records.
    pub fn sampled_at(&self) -> Option<Instant> {
        self.sampled_at
    }

    pub fn with_sampled_at(mut self, at: Instant) -> Self {
        self.sampled_at = Some(at);
        self
    }
}

impl fmt::Display for ProcMemStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} size, {} rss, {} share", self.size, self.rss, self.share)
    }
}

impl fmt::Display for ProcCpuTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "started at {}, {} total {} CPU, {} us, {} sys",
            self.start, self.total, self.user_percent, self.user, self.system
        )
    }
}

impl fmt::Display for ProcConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.local_ip, self.local_port, self.remote_ip, self.remote_port
        )
    }
}

impl fmt::Display for ProcConnections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, conn) in self.connections.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", conn)?;
        }
        Ok(())
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pid: {}, ppid: {}, name: {}, state: {}, mem: {}, cpu: {}, connections: [{}]",
            self.pid,
            self.ppid,
            self.name,
            self.state.as_str(),
            self.mem,
            self.cpu,
            self.connections
        )
    }
}
