// Error types for provider queries and accessor operations

use std::fmt;
use thiserror::Error;

/// Failure reported by a `SystemMetricsProvider`.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The OS query mechanism itself failed (missing procfs, poisoned lock, parse failure).
    #[error("metrics provider unavailable: {0}")]
    Unavailable(String),
    #[error("no such process: {pid}")]
    NoSuchProcess { pid: u32 },
    #[error("permission denied for process {pid}")]
    PermissionDenied { pid: u32 },
    #[error("path unavailable: {path}: {source}")]
    PathUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProviderError {
    /// Map an I/O error from a per-process procfs read onto the process error kinds.
    pub fn from_process_io(pid: u32, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ProviderError::NoSuchProcess { pid },
            std::io::ErrorKind::PermissionDenied => ProviderError::PermissionDenied { pid },
            _ => ProviderError::Unavailable(format!("process {}: {}", pid, err)),
        }
    }
}

/// Which `get_process` sub-query failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessQuery {
    State,
    Mem,
    Cpu,
}

impl fmt::Display for ProcessQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcessQuery::State => "state",
            ProcessQuery::Mem => "mem",
            ProcessQuery::Cpu => "cpu",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("error getting {query} info for pid {pid}: {source}")]
    Process {
        pid: u32,
        query: ProcessQuery,
        #[source]
        source: ProviderError,
    },
}

/// Coarse classification of a `MetricsError`, for callers that branch on cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ProviderUnavailable,
    NoSuchProcess,
    PermissionDenied,
    PathUnavailable,
}

impl MetricsError {
    pub fn kind(&self) -> ErrorKind {
        let source = match self {
            MetricsError::Provider(e) => e,
            MetricsError::Process { source, .. } => source,
        };
        match source {
            ProviderError::Unavailable(_) => ErrorKind::ProviderUnavailable,
            ProviderError::NoSuchProcess { .. } => ErrorKind::NoSuchProcess,
            ProviderError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            ProviderError::PathUnavailable { .. } => ErrorKind::PathUnavailable,
        }
    }

    /// The failed sub-query, for composite process lookups.
    pub fn process_query(&self) -> Option<ProcessQuery> {
        match self {
            MetricsError::Process { query, .. } => Some(*query),
            MetricsError::Provider(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MetricsError>;
