// Output records (stable JSON field names consumed by downstream reporting)

mod filesystem;
mod percent;
mod process;
mod report;
mod system;

pub use filesystem::{FileSystemDescriptor, FileSystemStat};
pub use percent::Percent;
pub use process::{ProcConnection, ProcConnections, ProcCpuTime, ProcMemStat, ProcState, Process};
pub use report::Report;
pub use system::{CpuTimes, MemStat, SystemLoad};
