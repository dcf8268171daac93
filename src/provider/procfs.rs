// Parsers for procfs files read by the host provider.
// Pure functions over file contents so they can be tested with string inputs.

use super::CpuTicks;
use crate::error::ProviderError;

/// Parsed `<proc_root>/stat`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatFile {
    pub total: CpuTicks,
    pub cores: Vec<CpuTicks>,
    /// Boot time in seconds since the Unix epoch (`btime`).
    pub boot_time: Option<u64>,
}

/// The fields of `<proc_root>/<pid>/stat` this crate uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PidStat {
    pub name: String,
    pub state: u8,
    pub ppid: u32,
    pub utime: u64,
    pub stime: u64,
    /// Ticks after boot.
    pub starttime: u64,
}

/// Memory lines of `<proc_root>/<pid>/status`, in kB. Kernel threads and zombies omit them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PidStatus {
    pub vm_size_kb: u64,
    pub vm_rss_kb: u64,
    pub rss_file_kb: u64,
    pub rss_shmem_kb: u64,
}

fn malformed(what: &str, detail: impl std::fmt::Display) -> ProviderError {
    ProviderError::Unavailable(format!("malformed {}: {}", what, detail))
}

/// Parse one `cpu`/`cpuN` line: "cpu  user nice system idle iowait irq softirq steal ...".
/// Counters missing on older kernels read as zero.
pub fn parse_cpu_line(line: &str) -> Option<CpuTicks> {
    let mut it = line.split_whitespace();
    if !it.next()?.starts_with("cpu") {
        return None;
    }
    let mut v = [0u64; 8];
    let mut n = 0;
    for (slot, tok) in v.iter_mut().zip(it) {
        *slot = tok.parse().ok()?;
        n += 1;
    }
    if n < 4 {
        return None;
    }
    Some(CpuTicks {
        user: v[0],
        nice: v[1],
        sys: v[2],
        idle: v[3],
        wait: v[4],
        irq: v[5],
        soft_irq: v[6],
        stolen: v[7],
    })
}

pub fn parse_stat(content: &str) -> Result<StatFile, ProviderError> {
    let mut total = None;
    let mut cores = Vec::new();
    let mut boot_time = None;
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("cpu") {
            let ticks = parse_cpu_line(line).ok_or_else(|| malformed("stat cpu line", line))?;
            if rest.starts_with(|c: char| c.is_ascii_digit()) {
                cores.push(ticks);
            } else {
                total = Some(ticks);
            }
        } else if let Some(v) = line.strip_prefix("btime") {
            boot_time = v.trim().parse().ok();
        }
    }
    let total = total.ok_or_else(|| malformed("stat", "no aggregate cpu line"))?;
    Ok(StatFile {
        total,
        cores,
        boot_time,
    })
}

/// Parse `<pid>/stat`. The command name may contain spaces and parentheses,
/// so fields are located after the last ')'.
pub fn parse_pid_stat(content: &str) -> Result<PidStat, ProviderError> {
    let content = content.trim();
    let open = content
        .find('(')
        .ok_or_else(|| malformed("pid stat", "missing '('"))?;
    let close = content
        .rfind(')')
        .ok_or_else(|| malformed("pid stat", "missing ')'"))?;
    if close <= open {
        return Err(malformed("pid stat", "invalid parentheses"));
    }
    let name = content[open + 1..close].to_string();
    let fields: Vec<&str> = content[close + 1..].split_whitespace().collect();
    // state is field 0 after the name; starttime is field 19
    if fields.len() < 20 {
        return Err(malformed(
            "pid stat",
            format!("expected 20+ fields, got {}", fields.len()),
        ));
    }
    let num = |idx: usize, field: &str| -> Result<u64, ProviderError> {
        fields[idx]
            .parse()
            .map_err(|_| malformed("pid stat", format!("invalid {}", field)))
    };
    Ok(PidStat {
        name,
        state: fields[0].bytes().next().unwrap_or(b'?'),
        ppid: num(1, "ppid")? as u32,
        utime: num(11, "utime")?,
        stime: num(12, "stime")?,
        starttime: num(19, "starttime")?,
    })
}

pub fn parse_pid_status(content: &str) -> PidStatus {
    let mut out = PidStatus::default();
    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let kb = || {
            value
                .split_whitespace()
                .next()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0)
        };
        match key {
            "VmSize" => out.vm_size_kb = kb(),
            "VmRSS" => out.vm_rss_kb = kb(),
            "RssFile" => out.rss_file_kb = kb(),
            "RssShmem" => out.rss_shmem_kb = kb(),
            _ => {}
        }
    }
    out
}
