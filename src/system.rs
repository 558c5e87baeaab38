//! Process memory sampling.
//!
//! Reads the collector's own resident set size from `/proc/self/status`.
//! On systems without procfs the probe reports zero rather than failing the
//! tick.

use std::fs;

/// Source of the process memory gauge.
pub trait MemoryProbe: Send + Sync {
    fn resident_bytes(&self) -> u64;
}

/// Reads `VmRSS` for the current process from procfs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcSelfMemory;

impl MemoryProbe for ProcSelfMemory {
    fn resident_bytes(&self) -> u64 {
        read_self_memory_bytes().unwrap_or(0)
    }
}

/// Reads the RSS memory usage from /proc/self/status.
fn read_self_memory_bytes() -> Option<u64> {
    let content = fs::read_to_string("/proc/self/status").ok()?;
    parse_vmrss_bytes(&content)
}

/// Extracts `VmRSS` (reported in kB) from a status file and returns bytes.
fn parse_vmrss_bytes(status: &str) -> Option<u64> {
    for line in status.lines() {
        if let Some(value) = line.strip_prefix("VmRSS:") {
            let kb: u64 = value.split_whitespace().next()?.parse().ok()?;
            return Some(kb * 1024);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vmrss() {
        let status = "Name:\timgd\nVmPeak:\t  20000 kB\nVmRSS:\t    1536 kB\nThreads:\t4\n";
        assert_eq!(parse_vmrss_bytes(status), Some(1536 * 1024));
    }

    #[test]
    fn test_parse_vmrss_missing_or_invalid() {
        assert_eq!(parse_vmrss_bytes("Name:\timgd\n"), None);
        assert_eq!(parse_vmrss_bytes("VmRSS:\tlots kB\n"), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_proc_self_memory_reports_nonzero() {
        assert!(ProcSelfMemory.resident_bytes() > 0);
    }
}
