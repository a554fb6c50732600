//! Host facts shown on the text dashboard.

use sysinfo::System;

/// Snapshot of the machine running gantry.
#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub os: &'static str,
    pub arch: &'static str,
    pub cpus: usize,
    /// Percent of physical memory in use. `None` when the total is unknown.
    pub memory_usage: Option<f64>,
    /// Percent of CPU in use across all cores.
    pub cpu_usage: f64,
}

impl SystemInfo {
    /// Sample the host. CPU usage needs two readings, so this blocks for
    /// [`sysinfo::MINIMUM_CPU_UPDATE_INTERVAL`].
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_usage();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu_usage();

        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or_else(|_| sys.cpus().len().max(1));

        Self {
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            cpus,
            memory_usage: memory_percent(sys.used_memory(), sys.total_memory()),
            cpu_usage: f64::from(sys.global_cpu_usage()),
        }
    }
}

fn memory_percent(used: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(used as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_reports_host() {
        let info = SystemInfo::collect();
        assert_eq!(info.os, std::env::consts::OS);
        assert_eq!(info.arch, std::env::consts::ARCH);
        assert!(info.cpus >= 1);
        assert!(info.cpu_usage >= 0.0);
        if let Some(mem) = info.memory_usage {
            assert!((0.0..=100.0).contains(&mem));
        }
    }

    #[test]
    fn test_memory_percent() {
        assert_eq!(memory_percent(1, 4), Some(25.0));
        assert_eq!(memory_percent(0, 0), None);
    }
}
