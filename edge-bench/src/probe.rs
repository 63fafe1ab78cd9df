//! System resource sampling
//!
//! CPU and RAM usage come from procfs. The SoC temperature is read from the
//! Raspberry Pi firmware tool `vcgencmd`, then from the kernel thermal zone,
//! and reported as 0.0 when neither is available.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// One sample of system-wide resource usage
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SystemSample {
    /// CPU usage in percent since the previous sample
    pub cpu: f64,
    /// RAM usage in percent
    pub ram: f64,
    /// Temperature in degrees Celsius
    pub temp: f64,
}

/// Source of system samples
pub trait SystemProbe {
    fn sample(&mut self) -> SystemSample;
}

/// Aggregate CPU jiffies from the first line of `/proc/stat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    pub idle: u64,
    pub total: u64,
}

impl CpuTimes {
    /// Busy percentage between two readings; 0.0 when no time elapsed
    pub fn usage_since(&self, earlier: &CpuTimes) -> f64 {
        let total = self.total.saturating_sub(earlier.total);
        let idle = self.idle.saturating_sub(earlier.idle);
        if total == 0 {
            return 0.0;
        }
        (total - idle.min(total)) as f64 / total as f64 * 100.0
    }
}

/// Parse the aggregate `cpu` line of `/proc/stat`
///
/// Idle time includes iowait.
pub fn parse_proc_stat(content: &str) -> Option<CpuTimes> {
    let line = content.lines().find(|l| l.starts_with("cpu "))?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|f| f.parse().ok())
        .collect::<Option<_>>()?;
    if fields.len() < 4 {
        return None;
    }

    // guest and guest_nice are already counted in user and nice
    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    Some(CpuTimes {
        idle,
        total: fields.iter().take(8).sum(),
    })
}

/// RAM usage percentage from `/proc/meminfo`
pub fn parse_meminfo(content: &str) -> Option<f64> {
    let value = |key: &str| -> Option<u64> {
        content
            .lines()
            .find(|l| l.starts_with(key))?
            .split_whitespace()
            .nth(1)?
            .parse()
            .ok()
    };

    let total = value("MemTotal:")?;
    let available = value("MemAvailable:")?;
    if total == 0 {
        return None;
    }
    Some(total.saturating_sub(available) as f64 / total as f64 * 100.0)
}

/// Parse `vcgencmd measure_temp` output such as `temp=48.3'C`
pub fn parse_vcgencmd_temp(output: &str) -> Option<f64> {
    output
        .trim()
        .strip_prefix("temp=")?
        .trim_end_matches("'C")
        .parse()
        .ok()
}

/// Parse a thermal zone reading in millidegrees
pub fn parse_thermal_zone(content: &str) -> Option<f64> {
    content.trim().parse::<f64>().ok().map(|m| m / 1000.0)
}

/// Probe backed by procfs, `vcgencmd` and sysfs
#[derive(Debug, Clone)]
pub struct ProcfsProbe {
    proc_root: PathBuf,
    thermal_zone: PathBuf,
    use_vcgencmd: bool,
    last_cpu: Option<CpuTimes>,
}

impl Default for ProcfsProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcfsProbe {
    pub fn new() -> Self {
        let mut probe = Self {
            proc_root: PathBuf::from("/proc"),
            thermal_zone: PathBuf::from("/sys/class/thermal/thermal_zone0/temp"),
            use_vcgencmd: true,
            last_cpu: None,
        };
        // Prime the CPU baseline so the first sample covers a real interval
        probe.last_cpu = probe.read_cpu();
        probe
    }

    /// Builder method: read `stat` and `meminfo` from another directory
    pub fn with_proc_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.proc_root = root.into();
        self.last_cpu = self.read_cpu();
        self
    }

    /// Builder method: read temperature from another thermal zone file
    pub fn with_thermal_zone(mut self, path: impl Into<PathBuf>) -> Self {
        self.thermal_zone = path.into();
        self
    }

    /// Builder method: enable or disable the `vcgencmd` temperature source
    pub fn with_vcgencmd(mut self, enabled: bool) -> Self {
        self.use_vcgencmd = enabled;
        self
    }

    fn read_cpu(&self) -> Option<CpuTimes> {
        let content = fs::read_to_string(self.proc_root.join("stat")).ok()?;
        parse_proc_stat(&content)
    }

    fn read_ram(&self) -> f64 {
        fs::read_to_string(self.proc_root.join("meminfo"))
            .ok()
            .and_then(|c| parse_meminfo(&c))
            .unwrap_or(0.0)
    }

    fn read_temp(&self) -> f64 {
        if self.use_vcgencmd {
            match Command::new("vcgencmd").arg("measure_temp").output() {
                Ok(output) if output.status.success() => {
                    if let Some(t) = parse_vcgencmd_temp(&String::from_utf8_lossy(&output.stdout)) {
                        return t;
                    }
                }
                Ok(output) => log::trace!("vcgencmd exited with {}", output.status),
                Err(e) => log::trace!("vcgencmd unavailable: {}", e),
            }
        }

        fs::read_to_string(&self.thermal_zone)
            .ok()
            .and_then(|c| parse_thermal_zone(&c))
            .unwrap_or(0.0)
    }
}

impl SystemProbe for ProcfsProbe {
    fn sample(&mut self) -> SystemSample {
        let now = self.read_cpu();
        let cpu = match (now, self.last_cpu) {
            (Some(now), Some(before)) => now.usage_since(&before),
            _ => 0.0,
        };
        if now.is_some() {
            self.last_cpu = now;
        }

        SystemSample {
            cpu,
            ram: self.read_ram(),
            temp: self.read_temp(),
        }
    }
}

/// Probe returning a fixed sample, for tests and machines without procfs
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedProbe(pub SystemSample);

impl SystemProbe for FixedProbe {
    fn sample(&mut self) -> SystemSample {
        self.0
    }
}
