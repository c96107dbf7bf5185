#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed_time: Duration,
}

/// Samples this process's resource usage between pipeline phases.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    inner: Mutex<MonitorInner>,
    pid: Pid,
    start_time: Instant,
    enabled: bool,
}

#[cfg(feature = "cli")]
struct MonitorInner {
    system: System,
    peak_memory_mb: u64,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let mut system = System::new_all();
        system.refresh_all();

        let pid = sysinfo::get_current_pid().expect("Failed to get current PID");

        Self {
            inner: Mutex::new(MonitorInner {
                system,
                peak_memory_mb: 0,
            }),
            pid,
            start_time: Instant::now(),
            enabled,
        }
    }

    fn sample(&self) -> Option<PhaseStats> {
        if !self.enabled {
            return None;
        }

        let mut inner = self.inner.lock().ok()?;
        inner.system.refresh_all();

        let process = inner.system.process(self.pid)?;
        let memory_mb = process.memory() / 1024 / 1024;
        let cpu_usage = process.cpu_usage();

        if memory_mb > inner.peak_memory_mb {
            inner.peak_memory_mb = memory_mb;
        }

        Some(PhaseStats {
            cpu_usage,
            memory_usage_mb: memory_mb,
            peak_memory_mb: inner.peak_memory_mb,
            elapsed_time: self.start_time.elapsed(),
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.sample() {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Time: {:?}",
                phase,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.peak_memory_mb,
                stats.elapsed_time
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.sample() {
            tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
                stats.elapsed_time,
                stats.peak_memory_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 環境的空實作
#[cfg(not(feature = "cli"))]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
