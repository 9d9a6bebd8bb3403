#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub phase: String,
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub elapsed: Duration,
}

/// Samples this process's CPU and memory at phase boundaries.
///
/// Only the controller process is measured; the browser runs in its own processes.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    inner: Option<Sampler>,
}

#[cfg(feature = "cli")]
struct Sampler {
    system: Mutex<System>,
    pid: Pid,
    started: Instant,
    peak_memory_mb: Mutex<u64>,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let inner = if enabled {
            match sysinfo::get_current_pid() {
                Ok(pid) => Some(Sampler {
                    system: Mutex::new(System::new()),
                    pid,
                    started: Instant::now(),
                    peak_memory_mb: Mutex::new(0),
                }),
                Err(e) => {
                    tracing::warn!("System monitoring unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self { inner }
    }

    pub fn sample(&self, phase: &str) -> Option<PhaseStats> {
        let sampler = self.inner.as_ref()?;
        let mut system = sampler.system.lock().ok()?;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[sampler.pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );

        let process = system.process(sampler.pid)?;
        let memory_mb = process.memory() / 1024 / 1024;

        let mut peak = sampler.peak_memory_mb.lock().ok()?;
        *peak = (*peak).max(memory_mb);

        Some(PhaseStats {
            phase: phase.to_string(),
            cpu_usage: process.cpu_usage(),
            memory_usage_mb: memory_mb,
            elapsed: sampler.started.elapsed(),
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.sample(phase) {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Time: {:?}",
                stats.phase,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.elapsed
            );
        }
    }

    pub fn log_final_stats(&self) {
        let Some(sampler) = self.inner.as_ref() else {
            return;
        };
        let peak = sampler.peak_memory_mb.lock().map(|p| *p).unwrap_or(0);
        tracing::info!(
            "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
            sampler.started.elapsed(),
            peak
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// Without the cli feature there is no sysinfo; monitoring is a no-op.
#[cfg(not(feature = "cli"))]
#[derive(Default)]
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
