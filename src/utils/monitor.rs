use std::sync::Mutex;
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// One completed pipeline phase.
#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub phase: String,
    pub elapsed: Duration,
    pub memory_mb: Option<u64>,
}

/// Records per-phase timings (and resident memory with the `cli` feature).
pub struct PhaseMonitor {
    enabled: bool,
    started: Instant,
    last_mark: Mutex<Instant>,
    phases: Mutex<Vec<PhaseStats>>,
    #[cfg(feature = "cli")]
    system: Option<(Mutex<System>, Pid)>,
}

impl PhaseMonitor {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        Self {
            enabled,
            started: now,
            last_mark: Mutex::new(now),
            phases: Mutex::new(Vec::new()),
            #[cfg(feature = "cli")]
            system: if enabled {
                sysinfo::get_current_pid()
                    .ok()
                    .map(|pid| (Mutex::new(System::new()), pid))
            } else {
                None
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[cfg(feature = "cli")]
    fn resident_memory_mb(&self) -> Option<u64> {
        let (system, pid) = self.system.as_ref()?;
        let mut system = system.lock().ok()?;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[*pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        system.process(*pid).map(|p| p.memory() / 1024 / 1024)
    }

    #[cfg(not(feature = "cli"))]
    fn resident_memory_mb(&self) -> Option<u64> {
        None
    }

    /// 記錄從上一個標記到現在的階段耗時
    pub fn mark(&self, phase: &str) {
        if !self.enabled {
            return;
        }

        let now = Instant::now();
        let elapsed = match self.last_mark.lock() {
            Ok(mut last) => {
                let elapsed = now.duration_since(*last);
                *last = now;
                elapsed
            }
            Err(_) => return,
        };

        let stats = PhaseStats {
            phase: phase.to_string(),
            elapsed,
            memory_mb: self.resident_memory_mb(),
        };

        match stats.memory_mb {
            Some(mb) => tracing::info!("📊 {} - {:?}, Memory: {}MB", phase, elapsed, mb),
            None => tracing::info!("📊 {} - {:?}", phase, elapsed),
        }

        if let Ok(mut phases) = self.phases.lock() {
            phases.push(stats);
        }
    }

    pub fn phases(&self) -> Vec<PhaseStats> {
        self.phases.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        let peak = self.phases().iter().filter_map(|p| p.memory_mb).max();
        match peak {
            Some(mb) => tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
                self.started.elapsed(),
                mb
            ),
            None => tracing::info!("📊 Final Stats - Total Time: {:?}", self.started.elapsed()),
        }
    }
}

impl Default for PhaseMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
