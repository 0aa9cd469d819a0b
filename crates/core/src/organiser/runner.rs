//! Organiser implementation.
//!
//! Drives scan cycles on a fixed interval:
//! - Waits for the source mount before the first cycle
//! - Runs cycles one at a time; a cycle never overlaps another
//! - A failed or panicking cycle is logged and the loop carries on

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::{Config, ScanConfig};
use crate::linker::Linker;
use crate::metrics;
use crate::resolver::NameResolver;
use crate::state::StateStore;

use super::cycle::{mount_available, CycleRunner};
use super::types::{OrganiserError, OrganiserStatus, ScanReport};

/// Outcome of waiting for the source mount.
enum MountWait {
    Ready,
    GaveUp,
    Shutdown,
}

/// The organiser - keeps the library in sync with the source mount.
pub struct Organiser {
    scan: ScanConfig,
    source_mount: PathBuf,
    runner: Arc<CycleRunner>,

    // Runtime state
    running: Arc<AtomicBool>,
    status: Arc<RwLock<OrganiserStatus>>,
    shutdown_tx: broadcast::Sender<()>,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Organiser {
    /// Create a new organiser.
    pub fn new(
        config: &Config,
        resolver: NameResolver,
        linker: Arc<dyn Linker>,
        state_store: Arc<dyn StateStore>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            scan: config.scan.clone(),
            source_mount: config.library.source_mount.clone(),
            runner: Arc::new(CycleRunner::new(
                config.library.clone(),
                resolver,
                linker,
                state_store,
            )),
            running: Arc::new(AtomicBool::new(false)),
            status: Arc::new(RwLock::new(OrganiserStatus::default())),
            shutdown_tx,
            loop_handle: Mutex::new(None),
        }
    }

    /// Run a single scan cycle now and record its outcome in the status.
    pub async fn run_cycle(&self) -> Result<ScanReport, OrganiserError> {
        Self::execute(&self.runner, &self.status).await
    }

    /// Start the scan loop (spawns a background task).
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Organiser already running");
            return;
        }

        info!("Starting organiser");
        let handle = self.spawn_scan_loop();
        *self.loop_handle.lock().await = Some(handle);
    }

    /// Stop the scan loop, letting an in-flight cycle finish.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Organiser not running");
            return;
        }

        info!("Stopping organiser");
        let _ = self.shutdown_tx.send(());

        if let Some(handle) = self.loop_handle.lock().await.take() {
            if let Err(e) = handle.await {
                error!("Scan loop ended abnormally: {}", e);
            }
        }

        info!("Organiser stopped");
    }

    /// Whether the scan loop is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Get current organiser status.
    pub async fn status(&self) -> OrganiserStatus {
        let mut status = self.status.read().await.clone();
        status.running = self.is_running();
        status
    }

    /// Run one cycle on its own task so a panic is contained, then update
    /// status and metrics.
    async fn execute(
        runner: &Arc<CycleRunner>,
        status: &RwLock<OrganiserStatus>,
    ) -> Result<ScanReport, OrganiserError> {
        let started = Instant::now();
        let task = {
            let runner = Arc::clone(runner);
            tokio::spawn(async move { runner.run().await })
        };

        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(OrganiserError::Aborted(e.to_string())),
        };

        let outcome = if result.is_ok() { "success" } else { "failed" };
        metrics::SCAN_CYCLES.with_label_values(&[outcome]).inc();
        metrics::SCAN_DURATION
            .with_label_values(&[outcome])
            .observe(started.elapsed().as_secs_f64());

        let mut status = status.write().await;
        match &result {
            Ok(report) => {
                status.cycles_completed += 1;
                status.last_report = Some(report.clone());
                status.last_error = None;
            }
            Err(e) => {
                status.cycles_failed += 1;
                status.last_error = Some(e.to_string());
            }
        }

        result
    }

    /// Poll the source mount until it has content, the attempts run out or
    /// shutdown is requested.
    async fn wait_for_mount(
        mount: &Path,
        scan: &ScanConfig,
        shutdown_rx: &mut broadcast::Receiver<()>,
    ) -> MountWait {
        for attempt in 1..=scan.mount_wait_attempts {
            if mount_available(mount) {
                info!("Source mount {} is ready", mount.display());
                return MountWait::Ready;
            }
            info!(
                "Waiting for source mount {} ({}/{})",
                mount.display(),
                attempt,
                scan.mount_wait_attempts
            );

            tokio::select! {
                _ = shutdown_rx.recv() => return MountWait::Shutdown,
                _ = tokio::time::sleep(Duration::from_secs(scan.mount_wait_interval_secs)) => {}
            }
        }

        if mount_available(mount) {
            return MountWait::Ready;
        }
        MountWait::GaveUp
    }

    /// Spawn the scan loop task.
    fn spawn_scan_loop(&self) -> JoinHandle<()> {
        let running = Arc::clone(&self.running);
        let runner = Arc::clone(&self.runner);
        let status = Arc::clone(&self.status);
        let scan = self.scan.clone();
        let mount = self.source_mount.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Scan loop started");

            match Self::wait_for_mount(&mount, &scan, &mut shutdown_rx).await {
                MountWait::Ready => {}
                MountWait::GaveUp => warn!(
                    "Source mount {} not ready after {} attempts, starting anyway",
                    mount.display(),
                    scan.mount_wait_attempts
                ),
                MountWait::Shutdown => {
                    info!("Scan loop received shutdown signal");
                    return;
                }
            }

            loop {
                if !running.load(Ordering::Relaxed) {
                    break;
                }

                if let Err(e) = Self::execute(&runner, &status).await {
                    error!("Scan cycle failed: {}", e);
                }

                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Scan loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(Duration::from_secs(scan.interval_secs)) => {}
                }
            }

            info!("Scan loop stopped");
        })
    }
}
