//! Periodic and on-demand detection checks.
//!
//! The scheduler owns the process-wide [`StatusSnapshot`] and the cumulative
//! "ever found" flag. At most one aggregate check is in flight at a time: a
//! trigger that arrives while a check is running is dropped, not queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::models::{ScheduleConfig, StatusSnapshot};
use crate::services::aggregator::Aggregator;
use crate::services::notifier::Notifier;

/// Clears the in-flight flag however the check exits.
struct CheckingGuard<'a>(&'a AtomicBool);

impl Drop for CheckingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct CheckScheduler {
    aggregator: Arc<Aggregator>,
    notifier: Arc<Notifier>,
    config: ScheduleConfig,
    status: RwLock<StatusSnapshot>,
    checking: AtomicBool,
    ever_found: AtomicBool,
    notifications: Mutex<Vec<JoinHandle<()>>>,
}

impl CheckScheduler {
    pub fn new(aggregator: Arc<Aggregator>, notifier: Arc<Notifier>, config: ScheduleConfig) -> Self {
        Self {
            aggregator,
            notifier,
            config,
            status: RwLock::new(StatusSnapshot::initial()),
            checking: AtomicBool::new(false),
            ever_found: AtomicBool::new(false),
            notifications: Mutex::new(Vec::new()),
        }
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    /// The last completed snapshot. Never waits on an in-flight check.
    pub async fn status(&self) -> StatusSnapshot {
        self.status.read().await.clone()
    }

    pub fn is_checking(&self) -> bool {
        self.checking.load(Ordering::Acquire)
    }

    /// Run one aggregate check unless one is already running.
    ///
    /// Returns the new snapshot, or `None` when the call was dropped by the
    /// re-entrancy guard.
    pub async fn run_check(&self) -> Option<StatusSnapshot> {
        if self
            .checking
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("check already in flight, skipping");
            return None;
        }
        let _guard = CheckingGuard(&self.checking);

        let started = Instant::now();
        let result = self.aggregator.check_all_sources().await;
        let snapshot = StatusSnapshot::from_result(result, Utc::now());

        *self.status.write().await = snapshot.clone();
        info!(
            found = snapshot.found,
            model = snapshot.model.as_deref(),
            source = snapshot.source.as_deref(),
            duration_ms = started.elapsed().as_millis() as u64,
            "check completed"
        );

        if snapshot.found && !self.ever_found.swap(true, Ordering::AcqRel) {
            info!(model = snapshot.model.as_deref(), "target detected for the first time");
            self.dispatch_notification(&snapshot);
        }

        Some(snapshot)
    }

    /// Run a check, falling back to the current snapshot when one is
    /// already in flight.
    pub async fn check_or_current(&self) -> StatusSnapshot {
        match self.run_check().await {
            Some(snapshot) => snapshot,
            None => self.status().await,
        }
    }

    fn dispatch_notification(&self, snapshot: &StatusSnapshot) {
        let notifier = Arc::clone(&self.notifier);
        let model = snapshot.model.clone();
        let source = snapshot.source.clone();
        let handle = tokio::spawn(async move {
            notifier
                .notify_target_dropped(model.as_deref(), source.as_deref())
                .await;
        });

        match self.notifications.lock() {
            Ok(mut pending) => pending.push(handle),
            Err(_) => warn!("notification handle list poisoned"),
        }
    }

    /// Wait for any announcement dispatched by earlier checks.
    pub async fn wait_for_notifications(&self) {
        let pending: Vec<JoinHandle<()>> = match self.notifications.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => return,
        };
        for handle in pending {
            if let Err(e) = handle.await {
                warn!(error = %e, "notification task failed");
            }
        }
    }

    /// Start the interval loop. Each tick runs in its own task, so a slow
    /// check makes later ticks hit the re-entrancy guard instead of queueing.
    pub fn spawn(self: Arc<Self>) -> SchedulerHandle {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(Notify::new());
        let period = Duration::from_secs(self.config.interval_secs.max(1));

        let task = {
            let stop_flag = Arc::clone(&stop_flag);
            let shutdown = Arc::clone(&shutdown);
            tokio::spawn(async move {
                info!(interval_secs = period.as_secs(), "check scheduler started");
                let mut timer = interval(period);
                timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

                // The first tick fires immediately.
                if !self.config.run_on_startup {
                    timer.tick().await;
                }

                loop {
                    tokio::select! {
                        _ = timer.tick() => {
                            if stop_flag.load(Ordering::Acquire) {
                                break;
                            }
                            let scheduler = Arc::clone(&self);
                            tokio::spawn(async move {
                                scheduler.run_check().await;
                            });
                        }
                        _ = shutdown.notified() => break,
                    }
                }
                info!("check scheduler stopped");
            })
        };

        SchedulerHandle {
            stop_flag,
            shutdown,
            task,
        }
    }
}

/// Handle to stop a running scheduler loop.
pub struct SchedulerHandle {
    stop_flag: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
        self.shutdown.notify_one();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_flag.load(Ordering::Acquire)
    }

    /// Stop the loop and wait for it to exit. In-flight checks finish on
    /// their own.
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.task.await {
            warn!(error = %e, "scheduler task failed");
        }
    }
}
