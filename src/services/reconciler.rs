//! Background reconciliation of appointment status.
//!
//! A booked appointment whose time has passed already *displays* as
//! completed (see [`status::resolve`]); the reconciler makes the store agree.
//! One sweep function is driven from four triggers: the initial load, a
//! deferred one-shot sweep shortly after, a periodic timer, and on demand.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::{
    sync::watch,
    task::{JoinHandle, JoinSet},
    time::{Instant, MissedTickBehavior},
};
use utoipa::ToSchema;

use super::{board::AppointmentBoard, status};
use crate::{
    clock::Clock,
    config::ReconcilerConfig,
    error::{AppError, AppResult},
    models::{Appointment, AppointmentStatus},
    repository::AppointmentStore,
};

/// What fired a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SweepTrigger {
    Load,
    Deferred,
    Periodic,
    Manual,
}

/// Appointments a sweep has to persist as completed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepPlan {
    pub to_update: Vec<Appointment>,
}

/// Find every appointment stored as booked whose scheduled instant is over
pub fn sweep_once(clock: &dyn Clock, appointments: &[Appointment]) -> SweepPlan {
    SweepPlan {
        to_update: appointments
            .iter()
            .filter(|a| status::is_silently_completed(a, clock))
            .cloned()
            .collect(),
    }
}

/// A transition that could not be persisted; retried on the next sweep
#[derive(Debug, Serialize, ToSchema)]
pub struct SweepFailure {
    pub id: Option<i32>,
    pub error: String,
    #[serde(skip)]
    pub stale: bool,
}

/// Outcome of one sweep
#[derive(Debug, Serialize, ToSchema)]
pub struct SweepReport {
    pub trigger: SweepTrigger,
    /// Appointments examined
    pub checked: usize,
    /// Ids persisted as completed
    pub completed: Vec<i32>,
    pub failed: Vec<SweepFailure>,
}

impl SweepReport {
    fn new(trigger: SweepTrigger, checked: usize) -> Self {
        Self {
            trigger,
            checked,
            completed: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn AppointmentStore>,
    board: AppointmentBoard,
    clock: Arc<dyn Clock>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn AppointmentStore>, board: AppointmentBoard, clock: Arc<dyn Clock>) -> Self {
        Self { store, board, clock }
    }

    /// Fetch every appointment into the board, then sweep it
    pub async fn load(&self) -> AppResult<SweepReport> {
        let appointments = self.store.list_all().await?;
        tracing::debug!("Reconciler: loaded {} appointments", appointments.len());
        self.board.replace(appointments).await;
        Ok(self.sweep(SweepTrigger::Load).await)
    }

    /// Sweep the board and persist newly expired appointments.
    ///
    /// Writes go out concurrently. A failed write does not stop the others;
    /// it is reported and naturally retried next time since the appointment
    /// is still booked on the board.
    pub async fn sweep(&self, trigger: SweepTrigger) -> SweepReport {
        let appointments = self.board.snapshot().await;
        let plan = sweep_once(self.clock.as_ref(), &appointments);
        let mut report = SweepReport::new(trigger, appointments.len());

        if plan.to_update.is_empty() {
            tracing::trace!("Reconciler: {:?} sweep, nothing to complete", trigger);
            return report;
        }

        let mut writes = JoinSet::new();
        for appointment in plan.to_update {
            let store = Arc::clone(&self.store);
            writes.spawn(async move {
                let result = store.complete(appointment.id, &appointment.slot()).await;
                (appointment.id, result)
            });
        }

        while let Some(joined) = writes.join_next().await {
            match joined {
                Ok((_, Ok(updated))) => {
                    report.completed.push(updated.id);
                    self.board.upsert(updated).await;
                }
                Ok((id, Err(e))) => {
                    tracing::warn!("Reconciler: failed to complete appointment {}: {}", id, e);
                    let stale = matches!(e, AppError::StaleSlot(_) | AppError::NotFound(_));
                    report.failed.push(SweepFailure {
                        id: Some(id),
                        error: e.to_string(),
                        stale,
                    });
                }
                Err(e) => {
                    tracing::error!("Reconciler: completion task aborted: {}", e);
                    report.failed.push(SweepFailure {
                        id: None,
                        error: e.to_string(),
                        stale: false,
                    });
                }
            }
        }

        report.completed.sort_unstable();
        tracing::info!(
            "Reconciler: {:?} sweep completed {} appointment(s), {} failure(s)",
            trigger,
            report.completed.len(),
            report.failed.len()
        );

        // The board disagrees with the store about some rows: start over from the store
        if report.failed.iter().any(|f| f.stale) {
            match self.store.list_all().await {
                Ok(fresh) => self.board.replace(fresh).await,
                Err(e) => tracing::warn!("Reconciler: board refresh failed: {}", e),
            }
        }

        report
    }

    async fn try_load(&self, trigger: SweepTrigger) -> bool {
        match self.load().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Reconciler: load on {:?} trigger failed: {}", trigger, e);
                false
            }
        }
    }

    /// Start the load, deferred and periodic sweeps in a background task
    pub fn mount(self, config: &ReconcilerConfig) -> ReconcilerHandle {
        self.mount_with(config.deferred_sweep(), config.interval())
    }

    pub fn mount_with(self, deferred: Duration, interval: Duration) -> ReconcilerHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut loaded = self.try_load(SweepTrigger::Load).await;

            let deferred_sweep = tokio::time::sleep(deferred);
            tokio::pin!(deferred_sweep);
            let mut deferred_pending = true;

            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                let trigger = tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = &mut deferred_sweep, if deferred_pending => {
                        deferred_pending = false;
                        SweepTrigger::Deferred
                    }
                    _ = ticker.tick() => SweepTrigger::Periodic,
                };
                // Until the board has been filled once, every tick retries the load
                if loaded {
                    self.sweep(trigger).await;
                } else {
                    loaded = self.try_load(trigger).await;
                }
            }
            tracing::info!("Reconciler: stopped");
        });

        ReconcilerHandle { shutdown, task }
    }
}

/// Owner of the background sweeps; dropping it also stops them
pub struct ReconcilerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReconcilerHandle {
    /// Cancel pending timers and wait for a sweep in progress to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::error!("Reconciler: task ended abnormally: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::repository::MockAppointmentStore;
    use crate::services::status::tests::{appointment, noon_clock};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Booked at `time` on 2025-03-01 with the given id
    fn booked(id: i32, time: &str) -> Appointment {
        Appointment { id, ..appointment("2025-03-01", time) }
    }

    /// Stored record after a successful completion
    fn completed(id: i32, time: &str) -> Appointment {
        Appointment { status: AppointmentStatus::Completed, ..booked(id, time) }
    }

    fn echo_complete(store: &mut MockAppointmentStore) {
        store.expect_complete().returning(|id, slot| Ok(completed(id, &slot.time)));
    }

    fn reconciler(store: MockAppointmentStore, clock: FixedClock) -> (Reconciler, AppointmentBoard) {
        let board = AppointmentBoard::new();
        (Reconciler::new(Arc::new(store), board.clone(), Arc::new(clock)), board)
    }

    #[test]
    fn test_sweep_once_picks_expired_bookings_only() {
        let clock = noon_clock();
        let mut completed = booked(3, "08:00");
        completed.status = AppointmentStatus::Completed;
        let mut cancelled = booked(4, "08:00");
        cancelled.status = AppointmentStatus::Cancelled;
        let list = vec![booked(1, "11:00"), booked(2, "13:00"), completed, cancelled, booked(5, "")];

        let plan = sweep_once(&clock, &list);
        let ids: Vec<i32> = plan.to_update.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn test_expired_booking_persisted_once() {
        let mut store = MockAppointmentStore::new();
        store.expect_list_all().times(1).returning(|| Ok(vec![booked(1, "11:00"), booked(2, "13:00")]));
        store
            .expect_complete()
            .withf(|id, slot| *id == 1 && slot.time == "11:00" && slot.service_type == "Basic Grooming")
            .times(1)
            .returning(|id, _| Ok(completed(id, "11:00")));

        let (reconciler, board) = reconciler(store, noon_clock());
        let report = reconciler.load().await.unwrap();
        assert_eq!(report.completed, vec![1]);
        assert!(report.is_clean());

        // Second sweep sees the persisted status and stays quiet
        let again = reconciler.sweep(SweepTrigger::Periodic).await;
        assert!(again.completed.is_empty());
        assert_eq!(again.checked, 2);

        let held = board.snapshot().await;
        assert_eq!(held.iter().find(|a| a.id == 1).unwrap().status, AppointmentStatus::Completed);
        assert_eq!(held.iter().find(|a| a.id == 2).unwrap().status, AppointmentStatus::Booked);
    }

    #[tokio::test]
    async fn test_failure_does_not_block_other_transitions() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&attempts);

        let mut store = MockAppointmentStore::new();
        store.expect_list_all().times(1).returning(|| Ok(vec![booked(1, "09:00"), booked(2, "10:00")]));
        store
            .expect_complete()
            .withf(|id, _| *id == 1)
            .returning(move |_, _| {
                seen.fetch_add(1, Ordering::SeqCst);
                Err(AppError::Internal("connection reset".to_string()))
            });
        store
            .expect_complete()
            .withf(|id, _| *id == 2)
            .times(1)
            .returning(|id, _| Ok(completed(id, "10:00")));

        let (reconciler, _board) = reconciler(store, noon_clock());
        let report = reconciler.load().await.unwrap();
        assert_eq!(report.completed, vec![2]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, Some(1));

        // The failed one is retried, the persisted one is not
        let retry = reconciler.sweep(SweepTrigger::Periodic).await;
        assert!(retry.completed.is_empty());
        assert_eq!(retry.failed.len(), 1);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_slot_refreshes_board() {
        let mut store = MockAppointmentStore::new();
        let mut loads = 0;
        store.expect_list_all().times(2).returning(move || {
            loads += 1;
            if loads == 1 {
                Ok(vec![booked(1, "09:00")])
            } else {
                // Rescheduled by an admin in the meantime
                Ok(vec![booked(1, "18:00")])
            }
        });
        store
            .expect_complete()
            .times(1)
            .returning(|id, _| Err(AppError::StaleSlot(format!("appointment {} moved", id))));

        let (reconciler, board) = reconciler(store, noon_clock());
        let report = reconciler.load().await.unwrap();
        assert!(report.failed[0].stale);

        let held = board.snapshot().await;
        assert_eq!(held[0].time, "18:00");
        assert!(reconciler.sweep(SweepTrigger::Manual).await.completed.is_empty());
    }

    #[tokio::test]
    async fn test_final_statuses_never_touched() {
        let mut store = MockAppointmentStore::new();
        store.expect_list_all().returning(|| {
            let mut done = booked(1, "09:00");
            done.status = AppointmentStatus::Completed;
            let mut cancelled = booked(2, "09:00");
            cancelled.status = AppointmentStatus::Cancelled;
            Ok(vec![done, cancelled])
        });
        store.expect_complete().never();
        store.expect_update().never();

        let (reconciler, board) = reconciler(store, noon_clock());
        reconciler.load().await.unwrap();
        reconciler.sweep(SweepTrigger::Periodic).await;

        let statuses: Vec<_> = board.snapshot().await.iter().map(|a| a.status).collect();
        assert_eq!(statuses, vec![AppointmentStatus::Completed, AppointmentStatus::Cancelled]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mounted_timers_and_shutdown() {
        let clock = noon_clock();
        let mut store = MockAppointmentStore::new();
        // 12:01 is not due at load time
        store.expect_list_all().times(1).returning(|| Ok(vec![booked(1, "12:01"), booked(2, "12:40")]));
        echo_complete(&mut store);
        let store = Arc::new(store);

        let board = AppointmentBoard::new();
        let reconciler = Reconciler::new(store.clone(), board.clone(), Arc::new(clock.clone()));
        let handle = reconciler.mount_with(Duration::from_secs(3), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(board.len().await, 2);
        assert!(board.snapshot().await.iter().all(|a| a.status == AppointmentStatus::Booked));

        // Deferred sweep catches what expired right after load
        clock.advance(chrono::Duration::minutes(2));
        tokio::time::sleep(Duration::from_secs(3)).await;
        let held = board.snapshot().await;
        assert_eq!(held[0].status, AppointmentStatus::Completed);
        assert_eq!(held[1].status, AppointmentStatus::Booked);

        // Periodic sweep catches the later one
        clock.advance(chrono::Duration::hours(1));
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(board.snapshot().await.iter().all(|a| a.status == AppointmentStatus::Completed));

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_sweeps() {
        let clock = noon_clock();
        let mut store = MockAppointmentStore::new();
        store.expect_list_all().times(1).returning(|| Ok(vec![booked(1, "12:30")]));
        store.expect_complete().never();
        store.expect_update().never();
        let store = Arc::new(store);

        let board = AppointmentBoard::new();
        let reconciler = Reconciler::new(store.clone(), board.clone(), Arc::new(clock.clone()));
        let handle = reconciler.mount_with(Duration::from_secs(3), Duration::from_secs(30));
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.shutdown().await;

        clock.advance(chrono::Duration::hours(2));
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(board.snapshot().await[0].status, AppointmentStatus::Booked);
    }

    #[tokio::test]
    async fn test_cancelled_behind_the_board_is_not_completed() {
        let mut store = MockAppointmentStore::new();
        let mut loads = 0;
        store.expect_list_all().times(2).returning(move || {
            loads += 1;
            let mut a = booked(1, "09:00");
            if loads > 1 {
                a.status = AppointmentStatus::Cancelled;
            }
            Ok(vec![a])
        });
        // The store refuses: the row is no longer booked
        store
            .expect_complete()
            .times(1)
            .returning(|id, _| Err(AppError::StaleSlot(format!("appointment {} changed", id))));
        store.expect_update().never();

        let (reconciler, board) = reconciler(store, noon_clock());
        let report = reconciler.load().await.unwrap();
        assert!(report.completed.is_empty());
        assert!(report.failed[0].stale);

        assert_eq!(board.snapshot().await[0].status, AppointmentStatus::Cancelled);
        let again = reconciler.sweep(SweepTrigger::Periodic).await;
        assert!(again.completed.is_empty());
        assert!(again.is_clean());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_initial_load_is_retried_by_timers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let mut store = MockAppointmentStore::new();
        store.expect_list_all().returning(move || {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::Internal("database starting up".to_string()))
            } else {
                Ok(vec![booked(1, "09:00")])
            }
        });
        store
            .expect_complete()
            .times(1)
            .returning(|id, slot| Ok(completed(id, &slot.time)));

        let board = AppointmentBoard::new();
        let reconciler = Reconciler::new(Arc::new(store), board.clone(), Arc::new(noon_clock()));
        let handle = reconciler.mount_with(Duration::from_secs(3), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(board.is_empty().await);

        // The deferred tick loads and completes; later ticks only sweep
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(board.snapshot().await[0].status, AppointmentStatus::Completed);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        handle.shutdown().await;
    }
}
