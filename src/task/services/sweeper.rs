//! Scheduled sweep moving stale tasks to `Expired` or `Overdue`.
//!
//! Two passes run on every tick:
//!
//! - tasks in `Testing` with an estimate expire once the hours since they
//!   last entered `Testing` exceed the estimate,
//! - tasks still in `ToDo` past their due date become overdue.
//!
//! Both passes go through [`Task::change_status`], so history and
//! notifications match a manual transition. A task that has moved on no
//! longer matches its pass, which makes repeated or concurrent sweeps
//! harmless.

use super::{StatusNotifier, TaskServiceResult};
use crate::identity::ports::UserRepository;
use crate::notification::ports::NotificationService;
use crate::task::{
    domain::{PerformedBy, Task, TaskId, TaskNumber, TaskPredicate, TaskStatus, elapsed_hours},
    ports::{TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, SecondsFormat, Utc};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, instrument, warn};

/// Default cadence between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Tasks moved to `Expired`.
    pub expired: usize,
    /// Tasks moved to `Overdue`.
    pub overdue: usize,
    /// Testing tasks without a recorded entry into `Testing`.
    pub skipped: usize,
    /// Tasks whose transition could not be saved.
    pub failed: usize,
}

impl SweepReport {
    /// Returns the number of tasks transitioned.
    #[must_use]
    pub const fn transitioned(&self) -> usize {
        self.expired + self.overdue
    }
}

/// Failure to save a single swept task.
#[derive(Debug, Error)]
#[error("failed to sweep task {number} ({task_id}): {source}")]
pub struct SweepItemError {
    task_id: TaskId,
    number: TaskNumber,
    #[source]
    source: TaskRepositoryError,
}

enum Verdict {
    Transitioned,
    Skipped,
    Untouched,
}

/// Background job applying the `Expired` and `Overdue` transitions.
pub struct ExpirySweeper<R, U, N, C> {
    tasks: Arc<R>,
    notifier: StatusNotifier<U, N>,
    clock: Arc<C>,
}

impl<R, U, N, C> ExpirySweeper<R, U, N, C>
where
    R: TaskRepository,
    U: UserRepository,
    N: NotificationService,
    C: Clock + Send + Sync,
{
    /// Creates a sweeper.
    #[must_use]
    pub fn new(tasks: Arc<R>, users: Arc<U>, notifications: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            notifier: StatusNotifier::new(users, notifications),
            clock,
        }
    }

    /// Runs both passes once.
    ///
    /// Failures to save an individual task are logged and counted; they do
    /// not stop the sweep.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the candidate tasks cannot be
    /// loaded.
    pub async fn sweep(&self) -> TaskServiceResult<SweepReport> {
        let mut report = SweepReport::default();
        self.sweep_expired(&mut report).await?;
        self.sweep_overdue(&mut report).await?;
        Ok(report)
    }

    /// Runs one sweep and logs its outcome.
    #[must_use]
    #[instrument(skip(self))]
    pub async fn tick(&self) -> SweepReport {
        match self.sweep().await {
            Ok(report) => {
                if report.transitioned() > 0 || report.failed > 0 {
                    info!(
                        expired = report.expired,
                        overdue = report.overdue,
                        skipped = report.skipped,
                        failed = report.failed,
                        "sweep finished"
                    );
                } else {
                    debug!(skipped = report.skipped, "sweep found nothing to do");
                }
                report
            }
            Err(err) => {
                warn!(error = %err, "sweep aborted");
                SweepReport::default()
            }
        }
    }

    async fn sweep_expired(&self, report: &mut SweepReport) -> TaskServiceResult<()> {
        let candidates = self
            .tasks
            .find_matching(&TaskPredicate::And(vec![
                TaskPredicate::StatusIs(TaskStatus::Testing),
                TaskPredicate::HasEstimate,
            ]))
            .await?;
        for task in candidates {
            match self.expire(task).await {
                Ok(Verdict::Transitioned) => report.expired += 1,
                Ok(Verdict::Skipped) => report.skipped += 1,
                Ok(Verdict::Untouched) => {}
                Err(err) => {
                    warn!(error = %err, "expiry transition failed");
                    report.failed += 1;
                }
            }
        }
        Ok(())
    }

    async fn sweep_overdue(&self, report: &mut SweepReport) -> TaskServiceResult<()> {
        let now = self.clock.utc();
        let candidates = self
            .tasks
            .find_matching(&TaskPredicate::And(vec![
                TaskPredicate::StatusIs(TaskStatus::ToDo),
                TaskPredicate::DueBefore(now),
            ]))
            .await?;
        for task in candidates {
            match self.mark_overdue(task).await {
                Ok(Verdict::Transitioned) => report.overdue += 1,
                Ok(Verdict::Skipped | Verdict::Untouched) => {}
                Err(err) => {
                    warn!(error = %err, "overdue transition failed");
                    report.failed += 1;
                }
            }
        }
        Ok(())
    }

    async fn expire(&self, mut task: Task) -> Result<Verdict, SweepItemError> {
        let Some(estimate) = task.estimated_hours() else {
            return Ok(Verdict::Untouched);
        };
        let Some(entered) = task.latest_entry_into(TaskStatus::Testing) else {
            debug!(task_id = %task.id(), "no entry into Testing recorded");
            return Ok(Verdict::Skipped);
        };
        let elapsed = elapsed_hours(entered.timestamp, self.clock.utc());
        if elapsed <= estimate {
            return Ok(Verdict::Untouched);
        }
        let reason = format!(
            "Testing ran {:.2} hours over the {estimate} hour estimate \
             ({elapsed:.2} hours elapsed)",
            overage(elapsed, estimate)
        );
        self.transition(&mut task, TaskStatus::Expired, reason).await
    }

    async fn mark_overdue(&self, mut task: Task) -> Result<Verdict, SweepItemError> {
        let Some(due) = task.due_date() else {
            return Ok(Verdict::Untouched);
        };
        let reason = format!("Due date {} has passed", iso_timestamp(due));
        self.transition(&mut task, TaskStatus::Overdue, reason).await
    }

    async fn transition(
        &self,
        task: &mut Task,
        target: TaskStatus,
        reason: String,
    ) -> Result<Verdict, SweepItemError> {
        let note = reason.clone();
        let Some(transition) =
            task.change_status(target, PerformedBy::System, Some(reason), &*self.clock)
        else {
            return Ok(Verdict::Untouched);
        };
        self.tasks
            .update(task)
            .await
            .map_err(|source| SweepItemError {
                task_id: task.id(),
                number: task.number().clone(),
                source,
            })?;
        info!(
            task_id = %task.id(),
            number = %task.number(),
            status = %target,
            "task swept"
        );
        self.notifier
            .announce(task, transition, PerformedBy::System, Some(&note))
            .await;
        Ok(Verdict::Transitioned)
    }
}

impl<R, U, N, C> ExpirySweeper<R, U, N, C>
where
    R: TaskRepository + 'static,
    U: UserRepository + 'static,
    N: NotificationService + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Spawns the sweep loop on the current runtime.
    ///
    /// The first sweep runs immediately; later sweeps follow every
    /// `period`, delayed rather than bunched up when a sweep overruns.
    #[must_use = "dropping the handle leaves the sweeper running unowned"]
    pub fn start(self: Arc<Self>, period: Duration) -> SweeperHandle {
        let (shutdown, mut stop_requested) = watch::channel(false);
        let cadence = period.max(MIN_SWEEP_INTERVAL);
        let task = tokio::spawn(async move {
            let mut ticker = interval(cadence);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval = ?cadence, "expiry sweeper started");
            let mut swept = 0_usize;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        swept += self.tick().await.transitioned();
                    }
                    changed = stop_requested.changed() => {
                        if changed.is_err() || *stop_requested.borrow() {
                            break;
                        }
                    }
                }
            }
            info!(swept, "expiry sweeper stopped");
        });
        SweeperHandle { shutdown, task }
    }
}

/// Owner of a running sweep loop.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Returns `true` once the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signals the loop to stop and waits for it to exit.
    ///
    /// A sweep already in progress completes first.
    ///
    /// # Errors
    ///
    /// Returns the [`JoinError`] when the loop panicked.
    pub async fn stop(self) -> Result<(), JoinError> {
        if self.shutdown.send(true).is_err() {
            debug!("expiry sweeper already exited");
        }
        self.task.await
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "hour overage is reported with fractional precision"
)]
const fn overage(elapsed: f64, estimate: f64) -> f64 {
    elapsed - estimate
}

fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn due_dates_render_as_utc_iso_timestamps() {
        let due = Utc.with_ymd_and_hms(2026, 3, 1, 17, 30, 0).single();
        let Some(instant) = due else {
            panic!("valid due date");
        };
        assert_eq!(iso_timestamp(instant), "2026-03-01T17:30:00Z");
    }

    #[test]
    fn report_sums_transitions() {
        let report = SweepReport {
            expired: 2,
            overdue: 3,
            skipped: 1,
            failed: 4,
        };
        assert_eq!(report.transitioned(), 5);
    }
}
