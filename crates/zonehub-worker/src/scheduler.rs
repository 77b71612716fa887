//! Rotation scheduler: a single repeating timer per authorized session.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::jobs::rotation::{FireOutcome, RotationJob};

/// A live timer task.
#[derive(Debug)]
struct ArmedTimer {
    /// Identifies the timer in logs
    id: Uuid,
    /// The spawned timer loop
    handle: JoinHandle<()>,
}

/// Owns the rotation timer.
///
/// `arm` cancels any live timer and waits for the cancellation to be
/// confirmed before spawning the next one, all under the slot lock, so two
/// timers are never live at once. The first fire happens one full period
/// after arming.
#[derive(Debug)]
pub struct RotationScheduler {
    /// Job run on every fire
    job: Arc<RotationJob>,
    /// Time between fires
    period: Duration,
    /// The live timer, if any
    slot: Mutex<Option<ArmedTimer>>,
}

impl RotationScheduler {
    /// Create a new, disarmed scheduler
    pub fn new(job: RotationJob, period: Duration) -> Self {
        Self {
            job: Arc::new(job),
            period,
            slot: Mutex::new(None),
        }
    }

    /// The configured rotation period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Cancel any live timer, then start a new one. Returns the new timer's id.
    pub async fn arm(&self) -> Uuid {
        let mut slot = self.slot.lock().await;

        if let Some(previous) = slot.take() {
            Self::cancel(previous).await;
        }

        let id = Uuid::new_v4();
        let handle = tokio::spawn(run_timer(id, Arc::clone(&self.job), self.period));
        *slot = Some(ArmedTimer { id, handle });

        tracing::info!(
            timer_id = %id,
            period_seconds = self.period.as_secs(),
            "Rotation timer armed"
        );
        id
    }

    /// Cancel the live timer. Returns `true` if one was still running.
    pub async fn disarm(&self) -> bool {
        let mut slot = self.slot.lock().await;

        match slot.take() {
            Some(timer) => {
                let was_live = !timer.handle.is_finished();
                Self::cancel(timer).await;
                was_live
            }
            None => false,
        }
    }

    /// Whether a timer is currently running
    pub async fn is_armed(&self) -> bool {
        self.slot
            .lock()
            .await
            .as_ref()
            .is_some_and(|timer| !timer.handle.is_finished())
    }

    /// Abort the timer task and wait until it has actually stopped.
    ///
    /// Aborting (rather than waiting for the loop to notice a signal) is
    /// required: a fire in flight may be waiting on the session lock that
    /// the caller of `arm`/`disarm` is holding.
    async fn cancel(timer: ArmedTimer) {
        timer.handle.abort();
        match timer.handle.await {
            Ok(()) => {
                tracing::debug!(timer_id = %timer.id, "Rotation timer had already stopped");
            }
            Err(e) if e.is_cancelled() => {
                tracing::info!(timer_id = %timer.id, "Rotation timer cancelled");
            }
            Err(e) => {
                tracing::error!(timer_id = %timer.id, "Rotation timer task failed: {}", e);
            }
        }
    }
}

/// Timer loop: fire once per period until a fire reports a stale session.
async fn run_timer(id: Uuid, job: Arc<RotationJob>, period: Duration) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match job.fire().await {
            FireOutcome::Rotated(_) | FireOutcome::Failed(_) => {}
            FireOutcome::Stale(reason) => {
                tracing::info!(timer_id = %id, reason = %reason, "Rotation timer self-disarmed");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use tokio::sync::broadcast;

    use zonehub_core::error::ZoneError;
    use zonehub_core::events::{DomainEvent, EventPayload, RotationEvent};
    use zonehub_core::result::ZoneResult;
    use zonehub_core::traits::{RotationTarget, SystemClock};
    use zonehub_core::types::{ChatId, Snapshot};

    const PERIOD: Duration = Duration::from_secs(7200);

    #[derive(Debug)]
    struct FakeTarget {
        open: AtomicBool,
        fires: AtomicUsize,
    }

    impl FakeTarget {
        fn new(open: bool) -> Arc<Self> {
            Arc::new(Self {
                open: AtomicBool::new(open),
                fires: AtomicUsize::new(0),
            })
        }

        fn fires(&self) -> usize {
            self.fires.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RotationTarget for FakeTarget {
        async fn rotate(&self, now: DateTime<Utc>) -> ZoneResult<Snapshot> {
            self.fires.fetch_add(1, Ordering::SeqCst);
            if !self.open.load(Ordering::SeqCst) {
                return Err(ZoneError::ListClosed);
            }
            Ok(Snapshot {
                zones: Vec::new(),
                waitlist: Vec::new(),
                last_rotation_at: Some(now),
                is_open: true,
            })
        }

        async fn broadcast_chat(&self) -> Option<ChatId> {
            Some(ChatId(-100))
        }
    }

    fn scheduler(target: Arc<FakeTarget>) -> (RotationScheduler, broadcast::Receiver<DomainEvent>) {
        let (tx, rx) = broadcast::channel(16);
        let job = RotationJob::new(target, Arc::new(SystemClock), tx);
        (RotationScheduler::new(job, PERIOD), rx)
    }

    fn drain(rx: &mut broadcast::Receiver<DomainEvent>) -> Vec<RotationEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let EventPayload::Rotation(event) = event.payload {
                events.push(event);
            }
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fire_after_full_period() {
        let target = FakeTarget::new(true);
        let (scheduler, mut rx) = scheduler(Arc::clone(&target));
        scheduler.arm().await;

        time::sleep(PERIOD - Duration::from_secs(1)).await;
        assert_eq!(target.fires(), 0);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(target.fires(), 1);
        let events = drain(&mut rx);
        assert!(matches!(
            events.as_slice(),
            [RotationEvent::Rotated {
                chat: Some(ChatId(-100)),
                ..
            }]
        ));

        time::sleep(PERIOD).await;
        assert_eq!(target.fires(), 2);
        assert!(scheduler.is_armed().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_live_timer() {
        let target = FakeTarget::new(true);
        let (scheduler, _rx) = scheduler(Arc::clone(&target));

        let first = scheduler.arm().await;
        time::sleep(PERIOD / 2).await;
        let second = scheduler.arm().await;
        assert_ne!(first, second);

        // The first timer would have fired here.
        time::sleep(PERIOD / 2 + Duration::from_secs(1)).await;
        assert_eq!(target.fires(), 0);

        time::sleep(PERIOD / 2).await;
        assert_eq!(target.fires(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_fire_self_disarms() {
        let target = FakeTarget::new(false);
        let (scheduler, mut rx) = scheduler(Arc::clone(&target));
        scheduler.arm().await;

        time::sleep(PERIOD + Duration::from_secs(1)).await;
        assert_eq!(target.fires(), 1);
        assert!(!scheduler.is_armed().await);
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [RotationEvent::Disarmed { .. }]
        ));

        time::sleep(PERIOD * 2).await;
        assert_eq!(target.fires(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_stops_timer() {
        let target = FakeTarget::new(true);
        let (scheduler, _rx) = scheduler(Arc::clone(&target));
        scheduler.arm().await;

        assert!(scheduler.disarm().await);
        assert!(!scheduler.is_armed().await);
        assert!(!scheduler.disarm().await);

        time::sleep(PERIOD * 3).await;
        assert_eq!(target.fires(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fire_keeps_timer() {
        #[derive(Debug)]
        struct Refusing(AtomicUsize);

        #[async_trait]
        impl RotationTarget for Refusing {
            async fn rotate(&self, _now: DateTime<Utc>) -> ZoneResult<Snapshot> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Err(ZoneError::NoFreeSlot)
            }

            async fn broadcast_chat(&self) -> Option<ChatId> {
                None
            }
        }

        let target = Arc::new(Refusing(AtomicUsize::new(0)));
        let (tx, _rx) = broadcast::channel(4);
        let job = RotationJob::new(target.clone(), Arc::new(SystemClock), tx);
        let scheduler = RotationScheduler::new(job, PERIOD);
        scheduler.arm().await;

        time::sleep(PERIOD * 2 + Duration::from_secs(1)).await;
        assert_eq!(target.0.load(Ordering::SeqCst), 2);
        assert!(scheduler.is_armed().await);
    }
}
