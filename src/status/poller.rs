use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::types::FilamentError;

use super::model::{FilamentStatus, Presentation, StatusSnapshot};
use super::source::StatusSource;

const ERROR_LABEL: &str = "error";

/// Polls the status endpoint on a fixed period and publishes the projected
/// state through a watch channel.
///
/// The schedule runs as a single spawned task owned by the poller. `stop`
/// (or dropping the poller) aborts it together with any request in flight.
pub struct StatusPoller {
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

struct Shared {
    source: Arc<dyn StatusSource>,
    state: watch::Sender<StatusSnapshot>,
    next_sequence: AtomicU64,
    /// Bumped on every stop; scheduled fetches from an older run are skipped.
    epoch: AtomicU64,
    debug_logs: bool,
}

impl StatusPoller {
    pub fn new(source: Arc<dyn StatusSource>) -> Self {
        Self::with_debug_logs(source, false)
    }

    /// With `debug_logs`, status changes are logged at info level instead of debug.
    pub fn with_debug_logs(source: Arc<dyn StatusSource>, debug_logs: bool) -> Self {
        let (state, _) = watch::channel(StatusSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                source,
                state,
                next_sequence: AtomicU64::new(0),
                epoch: AtomicU64::new(0),
                debug_logs,
            }),
            task: None,
        }
    }

    /// Fetch once now, then every `interval_secs` until stopped.
    ///
    /// Must be called from within a tokio runtime. Restarting replaces the
    /// running schedule.
    pub fn start(&mut self, interval_secs: f64) -> Result<(), FilamentError> {
        let period = poll_period(interval_secs)?;
        self.stop();

        info!(interval_secs, "Starting filament status polling");
        let shared = Arc::clone(&self.shared);
        let epoch = shared.epoch.load(Ordering::SeqCst);
        self.task = Some(tokio::spawn(run_schedule(shared, period, epoch)));
        Ok(())
    }

    /// Cancel the schedule. A scheduled fetch that has not yet issued its
    /// request when this returns will not issue it.
    pub fn stop(&mut self) {
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Stopped filament status polling");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    /// Issue a single request and project its outcome.
    ///
    /// Returns the status this request produced, even if a newer response
    /// had already been applied and this one was discarded.
    pub async fn fetch_once(&self) -> FilamentStatus {
        self.shared.fetch_once().await
    }

    pub fn current_status(&self) -> FilamentStatus {
        self.shared.state.borrow().status
    }

    pub fn current_presentation(&self) -> Presentation {
        self.shared.state.borrow().presentation()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.shared.state.subscribe()
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn poll_period(interval_secs: f64) -> Result<Duration, FilamentError> {
    if !interval_secs.is_finite() || interval_secs <= 0.0 {
        return Err(FilamentError::InvalidInterval(interval_secs));
    }
    match Duration::try_from_secs_f64(interval_secs) {
        Ok(period) if !period.is_zero() => Ok(period),
        _ => Err(FilamentError::InvalidInterval(interval_secs)),
    }
}

async fn run_schedule(shared: Arc<Shared>, period: Duration, epoch: u64) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Requests are not serialized; stale completions are dropped by sequence.
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let shared = Arc::clone(&shared);
                in_flight.spawn(async move {
                    shared.scheduled_fetch(epoch).await;
                });
            }
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }
    }
}

impl Shared {
    async fn scheduled_fetch(&self, epoch: u64) -> Option<FilamentStatus> {
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!(epoch, "Skipping fetch from a stopped schedule");
            return None;
        }
        Some(self.fetch_once().await)
    }

    async fn fetch_once(&self) -> FilamentStatus {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed) + 1;

        let (status, label) = match self.source.fetch_status().await {
            Ok(payload) => {
                let status = payload.filament_status();
                let label = payload.status.unwrap_or_else(|| status.to_string());
                (status, label)
            }
            Err(err) => {
                warn!(error = ?err, sequence, "Failed to query filament status");
                (FilamentStatus::Error, ERROR_LABEL.to_string())
            }
        };

        self.apply(sequence, status, label);
        status
    }

    fn apply(&self, sequence: u64, status: FilamentStatus, label: String) {
        let mut changed = false;
        let applied = self.state.send_if_modified(|current| {
            if sequence <= current.sequence {
                return false;
            }
            changed = !current.is_loaded() || current.status != status;
            *current = StatusSnapshot {
                status,
                label,
                sequence,
                updated_at: Some(Utc::now()),
            };
            true
        });

        if !applied {
            debug!(sequence, "Discarding stale filament status response");
            return;
        }

        if changed {
            if self.debug_logs {
                info!(status = %status, "Filament status changed");
            } else {
                debug!(status = %status, "Filament status changed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::model::{Icon, IndicatorColor, StatusPayload};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[derive(Clone)]
    enum Reply {
        Status(Option<&'static str>),
        Fail,
    }

    /// Replays scripted replies, repeating the last one forever.
    struct ScriptedSource {
        calls: AtomicUsize,
        replies: Mutex<VecDeque<(Duration, Reply)>>,
        last: Mutex<Reply>,
    }

    impl ScriptedSource {
        fn always(reply: Reply) -> Arc<Self> {
            Self::script(Vec::new(), reply)
        }

        fn script(steps: Vec<(Duration, Reply)>, then: Reply) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                replies: Mutex::new(steps.into()),
                last: Mutex::new(then),
            })
        }

        fn set(&self, reply: Reply) {
            *self.last.lock().unwrap() = reply;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn fetch_status(&self) -> Result<StatusPayload, FilamentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.replies.lock().unwrap().pop_front();
            let (delay, reply) = match step {
                Some(step) => step,
                None => (Duration::ZERO, self.last.lock().unwrap().clone()),
            };
            if !delay.is_zero() {
                time::sleep(delay).await;
            }
            match reply {
                Reply::Status(status) => Ok(StatusPayload {
                    status: status.map(str::to_string),
                }),
                Reply::Fail => Err(FilamentError::Endpoint(
                    "/api/plugin/octofilament returned 503 Service Unavailable".to_string(),
                )),
            }
        }
    }

    async fn settle() {
        time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test]
    async fn present_response_shows_green_check() {
        let source = ScriptedSource::always(Reply::Status(Some("present")));
        let poller = StatusPoller::new(source);

        assert_eq!(poller.fetch_once().await, FilamentStatus::Present);
        assert_eq!(
            poller.current_presentation(),
            Presentation::new(Icon::Check, IndicatorColor::Green)
        );
    }

    #[tokio::test]
    async fn absent_response_shows_red_cross() {
        let poller = StatusPoller::new(ScriptedSource::always(Reply::Status(Some("absent"))));

        poller.fetch_once().await;

        assert_eq!(
            poller.current_presentation(),
            Presentation::new(Icon::Cross, IndicatorColor::Red)
        );
        assert_eq!(poller.snapshot().label, "absent");
    }

    #[tokio::test]
    async fn missing_status_shows_gray_question_mark() {
        let poller = StatusPoller::new(ScriptedSource::always(Reply::Status(None)));

        assert_eq!(poller.fetch_once().await, FilamentStatus::Unknown);
        assert_eq!(
            poller.current_presentation(),
            Presentation::new(Icon::QuestionMark, IndicatorColor::Gray)
        );
        assert!(poller.snapshot().is_loaded());
    }

    #[tokio::test]
    async fn unrecognized_status_keeps_raw_label() {
        let poller = StatusPoller::new(ScriptedSource::always(Reply::Status(Some("jammed"))));

        poller.fetch_once().await;

        let snapshot = poller.snapshot();
        assert_eq!(snapshot.status, FilamentStatus::Unknown);
        assert_eq!(snapshot.label, "jammed");
    }

    #[tokio::test]
    async fn failure_overrides_previous_status() {
        let source = ScriptedSource::always(Reply::Status(Some("present")));
        let poller = StatusPoller::new(source.clone());
        poller.fetch_once().await;

        source.set(Reply::Fail);
        assert_eq!(poller.fetch_once().await, FilamentStatus::Error);

        assert_eq!(
            poller.current_presentation(),
            Presentation::new(Icon::WarningTriangle, IndicatorColor::Orange)
        );
        assert_eq!(poller.snapshot().label, "error");
    }

    #[tokio::test]
    async fn nothing_is_loaded_before_first_fetch() {
        let poller = StatusPoller::new(ScriptedSource::always(Reply::Status(Some("present"))));

        assert_eq!(poller.current_status(), FilamentStatus::Unknown);
        assert!(!poller.snapshot().is_loaded());
        assert!(!poller.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn start_fetches_immediately_then_every_period() {
        let source = ScriptedSource::always(Reply::Status(Some("present")));
        let mut poller = StatusPoller::new(source.clone());

        poller.start(5.0).unwrap();
        settle().await;
        assert_eq!(source.calls(), 1);
        assert!(poller.is_polling());

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(source.calls(), 2);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(source.calls(), 4);
        assert_eq!(poller.current_status(), FilamentStatus::Present);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_fetches() {
        let source = ScriptedSource::always(Reply::Status(Some("absent")));
        let mut poller = StatusPoller::new(source.clone());

        poller.start(5.0).unwrap();
        settle().await;
        poller.stop();
        assert!(!poller.is_polling());

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn fetch_scheduled_before_stop_is_skipped() {
        let source = ScriptedSource::always(Reply::Status(Some("present")));
        let mut poller = StatusPoller::new(source.clone());

        poller.start(5.0).unwrap();
        let epoch = poller.shared.epoch.load(Ordering::SeqCst);
        poller.stop();

        assert_eq!(poller.shared.scheduled_fetch(epoch).await, None);
        assert_eq!(source.calls(), 0);
        assert!(!poller.snapshot().is_loaded());
    }

    #[tokio::test]
    async fn fetch_from_the_current_schedule_runs() {
        let source = ScriptedSource::always(Reply::Status(Some("absent")));
        let poller = StatusPoller::new(source.clone());

        let epoch = poller.shared.epoch.load(Ordering::SeqCst);

        assert_eq!(
            poller.shared.scheduled_fetch(epoch).await,
            Some(FilamentStatus::Absent)
        );
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_poller_cancels_the_schedule() {
        let source = ScriptedSource::always(Reply::Status(Some("absent")));
        let mut poller = StatusPoller::new(source.clone());

        poller.start(1.0).unwrap();
        settle().await;
        drop(poller);

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn non_positive_intervals_are_rejected() {
        let source = ScriptedSource::always(Reply::Status(Some("present")));
        let mut poller = StatusPoller::new(source.clone());

        for interval in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-300] {
            let result = poller.start(interval);
            assert!(
                matches!(result, Err(FilamentError::InvalidInterval(_))),
                "{interval} should be rejected"
            );
        }

        time::sleep(Duration::from_secs(10)).await;
        assert!(!poller.is_polling());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_the_running_schedule() {
        let source = ScriptedSource::always(Reply::Status(Some("present")));
        let mut poller = StatusPoller::new(source.clone());

        poller.start(1.0).unwrap();
        settle().await;
        poller.start(10.0).unwrap();
        settle().await;
        assert_eq!(source.calls(), 2);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_request_does_not_hold_back_the_schedule() {
        let source = ScriptedSource::script(
            vec![(Duration::from_secs(30), Reply::Status(Some("absent")))],
            Reply::Status(Some("present")),
        );
        let mut poller = StatusPoller::new(source.clone());

        poller.start(5.0).unwrap();
        time::sleep(Duration::from_millis(5_001)).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(poller.current_status(), FilamentStatus::Present);

        // The first request completes late and must not overwrite newer state.
        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(poller.current_status(), FilamentStatus::Present);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_is_discarded() {
        let source = ScriptedSource::script(
            vec![
                (Duration::from_secs(3), Reply::Status(Some("absent"))),
                (Duration::ZERO, Reply::Status(Some("present"))),
            ],
            Reply::Status(Some("present")),
        );
        let poller = StatusPoller::new(source);

        let (older, newer) = tokio::join!(poller.fetch_once(), async {
            settle().await;
            poller.fetch_once().await
        });

        assert_eq!(older, FilamentStatus::Absent);
        assert_eq!(newer, FilamentStatus::Present);
        assert_eq!(poller.current_status(), FilamentStatus::Present);
        assert_eq!(poller.snapshot().sequence, 2);
    }

    #[tokio::test]
    async fn subscribers_see_each_applied_snapshot() {
        let source = ScriptedSource::always(Reply::Status(Some("present")));
        let poller = StatusPoller::new(source.clone());
        let mut updates = poller.subscribe();

        poller.fetch_once().await;
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow_and_update().status, FilamentStatus::Present);

        source.set(Reply::Fail);
        poller.fetch_once().await;
        updates.changed().await.unwrap();
        assert_eq!(
            updates.borrow_and_update().presentation(),
            Presentation::for_status(FilamentStatus::Error)
        );
    }
}
