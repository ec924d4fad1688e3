//! Order status reconciliation after the payment provider redirect.
//!
//! A [`StatusPoller`] owns at most one polling session at a time. A session
//! runs two tasks that share one cancellation token: the fetch loop, which
//! polls the checkout backend with a relative backoff, and the deadline timer.
//! Whichever reaches a terminal outcome first cancels the other. Every write
//! to the published [`PollerState`] happens under the session lock after a
//! liveness check, so nothing a retired session does can be observed.

use crate::payments::error::PaymentResult;
use crate::payments::provider::StatusFetcher;
use crate::payments::types::{OrderStatusSnapshot, PaymentStatus};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const MISSING_REFERENCE: &str = "missing reference";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Absolute limit measured from session start, independent of attempts.
    pub deadline: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_millis(15_000),
        }
    }
}

/// Delay between the completion of attempt `attempt` (1-indexed) and the
/// start of the next one.
///
/// | attempts | delay   |
/// |----------|---------|
/// | 1–2      | 500 ms  |
/// | 3–4      | 1 s     |
/// | 5–7      | 2 s     |
/// | 8–12     | 3 s     |
/// | ≥ 13     | 5 s     |
pub fn backoff_delay(attempt: u32) -> Duration {
    let millis = match attempt {
        0..=2 => 500,
        3..=4 => 1_000,
        5..=7 => 2_000,
        8..=12 => 3_000,
        _ => 5_000,
    };
    Duration::from_millis(millis)
}

// ---------------------------------------------------------------------------
// Published state
// ---------------------------------------------------------------------------

/// Live view of one polling session, published on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollerState {
    pub order_status: Option<OrderStatusSnapshot>,
    pub loading: bool,
    pub error: Option<String>,
    pub timed_out: bool,
}

impl Default for PollerState {
    fn default() -> Self {
        Self {
            order_status: None,
            loading: true,
            error: None,
            timed_out: false,
        }
    }
}

impl PollerState {
    fn missing_reference() -> Self {
        Self {
            order_status: None,
            loading: false,
            error: Some(MISSING_REFERENCE.to_string()),
            timed_out: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    Paid,
    Cancelled,
    Failed,
    TimedOut,
    FetchError,
}

impl TerminalReason {
    fn from_payment_status(status: PaymentStatus) -> Option<Self> {
        match status {
            PaymentStatus::Pending => None,
            PaymentStatus::Paid => Some(TerminalReason::Paid),
            PaymentStatus::Cancelled => Some(TerminalReason::Cancelled),
            PaymentStatus::Failed => Some(TerminalReason::Failed),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Mutable bookkeeping for one reference. Only touched under
/// [`SessionShared::lock`].
#[derive(Debug)]
struct PollingSession {
    attempt_count: u32,
    started_at: Instant,
    latest_snapshot: Option<OrderStatusSnapshot>,
    terminal_reason: Option<TerminalReason>,
    cancelled: bool,
}

impl PollingSession {
    fn is_live(&self) -> bool {
        !self.cancelled && self.terminal_reason.is_none()
    }
}

struct SessionShared {
    id: Uuid,
    reference: String,
    deadline: Duration,
    token: CancellationToken,
    state: Arc<watch::Sender<PollerState>>,
    session: Mutex<PollingSession>,
}

impl SessionShared {
    fn new(
        reference: String,
        deadline: Duration,
        state: Arc<watch::Sender<PollerState>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reference,
            deadline,
            token: CancellationToken::new(),
            state,
            session: Mutex::new(PollingSession {
                attempt_count: 0,
                started_at: Instant::now(),
                latest_snapshot: None,
                terminal_reason: None,
                cancelled: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PollingSession> {
        // No invariant spans a panic here; a poisoned lock still holds valid data.
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Checks liveness and the deadline, then counts the attempt. `None`
    /// means the loop must exit.
    fn begin_attempt(&self) -> Option<u32> {
        let mut session = self.lock();
        if !session.is_live() {
            return None;
        }

        let elapsed = session.started_at.elapsed();
        if elapsed >= self.deadline {
            debug!(
                session_id = %self.id,
                elapsed_ms = elapsed.as_millis() as u64,
                "deadline passed before next attempt"
            );
            self.finish_timed_out(&mut session);
            return None;
        }

        session.attempt_count += 1;
        Some(session.attempt_count)
    }

    /// Applies one fetch outcome. Returns the delay before the next attempt,
    /// or `None` when the session is over.
    fn record(&self, outcome: PaymentResult<OrderStatusSnapshot>) -> Option<Duration> {
        let mut session = self.lock();
        if !session.is_live() {
            debug!(session_id = %self.id, "discarding fetch result of retired session");
            return None;
        }

        let snapshot = match outcome {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // Fetch errors end the session.
                error!(
                    session_id = %self.id,
                    reference = %self.reference,
                    attempt = session.attempt_count,
                    error = %e,
                    "order status fetch failed; polling stopped"
                );
                session.terminal_reason = Some(TerminalReason::FetchError);
                self.state.send_modify(|state| {
                    state.error = Some(e.to_string());
                    state.loading = false;
                });
                self.token.cancel();
                return None;
            }
        };

        let payment_status = snapshot.payment_status;
        session.latest_snapshot = Some(snapshot.clone());

        match TerminalReason::from_payment_status(payment_status) {
            Some(reason) => {
                session.terminal_reason = Some(reason);
                info!(
                    session_id = %self.id,
                    reference = %self.reference,
                    attempts = session.attempt_count,
                    payment_status = %payment_status,
                    elapsed_ms = session.started_at.elapsed().as_millis() as u64,
                    "payment outcome resolved"
                );
                self.state.send_modify(|state| {
                    state.order_status = Some(snapshot);
                    state.loading = false;
                });
                self.token.cancel();
                None
            }
            None => {
                let delay = backoff_delay(session.attempt_count);
                debug!(
                    session_id = %self.id,
                    attempt = session.attempt_count,
                    next_attempt_in_ms = delay.as_millis() as u64,
                    "payment still pending"
                );
                self.state.send_modify(|state| {
                    state.order_status = Some(snapshot);
                    state.loading = true;
                });
                Some(delay)
            }
        }
    }

    /// Deadline timer callback.
    fn time_out(&self) {
        let mut session = self.lock();
        if !session.is_live() {
            return;
        }
        self.finish_timed_out(&mut session);
    }

    fn finish_timed_out(&self, session: &mut PollingSession) {
        session.cancelled = true;
        session.terminal_reason = Some(TerminalReason::TimedOut);
        warn!(
            session_id = %self.id,
            reference = %self.reference,
            attempts = session.attempt_count,
            last_payment_status = ?session.latest_snapshot.as_ref().map(|s| s.payment_status),
            deadline_ms = self.deadline.as_millis() as u64,
            "payment confirmation timed out"
        );
        self.state.send_modify(|state| {
            state.timed_out = true;
            state.loading = false;
        });
        self.token.cancel();
    }

    fn retire(&self) {
        let mut session = self.lock();
        session.cancelled = true;
        self.token.cancel();
    }
}

async fn run_fetch_loop(shared: Arc<SessionShared>, fetcher: Arc<dyn StatusFetcher>) {
    while let Some(attempt) = shared.begin_attempt() {
        debug!(
            session_id = %shared.id,
            reference = %shared.reference,
            attempt,
            "fetching order status"
        );

        let outcome = tokio::select! {
            biased;
            _ = shared.token.cancelled() => return,
            outcome = fetcher.fetch_status(&shared.reference) => outcome,
        };

        let Some(delay) = shared.record(outcome) else {
            return;
        };

        tokio::select! {
            biased;
            _ = shared.token.cancelled() => return,
            _ = sleep(delay) => {}
        }
    }
}

async fn run_deadline(shared: Arc<SessionShared>) {
    let fires_at = shared.lock().started_at + shared.deadline;
    tokio::select! {
        biased;
        _ = shared.token.cancelled() => {}
        _ = sleep_until(fires_at) => shared.time_out(),
    }
}

struct ActiveSession {
    shared: Arc<SessionShared>,
    tasks: Vec<JoinHandle<()>>,
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

/// Polls the checkout backend for one order reference at a time.
///
/// Must be used from within a Tokio runtime. Dropping the poller disposes the
/// active session.
pub struct StatusPoller {
    fetcher: Arc<dyn StatusFetcher>,
    config: PollerConfig,
    state: Arc<watch::Sender<PollerState>>,
    active: Option<ActiveSession>,
}

impl StatusPoller {
    pub fn new(fetcher: Arc<dyn StatusFetcher>, config: PollerConfig) -> Self {
        let (state, _) = watch::channel(PollerState::default());
        Self {
            fetcher,
            config,
            state: Arc::new(state),
            active: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PollerState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> PollerState {
        self.state.borrow().clone()
    }

    /// Attempts made by the current session (0 when idle).
    pub fn attempts(&self) -> u32 {
        self.active
            .as_ref()
            .map(|active| active.shared.lock().attempt_count)
            .unwrap_or(0)
    }

    pub fn terminal_reason(&self) -> Option<TerminalReason> {
        self.active
            .as_ref()
            .and_then(|active| active.shared.lock().terminal_reason)
    }

    /// Retires the current session and starts polling `reference`.
    ///
    /// The backoff schedule always restarts at attempt 1; a session is never
    /// resumed.
    pub fn start(&mut self, reference: Option<&str>) {
        self.dispose();

        let Some(reference) = reference.map(str::trim).filter(|r| !r.is_empty()) else {
            warn!("order status polling requested without a reference");
            self.state.send_replace(PollerState::missing_reference());
            return;
        };

        self.state.send_replace(PollerState::default());

        let shared = Arc::new(SessionShared::new(
            reference.to_string(),
            self.config.deadline,
            Arc::clone(&self.state),
        ));
        info!(
            session_id = %shared.id,
            reference = %shared.reference,
            deadline_ms = self.config.deadline.as_millis() as u64,
            "order status polling started"
        );

        let tasks = vec![
            tokio::spawn(run_deadline(Arc::clone(&shared))),
            tokio::spawn(run_fetch_loop(Arc::clone(&shared), Arc::clone(&self.fetcher))),
        ];
        self.active = Some(ActiveSession { shared, tasks });
    }

    /// Retires the current session. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if let Some(active) = self.active.take() {
            active.shared.retire();
            for task in active.tasks {
                task.abort();
            }
            debug!(session_id = %active.shared.id, "polling session disposed");
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.dispose();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::error::PaymentError;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Clone)]
    enum Step {
        Status(PaymentStatus),
        Http(u16),
        Slow(Duration, PaymentStatus),
    }

    /// Replays a per-reference script; an exhausted script answers `pending`.
    #[derive(Default)]
    struct ScriptedFetcher {
        scripts: Mutex<HashMap<String, VecDeque<Step>>>,
        calls: AtomicU32,
    }

    impl ScriptedFetcher {
        fn with(reference: &str, steps: Vec<Step>) -> Arc<Self> {
            let fetcher = Self::default();
            fetcher.script(reference, steps);
            Arc::new(fetcher)
        }

        fn script(&self, reference: &str, steps: Vec<Step>) {
            self.scripts
                .lock()
                .unwrap()
                .insert(reference.to_string(), steps.into());
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn snapshot(reference: &str, payment_status: PaymentStatus) -> OrderStatusSnapshot {
        OrderStatusSnapshot {
            order_id: 1001,
            order_number: reference.to_string(),
            status: "pending_payment".to_string(),
            payment_status,
            total_amount: Some(34900),
            currency: Some("NOK".to_string()),
        }
    }

    #[async_trait]
    impl StatusFetcher for ScriptedFetcher {
        async fn fetch_status(&self, reference: &str) -> PaymentResult<OrderStatusSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self
                .scripts
                .lock()
                .unwrap()
                .get_mut(reference)
                .and_then(VecDeque::pop_front)
                .unwrap_or(Step::Status(PaymentStatus::Pending));
            match step {
                Step::Status(status) => Ok(snapshot(reference, status)),
                Step::Http(code) => Err(PaymentError::Status {
                    status: code,
                    message: format!("HTTP {}", code),
                }),
                Step::Slow(delay, status) => {
                    sleep(delay).await;
                    Ok(snapshot(reference, status))
                }
            }
        }
    }

    fn poller(fetcher: &Arc<ScriptedFetcher>) -> StatusPoller {
        let fetcher: Arc<dyn StatusFetcher> = fetcher.clone();
        StatusPoller::new(fetcher, PollerConfig::default())
    }

    async fn settled(rx: &mut watch::Receiver<PollerState>) -> PollerState {
        rx.wait_for(|state| !state.loading)
            .await
            .expect("poller dropped")
            .clone()
    }

    // --- backoff schedule ---------------------------------------------------

    #[test]
    fn backoff_delay_schedule_is_correct() {
        let ms = |n| backoff_delay(n).as_millis();
        assert_eq!((ms(1), ms(2)), (500, 500));
        assert_eq!((ms(3), ms(4)), (1_000, 1_000));
        assert_eq!((ms(5), ms(6), ms(7)), (2_000, 2_000, 2_000));
        assert_eq!((ms(8), ms(12)), (3_000, 3_000));
        assert_eq!((ms(13), ms(500)), (5_000, 5_000));
    }

    #[test]
    fn backoff_delay_never_decreases() {
        for n in 1..200 {
            assert!(backoff_delay(n) <= backoff_delay(n + 1), "attempt {}", n);
        }
    }

    // --- outcomes -----------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn pending_then_paid_resolves_after_two_fetches() {
        let fetcher = ScriptedFetcher::with(
            "ORD-1001",
            vec![
                Step::Status(PaymentStatus::Pending),
                Step::Status(PaymentStatus::Paid),
            ],
        );
        let mut poller = poller(&fetcher);
        let mut rx = poller.subscribe();
        let started = Instant::now();

        poller.start(Some("ORD-1001"));
        let state = settled(&mut rx).await;

        assert!(started.elapsed() >= Duration::from_millis(500));
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(poller.attempts(), 2);
        assert_eq!(
            state.order_status.map(|s| s.payment_status),
            Some(PaymentStatus::Paid)
        );
        assert!(state.error.is_none());
        assert!(!state.timed_out);

        // The deadline timer was cancelled with the terminal outcome.
        sleep(Duration::from_secs(20)).await;
        assert!(!poller.state().timed_out);
        assert_eq!(poller.terminal_reason(), Some(TerminalReason::Paid));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn attempts_follow_relative_backoff() {
        let fetcher = ScriptedFetcher::with(
            "ORD-2000",
            vec![
                Step::Status(PaymentStatus::Pending),
                Step::Status(PaymentStatus::Pending),
                Step::Status(PaymentStatus::Pending),
                Step::Status(PaymentStatus::Failed),
            ],
        );
        let mut poller = poller(&fetcher);
        let mut rx = poller.subscribe();
        let started = Instant::now();

        poller.start(Some("ORD-2000"));
        settled(&mut rx).await;

        // 500 + 500 + 1000 between the four attempts.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(2_000), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(2_050), "{:?}", elapsed);
        assert_eq!(poller.attempts(), 4);
        assert_eq!(poller.terminal_reason(), Some(TerminalReason::Failed));
    }

    #[tokio::test(start_paused = true)]
    async fn pending_forever_times_out_at_deadline() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let mut poller = poller(&fetcher);
        let mut rx = poller.subscribe();
        let started = Instant::now();

        poller.start(Some("ORD-1002"));
        let state = rx.wait_for(|s| s.timed_out).await.unwrap().clone();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(15_000), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(15_050), "{:?}", elapsed);
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(
            state.order_status.map(|s| s.payment_status),
            Some(PaymentStatus::Pending)
        );
        assert_eq!(poller.terminal_reason(), Some(TerminalReason::TimedOut));

        let calls = fetcher.calls();
        sleep(Duration::from_secs(30)).await;
        assert_eq!(fetcher.calls(), calls, "no fetch after timeout");
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_wins_over_in_flight_fetch() {
        let fetcher = ScriptedFetcher::with(
            "ORD-SLOW",
            vec![Step::Slow(Duration::from_secs(20), PaymentStatus::Paid)],
        );
        let mut poller = poller(&fetcher);
        let mut rx = poller.subscribe();

        poller.start(Some("ORD-SLOW"));
        let state = settled(&mut rx).await;

        assert!(state.timed_out);
        assert!(state.order_status.is_none());

        sleep(Duration::from_secs(10)).await;
        assert_eq!(poller.state(), state, "late response must not land");
        assert_eq!(poller.terminal_reason(), Some(TerminalReason::TimedOut));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_reference_reports_error_without_fetching() {
        for reference in [None, Some(""), Some("   ")] {
            let fetcher = Arc::new(ScriptedFetcher::default());
            let mut poller = poller(&fetcher);

            poller.start(reference);
            let state = poller.state();
            assert_eq!(state.error.as_deref(), Some(MISSING_REFERENCE));
            assert!(!state.loading);

            sleep(Duration::from_secs(20)).await;
            assert_eq!(fetcher.calls(), 0);
            assert!(!poller.state().timed_out);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn server_error_on_first_attempt_is_fatal() {
        let fetcher = ScriptedFetcher::with("ORD-1003", vec![Step::Http(500)]);
        let mut poller = poller(&fetcher);
        let mut rx = poller.subscribe();

        poller.start(Some("ORD-1003"));
        let state = settled(&mut rx).await;

        assert!(state.error.as_deref().unwrap().contains("500"));
        assert!(state.order_status.is_none());
        assert_eq!(poller.terminal_reason(), Some(TerminalReason::FetchError));

        sleep(Duration::from_secs(20)).await;
        assert_eq!(fetcher.calls(), 1, "no second attempt after a fetch error");
        assert!(!poller.state().timed_out);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_resolves_after_one_fetch() {
        let fetcher =
            ScriptedFetcher::with("ORD-1004", vec![Step::Status(PaymentStatus::Cancelled)]);
        let mut poller = poller(&fetcher);
        let mut rx = poller.subscribe();

        poller.start(Some("ORD-1004"));
        let state = settled(&mut rx).await;

        assert_eq!(
            state.order_status.map(|s| s.payment_status),
            Some(PaymentStatus::Cancelled)
        );
        assert_eq!(fetcher.calls(), 1);
    }

    // --- disposal -----------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn dispose_discards_in_flight_result() {
        let fetcher = ScriptedFetcher::with(
            "ORD-3000",
            vec![Step::Slow(Duration::from_secs(1), PaymentStatus::Paid)],
        );
        let mut poller = poller(&fetcher);

        poller.start(Some("ORD-3000"));
        sleep(Duration::from_millis(100)).await;
        assert_eq!(fetcher.calls(), 1);

        let before = poller.state();
        poller.dispose();
        poller.dispose();

        sleep(Duration::from_secs(30)).await;
        assert_eq!(poller.state(), before);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn new_reference_retires_previous_session() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        fetcher.script(
            "ORD-OLD",
            vec![Step::Slow(Duration::from_secs(1), PaymentStatus::Paid)],
        );
        fetcher.script(
            "ORD-NEW",
            vec![
                Step::Status(PaymentStatus::Pending),
                Step::Status(PaymentStatus::Cancelled),
            ],
        );
        let mut poller = poller(&fetcher);
        let mut rx = poller.subscribe();

        poller.start(Some("ORD-OLD"));
        sleep(Duration::from_millis(100)).await;
        poller.start(Some("ORD-NEW"));
        assert_eq!(poller.state(), PollerState::default());

        let state = settled(&mut rx).await;
        let snapshot = state.order_status.unwrap();
        assert_eq!(snapshot.order_number, "ORD-NEW");
        assert_eq!(snapshot.payment_status, PaymentStatus::Cancelled);
        assert_eq!(poller.attempts(), 2);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(
            poller.state().order_status.map(|s| s.order_number),
            Some("ORD-NEW".to_string())
        );
        assert!(!poller.state().timed_out);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_poller_stops_fetching() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let rx = {
            let mut poller = poller(&fetcher);
            poller.start(Some("ORD-4000"));
            sleep(Duration::from_millis(10)).await;
            poller.subscribe()
        };
        let calls = fetcher.calls();

        sleep(Duration::from_secs(30)).await;
        assert_eq!(fetcher.calls(), calls);
        assert!(!rx.borrow().timed_out);
    }

    // --- session guards -----------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn elapsed_deadline_short_circuits_before_fetch() {
        let (tx, rx) = watch::channel(PollerState::default());
        let shared = SessionShared::new("ORD-5000".to_string(), Duration::ZERO, Arc::new(tx));

        assert_eq!(shared.begin_attempt(), None);
        assert_eq!(shared.lock().attempt_count, 0);
        assert!(rx.borrow().timed_out);
        assert!(shared.token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_reason_is_set_once() {
        let (tx, rx) = watch::channel(PollerState::default());
        let shared = SessionShared::new(
            "ORD-6000".to_string(),
            Duration::from_secs(15),
            Arc::new(tx),
        );

        assert_eq!(shared.begin_attempt(), Some(1));
        assert_eq!(
            shared.record(Ok(snapshot("ORD-6000", PaymentStatus::Paid))),
            None
        );
        shared.time_out();
        assert_eq!(
            shared.record(Err(PaymentError::Network {
                message: "late".to_string()
            })),
            None
        );

        assert_eq!(shared.lock().terminal_reason, Some(TerminalReason::Paid));
        let state = rx.borrow().clone();
        assert!(!state.timed_out);
        assert!(state.error.is_none());
        assert_eq!(shared.begin_attempt(), None);
    }
}
