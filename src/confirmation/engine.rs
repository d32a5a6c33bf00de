use std::future::Future;
use std::time::Duration;

use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use super::clock::{Clock, TokioClock};
use super::result::ConfirmationResult;
use crate::relay::{BundleStatus, InflightBundleStatus, InflightStatus, RelayError};

/// Fixed wait between inflight status queries.
pub const POLL_INTERVAL: Duration = Duration::from_millis(2000);

pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Where the confirmation loop reads bundle state from.
///
/// `Ok(None)` means the relay has no entry for the id (yet).
pub trait BundleStatusSource: Send + Sync {
    fn inflight_status(
        &self,
        bundle_id: &str,
    ) -> impl Future<Output = Result<Option<InflightBundleStatus>, RelayError>> + Send;

    fn bundle_status(&self, bundle_id: &str) -> impl Future<Output = Result<Option<BundleStatus>, RelayError>> + Send;
}

enum PollStep {
    Done(ConfirmationResult),
    /// Landed, but the detailed query failed; keep polling.
    LandedWithoutDetail(InflightBundleStatus),
    Continue,
}

/// Polls one bundle to a terminal outcome.
///
/// Each call to [`confirm`](Self::confirm) is self-contained: no state is kept
/// between calls, so one confirmer (or many clones of the same source) can serve
/// concurrent confirmations.
pub struct BundleConfirmer<S, C = TokioClock> {
    source: S,
    clock: C,
}

impl<S: BundleStatusSource> BundleConfirmer<S> {
    pub fn new(source: S) -> Self {
        Self::with_clock(source, TokioClock)
    }
}

impl<S: BundleStatusSource, C: Clock> BundleConfirmer<S, C> {
    pub fn with_clock(source: S, clock: C) -> Self {
        Self { source, clock }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn confirm(&self, bundle_id: &str, timeout: Duration) -> ConfirmationResult {
        self.confirm_with_cancel(bundle_id, timeout, None).await
    }

    /// Runs the polling loop.
    ///
    /// Query errors are logged and treated as "nothing new this cycle". The
    /// loop ends on `Failed`, on `Landed`, when `timeout` has elapsed, or when
    /// `cancel` fires. If a landing was seen but its detail never arrived
    /// before the deadline, the inflight `Landed` record is returned instead of
    /// `Timeout`.
    pub async fn confirm_with_cancel(
        &self,
        bundle_id: &str,
        timeout: Duration,
        cancel: Option<&CancellationToken>,
    ) -> ConfirmationResult {
        let start = self.clock.now();
        let mut attempt: u32 = 0;
        let mut last_landed = None;

        info!(
            bundle_id = bundle_id,
            timeout_ms = timeout.as_millis() as u64;
            "Confirming bundle"
        );

        while self.clock.now().saturating_duration_since(start) < timeout {
            attempt += 1;

            let step = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => return Self::cancelled(bundle_id, attempt),
                    step = self.poll_once(bundle_id, attempt) => step,
                },
                None => self.poll_once(bundle_id, attempt).await,
            };

            match step {
                PollStep::Done(result) => {
                    info!(
                        bundle_id = bundle_id,
                        status = result.status(),
                        attempts = attempt,
                        elapsed_ms = self.clock.now().saturating_duration_since(start).as_millis() as u64;
                        "Bundle confirmation finished"
                    );
                    return result;
                },
                PollStep::LandedWithoutDetail(inflight) => last_landed = Some(inflight),
                PollStep::Continue => {},
            }

            let remaining = timeout.saturating_sub(self.clock.now().saturating_duration_since(start));
            if remaining.is_zero() {
                break;
            }
            let wait = POLL_INTERVAL.min(remaining);

            match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => return Self::cancelled(bundle_id, attempt),
                    _ = self.clock.sleep(wait) => {},
                },
                None => self.clock.sleep(wait).await,
            }
        }

        if let Some(inflight) = last_landed {
            warn!(
                bundle_id = bundle_id,
                attempts = attempt;
                "Deadline reached without bundle detail, returning inflight record"
            );
            return ConfirmationResult::LandedInflight(inflight);
        }

        warn!(
            bundle_id = bundle_id,
            attempts = attempt,
            timeout_ms = timeout.as_millis() as u64;
            "Bundle confirmation timed out"
        );
        ConfirmationResult::Timeout
    }

    async fn poll_once(&self, bundle_id: &str, attempt: u32) -> PollStep {
        let inflight = match self.source.inflight_status(bundle_id).await {
            Ok(Some(inflight)) => inflight,
            Ok(None) => {
                debug!(bundle_id = bundle_id, attempt = attempt; "No inflight status entry yet");
                return PollStep::Continue;
            },
            Err(e) => {
                warn!(
                    bundle_id = bundle_id,
                    attempt = attempt,
                    error:% = e;
                    "Inflight status query failed, will retry"
                );
                return PollStep::Continue;
            },
        };

        match inflight.status {
            InflightStatus::Failed => PollStep::Done(ConfirmationResult::Failed(inflight)),
            InflightStatus::Landed => self.resolve_landed(bundle_id, inflight).await,
            status => {
                debug!(bundle_id = bundle_id, attempt = attempt, status:% = status; "Bundle not terminal yet");
                PollStep::Continue
            },
        }
    }

    async fn resolve_landed(&self, bundle_id: &str, inflight: InflightBundleStatus) -> PollStep {
        match self.source.bundle_status(bundle_id).await {
            Ok(Some(detail)) => PollStep::Done(ConfirmationResult::Landed(detail)),
            Ok(None) => {
                debug!(bundle_id = bundle_id; "Bundle landed but has no detailed status, using inflight record");
                PollStep::Done(ConfirmationResult::LandedInflight(inflight))
            },
            Err(e) => {
                warn!(
                    bundle_id = bundle_id,
                    error:% = e;
                    "Detailed status query failed after landing, will retry"
                );
                PollStep::LandedWithoutDetail(inflight)
            },
        }
    }

    fn cancelled(bundle_id: &str, attempt: u32) -> ConfirmationResult {
        info!(bundle_id = bundle_id, attempts = attempt; "Bundle confirmation cancelled");
        ConfirmationResult::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirmation::clock::ManualClock;
    use crate::http::{HttpError, RpcError, RpcErrorObject};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Copy)]
    enum Inflight {
        Status(InflightStatus),
        Missing,
        TransportError,
        ProtocolError,
    }

    #[derive(Debug, Clone, Copy)]
    enum Detail {
        Slot(u64),
        Empty,
        Error,
    }

    /// Replays scripted answers. Once a script runs out, inflight answers
    /// `Pending` and detail answers empty.
    struct ScriptedSource {
        inflight: Mutex<VecDeque<Inflight>>,
        detail: Mutex<VecDeque<Detail>>,
        inflight_calls: AtomicUsize,
        detail_calls: AtomicUsize,
        clock: Option<(Arc<ManualClock>, Duration)>,
    }

    impl ScriptedSource {
        fn new(inflight: &[Inflight], detail: &[Detail]) -> Self {
            Self {
                inflight: Mutex::new(inflight.iter().copied().collect()),
                detail: Mutex::new(detail.iter().copied().collect()),
                inflight_calls: AtomicUsize::new(0),
                detail_calls: AtomicUsize::new(0),
                clock: None,
            }
        }

        /// Every query advances `clock` by `latency`.
        fn with_latency(mut self, clock: Arc<ManualClock>, latency: Duration) -> Self {
            self.clock = Some((clock, latency));
            self
        }

        fn spend_latency(&self) {
            if let Some((clock, latency)) = &self.clock {
                clock.advance(*latency);
            }
        }

        fn inflight_calls(&self) -> usize {
            self.inflight_calls.load(Ordering::SeqCst)
        }

        fn detail_calls(&self) -> usize {
            self.detail_calls.load(Ordering::SeqCst)
        }
    }

    fn inflight_record(bundle_id: &str, status: InflightStatus) -> InflightBundleStatus {
        InflightBundleStatus {
            bundle_id: bundle_id.to_string(),
            status,
            landed_slot: (status == InflightStatus::Landed).then_some(499),
        }
    }

    fn detail_record(bundle_id: &str, slot: u64) -> BundleStatus {
        BundleStatus {
            bundle_id: bundle_id.to_string(),
            transactions: vec!["5mMoe6Zj4pTBu5RpS3yDSWexVqo3tcDtR9ir4fhwQtXj".to_string()],
            slot,
            confirmation_status: None,
            err: None,
        }
    }

    impl BundleStatusSource for ScriptedSource {
        async fn inflight_status(&self, bundle_id: &str) -> Result<Option<InflightBundleStatus>, RelayError> {
            self.inflight_calls.fetch_add(1, Ordering::SeqCst);
            self.spend_latency();
            let next = self
                .inflight
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Inflight::Status(InflightStatus::Pending));
            match next {
                Inflight::Status(status) => Ok(Some(inflight_record(bundle_id, status))),
                Inflight::Missing => Ok(None),
                Inflight::TransportError => Err(RelayError::Rpc(RpcError::Transport(HttpError::ServerError {
                    status: reqwest::StatusCode::BAD_GATEWAY,
                    body: "connection reset by peer".to_string(),
                }))),
                Inflight::ProtocolError => Err(RelayError::Rpc(RpcError::Protocol(RpcErrorObject {
                    code: -32097,
                    message: "Rate limit exceeded".to_string(),
                    data: None,
                }))),
            }
        }

        async fn bundle_status(&self, bundle_id: &str) -> Result<Option<BundleStatus>, RelayError> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            self.spend_latency();
            let next = self.detail.lock().unwrap().pop_front().unwrap_or(Detail::Empty);
            match next {
                Detail::Slot(slot) => Ok(Some(detail_record(bundle_id, slot))),
                Detail::Empty => Ok(None),
                Detail::Error => Err(RelayError::Rpc(RpcError::MissingResult {
                    method: "getBundleStatuses".to_string(),
                })),
            }
        }
    }

    fn confirmer(source: ScriptedSource) -> (BundleConfirmer<ScriptedSource, Arc<ManualClock>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (BundleConfirmer::with_clock(source, clock.clone()), clock)
    }

    #[tokio::test]
    async fn failed_returns_inflight_record_without_detail_query() {
        let source = ScriptedSource::new(
            &[
                Inflight::Status(InflightStatus::Pending),
                Inflight::Status(InflightStatus::Failed),
            ],
            &[Detail::Slot(1)],
        );
        let (confirmer, _clock) = confirmer(source);

        let result = confirmer.confirm("abc123", DEFAULT_CONFIRMATION_TIMEOUT).await;

        assert_eq!(
            result,
            ConfirmationResult::Failed(inflight_record("abc123", InflightStatus::Failed))
        );
        assert_eq!(confirmer.source().inflight_calls(), 2);
        assert_eq!(confirmer.source().detail_calls(), 0);
    }

    #[tokio::test]
    async fn landed_prefers_detailed_record() {
        let source = ScriptedSource::new(&[Inflight::Status(InflightStatus::Landed)], &[Detail::Slot(500)]);
        let (confirmer, _clock) = confirmer(source);

        let result = confirmer.confirm("abc123", DEFAULT_CONFIRMATION_TIMEOUT).await;

        assert_eq!(result, ConfirmationResult::Landed(detail_record("abc123", 500)));
        assert_eq!(confirmer.source().detail_calls(), 1);
    }

    #[tokio::test]
    async fn landed_without_detail_falls_back_to_inflight() {
        let source = ScriptedSource::new(&[Inflight::Status(InflightStatus::Landed)], &[Detail::Empty]);
        let (confirmer, _clock) = confirmer(source);

        let result = confirmer.confirm("abc123", DEFAULT_CONFIRMATION_TIMEOUT).await;

        assert_eq!(
            result,
            ConfirmationResult::LandedInflight(inflight_record("abc123", InflightStatus::Landed))
        );
        assert_eq!(result.landed_slot(), Some(499));
    }

    #[tokio::test]
    async fn times_out_within_one_interval_of_deadline() {
        for timeout_ms in [1, 2000, 5000, 7999, 60_000] {
            let timeout = Duration::from_millis(timeout_ms);
            let clock = Arc::new(ManualClock::new());
            let source = ScriptedSource::new(&[], &[]).with_latency(clock.clone(), Duration::from_millis(35));
            let confirmer = BundleConfirmer::with_clock(source, clock.clone());

            let result = confirmer.confirm("abc123", timeout).await;

            assert_eq!(result, ConfirmationResult::Timeout);
            assert_eq!(
                serde_json::to_value(&result).unwrap(),
                serde_json::json!({"status": "Timeout"})
            );
            let elapsed = clock.elapsed();
            assert!(elapsed >= timeout, "elapsed {:?} < timeout {:?}", elapsed, timeout);
            assert!(elapsed < timeout + POLL_INTERVAL, "elapsed {:?} overshot {:?}", elapsed, timeout);
            assert_eq!(confirmer.source().detail_calls(), 0);
        }
    }

    #[tokio::test]
    async fn transient_errors_do_not_stop_the_loop() {
        let source = ScriptedSource::new(
            &[
                Inflight::Status(InflightStatus::Pending),
                Inflight::TransportError,
                Inflight::Status(InflightStatus::Pending),
                Inflight::ProtocolError,
                Inflight::Status(InflightStatus::Landed),
            ],
            &[Detail::Slot(500)],
        );
        let (confirmer, clock) = confirmer(source);

        let result = confirmer.confirm("abc123", DEFAULT_CONFIRMATION_TIMEOUT).await;

        assert_eq!(result, ConfirmationResult::Landed(detail_record("abc123", 500)));
        assert_eq!(confirmer.source().inflight_calls(), 5);
        assert_eq!(clock.elapsed(), POLL_INTERVAL * 4);
    }

    #[tokio::test]
    async fn missing_and_invalid_entries_keep_polling() {
        let source = ScriptedSource::new(
            &[
                Inflight::Missing,
                Inflight::Status(InflightStatus::Invalid),
                Inflight::Missing,
                Inflight::Status(InflightStatus::Unknown),
                Inflight::Status(InflightStatus::Failed),
            ],
            &[],
        );
        let (confirmer, _clock) = confirmer(source);

        let result = confirmer.confirm("abc123", DEFAULT_CONFIRMATION_TIMEOUT).await;

        assert_eq!(result.status(), "Failed");
        assert_eq!(confirmer.source().inflight_calls(), 5);
    }

    #[tokio::test]
    async fn detail_error_after_landing_retries_next_cycle() {
        let source = ScriptedSource::new(
            &[
                Inflight::Status(InflightStatus::Landed),
                Inflight::Status(InflightStatus::Landed),
            ],
            &[Detail::Error, Detail::Slot(500)],
        );
        let (confirmer, _clock) = confirmer(source);

        let result = confirmer.confirm("abc123", DEFAULT_CONFIRMATION_TIMEOUT).await;

        assert_eq!(result, ConfirmationResult::Landed(detail_record("abc123", 500)));
        assert_eq!(confirmer.source().inflight_calls(), 2);
        assert_eq!(confirmer.source().detail_calls(), 2);
    }

    #[tokio::test]
    async fn landing_seen_before_deadline_is_not_reported_as_timeout() {
        let source = ScriptedSource::new(
            &[Inflight::Status(InflightStatus::Landed), Inflight::TransportError],
            &[Detail::Error],
        );
        let (confirmer, _clock) = confirmer(source);

        let result = confirmer.confirm("abc123", Duration::from_millis(5000)).await;

        assert_eq!(
            result,
            ConfirmationResult::LandedInflight(inflight_record("abc123", InflightStatus::Landed))
        );
    }

    #[tokio::test]
    async fn pending_three_cycles_then_landed_with_slot_500() {
        let clock = Arc::new(ManualClock::new());
        let source = ScriptedSource::new(
            &[
                Inflight::Status(InflightStatus::Pending),
                Inflight::Status(InflightStatus::Pending),
                Inflight::Status(InflightStatus::Pending),
                Inflight::Status(InflightStatus::Landed),
            ],
            &[Detail::Slot(500)],
        )
        .with_latency(clock.clone(), Duration::from_millis(20));
        let confirmer = BundleConfirmer::with_clock(source, clock.clone());

        let result = confirmer.confirm("abc123", DEFAULT_CONFIRMATION_TIMEOUT).await;

        assert_eq!(result.landed_slot(), Some(500));
        assert_eq!(result, ConfirmationResult::Landed(detail_record("abc123", 500)));
        // Three waits plus five queries at 20ms each.
        assert_eq!(clock.elapsed(), POLL_INTERVAL * 3 + Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn already_cancelled_token_stops_before_querying() {
        let confirmer = BundleConfirmer::new(ScriptedSource::new(&[Inflight::Status(InflightStatus::Failed)], &[]));
        let token = CancellationToken::new();
        token.cancel();

        let result = confirmer
            .confirm_with_cancel("abc123", DEFAULT_CONFIRMATION_TIMEOUT, Some(&token))
            .await;

        assert_eq!(result, ConfirmationResult::Cancelled);
        assert_eq!(confirmer.source().inflight_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_the_wait() {
        let confirmer = BundleConfirmer::new(ScriptedSource::new(&[], &[]));
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(3000)).await;
            canceller.cancel();
        });

        let start = tokio::time::Instant::now();
        let result = confirmer
            .confirm_with_cancel("abc123", DEFAULT_CONFIRMATION_TIMEOUT, Some(&token))
            .await;

        assert_eq!(result, ConfirmationResult::Cancelled);
        assert_eq!(confirmer.source().inflight_calls(), 2);
        assert!(start.elapsed() < Duration::from_millis(4000));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_confirmations_are_independent() {
        let quick = BundleConfirmer::new(ScriptedSource::new(
            &[
                Inflight::Status(InflightStatus::Pending),
                Inflight::Status(InflightStatus::Landed),
            ],
            &[Detail::Slot(500)],
        ));
        let stuck = BundleConfirmer::new(ScriptedSource::new(&[], &[]));

        let (landed, timed_out) = tokio::join!(
            quick.confirm("bundle-a", Duration::from_millis(10_000)),
            stuck.confirm("bundle-b", Duration::from_millis(10_000)),
        );

        assert_eq!(landed, ConfirmationResult::Landed(detail_record("bundle-a", 500)));
        assert_eq!(timed_out, ConfirmationResult::Timeout);
        assert_eq!(quick.source().inflight_calls(), 2);
        assert_eq!(stuck.source().inflight_calls(), 5);
    }
}
