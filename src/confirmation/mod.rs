//! Bundle confirmation engine.
//!
//! Given a bundle id, [`BundleConfirmer`] polls the relay's inflight status
//! every [`POLL_INTERVAL`] until the bundle fails, lands, or the deadline
//! passes. A landing signal is escalated to one detailed-status query; the
//! detailed record is returned when available, the inflight one otherwise.
//!
//! ```text
//! Polling ──Failed──────────────────────────▶ Failed(inflight)
//!    │  ╲──Landed──▶ detail? ──some─────────▶ Landed(detail)
//!    │                  ╲──────none─────────▶ LandedInflight(inflight)
//!    └──deadline────────────────────────────▶ Timeout
//! ```
//!
//! Query failures never end a confirmation; they are logged and the loop
//! carries on. The clock and sleeper are injected through [`Clock`] so tests
//! run without waiting in real time, and a [`CancellationToken`] can stop the
//! loop from outside.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

mod clock;
mod engine;
mod result;

pub use clock::{Clock, ManualClock, TokioClock};
pub use engine::{BundleConfirmer, BundleStatusSource, DEFAULT_CONFIRMATION_TIMEOUT, POLL_INTERVAL};
pub use result::ConfirmationResult;
