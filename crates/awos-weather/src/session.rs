//! The weather session controller.
//!
//! Owns the state for one tracked airport at a time: the raw and decoded
//! METAR, the airport record, and the single refresh timer. All mutation
//! goes through the controller; consumers read snapshots or subscribe to
//! the watch channel for change notification.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::airport::AirportClient;
use crate::decode::{decode_report, DecodedReport};
use crate::error::FetchError;
use crate::metar::MetarClient;
use crate::poll::{self, PollHandle};
use crate::types::AirportRecord;

/// Observable state of one weather session.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    /// Airport identifier currently being monitored; empty when idle
    pub tracked_icao: String,
    /// Last successfully fetched airport metadata
    pub airport: Option<AirportRecord>,
    /// Last successfully fetched raw METAR text; empty when none
    pub raw_report: String,
    /// Decoded form of `raw_report`, present only when decoding succeeded
    /// in the same fetch
    pub decoded_report: Option<DecodedReport>,
    /// UI-level runway preference, independent of fetch results
    pub selected_runway: String,
    /// Instant of the last successful report fetch
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct SessionState {
    snapshot: SessionSnapshot,
    /// Sequence number of the newest issued report request. A completion
    /// holding an older number is discarded.
    report_seq: u64,
    airport_seq: u64,
    poll: Option<PollHandle>,
}

struct Inner {
    metar: MetarClient,
    airports: AirportClient,
    state: Mutex<SessionState>,
    tx: watch::Sender<SessionSnapshot>,
}

/// Controller for one weather session.
///
/// Cheap to clone; clones share the same session. The state lock is never
/// held across an await, so an in-flight request can only be outraced, not
/// interleaved; the per-resource sequence numbers handle the outracing.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    pub fn new(metar: MetarClient, airports: AirportClient) -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                metar,
                airports,
                state: Mutex::new(SessionState::default()),
                tx,
            }),
        }
    }

    /// Current session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.lock().snapshot.clone()
    }

    /// Subscribe to change notifications. The receiver always yields the
    /// latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.tx.subscribe()
    }

    /// Whether a refresh timer is currently active.
    pub fn is_polling(&self) -> bool {
        self.inner.state.lock().poll.is_some()
    }

    /// Fetch the METAR report for `icao` and decode it.
    ///
    /// On success the raw text is stored; the decoded form is stored only
    /// when the external parser accepts it (a decode failure is logged and
    /// clears the decoded field, keeping it paired with the raw text). On
    /// failure the previously stored report is preserved. ICAO syntax is
    /// the caller's responsibility.
    pub async fn fetch_report(&self, icao: &str) -> Result<(), FetchError> {
        let seq = {
            let mut state = self.inner.state.lock();
            state.report_seq += 1;
            state.report_seq
        };

        let raw = match self.inner.metar.fetch_raw(icao).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(icao, error = %e, "METAR fetch failed");
                return Err(e);
            }
        };

        let decoded = match decode_report(&raw) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(icao, error = %e, "storing raw METAR without decode");
                None
            }
        };

        let mut state = self.inner.state.lock();
        if state.report_seq != seq {
            tracing::debug!(icao, seq, newest = state.report_seq, "stale METAR response dropped");
            return Err(FetchError::Superseded);
        }
        state.snapshot.raw_report = raw;
        state.snapshot.decoded_report = decoded;
        state.snapshot.last_updated = Some(Utc::now());
        self.publish(&state.snapshot);
        Ok(())
    }

    /// Fetch the airport record for `icao`.
    ///
    /// On failure the stored record is cleared so stale metadata is not
    /// displayed as current. An empty result set under the array shape is
    /// a success with no record.
    pub async fn fetch_airport(&self, icao: &str) -> Result<(), FetchError> {
        let seq = {
            let mut state = self.inner.state.lock();
            state.airport_seq += 1;
            state.airport_seq
        };

        let result = self.inner.airports.fetch(icao).await;

        let mut state = self.inner.state.lock();
        if state.airport_seq != seq {
            tracing::debug!(icao, seq, newest = state.airport_seq, "stale airport response dropped");
            return Err(FetchError::Superseded);
        }
        match result {
            Ok(record) => {
                state.snapshot.airport = record;
                self.publish(&state.snapshot);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(icao, error = %e, "airport fetch failed");
                state.snapshot.airport = None;
                self.publish(&state.snapshot);
                Err(e)
            }
        }
    }

    /// Start (or retarget) the periodic METAR refresh.
    ///
    /// Any existing timer is cancelled first; there is never more than one.
    /// The first refresh happens one full period after this call; callers
    /// wanting immediate data call `fetch_report` themselves. Tick
    /// failures are logged and never stop the timer.
    pub fn start_polling(&self, icao: &str, period: Duration) {
        if period.is_zero() {
            tracing::warn!(icao, "ignoring zero polling period");
            return;
        }

        let controller = self.clone();
        let tick_icao = icao.to_string();

        let mut state = self.inner.state.lock();
        if let Some(old) = state.poll.take() {
            old.cancel();
        }
        state.snapshot.tracked_icao = icao.to_string();
        state.poll = Some(poll::spawn_repeating(period, move || {
            let controller = controller.clone();
            let icao = tick_icao.clone();
            async move {
                match controller.fetch_report(&icao).await {
                    Ok(()) | Err(FetchError::Superseded) => {}
                    Err(e) => {
                        tracing::warn!(icao, error = %e, "scheduled METAR refresh failed");
                    }
                }
            }
        }));
        self.publish(&state.snapshot);
    }

    /// Record the user's runway selection.
    pub fn set_selected_runway(&self, runway: &str) {
        let mut state = self.inner.state.lock();
        state.snapshot.selected_runway = runway.to_string();
        self.publish(&state.snapshot);
    }

    /// Stop tracking: clear every field to its empty default and cancel
    /// the timer, as one atomic action. Responses still in flight when
    /// this runs are discarded by the sequence guard. Safe to call with no
    /// active timer.
    pub fn reset(&self) {
        let old = {
            let mut state = self.inner.state.lock();
            let old = state.poll.take();
            state.snapshot = SessionSnapshot::default();
            state.report_seq += 1;
            state.airport_seq += 1;
            self.publish(&state.snapshot);
            old
        };
        if let Some(handle) = old {
            handle.cancel();
        }
    }

    fn publish(&self, snapshot: &SessionSnapshot) {
        self.inner.tx.send_replace(snapshot.clone());
    }
}
