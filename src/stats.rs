/// Market stats aggregator
///
/// Polls the program's bull_bets and bear_bets mappings on a fixed cadence,
/// decodes each entry's typed-literal value, and publishes one
/// `MarketStatsSnapshot` per tick over a watch channel. Each snapshot fully
/// replaces the previous one.
///
/// Degradation rules:
/// - absent mapping: zero stats for that side, no warning
/// - hard fetch failure: zero stats for that side, warning recorded, the
///   other side still aggregates
/// - undecodable entry value: counts as a participant, contributes zero
///   volume (inherited behavior, kept deliberately)

use crate::chain_client::{ChainClient, ChainError};
use crate::models::{MappingEntry, MarketSide, MarketStatsSnapshot};
use crate::value_codec;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Mapping holding bull-side bets, keyed by bettor address
pub const BULL_MAPPING: &str = "bull_bets";

/// Mapping holding bear-side bets, keyed by bettor address
pub const BEAR_MAPPING: &str = "bear_bets";

/// Default polling cadence (seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 7;

// ============================================================================
// AGGREGATOR
// ============================================================================

pub struct MarketStatsAggregator {
    program_id: String,
    client: Arc<dyn ChainClient>,
    poll_interval: Duration,
}

impl MarketStatsAggregator {
    pub fn new(
        program_id: impl Into<String>,
        client: Arc<dyn ChainClient>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            program_id: program_id.into(),
            client,
            poll_interval,
        }
    }

    /// One full aggregation cycle: fetch both mappings back to back (the
    /// two fetches run concurrently, the snapshot waits for both) and fold
    /// the results into a single snapshot. Never fails; degraded sides are
    /// zeroed and noted in `warnings`.
    pub async fn poll_once(&self) -> MarketStatsSnapshot {
        let (bull, bear) = tokio::join!(
            self.fetch_side(BULL_MAPPING),
            self.fetch_side(BEAR_MAPPING)
        );

        let mut warnings = Vec::new();
        let (bull_stats, bull_warning) = bull;
        let (bear_stats, bear_warning) = bear;
        warnings.extend(bull_warning);
        warnings.extend(bear_warning);

        MarketStatsSnapshot {
            bull: bull_stats,
            bear: bear_stats,
            as_of: Utc::now(),
            warnings,
        }
    }

    /// Fetch and aggregate one side. A failure here never blocks the other
    /// side's aggregation.
    async fn fetch_side(&self, mapping: &str) -> (MarketSide, Option<String>) {
        match self.client.fetch_mapping_entries(&self.program_id, mapping).await {
            Ok(entries) => (Self::aggregate_entries(&entries), None),
            Err(ChainError::MappingAbsent { .. }) => {
                // Not yet populated; zero stats, not an error
                debug!(mapping = mapping, "mapping absent, treating as empty");
                (MarketSide::default(), None)
            }
            Err(e) => {
                warn!(mapping = mapping, error = %e, "mapping fetch failed, side defaults to zero");
                (MarketSide::default(), Some(format!("{}: {}", mapping, e)))
            }
        }
    }

    /// Participant count is the raw entry count; volume sums only the
    /// values that decode. A bad entry never aborts the aggregation.
    fn aggregate_entries(entries: &[MappingEntry]) -> MarketSide {
        let mut volume: u64 = 0;
        for entry in entries {
            match value_codec::decode_u64(&entry.value) {
                Ok(v) => volume = volume.saturating_add(v),
                Err(e) => {
                    debug!(key = %entry.key, error = %e, "skipping undecodable bet value");
                }
            }
        }

        MarketSide {
            unique_participants: entries.len() as u64,
            volume,
        }
    }

    /// Drive `poll_once` on a fixed timer, publishing each snapshot to
    /// `tx`. Ticks never overlap: the loop awaits the full fetch pair
    /// before asking the timer again, and missed ticks are coalesced.
    ///
    /// Returns when every receiver is gone. Restarting with a fresh channel
    /// is always safe; nothing is cached between runs.
    pub async fn run(&self, tx: watch::Sender<MarketStatsSnapshot>) {
        info!(
            program = %self.program_id,
            interval_secs = self.poll_interval.as_secs(),
            "market stats polling started"
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let snapshot = self.poll_once().await;
            if tx.send(snapshot).is_err() {
                info!("all stats subscribers dropped, polling stopped");
                return;
            }
        }
    }

    /// Spawn `run` as a background task and hand back the receiver.
    pub fn start(self: Arc<Self>) -> (watch::Receiver<MarketStatsSnapshot>, tokio::task::JoinHandle<()>) {
        let (tx, rx) = watch::channel(MarketStatsSnapshot::empty());
        let handle = tokio::spawn(async move { self.run(tx).await });
        (rx, handle)
    }
}

// ============================================================================
// TESTS
// ============================================================================
