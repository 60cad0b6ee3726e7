//! Event aggregation: raw classified events -> finalized event stream.
//!
//! The log never states "you killed mob X at location Y" in one line; it
//! states damage, then loot, then (only on user action) a GPS waypoint.
//! This reducer reconstructs kills from those separate signals:
//!
//! 1. Consecutive loot events are held in an open batch. The batch
//!    flushes when a non-loot event arrives or the gap to the previous
//!    loot exceeds `loot_batch_gap_ms`. Flushing synthesizes one
//!    `MobKilled` event just before the first loot, followed by the
//!    batched loot in original order.
//! 2. A GPS update with a real coordinate retroactively tags the most
//!    recent kill within `gps_lookback_ms`, overwriting its location in
//!    place at most once.
//! 3. Everything else passes through unchanged, after flushing any open
//!    batch.

use chrono::Duration;

use artemis_types::PipelineTuning;

use super::model::{EventKind, Location, ParsedEvent, UNKNOWN_CREATURE};

/// Streaming reducer over one log-tail session's classified events.
///
/// Carried state (`loot_batch`, `last_loot_timestamp`, the finalized
/// list) belongs to a single session and must not be reused across
/// unrelated sessions.
#[derive(Debug)]
pub struct EventAggregator {
    tuning: PipelineTuning,
    finalized: Vec<ParsedEvent>,
    loot_batch: Vec<ParsedEvent>,
    sealed: usize,
}

impl EventAggregator {
    pub fn new(tuning: PipelineTuning) -> Self {
        Self {
            tuning,
            finalized: Vec::new(),
            loot_batch: Vec::new(),
            sealed: 0,
        }
    }

    /// One-shot aggregation of an already-materialized event sequence.
    pub fn extract_events(
        results: impl IntoIterator<Item = ParsedEvent>,
        tuning: &PipelineTuning,
    ) -> Vec<ParsedEvent> {
        let mut agg = Self::new(tuning.clone());
        for event in results {
            agg.push(event);
        }
        agg.finish();
        agg.into_events()
    }

    /// Feed the next classified event, in timestamp order.
    pub fn push(&mut self, event: ParsedEvent) {
        match &event.kind {
            EventKind::LootReceived { .. } => {
                if let Some(last) = self.loot_batch.last()
                    && gap_ms(last.timestamp, event.timestamp) > self.tuning.loot_batch_gap_ms
                {
                    self.flush_loot_batch();
                }
                self.loot_batch.push(event);
            }
            EventKind::GpsUpdate { location } => {
                let location = *location;
                self.flush_loot_batch();
                if !location.is_unset() {
                    self.retro_tag_kill(event.timestamp, location);
                }
                self.finalized.push(event);
            }
            _ => {
                self.flush_loot_batch();
                self.finalized.push(event);
            }
        }
    }

    /// Flush any pending loot batch. Must be called exactly once when the
    /// session's line stream ends; safe to call again (no-op when empty).
    pub fn finish(&mut self) {
        self.flush_loot_batch();
    }

    /// The finalized sequence so far (non-decreasing timestamps).
    pub fn events(&self) -> &[ParsedEvent] {
        &self.finalized
    }

    pub fn into_events(self) -> Vec<ParsedEvent> {
        self.finalized
    }

    /// Mark everything finalized so far as delivered downstream and
    /// return the watermark. A later synthetic kill whose sorted spot
    /// falls inside the delivered prefix is placed at the watermark
    /// instead, so incremental consumers never have history rewritten
    /// under them. Retro-tagged locations still update in place; the
    /// `events()` slice stays the canonical stream.
    pub fn seal(&mut self) -> usize {
        self.sealed = self.finalized.len();
        self.sealed
    }

    fn flush_loot_batch(&mut self) {
        if self.loot_batch.is_empty() {
            return;
        }

        let first = &self.loot_batch[0];
        let kill_ts = first.timestamp - Duration::milliseconds(self.tuning.kill_offset_ms);
        let kill = ParsedEvent::new(
            kill_ts,
            first.session_id.clone(),
            first.user_id.clone(),
            EventKind::MobKilled {
                mob_name: UNKNOWN_CREATURE.to_string(),
                mob_id: None,
                location: Location::default(),
            },
        );

        tracing::debug!(
            loot_lines = self.loot_batch.len(),
            %kill_ts,
            "flushing loot batch as synthesized kill"
        );

        // The synthetic kill sits slightly before the first loot line, so
        // an event that arrived inside that offset must stay ahead of it.
        // Insert at the sorted position to keep timestamps non-decreasing.
        let at = self
            .finalized
            .iter()
            .rposition(|e| e.timestamp <= kill_ts)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.finalized.insert(at.max(self.sealed), kill);
        self.finalized.append(&mut self.loot_batch);
    }

    /// Overwrite the location of the most recent untagged kill within the
    /// look-back window. At most one kill is updated per GPS event; a
    /// ping with no qualifying kill is a no-op.
    fn retro_tag_kill(&mut self, gps_ts: chrono::NaiveDateTime, location: Location) {
        let lookback = self.tuning.gps_lookback_ms;
        for event in self.finalized.iter_mut().rev() {
            let age = gap_ms(event.timestamp, gps_ts);
            if age > lookback {
                break; // ordered stream: everything earlier is older still
            }
            if let EventKind::MobKilled {
                location: kill_loc, ..
            } = &mut event.kind
                && kill_loc.is_unset()
                && age >= 0
            {
                tracing::debug!(%gps_ts, lon = location.lon, lat = location.lat, "retro-tagging kill location");
                *kill_loc = location;
                return;
            }
        }
    }
}

fn gap_ms(earlier: chrono::NaiveDateTime, later: chrono::NaiveDateTime) -> i64 {
    later.signed_duration_since(earlier).num_milliseconds()
}
