//! Per-session orchestration of the whole pipeline.
//!
//! One tracker owns one log-tail session: it classifies incoming lines,
//! runs them through the aggregator, and turns each completed kill into
//! a `KillReport` (window analysis plus identification). A kill counts
//! as completed once a later kill appears after it, or when the caller
//! declares the stream over with `finish`.

use chrono::NaiveDateTime;

use artemis_types::PipelineTuning;

use crate::analysis::{KillAnalysis, analyze_kill};
use crate::chat_log::{RawLine, classify};
use crate::error::SessionError;
use crate::events::model::{EventKind, LootItem};
use crate::events::{EventAggregator, ParsedEvent};
use crate::identify::{IdentificationResult, Identifier};
use crate::reference::ReferenceStore;

/// Everything known about one completed kill.
#[derive(Debug, Clone, PartialEq)]
pub struct KillReport {
    pub analysis: KillAnalysis,
    /// Loot events immediately following the kill, in drop order.
    pub loot: Vec<LootItem>,
    pub identification: IdentificationResult,
}

/// Running totals over the session's finalized event stream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionStats {
    pub kills: u32,
    /// Offensive attempts: hits, misses, dodged, evaded and jammed.
    pub shots: u32,
    pub total_damage: f64,
    pub damage_taken: f64,
    pub loot_tt: f64,
    pub skill_gain: f64,
}

/// What one ingestion step produced.
#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    /// Events finalized by this step, in stream order. Locations of
    /// already-delivered kills may still be retro-tagged afterwards;
    /// `SessionTracker::events` is the canonical stream.
    pub events: Vec<ParsedEvent>,
    /// Kills completed by this step, oldest first.
    pub reports: Vec<KillReport>,
}

pub struct SessionTracker<'a, R: ReferenceStore> {
    session_id: String,
    user_id: String,
    tuning: PipelineTuning,
    store: &'a R,
    aggregator: EventAggregator,
    delivered: usize,
    reported_kills: usize,
    finished: bool,
}

impl<'a, R: ReferenceStore> SessionTracker<'a, R> {
    pub fn new(
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        store: &'a R,
        tuning: PipelineTuning,
    ) -> Self {
        let aggregator = EventAggregator::new(tuning.clone());
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            tuning,
            store,
            aggregator,
            delivered: 0,
            reported_kills: 0,
            finished: false,
        }
    }

    /// Classify and aggregate a batch of raw lines.
    ///
    /// `ingested_at` stands in for lines without a timestamp prefix.
    /// Unrecognized lines are silently skipped.
    pub fn ingest_batch<I, S>(
        &mut self,
        lines: I,
        ingested_at: NaiveDateTime,
    ) -> Result<IngestOutcome, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut skipped = 0u32;
        for line in lines {
            let raw = RawLine::new(line.as_ref(), ingested_at);
            match classify(&raw, &self.session_id, &self.user_id) {
                Some(event) => self.aggregator.push(event),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::debug!(session = %self.session_id, skipped, "unrecognized lines dropped");
        }
        self.collect_outcome(false)
    }

    /// Declare the line stream over: flush the aggregator and report
    /// every kill still pending, including the last one.
    pub fn finish(&mut self) -> Result<IngestOutcome, SessionError> {
        self.finished = true;
        self.aggregator.finish();
        self.collect_outcome(true)
    }

    /// The canonical finalized event stream so far.
    pub fn events(&self) -> &[ParsedEvent] {
        self.aggregator.events()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Recompute totals from the finalized stream. Cheap enough for a
    /// per-batch refresh; kept stateless so retro-tagging and sorted
    /// kill inserts can never leave a cached figure stale.
    pub fn stats(&self) -> SessionStats {
        let mut stats = SessionStats::default();
        for event in self.aggregator.events() {
            match &event.kind {
                EventKind::HitRegistered {
                    damage,
                    damage_resisted,
                    ..
                } => {
                    stats.shots += 1;
                    stats.total_damage += damage + damage_resisted.unwrap_or(0.0);
                }
                EventKind::MissRegistered
                | EventKind::TargetDodged
                | EventKind::TargetEvaded
                | EventKind::TargetJammed => stats.shots += 1,
                EventKind::DamageTaken { amount, .. } => stats.damage_taken += amount,
                EventKind::MobKilled { .. } => stats.kills += 1,
                EventKind::LootReceived { total_tt_value, .. } => {
                    stats.loot_tt += total_tt_value;
                }
                EventKind::SkillGain { amount, .. } => stats.skill_gain += amount,
                _ => {}
            }
        }
        stats
    }

    fn collect_outcome(&mut self, include_open_kill: bool) -> Result<IngestOutcome, SessionError> {
        let events = self.aggregator.events()[self.delivered..].to_vec();
        self.delivered = self.aggregator.seal();

        let reports = self.drain_completed_kills(include_open_kill)?;
        if !events.is_empty() || !reports.is_empty() {
            tracing::debug!(
                session = %self.session_id,
                events = events.len(),
                reports = reports.len(),
                "ingestion step finalized"
            );
        }
        Ok(IngestOutcome { events, reports })
    }

    /// Report kills in order. A kill is complete when a later kill
    /// exists after it; the open last kill is only reported when the
    /// stream is declared over, so its loot and GPS tag can still land.
    fn drain_completed_kills(
        &mut self,
        include_open_kill: bool,
    ) -> Result<Vec<KillReport>, SessionError> {
        let stream = self.aggregator.events();
        let kill_indices: Vec<usize> = stream
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_kill())
            .map(|(i, _)| i)
            .collect();

        let completed = if include_open_kill {
            kill_indices.len()
        } else {
            kill_indices.len().saturating_sub(1)
        };

        let mut reports = Vec::new();
        for ordinal in self.reported_kills..completed {
            let idx = kill_indices[ordinal];
            let previous = ordinal
                .checked_sub(1)
                .map(|prev| &stream[kill_indices[prev]]);
            let analysis = analyze_kill(stream, &stream[idx], previous, &self.tuning)?;
            let loot = trailing_loot(&stream[idx + 1..]);
            let identification =
                Identifier::new(self.store, &self.tuning).identify(&analysis, &loot)?;
            reports.push(KillReport {
                analysis,
                loot,
                identification,
            });
        }
        self.reported_kills = completed.max(self.reported_kills);
        Ok(reports)
    }
}

impl<R: ReferenceStore> Drop for SessionTracker<'_, R> {
    fn drop(&mut self) {
        if !self.finished && !self.aggregator.events().is_empty() {
            tracing::warn!(
                session = %self.session_id,
                "session tracker dropped without finish(); trailing kill not reported"
            );
        }
    }
}

/// The loot belonging to a kill: the first run of loot events after it
/// in the stream, stopping at the next kill. The synthetic kill event is
/// back-dated by the kill offset, so a combat event can sit between the
/// kill and its loot batch; such stragglers do not end the search.
fn trailing_loot(after_kill: &[ParsedEvent]) -> Vec<LootItem> {
    let mut loot = Vec::new();
    for event in after_kill {
        match &event.kind {
            EventKind::LootReceived { items, .. } => loot.extend(items.iter().cloned()),
            EventKind::MobKilled { .. } => break,
            _ if loot.is_empty() => continue,
            _ => break,
        }
    }
    loot
}
