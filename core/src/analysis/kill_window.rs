//! Per-kill combat window analysis.
//!
//! Given the finalized event stream and two consecutive kill boundaries,
//! computes combat totals for that window and estimates the creature's
//! true health, correcting for overkill on the final blow. Pure and
//! synchronous over an already-materialized slice.

use chrono::NaiveDateTime;

use artemis_types::PipelineTuning;

use crate::error::AnalysisError;
use crate::events::model::{EventKind, Location, ParsedEvent};

/// Derived combat statistics for one kill window. Ephemeral: recomputed
/// per kill and consumed immediately by identification.
#[derive(Debug, Clone, PartialEq)]
pub struct KillAnalysis {
    pub kill_timestamp: NaiveDateTime,
    pub mob_name: String,
    /// Kill location, `None` while no GPS evidence tagged it.
    pub location: Option<Location>,

    pub shots: u32,
    pub hits: u32,
    pub misses: u32,
    pub target_dodges: u32,
    pub target_evades: u32,
    pub target_jams: u32,
    pub criticals: u32,

    /// hits / (hits + misses + target dodges + target evades). Dodge and
    /// evade count as failed offensive actions even though no miss line
    /// was logged for them.
    pub accuracy: f64,
    pub crit_rate: f64,

    pub total_damage: f64,
    pub damage_taken: f64,

    /// Overkill-corrected damage sum; the best available estimate of the
    /// creature's health pool.
    pub estimated_health: f64,

    pub time_to_kill_ms: i64,
}

/// Analyze the window `(previous_kill, kill]`.
///
/// When no previous kill is known, the window opens
/// `default_kill_window_ms` before the kill.
///
/// Overkill correction: creatures have fixed health pools, so a final
/// blow far above the per-hit trend is evidence of damage dealt to an
/// already-dead target. If the last hit exceeds
/// `overkill_trigger_factor` times the mean of all prior hits, the
/// excess is replaced by that mean. A single-hit window has no trend to
/// compare against and is taken at face value. A burst of overkill in
/// the middle of the sequence is not detected; only the final hit is
/// examined.
pub fn analyze_kill(
    events: &[ParsedEvent],
    kill_event: &ParsedEvent,
    previous_kill: Option<&ParsedEvent>,
    tuning: &PipelineTuning,
) -> Result<KillAnalysis, AnalysisError> {
    let EventKind::MobKilled {
        mob_name, location, ..
    } = &kill_event.kind
    else {
        return Err(AnalysisError::NotAKillEvent(kill_event.kind_name()));
    };

    let upper = kill_event.timestamp;
    let lower = previous_kill.map(|e| e.timestamp).unwrap_or_else(|| {
        upper - chrono::Duration::milliseconds(tuning.default_kill_window_ms)
    });

    let window = events
        .iter()
        .filter(|e| e.timestamp > lower && e.timestamp <= upper);

    let mut hit_damages: Vec<f64> = Vec::new();
    let mut misses = 0u32;
    let mut target_dodges = 0u32;
    let mut target_evades = 0u32;
    let mut target_jams = 0u32;
    let mut criticals = 0u32;
    let mut damage_taken = 0.0f64;
    let mut first_combat_ts: Option<NaiveDateTime> = None;

    for event in window {
        if event.is_combat() && first_combat_ts.is_none() {
            first_combat_ts = Some(event.timestamp);
        }
        match &event.kind {
            EventKind::HitRegistered {
                damage,
                critical,
                damage_resisted,
            } => {
                hit_damages.push(damage + damage_resisted.unwrap_or(0.0));
                if *critical {
                    criticals += 1;
                }
            }
            EventKind::MissRegistered => misses += 1,
            EventKind::TargetDodged => target_dodges += 1,
            EventKind::TargetEvaded => target_evades += 1,
            EventKind::TargetJammed => target_jams += 1,
            EventKind::DamageTaken { amount, .. } => damage_taken += amount,
            _ => {}
        }
    }

    let hits = hit_damages.len() as u32;
    let shots = hits + misses + target_dodges + target_evades + target_jams;

    let attempts = hits + misses + target_dodges + target_evades;
    let accuracy = if attempts > 0 {
        f64::from(hits) / f64::from(attempts)
    } else {
        0.0
    };
    let crit_rate = if hits > 0 {
        f64::from(criticals) / f64::from(hits)
    } else {
        0.0
    };

    let total_damage: f64 = hit_damages.iter().sum();
    let estimated_health = estimate_health(&hit_damages, tuning.overkill_trigger_factor);

    let time_to_kill_ms = first_combat_ts
        .map(|t| upper.signed_duration_since(t).num_milliseconds())
        .unwrap_or(0);

    Ok(KillAnalysis {
        kill_timestamp: upper,
        mob_name: mob_name.clone(),
        location: (!location.is_unset()).then_some(*location),
        shots,
        hits,
        misses,
        target_dodges,
        target_evades,
        target_jams,
        criticals,
        accuracy,
        crit_rate,
        total_damage,
        damage_taken,
        estimated_health,
        time_to_kill_ms,
    })
}

fn estimate_health(hit_damages: &[f64], trigger_factor: f64) -> f64 {
    let cumulative: f64 = hit_damages.iter().sum();
    if hit_damages.len() < 2 {
        return cumulative;
    }

    let last = hit_damages[hit_damages.len() - 1];
    let prior = &hit_damages[..hit_damages.len() - 1];
    let prior_mean: f64 = prior.iter().sum::<f64>() / prior.len() as f64;

    if last > prior_mean * trigger_factor {
        cumulative - last + prior_mean
    } else {
        cumulative
    }
}
