//! Pipeline tuning thresholds.
//!
//! Every heuristic constant in the pipeline lives here as a named field
//! instead of a literal at the use site. The defaults were chosen
//! empirically against real hunting sessions; do not change them without
//! evidence from logged sessions.

use serde::{Deserialize, Serialize};

/// Tuning knobs for the log-interpretation and identification pipeline.
///
/// Deserializes from TOML with per-field defaults, so a config file only
/// needs to name the fields it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineTuning {
    /// Maximum gap between consecutive loot lines that still belong to
    /// the same kill's loot batch (milliseconds).
    pub loot_batch_gap_ms: i64,

    /// Synthetic kill events are placed this far before the first loot
    /// line of the batch (milliseconds).
    pub kill_offset_ms: i64,

    /// How far back a GPS ping may retroactively tag a kill's location
    /// (milliseconds).
    pub gps_lookback_ms: i64,

    /// Lower bound of a kill analysis window when no previous kill is
    /// known (milliseconds).
    pub default_kill_window_ms: i64,

    /// The final hit is treated as overkill when it exceeds this multiple
    /// of the mean damage of all prior hits.
    pub overkill_trigger_factor: f64,

    /// Search radius for candidate spawn regions around a kill location
    /// (game-world units).
    pub spawn_search_radius: f64,

    /// Distance considered "right on the spawn" for confidence purposes.
    pub near_spawn_distance: f64,

    /// Distance still considered plausible for medium confidence.
    pub medium_spawn_distance: f64,

    /// A mob whose health exceeds `estimated_health * this` could not
    /// have been killed by the observed damage (hard exclusion).
    pub health_exclusion_factor: f64,

    /// Tolerated excess of dealt damage over base health, as a fraction
    /// of base health (explained by in-game regeneration).
    pub regen_tolerance: f64,

    /// Tolerated shortfall of dealt damage under base health, as a
    /// fraction of base health (penalized more heavily than excess).
    pub undershoot_tolerance: f64,

    /// Health tolerance for the location-blind whole-table fallback
    /// search, as a fraction of mob health.
    pub fallback_health_tolerance: f64,

    /// Health-match tightness (fraction of mob health) below which a
    /// near-spawn match is promoted to high confidence.
    pub tight_health_match: f64,

    /// Combined-confidence floor granted by a high-band spawn match.
    pub high_confidence_floor: f64,

    /// Combined-confidence floor granted by a medium-band spawn match.
    pub medium_confidence_floor: f64,

    /// Combined-confidence floor granted by a low-band spawn match.
    pub low_confidence_floor: f64,

    /// Scorer confidence (top score / 100) at or above which the result
    /// band reads high.
    pub high_confidence_score: f64,

    /// Scorer confidence at or above which the result band reads
    /// medium; below it the band is low.
    pub medium_confidence_score: f64,
}

impl Default for PipelineTuning {
    fn default() -> Self {
        Self {
            loot_batch_gap_ms: 2000,
            kill_offset_ms: 100,
            gps_lookback_ms: 5000,
            default_kill_window_ms: 300_000,
            overkill_trigger_factor: 2.0,
            spawn_search_radius: 5000.0,
            near_spawn_distance: 500.0,
            medium_spawn_distance: 1000.0,
            health_exclusion_factor: 1.5,
            regen_tolerance: 0.5,
            undershoot_tolerance: 0.2,
            fallback_health_tolerance: 0.3,
            tight_health_match: 0.2,
            high_confidence_floor: 0.9,
            medium_confidence_floor: 0.6,
            low_confidence_floor: 0.3,
            high_confidence_score: 0.7,
            medium_confidence_score: 0.4,
        }
    }
}
