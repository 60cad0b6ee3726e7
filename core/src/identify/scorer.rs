//! Evidence-weighted identification.
//!
//! Grades every known mob profile against three independent signals and
//! keeps the highest scorers. Weights: health 40, location 30, loot 30,
//! so a perfect match across all three scores 100 and maps to full
//! confidence.

use artemis_types::PipelineTuning;

use crate::analysis::KillAnalysis;
use crate::error::ReferenceError;
use crate::events::model::{Location, LootItem};
use crate::reference::{MobProfile, ReferenceStore};

use super::geometry::distance;
use super::{AlternativeGuess, Confidence, IdentificationResult};

const HEALTH_WEIGHT: f64 = 40.0;
const LOCATION_NEAR_WEIGHT: f64 = 30.0;
const LOCATION_OUTER_WEIGHT: f64 = 15.0;
const UNIQUE_LOOT_WEIGHT: f64 = 30.0;
const COMMON_LOOT_WEIGHT: f64 = 15.0;

pub struct IdentificationScorer<'a, R: ReferenceStore> {
    store: &'a R,
    tuning: &'a PipelineTuning,
}

struct ScoredMob {
    profile: MobProfile,
    score: f64,
    /// Distance to the nearest qualifying spawn zone, when location
    /// evidence contributed.
    zone_distance: Option<f64>,
    reasoning: Vec<String>,
}

impl<'a, R: ReferenceStore> IdentificationScorer<'a, R> {
    pub fn new(store: &'a R, tuning: &'a PipelineTuning) -> Self {
        Self { store, tuning }
    }

    /// Score every profile against the kill evidence and report the
    /// winner. A zero top score yields the unknown verdict.
    pub fn identify_mob(
        &self,
        analysis: &KillAnalysis,
        loot: &[LootItem],
    ) -> Result<IdentificationResult, ReferenceError> {
        let mut scored: Vec<ScoredMob> = self
            .store
            .all_mobs()?
            .into_iter()
            .map(|profile| score_profile(profile, analysis, loot))
            .filter(|s| s.score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        let Some(best) = scored.first() else {
            return Ok(IdentificationResult::unknown());
        };

        let confidence = best.score / 100.0;
        let band = if confidence >= self.tuning.high_confidence_score {
            Confidence::High
        } else if confidence >= self.tuning.medium_confidence_score {
            Confidence::Medium
        } else {
            Confidence::Low
        };

        let alternatives = scored
            .iter()
            .skip(1)
            .take(3)
            .map(|s| AlternativeGuess {
                name: s.profile.display_name(),
                confidence: s.score / 100.0,
            })
            .collect();

        Ok(IdentificationResult {
            confidence,
            band,
            mob_name: best.profile.display_name(),
            species: Some(best.profile.name.clone()),
            maturity: best.profile.maturity.clone(),
            distance: best.zone_distance,
            alternatives,
            reasoning: best.reasoning.clone(),
        })
    }
}

fn score_profile(profile: MobProfile, analysis: &KillAnalysis, loot: &[LootItem]) -> ScoredMob {
    let mut score = 0.0;
    let mut reasoning = Vec::new();

    if let Some(pts) = health_score(&profile, analysis.estimated_health) {
        reasoning.push(format!(
            "Health: estimated {:.0} vs {} range {:.0}-{:.0} (+{:.0})",
            analysis.estimated_health, profile.name, profile.min_health, profile.max_health, pts
        ));
        score += pts;
    }

    let mut zone_distance = None;
    if let Some(location) = analysis.location {
        if let Some((pts, dist)) = location_score(&profile, location) {
            reasoning.push(format!(
                "Location: {:.0}m from a known {} spawn (+{:.0})",
                dist, profile.name, pts
            ));
            score += pts;
            zone_distance = Some(dist);
        }
    }

    if let Some((pts, item)) = loot_score(&profile, loot) {
        reasoning.push(format!("Loot: {item} points to {} (+{pts:.0})", profile.name));
        score += pts;
    }

    ScoredMob {
        profile,
        score,
        zone_distance,
        reasoning,
    }
}

/// Full credit inside the recorded health range; partial credit decays
/// linearly with distance from the average, out to 1.5x the range width.
fn health_score(profile: &MobProfile, estimated: f64) -> Option<f64> {
    if estimated <= 0.0 {
        return None;
    }
    if estimated >= profile.min_health && estimated <= profile.max_health {
        return Some(HEALTH_WEIGHT);
    }
    let range = profile.max_health - profile.min_health;
    if range <= 0.0 {
        return None;
    }
    let diff = (estimated - profile.avg_health).abs();
    if diff <= range * 1.5 {
        Some(HEALTH_WEIGHT * (1.0 - diff / (range * 2.0)))
    } else {
        None
    }
}

/// First spawn zone the kill falls in (or near) wins; inside the zone
/// radius scores full, inside twice the radius scores half.
fn location_score(profile: &MobProfile, location: Location) -> Option<(f64, f64)> {
    for zone in &profile.spawn_zones {
        let dist = distance(location, zone.center);
        if dist <= zone.radius {
            return Some((LOCATION_NEAR_WEIGHT, dist));
        }
        if dist <= zone.radius * 2.0 {
            return Some((LOCATION_OUTER_WEIGHT, dist));
        }
    }
    None
}

/// Unique loot markers are definitive; common loot scores by the
/// fraction of the profile's common table seen in the drop.
fn loot_score(profile: &MobProfile, loot: &[LootItem]) -> Option<(f64, String)> {
    if loot.is_empty() {
        return None;
    }
    for marker in &profile.unique_loot {
        if loot.iter().any(|item| item.name.contains(marker.as_str())) {
            return Some((UNIQUE_LOOT_WEIGHT, marker.clone()));
        }
    }
    if profile.common_loot.is_empty() {
        return None;
    }
    let matched = profile
        .common_loot
        .iter()
        .filter(|c| loot.iter().any(|item| item.name == **c))
        .count();
    if matched == 0 {
        return None;
    }
    let pts = COMMON_LOOT_WEIGHT * matched as f64 / profile.common_loot.len() as f64;
    Some((pts, format!("{matched} common drops")))
}
