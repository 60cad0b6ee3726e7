//! Location-driven identification.
//!
//! Resolves which named spawn region a kill happened in, then narrows
//! the region's maturity variants by how much damage the kill took.
//! Regions whose polygon contains the kill location always beat
//! regions that merely have a nearby center.

use artemis_types::PipelineTuning;

use crate::error::ReferenceError;
use crate::events::model::Location;
use crate::reference::{ReferenceStore, SpawnRegion, maturity_rank};

use super::Confidence;
use super::geometry::{distance, point_in_polygon};

/// Outcome of spawn-based identification.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnMatch {
    /// Display name: "Foul Young", "Foul Young-Mature", a slash-joined
    /// list, or the raw region name when nothing narrowed.
    pub mob_name: String,
    pub species: Option<String>,
    /// Surviving maturity variants, best match first.
    pub maturities: Vec<String>,
    /// Distance from the kill to the matched region's center.
    pub distance: f64,
    pub confidence: Confidence,
}

impl SpawnMatch {
    /// The maturity, when the evidence narrowed it to exactly one.
    pub fn single_maturity(&self) -> Option<String> {
        match self.maturities.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        }
    }
}

struct Candidate<'a> {
    region: &'a SpawnRegion,
    inside: bool,
    center_distance: f64,
}

pub struct SpawnMatcher<'a, R: ReferenceStore> {
    store: &'a R,
    tuning: &'a PipelineTuning,
}

impl<'a, R: ReferenceStore> SpawnMatcher<'a, R> {
    pub fn new(store: &'a R, tuning: &'a PipelineTuning) -> Self {
        Self { store, tuning }
    }

    /// Identify a kill by its location and estimated health.
    ///
    /// Returns `None` when no spawn region exists within the search
    /// radius; otherwise always produces a best-effort match, degrading
    /// to the raw region name at low confidence.
    pub fn identify_by_spawn(
        &self,
        location: Location,
        estimated_health: f64,
    ) -> Result<Option<SpawnMatch>, ReferenceError> {
        let regions = self
            .store
            .find_spawns_near_location(location, self.tuning.spawn_search_radius)?;
        if regions.is_empty() {
            return Ok(None);
        }

        let mut candidates: Vec<Candidate<'_>> = regions
            .iter()
            .map(|region| Candidate {
                inside: region
                    .polygon
                    .as_deref()
                    .is_some_and(|poly| point_in_polygon(location, poly)),
                center_distance: distance(location, region.center),
                region,
            })
            .collect();

        // Containing regions first, then nearest center
        candidates.sort_by(|a, b| {
            b.inside
                .cmp(&a.inside)
                .then(a.center_distance.total_cmp(&b.center_distance))
        });
        let best = &candidates[0];
        let parts = best.region.name_parts();
        let species = parts.species.to_string();

        // Region lists no maturities: report it as-is.
        if parts.maturities.is_empty() {
            let confidence = if best.inside || best.center_distance <= self.tuning.near_spawn_distance
            {
                Confidence::High
            } else {
                Confidence::Medium
            };
            return Ok(Some(SpawnMatch {
                mob_name: species.clone(),
                species: Some(species),
                maturities: Vec::new(),
                distance: best.center_distance,
                confidence,
            }));
        }

        let survivors = self.narrow_maturities(&species, &parts.maturities, estimated_health)?;

        if !survivors.is_empty() {
            let tightness = survivors[0].health_gap;
            let confidence = self.confidence_for(best, Some(tightness));
            return Ok(Some(SpawnMatch {
                mob_name: range_name(&species, &survivors),
                species: Some(species),
                maturities: survivors.into_iter().map(|s| s.maturity).collect(),
                distance: best.center_distance,
                confidence,
            }));
        }

        // No maturity survived the health filter. Far from the region,
        // the location itself is suspect: fall back to a pure
        // nearest-health search over the whole table.
        if best.center_distance > self.tuning.near_spawn_distance {
            let mobs = self
                .store
                .find_mobs_by_health(estimated_health, self.tuning.fallback_health_tolerance)?;
            if let Some(mob) = mobs.first() {
                tracing::debug!(
                    mob = %mob.display_name(),
                    "spawn maturities excluded by health; using whole-table fallback"
                );
                return Ok(Some(SpawnMatch {
                    mob_name: mob.display_name(),
                    species: Some(mob.name.clone()),
                    maturities: mob.maturity.iter().cloned().collect(),
                    distance: best.center_distance,
                    confidence: Confidence::Medium,
                }));
            }
        }

        // Nothing matched: raw region name, low confidence.
        Ok(Some(SpawnMatch {
            mob_name: best.region.name.clone(),
            species: Some(species),
            maturities: Vec::new(),
            distance: best.center_distance,
            confidence: Confidence::Low,
        }))
    }

    /// Keep only maturities the observed damage could plausibly have
    /// killed, scored by health proximity (lower is better).
    fn narrow_maturities(
        &self,
        species: &str,
        maturities: &[&str],
        estimated_health: f64,
    ) -> Result<Vec<Survivor>, ReferenceError> {
        let t = self.tuning;
        let mut survivors = Vec::new();

        for &maturity in maturities {
            let Some(profile) = self.store.find_mob_by_name(species, Some(maturity))? else {
                continue;
            };
            let hp = profile.avg_health;
            if hp <= 0.0 {
                continue;
            }
            // A mob with more health than 1.5x the damage dealt could
            // not have been killed. Hard exclusion.
            if hp > estimated_health * t.health_exclusion_factor {
                continue;
            }

            let score = if estimated_health >= hp {
                // Excess damage is explained by regeneration, up to half
                // the base health.
                let excess = (estimated_health - hp) / hp;
                if excess > t.regen_tolerance {
                    continue;
                }
                excess
            } else {
                // Falling short of base health is less plausible;
                // tolerate a fifth, penalized double.
                let deficit = (hp - estimated_health) / hp;
                if deficit > t.undershoot_tolerance {
                    continue;
                }
                deficit * 2.0
            };

            survivors.push(Survivor {
                maturity: maturity.to_string(),
                health_gap: (estimated_health - hp).abs() / hp,
                score,
            });
        }

        survivors.sort_by(|a, b| a.score.total_cmp(&b.score));
        Ok(survivors)
    }

    fn confidence_for(&self, best: &Candidate<'_>, health_gap: Option<f64>) -> Confidence {
        let t = self.tuning;
        if best.inside {
            Confidence::High
        } else if best.center_distance <= t.near_spawn_distance
            && health_gap.is_some_and(|g| g < t.tight_health_match)
        {
            Confidence::High
        } else if best.center_distance <= t.medium_spawn_distance {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

struct Survivor {
    maturity: String,
    /// |estimated - hp| / hp, for confidence tightness.
    health_gap: f64,
    score: f64,
}

/// One maturity reports directly, two as a "A-B" range, more as a
/// slash-joined list. Ranges and lists read in ladder order.
fn range_name(species: &str, survivors: &[Survivor]) -> String {
    let mut names: Vec<&str> = survivors.iter().map(|s| s.maturity.as_str()).collect();
    match names.len() {
        1 => format!("{species} {}", names[0]),
        2 => {
            names.sort_by_key(|m| maturity_rank(m));
            format!("{species} {}-{}", names[0], names[1])
        }
        _ => {
            names.sort_by_key(|m| maturity_rank(m));
            format!("{species} {}", names.join("/"))
        }
    }
}
