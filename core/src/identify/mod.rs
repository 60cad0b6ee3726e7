//! Mob identification from indirect evidence.
//!
//! Two independent engines feed the final result: `SpawnMatcher` narrows
//! candidates by where the kill happened (hard geometric and health
//! constraints), `IdentificationScorer` grades every known profile on
//! health, location and loot evidence. `Identifier` combines them.

pub mod geometry;
pub mod scorer;
pub mod spawn_matcher;

use serde::{Deserialize, Serialize};

use artemis_types::PipelineTuning;

use crate::analysis::KillAnalysis;
use crate::error::ReferenceError;
use crate::events::model::{LootItem, UNKNOWN_CREATURE};
use crate::reference::ReferenceStore;

pub use scorer::IdentificationScorer;
pub use spawn_matcher::{SpawnMatch, SpawnMatcher};

/// Coarse confidence band derived from distance and health-match
/// tightness. Advisory, not authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Numeric floor used when merging band-based and score-based
    /// confidence into one 0-1 value.
    pub fn floor_value(self, tuning: &PipelineTuning) -> f64 {
        match self {
            Confidence::High => tuning.high_confidence_floor,
            Confidence::Medium => tuning.medium_confidence_floor,
            Confidence::Low => tuning.low_confidence_floor,
        }
    }
}

/// A runner-up candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeGuess {
    pub name: String,
    pub confidence: f64,
}

/// The per-kill identification verdict. Ephemeral; callers may persist
/// it alongside the kill event if they wish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationResult {
    /// Combined confidence in the best guess, 0-1.
    pub confidence: f64,
    pub band: Confidence,
    pub mob_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity: Option<String>,
    /// Distance to the matched spawn, when location evidence was used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    pub alternatives: Vec<AlternativeGuess>,
    /// One line per piece of evidence that contributed to the score.
    pub reasoning: Vec<String>,
}

impl IdentificationResult {
    /// The graceful floor: no usable evidence at all.
    pub fn unknown() -> Self {
        Self {
            confidence: 0.0,
            band: Confidence::Low,
            mob_name: UNKNOWN_CREATURE.to_string(),
            species: None,
            maturity: None,
            distance: None,
            alternatives: Vec::new(),
            reasoning: vec!["No usable evidence; creature left unidentified".to_string()],
        }
    }
}

/// Combines spawn matching and profile scoring into one verdict.
pub struct Identifier<'a, R: ReferenceStore> {
    store: &'a R,
    tuning: &'a PipelineTuning,
}

impl<'a, R: ReferenceStore> Identifier<'a, R> {
    pub fn new(store: &'a R, tuning: &'a PipelineTuning) -> Self {
        Self { store, tuning }
    }

    /// Identify the creature behind one analyzed kill.
    ///
    /// A high or medium spawn match supplies the best-guess name and
    /// distance: it encodes the two hard constraints (the kill location
    /// and the health exclusion). The scorer always contributes the
    /// alternatives list and its reasoning trail. Missing evidence
    /// degrades the verdict; only a failing reference store is an error.
    pub fn identify(
        &self,
        analysis: &KillAnalysis,
        loot: &[LootItem],
    ) -> Result<IdentificationResult, ReferenceError> {
        let spawn = match analysis.location {
            Some(location) => SpawnMatcher::new(self.store, self.tuning)
                .identify_by_spawn(location, analysis.estimated_health)?,
            None => None,
        };

        let mut result =
            IdentificationScorer::new(self.store, self.tuning).identify_mob(analysis, loot)?;

        if let Some(m) = spawn {
            result.reasoning.push(format!(
                "Spawn region match: {} at {:.0}m ({:?} confidence)",
                m.mob_name, m.distance, m.confidence
            ));
            if m.confidence >= Confidence::Medium || result.confidence == 0.0 {
                result.maturity = m.single_maturity();
                result.mob_name = m.mob_name;
                result.species = m.species;
                result.band = m.confidence;
                result.confidence = result.confidence.max(m.confidence.floor_value(self.tuning));
                result.distance = Some(m.distance);
            }
        }

        if result.confidence == 0.0 {
            tracing::debug!("no identification evidence scored; reporting unknown");
            return Ok(IdentificationResult::unknown());
        }

        Ok(result)
    }
}
