//! Reference data models and the compact spawn-name encoding.

use serde::{Deserialize, Serialize};

use crate::events::model::Location;

/// Known maturity ladder positions, worst to best. Species families use
/// disjoint ladders, so maturity stays a string; this table only orders
/// the ones we know about for range display ("Young-Mature").
static MATURITY_RANK: phf::Map<&'static str, u8> = phf::phf_map! {
    "Young" => 0,
    "Mature" => 1,
    "Old" => 2,
    "Provider" => 3,
    "Guardian" => 4,
    "Dominant" => 5,
    "Alpha" => 6,
    "Old Alpha" => 7,
    "Prowler" => 8,
    "Stalker" => 9,
    "Weak" => 20,
    "Strong" => 21,
    "Adult" => 22,
    "Leader" => 23,
    "Queen" => 24,
};

/// Sort key for a maturity name; unknown maturities sort last, after
/// every known one, in input order.
pub fn maturity_rank(maturity: &str) -> u8 {
    MATURITY_RANK.get(maturity).copied().unwrap_or(u8::MAX)
}

/// One area a species is known to spawn in, for profile-based scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnZone {
    pub center: Location,
    pub radius: f64,
}

/// Static reference record for one (species, maturity) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobProfile {
    /// Species name ("Foul").
    pub name: String,
    #[serde(default)]
    pub maturity: Option<String>,
    pub min_health: f64,
    pub avg_health: f64,
    pub max_health: f64,
    #[serde(default)]
    pub spawn_zones: Vec<SpawnZone>,
    /// Loot items commonly dropped by this mob.
    #[serde(default)]
    pub common_loot: Vec<String>,
    /// Loot markers dropped by this mob and (nearly) nothing else; a
    /// match is treated as definitive evidence.
    #[serde(default)]
    pub unique_loot: Vec<String>,
}

impl MobProfile {
    /// "Foul Young", or just "Foul" without a maturity.
    pub fn display_name(&self) -> String {
        match &self.maturity {
            Some(m) => format!("{} {}", self.name, m),
            None => self.name.clone(),
        }
    }
}

/// A named spawn area. The name carries a compact encoding of which
/// creatures (and which maturities) appear there:
/// `"Foul (Calypso) - Young/Adult"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnRegion {
    pub name: String,
    pub planet: String,
    pub center: Location,
    /// Ordered polygon vertices when the region has a known boundary.
    #[serde(default)]
    pub polygon: Option<Vec<Location>>,
    #[serde(default)]
    pub density: Option<String>,
}

impl SpawnRegion {
    pub fn name_parts(&self) -> SpawnNameParts<'_> {
        parse_spawn_name(&self.name)
    }
}

/// Decoded pieces of a compact spawn name.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnNameParts<'a> {
    /// Species portion ("Foul"); the full name when decoding fails.
    pub species: &'a str,
    pub planet: Option<&'a str>,
    /// Maturity variants listed for the region, possibly empty.
    pub maturities: Vec<&'a str>,
}

/// Decode `"Foul (Calypso) - Young/Adult"` into species, planet and
/// maturity list. Every section after the species is optional.
pub fn parse_spawn_name(name: &str) -> SpawnNameParts<'_> {
    let (head, maturities) = match name.rsplit_once(" - ") {
        Some((head, tail)) => (
            head,
            tail.split('/').map(str::trim).filter(|m| !m.is_empty()).collect(),
        ),
        None => (name, Vec::new()),
    };

    let (species, planet) = match head.rsplit_once(" (") {
        Some((species, rest)) => (species.trim(), rest.strip_suffix(')')),
        None => (head.trim(), None),
    };

    SpawnNameParts {
        species,
        planet,
        maturities,
    }
}
